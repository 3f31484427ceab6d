//! CLI binary for edgequake-pdf-translate.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `TranslationConfig` and `BookPaths`, then runs the requested stages.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf_translate::pipeline::input::{book_stem, is_url};
use edgequake_pdf_translate::{
    translate_book, BookPaths, BookSummary, LanguageCode, ProgressCallback, Stage,
    TranslationConfig, TranslationProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar per stage, one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
            skipped: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Extract => "Extracting",
        Stage::Translate => "Translating",
        Stage::Merge => "Merging",
    }
}

impl TranslationProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage, start_page: usize, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_style(style);
        self.bar.set_length(total_pages as u64);
        self.bar.set_position(start_page as u64);
        self.bar.set_prefix(stage_label(stage));
        self.bar.set_message("");
        self.bar.reset_eta();
        self.skipped.store(0, Ordering::SeqCst);

        let resumed = if start_page > 0 {
            format!(" (resuming at page {})", start_page + 1)
        } else {
            String::new()
        };
        self.bar.println(format!(
            "{} {}{}",
            cyan("◆"),
            bold(&format!("{} {} pages", stage_label(stage), total_pages)),
            dim(&resumed)
        ));
    }

    fn on_page_start(&self, _stage: Stage, page_num: usize, _total: usize) {
        if let Ok(mut t) = self.page_started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_unit_complete(&self, page_num: usize, unit_index: usize, unit_total: usize) {
        self.bar
            .set_message(format!("page {page_num} · {unit_index}/{unit_total}"));
    }

    fn on_page_complete(&self, stage: Stage, page_num: usize, total: usize, units: usize) {
        let what = match stage {
            Stage::Extract => "extracted".to_string(),
            _ => format!("{units:>3} units"),
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&what),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_page_skipped(&self, _stage: Stage, _page_num: usize, _total: usize) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
    }

    fn on_page_error(&self, _stage: Stage, page_num: usize, total: usize, error: &str) {
        // Keep the log line on one terminal row.
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.abandon();
    }

    fn on_stage_complete(&self, stage: Stage, processed: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        let detail = match stage {
            Stage::Merge => format!("{processed} units typeset"),
            _ if skipped > 0 => format!("{processed} pages ({skipped} blank)"),
            _ => format!("{processed} pages"),
        };
        eprintln!("{} {}: {}", green("✔"), stage_label(stage), bold(&detail));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Full run: extract, translate, merge
  pdf-translate --input-dir books --pdf-file libro.pdf \
      --source-language IT --target-language EN

  # One step at a time
  pdf-translate --pdf-file libro.pdf --source-language IT --target-language EN --step extract
  pdf-translate --pdf-file libro.pdf --source-language IT --target-language EN --step translate
  pdf-translate --pdf-file libro.pdf --source-language IT --target-language EN --step merge

  # Book from a URL, gentle on the API quota
  pdf-translate --pdf-file https://example.com/libro.pdf \
      --source-language IT --target-language EN --request-delay-ms 1000

  # Greek target: embed a font that has the glyphs
  pdf-translate --pdf-file libro.pdf --source-language IT --target-language EL \
      --font /usr/share/fonts/truetype/dejavu/DejaVuSans.ttf

RESUMING:
  Every step checkpoints after each page. After a failure (quota, network,
  Ctrl-C) run the same command again: finished pages are not repeated.

OUTPUT LAYOUT (under --work-dir):
  original/json/ocr_response.json               page transcriptions
  translated/json/translated_sentences.json     translation units
  translated/pdf/<book> - Translated.pdf        bilingual PDF

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY         Mistral API key (preferred: mistral-small-latest, pixtral-12b-2409)
  OPENAI_API_KEY          OpenAI API key (gpt-4.1-nano)
  EDGEQUAKE_LLM_PROVIDER  Override provider (mistral, openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium
  RUST_LOG                Log filter, e.g. edgequake_pdf_translate=debug

  A .env file in the working directory is read at startup.
"#;

#[derive(Parser, Debug)]
#[command(
    name = "pdf-translate",
    version,
    about = "Translate scanned PDF books into a bilingual PDF using LLMs",
    long_about = "Translate a scanned PDF book: OCR every page with a vision model, translate \
prose sentence by sentence and indexes or tables of contents as a whole, then typeset the \
original and the translation together in a new PDF. Every step resumes where it stopped.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file name (inside --input-dir) or an HTTP(S) URL.
    #[arg(long, alias = "pdf_file", env = "PDF_TRANSLATE_PDF_FILE")]
    pdf_file: String,

    /// Directory containing the input PDF.
    #[arg(long, alias = "input_dir", env = "PDF_TRANSLATE_INPUT_DIR", default_value = ".")]
    input_dir: PathBuf,

    /// Language of the book: two uppercase letters, e.g. IT.
    #[arg(long, alias = "source_language", value_parser = parse_language)]
    source_language: LanguageCode,

    /// Language to translate into: two uppercase letters, e.g. EN.
    #[arg(long, alias = "target_language", value_parser = parse_language)]
    target_language: LanguageCode,

    /// Run a single step. Without it all three run in order.
    #[arg(long, value_enum)]
    step: Option<StepArg>,

    /// Directory that holds the original/ and translated/ trees.
    #[arg(long, env = "PDF_TRANSLATE_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Output PDF path. Default: translated/pdf/<book> - Translated.pdf.
    #[arg(short, long, env = "PDF_TRANSLATE_OUTPUT")]
    output: Option<PathBuf>,

    /// Model for classification and translation.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Vision model for OCR.
    #[arg(long, env = "PDF_TRANSLATE_OCR_MODEL")]
    ocr_model: Option<String>,

    /// LLM provider. Auto-detected from API key env vars if not set.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    #[arg(long, env = "PDF_TRANSLATE_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    #[arg(long, env = "PDF_TRANSLATE_PASSWORD")]
    password: Option<String>,

    /// Pause between consecutive API calls, in milliseconds.
    #[arg(long, env = "PDF_TRANSLATE_REQUEST_DELAY_MS", default_value_t = 0)]
    request_delay_ms: u64,

    /// TrueType font for the output PDF (needed for non-Latin scripts).
    #[arg(long, env = "PDF_TRANSLATE_FONT")]
    font: Option<PathBuf>,

    /// Custom OCR system prompt file.
    #[arg(long, env = "PDF_TRANSLATE_OCR_PROMPT")]
    ocr_prompt: Option<PathBuf>,

    #[arg(long, env = "PDF_TRANSLATE_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    #[arg(long, env = "PDF_TRANSLATE_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Per-call API timeout in seconds.
    #[arg(long, env = "PDF_TRANSLATE_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    #[arg(long, env = "PDF_TRANSLATE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    #[arg(long, env = "PDF_TRANSLATE_NO_PROGRESS")]
    no_progress: bool,

    #[arg(short, long, env = "PDF_TRANSLATE_VERBOSE")]
    verbose: bool,

    #[arg(short, long, env = "PDF_TRANSLATE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StepArg {
    Extract,
    Translate,
    Merge,
}

impl From<StepArg> for Stage {
    fn from(v: StepArg) -> Self {
        match v {
            StepArg::Extract => Stage::Extract,
            StepArg::Translate => Stage::Translate,
            StepArg::Merge => Stage::Merge,
        }
    }
}

fn parse_language(s: &str) -> Result<LanguageCode, String> {
    LanguageCode::parse(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs unless asked otherwise.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input = if is_url(&cli.pdf_file) {
        cli.pdf_file.clone()
    } else {
        cli.input_dir.join(&cli.pdf_file).to_string_lossy().into_owned()
    };

    let mut paths = BookPaths::new(&cli.work_dir, &book_stem(&cli.pdf_file));
    if let Some(ref output) = cli.output {
        paths.output_pdf = output.clone();
    }

    let stages: Vec<Stage> = match cli.step {
        Some(step) => vec![step.into()],
        None => Stage::ALL.to_vec(),
    };

    let cli_progress = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn TranslationProgressCallback>);

    let config = build_config(&cli, progress_cb)?;

    if !cli.quiet {
        eprintln!(
            "{} {}  {} → {}",
            cyan("◆"),
            bold(&cli.pdf_file),
            config.source_language.display_name(),
            config.target_language.display_name()
        );
    }

    let result = translate_book(&input, &stages, &paths, &config).await;
    if let Some(cb) = cli_progress {
        cb.bar.finish_and_clear();
    }
    let summary = result.with_context(|| format!("Failed to translate '{}'", cli.pdf_file))?;

    if !cli.quiet {
        print_summary(&summary, &paths);
    }
    Ok(())
}

fn build_config(cli: &Cli, progress_cb: Option<ProgressCallback>) -> Result<TranslationConfig> {
    let mut builder = TranslationConfig::builder(
        cli.source_language.clone(),
        cli.target_language.clone(),
    )
    .dpi(cli.dpi)
    .max_tokens(cli.max_tokens)
    .temperature(cli.temperature)
    .api_timeout_secs(cli.api_timeout)
    .download_timeout_secs(cli.download_timeout)
    .request_delay_ms(cli.request_delay_ms);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref model) = cli.ocr_model {
        builder = builder.ocr_model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(ref font) = cli.font {
        builder = builder.font_path(font);
    }
    if let Some(ref prompt_path) = cli.ocr_prompt {
        let prompt = read_prompt(prompt_path)?;
        builder = builder.ocr_system_prompt(prompt);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn read_prompt(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read OCR prompt file '{}'", path.display()))
}

fn print_summary(summary: &BookSummary, paths: &BookPaths) {
    if let Some(ref e) = summary.extraction {
        if e.already_complete {
            eprintln!("{} Extraction: all {} pages already done", dim("·"), e.total_pages);
        }
        eprintln!("   {}", dim(&paths.extraction_file.display().to_string()));
    }
    if let Some(ref t) = summary.translation {
        if t.already_complete {
            eprintln!("{} Translation: all {} pages already done", dim("·"), t.total_pages);
        } else {
            eprintln!(
                "   {} units added from {} pages",
                t.units_added, t.pages_translated
            );
        }
        eprintln!("   {}", dim(&paths.translation_file.display().to_string()));
    }
    if let Some(ref m) = summary.merge {
        eprintln!(
            "{}  {} units  {} pages  →  {}",
            green("✔"),
            m.units,
            m.pdf_pages,
            bold(&m.output.display().to_string())
        );
    }
}
