//! Progress files: the OCR output and the translation output.
//!
//! Both files are a single JSON object rewritten in full after every
//! committed page. A write goes to a temp file in the same directory and is
//! then renamed over the target, so a reader (or the next run after a crash)
//! sees either the previous commit or the new one, never half a file.
//!
//! - [`extraction`] — pages transcribed so far, cursor `current_page`
//! - [`translation`] — translated units so far, cursor `last_processed_page`

pub mod extraction;
pub mod translation;

use crate::error::PdfTranslateError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Read and parse a progress file.
///
/// A missing file maps to [`PdfTranslateError::StateNotFound`]; anything
/// serde rejects (bad JSON, missing `pages`/`progress`, wrong types) maps to
/// [`PdfTranslateError::StateCorrupt`].
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PdfTranslateError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PdfTranslateError::StateNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(PdfTranslateError::StateCorrupt {
                path: path.to_path_buf(),
                detail: format!("unreadable: {e}"),
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| PdfTranslateError::StateCorrupt {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Atomically replace `path` with the pretty-printed JSON of `value`.
pub(crate) fn write_json_atomic<T: Serialize>(
    value: &T,
    path: &Path,
) -> Result<(), PdfTranslateError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| PdfTranslateError::Internal(format!("serialise {}: {e}", path.display())))?;
    write_atomic(&json, path).map_err(|source| PdfTranslateError::StateWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Persisted {} ({} bytes)", path.display(), json.len());
    Ok(())
}

/// Write `bytes` to a sibling temp file, fsync it, then rename onto `path`.
///
/// The temp file lives in the target directory so the rename never crosses a
/// file-system boundary. Parent directories are created on demand.
pub(crate) fn write_atomic(bytes: &[u8], path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
