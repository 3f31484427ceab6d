//! Building blocks the stages are assembled from.
//!
//! Each submodule does one job and is testable on its own. The backend
//! adapters ([`ocr`], [`classify`], [`segment`], [`translate`]) are traits
//! with one edgequake-llm (or rule-based) implementation each, so the
//! stage loops can be driven by scripted fakes in tests.
//!
//! ## Data Flow
//!
//! ```text
//! extract:   input ──▶ render ──▶ encode ──▶ ocr ──▶ cleanup
//!            (URL/path) (pdfium)  (base64)   (VLM)
//!
//! translate: classify ──▶ segment ──▶ translate
//!            (split/whole) (sentences) (LLM)
//!
//! merge:     typeset (printpdf)
//! ```
//!
//! [`llm`] holds the single-call client every model-backed adapter shares:
//! one request, a timeout, no retry.

pub mod classify;
pub mod cleanup;
pub mod encode;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod render;
pub mod segment;
pub mod translate;
pub mod typeset;
