use std::path::Path;

use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod matcher;
pub mod normalize;
pub mod postprocess;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::{EmailExtractor, should_ignore};
pub use matcher::{CombinedPattern, match_all, match_combined, match_digit_prefixed, match_plain};
pub use normalize::Normalizer;
pub use postprocess::{is_well_formed, post_process, strip_tail};
// Re-export domain types from core (canonical definitions live there)
pub use mailsift_core::{BackendError, EmailExtraction, ExtractionStatus, PdfBackend};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("first page has no extractable text")]
    NoText,
    #[error("backend error: {0}")]
    Backend(#[from] mailsift_core::BackendError),
    #[error("invalid parsing config: {0}")]
    InvalidConfig(String),
}

/// Extract author emails from the first page of a PDF using the given backend.
///
/// Pipeline:
/// 1. Extract first-page text via `backend`
/// 2. Truncate at the abstract, keep email-bearing lines, strip footnote
///    markers, collapse whitespace around `@ . - _`
/// 3. Skip documents whose first `@` has no `.` shortly after it
/// 4. Match plain, bracket-group and digit-prefixed addresses
/// 5. Strip concatenated tails and deduplicate
pub fn extract_emails(
    pdf_path: &Path,
    backend: &dyn PdfBackend,
) -> Result<EmailExtraction, ParsingError> {
    EmailExtractor::new().extract_via_backend(pdf_path, backend)
}
