use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("cannot open PDF: {0}")]
    OpenError(String),
    #[error("text extraction failed: {0}")]
    ExtractionError(String),
    #[error("PDF has no pages")]
    NoPages,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of first-page text for a PDF document.
///
/// Implementors only provide the first page's plain text; normalization and
/// address matching live in `mailsift_parsing::EmailExtractor`. Returning an
/// empty string is allowed and is treated as "no extractable text" upstream.
pub trait PdfBackend: Send + Sync {
    /// Extract the plain text of the document's first page.
    fn first_page_text(&self, path: &Path) -> Result<String, BackendError>;
}
