use std::path::PathBuf;

use thiserror::Error;

use mailsift_core::config_file::PdfConfig;

pub mod batch;
pub mod discover;

pub use batch::BatchRunner;
pub use discover::{discover_documents, is_pdf_path};
// Re-export domain types for convenience
pub use mailsift_core::{BatchEvent, BatchStats, FailReason, JobOutcome, PdfBackend};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("no input directories given (pass them as arguments or set [input] directories)")]
    NoInputDirectories,
    #[error("table error: {0}")]
    Table(#[from] mailsift_reporting::TableError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of mailsift-ingest)")]
    NoPdfSupport,
}

/// Discover every PDF under `roots`, failing when no root was given at all.
///
/// Roots that exist but contain no PDFs produce an empty job list, not an error.
pub fn collect_jobs(roots: &[PathBuf]) -> Result<Vec<PathBuf>, IngestError> {
    if roots.is_empty() {
        return Err(IngestError::NoInputDirectories);
    }
    Ok(discover_documents(roots))
}

/// The production PDF backend, configured from the `[pdf]` config section.
#[cfg(feature = "pdf")]
pub fn default_backend(pdf: Option<&PdfConfig>) -> Result<Box<dyn PdfBackend>, IngestError> {
    let mut backend = mailsift_pdf_mupdf::MupdfBackend::default();
    if let Some(pdf) = pdf {
        if let Some(ratio) = pdf.header_exclusion {
            backend = backend.with_header_exclusion(ratio);
        }
        if let Some(ratio) = pdf.footer_exclusion {
            backend = backend.with_footer_exclusion(ratio);
        }
    }
    Ok(Box::new(backend))
}

#[cfg(not(feature = "pdf"))]
pub fn default_backend(_pdf: Option<&PdfConfig>) -> Result<Box<dyn PdfBackend>, IngestError> {
    Err(IngestError::NoPdfSupport)
}
