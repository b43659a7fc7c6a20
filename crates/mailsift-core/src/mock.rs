//! Mock PDF backend for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, PdfBackend};

/// A configurable mock page for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockPage {
    /// Return this text as the first page.
    Text(String),
    /// Fail with an extraction error.
    Error(String),
    /// Panic inside the backend, as a crashing native library would.
    Panic,
}

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
///
/// Paths not registered with [`MockBackend::with_page`] fail with
/// [`BackendError::OpenError`].
#[derive(Default)]
pub struct MockBackend {
    pages: HashMap<PathBuf, MockPage>,
    call_count: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, path: impl Into<PathBuf>, page: MockPage) -> Self {
        self.pages.insert(path.into(), page);
        self
    }

    /// Shorthand for registering a text page.
    pub fn with_text(self, path: impl Into<PathBuf>, text: &str) -> Self {
        self.with_page(path, MockPage::Text(text.to_string()))
    }

    /// Number of times [`PdfBackend::first_page_text`] was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl PdfBackend for MockBackend {
    fn first_page_text(&self, path: &Path) -> Result<String, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(path) {
            Some(MockPage::Text(text)) => Ok(text.clone()),
            Some(MockPage::Error(msg)) => Err(BackendError::ExtractionError(msg.clone())),
            Some(MockPage::Panic) => panic!("mock backend panic for {}", path.display()),
            None => Err(BackendError::OpenError(format!(
                "no such document: {}",
                path.display()
            ))),
        }
    }
}
