//! First-page text extraction through MuPDF.
//!
//! Kept in its own crate so that only the binary links the AGPL `mupdf`
//! library; parsing and its tests run against `MockBackend`.

use std::path::Path;

use mupdf::{Document, TextPageFlags};

use mailsift_core::{BackendError, PdfBackend};

/// [`PdfBackend`] reading page 0 of a document with MuPDF.
///
/// The output has one line per MuPDF text line, so later line filtering sees
/// the breaks a reader would. Running headers and footers can be cut by
/// height fraction. Both cuts are off by default because the author block of
/// a proceedings paper often sits close to the top edge.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend {
    skip_top: Option<f32>,
    skip_bottom: Option<f32>,
}

/// Vertical range of the page whose blocks are kept.
#[derive(Debug, Clone, Copy, PartialEq)]
struct KeepBand {
    top: f32,
    bottom: f32,
}

impl KeepBand {
    fn new(
        page_top: f32,
        page_bottom: f32,
        skip_top: Option<f32>,
        skip_bottom: Option<f32>,
    ) -> Self {
        let height = page_bottom - page_top;
        Self {
            top: page_top + height * skip_top.unwrap_or(0.0),
            bottom: page_bottom - height * skip_bottom.unwrap_or(0.0),
        }
    }

    /// A block is dropped when it lies wholly above the band or starts below it.
    fn contains(&self, block_top: f32, block_bottom: f32) -> bool {
        block_bottom > self.top && block_top < self.bottom
    }
}

fn ratio(value: f32) -> Option<f32> {
    (value > 0.0).then(|| value.min(0.5))
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop blocks in the top `fraction` of the page (capped at one half).
    /// `0.0` keeps everything.
    pub fn with_header_exclusion(mut self, fraction: f32) -> Self {
        self.skip_top = ratio(fraction);
        self
    }

    /// Drop blocks starting in the bottom `fraction` of the page (capped at
    /// one half). `0.0` keeps everything.
    pub fn with_footer_exclusion(mut self, fraction: f32) -> Self {
        self.skip_bottom = ratio(fraction);
        self
    }
}

fn extraction_error(e: mupdf::Error) -> BackendError {
    BackendError::ExtractionError(e.to_string())
}

impl PdfBackend for MupdfBackend {
    fn first_page_text(&self, path: &Path) -> Result<String, BackendError> {
        let Some(path_str) = path.to_str() else {
            return Err(BackendError::OpenError(format!(
                "path is not valid UTF-8: {}",
                path.display()
            )));
        };
        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let page = match document.pages().map_err(extraction_error)?.next() {
            Some(page) => page.map_err(extraction_error)?,
            None => return Err(BackendError::NoPages),
        };
        let bounds = page.bounds().map_err(extraction_error)?;
        let band = KeepBand::new(bounds.y0, bounds.y1, self.skip_top, self.skip_bottom);

        let mut text = String::new();
        let structured = page
            .to_text_page(TextPageFlags::empty())
            .map_err(extraction_error)?;
        for block in structured.blocks() {
            let rect = block.bounds();
            if !band.contains(rect.y0, rect.y1) {
                continue;
            }
            for line in block.lines() {
                text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                text.push('\n');
            }
        }

        tracing::trace!(path = %path.display(), bytes = text.len(), "read first page");
        Ok(text)
    }
}
