use std::path::Path;

use crate::config::ParsingConfig;
use crate::matcher::{self, CombinedPattern};
use crate::normalize::Normalizer;
use crate::postprocess;
use crate::{EmailExtraction, ParsingError, PdfBackend};

/// Cheap plausibility gate run before matching.
///
/// Returns `true` (ignore the document) when there is no `@`, or when none of
/// the `window` characters after the first `@` is a `.`.
pub fn should_ignore(text: &str, window: usize) -> bool {
    let Some(at) = text.find('@') else {
        return true;
    };
    !text[at + 1..].chars().take(window).any(|c| c == '.')
}

/// A configurable single-document email extraction pipeline.
///
/// Holds a [`ParsingConfig`] with its regexes compiled once, and exposes each
/// pipeline step as a method. Use [`EmailExtractor::with_config`] to supply
/// custom character sets, bracket pairs and thresholds.
#[derive(Debug, Clone)]
pub struct EmailExtractor {
    config: ParsingConfig,
    normalizer: Normalizer,
    combined: Option<CombinedPattern>,
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParsingConfig::default())
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        let normalizer = Normalizer::new(&config);
        let combined = CombinedPattern::new(&config.brackets(), &config.separators());
        Self {
            config,
            normalizer,
            combined,
        }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Clean raw page text down to email-bearing lines (step 1).
    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    /// Plausibility gate over normalized text (step 2).
    pub fn should_ignore(&self, normalized: &str) -> bool {
        should_ignore(normalized, self.config.ignore_window)
    }

    /// Run every strategy over normalized text (step 3).
    pub fn candidates(&self, normalized: &str) -> Vec<String> {
        matcher::match_all(normalized, self.combined.as_ref())
    }

    /// Classify and match already-normalized text (steps 2 to 4).
    pub fn extract_from_normalized(&self, normalized: &str) -> EmailExtraction {
        if self.should_ignore(normalized) {
            return EmailExtraction::ignored();
        }
        EmailExtraction::matched(postprocess::post_process(self.candidates(normalized)))
    }

    /// Run the whole pipeline on raw first-page text.
    pub fn extract_from_text(&self, raw: &str) -> EmailExtraction {
        self.extract_from_normalized(&self.normalize(raw))
    }

    /// Fetch the first page through `backend` and run the pipeline on it.
    ///
    /// Backend failures and pages without any text are returned as errors;
    /// the batch runner turns both into fail jobs.
    pub fn extract_via_backend(
        &self,
        path: &Path,
        backend: &dyn PdfBackend,
    ) -> Result<EmailExtraction, ParsingError> {
        let text = backend.first_page_text(path)?;
        if text.trim().is_empty() {
            return Err(ParsingError::NoText);
        }
        Ok(self.extract_from_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionStatus;

    #[test]
    fn test_should_ignore_without_at() {
        assert!(should_ignore("no address on this page", 15));
        assert!(should_ignore("", 15));
    }

    #[test]
    fn test_should_ignore_window() {
        // '.' is exactly the 15th character after '@'.
        assert!(!should_ignore("x@abcdefghijklmn.org", 15));
        // '.' is the 16th character.
        assert!(should_ignore("x@abcdefghijklmno.org", 15));
        assert!(!should_ignore("x@abcdefghijklmno.org", 16));
    }

    #[test]
    fn test_should_ignore_only_looks_after_first_at() {
        assert!(should_ignore("@handle then a@b.org", 15));
    }

    #[test]
    fn test_should_ignore_counts_chars_not_bytes() {
        assert!(!should_ignore("x@ééééééééééééé.org", 15));
    }

    #[test]
    fn test_extract_from_text() {
        let raw = "Dual-Band Filter Design\n\
                   Wei Zhang1, Li Chen2\n\
                   1wzhang @ seu.edu.cn, {2li.chen, mliu}@ieee.orgAbstract—In this work";
        let result = EmailExtractor::new().extract_from_text(raw);
        assert_eq!(result.status, ExtractionStatus::Ok);
        let found: Vec<&str> = result.addresses.iter().map(String::as_str).collect();
        assert_eq!(
            found,
            vec!["li.chen@ieee.org", "mliu@ieee.org", "wzhang@seu.edu.cn"]
        );
    }

    #[test]
    fn test_extract_from_text_ignored() {
        let result = EmailExtractor::new().extract_from_text("Title\nAuthors\nAbstract");
        assert!(result.is_ignored());
        assert!(result.addresses.is_empty());
    }

    #[test]
    fn test_extract_from_text_numeric_local_part_yields_nothing() {
        let result = EmailExtractor::new().extract_from_text("Wei Li\n12345@qq.com\nAbstract");
        assert_eq!(result.status, ExtractionStatus::Ok);
        assert!(
            result.addresses.is_empty(),
            "unexpected {:?}",
            result.addresses
        );
    }

    #[test]
    fn test_extract_from_text_gate_passes_but_no_match() {
        let result = EmailExtractor::new().extract_from_text("see @ 1.5 GHz. x");
        assert_eq!(result.status, ExtractionStatus::Ok);
        assert!(result.addresses.is_empty());
    }
}
