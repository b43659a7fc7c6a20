use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::time::Instant;

use mailsift_core::{BatchEvent, BatchStats, FailReason, JobOutcome, PdfBackend};
use mailsift_parsing::EmailExtractor;
use mailsift_reporting::{
    Table, merge_success_table, write_failure_table, write_success_table,
};

use crate::IngestError;

/// Runs the single-document pipeline over a job list, one document at a time.
pub struct BatchRunner<'a> {
    extractor: EmailExtractor,
    backend: &'a dyn PdfBackend,
}

impl<'a> BatchRunner<'a> {
    /// Runner with the default parsing configuration.
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self::with_extractor(EmailExtractor::new(), backend)
    }

    pub fn with_extractor(extractor: EmailExtractor, backend: &'a dyn PdfBackend) -> Self {
        Self { extractor, backend }
    }

    pub fn extractor(&self) -> &EmailExtractor {
        &self.extractor
    }

    /// Classify one document. Never fails: backend errors, empty pages and
    /// backend panics all become [`JobOutcome::Fail`].
    pub fn process(&self, path: &Path) -> JobOutcome {
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.extractor.extract_via_backend(path, self.backend)
        }));

        match result {
            Ok(Ok(extraction)) => JobOutcome::from_extraction(extraction),
            Ok(Err(e)) => {
                tracing::warn!(path = %path.display(), error = %e, "extraction failed");
                JobOutcome::Fail(FailReason::Extraction(e.to_string()))
            }
            Err(panic_payload) => {
                let panic_msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic in PDF backend".to_string()
                };
                tracing::warn!(path = %path.display(), "PDF backend panicked: {}", panic_msg);
                JobOutcome::Fail(FailReason::Extraction(format!("panic: {panic_msg}")))
            }
        }
    }

    /// Process every path in order and return the aggregated statistics.
    ///
    /// `on_event` receives a `Started` and a `Finished` event per document.
    pub fn run<F>(&self, paths: &[PathBuf], mut on_event: F) -> BatchStats
    where
        F: FnMut(BatchEvent),
    {
        let start = Instant::now();
        let total = paths.len();
        let mut stats = BatchStats::default();
        tracing::info!(jobs = total, "batch started");

        for (index, path) in paths.iter().enumerate() {
            on_event(BatchEvent::Started {
                index,
                total,
                path: path.clone(),
            });

            let outcome = self.process(path);
            tracing::debug!(path = %path.display(), outcome = outcome.label(), "classified");
            stats.record(path, &outcome);

            on_event(BatchEvent::Finished {
                index,
                total,
                path: path.clone(),
                outcome,
            });
        }

        stats.elapsed = start.elapsed();
        tracing::info!(
            jobs = stats.job_count,
            success = stats.success,
            ignore = stats.ignore,
            fail = stats.fail,
            emails = stats.email_count(),
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "batch finished"
        );
        stats
    }

    /// Write the success and failure tables for a finished batch.
    pub fn persist(
        stats: &BatchStats,
        success: &mut dyn Table,
        failure: &mut dyn Table,
    ) -> Result<(), IngestError> {
        write_success_table(success, stats)?;
        write_failure_table(failure, stats)?;
        tracing::info!(
            success_table = %success.location(),
            failure_table = %failure.location(),
            "tables written"
        );
        Ok(())
    }

    /// Like [`persist`](Self::persist), but the new pairs are added to the
    /// rows already in the success table. Used when re-running a subset of
    /// jobs so that earlier results survive.
    pub fn persist_merged(
        stats: &BatchStats,
        success: &mut dyn Table,
        failure: &mut dyn Table,
    ) -> Result<(), IngestError> {
        let rows = merge_success_table(success, stats)?;
        write_failure_table(failure, stats)?;
        tracing::info!(
            success_table = %success.location(),
            failure_table = %failure.location(),
            rows,
            "tables merged"
        );
        Ok(())
    }
}
