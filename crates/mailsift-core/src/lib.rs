use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod backend;
pub mod config_file;
pub mod mock;

pub use backend::{BackendError, PdfBackend};
pub use config_file::{ConfigError, ConfigFile};

/// Whether the pipeline attempted to match addresses in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// Matching ran. The address set may still be empty.
    Ok,
    /// The plausibility gate found no address worth matching.
    Ignore,
}

/// Result of running the email pipeline over one document's first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailExtraction {
    pub status: ExtractionStatus,
    pub addresses: BTreeSet<String>,
}

impl EmailExtraction {
    pub fn ignored() -> Self {
        Self {
            status: ExtractionStatus::Ignore,
            addresses: BTreeSet::new(),
        }
    }

    pub fn matched(addresses: BTreeSet<String>) -> Self {
        Self {
            status: ExtractionStatus::Ok,
            addresses,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.status == ExtractionStatus::Ignore
    }
}

/// Why a document ended up in the failure table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// The gate passed but no strategy produced a well-formed address.
    NoMatch,
    /// Text could not be obtained from the PDF (open error, empty page, panic).
    Extraction(String),
}

/// Per-document classification made by the batch runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success(BTreeSet<String>),
    Fail(FailReason),
    Ignore,
}

impl JobOutcome {
    /// Classify a pipeline result. An `Ok` extraction with no addresses is a fail.
    pub fn from_extraction(extraction: EmailExtraction) -> Self {
        match extraction.status {
            ExtractionStatus::Ignore => JobOutcome::Ignore,
            ExtractionStatus::Ok if extraction.addresses.is_empty() => {
                JobOutcome::Fail(FailReason::NoMatch)
            }
            ExtractionStatus::Ok => JobOutcome::Success(extraction.addresses),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Success(_) => "success",
            JobOutcome::Fail(_) => "fail",
            JobOutcome::Ignore => "ignore",
        }
    }
}

/// Aggregated counters and collected rows for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub job_count: usize,
    pub success: usize,
    pub ignore: usize,
    pub fail: usize,
    /// (email, source path) pairs, deduplicated across the batch.
    pub pairs: BTreeSet<(String, PathBuf)>,
    /// Failed source paths in processing order.
    pub failed_jobs: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl BatchStats {
    /// Fold one document's outcome into the counters.
    pub fn record(&mut self, path: &Path, outcome: &JobOutcome) {
        self.job_count += 1;
        match outcome {
            JobOutcome::Success(addresses) => {
                self.success += 1;
                for address in addresses {
                    self.pairs.insert((address.clone(), path.to_path_buf()));
                }
            }
            JobOutcome::Fail(_) => {
                self.fail += 1;
                self.failed_jobs.push(path.to_path_buf());
            }
            JobOutcome::Ignore => self.ignore += 1,
        }
    }

    /// Number of distinct (email, job) rows written to the success table.
    pub fn email_count(&self) -> usize {
        self.pairs.len()
    }
}

/// Progress events emitted by the batch runner, one pair per document.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Finished {
        index: usize,
        total: usize,
        path: PathBuf,
        outcome: JobOutcome,
    },
}
