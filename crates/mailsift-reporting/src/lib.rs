//! Job tables: the success table (`EMAIL,JOB` rows) and the failure table
//! (one document path per row, no header).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use mailsift_core::BatchStats;

pub mod summary;
pub mod table;

pub use summary::{ReportLine, render_plain, report_lines};
pub use table::{CsvTable, MemoryTable, Table};

/// Header of the success table.
pub const SUCCESS_HEADER: [&str; 2] = ["EMAIL", "JOB"];

#[derive(Error, Debug)]
pub enum TableError {
    #[error("table I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("row {row} has no column {column}")]
    MissingColumn { row: usize, column: usize },
}

/// Write every `(email, job)` pair of `stats`, sorted, under the
/// `EMAIL,JOB` header.
pub fn write_success_table(table: &mut dyn Table, stats: &BatchStats) -> Result<(), TableError> {
    let rows: Vec<Vec<String>> = stats
        .pairs
        .iter()
        .map(|(email, job)| vec![email.clone(), job_cell(job)])
        .collect();
    table.write_rows(Some(&SUCCESS_HEADER[..]), &rows)
}

/// Union the `(email, job)` pairs of `stats` with the rows already in the
/// success table and write the result back, sorted, under the header.
///
/// A missing table counts as empty. Returns the number of rows written.
pub fn merge_success_table(table: &mut dyn Table, stats: &BatchStats) -> Result<usize, TableError> {
    let existing = match table.read_rows() {
        Ok(rows) => rows,
        Err(TableError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
    for (i, row) in existing.iter().enumerate() {
        if i == 0 && is_success_header(row) {
            continue;
        }
        match row.as_slice() {
            [email, job, ..] => {
                pairs.insert((email.clone(), job.clone()));
            }
            _ => return Err(TableError::MissingColumn { row: i, column: 1 }),
        }
    }
    let kept = pairs.len();
    pairs.extend(
        stats
            .pairs
            .iter()
            .map(|(email, job)| (email.clone(), job_cell(job))),
    );
    tracing::debug!(existing = kept, merged = pairs.len(), "merging success table");

    let rows: Vec<Vec<String>> = pairs
        .into_iter()
        .map(|(email, job)| vec![email, job])
        .collect();
    table.write_rows(Some(&SUCCESS_HEADER[..]), &rows)?;
    Ok(rows.len())
}

/// Write one failed document path per row, without a header.
pub fn write_failure_table(table: &mut dyn Table, stats: &BatchStats) -> Result<(), TableError> {
    let rows: Vec<Vec<String>> = stats
        .failed_jobs
        .iter()
        .map(|job| vec![job_cell(job)])
        .collect();
    table.write_rows(None, &rows)
}

/// Distinct document paths listed in the success table, in first-seen order.
///
/// The `EMAIL,JOB` header row is skipped.
pub fn load_success_jobs(table: &dyn Table) -> Result<Vec<PathBuf>, TableError> {
    let rows = table.read_rows()?;
    let body = match rows.first() {
        Some(first) if is_success_header(first) => &rows[1..],
        _ => &rows[..],
    };
    let mut jobs: Vec<PathBuf> = Vec::new();
    for (i, row) in body.iter().enumerate() {
        let job = row
            .get(1)
            .ok_or(TableError::MissingColumn { row: i, column: 1 })?;
        let job = PathBuf::from(job);
        if !jobs.contains(&job) {
            jobs.push(job);
        }
    }
    Ok(jobs)
}

/// Document paths listed in the failure table, in file order.
pub fn load_failure_jobs(table: &dyn Table) -> Result<Vec<PathBuf>, TableError> {
    table
        .read_rows()?
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_iter()
                .next()
                .map(PathBuf::from)
                .ok_or(TableError::MissingColumn { row: i, column: 0 })
        })
        .collect()
}

/// Tables are UTF-8 text, so a non-UTF-8 path is written lossily and will
/// not read back as the same job.
fn job_cell(job: &Path) -> String {
    match job.to_str() {
        Some(s) => s.to_string(),
        None => {
            tracing::warn!(path = %job.display(), "job path is not valid UTF-8, writing it lossily");
            job.to_string_lossy().into_owned()
        }
    }
}

fn is_success_header(row: &[String]) -> bool {
    row.len() == SUCCESS_HEADER.len()
        && row
            .iter()
            .zip(SUCCESS_HEADER)
            .all(|(cell, name)| cell.trim().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsift_core::{FailReason, JobOutcome};

    fn sample_stats() -> BatchStats {
        let mut stats = BatchStats::default();
        let found: BTreeSet<String> = ["b@x.org", "a@x.org"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        stats.record(Path::new("/p/one.pdf"), &JobOutcome::Success(found));
        stats.record(
            Path::new("/p/two.pdf"),
            &JobOutcome::Success(BTreeSet::from(["c@y.org".to_string()])),
        );
        stats.record(
            Path::new("/p/bad.pdf"),
            &JobOutcome::Fail(FailReason::NoMatch),
        );
        stats.record(Path::new("/p/skip.pdf"), &JobOutcome::Ignore);
        stats
    }

    #[test]
    fn test_write_success_table_sorted_with_header() {
        let mut table = MemoryTable::new();
        write_success_table(&mut table, &sample_stats()).unwrap();
        let rows = table.rows();
        assert_eq!(rows[0], vec!["EMAIL", "JOB"]);
        assert_eq!(rows[1], vec!["a@x.org", "/p/one.pdf"]);
        assert_eq!(rows[2], vec!["b@x.org", "/p/one.pdf"]);
        assert_eq!(rows[3], vec!["c@y.org", "/p/two.pdf"]);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_merge_success_table_keeps_existing_rows() {
        let mut table = MemoryTable::from_rows(vec![
            vec!["EMAIL".to_string(), "JOB".to_string()],
            vec!["z@old.org".to_string(), "/p/old.pdf".to_string()],
            vec!["a@x.org".to_string(), "/p/one.pdf".to_string()],
        ]);
        let written = merge_success_table(&mut table, &sample_stats()).unwrap();
        assert_eq!(written, 4);
        let rows = table.rows();
        assert_eq!(rows[0], vec!["EMAIL", "JOB"]);
        assert_eq!(rows[1], vec!["a@x.org", "/p/one.pdf"]);
        assert_eq!(rows[4], vec!["z@old.org", "/p/old.pdf"]);
    }

    #[test]
    fn test_merge_success_table_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = CsvTable::new(dir.path().join("data.csv"));
        assert_eq!(merge_success_table(&mut table, &sample_stats()).unwrap(), 3);
        assert_eq!(table.read_rows().unwrap().len(), 4);
    }

    #[test]
    fn test_write_failure_table_has_no_header() {
        let mut table = MemoryTable::new();
        write_failure_table(&mut table, &sample_stats()).unwrap();
        assert_eq!(table.rows(), &[vec!["/p/bad.pdf".to_string()]]);
    }

    #[test]
    fn test_load_success_jobs_skips_header_and_dedups() {
        let mut table = MemoryTable::new();
        write_success_table(&mut table, &sample_stats()).unwrap();
        let jobs = load_success_jobs(&table).unwrap();
        assert_eq!(
            jobs,
            vec![PathBuf::from("/p/one.pdf"), PathBuf::from("/p/two.pdf")]
        );
    }

    #[test]
    fn test_load_success_jobs_missing_column() {
        let table = MemoryTable::from_rows(vec![vec!["lonely@x.org".to_string()]]);
        assert!(matches!(
            load_success_jobs(&table),
            Err(TableError::MissingColumn { row: 0, column: 1 })
        ));
    }

    #[test]
    fn test_load_failure_jobs_round_trip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = CsvTable::new(dir.path().join("fail_jobs.csv"));
        write_failure_table(&mut table, &sample_stats()).unwrap();
        assert_eq!(
            load_failure_jobs(&table).unwrap(),
            vec![PathBuf::from("/p/bad.pdf")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_job_path_is_written_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let job = Path::new(OsStr::from_bytes(b"/p/caf\xe9.pdf"));
        let mut stats = BatchStats::default();
        stats.record(job, &JobOutcome::Fail(FailReason::NoMatch));
        let mut table = MemoryTable::new();
        write_failure_table(&mut table, &stats).unwrap();
        assert_eq!(table.rows(), &[vec!["/p/caf\u{FFFD}.pdf".to_string()]]);
    }
}
