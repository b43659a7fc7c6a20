//! End-to-end batch runs over mock first pages, with tables on disk.

use std::fs;
use std::path::PathBuf;

use mailsift_core::mock::{MockBackend, MockPage};
use mailsift_ingest::{BatchRunner, JobOutcome, collect_jobs, discover_documents};
use mailsift_reporting::{CsvTable, Table, load_failure_jobs, load_success_jobs};

const DOC_A: &str = "Compact UWB Antenna\n\
                     Ana Lopez1, Ben Okafor2\n\
                     1ana.lopez@upm.es, 2b.okafor@unilag.edu.ng\n\
                     Abstract—A compact antenna is presented";
const DOC_B: &str = "Low-Noise Amplifier\nCorresponding author @ 3.1 GHz.\nAbstract";
const DOC_C: &str = "Invited Talk\nThe Future of Radio\nAbstract—none";

#[test]
fn three_document_batch_statistics_and_tables() {
    let backend = MockBackend::new()
        .with_text("/proc/a.pdf", DOC_A)
        .with_text("/proc/b.pdf", DOC_B)
        .with_text("/proc/c.pdf", DOC_C);
    let paths: Vec<PathBuf> = ["/proc/a.pdf", "/proc/b.pdf", "/proc/c.pdf"]
        .iter()
        .map(PathBuf::from)
        .collect();

    let stats = BatchRunner::new(&backend).run(&paths, |_| {});
    assert_eq!(stats.job_count, 3);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.ignore, 1);
    assert_eq!(stats.fail, 1);
    assert_eq!(stats.email_count(), 2);

    let dir = tempfile::tempdir().unwrap();
    let mut success = CsvTable::new(dir.path().join("data.csv"));
    let mut failure = CsvTable::new(dir.path().join("fail_jobs.csv"));
    BatchRunner::persist(&stats, &mut success, &mut failure).unwrap();

    let rows = success.read_rows().unwrap();
    assert_eq!(rows.len(), 3, "header plus two rows");
    assert_eq!(rows[0], vec!["EMAIL", "JOB"]);
    assert_eq!(rows[1], vec!["ana.lopez@upm.es", "/proc/a.pdf"]);
    assert_eq!(rows[2], vec!["b.okafor@unilag.edu.ng", "/proc/a.pdf"]);

    assert_eq!(
        fs::read_to_string(failure.path()).unwrap(),
        "/proc/b.pdf\n"
    );
    assert_eq!(
        load_success_jobs(&success).unwrap(),
        vec![PathBuf::from("/proc/a.pdf")]
    );
}

#[test]
fn failed_jobs_can_be_retried_from_the_failure_table() {
    let backend = MockBackend::new()
        .with_page("/proc/crash.pdf", MockPage::Panic)
        .with_page("/proc/broken.pdf", MockPage::Error("bad xref".into()))
        .with_text("/proc/fine.pdf", "x.y@tu.de");
    let paths: Vec<PathBuf> = ["/proc/crash.pdf", "/proc/broken.pdf", "/proc/fine.pdf"]
        .iter()
        .map(PathBuf::from)
        .collect();

    let runner = BatchRunner::new(&backend);
    let stats = runner.run(&paths, |_| {});
    assert_eq!((stats.success, stats.fail, stats.ignore), (1, 2, 0));

    let dir = tempfile::tempdir().unwrap();
    let mut success = CsvTable::new(dir.path().join("data.csv"));
    let mut failure = CsvTable::new(dir.path().join("fail_jobs.csv"));
    BatchRunner::persist(&stats, &mut success, &mut failure).unwrap();

    let retry = load_failure_jobs(&failure).unwrap();
    assert_eq!(retry, paths[..2].to_vec());

    let retried = runner.run(&retry, |_| {});
    assert_eq!(retried.job_count, 2);
    assert_eq!(retried.fail, 2);
}

#[test]
fn retry_results_are_merged_into_the_success_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut success = CsvTable::new(dir.path().join("data.csv"));
    let mut failure = CsvTable::new(dir.path().join("fail_jobs.csv"));

    let first = MockBackend::new()
        .with_text("/proc/a.pdf", DOC_A)
        .with_page("/proc/late.pdf", MockPage::Error("truncated file".into()));
    let paths = vec![PathBuf::from("/proc/a.pdf"), PathBuf::from("/proc/late.pdf")];
    let stats = BatchRunner::new(&first).run(&paths, |_| {});
    BatchRunner::persist(&stats, &mut success, &mut failure).unwrap();

    let retry = load_failure_jobs(&failure).unwrap();
    assert_eq!(retry, vec![PathBuf::from("/proc/late.pdf")]);

    let second = MockBackend::new().with_text("/proc/late.pdf", "k.tanaka@titech.ac.jp");
    let retried = BatchRunner::new(&second).run(&retry, |_| {});
    BatchRunner::persist_merged(&retried, &mut success, &mut failure).unwrap();

    let rows = success.read_rows().unwrap();
    assert_eq!(
        rows,
        vec![
            vec!["EMAIL", "JOB"],
            vec!["ana.lopez@upm.es", "/proc/a.pdf"],
            vec!["b.okafor@unilag.edu.ng", "/proc/a.pdf"],
            vec!["k.tanaka@titech.ac.jp", "/proc/late.pdf"],
        ]
    );
    assert!(load_failure_jobs(&failure).unwrap().is_empty());
}

#[test]
fn discovered_tree_runs_through_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("day1")).unwrap();
    fs::write(root.join("day1/p1.pdf"), b"").unwrap();
    fs::write(root.join("day1/p2.Pdf"), b"").unwrap();
    fs::write(root.join("program.html"), b"").unwrap();

    let jobs = collect_jobs(&[root.to_path_buf()]).unwrap();
    assert_eq!(jobs, discover_documents(&[root]));
    assert_eq!(jobs.len(), 2);

    let backend = MockBackend::new()
        .with_text(root.join("day1/p1.pdf"), "{li, wang}@pku.edu.cn")
        .with_text(root.join("day1/p2.Pdf"), "no addresses here");
    let mut finished = Vec::new();
    let stats = BatchRunner::new(&backend).run(&jobs, |event| {
        if let mailsift_ingest::BatchEvent::Finished { outcome, .. } = event {
            finished.push(outcome);
        }
    });

    assert_eq!(stats.success, 1);
    assert_eq!(stats.ignore, 1);
    assert!(matches!(finished[0], JobOutcome::Success(ref s) if s.len() == 2));
    assert_eq!(finished[1], JobOutcome::Ignore);
}
