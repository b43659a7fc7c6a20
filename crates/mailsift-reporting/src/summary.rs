use std::fmt::Write;

use mailsift_core::BatchStats;

/// One line of the end-of-batch report. `depth` 0 lines are top-level
/// counters, depth 1 lines break the job count down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub depth: u8,
    pub label: &'static str,
    pub value: String,
}

impl ReportLine {
    fn new(depth: u8, label: &'static str, value: impl ToString) -> Self {
        Self {
            depth,
            label,
            value: value.to_string(),
        }
    }
}

/// The report body in display order. Rendering (plain or colored) is up to
/// the caller.
pub fn report_lines(stats: &BatchStats) -> Vec<ReportLine> {
    vec![
        ReportLine::new(
            0,
            "Processing Time",
            format!("{:.1} s", stats.elapsed.as_secs_f64()),
        ),
        ReportLine::new(0, "Email Count", stats.email_count()),
        ReportLine::new(0, "Job Count", stats.job_count),
        ReportLine::new(1, "Success", stats.success),
        ReportLine::new(1, "Ignore", stats.ignore),
        ReportLine::new(1, "Fail", stats.fail),
    ]
}

/// Plain-text report, as printed when color is off.
pub fn render_plain(stats: &BatchStats, success_location: &str) -> String {
    let mut out = String::from("==== Report ====\n");
    let _ = writeln!(out, "Email list saved to '{success_location}'.");
    for line in report_lines(stats) {
        let bullet = if line.depth == 0 { "+" } else { "  -" };
        let _ = writeln!(out, "{bullet} {}: {}", line.label, line.value);
    }
    out.push_str("====\n");
    out
}
