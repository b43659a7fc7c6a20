use std::io::Write;
use std::path::Path;

use mailsift_core::{BatchStats, FailReason, JobOutcome};
use mailsift_reporting::{render_plain, report_lines};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn banner(w: &mut dyn Write, title: &str, color: ColorMode) -> std::io::Result<()> {
    let line = format!("==== {} ====", title);
    if color.enabled() {
        writeln!(w, "{}", line.bold())
    } else {
        writeln!(w, "{}", line)
    }
}

/// Print the end-of-batch report.
pub fn print_report(
    w: &mut dyn Write,
    stats: &BatchStats,
    success_location: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if !color.enabled() {
        return w.write_all(render_plain(stats, success_location).as_bytes());
    }

    banner(w, "Report", color)?;
    writeln!(w, "Email list saved to '{}'.", success_location)?;

    for line in report_lines(stats) {
        let bullet = if line.depth == 0 { "+" } else { "  -" };
        let value = match line.label {
            "Success" => line.value.green().to_string(),
            "Ignore" => line.value.yellow().to_string(),
            "Fail" => line.value.red().to_string(),
            _ => line.value.bold().to_string(),
        };
        writeln!(w, "{} {}: {}", bullet.dimmed(), line.label, value)?;
    }
    writeln!(w, "====")?;
    Ok(())
}

/// Print the classification of a single document and its addresses.
pub fn print_outcome(
    w: &mut dyn Write,
    path: &Path,
    outcome: &JobOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    let status = match outcome {
        JobOutcome::Success(_) => "SUCCESS".to_string(),
        JobOutcome::Ignore => "IGNORE".to_string(),
        JobOutcome::Fail(FailReason::NoMatch) => "FAIL (no address matched)".to_string(),
        JobOutcome::Fail(FailReason::Extraction(msg)) => format!("FAIL ({})", msg),
    };
    if color.enabled() {
        let status = match outcome {
            JobOutcome::Success(_) => status.green().to_string(),
            JobOutcome::Ignore => status.yellow().to_string(),
            JobOutcome::Fail(_) => status.red().to_string(),
        };
        writeln!(w, "{} -> {}", path.display(), status)?;
    } else {
        writeln!(w, "{} -> {}", path.display(), status)?;
    }

    if let JobOutcome::Success(addresses) = outcome {
        for address in addresses {
            writeln!(w, "  {}", address)?;
        }
    }
    Ok(())
}

/// Print a re-extracted job: the page text followed by the parse result.
pub fn print_inspection(
    w: &mut dyn Write,
    job: &Path,
    text: &str,
    outcome: &JobOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Job: {}", job.display())?;
    banner(w, "Text", color)?;
    writeln!(w, "{}", text.trim_end())?;
    banner(w, "Result", color)?;
    print_outcome(w, job, outcome, color)
}
