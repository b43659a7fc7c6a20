use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use mailsift_core::config_file::{self, ConfigFile, OutputConfig};
use mailsift_core::{BatchEvent, BatchStats, JobOutcome, PdfBackend};
use mailsift_ingest::BatchRunner;
use mailsift_parsing::{EmailExtractor, ParsingConfigBuilder};
use mailsift_reporting::{CsvTable, load_failure_jobs, load_success_jobs};

mod output;

use output::ColorMode;

/// Mailsift - Extract author email addresses from conference-proceedings PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Load this config file instead of the platform/CWD cascade
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Args, Debug, Default)]
struct TableArgs {
    /// Path of the (email, job) success table [env: MAILSIFT_SUCCESS_TABLE]
    #[arg(long)]
    success_table: Option<PathBuf>,

    /// Path of the failed-jobs table [env: MAILSIFT_FAILURE_TABLE]
    #[arg(long)]
    failure_table: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan directories for PDFs and extract author emails from each first page
    Run {
        /// Root directories to scan (default: [input] directories from config)
        directories: Vec<PathBuf>,

        #[command(flatten)]
        tables: TableArgs,
    },

    /// Re-run the jobs listed in the failure table
    Retry {
        #[command(flatten)]
        tables: TableArgs,
    },

    /// Re-extract one recorded job and show its text and parse result
    Inspect {
        /// Index (0-based) into the failure table
        #[arg(long, conflicts_with = "succeeded", required_unless_present = "succeeded")]
        failed: Option<usize>,

        /// Index (0-based) into the jobs of the success table
        #[arg(long)]
        succeeded: Option<usize>,

        /// Print the raw extracted text instead of the normalized text
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        tables: TableArgs,
    },

    /// Extract emails from a single PDF and print them
    Extract {
        /// Path to the PDF file
        file_path: PathBuf,
    },

    /// Print the resolved configuration as TOML
    Config {
        #[command(flatten)]
        tables: TableArgs,
    },
}

/// Table locations after applying CLI > env > config file > defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TablePaths {
    success: PathBuf,
    failure: PathBuf,
}

fn resolve_tables(
    args: &TableArgs,
    config: &ConfigFile,
    env: impl Fn(&str) -> Option<String>,
) -> TablePaths {
    let success = args
        .success_table
        .clone()
        .or_else(|| env("MAILSIFT_SUCCESS_TABLE").map(PathBuf::from))
        .unwrap_or_else(|| config.success_table());
    let failure = args
        .failure_table
        .clone()
        .or_else(|| env("MAILSIFT_FAILURE_TABLE").map(PathBuf::from))
        .unwrap_or_else(|| config.failure_table());
    TablePaths { success, failure }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => config_file::load_explicit(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => config_file::load_config(),
    };
    let color = ColorMode(!cli.no_color);

    match cli.command {
        Command::Run {
            directories,
            tables,
        } => run(directories, &tables, &config, color),
        Command::Retry { tables } => retry(&tables, &config, color),
        Command::Inspect {
            failed,
            succeeded,
            raw,
            tables,
        } => inspect(failed, succeeded, raw, &tables, &config, color),
        Command::Extract { file_path } => extract(&file_path, &config, color),
        Command::Config { tables } => print_config(&tables, config),
    }
}

fn build_extractor(config: &ConfigFile) -> anyhow::Result<EmailExtractor> {
    let builder = match &config.parsing {
        Some(section) => ParsingConfigBuilder::from_section(section),
        None => ParsingConfigBuilder::new(),
    };
    let parsing = builder.build().context("invalid [parsing] configuration")?;
    Ok(EmailExtractor::with_config(parsing))
}

fn build_backend(config: &ConfigFile) -> anyhow::Result<Box<dyn PdfBackend>> {
    Ok(mailsift_ingest::default_backend(config.pdf.as_ref())?)
}

fn run(
    directories: Vec<PathBuf>,
    tables: &TableArgs,
    config: &ConfigFile,
    color: ColorMode,
) -> anyhow::Result<()> {
    let roots = if directories.is_empty() {
        config.directories()
    } else {
        directories
    };
    let jobs = mailsift_ingest::collect_jobs(&roots)?;
    if jobs.is_empty() {
        tracing::warn!("no PDF files found under the input directories");
    }
    run_jobs(&jobs, tables, config, color, Persist::Replace)
}

fn retry(tables: &TableArgs, config: &ConfigFile, color: ColorMode) -> anyhow::Result<()> {
    let paths = resolve_tables(tables, config, env_var);
    let jobs = load_failure_jobs(&CsvTable::new(&paths.failure))
        .with_context(|| format!("failed to read failure table {}", paths.failure.display()))?;
    tracing::info!(jobs = jobs.len(), "retrying failed jobs");
    run_jobs(&jobs, tables, config, color, Persist::Merge)
}

/// How a finished batch is written to the success table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persist {
    /// Overwrite it with this batch's pairs (`run`).
    Replace,
    /// Add this batch's pairs to the existing rows (`retry`).
    Merge,
}

fn run_jobs(
    jobs: &[PathBuf],
    tables: &TableArgs,
    config: &ConfigFile,
    color: ColorMode,
    persist: Persist,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let paths = resolve_tables(tables, config, env_var);
    let extractor = build_extractor(config)?;
    let backend = build_backend(config)?;
    let runner = BatchRunner::with_extractor(extractor, backend.as_ref());

    let bar = ProgressBar::new(jobs.len() as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }

    let stats: BatchStats = runner.run(jobs, |event| match event {
        BatchEvent::Started { path, .. } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            bar.set_message(name);
        }
        BatchEvent::Finished { .. } => bar.inc(1),
    });
    bar.finish_and_clear();

    let mut success = CsvTable::new(&paths.success);
    let mut failure = CsvTable::new(&paths.failure);
    let written = match persist {
        Persist::Replace => BatchRunner::persist(&stats, &mut success, &mut failure),
        Persist::Merge => BatchRunner::persist_merged(&stats, &mut success, &mut failure),
    };
    written.with_context(|| {
        format!(
            "failed to write tables {} / {}",
            paths.success.display(),
            paths.failure.display()
        )
    })?;

    let mut stdout = std::io::stdout();
    output::print_report(
        &mut stdout,
        &stats,
        &paths.success.display().to_string(),
        color,
    )?;
    stdout.flush()?;
    Ok(())
}

fn inspect(
    failed: Option<usize>,
    succeeded: Option<usize>,
    raw: bool,
    tables: &TableArgs,
    config: &ConfigFile,
    color: ColorMode,
) -> anyhow::Result<()> {
    let paths = resolve_tables(tables, config, env_var);
    let (jobs, index, table_path) = match (failed, succeeded) {
        (Some(n), _) => (
            load_failure_jobs(&CsvTable::new(&paths.failure)),
            n,
            &paths.failure,
        ),
        (None, Some(n)) => (
            load_success_jobs(&CsvTable::new(&paths.success)),
            n,
            &paths.success,
        ),
        (None, None) => anyhow::bail!("pass --failed N or --succeeded N"),
    };
    let jobs = jobs.with_context(|| format!("failed to read {}", table_path.display()))?;
    let Some(job) = jobs.get(index) else {
        anyhow::bail!(
            "job index {} out of range: {} has {} jobs",
            index,
            table_path.display(),
            jobs.len()
        );
    };

    let extractor = build_extractor(config)?;
    let backend = build_backend(config)?;
    let text = backend
        .first_page_text(job)
        .with_context(|| format!("failed to extract first page of {}", job.display()))?;
    let shown = if raw {
        text.clone()
    } else {
        extractor.normalize(&text)
    };
    let outcome = JobOutcome::from_extraction(extractor.extract_from_text(&text));

    let mut stdout = std::io::stdout();
    output::print_inspection(&mut stdout, job, &shown, &outcome, color)?;
    Ok(())
}

fn extract(file_path: &Path, config: &ConfigFile, color: ColorMode) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("file not found: {}", file_path.display());
    }
    let extractor = build_extractor(config)?;
    let backend = build_backend(config)?;
    let runner = BatchRunner::with_extractor(extractor, backend.as_ref());
    let outcome = runner.process(file_path);

    let mut stdout = std::io::stdout();
    output::print_outcome(&mut stdout, file_path, &outcome, color)?;
    Ok(())
}

fn print_config(tables: &TableArgs, mut config: ConfigFile) -> anyhow::Result<()> {
    let paths = resolve_tables(tables, &config, env_var);
    config.output = Some(OutputConfig {
        success_table: Some(paths.success.display().to_string()),
        failure_table: Some(paths.failure.display().to_string()),
    });
    let rendered = toml::to_string_pretty(&config).context("failed to serialize config")?;
    print!("{}", rendered);
    Ok(())
}
