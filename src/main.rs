//! CLI entry point for gofile-dl.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gofile_dl::{
    FileOutcome, NoProgress, ProgressFactory, RunConfig, RunSummary, load_default_file_config, run,
};
use tracing::{debug, info, warn};

mod cli;
mod exit_handler;
mod terminal;

use cli::Args;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every listed file is valid on disk.
    Success,
    /// Fatal error, or every file failed.
    Failure,
    /// Some files failed, others succeeded.
    Partial,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    terminal::init_tracing(args.default_log_level());
    debug!(?args, "CLI arguments parsed");

    match run_downloader(&args).await {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(ProcessExit::Failure.code())
        }
    }
}

async fn run_downloader(args: &Args) -> Result<ProcessExit> {
    let file_config = load_default_file_config().context("failed to load config file")?;
    let config = RunConfig::resolve(args.url.clone(), &args.overrides(), file_config.as_ref())?;

    let use_progress = terminal::should_use_progress(
        std::io::stderr().is_terminal(),
        args.quiet,
        args.no_progress,
        terminal::is_dumb_terminal(),
    );
    let progress: Arc<dyn ProgressFactory> = if use_progress {
        Arc::new(terminal::BarProgressFactory)
    } else {
        Arc::new(NoProgress)
    };

    let summary = run(&config, progress).await?;
    report_summary(&summary);

    Ok(exit_handler::determine_exit_outcome(
        summary.stats.succeeded(),
        summary.stats.failed(),
    ))
}

fn report_summary(summary: &RunSummary) {
    for report in &summary.reports {
        if let FileOutcome::Failed { attempts, reason } = &report.outcome {
            warn!(file = %report.name, attempts, "failed: {reason}");
        }
    }
    info!(
        content_id = %summary.content_id,
        output_dir = %summary.output_dir.display(),
        downloaded = summary.stats.downloaded(),
        skipped = summary.stats.skipped(),
        failed = summary.stats.failed(),
        "done"
    );
}
