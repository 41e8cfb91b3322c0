//! CLI entry point for running the mlbench benchmarks.
//!
//! Parses command-line arguments with clap, runs the selected benchmarks,
//! renders their reports to stdout, and maps errors to exit codes. Logging is
//! initialized eagerly so subsequent operations can emit structured
//! diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use mlbench_cli::{
    cli::{Cli, render_summary, run_cli},
    entry::{report_failure, report_logging_init_error},
    logging,
};

/// Parse CLI arguments, execute the command, render the reports, and flush
/// the output stream.
fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render reports")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        report_failure(&err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
