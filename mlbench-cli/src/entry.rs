//! Process entry points shared by the `mlbench` CLI and the standalone
//! benchmark executables.
//!
//! Failures are logged once with their stable error codes and mapped to
//! [`ExitCode::FAILURE`].

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use mlbench_core::{BenchmarkBuilder, BenchmarkError, BenchmarkKind};
use tracing::{error, field, instrument};

use crate::cli::CliError;
use crate::logging::{self, LoggingError};

/// Runs `kind` with its default configuration and prints the report.
///
/// Used by the `kmeans_bench`, `linear_regression_bench`, `mlp_bench`, and
/// `svm_bench` executables, which accept no arguments.
#[must_use]
pub fn run_standalone(kind: BenchmarkKind) -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match try_standalone(kind) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn try_standalone(kind: BenchmarkKind) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_standalone_report(BenchmarkBuilder::new(kind), &mut writer)?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

/// Runs one benchmark and writes its report. The root span names the
/// benchmark so every log line of the run, JSON included, carries it.
#[instrument(
    name = "mlbench.standalone",
    skip_all,
    fields(benchmark = %builder.kind(), model = builder.kind().model_name()),
)]
fn write_standalone_report<W: Write>(builder: BenchmarkBuilder, writer: &mut W) -> Result<()> {
    let kind = builder.kind();
    let report = builder
        .build()
        .and_then(|benchmark| benchmark.run())
        .with_context(|| format!("{kind} benchmark failed"))?;
    write!(writer, "{report}").context("failed to write report")?;
    Ok(())
}

/// Logs `err` with the stable codes of the benchmark failure it wraps.
pub fn report_failure(err: &anyhow::Error) {
    let benchmark_error = find_benchmark_error(err);
    let code_field = benchmark_error.map(|inner| field::display(inner.code().as_str()));
    let dataset_code_field = benchmark_error
        .and_then(BenchmarkError::dataset_code)
        .map(|code| field::display(code.as_str()));
    let model_code_field = benchmark_error
        .and_then(BenchmarkError::model_code)
        .map(|code| field::display(code.as_str()));

    let message = format!("{err:#}");
    error!(
        error = %message,
        code = code_field,
        dataset_code = dataset_code_field,
        model_code = model_code_field,
        "command execution failed"
    );
}

fn find_benchmark_error(err: &anyhow::Error) -> Option<&BenchmarkError> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<BenchmarkError>()
            .or_else(|| match cause.downcast_ref::<CliError>() {
                Some(CliError::Benchmark(inner)) => Some(inner),
                _ => None,
            })
    })
}

/// Reports a logging setup failure on `stderr`, since no subscriber exists yet.
#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
pub fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
