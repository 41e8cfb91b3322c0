//! Runs the k-means benchmark with its default configuration.

use std::process::ExitCode;

use mlbench_cli::entry::run_standalone;
use mlbench_core::BenchmarkKind;

fn main() -> ExitCode {
    run_standalone(BenchmarkKind::KMeans)
}
