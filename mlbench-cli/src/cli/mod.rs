//! Command-line interface orchestration for mlbench.
//!
//! The CLI offers a single `run` command that executes one benchmark, or all
//! four in sequence, with optional overrides of the synthetic data shape.

mod commands;

pub use commands::{
    BenchmarkSelection, Cli, CliError, Command, DatasetArg, ExecutionSummary, RunCommand,
    render_summary, run_cli,
};
