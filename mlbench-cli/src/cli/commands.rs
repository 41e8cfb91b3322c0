//! Command implementations and argument parsing for the mlbench CLI.

use std::io::{self, Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use mlbench_core::{BenchmarkBuilder, BenchmarkError, BenchmarkKind, BenchmarkReport, KMeansDataset};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "mlbench",
    about = "Time training and inference of classical models on synthetic data."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run one benchmark, or all of them in sequence.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone, Default)]
pub struct RunCommand {
    /// Benchmark to execute.
    #[arg(value_enum)]
    pub benchmark: BenchmarkSelection,

    /// Number of generated rows.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub samples: Option<usize>,

    /// Number of generated feature columns.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub features: Option<usize>,

    /// Cluster count for k-means, class count for the MLP and SVM.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub classes: Option<usize>,

    /// Seed for data generation and model initialisation.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub seed: Option<u64>,

    /// Dataset clustered by the k-means benchmark.
    #[arg(long, value_enum)]
    pub dataset: Option<DatasetArg>,
}

/// Benchmarks selectable on the command line.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum BenchmarkSelection {
    /// Kernel k-means clustering.
    Kmeans,
    /// Ordinary least squares regression.
    LinearRegression,
    /// Multilayer perceptron classification.
    Mlp,
    /// Support-vector classification.
    Svm,
    /// Every benchmark, in a fixed order.
    #[default]
    All,
}

impl BenchmarkSelection {
    /// Benchmarks executed for this selection, in execution order.
    ///
    /// # Examples
    /// ```
    /// use mlbench_cli::cli::BenchmarkSelection;
    /// use mlbench_core::BenchmarkKind;
    ///
    /// assert_eq!(BenchmarkSelection::Svm.kinds(), &[BenchmarkKind::Svm]);
    /// assert_eq!(BenchmarkSelection::All.kinds().len(), 4);
    /// ```
    #[must_use]
    pub const fn kinds(self) -> &'static [BenchmarkKind] {
        match self {
            Self::Kmeans => &[BenchmarkKind::KMeans],
            Self::LinearRegression => &[BenchmarkKind::LinearRegression],
            Self::Mlp => &[BenchmarkKind::Mlp],
            Self::Svm => &[BenchmarkKind::Svm],
            Self::All => &BenchmarkKind::ALL,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Kmeans => "kmeans",
            Self::LinearRegression => "linear-regression",
            Self::Mlp => "mlp",
            Self::Svm => "svm",
            Self::All => "all",
        }
    }
}

/// Datasets the k-means benchmark can cluster.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum DatasetArg {
    /// Uniform values in `[0, 1)`.
    Uniform,
    /// Labelled Gaussian blobs, scored with the adjusted Rand index.
    Blobs,
}

impl From<DatasetArg> for KMeansDataset {
    fn from(value: DatasetArg) -> Self {
        match value {
            DatasetArg::Uniform => Self::Uniform,
            DatasetArg::Blobs => Self::Blobs,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A shape override was combined with `run all`.
    #[error("`--{option}` cannot be combined with `run all`; only `--seed` applies to every benchmark")]
    UnsupportedOverride {
        /// Name of the rejected option, without the leading dashes.
        option: &'static str,
    },
    /// Configuring or running a benchmark failed.
    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),
    /// Writing the rendered reports failed.
    #[error("failed to write report: {source}")]
    Output {
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    /// Reports in execution order.
    pub reports: Vec<BenchmarkReport>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when an override is rejected or a benchmark fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use mlbench_cli::cli::{BenchmarkSelection, Cli, Command, RunCommand, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         benchmark: BenchmarkSelection::LinearRegression,
///         samples: Some(120),
///         ..RunCommand::default()
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.reports.len(), 1);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(&run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(benchmark = command.benchmark.label(), seed = field::Empty),
)]
pub(super) fn run_command(command: &RunCommand) -> Result<ExecutionSummary, CliError> {
    if command.benchmark == BenchmarkSelection::All {
        reject_shape_overrides(command)?;
    }
    if let Some(seed) = command.seed {
        Span::current().record("seed", seed);
    }

    let mut reports = Vec::with_capacity(command.benchmark.kinds().len());
    for &kind in command.benchmark.kinds() {
        info!(benchmark = %kind, "running {}", kind.model_name());
        let report = configure(kind, command).build()?.run()?;
        reports.push(report);
    }

    info!(benchmarks = reports.len(), "command completed");
    Ok(ExecutionSummary { reports })
}

fn reject_shape_overrides(command: &RunCommand) -> Result<(), CliError> {
    let overrides = [
        ("samples", command.samples.is_some()),
        ("features", command.features.is_some()),
        ("classes", command.classes.is_some()),
        ("dataset", command.dataset.is_some()),
    ];
    match overrides.into_iter().find(|(_, given)| *given) {
        Some((option, _)) => Err(CliError::UnsupportedOverride { option }),
        None => Ok(()),
    }
}

pub(super) fn configure(kind: BenchmarkKind, command: &RunCommand) -> BenchmarkBuilder {
    let mut builder = BenchmarkBuilder::new(kind);
    if let Some(samples) = command.samples {
        builder = builder.with_samples(samples);
    }
    if let Some(features) = command.features {
        builder = builder.with_features(features);
    }
    if let Some(classes) = command.classes {
        builder = builder.with_classes(classes);
    }
    if let Some(seed) = command.seed {
        builder = builder.with_seed(seed);
    }
    if let Some(dataset) = command.dataset {
        builder = builder.with_dataset(dataset.into());
    }
    builder
}

/// Renders every report in `summary` to `writer`.
///
/// # Errors
/// Returns [`CliError::Output`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::time::Duration;
/// # use mlbench_cli::cli::{ExecutionSummary, render_summary};
/// # use mlbench_core::{BenchmarkKind, BenchmarkReport, Quality};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     reports: vec![BenchmarkReport::new(
///         BenchmarkKind::Mlp,
///         Duration::from_millis(20),
///         Duration::from_micros(5),
///         Quality::Classification { accuracy: 1.0 },
///     )],
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert!(String::from_utf8(buffer)?.starts_with("Rust (mlbench) - Multilayer Perceptron:\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> Result<(), CliError> {
    for report in &summary.reports {
        write!(writer, "{report}").map_err(|source| CliError::Output { source })?;
    }
    Ok(())
}
