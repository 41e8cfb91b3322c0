//! Benchmark orchestration.
//!
//! A [`Benchmark`] generates its synthetic dataset, times model training and
//! inference separately, and returns a [`BenchmarkReport`]. Quality metrics
//! are computed after both timed phases.

use std::{collections::HashSet, fmt, time::Duration};

use tracing::{Span, field, info, instrument};

use crate::{
    Result,
    builder::KMeansDataset,
    data::{
        BlobConfig, BlobData, ClassificationData, DEFAULT_TRAIN_FRACTION, RegressionData,
        SyntheticConfig, uniform_features,
    },
    error::{BenchmarkError, DatasetError, ModelError},
    kmeans::{KernelKMeans, KernelKMeansParams},
    linear::{OlsParams, OrdinaryLeastSquares},
    metrics::{accuracy, adjusted_rand_index, mean_squared_error, r2_score},
    mlp::{Mlp, MlpParams},
    svm::{Svc, SvcParams},
    timing::time_phase,
};

/// Prefix identifying this implementation in rendered reports.
pub const REPORT_PREFIX: &str = "Rust (mlbench)";

/// The four benchmarks.
///
/// # Examples
/// ```
/// use mlbench_core::BenchmarkKind;
///
/// assert_eq!(BenchmarkKind::KMeans.to_string(), "kmeans");
/// assert_eq!(BenchmarkKind::KMeans.model_name(), "K-Means Clustering");
/// assert_eq!(BenchmarkKind::LinearRegression.default_samples(), 506);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BenchmarkKind {
    /// Kernel k-means clustering.
    KMeans,
    /// Ordinary least squares regression.
    LinearRegression,
    /// Multilayer perceptron classification.
    Mlp,
    /// Support-vector classification.
    Svm,
}

impl BenchmarkKind {
    /// Every benchmark, in the order `run all` executes them.
    pub const ALL: [Self; 4] = [Self::KMeans, Self::LinearRegression, Self::Mlp, Self::Svm];

    /// Stable identifier used on the command line and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KMeans => "kmeans",
            Self::LinearRegression => "linear-regression",
            Self::Mlp => "mlp",
            Self::Svm => "svm",
        }
    }

    /// Human-readable model name printed in reports.
    #[must_use]
    pub const fn model_name(self) -> &'static str {
        match self {
            Self::KMeans => "K-Means Clustering",
            Self::LinearRegression => "Linear Regression",
            Self::Mlp => "Multilayer Perceptron",
            Self::Svm => "SVM",
        }
    }

    /// Rows generated when no override is given.
    #[must_use]
    pub const fn default_samples(self) -> usize {
        match self {
            Self::KMeans => 10_000,
            Self::LinearRegression => 506,
            Self::Mlp | Self::Svm => 150,
        }
    }

    /// Columns generated when no override is given.
    #[must_use]
    pub const fn default_features(self) -> usize {
        match self {
            Self::KMeans => 10,
            Self::LinearRegression => 13,
            Self::Mlp | Self::Svm => 4,
        }
    }

    /// Clusters (k-means) or classes (MLP, SVM) when no override is given.
    /// Linear regression has none.
    #[must_use]
    pub const fn default_classes(self) -> Option<usize> {
        match self {
            Self::KMeans => Some(5),
            Self::LinearRegression => None,
            Self::Mlp | Self::Svm => Some(3),
        }
    }

    /// Whether the benchmark holds out rows for inference.
    #[must_use]
    pub const fn splits(self) -> bool {
        !matches!(self, Self::KMeans)
    }
}

impl fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-hoc model quality, computed outside the timed phases.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Quality {
    /// Cluster assignments over the training data.
    Clustering {
        /// Number of distinct clusters that received at least one sample.
        clusters_found: usize,
        /// Agreement with the generating blobs, when the data has them.
        adjusted_rand_index: Option<f64>,
    },
    /// Held-out regression fit.
    Regression {
        /// Coefficient of determination.
        r2: f64,
        /// Mean squared error.
        mse: f64,
    },
    /// Held-out classification accuracy in `[0, 1]`.
    Classification {
        /// Fraction of correctly predicted labels.
        accuracy: f64,
    },
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clustering {
                clusters_found,
                adjusted_rand_index: Some(ari),
            } => write!(f, "clusters_found={clusters_found} ari={ari:.4}"),
            Self::Clustering { clusters_found, .. } => {
                write!(f, "clusters_found={clusters_found}")
            }
            Self::Regression { r2, mse } => write!(f, "r2={r2:.6} mse={mse:.6e}"),
            Self::Classification { accuracy } => write!(f, "accuracy={accuracy:.4}"),
        }
    }
}

/// Outcome of one benchmark run.
///
/// Its [`Display`](fmt::Display) form is the human-readable report: a model
/// label, the two timings in seconds, and a trailing blank line.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use mlbench_core::{BenchmarkKind, BenchmarkReport, Quality};
///
/// let report = BenchmarkReport::new(
///     BenchmarkKind::Svm,
///     Duration::from_millis(1500),
///     Duration::from_micros(250),
///     Quality::Classification { accuracy: 0.5 },
/// );
/// assert_eq!(
///     report.to_string(),
///     "Rust (mlbench) - SVM:\nTraining Time: 1.500000 seconds\nInference Time: 0.000250 seconds\n\n"
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchmarkReport {
    kind: BenchmarkKind,
    training: Duration,
    inference: Duration,
    quality: Quality,
}

impl BenchmarkReport {
    /// Assembles a report from its parts.
    #[must_use]
    pub const fn new(
        kind: BenchmarkKind,
        training: Duration,
        inference: Duration,
        quality: Quality,
    ) -> Self {
        Self {
            kind,
            training,
            inference,
            quality,
        }
    }

    /// Benchmark that produced the report.
    #[must_use]
    pub const fn kind(&self) -> BenchmarkKind {
        self.kind
    }

    /// Wall-clock time spent training.
    #[must_use]
    pub const fn training(&self) -> Duration {
        self.training
    }

    /// Wall-clock time spent on inference.
    #[must_use]
    pub const fn inference(&self) -> Duration {
        self.inference
    }

    /// Post-hoc quality metric.
    #[must_use]
    pub const fn quality(&self) -> Quality {
        self.quality
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{REPORT_PREFIX} - {}:", self.kind.model_name())?;
        writeln!(
            f,
            "Training Time: {:.6} seconds",
            self.training.as_secs_f64()
        )?;
        writeln!(
            f,
            "Inference Time: {:.6} seconds",
            self.inference.as_secs_f64()
        )?;
        writeln!(f)
    }
}

/// A validated benchmark configuration, produced by
/// [`BenchmarkBuilder::build`](crate::BenchmarkBuilder::build).
///
/// # Examples
/// ```
/// use mlbench_core::{BenchmarkBuilder, BenchmarkKind};
///
/// let benchmark = BenchmarkBuilder::new(BenchmarkKind::LinearRegression)
///     .with_samples(200)
///     .build()
///     .expect("configuration is valid");
/// let report = benchmark.run().expect("run succeeds");
/// assert_eq!(report.kind(), BenchmarkKind::LinearRegression);
/// assert!(report.to_string().starts_with("Rust (mlbench) - Linear Regression:"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Benchmark {
    kind: BenchmarkKind,
    samples: usize,
    features: usize,
    classes: Option<usize>,
    seed: u64,
    dataset: KMeansDataset,
}

impl Benchmark {
    pub(crate) const fn new(
        kind: BenchmarkKind,
        samples: usize,
        features: usize,
        classes: Option<usize>,
        seed: u64,
        dataset: KMeansDataset,
    ) -> Self {
        Self {
            kind,
            samples,
            features,
            classes,
            seed,
            dataset,
        }
    }

    /// Which benchmark this is.
    #[must_use]
    pub const fn kind(&self) -> BenchmarkKind {
        self.kind
    }

    /// Rows generated.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Columns generated.
    #[must_use]
    pub const fn features(&self) -> usize {
        self.features
    }

    /// Clusters or classes, when the benchmark has them.
    #[must_use]
    pub const fn classes(&self) -> Option<usize> {
        self.classes
    }

    /// Seed for data generation and weight initialisation.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Dataset used by the k-means benchmark.
    #[must_use]
    pub const fn dataset(&self) -> KMeansDataset {
        self.dataset
    }

    const fn synthetic_config(&self) -> SyntheticConfig {
        SyntheticConfig::new(self.samples, self.features).with_seed(self.seed)
    }

    const fn class_count(&self) -> usize {
        match self.classes {
            Some(classes) => classes,
            None => 0,
        }
    }

    /// Generates data, trains, runs inference, and reports the timings. Kernel
    /// models also record their kernel, and k-means its pass count, on the
    /// `benchmark.run` span.
    ///
    /// # Errors
    /// Returns [`BenchmarkError::Dataset`] when the synthetic data cannot be
    /// generated or split and [`BenchmarkError::Model`] when training or
    /// inference fails, for example on a singular normal-equation matrix.
    #[instrument(
        name = "benchmark.run",
        err,
        skip(self),
        fields(
            kind = %self.kind,
            samples = self.samples,
            features = self.features,
            seed = self.seed,
            kernel = field::Empty,
            passes = field::Empty,
        ),
    )]
    pub fn run(&self) -> Result<BenchmarkReport> {
        let report = match self.kind {
            BenchmarkKind::KMeans => self.run_kmeans(),
            BenchmarkKind::LinearRegression => self.run_linear_regression(),
            BenchmarkKind::Mlp => self.run_mlp(),
            BenchmarkKind::Svm => self.run_svm(),
        }?;
        info!(
            training_seconds = report.training.as_secs_f64(),
            inference_seconds = report.inference.as_secs_f64(),
            quality = %report.quality,
            "benchmark finished"
        );
        Ok(report)
    }

    fn run_kmeans(&self) -> Result<BenchmarkReport> {
        let clusters = self.class_count();
        let (features, truth) = match self.dataset {
            KMeansDataset::Uniform => (
                uniform_features(&self.synthetic_config()).map_err(dataset_error(self.kind))?,
                None,
            ),
            KMeansDataset::Blobs => {
                let mut config = BlobConfig::new(self.samples, self.features, clusters);
                config.seed = self.seed;
                let blobs = BlobData::generate(&config).map_err(dataset_error(self.kind))?;
                (blobs.features, Some(blobs.labels))
            }
        };
        let params = KernelKMeansParams {
            clusters,
            ..KernelKMeansParams::default()
        };

        let (model, training) = time_phase("training", || {
            KernelKMeans::fit_from_leading_rows(params, features.view())
        });
        let model = model.map_err(model_error(self.kind))?;
        Span::current()
            .record("kernel", model.params().kernel.name())
            .record("passes", model.passes());
        let (assignments, inference) =
            time_phase("inference", || model.predict_all(features.view()));
        let assignments = assignments.map_err(model_error(self.kind))?;

        let clusters_found = assignments.iter().collect::<HashSet<_>>().len();
        let adjusted_rand_index = truth
            .map(|labels| adjusted_rand_index(&labels, &assignments))
            .transpose()
            .map_err(model_error(self.kind))?;
        Ok(BenchmarkReport::new(
            self.kind,
            training,
            inference,
            Quality::Clustering {
                clusters_found,
                adjusted_rand_index,
            },
        ))
    }

    fn run_linear_regression(&self) -> Result<BenchmarkReport> {
        let data = RegressionData::generate(&self.synthetic_config())
            .map_err(dataset_error(self.kind))?;
        let split = data
            .split(DEFAULT_TRAIN_FRACTION)
            .map_err(dataset_error(self.kind))?;

        let (model, training) = time_phase("training", || {
            OrdinaryLeastSquares::fit(
                OlsParams::default(),
                split.train.features.view(),
                split.train.targets.view(),
            )
        });
        let model = model.map_err(model_error(self.kind))?;
        let (predictions, inference) =
            time_phase("inference", || model.predict(split.test.features.view()));
        let predictions = predictions.map_err(model_error(self.kind))?;

        let truth = split.test.targets.view();
        let quality = Quality::Regression {
            r2: r2_score(truth, predictions.view()).map_err(model_error(self.kind))?,
            mse: mean_squared_error(truth, predictions.view()).map_err(model_error(self.kind))?,
        };
        Ok(BenchmarkReport::new(self.kind, training, inference, quality))
    }

    fn run_mlp(&self) -> Result<BenchmarkReport> {
        let classes = self.class_count();
        let data = ClassificationData::generate(&self.synthetic_config(), classes)
            .map_err(dataset_error(self.kind))?;
        let split = data
            .split(DEFAULT_TRAIN_FRACTION)
            .map_err(dataset_error(self.kind))?;
        let params = MlpParams {
            seed: self.seed,
            ..MlpParams::default()
        };

        let (model, training) = time_phase("training", || {
            Mlp::fit(
                &params,
                split.train.features.view(),
                &split.train.targets,
                classes,
            )
        });
        let model = model.map_err(model_error(self.kind))?;
        let (predictions, inference) =
            time_phase("inference", || model.predict(split.test.features.view()));
        let predictions = predictions.map_err(model_error(self.kind))?;

        let quality = Quality::Classification {
            accuracy: accuracy(&split.test.targets, &predictions).map_err(model_error(self.kind))?,
        };
        Ok(BenchmarkReport::new(self.kind, training, inference, quality))
    }

    fn run_svm(&self) -> Result<BenchmarkReport> {
        let classes = self.class_count();
        let data = ClassificationData::generate(&self.synthetic_config(), classes)
            .map_err(dataset_error(self.kind))?;
        let split = data
            .split(DEFAULT_TRAIN_FRACTION)
            .map_err(dataset_error(self.kind))?;

        let (model, training) = time_phase("training", || {
            Svc::fit(
                SvcParams::default(),
                split.train.features.view(),
                &split.train.targets,
                classes,
            )
        });
        let model = model.map_err(model_error(self.kind))?;
        Span::current().record("kernel", model.params().kernel.name());
        let (predictions, inference) =
            time_phase("inference", || model.predict(split.test.features.view()));
        let predictions = predictions.map_err(model_error(self.kind))?;

        let quality = Quality::Classification {
            accuracy: accuracy(&split.test.targets, &predictions).map_err(model_error(self.kind))?,
        };
        Ok(BenchmarkReport::new(self.kind, training, inference, quality))
    }
}

fn dataset_error(kind: BenchmarkKind) -> impl Fn(DatasetError) -> BenchmarkError {
    move |error| BenchmarkError::Dataset { kind, error }
}

fn model_error(kind: BenchmarkKind) -> impl Fn(ModelError) -> BenchmarkError {
    move |error| BenchmarkError::Model { kind, error }
}
