//! Builder utilities for configuring benchmarks.
//!
//! Exposes the override surface used by the command line and the validation
//! performed before a [`Benchmark`] is constructed.

use crate::{
    Result,
    benchmark::{Benchmark, BenchmarkKind},
    data::{DEFAULT_SEED, DEFAULT_TRAIN_FRACTION, REGRESSION_SIGNAL_FEATURES, SplitSizes},
    error::BenchmarkError,
};

/// Data the k-means benchmark clusters.
///
/// # Examples
/// ```
/// use mlbench_core::KMeansDataset;
///
/// assert_eq!(KMeansDataset::default(), KMeansDataset::Uniform);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum KMeansDataset {
    /// Values drawn uniformly from `[0, 1)`.
    #[default]
    Uniform,
    /// Gaussian blobs, one per cluster, so the result can be scored against
    /// the generating labels.
    Blobs,
}

/// Configures and constructs [`Benchmark`] instances.
///
/// # Examples
/// ```
/// use mlbench_core::{BenchmarkBuilder, BenchmarkKind};
///
/// let benchmark = BenchmarkBuilder::new(BenchmarkKind::Svm)
///     .with_samples(60)
///     .with_seed(7)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(benchmark.samples(), 60);
/// assert_eq!(benchmark.features(), 4);
/// assert_eq!(benchmark.seed(), 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BenchmarkBuilder {
    kind: BenchmarkKind,
    samples: usize,
    features: usize,
    classes: Option<usize>,
    seed: u64,
    dataset: KMeansDataset,
}

impl BenchmarkBuilder {
    /// Creates a builder populated with the benchmark's default shape.
    ///
    /// # Examples
    /// ```
    /// use mlbench_core::{BenchmarkBuilder, BenchmarkKind};
    ///
    /// let builder = BenchmarkBuilder::new(BenchmarkKind::KMeans);
    /// assert_eq!(builder.samples(), 10_000);
    /// assert_eq!(builder.classes(), Some(5));
    /// ```
    #[must_use]
    pub const fn new(kind: BenchmarkKind) -> Self {
        Self {
            kind,
            samples: kind.default_samples(),
            features: kind.default_features(),
            classes: kind.default_classes(),
            seed: DEFAULT_SEED,
            dataset: KMeansDataset::Uniform,
        }
    }

    /// Overrides the number of generated rows.
    #[must_use]
    pub const fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Overrides the number of generated columns.
    #[must_use]
    pub const fn with_features(mut self, features: usize) -> Self {
        self.features = features;
        self
    }

    /// Overrides the cluster count (k-means) or class count (MLP, SVM).
    #[must_use]
    pub const fn with_classes(mut self, classes: usize) -> Self {
        self.classes = Some(classes);
        self
    }

    /// Overrides the seed used for data generation and initialisation.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Selects the k-means dataset.
    ///
    /// # Examples
    /// ```
    /// use mlbench_core::{BenchmarkBuilder, BenchmarkKind, KMeansDataset};
    ///
    /// let builder = BenchmarkBuilder::new(BenchmarkKind::KMeans).with_dataset(KMeansDataset::Blobs);
    /// assert_eq!(builder.dataset(), KMeansDataset::Blobs);
    /// ```
    #[must_use]
    pub const fn with_dataset(mut self, dataset: KMeansDataset) -> Self {
        self.dataset = dataset;
        self
    }

    /// Benchmark being configured.
    #[must_use]
    pub const fn kind(&self) -> BenchmarkKind {
        self.kind
    }

    /// Configured row count.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Configured column count.
    #[must_use]
    pub const fn features(&self) -> usize {
        self.features
    }

    /// Configured cluster or class count.
    #[must_use]
    pub const fn classes(&self) -> Option<usize> {
        self.classes
    }

    /// Configured seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Configured k-means dataset.
    #[must_use]
    pub const fn dataset(&self) -> KMeansDataset {
        self.dataset
    }

    const fn reject(&self, parameter: &'static str, reason: &'static str) -> BenchmarkError {
        BenchmarkError::InvalidConfiguration {
            kind: self.kind,
            parameter,
            reason,
        }
    }

    /// Validates the configuration and constructs a [`Benchmark`].
    ///
    /// # Errors
    /// Returns [`BenchmarkError::InvalidConfiguration`] when a count is zero,
    /// linear regression is given fewer than three features or a class
    /// count, k-means is asked for more clusters than samples, a split would
    /// leave either side empty, or the blob dataset is requested for anything
    /// but k-means.
    ///
    /// # Examples
    /// ```
    /// use mlbench_core::{BenchmarkBuilder, BenchmarkErrorCode, BenchmarkKind};
    ///
    /// let err = BenchmarkBuilder::new(BenchmarkKind::Mlp)
    ///     .with_classes(0)
    ///     .build()
    ///     .expect_err("zero classes are rejected");
    /// assert_eq!(err.code(), BenchmarkErrorCode::InvalidConfiguration);
    /// ```
    pub fn build(self) -> Result<Benchmark> {
        if self.samples == 0 {
            return Err(self.reject("samples", "must be greater than zero"));
        }
        if self.features == 0 {
            return Err(self.reject("features", "must be greater than zero"));
        }
        match (self.kind, self.classes) {
            (BenchmarkKind::LinearRegression, Some(_)) => {
                return Err(self.reject("classes", "does not apply to linear regression"));
            }
            (_, Some(0)) => return Err(self.reject("classes", "must be greater than zero")),
            (BenchmarkKind::KMeans, Some(clusters)) if clusters > self.samples => {
                return Err(self.reject("classes", "must not exceed the number of samples"));
            }
            _ => {}
        }
        if matches!(self.kind, BenchmarkKind::LinearRegression)
            && self.features < REGRESSION_SIGNAL_FEATURES
        {
            return Err(self.reject(
                "features",
                "must be at least 3 to carry the regression signal",
            ));
        }
        if self.kind.splits() && SplitSizes::new(self.samples, DEFAULT_TRAIN_FRACTION).is_err() {
            return Err(self.reject(
                "samples",
                "must leave at least one row on each side of the train/test split",
            ));
        }
        if !matches!(self.kind, BenchmarkKind::KMeans) && self.dataset != KMeansDataset::Uniform {
            return Err(self.reject("dataset", "only applies to k-means"));
        }

        Ok(Benchmark::new(
            self.kind,
            self.samples,
            self.features,
            self.classes,
            self.seed,
            self.dataset,
        ))
    }
}
