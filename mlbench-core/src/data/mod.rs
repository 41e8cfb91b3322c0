//! Synthetic datasets for the benchmarks.
//!
//! Every generator draws from a [`SmallRng`] seeded from the configuration so
//! a given seed reproduces the same matrix within one build. Reproducing the
//! values produced by other pseudo-random implementations is not attempted;
//! only the shape and value range are shared with them.

mod generation;
mod split;

use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{debug, instrument};

use crate::error::DatasetError;
use generation::{blob_centers, blob_point, validate_blob_config};

pub(crate) use generation::standard_normal_sample;
pub use split::{DEFAULT_TRAIN_FRACTION, Partition, SplitSizes, TrainTestSplit};

/// Seed shared by every benchmark unless overridden.
pub const DEFAULT_SEED: u64 = 42;

/// Number of leading feature columns the regression target reads.
pub const REGRESSION_SIGNAL_FEATURES: usize = 3;

/// Coefficients of the regression target `y = 3·x0 + 2·x1 + 1·x2 + 0.5`.
pub const REGRESSION_COEFFICIENTS: [f64; REGRESSION_SIGNAL_FEATURES] = [3.0, 2.0, 1.0];

/// Constant offset of the regression target.
pub const REGRESSION_INTERCEPT: f64 = 0.5;

/// Shape and seed of a uniformly distributed feature matrix.
///
/// # Examples
/// ```
/// use mlbench_core::data::{DEFAULT_SEED, SyntheticConfig};
///
/// let config = SyntheticConfig::new(10, 4);
/// assert_eq!(config.seed, DEFAULT_SEED);
/// assert_eq!(config.with_seed(7).seed, 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyntheticConfig {
    /// Number of rows to generate.
    pub samples: usize,
    /// Number of columns per row.
    pub features: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl SyntheticConfig {
    /// Creates a configuration using [`DEFAULT_SEED`].
    #[must_use]
    pub const fn new(samples: usize, features: usize) -> Self {
        Self {
            samples,
            features,
            seed: DEFAULT_SEED,
        }
    }

    /// Replaces the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), DatasetError> {
        if self.samples == 0 {
            return Err(DatasetError::ZeroSamples);
        }
        if self.features == 0 {
            return Err(DatasetError::ZeroFeatures);
        }
        self.samples
            .checked_mul(self.features)
            .ok_or(DatasetError::Overflow)?;
        Ok(())
    }
}

fn fill_row(rng: &mut SmallRng, row: ndarray::ArrayViewMut1<'_, f64>) {
    for value in row {
        *value = rng.gen_range(0.0_f64..1.0_f64);
    }
}

/// Generates a `samples × features` matrix of values in `[0, 1)`.
///
/// # Errors
/// Returns [`DatasetError::ZeroSamples`], [`DatasetError::ZeroFeatures`], or
/// [`DatasetError::Overflow`] for an unusable shape.
///
/// # Examples
/// ```
/// use mlbench_core::data::{SyntheticConfig, uniform_features};
///
/// let features = uniform_features(&SyntheticConfig::new(5, 3)).expect("valid shape");
/// assert_eq!(features.dim(), (5, 3));
/// assert!(features.iter().all(|value| (0.0..1.0).contains(value)));
/// ```
#[instrument(name = "data.uniform", err, skip(config), fields(samples = config.samples, features = config.features))]
pub fn uniform_features(config: &SyntheticConfig) -> Result<Array2<f64>, DatasetError> {
    config.validate()?;
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut features = Array2::<f64>::zeros((config.samples, config.features));
    for row in features.axis_iter_mut(Axis(0)) {
        fill_row(&mut rng, row);
    }
    Ok(features)
}

/// Uniform features with a noiseless linear target.
#[derive(Clone, Debug, PartialEq)]
pub struct RegressionData {
    /// Feature matrix, `samples × features`.
    pub features: Array2<f64>,
    /// Target per row: `3·x0 + 2·x1 + 1·x2 + 0.5`.
    pub targets: Array1<f64>,
}

impl RegressionData {
    /// Generates features and the linear target.
    ///
    /// # Errors
    /// Returns [`DatasetError::InsufficientFeatures`] when fewer than three
    /// features are requested, or any error from [`uniform_features`].
    ///
    /// # Examples
    /// ```
    /// use mlbench_core::data::{RegressionData, SyntheticConfig};
    ///
    /// let data = RegressionData::generate(&SyntheticConfig::new(4, 3)).expect("valid shape");
    /// let row = data.features.row(0);
    /// let expected = 3.0 * row[0] + 2.0 * row[1] + row[2] + 0.5;
    /// assert!((data.targets[0] - expected).abs() < 1e-12);
    /// ```
    pub fn generate(config: &SyntheticConfig) -> Result<Self, DatasetError> {
        if config.features < REGRESSION_SIGNAL_FEATURES {
            config.validate()?;
            return Err(DatasetError::InsufficientFeatures {
                required: REGRESSION_SIGNAL_FEATURES,
                actual: config.features,
            });
        }
        let features = uniform_features(config)?;
        let targets = features
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .zip(REGRESSION_COEFFICIENTS)
                    .fold(REGRESSION_INTERCEPT, |acc, (value, weight)| {
                        acc + weight * value
                    })
            })
            .collect::<Array1<f64>>();
        debug!(rows = targets.len(), "generated regression targets");
        Ok(Self { features, targets })
    }

    /// Splits rows contiguously into training and held-out partitions.
    ///
    /// # Errors
    /// Returns [`DatasetError::EmptySplit`] when either side would be empty.
    pub fn split(&self, train_fraction: f64) -> Result<TrainTestSplit<Array1<f64>>, DatasetError> {
        let sizes = SplitSizes::new(self.features.nrows(), train_fraction)?;
        Ok(TrainTestSplit::from_rows(
            &self.features,
            sizes,
            |range| self.targets.slice(ndarray::s![range]).to_owned(),
        ))
    }
}

/// Uniform features with a pseudo-random class per row.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationData {
    /// Feature matrix, `samples × features`.
    pub features: Array2<f64>,
    /// Class index per row, each in `[0, classes)`.
    pub labels: Vec<usize>,
    /// Number of classes labels are drawn from.
    pub classes: usize,
}

impl ClassificationData {
    /// Generates features and labels row by row: each row's features are
    /// drawn before its label, all from one generator.
    ///
    /// # Errors
    /// Returns [`DatasetError::ZeroClasses`] when `classes` is zero, or any
    /// shape error from [`SyntheticConfig`] validation.
    ///
    /// # Examples
    /// ```
    /// use mlbench_core::data::{ClassificationData, SyntheticConfig};
    ///
    /// let data = ClassificationData::generate(&SyntheticConfig::new(20, 4), 3)
    ///     .expect("valid shape");
    /// assert_eq!(data.labels.len(), 20);
    /// assert!(data.labels.iter().all(|&label| label < 3));
    /// ```
    #[instrument(name = "data.classification", err, skip(config), fields(samples = config.samples, features = config.features))]
    pub fn generate(config: &SyntheticConfig, classes: usize) -> Result<Self, DatasetError> {
        config.validate()?;
        if classes == 0 {
            return Err(DatasetError::ZeroClasses);
        }
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut features = Array2::<f64>::zeros((config.samples, config.features));
        let mut labels = Vec::with_capacity(config.samples);
        for row in features.axis_iter_mut(Axis(0)) {
            fill_row(&mut rng, row);
            labels.push(rng.gen_range(0..classes));
        }
        Ok(Self {
            features,
            labels,
            classes,
        })
    }

    /// Splits rows contiguously into training and held-out partitions.
    ///
    /// # Errors
    /// Returns [`DatasetError::EmptySplit`] when either side would be empty.
    pub fn split(&self, train_fraction: f64) -> Result<TrainTestSplit<Vec<usize>>, DatasetError> {
        let sizes = SplitSizes::new(self.features.nrows(), train_fraction)?;
        Ok(TrainTestSplit::from_rows(&self.features, sizes, |range| {
            self.labels.get(range).map(<[usize]>::to_vec).unwrap_or_default()
        }))
    }
}

/// Configuration for isotropic Gaussian blobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlobConfig {
    /// Number of points to generate.
    pub samples: usize,
    /// Dimensionality of each point.
    pub features: usize,
    /// Number of Gaussian blobs.
    pub centers: usize,
    /// Standard deviation of every blob along every axis.
    pub cluster_std: f64,
    /// Half-width of the box centres are drawn from, centred on the origin.
    pub center_box: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl BlobConfig {
    /// Creates a configuration with unit spread and centres in `[-10, 10)`.
    #[must_use]
    pub const fn new(samples: usize, features: usize, centers: usize) -> Self {
        Self {
            samples,
            features,
            centers,
            cluster_std: 1.0,
            center_box: 10.0,
            seed: DEFAULT_SEED,
        }
    }
}

/// Gaussian blob points and the blob each point was drawn from.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobData {
    /// Point matrix, `samples × features`.
    pub features: Array2<f64>,
    /// Blob index per row.
    pub labels: Vec<usize>,
}

impl BlobData {
    /// Draws points round-robin across the blobs so the first `centers` rows
    /// contain one point from each blob.
    ///
    /// # Errors
    /// Returns a [`DatasetError`] when the shape is unusable, `centers` is zero
    /// or exceeds `samples`, or a spread parameter is not finite and positive.
    ///
    /// # Examples
    /// ```
    /// use mlbench_core::data::{BlobConfig, BlobData};
    ///
    /// let blobs = BlobData::generate(&BlobConfig::new(30, 2, 3)).expect("valid config");
    /// assert_eq!(blobs.features.dim(), (30, 2));
    /// assert_eq!(&blobs.labels[..3], &[0, 1, 2]);
    /// ```
    #[instrument(name = "data.blobs", err, skip(config), fields(samples = config.samples, centers = config.centers))]
    pub fn generate(config: &BlobConfig) -> Result<Self, DatasetError> {
        SyntheticConfig {
            samples: config.samples,
            features: config.features,
            seed: config.seed,
        }
        .validate()?;
        validate_blob_config(config)?;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let centers = blob_centers(config, &mut rng);
        let mut features = Array2::<f64>::zeros((config.samples, config.features));
        let mut labels = Vec::with_capacity(config.samples);
        for (index, row) in features.axis_iter_mut(Axis(0)).enumerate() {
            let label = index % config.centers;
            let Some(center) = centers.get(label) else {
                return Err(DatasetError::ZeroClasses);
            };
            blob_point(center, config.cluster_std, &mut rng, row);
            labels.push(label);
        }
        Ok(Self { features, labels })
    }
}

#[cfg(test)]
mod tests;
