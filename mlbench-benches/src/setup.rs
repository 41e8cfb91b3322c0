//! Dataset preparation shared by the Criterion benchmarks.
//!
//! Each helper generates data with [`SEED`] and, where the benchmark measures
//! held-out inference, applies the default 80/20 split.

use mlbench_core::data::{
    ClassificationData, DEFAULT_TRAIN_FRACTION, RegressionData, SyntheticConfig, TrainTestSplit,
    uniform_features,
};
use ndarray::{Array1, Array2};

use crate::{
    error::BenchSetupError,
    params::{ClassifierBenchParams, DatasetParams, SEED},
};

const fn config(samples: usize, features: usize) -> SyntheticConfig {
    SyntheticConfig::new(samples, features).with_seed(SEED)
}

/// Uniform `[0, 1)` matrix clustered by the k-means benchmarks.
///
/// # Errors
/// Returns [`BenchSetupError::Dataset`] when the shape is empty or overflows.
pub fn uniform_matrix(params: DatasetParams) -> Result<Array2<f64>, BenchSetupError> {
    Ok(uniform_features(&config(params.samples, params.features))?)
}

/// Split regression dataset for the linear regression benchmarks.
///
/// # Errors
/// Returns [`BenchSetupError::Dataset`] when the shape cannot carry the
/// regression signal or the split leaves a side empty.
pub fn regression_split(
    params: DatasetParams,
) -> Result<TrainTestSplit<Array1<f64>>, BenchSetupError> {
    let data = RegressionData::generate(&config(params.samples, params.features))?;
    Ok(data.split(DEFAULT_TRAIN_FRACTION)?)
}

/// Split classification dataset for the MLP and SVM benchmarks.
///
/// # Errors
/// Returns [`BenchSetupError::Dataset`] when the shape or class count is
/// empty or the split leaves a side empty.
pub fn classification_split(
    params: ClassifierBenchParams,
) -> Result<TrainTestSplit<Vec<usize>>, BenchSetupError> {
    let data =
        ClassificationData::generate(&config(params.samples, params.features), params.classes)?;
    Ok(data.split(DEFAULT_TRAIN_FRACTION)?)
}
