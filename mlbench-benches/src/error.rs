//! Benchmark setup error type.
//!
//! Aggregates the errors that may arise while preparing benchmark inputs so
//! setup functions can propagate failures with `?` instead of using
//! `.expect()`.

use mlbench_core::{DatasetError, ModelError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation or splitting failed.
    #[error("synthetic data generation failed: {0}")]
    Dataset(#[from] DatasetError),
    /// Fitting the model needed by an inference benchmark failed.
    #[error("model preparation failed: {0}")]
    Model(#[from] ModelError),
}
