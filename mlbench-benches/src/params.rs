//! Benchmark parameter types.
//!
//! Group the dataset shape of a run so it can be passed to the setup helpers
//! and rendered as a Criterion parameter label.

use std::fmt;

/// Seed used for all synthetic data generation in the benchmarks.
pub const SEED: u64 = 42;

/// Shape of an unlabelled or regression dataset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DatasetParams {
    /// Number of generated rows.
    pub samples: usize,
    /// Number of generated feature columns.
    pub features: usize,
}

impl fmt::Display for DatasetParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},d={}", self.samples, self.features)
    }
}

/// Shape of a labelled classification dataset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClassifierBenchParams {
    /// Number of generated rows.
    pub samples: usize,
    /// Number of generated feature columns.
    pub features: usize,
    /// Number of classes labels are drawn from.
    pub classes: usize,
}

impl fmt::Display for ClassifierBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},d={},k={}",
            self.samples, self.features, self.classes
        )
    }
}
