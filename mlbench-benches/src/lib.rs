//! Benchmark support crate for mlbench.
//!
//! Prepares the synthetic datasets and parameter labels used by the Criterion
//! benchmarks, which time each model's training and inference separately and
//! across several dataset sizes.

pub mod error;
pub mod params;
pub mod setup;
