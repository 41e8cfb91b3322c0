//! mlbench core library.
//!
//! Synthetic data, four classical models implemented over `ndarray`, and the
//! orchestration that times their training and inference.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod benchmark;
mod builder;
pub mod data;
mod error;
mod kernel;
pub mod kmeans;
pub mod linear;
pub mod metrics;
pub mod mlp;
pub mod svm;
mod timing;
mod validation;

pub use crate::{
    benchmark::{Benchmark, BenchmarkKind, BenchmarkReport, Quality, REPORT_PREFIX},
    builder::{BenchmarkBuilder, KMeansDataset},
    error::{
        BenchmarkError, BenchmarkErrorCode, DatasetError, DatasetErrorCode, ModelError,
        ModelErrorCode, Result,
    },
    kernel::{DEFAULT_GAMMA, Kernel},
    timing::{Stopwatch, time_phase},
};
