//! Error types for the mlbench core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::benchmark::BenchmarkKind;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while generating or splitting synthetic datasets.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DatasetError {
    /// The requested sample count was zero.
    #[error("sample count must be greater than zero")]
    ZeroSamples,
    /// The requested feature count was zero.
    #[error("feature count must be greater than zero")]
    ZeroFeatures,
    /// The requested class or centre count was zero.
    #[error("class count must be greater than zero")]
    ZeroClasses,
    /// The generator needs more feature columns than were requested.
    #[error("generator requires at least {required} features (got {actual})")]
    InsufficientFeatures {
        /// Minimum number of features the generator reads.
        required: usize,
        /// Number of features configured.
        actual: usize,
    },
    /// More blob centres were requested than samples.
    #[error("centre count ({centers}) must not exceed sample count ({samples})")]
    CentersExceedSamples {
        /// Number of centres requested.
        centers: usize,
        /// Number of samples requested.
        samples: usize,
    },
    /// The requested `samples * features` overflowed `usize`.
    #[error("samples * features overflows usize")]
    Overflow,
    /// A floating-point generator parameter was invalid.
    #[error("invalid floating-point parameter `{parameter}`")]
    InvalidFloatParameter {
        /// Name of the invalid parameter.
        parameter: &'static str,
    },
    /// A train/test split left one side without rows.
    #[error("splitting {samples} samples leaves train={train}, test={test}; both must be non-empty")]
    EmptySplit {
        /// Number of samples being split.
        samples: usize,
        /// Rows assigned to the training side.
        train: usize,
        /// Rows assigned to the held-out side.
        test: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`DatasetError`] variants.
    enum DatasetErrorCode for DatasetError {
        /// The requested sample count was zero.
        ZeroSamples => ZeroSamples => "DATASET_ZERO_SAMPLES",
        /// The requested feature count was zero.
        ZeroFeatures => ZeroFeatures => "DATASET_ZERO_FEATURES",
        /// The requested class or centre count was zero.
        ZeroClasses => ZeroClasses => "DATASET_ZERO_CLASSES",
        /// The generator needs more feature columns than were requested.
        InsufficientFeatures => InsufficientFeatures { .. } => "DATASET_INSUFFICIENT_FEATURES",
        /// More blob centres were requested than samples.
        CentersExceedSamples => CentersExceedSamples { .. } => "DATASET_CENTERS_EXCEED_SAMPLES",
        /// The requested `samples * features` overflowed `usize`.
        Overflow => Overflow => "DATASET_OVERFLOW",
        /// A floating-point generator parameter was invalid.
        InvalidFloatParameter => InvalidFloatParameter { .. } => "DATASET_INVALID_FLOAT_PARAMETER",
        /// A train/test split left one side without rows.
        EmptySplit => EmptySplit { .. } => "DATASET_EMPTY_SPLIT",
    }
}

/// An error produced while fitting or evaluating a model.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ModelError {
    /// The model was given no rows to work with.
    #[error("{context} requires at least one row")]
    EmptyInput {
        /// Operation that received the empty input.
        context: &'static str,
    },
    /// Two inputs disagreed on a dimension.
    #[error("{context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Description of the mismatched dimension.
        context: &'static str,
        /// Dimension the model expected.
        expected: usize,
        /// Dimension that was supplied.
        actual: usize,
    },
    /// `XᵗX` could not be inverted.
    #[error("normal-equation matrix of order {order} is singular")]
    SingularMatrix {
        /// Order of the square matrix that failed to invert.
        order: usize,
    },
    /// A hyper-parameter was outside its valid range.
    #[error("invalid hyper-parameter `{parameter}`")]
    InvalidParameter {
        /// Name of the offending hyper-parameter.
        parameter: &'static str,
    },
    /// Clustering was asked for more clusters than there are samples.
    #[error("cannot form {clusters} clusters from {samples} samples")]
    TooFewSamples {
        /// Requested number of clusters.
        clusters: usize,
        /// Available number of samples.
        samples: usize,
    },
    /// A class label was outside `[0, classes)`.
    #[error("label {label} is outside the valid range [0, {classes})")]
    LabelOutOfRange {
        /// Offending label.
        label: usize,
        /// Number of classes the model was configured with.
        classes: usize,
    },
    /// Training produced a non-finite loss.
    #[error("training diverged at epoch {epoch}")]
    Diverged {
        /// Epoch (zero-based) in which the loss stopped being finite.
        epoch: usize,
    },
    /// The support-vector solver rejected a pairwise problem.
    #[error("solver failed for classes {positive} vs {negative}: {message}")]
    SolverFailed {
        /// Class mapped to the positive side.
        positive: usize,
        /// Class mapped to the negative side.
        negative: usize,
        /// Solver's own description of the failure.
        message: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`ModelError`] variants.
    enum ModelErrorCode for ModelError {
        /// The model was given no rows to work with.
        EmptyInput => EmptyInput { .. } => "MODEL_EMPTY_INPUT",
        /// Two inputs disagreed on a dimension.
        ShapeMismatch => ShapeMismatch { .. } => "MODEL_SHAPE_MISMATCH",
        /// `XᵗX` could not be inverted.
        SingularMatrix => SingularMatrix { .. } => "MODEL_SINGULAR_MATRIX",
        /// A hyper-parameter was outside its valid range.
        InvalidParameter => InvalidParameter { .. } => "MODEL_INVALID_PARAMETER",
        /// Clustering was asked for more clusters than there are samples.
        TooFewSamples => TooFewSamples { .. } => "MODEL_TOO_FEW_SAMPLES",
        /// A class label was outside `[0, classes)`.
        LabelOutOfRange => LabelOutOfRange { .. } => "MODEL_LABEL_OUT_OF_RANGE",
        /// Training produced a non-finite loss.
        Diverged => Diverged { .. } => "MODEL_DIVERGED",
        /// The support-vector solver rejected a pairwise problem.
        SolverFailed => SolverFailed { .. } => "MODEL_SOLVER_FAILED",
    }
}

/// Error type produced when configuring or running a [`crate::Benchmark`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BenchmarkError {
    /// A builder override was rejected.
    #[error("invalid {kind} configuration: `{parameter}` {reason}")]
    InvalidConfiguration {
        /// Benchmark whose configuration was rejected.
        kind: BenchmarkKind,
        /// Name of the offending setting.
        parameter: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// Synthetic data generation or splitting failed.
    #[error("{kind} dataset preparation failed: {error}")]
    Dataset {
        /// Benchmark that was preparing data.
        kind: BenchmarkKind,
        /// Underlying dataset error.
        #[source]
        error: DatasetError,
    },
    /// Model training or inference failed.
    #[error("{kind} model failed: {error}")]
    Model {
        /// Benchmark whose model failed.
        kind: BenchmarkKind,
        /// Underlying model error.
        #[source]
        error: ModelError,
    },
}

define_error_codes! {
    /// Stable codes describing [`BenchmarkError`] variants.
    enum BenchmarkErrorCode for BenchmarkError {
        /// A builder override was rejected.
        InvalidConfiguration => InvalidConfiguration { .. } => "BENCHMARK_INVALID_CONFIGURATION",
        /// Synthetic data generation or splitting failed.
        DatasetFailure => Dataset { .. } => "BENCHMARK_DATASET_FAILURE",
        /// Model training or inference failed.
        ModelFailure => Model { .. } => "BENCHMARK_MODEL_FAILURE",
    }
}

impl BenchmarkError {
    /// Retrieve the inner [`DatasetErrorCode`] when the error originated while
    /// preparing data.
    #[must_use]
    pub const fn dataset_code(&self) -> Option<DatasetErrorCode> {
        match self {
            Self::Dataset { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`ModelErrorCode`] when the error originated in a
    /// model.
    #[must_use]
    pub const fn model_code(&self) -> Option<ModelErrorCode> {
        match self {
            Self::Model { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns the benchmark that produced this error.
    #[must_use]
    pub const fn kind(&self) -> BenchmarkKind {
        match self {
            Self::InvalidConfiguration { kind, .. }
            | Self::Dataset { kind, .. }
            | Self::Model { kind, .. } => *kind,
        }
    }
}

/// Convenient alias for results returned by the orchestration API.
pub type Result<T> = core::result::Result<T, BenchmarkError>;
