//! Ordinary least squares via the normal equations.
//!
//! Weights are the closed-form `w = (XᵗX)⁻¹Xᵗy`. There is no regularisation;
//! a singular `XᵗX` is reported as [`ModelError::SingularMatrix`].

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2};
use tracing::{debug, instrument};

use crate::error::ModelError;

/// Options for [`OrdinaryLeastSquares::fit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OlsParams {
    /// Appends a constant column so the fit carries its own intercept.
    pub fit_intercept: bool,
}

impl Default for OlsParams {
    fn default() -> Self {
        Self {
            fit_intercept: true,
        }
    }
}

/// A fitted linear model.
///
/// # Examples
/// ```
/// use mlbench_core::linear::{OlsParams, OrdinaryLeastSquares};
/// use ndarray::array;
///
/// let x = array![[0.0], [1.0], [2.0], [3.0]];
/// let y = array![1.0, 3.0, 5.0, 7.0];
/// let model = OrdinaryLeastSquares::fit(OlsParams::default(), x.view(), y.view())
///     .expect("fit succeeds");
/// assert!((model.weights()[0] - 2.0).abs() < 1e-9);
/// assert!((model.intercept() - 1.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct OrdinaryLeastSquares {
    weights: Array1<f64>,
    intercept: f64,
}

impl OrdinaryLeastSquares {
    /// Solves the normal equations for `x` and `y`.
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyInput`] when `x` has no rows or columns,
    /// [`ModelError::ShapeMismatch`] when `y` and `x` disagree on the row
    /// count, and [`ModelError::SingularMatrix`] when `XᵗX` cannot be
    /// inverted.
    #[instrument(
        name = "linear.fit",
        err,
        skip(x, y),
        fields(rows = x.nrows(), features = x.ncols(), fit_intercept = params.fit_intercept),
    )]
    pub fn fit(
        params: OlsParams,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> Result<Self, ModelError> {
        let (rows, features) = x.dim();
        if rows == 0 || features == 0 {
            return Err(ModelError::EmptyInput {
                context: "least-squares fit",
            });
        }
        if y.len() != rows {
            return Err(ModelError::ShapeMismatch {
                context: "target count",
                expected: rows,
                actual: y.len(),
            });
        }

        let order = if params.fit_intercept {
            features + 1
        } else {
            features
        };
        if rows < order {
            return Err(ModelError::SingularMatrix { order });
        }

        let design = DMatrix::from_fn(rows, order, |row, col| {
            x.get((row, col)).copied().unwrap_or(1.0)
        });
        let target = DVector::from_iterator(rows, y.iter().copied());
        let transposed = design.transpose();
        let gram = &transposed * &design;
        let inverse = gram
            .try_inverse()
            .ok_or(ModelError::SingularMatrix { order })?;
        let solution = inverse * (&transposed * &target);
        if solution.iter().any(|value| !value.is_finite()) {
            return Err(ModelError::SingularMatrix { order });
        }

        let weights: Array1<f64> = solution.iter().take(features).copied().collect();
        let intercept = if params.fit_intercept {
            solution.get(features).copied().unwrap_or_default()
        } else {
            0.0
        };
        debug!(intercept, "solved normal equations");
        Ok(Self { weights, intercept })
    }

    /// Applies the weights to every row of `x`.
    ///
    /// # Errors
    /// Returns [`ModelError::ShapeMismatch`] when `x` has a different number
    /// of columns than the training data.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.weights.len() {
            return Err(ModelError::ShapeMismatch {
                context: "feature count",
                expected: self.weights.len(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&self.weights) + self.intercept)
    }

    /// Fitted per-feature weights.
    #[must_use]
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// Fitted intercept; zero when fitted without one.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{Array2, array};
    use rstest::rstest;

    use crate::data::{DEFAULT_TRAIN_FRACTION, RegressionData, SyntheticConfig};

    #[rstest]
    #[case::housing_shape(506)]
    #[case::minimum(125)]
    fn recovers_generating_coefficients(#[case] samples: usize) {
        let data = RegressionData::generate(&SyntheticConfig::new(samples, 13))
            .expect("generation must succeed");
        let split = data.split(DEFAULT_TRAIN_FRACTION).expect("split must succeed");
        assert!(split.train.len() >= 100);
        let model = OrdinaryLeastSquares::fit(
            OlsParams::default(),
            split.train.features.view(),
            split.train.targets.view(),
        )
        .expect("fit must succeed");

        let weights = model.weights();
        for (index, expected) in [3.0, 2.0, 1.0].into_iter().enumerate() {
            assert!(
                (weights[index] - expected).abs() < 0.1,
                "w{index}={} expected {expected}",
                weights[index]
            );
        }
        for noise in weights.iter().skip(3) {
            assert!(noise.abs() < 0.1, "irrelevant weight {noise}");
        }
        assert!((model.intercept() - 0.5).abs() < 0.1);
    }

    #[rstest]
    fn predictions_match_held_out_targets() {
        let data =
            RegressionData::generate(&SyntheticConfig::new(506, 13)).expect("generation must succeed");
        let split = data.split(DEFAULT_TRAIN_FRACTION).expect("split must succeed");
        let model = OrdinaryLeastSquares::fit(
            OlsParams::default(),
            split.train.features.view(),
            split.train.targets.view(),
        )
        .expect("fit must succeed");
        let predictions = model
            .predict(split.test.features.view())
            .expect("predict must succeed");
        assert_eq!(predictions.len(), split.test.len());
        for (predicted, actual) in predictions.iter().zip(split.test.targets.iter()) {
            assert!((predicted - actual).abs() < 1e-6);
        }
    }

    #[rstest]
    fn fits_without_intercept() {
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let y = array![2.0, 3.0, 5.0];
        let model = OrdinaryLeastSquares::fit(
            OlsParams {
                fit_intercept: false,
            },
            x.view(),
            y.view(),
        )
        .expect("fit must succeed");
        assert!((model.weights()[0] - 2.0).abs() < 1e-9);
        assert!((model.weights()[1] - 3.0).abs() < 1e-9);
        assert!(model.intercept().abs() < f64::EPSILON);
    }

    #[rstest]
    fn duplicate_columns_are_singular() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let y = array![1.0, 2.0, 3.0];
        let err = OrdinaryLeastSquares::fit(
            OlsParams {
                fit_intercept: false,
            },
            x.view(),
            y.view(),
        )
        .expect_err("collinear columns must fail");
        assert_eq!(err, ModelError::SingularMatrix { order: 2 });
    }

    #[rstest]
    fn zero_column_is_singular_with_intercept() {
        let x = array![[0.0, 1.0], [0.0, 2.0], [0.0, 4.0], [0.0, 5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];
        let err = OrdinaryLeastSquares::fit(OlsParams::default(), x.view(), y.view())
            .expect_err("zero column must fail");
        assert_eq!(err, ModelError::SingularMatrix { order: 3 });
    }

    #[rstest]
    fn fewer_rows_than_unknowns_is_singular() {
        let x = Array2::<f64>::ones((2, 4));
        let y = array![1.0, 2.0];
        let err = OrdinaryLeastSquares::fit(OlsParams::default(), x.view(), y.view())
            .expect_err("underdetermined system must fail");
        assert_eq!(err, ModelError::SingularMatrix { order: 5 });
    }

    #[rstest]
    fn rejects_mismatched_targets() {
        let x = Array2::<f64>::ones((3, 2));
        let y = array![1.0, 2.0];
        let err = OrdinaryLeastSquares::fit(OlsParams::default(), x.view(), y.view())
            .expect_err("target count must match");
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                context: "target count",
                expected: 3,
                actual: 2
            }
        );
    }

    #[rstest]
    fn predict_rejects_wrong_width() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![0.0, 1.0, 2.0];
        let model = OrdinaryLeastSquares::fit(OlsParams::default(), x.view(), y.view())
            .expect("fit must succeed");
        let err = model
            .predict(Array2::<f64>::zeros((1, 2)).view())
            .expect_err("width must match");
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));
    }
}
