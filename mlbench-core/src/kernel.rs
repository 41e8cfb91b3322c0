//! Kernel functions shared by kernel k-means and the support-vector classifier.

use ndarray::ArrayView1;

use crate::error::ModelError;

/// Bandwidth used by the k-means and SVM benchmarks.
pub const DEFAULT_GAMMA: f64 = 0.1;

/// Similarity measure between two samples.
///
/// # Examples
/// ```
/// use mlbench_core::Kernel;
/// use ndarray::array;
///
/// let kernel = Kernel::Rbf { gamma: 0.5 };
/// let a = array![0.0, 0.0];
/// let b = array![1.0, 1.0];
/// assert!((kernel.evaluate(a.view(), a.view()) - 1.0).abs() < 1e-12);
/// assert!((kernel.evaluate(a.view(), b.view()) - (-1.0_f64).exp()).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Kernel {
    /// Plain dot product.
    Linear,
    /// Radial basis function `exp(−γ‖a−b‖²)`.
    Rbf {
        /// Bandwidth `γ`; must be finite and positive.
        gamma: f64,
    },
}

impl Default for Kernel {
    fn default() -> Self {
        Self::Rbf {
            gamma: DEFAULT_GAMMA,
        }
    }
}

impl Kernel {
    /// Checks the kernel parameters.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] for a non-finite or
    /// non-positive `gamma`.
    pub fn validate(self) -> Result<Self, ModelError> {
        match self {
            Self::Rbf { gamma } if !gamma.is_finite() || gamma <= 0.0 => {
                Err(ModelError::InvalidParameter { parameter: "gamma" })
            }
            _ => Ok(self),
        }
    }

    /// Evaluates the kernel on two equally sized samples.
    #[must_use]
    pub fn evaluate(self, left: ArrayView1<'_, f64>, right: ArrayView1<'_, f64>) -> f64 {
        match self {
            Self::Linear => left.dot(&right),
            Self::Rbf { gamma } => {
                let squared = left
                    .iter()
                    .zip(right.iter())
                    .fold(0.0_f64, |acc, (a, b)| {
                        let diff = a - b;
                        acc + diff * diff
                    });
                (-gamma * squared).exp()
            }
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Rbf { .. } => "rbf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    fn rbf_is_symmetric_and_bounded() {
        let kernel = Kernel::default();
        let a = array![0.2, 0.4, 0.9];
        let b = array![0.7, 0.1, 0.3];
        let ab = kernel.evaluate(a.view(), b.view());
        let ba = kernel.evaluate(b.view(), a.view());
        assert!((ab - ba).abs() < f64::EPSILON);
        assert!(ab > 0.0 && ab <= 1.0);
    }

    #[rstest]
    fn linear_is_dot_product() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![4.0, 5.0, 6.0];
        assert!((Kernel::Linear.evaluate(a.view(), b.view()) - 32.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn rejects_invalid_gamma(#[case] gamma: f64) {
        let err = Kernel::Rbf { gamma }
            .validate()
            .expect_err("gamma must be rejected");
        assert_eq!(err, ModelError::InvalidParameter { parameter: "gamma" });
    }

    #[rstest]
    fn default_kernel_uses_benchmark_bandwidth() {
        assert_eq!(Kernel::default(), Kernel::Rbf { gamma: 0.1 });
        assert_eq!(Kernel::default().name(), "rbf");
    }
}
