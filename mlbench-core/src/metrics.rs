//! Post-hoc quality metrics.
//!
//! Benchmarks compute these outside the timed regions so a report can show
//! whether the trained model did something sensible.

use std::collections::HashMap;

use ndarray::ArrayView1;

use crate::error::ModelError;

fn check_lengths(expected: usize, actual: usize) -> Result<(), ModelError> {
    if expected != actual {
        return Err(ModelError::ShapeMismatch {
            context: "prediction count",
            expected,
            actual,
        });
    }
    if expected == 0 {
        return Err(ModelError::EmptyInput {
            context: "metric evaluation",
        });
    }
    Ok(())
}

/// Fraction of predictions equal to the truth.
///
/// # Errors
/// Returns [`ModelError::ShapeMismatch`] for slices of different lengths and
/// [`ModelError::EmptyInput`] when both are empty.
///
/// # Examples
/// ```
/// use mlbench_core::metrics::accuracy;
///
/// let score = accuracy(&[0, 1, 2, 2], &[0, 1, 1, 2]).expect("equal lengths");
/// assert!((score - 0.75).abs() < f64::EPSILON);
/// ```
#[expect(
    clippy::cast_precision_loss,
    reason = "label counts stay far below 2^52"
)]
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> Result<f64, ModelError> {
    check_lengths(truth.len(), predicted.len())?;
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(left, right)| left == right)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Mean of squared residuals.
///
/// # Errors
/// Same conditions as [`accuracy`].
#[expect(
    clippy::cast_precision_loss,
    reason = "row counts stay far below 2^52"
)]
pub fn mean_squared_error(
    truth: ArrayView1<'_, f64>,
    predicted: ArrayView1<'_, f64>,
) -> Result<f64, ModelError> {
    check_lengths(truth.len(), predicted.len())?;
    let total: f64 = truth
        .iter()
        .zip(predicted.iter())
        .map(|(left, right)| (left - right).powi(2))
        .sum();
    Ok(total / truth.len() as f64)
}

/// Coefficient of determination. A constant target yields `1.0` for a perfect
/// fit and `0.0` otherwise.
///
/// # Errors
/// Same conditions as [`accuracy`].
pub fn r2_score(
    truth: ArrayView1<'_, f64>,
    predicted: ArrayView1<'_, f64>,
) -> Result<f64, ModelError> {
    check_lengths(truth.len(), predicted.len())?;
    let mean = truth.mean().unwrap_or_default();
    let residual: f64 = truth
        .iter()
        .zip(predicted.iter())
        .map(|(left, right)| (left - right).powi(2))
        .sum();
    let spread: f64 = truth.iter().map(|value| (value - mean).powi(2)).sum();
    if spread == 0.0 {
        return Ok(if residual == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - residual / spread)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "pair counts stay far below 2^52"
)]
fn pairs(count: usize) -> f64 {
    let count = count as f64;
    count * (count - 1.0) / 2.0
}

/// Adjusted Rand index between two labellings, in `[-1, 1]`; `1.0` means the
/// partitions agree up to renaming.
///
/// # Errors
/// Same conditions as [`accuracy`].
///
/// # Examples
/// ```
/// use mlbench_core::metrics::adjusted_rand_index;
///
/// let ari = adjusted_rand_index(&[0, 0, 1, 1], &[3, 3, 7, 7]).expect("equal lengths");
/// assert!((ari - 1.0).abs() < 1e-12);
/// ```
pub fn adjusted_rand_index(truth: &[usize], predicted: &[usize]) -> Result<f64, ModelError> {
    check_lengths(truth.len(), predicted.len())?;
    let mut truth_counts = HashMap::<usize, usize>::new();
    let mut predicted_counts = HashMap::<usize, usize>::new();
    let mut joint_counts = HashMap::<(usize, usize), usize>::new();
    for (&left, &right) in truth.iter().zip(predicted) {
        *truth_counts.entry(left).or_insert(0) += 1;
        *predicted_counts.entry(right).or_insert(0) += 1;
        *joint_counts.entry((left, right)).or_insert(0) += 1;
    }

    let total = pairs(truth.len());
    if total == 0.0 {
        return Ok(1.0);
    }
    let joint: f64 = joint_counts.values().copied().map(pairs).sum();
    let truth_pairs: f64 = truth_counts.values().copied().map(pairs).sum();
    let predicted_pairs: f64 = predicted_counts.values().copied().map(pairs).sum();
    let expected = truth_pairs * predicted_pairs / total;
    let ceiling = 0.5 * (truth_pairs + predicted_pairs);
    let denominator = ceiling - expected;
    if denominator == 0.0 {
        return Ok(1.0);
    }
    Ok((joint - expected) / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    fn accuracy_counts_matches() {
        let score = accuracy(&[1, 1, 1, 0], &[1, 0, 1, 0]).expect("metric must succeed");
        assert!((score - 0.75).abs() < f64::EPSILON);
    }

    #[rstest]
    fn metrics_reject_length_mismatch() {
        let err = accuracy(&[0, 1], &[0]).expect_err("lengths differ");
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                context: "prediction count",
                expected: 2,
                actual: 1
            }
        );
    }

    #[rstest]
    fn metrics_reject_empty_input() {
        let err = accuracy(&[], &[]).expect_err("no rows");
        assert!(matches!(err, ModelError::EmptyInput { .. }));
    }

    #[rstest]
    fn regression_metrics_on_perfect_fit() {
        let truth = array![1.0, 2.0, 3.0];
        assert!(mean_squared_error(truth.view(), truth.view()).expect("metric") < f64::EPSILON);
        assert!((r2_score(truth.view(), truth.view()).expect("metric") - 1.0).abs() < 1e-12);
    }

    #[rstest]
    fn r2_of_mean_prediction_is_zero() {
        let truth = array![1.0, 2.0, 3.0];
        let mean = array![2.0, 2.0, 2.0];
        assert!(r2_score(truth.view(), mean.view()).expect("metric").abs() < 1e-12);
        let mse = mean_squared_error(truth.view(), mean.view()).expect("metric");
        assert!((mse - 2.0 / 3.0).abs() < 1e-12);
    }

    #[rstest]
    #[case::identical(vec![0, 0, 1, 1, 2, 2], vec![0, 0, 1, 1, 2, 2], 1.0)]
    #[case::renamed(vec![0, 0, 1, 1, 2, 2], vec![2, 2, 0, 0, 1, 1], 1.0)]
    #[case::single_item(vec![4], vec![1], 1.0)]
    fn ari_matches_known_values(
        #[case] truth: Vec<usize>,
        #[case] predicted: Vec<usize>,
        #[case] expected: f64,
    ) {
        let ari = adjusted_rand_index(&truth, &predicted).expect("metric must succeed");
        assert!((ari - expected).abs() < 1e-12, "ari={ari}");
    }

    #[rstest]
    fn ari_penalises_disagreement() {
        let ari = adjusted_rand_index(&[0, 0, 0, 1, 1, 1], &[0, 1, 0, 1, 0, 1])
            .expect("metric must succeed");
        assert!(ari < 0.5, "ari={ari}");
    }
}
