//! Contiguous train/test partitioning.

use std::ops::Range;

use ndarray::{Array2, s};

use crate::error::DatasetError;

/// Fraction of rows every splitting benchmark trains on.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// Row counts on each side of a split.
///
/// `train = floor(fraction × samples)` and `test = samples − train`; rows are
/// never shuffled.
///
/// # Examples
/// ```
/// use mlbench_core::data::{DEFAULT_TRAIN_FRACTION, SplitSizes};
///
/// let sizes = SplitSizes::new(506, DEFAULT_TRAIN_FRACTION).expect("both sides non-empty");
/// assert_eq!((sizes.train, sizes.test), (404, 102));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitSizes {
    /// Leading rows used for training.
    pub train: usize,
    /// Trailing rows held out for inference.
    pub test: usize,
}

impl SplitSizes {
    /// Computes the split for `samples` rows.
    ///
    /// # Errors
    /// Returns [`DatasetError::InvalidFloatParameter`] when `train_fraction` is
    /// not strictly between zero and one, and [`DatasetError::EmptySplit`] when
    /// either side would hold no rows.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "row counts are far below 2^52 and the product is floored"
    )]
    pub fn new(samples: usize, train_fraction: f64) -> Result<Self, DatasetError> {
        if !train_fraction.is_finite() || train_fraction <= 0.0 || train_fraction >= 1.0 {
            return Err(DatasetError::InvalidFloatParameter {
                parameter: "train_fraction",
            });
        }
        let train = (train_fraction * samples as f64).floor() as usize;
        let test = samples.saturating_sub(train);
        if train == 0 || test == 0 {
            return Err(DatasetError::EmptySplit {
                samples,
                train,
                test,
            });
        }
        Ok(Self { train, test })
    }

    /// Total rows covered by the split.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.train + self.test
    }

    fn train_rows(&self) -> Range<usize> {
        0..self.train
    }

    fn test_rows(&self) -> Range<usize> {
        self.train..self.samples()
    }
}

/// Features and targets on one side of a split.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition<Y> {
    /// Row slice of the feature matrix.
    pub features: Array2<f64>,
    /// Targets for the same rows.
    pub targets: Y,
}

impl<Y> Partition<Y> {
    /// Number of rows in the partition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    /// Returns whether the partition holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dataset cut into leading training rows and trailing held-out rows.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainTestSplit<Y> {
    /// Leading `floor(fraction × samples)` rows.
    pub train: Partition<Y>,
    /// Remaining rows.
    pub test: Partition<Y>,
}

impl<Y> TrainTestSplit<Y> {
    pub(super) fn from_rows(
        features: &Array2<f64>,
        sizes: SplitSizes,
        mut targets: impl FnMut(Range<usize>) -> Y,
    ) -> Self {
        let train_rows = sizes.train_rows();
        let test_rows = sizes.test_rows();
        Self {
            train: Partition {
                features: features.slice(s![train_rows.clone(), ..]).to_owned(),
                targets: targets(train_rows),
            },
            test: Partition {
                features: features.slice(s![test_rows.clone(), ..]).to_owned(),
                targets: targets(test_rows),
            },
        }
    }

    /// Row counts of both partitions.
    #[must_use]
    pub fn sizes(&self) -> SplitSizes {
        SplitSizes {
            train: self.train.len(),
            test: self.test.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case::iris_shape(150, 120, 30)]
    #[case::housing_shape(506, 404, 102)]
    #[case::tiny(2, 1, 1)]
    #[case::five(5, 4, 1)]
    fn default_fraction_matches_expected_sizes(
        #[case] samples: usize,
        #[case] train: usize,
        #[case] test: usize,
    ) {
        let sizes = SplitSizes::new(samples, DEFAULT_TRAIN_FRACTION).expect("split must succeed");
        assert_eq!(sizes, SplitSizes { train, test });
    }

    #[rstest]
    #[case::single_row(1)]
    #[case::empty(0)]
    fn rejects_splits_with_an_empty_side(#[case] samples: usize) {
        let err = SplitSizes::new(samples, DEFAULT_TRAIN_FRACTION)
            .expect_err("degenerate split must fail");
        assert!(matches!(err, DatasetError::EmptySplit { .. }));
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn rejects_invalid_fractions(#[case] fraction: f64) {
        let err = SplitSizes::new(100, fraction).expect_err("fraction must be rejected");
        assert_eq!(
            err,
            DatasetError::InvalidFloatParameter {
                parameter: "train_fraction"
            }
        );
    }

    #[rstest]
    fn from_rows_keeps_rows_contiguous() {
        let features = Array2::from_shape_fn((5, 2), |(row, col)| (row * 10 + col) as f64);
        let sizes = SplitSizes::new(5, DEFAULT_TRAIN_FRACTION).expect("split must succeed");
        let split = TrainTestSplit::from_rows(&features, sizes, |rows| rows.collect::<Vec<_>>());
        assert_eq!(split.train.targets, vec![0, 1, 2, 3]);
        assert_eq!(split.test.targets, vec![4]);
        assert_eq!(split.test.features.row(0).to_vec(), vec![40.0, 41.0]);
        assert_eq!(split.sizes(), sizes);
    }

    proptest! {
        #[test]
        fn default_split_floors_four_fifths(samples in 2_usize..100_000) {
            let sizes = SplitSizes::new(samples, DEFAULT_TRAIN_FRACTION)
                .expect("two or more rows always split");
            prop_assert_eq!(sizes.train, samples * 4 / 5);
            prop_assert_eq!(sizes.train + sizes.test, samples);
        }
    }
}
