//! Tests for the synthetic dataset generators.

use super::*;

use rstest::rstest;

// -- uniform features --------------------------------------------------------

#[rstest]
#[case::kmeans_shape(10_000, 10)]
#[case::housing_shape(506, 13)]
#[case::iris_shape(150, 4)]
fn uniform_features_have_requested_shape(#[case] samples: usize, #[case] features: usize) {
    let matrix = uniform_features(&SyntheticConfig::new(samples, features))
        .expect("generation must succeed");
    assert_eq!(matrix.dim(), (samples, features));
    assert!(matrix.iter().all(|value| (0.0..1.0).contains(value)));
}

#[rstest]
fn uniform_features_are_deterministic_per_seed() {
    let config = SyntheticConfig::new(50, 8);
    let first = uniform_features(&config).expect("generation must succeed");
    let second = uniform_features(&config).expect("generation must succeed");
    assert_eq!(first, second);

    let reseeded = uniform_features(&config.with_seed(7)).expect("generation must succeed");
    assert_ne!(first, reseeded, "different seeds should produce different data");
}

#[rstest]
#[case::zero_samples(0, 4, DatasetError::ZeroSamples)]
#[case::zero_features(4, 0, DatasetError::ZeroFeatures)]
#[case::overflow(usize::MAX, 2, DatasetError::Overflow)]
fn uniform_features_reject_unusable_shapes(
    #[case] samples: usize,
    #[case] features: usize,
    #[case] expected: DatasetError,
) {
    let err = uniform_features(&SyntheticConfig::new(samples, features))
        .expect_err("shape must be rejected");
    assert_eq!(err, expected);
}

// -- regression --------------------------------------------------------------

#[rstest]
fn regression_targets_follow_linear_relation() {
    let data =
        RegressionData::generate(&SyntheticConfig::new(32, 13)).expect("generation must succeed");
    assert_eq!(data.targets.len(), 32);
    for (row, target) in data.features.rows().into_iter().zip(data.targets.iter()) {
        let expected = 3.0 * row[0] + 2.0 * row[1] + row[2] + 0.5;
        assert!((target - expected).abs() < 1e-12, "target {target} != {expected}");
    }
}

#[rstest]
fn regression_requires_three_features() {
    let err = RegressionData::generate(&SyntheticConfig::new(10, 2))
        .expect_err("two features cannot carry the target");
    assert_eq!(
        err,
        DatasetError::InsufficientFeatures {
            required: 3,
            actual: 2
        }
    );
}

#[rstest]
fn regression_split_partitions_rows_in_order() {
    let data =
        RegressionData::generate(&SyntheticConfig::new(506, 13)).expect("generation must succeed");
    let split = data.split(DEFAULT_TRAIN_FRACTION).expect("split must succeed");
    assert_eq!(split.train.len(), 404);
    assert_eq!(split.test.len(), 102);
    assert_eq!(split.train.targets.len(), 404);
    assert_eq!(split.test.targets.len(), 102);
    assert_eq!(split.test.features.row(0), data.features.row(404));
    assert!((split.test.targets[0] - data.targets[404]).abs() < f64::EPSILON);
}

// -- classification ----------------------------------------------------------

#[rstest]
#[case(1)]
#[case(3)]
#[case(10)]
fn classification_labels_stay_in_range(#[case] classes: usize) {
    let data = ClassificationData::generate(&SyntheticConfig::new(150, 4), classes)
        .expect("generation must succeed");
    assert_eq!(data.labels.len(), 150);
    assert_eq!(data.classes, classes);
    assert!(data.labels.iter().all(|&label| label < classes));
}

#[rstest]
fn classification_rejects_zero_classes() {
    let err = ClassificationData::generate(&SyntheticConfig::new(10, 4), 0)
        .expect_err("zero classes must be rejected");
    assert_eq!(err, DatasetError::ZeroClasses);
}

#[rstest]
fn classification_split_matches_sizes() {
    let data = ClassificationData::generate(&SyntheticConfig::new(150, 4), 3)
        .expect("generation must succeed");
    let split = data.split(DEFAULT_TRAIN_FRACTION).expect("split must succeed");
    assert_eq!(split.sizes(), SplitSizes { train: 120, test: 30 });
    assert_eq!(split.train.targets.as_slice(), &data.labels[..120]);
    assert_eq!(split.test.targets.as_slice(), &data.labels[120..]);
}

// -- blobs -------------------------------------------------------------------

#[rstest]
fn blobs_assign_labels_round_robin() {
    let blobs = BlobData::generate(&BlobConfig::new(10, 3, 5)).expect("generation must succeed");
    assert_eq!(blobs.labels, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
    assert_eq!(blobs.features.dim(), (10, 3));
}

#[rstest]
fn blob_points_cluster_around_shared_centres() {
    let mut config = BlobConfig::new(200, 2, 2);
    config.cluster_std = 0.1;
    let blobs = BlobData::generate(&config).expect("generation must succeed");
    let first = blobs.features.row(0);
    let same_blob = blobs.features.row(2);
    let distance: f64 = first
        .iter()
        .zip(same_blob.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt();
    assert!(distance < 2.0, "points of one blob drifted apart: {distance}");
}

#[rstest]
#[case::zero_centers(BlobConfig::new(10, 2, 0), DatasetError::ZeroClasses)]
#[case::too_many_centers(
    BlobConfig::new(3, 2, 4),
    DatasetError::CentersExceedSamples { centers: 4, samples: 3 }
)]
fn blobs_reject_invalid_centre_counts(#[case] config: BlobConfig, #[case] expected: DatasetError) {
    let err = BlobData::generate(&config).expect_err("configuration must be rejected");
    assert_eq!(err, expected);
}

#[rstest]
#[case(0.0)]
#[case(f64::INFINITY)]
fn blobs_reject_invalid_spread(#[case] cluster_std: f64) {
    let mut config = BlobConfig::new(10, 2, 2);
    config.cluster_std = cluster_std;
    let err = BlobData::generate(&config).expect_err("spread must be rejected");
    assert_eq!(
        err,
        DatasetError::InvalidFloatParameter {
            parameter: "cluster_std"
        }
    );
}

// -- error codes -------------------------------------------------------------

#[rstest]
fn every_dataset_error_code_has_a_failing_input() {
    use std::collections::HashSet;

    use crate::error::DatasetErrorCode;

    let failures = [
        uniform_features(&SyntheticConfig::new(0, 2)).err(),
        uniform_features(&SyntheticConfig::new(2, 0)).err(),
        uniform_features(&SyntheticConfig::new(usize::MAX, 2)).err(),
        ClassificationData::generate(&SyntheticConfig::new(2, 2), 0).err(),
        RegressionData::generate(&SyntheticConfig::new(10, 2)).err(),
        BlobData::generate(&BlobConfig::new(2, 2, 3)).err(),
        SplitSizes::new(10, 0.0).err(),
        SplitSizes::new(1, DEFAULT_TRAIN_FRACTION).err(),
    ];
    let codes: HashSet<DatasetErrorCode> = failures
        .into_iter()
        .map(|failure| failure.expect("input must be rejected").code())
        .collect();
    for code in &codes {
        match code {
            DatasetErrorCode::ZeroSamples
            | DatasetErrorCode::ZeroFeatures
            | DatasetErrorCode::ZeroClasses
            | DatasetErrorCode::InsufficientFeatures
            | DatasetErrorCode::CentersExceedSamples
            | DatasetErrorCode::Overflow
            | DatasetErrorCode::InvalidFloatParameter
            | DatasetErrorCode::EmptySplit => {}
        }
    }
    assert_eq!(codes.len(), 8, "codes produced: {codes:?}");
}

// -- properties --------------------------------------------------------------

mod properties {
    use super::*;

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn uniform_features_repeat_per_seed(
            samples in 1_usize..40,
            features in 1_usize..8,
            seed in any::<u64>(),
        ) {
            let config = SyntheticConfig::new(samples, features).with_seed(seed);
            let first = uniform_features(&config).expect("generation must succeed");
            let second = uniform_features(&config).expect("generation must succeed");
            prop_assert_eq!(first.dim(), (samples, features));
            prop_assert!(first.iter().all(|value| (0.0..1.0).contains(value)));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn classification_labels_fit_the_class_count(
            samples in 1_usize..60,
            classes in 1_usize..6,
            seed in any::<u64>(),
        ) {
            let config = SyntheticConfig::new(samples, 4).with_seed(seed);
            let data = ClassificationData::generate(&config, classes)
                .expect("generation must succeed");
            prop_assert_eq!(data.labels.len(), samples);
            prop_assert!(data.labels.iter().all(|&label| label < classes));
        }

        #[test]
        fn blob_labels_cycle_through_centres(
            centers in 1_usize..6,
            extra in 0_usize..20,
            seed in any::<u64>(),
        ) {
            let mut config = BlobConfig::new(centers + extra, 2, centers);
            config.seed = seed;
            let blobs = BlobData::generate(&config).expect("generation must succeed");
            for (index, &label) in blobs.labels.iter().enumerate() {
                prop_assert_eq!(label, index % centers);
            }
            prop_assert!(blobs.features.iter().all(|value| value.is_finite()));
        }
    }
}
