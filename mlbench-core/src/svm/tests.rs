//! Tests for multiclass support-vector classification.

use super::*;

use linfa::{Dataset, prelude::*};
use linfa_svm::Svm;
use ndarray::{Array1, array};
use rstest::{fixture, rstest};

use crate::data::{
    BlobConfig, BlobData, ClassificationData, DEFAULT_TRAIN_FRACTION, SyntheticConfig,
};
use crate::metrics::accuracy;

#[fixture]
fn classification() -> ClassificationData {
    ClassificationData::generate(&SyntheticConfig::new(150, 4), 3)
        .expect("generation must succeed")
}

#[rstest]
fn predictions_cover_held_out_rows(classification: ClassificationData) {
    let split = classification
        .split(DEFAULT_TRAIN_FRACTION)
        .expect("split must succeed");
    let model = Svc::fit(
        SvcParams::default(),
        split.train.features.view(),
        &split.train.targets,
        classification.classes,
    )
    .expect("fit must succeed");
    let predicted = model
        .predict(split.test.features.view())
        .expect("predict must succeed");
    assert_eq!(predicted.len(), split.test.len());
    assert!(predicted.iter().all(|&label| label < 3));
    assert_eq!(model.machine_count(), 3);
}

#[rstest]
fn pairs_are_trained_by_linfa_with_inverse_gamma_bandwidth() {
    let data = ClassificationData::generate(&SyntheticConfig::new(60, 4), 2)
        .expect("generation must succeed");
    let model = Svc::fit(SvcParams::default(), data.features.view(), &data.labels, 2)
        .expect("fit must succeed");

    let targets: Array1<bool> = data.labels.iter().map(|&label| label == 0).collect();
    let direct = Svm::<f64, bool>::params()
        .pos_neg_weights(1.0, 1.0)
        .eps(1e-3)
        .gaussian_kernel(10.0)
        .fit(&Dataset::new(data.features.clone(), targets))
        .expect("direct fit must succeed");
    let decided: Array1<bool> = direct.predict(&data.features);
    let expected: Vec<usize> = decided
        .iter()
        .map(|&positive| if positive { 0 } else { 1 })
        .collect();

    assert_eq!(
        model.predict(data.features.view()).expect("predict must succeed"),
        expected
    );
}

#[rstest]
fn separates_blobs() {
    let mut config = BlobConfig::new(150, 4, 3);
    config.cluster_std = 0.5;
    let blobs = BlobData::generate(&config).expect("generation must succeed");
    let model = Svc::fit(SvcParams::default(), blobs.features.view(), &blobs.labels, 3)
        .expect("fit must succeed");
    let predicted = model
        .predict(blobs.features.view())
        .expect("predict must succeed");
    let score = accuracy(&blobs.labels, &predicted).expect("metric must succeed");
    assert!(score > 0.9, "training accuracy {score}");
}

#[rstest]
fn linear_kernel_handles_two_classes() {
    let features = array![[0.0, 0.0], [0.2, 0.1], [1.0, 1.0], [0.9, 1.1]];
    let params = SvcParams {
        kernel: Kernel::Linear,
        c: 10.0,
        ..SvcParams::default()
    };
    let model = Svc::fit(params, features.view(), &[1, 1, 0, 0], 2).expect("fit must succeed");
    assert_eq!(
        model.predict(features.view()).expect("predict must succeed"),
        vec![1, 1, 0, 0]
    );
    assert_eq!(model.machine_count(), 1);
}

#[rstest]
fn single_class_training_set_predicts_that_class() {
    let features = array![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]];
    let model = Svc::fit(SvcParams::default(), features.view(), &[2, 2, 2], 3)
        .expect("fit must succeed");
    assert_eq!(model.machine_count(), 0);
    assert_eq!(
        model
            .predict(array![[9.0, 9.0], [0.0, 0.0]].view())
            .expect("predict must succeed"),
        vec![2, 2]
    );
}

#[rstest]
fn absent_classes_get_no_machines() {
    let features = array![[0.0], [0.1], [4.0], [4.1]];
    let model = Svc::fit(SvcParams::default(), features.view(), &[0, 0, 3, 3], 5)
        .expect("fit must succeed");
    assert_eq!(model.machine_count(), 1);
    assert_eq!(
        model.predict(features.view()).expect("predict must succeed"),
        vec![0, 0, 3, 3]
    );
}

#[rstest]
#[case::clear_winner(vec![1, 3, 2], 1)]
#[case::tie_goes_low(vec![2, 2, 2], 0)]
#[case::upper_tie(vec![0, 1, 1], 1)]
#[case::no_votes(vec![0, 0], 0)]
fn voting_breaks_ties_towards_lower_class(#[case] votes: Vec<usize>, #[case] expected: usize) {
    assert_eq!(most_voted(&votes), expected);
}

#[rstest]
fn training_is_deterministic(classification: ClassificationData) {
    let fit = || {
        Svc::fit(
            SvcParams::default(),
            classification.features.view(),
            &classification.labels,
            3,
        )
        .expect("fit must succeed")
        .predict(classification.features.view())
        .expect("predict must succeed")
    };
    assert_eq!(fit(), fit());
}

#[rstest]
#[case::zero_c(SvcParams { c: 0.0, ..SvcParams::default() }, "c")]
#[case::zero_tolerance(SvcParams { tolerance: 0.0, ..SvcParams::default() }, "tolerance")]
#[case::bad_gamma(SvcParams { kernel: Kernel::Rbf { gamma: f64::NAN }, ..SvcParams::default() }, "gamma")]
fn rejects_invalid_parameters(
    classification: ClassificationData,
    #[case] params: SvcParams,
    #[case] parameter: &str,
) {
    let err = Svc::fit(
        params,
        classification.features.view(),
        &classification.labels,
        3,
    )
    .expect_err("parameters must be rejected");
    assert!(
        matches!(err, ModelError::InvalidParameter { parameter: name } if name == parameter),
        "unexpected error: {err:?}"
    );
}

#[rstest]
fn rejects_out_of_range_labels() {
    let features = array![[0.0], [1.0]];
    let err = Svc::fit(SvcParams::default(), features.view(), &[0, 4], 3)
        .expect_err("label 4 is outside three classes");
    assert_eq!(err, ModelError::LabelOutOfRange { label: 4, classes: 3 });
}

#[rstest]
fn predict_rejects_wrong_width(classification: ClassificationData) {
    let model = Svc::fit(
        SvcParams::default(),
        classification.features.view(),
        &classification.labels,
        3,
    )
    .expect("fit must succeed");
    let err = model
        .predict(array![[0.0]].view())
        .expect_err("width must match");
    assert!(matches!(err, ModelError::ShapeMismatch { .. }));
}
