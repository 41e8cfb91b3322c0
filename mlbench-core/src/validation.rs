//! Input checks shared by the classifiers.

use ndarray::ArrayView2;

use crate::error::ModelError;

/// Checks that `labels` pairs one-to-one with the rows of `features` and
/// every label lies in `[0, classes)`.
pub(crate) fn validate_training_set(
    features: ArrayView2<'_, f64>,
    labels: &[usize],
    classes: usize,
) -> Result<(), ModelError> {
    if classes == 0 {
        return Err(ModelError::InvalidParameter {
            parameter: "classes",
        });
    }
    if features.nrows() == 0 || features.ncols() == 0 {
        return Err(ModelError::EmptyInput {
            context: "classifier training",
        });
    }
    if labels.len() != features.nrows() {
        return Err(ModelError::ShapeMismatch {
            context: "label count",
            expected: features.nrows(),
            actual: labels.len(),
        });
    }
    if let Some(&label) = labels.iter().find(|&&label| label >= classes) {
        return Err(ModelError::LabelOutOfRange { label, classes });
    }
    Ok(())
}
