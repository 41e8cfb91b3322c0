//! Soft-margin support-vector classification.
//!
//! Each pair of classes present in the training set gets its own two-class
//! machine trained by `linfa-svm`. Prediction takes a majority vote over the
//! pairwise machines.

use linfa::{Dataset, prelude::*};
use linfa_svm::Svm;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use tracing::{debug, info, instrument};

use crate::{error::ModelError, kernel::Kernel, validation::validate_training_set};

/// Hyper-parameters for [`Svc::fit`].
///
/// # Examples
/// ```
/// use mlbench_core::{Kernel, svm::SvcParams};
///
/// let params = SvcParams::default();
/// assert_eq!(params.kernel, Kernel::Rbf { gamma: 0.1 });
/// assert!((params.c - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvcParams {
    /// Kernel defining the feature space.
    pub kernel: Kernel,
    /// Box constraint on the dual weights of both classes.
    pub c: f64,
    /// Stopping threshold on the maximal KKT violation.
    pub tolerance: f64,
}

impl Default for SvcParams {
    fn default() -> Self {
        Self {
            kernel: Kernel::default(),
            c: 1.0,
            tolerance: 1e-3,
        }
    }
}

impl SvcParams {
    fn validate(&self) -> Result<(), ModelError> {
        if !self.c.is_finite() || self.c <= 0.0 {
            return Err(ModelError::InvalidParameter { parameter: "c" });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ModelError::InvalidParameter {
                parameter: "tolerance",
            });
        }
        self.kernel.validate()?;
        Ok(())
    }

    /// Translates to linfa's parameters. Its Gaussian kernel is
    /// `exp(−‖a−b‖² / eps)`, so `eps = 1 / γ`.
    fn solver(&self) -> linfa_svm::SvmParams<f64, bool> {
        let params = Svm::<f64, bool>::params()
            .pos_neg_weights(self.c, self.c)
            .eps(self.tolerance);
        match self.kernel {
            Kernel::Linear => params.linear_kernel(),
            Kernel::Rbf { gamma } => params.gaussian_kernel(gamma.recip()),
        }
    }
}

#[derive(Debug)]
struct PairwiseMachine {
    positive: usize,
    negative: usize,
    machine: Svm<f64, bool>,
}

#[derive(Debug)]
enum Decision {
    /// Only one class appeared in the training set.
    Constant(usize),
    Vote(Vec<PairwiseMachine>),
}

/// A trained multiclass support-vector classifier.
///
/// # Examples
/// ```
/// use mlbench_core::svm::{Svc, SvcParams};
/// use ndarray::array;
///
/// let features = array![[0.0, 0.0], [0.1, 0.1], [5.0, 5.0], [5.1, 5.0]];
/// let model = Svc::fit(SvcParams::default(), features.view(), &[0, 0, 1, 1], 2)
///     .expect("fit succeeds");
/// assert_eq!(model.predict(features.view()).expect("predict succeeds"), vec![0, 0, 1, 1]);
/// ```
#[derive(Debug)]
pub struct Svc {
    params: SvcParams,
    features: usize,
    classes: usize,
    decision: Decision,
}

impl Svc {
    /// Trains one-vs-one machines for every pair of classes present in
    /// `labels`.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] for unusable
    /// hyper-parameters or zero classes, [`ModelError::EmptyInput`] for an
    /// empty matrix, [`ModelError::ShapeMismatch`] when label and row counts
    /// differ, [`ModelError::LabelOutOfRange`] for a label `>= classes`, and
    /// [`ModelError::SolverFailed`] when a pairwise machine cannot be trained.
    #[instrument(
        name = "svm.fit",
        err,
        skip(features, labels),
        fields(rows = features.nrows(), features = features.ncols(), kernel = params.kernel.name()),
    )]
    pub fn fit(
        params: SvcParams,
        features: ArrayView2<'_, f64>,
        labels: &[usize],
        classes: usize,
    ) -> Result<Self, ModelError> {
        params.validate()?;
        validate_training_set(features, labels, classes)?;

        let present: Vec<usize> = (0..classes)
            .filter(|class| labels.contains(class))
            .collect();
        let decision = match present.as_slice() {
            [only] => Decision::Constant(*only),
            _ => Decision::Vote(train_pairs(&params, features, labels, &present)?),
        };
        if let Decision::Vote(machines) = &decision {
            info!(
                machines = machines.len(),
                support_vectors = machines
                    .iter()
                    .map(|pair| pair.machine.nsupport())
                    .sum::<usize>(),
                "svm training finished"
            );
        }

        Ok(Self {
            params,
            features: features.ncols(),
            classes,
            decision,
        })
    }

    /// Predicts a class for every row of `data`. Ties in the vote go to the
    /// lower class index.
    ///
    /// # Errors
    /// Returns [`ModelError::ShapeMismatch`] when the row width differs from
    /// the training data.
    pub fn predict(&self, data: ArrayView2<'_, f64>) -> Result<Vec<usize>, ModelError> {
        if data.ncols() != self.features {
            return Err(ModelError::ShapeMismatch {
                context: "feature count",
                expected: self.features,
                actual: data.ncols(),
            });
        }
        let machines = match &self.decision {
            Decision::Constant(class) => return Ok(vec![*class; data.nrows()]),
            Decision::Vote(machines) => machines,
        };

        let mut votes = Array2::<usize>::zeros((data.nrows(), self.classes));
        for pair in machines {
            let positive: Array1<bool> = pair.machine.predict(&data);
            for (mut row, wins) in votes.axis_iter_mut(Axis(0)).zip(positive.iter()) {
                let winner = if *wins { pair.positive } else { pair.negative };
                if let Some(count) = row.get_mut(winner) {
                    *count += 1;
                }
            }
        }
        Ok(votes
            .axis_iter(Axis(0))
            .map(|row| most_voted(row.as_slice().unwrap_or_default()))
            .collect())
    }

    /// Number of pairwise machines trained.
    #[must_use]
    pub fn machine_count(&self) -> usize {
        match &self.decision {
            Decision::Constant(_) => 0,
            Decision::Vote(machines) => machines.len(),
        }
    }

    /// Hyper-parameters the model was trained with.
    #[must_use]
    pub const fn params(&self) -> &SvcParams {
        &self.params
    }
}

fn train_pairs(
    params: &SvcParams,
    features: ArrayView2<'_, f64>,
    labels: &[usize],
    present: &[usize],
) -> Result<Vec<PairwiseMachine>, ModelError> {
    let solver = params.solver();
    let mut machines = Vec::new();
    for (offset, &positive) in present.iter().enumerate() {
        for &negative in present.iter().skip(offset + 1) {
            let rows: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, label)| **label == positive || **label == negative)
                .map(|(index, _)| index)
                .collect();
            let targets: Array1<bool> = rows
                .iter()
                .map(|&index| labels.get(index) == Some(&positive))
                .collect();
            let dataset = Dataset::new(features.select(Axis(0), &rows), targets);
            let machine = solver
                .fit(&dataset)
                .map_err(|source| ModelError::SolverFailed {
                    positive,
                    negative,
                    message: source.to_string(),
                })?;
            debug!(
                positive,
                negative,
                rows = rows.len(),
                support_vectors = machine.nsupport(),
                "pairwise machine trained"
            );
            machines.push(PairwiseMachine {
                positive,
                negative,
                machine,
            });
        }
    }
    Ok(machines)
}

/// Index of the largest count; ties go to the lower index.
fn most_voted(votes: &[usize]) -> usize {
    let mut best = 0;
    let mut best_count = 0;
    for (class, &count) in votes.iter().enumerate() {
        if count > best_count {
            best = class;
            best_count = count;
        }
    }
    best
}

#[cfg(test)]
mod tests;
