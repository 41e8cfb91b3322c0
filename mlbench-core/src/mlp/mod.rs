//! Feed-forward multilayer perceptron.
//!
//! Dense layers with ReLU activations feed a softmax output trained on the
//! multiclass log loss. Optimisation is mini-batch SGD with momentum and
//! weight decay over contiguous batches, with a plateau-driven learning-rate
//! schedule.

mod schedule;

use ndarray::{Array1, Array2, ArrayView2, Axis, s};
use rand::{SeedableRng, rngs::SmallRng};
use tracing::{debug, info, instrument};

use crate::{
    data::{DEFAULT_SEED, standard_normal_sample},
    error::ModelError,
    validation::validate_training_set,
};
use schedule::PlateauSchedule;

/// Floor applied to the true-class probability before taking its logarithm.
/// `clamp` keeps NaN so a blown-up network still surfaces as divergence.
const MIN_PROBABILITY: f64 = 1e-12;

/// Hyper-parameters for [`Mlp::fit`].
///
/// # Examples
/// ```
/// use mlbench_core::mlp::MlpParams;
///
/// let params = MlpParams::default();
/// assert_eq!(params.hidden_layers, vec![100, 100]);
/// assert_eq!(params.batch_size, 10);
/// assert_eq!(params.max_epochs, 50);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MlpParams {
    /// Width of each hidden layer, input side first.
    pub hidden_layers: Vec<usize>,
    /// Initial SGD step size.
    pub learning_rate: f64,
    /// Training stops once the step size falls below this value.
    pub min_learning_rate: f64,
    /// Rows per mini-batch.
    pub batch_size: usize,
    /// Upper bound on passes over the training data.
    pub max_epochs: usize,
    /// Momentum coefficient in `[0, 1)`.
    pub momentum: f64,
    /// L2 penalty applied to weights, not biases.
    pub weight_decay: f64,
    /// Factor the step size is multiplied by on a plateau.
    pub shrink_factor: f64,
    /// Epochs without improvement tolerated before shrinking the step size.
    pub patience: usize,
    /// Seed for weight initialisation.
    pub seed: u64,
}

impl Default for MlpParams {
    fn default() -> Self {
        Self {
            hidden_layers: vec![100, 100],
            learning_rate: 0.01,
            min_learning_rate: 0.0001,
            batch_size: 10,
            max_epochs: 50,
            momentum: 0.9,
            weight_decay: 0.0005,
            shrink_factor: 0.1,
            patience: 5,
            seed: DEFAULT_SEED,
        }
    }
}

impl MlpParams {
    fn validate(&self) -> Result<(), ModelError> {
        let invalid = |parameter| Err(ModelError::InvalidParameter { parameter });
        if self.hidden_layers.contains(&0) {
            return invalid("hidden_layers");
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid("learning_rate");
        }
        if !self.min_learning_rate.is_finite() || self.min_learning_rate < 0.0 {
            return invalid("min_learning_rate");
        }
        if self.batch_size == 0 {
            return invalid("batch_size");
        }
        if self.max_epochs == 0 {
            return invalid("max_epochs");
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return invalid("momentum");
        }
        if !self.weight_decay.is_finite() || self.weight_decay < 0.0 {
            return invalid("weight_decay");
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return invalid("shrink_factor");
        }
        if self.patience == 0 {
            return invalid("patience");
        }
        Ok(())
    }
}

/// Outcome of an [`Mlp::fit`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingSummary {
    /// Epochs actually run.
    pub epochs: usize,
    /// Step size in effect when training stopped.
    pub final_learning_rate: f64,
    /// Mean log loss of the last epoch.
    pub final_loss: f64,
}

#[derive(Clone, Copy, Debug)]
struct Step {
    learning_rate: f64,
    momentum: f64,
    weight_decay: f64,
}

#[derive(Clone, Debug)]
struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    weight_velocity: Array2<f64>,
    bias_velocity: Array1<f64>,
}

impl DenseLayer {
    /// He initialisation: weights drawn from `N(0, 2 / inputs)`, zero bias.
    #[expect(
        clippy::cast_precision_loss,
        reason = "layer widths stay far below 2^52"
    )]
    fn new(inputs: usize, outputs: usize, rng: &mut SmallRng) -> Self {
        let scale = (2.0 / inputs as f64).sqrt();
        let weights =
            Array2::from_shape_simple_fn((inputs, outputs), || scale * standard_normal_sample(rng));
        Self {
            weights,
            bias: Array1::zeros(outputs),
            weight_velocity: Array2::zeros((inputs, outputs)),
            bias_velocity: Array1::zeros(outputs),
        }
    }

    fn forward(&self, input: ArrayView2<'_, f64>) -> Array2<f64> {
        input.dot(&self.weights) + &self.bias
    }

    fn update(&mut self, input: ArrayView2<'_, f64>, delta: &Array2<f64>, step: Step) {
        let mut weight_gradient = input.t().dot(delta);
        weight_gradient.scaled_add(step.weight_decay, &self.weights);
        let bias_gradient = delta.sum_axis(Axis(0));

        self.weight_velocity *= step.momentum;
        self.weight_velocity
            .scaled_add(-step.learning_rate, &weight_gradient);
        self.bias_velocity *= step.momentum;
        self.bias_velocity.scaled_add(-step.learning_rate, &bias_gradient);

        self.weights += &self.weight_velocity;
        self.bias += &self.bias_velocity;
    }
}

fn relu(mut values: Array2<f64>) -> Array2<f64> {
    values.mapv_inplace(|value| value.max(0.0));
    values
}

fn softmax_rows(mut logits: Array2<f64>) -> Array2<f64> {
    for mut row in logits.axis_iter_mut(Axis(0)) {
        let max = row.fold(f64::NEG_INFINITY, |acc, &value| acc.max(value));
        row.mapv_inplace(|value| (value - max).exp());
        let total = row.sum();
        row /= total;
    }
    logits
}

fn argmax(row: ndarray::ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (index, &value) in row.iter().enumerate() {
        if value > best_value {
            best = index;
            best_value = value;
        }
    }
    best
}

/// A trained multilayer perceptron classifier.
///
/// # Examples
/// ```
/// use mlbench_core::mlp::{Mlp, MlpParams};
/// use ndarray::array;
///
/// let features = array![[0.0, 0.1], [0.9, 1.0], [0.1, 0.0], [1.0, 0.9]];
/// let labels = [0, 1, 0, 1];
/// let params = MlpParams { hidden_layers: vec![8], max_epochs: 5, ..MlpParams::default() };
/// let model = Mlp::fit(&params, features.view(), &labels, 2).expect("fit succeeds");
/// let predicted = model.predict(features.view()).expect("predict succeeds");
/// assert_eq!(predicted.len(), 4);
/// assert!(predicted.iter().all(|&label| label < 2));
/// ```
#[derive(Clone, Debug)]
pub struct Mlp {
    layers: Vec<DenseLayer>,
    features: usize,
    classes: usize,
    summary: TrainingSummary,
}

impl Mlp {
    /// Trains a network mapping `features` to `labels` in `[0, classes)`.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] for unusable
    /// hyper-parameters or zero classes, [`ModelError::EmptyInput`] for an
    /// empty matrix, [`ModelError::ShapeMismatch`] when label and row counts
    /// differ, [`ModelError::LabelOutOfRange`] for a label `>= classes`, and
    /// [`ModelError::Diverged`] when an epoch's loss is not finite.
    #[instrument(
        name = "mlp.fit",
        err,
        skip(params, features, labels),
        fields(rows = features.nrows(), features = features.ncols()),
    )]
    pub fn fit(
        params: &MlpParams,
        features: ArrayView2<'_, f64>,
        labels: &[usize],
        classes: usize,
    ) -> Result<Self, ModelError> {
        params.validate()?;
        validate_training_set(features, labels, classes)?;

        let mut rng = SmallRng::seed_from_u64(params.seed);
        let mut widths = Vec::with_capacity(params.hidden_layers.len() + 2);
        widths.push(features.ncols());
        widths.extend(params.hidden_layers.iter().copied());
        widths.push(classes);
        let mut layers: Vec<DenseLayer> = widths
            .iter()
            .zip(widths.iter().skip(1))
            .map(|(&inputs, &outputs)| DenseLayer::new(inputs, outputs, &mut rng))
            .collect();

        let mut schedule = PlateauSchedule::new(
            params.learning_rate,
            params.min_learning_rate,
            params.shrink_factor,
            params.patience,
        );
        let mut summary = TrainingSummary {
            epochs: 0,
            final_learning_rate: params.learning_rate,
            final_loss: f64::NAN,
        };
        for epoch in 0..params.max_epochs {
            let step = Step {
                learning_rate: schedule.rate(),
                momentum: params.momentum,
                weight_decay: params.weight_decay,
            };
            let loss = train_epoch(&mut layers, features, labels, params.batch_size, step);
            if !loss.is_finite() {
                return Err(ModelError::Diverged { epoch });
            }
            summary.epochs = epoch + 1;
            summary.final_loss = loss;
            debug!(epoch, loss, learning_rate = step.learning_rate, "mlp epoch");
            let keep_going = schedule.observe(loss);
            summary.final_learning_rate = schedule.rate();
            if !keep_going {
                break;
            }
        }
        info!(
            epochs = summary.epochs,
            final_loss = summary.final_loss,
            final_learning_rate = summary.final_learning_rate,
            "mlp training finished"
        );

        Ok(Self {
            layers,
            features: features.ncols(),
            classes,
            summary,
        })
    }

    /// Returns the most probable class for each row of `data`.
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
        let logits = forward(&self.layers, data);
        Ok(logits.axis_iter(Axis(0)).map(argmax).collect())
    }

    /// Statistics from the training run.
    #[must_use]
    pub const fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    /// Number of output classes.
    #[must_use]
    pub const fn classes(&self) -> usize {
        self.classes
    }
}

fn forward(layers: &[DenseLayer], data: ArrayView2<'_, f64>) -> Array2<f64> {
    let hidden = layers.len().saturating_sub(1);
    let mut current = data.to_owned();
    for (index, layer) in layers.iter().enumerate() {
        let output = layer.forward(current.view());
        current = if index < hidden { relu(output) } else { output };
    }
    current
}

#[expect(
    clippy::cast_precision_loss,
    reason = "row counts stay far below 2^52"
)]
fn train_epoch(
    layers: &mut [DenseLayer],
    features: ArrayView2<'_, f64>,
    labels: &[usize],
    batch_size: usize,
    step: Step,
) -> f64 {
    let rows = features.nrows();
    let mut total = 0.0;
    for start in (0..rows).step_by(batch_size) {
        let end = (start + batch_size).min(rows);
        let batch = features.slice(s![start..end, ..]);
        let batch_labels = labels.get(start..end).unwrap_or_default();
        total += train_batch(layers, batch, batch_labels, step) * (end - start) as f64;
    }
    total / rows as f64
}

/// Runs one forward/backward pass and updates every layer. Returns the mean
/// log loss of the batch before the update.
#[expect(
    clippy::cast_precision_loss,
    reason = "batch sizes stay far below 2^52"
)]
fn train_batch(
    layers: &mut [DenseLayer],
    inputs: ArrayView2<'_, f64>,
    labels: &[usize],
    step: Step,
) -> f64 {
    let hidden = layers.len().saturating_sub(1);
    let mut layer_inputs: Vec<Array2<f64>> = Vec::with_capacity(layers.len());
    let mut current = inputs.to_owned();
    for (index, layer) in layers.iter().enumerate() {
        let output = layer.forward(current.view());
        let next = if index < hidden { relu(output) } else { output };
        layer_inputs.push(current);
        current = next;
    }

    let rows = inputs.nrows() as f64;
    let mut delta = softmax_rows(current);
    let mut loss = 0.0;
    for (mut row, &label) in delta.axis_iter_mut(Axis(0)).zip(labels) {
        if let Some(probability) = row.get_mut(label) {
            loss -= probability.clamp(MIN_PROBABILITY, 1.0).ln();
            *probability -= 1.0;
        }
    }
    delta /= rows;

    for (index, (layer, input)) in layers.iter_mut().zip(&layer_inputs).enumerate().rev() {
        let propagated = (index > 0).then(|| {
            let mut next = delta.dot(&layer.weights.t());
            next.zip_mut_with(input, |gradient, &activation| {
                if activation <= 0.0 {
                    *gradient = 0.0;
                }
            });
            next
        });
        layer.update(input.view(), &delta, step);
        if let Some(next) = propagated {
            delta = next;
        }
    }
    loss / rows
}
