//! Sparse kernel-space centroid.
//!
//! A centroid is kept as `Σ αᵢ φ(dᵢ)` over a small dictionary of samples `dᵢ`.
//! Each trained sample either joins the dictionary, when it is not
//! approximately linearly dependent on the current members, or is projected
//! onto their span. The weights always describe the running mean of every
//! sample trained since the last [`KernelCentroid::clear`].

use ndarray::{Array1, Array2, ArrayView1, s};

use crate::kernel::Kernel;

#[derive(Clone, Debug)]
pub(crate) struct KernelCentroid {
    kernel: Kernel,
    tolerance: f64,
    max_dictionary_size: usize,
    dictionary: Vec<Array1<f64>>,
    alpha: Array1<f64>,
    gram: Array2<f64>,
    gram_inverse: Array2<f64>,
    samples_seen: u64,
    bias: f64,
}

impl KernelCentroid {
    pub(crate) fn new(kernel: Kernel, tolerance: f64, max_dictionary_size: usize) -> Self {
        Self {
            kernel,
            tolerance,
            max_dictionary_size,
            dictionary: Vec::new(),
            alpha: Array1::zeros(0),
            gram: Array2::zeros((0, 0)),
            gram_inverse: Array2::zeros((0, 0)),
            samples_seen: 0,
            bias: 0.0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.dictionary.clear();
        self.alpha = Array1::zeros(0);
        self.gram = Array2::zeros((0, 0));
        self.gram_inverse = Array2::zeros((0, 0));
        self.samples_seen = 0;
        self.bias = 0.0;
    }

    pub(crate) fn dictionary_len(&self) -> usize {
        self.dictionary.len()
    }

    fn kernel_column(&self, sample: ArrayView1<'_, f64>) -> Array1<f64> {
        self.dictionary
            .iter()
            .map(|member| self.kernel.evaluate(member.view(), sample))
            .collect()
    }

    /// Folds `sample` into the running mean.
    #[expect(
        clippy::cast_precision_loss,
        reason = "sample counts stay far below 2^52"
    )]
    pub(crate) fn train(&mut self, sample: ArrayView1<'_, f64>) {
        let self_similarity = self.kernel.evaluate(sample, sample);
        let column = self.kernel_column(sample);
        self.samples_seen = self.samples_seen.saturating_add(1);
        let sample_scale = 1.0 / self.samples_seen as f64;
        let centroid_scale = 1.0 - sample_scale;

        if self.dictionary.is_empty() {
            if self_similarity > f64::EPSILON {
                self.dictionary.push(sample.to_owned());
                self.alpha = Array1::from_elem(1, sample_scale);
                self.gram = Array2::from_elem((1, 1), self_similarity);
                self.gram_inverse = Array2::from_elem((1, 1), 1.0 / self_similarity);
            }
            self.refresh_bias();
            return;
        }

        let projection = self.gram_inverse.dot(&column);
        let residual = self_similarity - column.dot(&projection);
        self.alpha *= centroid_scale;

        if residual > self.tolerance && self.dictionary.len() < self.max_dictionary_size {
            self.grow(sample, &column, &projection, self_similarity, residual);
            let mut alpha = self.alpha.to_vec();
            alpha.push(sample_scale);
            self.alpha = Array1::from_vec(alpha);
        } else {
            self.alpha.scaled_add(sample_scale, &projection);
        }
        self.refresh_bias();
    }

    /// Extends the dictionary, its Gram matrix, and the Gram inverse using the
    /// block inverse of `[[K, k], [kᵀ, κ]]`.
    fn grow(
        &mut self,
        sample: ArrayView1<'_, f64>,
        column: &Array1<f64>,
        projection: &Array1<f64>,
        self_similarity: f64,
        residual: f64,
    ) {
        let size = self.dictionary.len();
        let mut gram = Array2::zeros((size + 1, size + 1));
        gram.slice_mut(s![..size, ..size]).assign(&self.gram);
        gram.slice_mut(s![..size, size]).assign(column);
        gram.slice_mut(s![size, ..size]).assign(column);
        gram[[size, size]] = self_similarity;

        let mut inverse = Array2::zeros((size + 1, size + 1));
        let outer = projection
            .view()
            .insert_axis(ndarray::Axis(1))
            .dot(&projection.view().insert_axis(ndarray::Axis(0)));
        inverse
            .slice_mut(s![..size, ..size])
            .assign(&(&self.gram_inverse + &(outer / residual)));
        let edge = projection.mapv(|value| -value / residual);
        inverse.slice_mut(s![..size, size]).assign(&edge);
        inverse.slice_mut(s![size, ..size]).assign(&edge);
        inverse[[size, size]] = 1.0 / residual;

        self.dictionary.push(sample.to_owned());
        self.gram = gram;
        self.gram_inverse = inverse;
    }

    fn refresh_bias(&mut self) {
        self.bias = self.alpha.dot(&self.gram.dot(&self.alpha));
    }

    /// Squared feature-space distance between `sample` and the centroid.
    pub(crate) fn squared_distance(&self, sample: ArrayView1<'_, f64>) -> f64 {
        let cross = self.kernel_column(sample).dot(&self.alpha);
        let distance = self.kernel.evaluate(sample, sample) - 2.0 * cross + self.bias;
        distance.max(0.0)
    }
}
