//! Kernel k-means clustering.
//!
//! Centroids live in the kernel's feature space as sparse expansions over a
//! bounded dictionary of samples (see [`KernelCentroid`]). Training alternates
//! between assigning every sample to its nearest centroid and rebuilding each
//! centroid from its members, for a bounded number of passes.

mod centroid;

use ndarray::{ArrayView1, ArrayView2, Axis, s};
use tracing::{debug, instrument};

use crate::{error::ModelError, kernel::Kernel};
use centroid::KernelCentroid;

/// Hyper-parameters for [`KernelKMeans`].
///
/// # Examples
/// ```
/// use mlbench_core::{Kernel, kmeans::KernelKMeansParams};
///
/// let params = KernelKMeansParams::default();
/// assert_eq!(params.clusters, 5);
/// assert_eq!(params.max_passes, 10);
/// assert_eq!(params.kernel, Kernel::Rbf { gamma: 0.1 });
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelKMeansParams {
    /// Number of clusters to form.
    pub clusters: usize,
    /// Kernel defining the feature space.
    pub kernel: Kernel,
    /// Approximate-linear-dependence threshold for growing a centroid's
    /// dictionary.
    pub tolerance: f64,
    /// Upper bound on the dictionary held by each centroid.
    pub max_dictionary_size: usize,
    /// Upper bound on assign/rebuild passes.
    pub max_passes: usize,
    /// Training stops after a pass that moves fewer than this fraction of
    /// samples to another cluster. `0.0` keeps only the stop on no change.
    pub min_change: f64,
}

impl Default for KernelKMeansParams {
    fn default() -> Self {
        Self {
            clusters: 5,
            kernel: Kernel::default(),
            tolerance: 0.01,
            max_dictionary_size: 8,
            max_passes: 10,
            min_change: 0.01,
        }
    }
}

impl KernelKMeansParams {
    fn validate(&self) -> Result<(), ModelError> {
        if self.clusters == 0 {
            return Err(ModelError::InvalidParameter {
                parameter: "clusters",
            });
        }
        if self.max_dictionary_size == 0 {
            return Err(ModelError::InvalidParameter {
                parameter: "max_dictionary_size",
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ModelError::InvalidParameter {
                parameter: "tolerance",
            });
        }
        if !self.min_change.is_finite() || !(0.0..=1.0).contains(&self.min_change) {
            return Err(ModelError::InvalidParameter {
                parameter: "min_change",
            });
        }
        self.kernel.validate()?;
        Ok(())
    }
}

/// A trained kernel k-means model.
///
/// # Examples
/// ```
/// use mlbench_core::kmeans::{KernelKMeans, KernelKMeansParams};
/// use ndarray::array;
///
/// let data = array![[0.0, 0.0], [10.0, 10.0], [0.1, 0.0], [10.0, 9.9]];
/// let params = KernelKMeansParams { clusters: 2, ..KernelKMeansParams::default() };
/// let model = KernelKMeans::fit_from_leading_rows(params, data.view()).expect("fit succeeds");
/// let labels = model.predict_all(data.view()).expect("predict succeeds");
/// assert_eq!(labels, vec![0, 1, 0, 1]);
/// ```
#[derive(Clone, Debug)]
pub struct KernelKMeans {
    params: KernelKMeansParams,
    features: usize,
    centroids: Vec<KernelCentroid>,
    passes: usize,
}

impl KernelKMeans {
    /// Trains on `data`, seeding one centroid per row of `initial_centers`.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] for unusable hyper-parameters,
    /// [`ModelError::EmptyInput`] for an empty matrix,
    /// [`ModelError::TooFewSamples`] when there are fewer rows than clusters,
    /// and [`ModelError::ShapeMismatch`] when `initial_centers` does not hold
    /// exactly `clusters` rows of the data's width.
    #[instrument(
        name = "kmeans.fit",
        err,
        skip(data, initial_centers),
        fields(samples = data.nrows(), clusters = params.clusters, kernel = params.kernel.name()),
    )]
    pub fn fit(
        params: KernelKMeansParams,
        data: ArrayView2<'_, f64>,
        initial_centers: ArrayView2<'_, f64>,
    ) -> Result<Self, ModelError> {
        params.validate()?;
        Self::validate_inputs(&params, data, initial_centers)?;

        let mut centroids: Vec<KernelCentroid> = initial_centers
            .axis_iter(Axis(0))
            .map(|center| {
                let mut centroid = KernelCentroid::new(
                    params.kernel,
                    params.tolerance,
                    params.max_dictionary_size,
                );
                centroid.train(center);
                centroid
            })
            .collect();

        let mut assignments = vec![usize::MAX; data.nrows()];
        let mut passes = 0;
        while passes < params.max_passes {
            passes += 1;
            let changed = reassign(&centroids, data, &mut assignments);
            debug!(pass = passes, changed, "kernel k-means pass");
            if changed == 0 {
                break;
            }
            rebuild(&mut centroids, data, &assignments);
            if below_min_change(changed, data.nrows(), params.min_change) {
                break;
            }
        }
        debug!(
            passes,
            dictionaries = ?centroids.iter().map(KernelCentroid::dictionary_len).collect::<Vec<_>>(),
            "kernel k-means trained"
        );

        Ok(Self {
            params,
            features: data.ncols(),
            centroids,
            passes,
        })
    }

    /// Trains using the first `clusters` rows of `data` as initial centres.
    ///
    /// # Errors
    /// Same conditions as [`Self::fit`].
    pub fn fit_from_leading_rows(
        params: KernelKMeansParams,
        data: ArrayView2<'_, f64>,
    ) -> Result<Self, ModelError> {
        if data.nrows() < params.clusters {
            return Err(ModelError::TooFewSamples {
                clusters: params.clusters,
                samples: data.nrows(),
            });
        }
        let initial = data.slice(s![..params.clusters, ..]);
        Self::fit(params, data, initial)
    }

    fn validate_inputs(
        params: &KernelKMeansParams,
        data: ArrayView2<'_, f64>,
        initial_centers: ArrayView2<'_, f64>,
    ) -> Result<(), ModelError> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(ModelError::EmptyInput {
                context: "kernel k-means training",
            });
        }
        if data.nrows() < params.clusters {
            return Err(ModelError::TooFewSamples {
                clusters: params.clusters,
                samples: data.nrows(),
            });
        }
        if initial_centers.nrows() != params.clusters {
            return Err(ModelError::ShapeMismatch {
                context: "initial centre count",
                expected: params.clusters,
                actual: initial_centers.nrows(),
            });
        }
        if initial_centers.ncols() != data.ncols() {
            return Err(ModelError::ShapeMismatch {
                context: "initial centre width",
                expected: data.ncols(),
                actual: initial_centers.ncols(),
            });
        }
        Ok(())
    }

    /// Returns the nearest cluster for one sample. Ties go to the lower index.
    #[must_use]
    pub fn predict(&self, sample: ArrayView1<'_, f64>) -> usize {
        nearest(&self.centroids, sample)
    }

    /// Assigns every row of `data` to a cluster.
    ///
    /// # Errors
    /// Returns [`ModelError::ShapeMismatch`] when the row width differs from
    /// the training data.
    pub fn predict_all(&self, data: ArrayView2<'_, f64>) -> Result<Vec<usize>, ModelError> {
        if data.ncols() != self.features {
            return Err(ModelError::ShapeMismatch {
                context: "feature count",
                expected: self.features,
                actual: data.ncols(),
            });
        }
        Ok(data
            .axis_iter(Axis(0))
            .map(|row| self.predict(row))
            .collect())
    }

    /// Number of clusters the model assigns to.
    #[must_use]
    pub fn clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Number of assign/rebuild passes training ran.
    #[must_use]
    pub const fn passes(&self) -> usize {
        self.passes
    }

    /// Hyper-parameters the model was trained with.
    #[must_use]
    pub const fn params(&self) -> &KernelKMeansParams {
        &self.params
    }
}

fn nearest(centroids: &[KernelCentroid], sample: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = centroid.squared_distance(sample);
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

fn reassign(
    centroids: &[KernelCentroid],
    data: ArrayView2<'_, f64>,
    assignments: &mut [usize],
) -> usize {
    let mut changed = 0;
    for (row, slot) in data.axis_iter(Axis(0)).zip(assignments.iter_mut()) {
        let cluster = nearest(centroids, row);
        if *slot != cluster {
            *slot = cluster;
            changed += 1;
        }
    }
    changed
}

/// Rebuilds every non-empty cluster from its members; empty clusters keep
/// their previous centroid.
fn rebuild(centroids: &mut [KernelCentroid], data: ArrayView2<'_, f64>, assignments: &[usize]) {
    for (cluster, centroid) in centroids.iter_mut().enumerate() {
        let mut members = data
            .axis_iter(Axis(0))
            .zip(assignments)
            .filter(|(_, assigned)| **assigned == cluster)
            .map(|(row, _)| row)
            .peekable();
        if members.peek().is_none() {
            continue;
        }
        centroid.clear();
        for row in members {
            centroid.train(row);
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "row counts stay far below 2^52"
)]
fn below_min_change(changed: usize, samples: usize, min_change: f64) -> bool {
    (changed as f64) < min_change * samples as f64
}
