//! Gaussian blob helper routines.

use std::f64::consts::PI;

use ndarray::ArrayViewMut1;
use rand::{Rng, rngs::SmallRng};

use super::BlobConfig;
use crate::error::DatasetError;

pub(super) fn validate_blob_config(config: &BlobConfig) -> Result<(), DatasetError> {
    if config.centers == 0 {
        return Err(DatasetError::ZeroClasses);
    }
    if config.centers > config.samples {
        return Err(DatasetError::CentersExceedSamples {
            centers: config.centers,
            samples: config.samples,
        });
    }
    if !config.cluster_std.is_finite() || config.cluster_std <= 0.0 {
        return Err(DatasetError::InvalidFloatParameter {
            parameter: "cluster_std",
        });
    }
    if !config.center_box.is_finite() || config.center_box <= 0.0 {
        return Err(DatasetError::InvalidFloatParameter {
            parameter: "center_box",
        });
    }
    Ok(())
}

pub(super) fn blob_centers(config: &BlobConfig, rng: &mut SmallRng) -> Vec<Vec<f64>> {
    (0..config.centers)
        .map(|_| {
            (0..config.features)
                .map(|_| rng.gen_range(-config.center_box..config.center_box))
                .collect()
        })
        .collect()
}

pub(super) fn blob_point(
    center: &[f64],
    spread: f64,
    rng: &mut SmallRng,
    row: ArrayViewMut1<'_, f64>,
) {
    for (value, mean) in row.into_iter().zip(center) {
        *value = mean + spread * standard_normal_sample(rng);
    }
}

/// Box-Muller transform over two uniform draws. Clamping the first draw away
/// from zero bounds the magnitude by `sqrt(-2 ln ε)`.
pub(crate) fn standard_normal_sample(rng: &mut SmallRng) -> f64 {
    let mut u1 = rng.gen_range(0.0_f64..1.0_f64);
    if u1 <= f64::EPSILON {
        u1 = f64::EPSILON;
    }
    let u2 = rng.gen_range(0.0_f64..1.0_f64);
    let radius = (-2.0_f64 * u1.ln()).sqrt();
    let theta = 2.0_f64 * PI * u2;
    radius * theta.cos()
}
