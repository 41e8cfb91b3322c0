//! Kernel k-means training and assignment benchmarks.
//!
//! Training seeds centroids from the leading rows and runs the bounded
//! refinement passes; assignment labels every row of the same matrix.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use mlbench_benches::{error::BenchSetupError, params::DatasetParams, setup::uniform_matrix};
use mlbench_core::kmeans::{KernelKMeans, KernelKMeansParams};

/// Feature count of the default k-means benchmark.
const FEATURES: usize = 10;

/// Dataset sizes to benchmark.
const SAMPLE_COUNTS: &[usize] = &[250, 1_000, 2_500];

fn kmeans_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let params = KernelKMeansParams::default();
    let mut training = c.benchmark_group("kmeans_training");
    training.sample_size(10);
    let mut prepared = Vec::with_capacity(SAMPLE_COUNTS.len());
    for &samples in SAMPLE_COUNTS {
        let bench_params = DatasetParams {
            samples,
            features: FEATURES,
        };
        let data = uniform_matrix(bench_params)?;
        training.bench_with_input(
            BenchmarkId::from_parameter(bench_params),
            &data,
            |b, matrix| {
                b.iter(|| KernelKMeans::fit_from_leading_rows(params, matrix.view()));
            },
        );
        let model = KernelKMeans::fit_from_leading_rows(params, data.view())?;
        prepared.push((bench_params, data, model));
    }
    training.finish();

    let mut inference = c.benchmark_group("kmeans_inference");
    for (bench_params, data, model) in &prepared {
        inference.bench_with_input(
            BenchmarkId::from_parameter(bench_params),
            &(data, model),
            |b, (rows, fitted)| {
                b.iter(|| fitted.predict_all(rows.view()));
            },
        );
    }
    inference.finish();
    Ok(())
}

fn kmeans(c: &mut Criterion) {
    if let Err(err) = kmeans_impl(c) {
        panic!("kmeans benchmark setup failed: {err}");
    }
}

criterion_group!(benches, kmeans);
criterion_main!(benches);
