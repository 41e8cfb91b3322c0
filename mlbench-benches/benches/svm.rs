//! One-vs-one RBF support-vector classifier benchmarks.
//!
//! Fitting trains one `linfa-svm` machine per class pair; prediction collects
//! every pairwise decision and votes.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use mlbench_benches::{
    error::BenchSetupError, params::ClassifierBenchParams, setup::classification_split,
};
use mlbench_core::svm::{Svc, SvcParams};

/// Dataset shapes to benchmark; the first matches the default benchmark.
const SHAPES: &[ClassifierBenchParams] = &[
    ClassifierBenchParams {
        samples: 150,
        features: 4,
        classes: 3,
    },
    ClassifierBenchParams {
        samples: 600,
        features: 4,
        classes: 3,
    },
    ClassifierBenchParams {
        samples: 600,
        features: 4,
        classes: 6,
    },
];

fn svm_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let params = SvcParams::default();
    let mut group = c.benchmark_group("svm");
    group.sample_size(10);
    for &shape in SHAPES {
        let split = classification_split(shape)?;
        let model = Svc::fit(
            params,
            split.train.features.view(),
            &split.train.targets,
            shape.classes,
        )?;

        group.bench_with_input(BenchmarkId::new("fit", shape), &split, |b, prepared| {
            b.iter(|| {
                Svc::fit(
                    params,
                    prepared.train.features.view(),
                    &prepared.train.targets,
                    shape.classes,
                )
            });
        });
        group.bench_with_input(
            BenchmarkId::new("predict", shape),
            &(&split, &model),
            |b, (prepared, fitted)| {
                b.iter(|| fitted.predict(prepared.test.features.view()));
            },
        );
    }
    group.finish();
    Ok(())
}

fn svm(c: &mut Criterion) {
    if let Err(err) = svm_impl(c) {
        panic!("svm benchmark setup failed: {err}");
    }
}

criterion_group!(benches, svm);
criterion_main!(benches);
