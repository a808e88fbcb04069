//! Benchmarks for transform evaluation and separation.
//!
//! Run with: cargo bench -p ref-transform
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p ref-transform -- --save-baseline main
//! 2. After changes: cargo bench -p ref-transform -- --baseline main

#![allow(missing_docs, clippy::cast_precision_loss, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ref_matrix::Matrix;
use ref_transform::{
    DefaultFactory, FactoryParams, MathTransform, SeparatorParams, TransformFactory,
    geodetic_conversion, separate,
};

// =============================================================================
// Test Transform Generation
// =============================================================================

/// An affine map on (λ, φ, h, t) that keeps `t` independent of the others.
fn perturbation(i: usize) -> MathTransform {
    let e = 1e-3 * (i % 7) as f64;
    #[rustfmt::skip]
    let values = [
        1.0,   e, 0.0, 0.01,
        0.0, 1.0,   e, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 2.0,
    ];
    let mut m = Matrix::identity(5);
    for r in 0..4 {
        for c in 0..4 {
            m.set(r, c, values[r * 4 + c]).unwrap();
        }
    }
    MathTransform::linear(m).unwrap()
}

/// A chain of `depth` rounds of (affine, geodetic forward, geodetic inverse),
/// with one extra pass-through dimension, built without folding.
fn create_chain(depth: usize) -> MathTransform {
    let factory = DefaultFactory::new(FactoryParams::verbatim());
    let forward = geodetic_conversion(1.0, 0.996_647_189_335_253, true).unwrap();
    let inverse = forward.inverse().unwrap();
    let forward = factory.create_pass_through(0, &forward, 1).unwrap();
    let inverse = factory.create_pass_through(0, &inverse, 1).unwrap();

    let mut chain = perturbation(0);
    for i in 0..depth {
        chain = factory.create_concatenated(&chain, &forward).unwrap();
        chain = factory.create_concatenated(&chain, &inverse).unwrap();
        chain = factory.create_concatenated(&chain, &perturbation(i + 1)).unwrap();
    }
    chain
}

// =============================================================================
// Evaluation Benchmarks
// =============================================================================

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Evaluation");

    for depth in [1, 4, 16] {
        let chain = create_chain(depth);
        group.throughput(Throughput::Elements(chain.steps().len() as u64));

        group.bench_with_input(BenchmarkId::new("transform", depth), &chain, |b, chain| {
            b.iter(|| chain.transform(black_box(&[10.0, 45.0, 0.001, 3.0])))
        });

        group.bench_with_input(BenchmarkId::new("derivative", depth), &chain, |b, chain| {
            b.iter(|| chain.derivative(black_box(&[10.0, 45.0, 0.001, 3.0])))
        });
    }

    group.finish();
}

// =============================================================================
// Separation Benchmarks
// =============================================================================

fn bench_separation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Separation");
    let factory = DefaultFactory::default();
    let params = SeparatorParams::default();

    for depth in [1, 4, 16] {
        let chain = create_chain(depth);
        group.throughput(Throughput::Elements(chain.steps().len() as u64));

        group.bench_with_input(BenchmarkId::new("by_source", depth), &chain, |b, chain| {
            b.iter(|| separate(black_box(chain), Some(&[3]), None, &params, &factory))
        });

        group.bench_with_input(BenchmarkId::new("by_target", depth), &chain, |b, chain| {
            b.iter(|| separate(black_box(chain), None, Some(&[0, 1]), &params, &factory))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluation, bench_separation);
criterion_main!(benches);
