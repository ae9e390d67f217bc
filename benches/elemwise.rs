//! Elementwise and reduction throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use numo::{ops, Array, DType};

fn seq_f32(n: usize) -> Array {
    let data: Vec<f32> = (0..n).map(|i| ((i * 17 + 3) % 1000) as f32 / 1000.0).collect();
    Array::from_vec(data).unwrap()
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_f32");
    for &n in &[1_000usize, 100_000, 1_000_000] {
        let a = seq_f32(n);
        let b = seq_f32(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| black_box(ops::add(&a, &b).unwrap()));
        });
    }
    group.finish();
}

fn bench_add_broadcast_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_broadcast_row_f32");
    for &rows in &[100usize, 1000] {
        let a = seq_f32(rows * 512).reshape(&[rows, 512]).unwrap();
        let b = seq_f32(512);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |bench, _| {
            bench.iter(|| black_box(ops::add(&a, &b).unwrap()));
        });
    }
    group.finish();
}

fn bench_exp(c: &mut Criterion) {
    let mut group = c.benchmark_group("exp_f32");
    for &n in &[100_000usize, 1_000_000] {
        let a = seq_f32(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| black_box(ops::exp(&a).unwrap()));
        });
    }
    group.finish();
}

fn bench_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_f32");
    for &n in &[100_000usize, 1_000_000, 10_000_000] {
        let a = seq_f32(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| black_box(ops::sum(&a).unwrap()));
        });
    }
    group.finish();
}

fn bench_sum_axis(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_axis_f64");
    let a = Array::full(&[1000, 1000], DType::F64, 1.0).unwrap();
    for axis in 0..2usize {
        group.bench_with_input(BenchmarkId::from_parameter(axis), &axis, |bench, &ax| {
            bench.iter(|| black_box(ops::sum_axis(&a, ax, false).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_add,
    bench_add_broadcast_row,
    bench_exp,
    bench_sum,
    bench_sum_axis
);
criterion_main!(benches);
