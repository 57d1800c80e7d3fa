//! Benchmarks for submission, continuation chains and lazy reads

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skein::prelude::*;

fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_1k");

    for workers in [1, 2, 4, 8].iter() {
        let pool = ThreadPool::new(*workers).unwrap();
        group.bench_with_input(BenchmarkId::new("workers", workers), workers, |b, _| {
            b.iter(|| {
                let tasks: Vec<_> = (0..1_000u64)
                    .map(|x| pool.submit(move || black_box(x) + 1).unwrap())
                    .collect();
                for task in &tasks {
                    black_box(task.result().unwrap());
                }
            });
        });
        pool.shutdown();
    }

    group.finish();
}

fn bench_continuation_chain(c: &mut Criterion) {
    let pool = ThreadPool::new(4).unwrap();
    let mut group = c.benchmark_group("continuation_chain");

    for depth in [10, 100, 1_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            b.iter(|| {
                let mut task = pool.submit(|| 0u64).unwrap();
                for _ in 0..depth {
                    task = task.continue_with(|x| black_box(x + 1)).unwrap();
                }
                task.result().unwrap()
            });
        });
    }

    group.finish();
    pool.shutdown();
}

fn bench_lazy_get(c: &mut Criterion) {
    let local = Lazy::new(|| vec![1u64; 64]);
    let shared = SyncLazy::new(|| vec![1u64; 64]);
    local.get();
    shared.get();

    c.bench_function("lazy_get_evaluated", |b| {
        b.iter(|| black_box(local.get().len()))
    });
    c.bench_function("sync_lazy_get_evaluated", |b| {
        b.iter(|| black_box(shared.get().len()))
    });
}

criterion_group!(benches, bench_submit, bench_continuation_chain, bench_lazy_get);
criterion_main!(benches);
