use std::hint::black_box;

use chrono::Utc;
use concat_bench::config::DEFAULT_CAPACITY_HINT;
use concat_bench::{setup, CountingAllocator, Harness, HarnessConfig, Strategy};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator::system();

const ALLOC_SAMPLE_ITERATIONS: u64 = 10_000;

fn bench_strategies(c: &mut Criterion) {
    let config = HarnessConfig::default();
    let (request, listener) = setup(&config).expect("Failed to bind setup listener");
    let addr = *listener.addr();

    let mut group = c.benchmark_group("concat");
    for strategy in Strategy::ALL {
        group.bench_function(strategy.name(), |b| {
            b.iter(|| {
                let now = Utc::now();
                black_box(strategy.build(&request, &addr, &now, DEFAULT_CAPACITY_HINT))
            })
        });
    }
    group.finish();
    drop(listener);

    // Allocation counts per strategy, same shape as the CLI report
    let harness = Harness::new(HarnessConfig::default().with_iterations(ALLOC_SAMPLE_ITERATIONS))
        .expect("valid harness config");
    let report = harness
        .run_all(&Strategy::ALL)
        .expect("Failed to measure allocations");
    println!("\nAllocations ({} iterations each)", ALLOC_SAMPLE_ITERATIONS);
    print!("{}", report.table());
}

fn bench_capacity_hint(c: &mut Criterion) {
    let config = HarnessConfig::default();
    let (request, listener) = setup(&config).expect("Failed to bind setup listener");
    let addr = *listener.addr();
    let now = Utc::now();

    let mut group = c.benchmark_group("bytes_capacity");
    for hint in [0usize, 16, 40, 64, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(hint), &hint, |b, &hint| {
            b.iter(|| black_box(concat_bench::strategy::manual_bytes(&request, &addr, &now, hint)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_capacity_hint);
criterion_main!(benches);
