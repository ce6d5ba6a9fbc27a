//! Throughput of the momentum bar engine on synthetic tick streams.
//!
//! Run with: `cargo bench --package momentum-bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use momentum_bench::{WalkConfig, random_walk};
use momentum_lib::{BarSeries, MomentumAggregator, MomentumConfig, OpenPolicy, TickGrid};
use std::hint::black_box;

fn configs() -> Vec<(&'static str, MomentumConfig)> {
    vec![
        (
            "static-4",
            MomentumConfig::new(4, 4, OpenPolicy::NoGap).expect("valid config"),
        ),
        (
            "dynamic-2-8",
            MomentumConfig::new(2, 8, OpenPolicy::NoGap).expect("valid config"),
        ),
        (
            "true-open-4",
            MomentumConfig::new(4, 4, OpenPolicy::TrueOpen).expect("valid config"),
        ),
    ]
}

fn run(config: &MomentumConfig, ticks: &[momentum_lib::Tick]) -> usize {
    let grid = TickGrid::new(0.25).expect("valid tick size");
    let mut series = BarSeries::new(MomentumAggregator::new(config.clone(), grid));
    for tick in ticks {
        series.push(tick, false).expect("tick accepted");
    }
    series.len()
}

fn aggregate_benchmark(c: &mut Criterion) {
    let walk = random_walk(WalkConfig::default());
    let gappy = random_walk(WalkConfig::default().with_gaps(500, 40));

    let mut group = c.benchmark_group("aggregate");
    group.throughput(Throughput::Elements(walk.len() as u64));

    for (name, config) in configs() {
        group.bench_with_input(BenchmarkId::new("walk", name), &config, |b, config| {
            b.iter(|| run(config, black_box(&walk)));
        });
        group.bench_with_input(BenchmarkId::new("gaps", name), &config, |b, config| {
            b.iter(|| run(config, black_box(&gappy)));
        });
    }

    group.finish();
}

criterion_group!(benches, aggregate_benchmark);
criterion_main!(benches);
