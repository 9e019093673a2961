use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossvision::{
    pipeline::IndicatorPipeline,
    series::Series,
    signals::CrossScanner,
    simulation::PathProjector,
    types::{Interval, PricePoint},
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn sample_series(n: usize) -> Series {
    let start = Utc::now();
    let points = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.05).sin() * 10.0 + i as f64 * 0.02;
            PricePoint::new(
                start + Duration::days(i as i64),
                close - 0.3,
                close + 1.0,
                close - 1.0,
                close,
                10_000.0 + (i % 17) as f64 * 250.0,
            )
        })
        .collect();
    Series::normalize(points).unwrap()
}

fn benchmark_pipeline(c: &mut Criterion) {
    let series = sample_series(1000);
    let pipeline = IndicatorPipeline::default();

    c.bench_function("pipeline_run_1000", |b| {
        b.iter(|| {
            let _ = pipeline.run(black_box(&series));
        });
    });
}

fn benchmark_scanner(c: &mut Criterion) {
    let series = sample_series(1000);
    let points = IndicatorPipeline::default().run(&series).unwrap();
    let scanner = CrossScanner::default();

    c.bench_function("what_if_1000", |b| {
        b.iter(|| {
            let _ = scanner.what_if(black_box(&points), Interval::Daily);
        });
    });
}

fn benchmark_projection(c: &mut Criterion) {
    let series = sample_series(1000);
    let projector = PathProjector::default();

    c.bench_function("projection_20_steps", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let _ = projector.project(black_box(&series), &mut rng);
        });
    });
}

criterion_group!(
    benches,
    benchmark_pipeline,
    benchmark_scanner,
    benchmark_projection
);
criterion_main!(benches);
