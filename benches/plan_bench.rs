// Benchmark for traversal planning throughput
// Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use agv_traversal::{
    ConstantJerkTraversalCalculator, TraversalCalculator, VehicleMotionProperties,
};

fn props() -> VehicleMotionProperties {
    VehicleMotionProperties::new(1.6, 0.5, -0.5, 1.0, -1.0, -1.0, 1.0).unwrap()
}

fn bench_plan_from_rest(c: &mut Criterion) {
    let props = props();
    let calc = ConstantJerkTraversalCalculator;
    c.bench_function("plan 1000 traversals from rest", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for i in 1..=1000 {
                let t = calc.create(i as f64 * 0.1, 0.0, 0.0, &props).unwrap();
                total += t.total_duration();
            }
            assert!(total > 0.0);
        });
    });
}

fn bench_plan_mid_motion(c: &mut Criterion) {
    let props = props();
    let calc = ConstantJerkTraversalCalculator;
    c.bench_function("replan 1000 traversals mid-motion", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for i in 1..=1000 {
                let t = calc.create(5.0 + i as f64 * 0.01, 0.8, 0.2, &props).unwrap();
                total += t.total_duration();
            }
            assert!(total > 0.0);
        });
    });
}

fn bench_sample_traversal(c: &mut Criterion) {
    let props = props();
    let calc = ConstantJerkTraversalCalculator;
    let t = calc.create(50.0, 0.0, 0.0, &props).unwrap();
    c.bench_function("sample a traversal at 10k points", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for i in 0..10_000 {
                let time = t.total_duration() * i as f64 / 10_000.0;
                total += t.speed_at_time(time).unwrap();
            }
            assert!(total > 0.0);
        });
    });
}

criterion_group!(
    benches,
    bench_plan_from_rest,
    bench_plan_mid_motion,
    bench_sample_traversal
);
criterion_main!(benches);
