use criterion::{black_box, criterion_group, criterion_main, Criterion};
use resampled::{Aggregate, Estimand, GroupedDataset, ResamplingTest};

fn bench_data() -> GroupedDataset {
    GroupedDataset::from_groups([
        ("A", (0..40).map(|i| (i % 7) as f64 * 1.5).collect::<Vec<_>>()),
        ("B", (0..40).map(|i| (i % 5) as f64 * 2.0 + 1.0).collect::<Vec<_>>()),
    ])
    .unwrap()
}

fn bench_runs(c: &mut Criterion) {
    let data = bench_data();
    let contrast = Estimand::difference("B", "A");

    let mut group = c.benchmark_group("resampling");
    group.sample_size(20);

    group.bench_function("bootstrap_mean", |b| {
        b.iter(|| {
            let output = ResamplingTest::bootstrap()
                .iterations(2_000)
                .seed(1)
                .run(black_box(&data), &contrast, &Aggregate::Mean)
                .unwrap();
            black_box(output.outcome)
        });
    });

    group.bench_function("bootstrap_median_parallel", |b| {
        b.iter(|| {
            let output = ResamplingTest::bootstrap()
                .iterations(2_000)
                .seed(1)
                .parallel(true)
                .run(black_box(&data), &contrast, &Aggregate::Median)
                .unwrap();
            black_box(output.outcome)
        });
    });

    group.bench_function("permutation_mean", |b| {
        b.iter(|| {
            let output = ResamplingTest::permutation()
                .iterations(2_000)
                .seed(1)
                .run(black_box(&data), &contrast, &Aggregate::Mean)
                .unwrap();
            black_box(output.outcome)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_runs);
criterion_main!(benches);
