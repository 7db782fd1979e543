use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fiedler::cluster::{Clustering, Kmeans};
use fiedler::{laplacian, two_block, LaplacianKind, SpectralClustering, SpectralParams, Spectrum};
use rand::prelude::*;

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    // Generate synthetic data
    let mut rng = StdRng::seed_from_u64(42);
    let n = 1000;
    let d = 16;
    let k = 10;

    let data: Vec<Vec<f64>> = (0..n)
        .map(|_| (0..d).map(|_| rng.random::<f64>()).collect())
        .collect();

    group.bench_function("fit_predict_n1000_d16_k10", |b| {
        b.iter(|| {
            let model = Kmeans::new(k).with_max_iter(10).with_seed(42);
            model.fit_predict(black_box(&data)).unwrap();
        })
    });

    group.finish();
}

fn bench_spectral(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral");

    let mut rng = StdRng::seed_from_u64(42);
    let graph = two_block(100, 100, 0.2, 0.01, &mut rng).unwrap();

    group.bench_function("eigendecomposition_n200", |b| {
        let l = laplacian(&graph, LaplacianKind::Unnormalized);
        b.iter(|| Spectrum::compute(black_box(&l)).unwrap())
    });

    group.bench_function("pipeline_n200_k2", |b| {
        let model = SpectralClustering::new(SpectralParams::default());
        b.iter(|| model.fit(black_box(&graph)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_kmeans, bench_spectral);
criterion_main!(benches);
