use fiedler::{
    two_block, Adjacency, ErrorKind, LaplacianKind, SpectralClustering, SpectralParams, Stage,
};
use nalgebra::DMatrix;
use rand::prelude::*;

fn planted(seed: u64) -> Adjacency {
    let mut rng = StdRng::seed_from_u64(seed);
    two_block(20, 20, 0.4, 0.02, &mut rng).unwrap()
}

/// Fraction of nodes on the planted side, maximised over the label swap.
fn agreement(labels: &[usize]) -> f64 {
    let hits = labels
        .iter()
        .enumerate()
        .filter(|&(i, &l)| (i < 20) == (l == labels[0]))
        .count();
    let n = labels.len();
    hits.max(n - hits) as f64 / n as f64
}

// A single random graph can land near the detection threshold (an isolated
// node, an unusually dense cut), so the scenario is checked over several
// graphs and must hold on nearly all of them.
const GRAPH_SEEDS: std::ops::Range<u64> = 0..10;

#[test]
fn test_pipeline_recovers_planted_communities() {
    let mut passed = 0;
    for seed in GRAPH_SEEDS {
        let fit = SpectralClustering::new(SpectralParams::default().with_n_clusters(2))
            .fit(&planted(seed))
            .unwrap();

        let ev = fit.eigenvalues();
        assert_eq!(ev.len(), 40);
        assert!(ev.windows(2).all(|w| w[0] <= w[1]));

        let near_zero = ev[0].abs() < 1e-9;
        let gap = ev[2] > 1.5 * ev[1];
        let score = agreement(&fit.labels);
        if near_zero && gap && score >= 0.9 {
            passed += 1;
        } else {
            eprintln!("seed {seed}: eigenvalues {:?}, agreement {score}", &ev[..4]);
        }
    }
    assert!(passed >= 9, "only {passed} of 10 graphs recovered");
}

#[test]
fn test_pipeline_normalized_laplacian_also_recovers_communities() {
    let params = SpectralParams::default()
        .with_laplacian(LaplacianKind::SymmetricNormalized)
        .with_normalize_rows(true);
    let mut passed = 0;
    for seed in GRAPH_SEEDS {
        let fit = SpectralClustering::new(params.clone())
            .fit(&planted(seed))
            .unwrap();
        assert!(fit.eigenvalues().iter().all(|&v| v > -1e-9 && v < 2.0 + 1e-9));
        if agreement(&fit.labels) >= 0.9 {
            passed += 1;
        }
    }
    assert!(passed >= 9, "only {passed} of 10 graphs recovered");
}

#[test]
fn test_pipeline_same_seed_same_labels() {
    let graph = planted(42);
    let params = SpectralParams::default().with_n_clusters(3).with_seed(9);
    let a = SpectralClustering::new(params.clone()).fit(&graph).unwrap();
    let b = SpectralClustering::new(params).fit(&graph).unwrap();
    assert_eq!(a.labels, b.labels);
    assert_eq!(a.eigenvalues(), b.eigenvalues());
}

#[test]
fn test_pipeline_injected_rng_matches_seed() {
    let graph = planted(42);
    let params = SpectralParams::default().with_seed(5);
    let seeded = SpectralClustering::new(params.clone()).fit(&graph).unwrap();
    let injected = SpectralClustering::new(params)
        .fit_with_rng(&graph, &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert_eq!(seeded.labels, injected.labels);
}

#[test]
fn test_pipeline_k_equal_to_n_succeeds() {
    let graph = Adjacency::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
    let fit = SpectralClustering::new(SpectralParams::default().with_n_clusters(5))
        .fit(&graph)
        .unwrap();
    let mut labels = fit.labels.clone();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_pipeline_k_above_n_fails() {
    let graph = Adjacency::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
    let err = SpectralClustering::new(SpectralParams::default().with_n_clusters(6))
        .fit(&graph)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_pipeline_asymmetric_input_fails() {
    let mut m = DMatrix::<f64>::zeros(4, 4);
    m[(0, 1)] = 1.0;
    let err = SpectralClustering::default().fit_matrix(m).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.stage(), Some(Stage::Laplacian));
}

#[test]
fn test_pipeline_eigensolver_cap_fails_in_embedding_stage() {
    let params = SpectralParams::default().with_eigen_max_iter(1);
    let err = SpectralClustering::new(params).fit(&planted(42)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Numerical);
    assert_eq!(err.stage(), Some(Stage::Embedding));
    assert!(err.to_string().starts_with("spectral embedder:"));
}

#[test]
fn test_pipeline_isolated_node_under_normalized_laplacian() {
    // Triangle, an edge, and node 5 on its own.
    let graph = Adjacency::from_edges(6, &[(0, 1), (1, 2), (0, 2), (3, 4)]).unwrap();
    let params = SpectralParams::default()
        .with_n_clusters(3)
        .with_normalized(true);
    let fit = SpectralClustering::new(params).fit(&graph).unwrap();

    // The isolated node contributes a self-eigenvalue of exactly one.
    assert!(fit.eigenvalues().iter().any(|&v| (v - 1.0).abs() < 1e-9));
    assert_eq!(fit.spectrum.near_zero_count(1e-9), 2);

    // The third eigenvector is the isolated node's indicator, so it ends up alone.
    let l = &fit.labels;
    assert!(l.iter().all(|&x| x < 3));
    assert!((0..5).all(|i| l[i] != l[5]));
    assert!(l[0] == l[1] && l[1] == l[2] && l[3] == l[4] && l[0] != l[3]);
}
