//! Spectral clustering of a planted two-community graph.
//!
//! Run with `RUST_LOG=fiedler=debug cargo run --example two_communities` to see
//! the pipeline's tracing output.

use fiedler::{two_block, LaplacianKind, SpectralClustering, SpectralParams};
use rand::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Building two-cluster synthetic graph...");
    let mut rng = StdRng::seed_from_u64(42);
    let graph = two_block(20, 20, 0.4, 0.02, &mut rng)?;
    println!(
        "  {} nodes, {} connected component(s)",
        graph.n_nodes(),
        graph.connected_components()
    );

    for kind in [LaplacianKind::Unnormalized, LaplacianKind::SymmetricNormalized] {
        let params = SpectralParams::default().with_n_clusters(2).with_laplacian(kind);
        let fit = SpectralClustering::new(params).fit(&graph)?;

        println!("\n=== {kind:?} Laplacian ===");
        let head: Vec<String> = fit
            .eigenvalues()
            .iter()
            .take(10)
            .map(|v| format!("{v:.4}"))
            .collect();
        println!("  first 10 eigenvalues: [{}]", head.join(", "));
        println!("  eigengap suggests k = {}", fit.spectrum.suggest_k(8));
        println!(
            "  k-means: {:?} after {} iteration(s), inertia {:.4}",
            fit.kmeans.stop, fit.kmeans.iterations, fit.kmeans.inertia
        );
        for (block, range) in [("A", 0..20), ("B", 20..40)] {
            let labels: Vec<String> = fit.labels[range].iter().map(|l| l.to_string()).collect();
            println!("  block {block}: {}", labels.join(" "));
        }
    }

    Ok(())
}
