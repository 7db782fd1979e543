//! End-to-end spectral clustering.
//!
//! ```text
//! Adjacency ──► Laplacian ──► Spectrum ──► n x k embedding ──► k-means ──► labels
//! ```
//!
//! Errors from each stage are wrapped in [`Error::Stage`] so the caller can tell
//! which step rejected the input. Nothing is retried: every stage is
//! deterministic for a given input and seed.

use nalgebra::DMatrix;
use rand::prelude::*;

use crate::cluster::{Kmeans, KmeansFit};
use crate::embed::{self, Spectrum};
use crate::error::{Error, Result, Stage};
use crate::graph::Adjacency;
use crate::laplacian::{laplacian, LaplacianKind};

/// Spectral clustering configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpectralParams {
    /// Number of clusters `k`.
    pub n_clusters: usize,

    /// Number of eigenvectors in the embedding. Defaults to `n_clusters`.
    pub embedding_dim: Option<usize>,

    /// Laplacian variant.
    pub laplacian: LaplacianKind,

    /// Scale embedding rows to unit length before clustering (Ng, Jordan &
    /// Weiss). Mostly useful with the normalized Laplacian.
    pub normalize_rows: bool,

    /// Seed for centroid initialisation. `None` draws from thread-local entropy.
    pub seed: Option<u64>,

    /// K-means iteration cap.
    pub max_iter: usize,

    /// K-means restarts.
    pub n_init: usize,

    /// Eigensolver QR iteration cap. `None` uses the size-based default.
    pub eigen_max_iter: Option<usize>,
}

impl Default for SpectralParams {
    fn default() -> Self {
        Self {
            n_clusters: 2,
            embedding_dim: None,
            laplacian: LaplacianKind::Unnormalized,
            normalize_rows: false,
            seed: Some(42),
            max_iter: 300,
            n_init: 1,
            eigen_max_iter: None,
        }
    }
}

impl SpectralParams {
    /// Set the cluster count.
    pub fn with_n_clusters(mut self, k: usize) -> Self {
        self.n_clusters = k;
        self
    }

    /// Set the embedding dimension independently of the cluster count.
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = Some(dim);
        self
    }

    /// Set the Laplacian variant.
    pub fn with_laplacian(mut self, kind: LaplacianKind) -> Self {
        self.laplacian = kind;
        self
    }

    /// Shorthand for [`LaplacianKind::from_normalized`].
    pub fn with_normalized(self, normalized: bool) -> Self {
        self.with_laplacian(LaplacianKind::from_normalized(normalized))
    }

    /// Toggle row normalisation of the embedding.
    pub fn with_normalize_rows(mut self, normalize_rows: bool) -> Self {
        self.normalize_rows = normalize_rows;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the k-means iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of k-means restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Cap the eigensolver's QR iterations; exceeding it is a numerical error.
    pub fn with_eigen_max_iter(mut self, max_iter: usize) -> Self {
        self.eigen_max_iter = Some(max_iter);
        self
    }

    /// Effective embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim.unwrap_or(self.n_clusters)
    }

    fn kmeans(&self) -> Kmeans {
        Kmeans::new(self.n_clusters)
            .with_max_iter(self.max_iter)
            .with_n_init(self.n_init)
    }

    fn check(&self, n: usize) -> Result<()> {
        if self.n_clusters == 0 || self.n_clusters > n {
            return Err(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: n,
            }
            .in_stage(Stage::Clustering));
        }
        let dim = self.embedding_dim();
        if dim == 0 || dim > n {
            return Err(Error::InvalidEmbeddingDim {
                requested: dim,
                n_nodes: n,
            }
            .in_stage(Stage::Embedding));
        }
        Ok(())
    }
}

/// Spectral clustering of graph nodes.
#[derive(Clone, Debug, Default)]
pub struct SpectralClustering {
    params: SpectralParams,
}

/// Output of a spectral clustering run.
#[derive(Clone, Debug)]
pub struct SpectralFit {
    /// One label in `[0, k)` per node. Only the partition is meaningful.
    pub labels: Vec<usize>,
    /// `n x embedding_dim` embedding that was clustered (after optional row
    /// normalisation).
    pub embedding: DMatrix<f64>,
    /// Full ascending spectrum of the Laplacian.
    pub spectrum: Spectrum,
    /// K-means diagnostics.
    pub kmeans: KmeansFit,
}

impl SpectralFit {
    /// All `n` Laplacian eigenvalues, ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        self.spectrum.eigenvalues()
    }

    /// Cluster again with different parameters, reusing the eigendecomposition.
    ///
    /// `params.laplacian` is ignored: the spectrum belongs to the Laplacian of
    /// the original fit.
    pub fn recluster(&self, params: &SpectralParams) -> Result<SpectralFit> {
        params.check(self.spectrum.len())?;
        let spectrum = self.spectrum.clone();
        match params.seed {
            Some(seed) => assign(spectrum, params, &mut StdRng::seed_from_u64(seed)),
            None => assign(spectrum, params, &mut rand::rng()),
        }
    }
}

impl SpectralClustering {
    /// Create a clusterer with the given parameters.
    pub fn new(params: SpectralParams) -> Self {
        Self { params }
    }

    /// Configured parameters.
    pub fn params(&self) -> &SpectralParams {
        &self.params
    }

    /// Cluster the nodes of `adjacency`, seeding k-means from `params.seed`.
    pub fn fit(&self, adjacency: &Adjacency) -> Result<SpectralFit> {
        match self.params.seed {
            Some(seed) => self.fit_with_rng(adjacency, &mut StdRng::seed_from_u64(seed)),
            None => self.fit_with_rng(adjacency, &mut rand::rng()),
        }
    }

    /// Validate a raw adjacency matrix, then [`fit`](Self::fit) it.
    pub fn fit_matrix(&self, matrix: DMatrix<f64>) -> Result<SpectralFit> {
        let adjacency = Adjacency::new(matrix).map_err(|e| e.in_stage(Stage::Laplacian))?;
        self.fit(&adjacency)
    }

    /// Cluster the nodes of `adjacency`, drawing k-means randomness from `rng`.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &self,
        adjacency: &Adjacency,
        rng: &mut R,
    ) -> Result<SpectralFit> {
        let n = adjacency.n_nodes();
        self.params.check(n)?;

        tracing::debug!(
            n,
            k = self.params.n_clusters,
            dim = self.params.embedding_dim(),
            laplacian = ?self.params.laplacian,
            "spectral clustering"
        );

        let l = laplacian(adjacency, self.params.laplacian);
        let spectrum = match self.params.eigen_max_iter {
            Some(max_iter) => Spectrum::compute_with_max_iter(&l, max_iter),
            None => Spectrum::compute(&l),
        }
        .map_err(|e| e.in_stage(Stage::Embedding))?;
        assign(spectrum, &self.params, rng)
    }
}

fn assign<R: Rng + ?Sized>(
    spectrum: Spectrum,
    params: &SpectralParams,
    rng: &mut R,
) -> Result<SpectralFit> {
    let mut embedding = spectrum
        .embedding(params.embedding_dim())
        .map_err(|e| e.in_stage(Stage::Embedding))?;
    if params.normalize_rows {
        embed::normalize_rows(&mut embedding);
    }

    let points = embed::rows(&embedding);
    let kmeans = params
        .kmeans()
        .fit_with_rng(&points, rng)
        .map_err(|e| e.in_stage(Stage::Clustering))?;

    Ok(SpectralFit {
        labels: kmeans.labels.clone(),
        embedding,
        spectrum,
        kmeans,
    })
}
