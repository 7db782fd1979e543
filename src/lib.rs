//! Spectral graph clustering.
//!
//! `fiedler` groups the nodes of an undirected graph by community structure:
//!
//! 1. [`graph`]: validate a dense adjacency matrix (or densify an edge list).
//! 2. [`laplacian`]: build the unnormalized (`D - A`) or symmetric-normalized
//!    (`I - D^{-1/2} A D^{-1/2}`) Laplacian.
//! 3. [`embed`]: eigendecompose it and keep the eigenvectors of the `k` smallest
//!    eigenvalues as an `n x k` embedding.
//! 4. [`cluster`]: partition the embedded rows with k-means (k-means++ seeding,
//!    Lloyd iterations).
//!
//! [`SpectralClustering`] runs the whole chain and returns labels, the
//! embedding and the full ascending spectrum.
//!
//! Every stage is a pure, single-threaded function of its input. The dense
//! eigendecomposition costs O(n³) time and O(n²) memory, which limits practical
//! use to graphs of a few thousand nodes.
//!
//! ```rust
//! use fiedler::{Adjacency, SpectralClustering, SpectralParams};
//!
//! // Two triangles joined by a single edge.
//! let graph = Adjacency::from_edges(
//!     6,
//!     &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)],
//! )
//! .unwrap();
//!
//! let fit = SpectralClustering::new(SpectralParams::default().with_n_clusters(2))
//!     .fit(&graph)
//!     .unwrap();
//!
//! assert_eq!(fit.labels[0], fit.labels[1]);
//! assert_eq!(fit.labels[0], fit.labels[2]);
//! assert_ne!(fit.labels[0], fit.labels[5]);
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod embed;
pub mod error;
pub mod graph;
pub mod laplacian;
pub mod spectral;

pub use cluster::{Clustering, Kmeans, KmeansFit, StopReason};
pub use embed::{embed, SpectralEmbedding, Spectrum};
pub use error::{Error, ErrorKind, Result, Stage};
pub use graph::{two_block, Adjacency};
pub use laplacian::{laplacian, laplacian_of, LaplacianKind};
pub use spectral::{SpectralClustering, SpectralFit, SpectralParams};
