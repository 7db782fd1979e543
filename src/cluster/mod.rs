//! Centroid-based clustering of embedded points.
//!
//! Spectral clustering turns a graph problem into a point-cloud problem: each
//! node becomes a row of the spectral embedding, and nodes in the same community
//! land close together. This module partitions those rows.
//!
//! ## K-means
//!
//! Assign each point to the nearest centroid, then update centroids to the mean
//! of their points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! Seeding uses k-means++, which spreads the initial centroids out in proportion
//! to squared distance. On a spectral embedding of a graph with well-separated
//! communities the rows collapse to roughly `k` tight points, so a single seeded
//! run is usually enough; `n_init` restarts are available for noisier graphs.
//!
//! Labels carry no meaning beyond the partition: label 0 under one seed need not
//! be label 0 under another.
//!
//! ## Usage
//!
//! ```rust
//! use fiedler::cluster::{Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod kmeans;
mod traits;
pub(crate) mod util;

pub use kmeans::{Kmeans, KmeansFit, StopReason};
pub use traits::Clustering;
