//! Graph Laplacians.
//!
//! - Unnormalized: `L = D - A`. Positive semi-definite, every row sums to zero,
//!   and the zero eigenvalue has multiplicity equal to the number of connected
//!   components.
//! - Symmetric normalized: `L_sym = I - D^{-1/2} A D^{-1/2}`. Eigenvalues lie in
//!   `[0, 2]`.
//!
//! For the normalized variant an isolated node (degree 0) is scaled by 1 rather
//! than by `1/sqrt(0)`. Its row and column of `A` are zero anyway, so it ends up
//! with an identity row in `L_sym` and contributes a self-eigenvalue of 1.

use nalgebra::DMatrix;

use crate::error::Result;
use crate::graph::Adjacency;

/// Which Laplacian to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LaplacianKind {
    /// `L = D - A`.
    #[default]
    Unnormalized,
    /// `L = I - D^{-1/2} A D^{-1/2}`.
    SymmetricNormalized,
}

impl LaplacianKind {
    /// Map the boolean `normalized` switch onto a kind.
    pub fn from_normalized(normalized: bool) -> Self {
        if normalized {
            Self::SymmetricNormalized
        } else {
            Self::Unnormalized
        }
    }
}

/// Build the Laplacian of `adjacency`.
///
/// Infallible: [`Adjacency`] has already enforced squareness, symmetry and
/// non-negativity.
pub fn laplacian(adjacency: &Adjacency, kind: LaplacianKind) -> DMatrix<f64> {
    let a = adjacency.matrix();
    let n = adjacency.n_nodes();
    let degrees = adjacency.degrees();

    let l = match kind {
        LaplacianKind::Unnormalized => {
            let mut l = -a.clone();
            for i in 0..n {
                l[(i, i)] += degrees[i];
            }
            l
        }
        LaplacianKind::SymmetricNormalized => {
            let scale: Vec<f64> = degrees
                .iter()
                .map(|&d| if d > 0.0 { d.sqrt().recip() } else { 1.0 })
                .collect();
            DMatrix::from_fn(n, n, |i, j| {
                let identity = if i == j { 1.0 } else { 0.0 };
                identity - scale[i] * a[(i, j)] * scale[j]
            })
        }
    };

    tracing::debug!(n, ?kind, "built laplacian");
    l
}

/// Validate a raw matrix as an adjacency matrix, then build its Laplacian.
pub fn laplacian_of(matrix: DMatrix<f64>, kind: LaplacianKind) -> Result<DMatrix<f64>> {
    let adjacency = Adjacency::new(matrix)?;
    Ok(laplacian(&adjacency, kind))
}
