//! Spectral embedding: eigenpairs of a symmetric Laplacian.
//!
//! The eigendecomposition uses nalgebra's symmetric solver (Householder
//! tridiagonalisation followed by implicit QR), so eigenvalues are real and the
//! eigenvectors orthonormal. Cost is O(n³) time and O(n²) memory; graphs beyond
//! a few thousand nodes are out of reach.
//!
//! # Ordering
//!
//! Eigenpairs are sorted ascending by eigenvalue with a stable sort over the
//! solver's native order, so coinciding eigenvalues keep a deterministic order.
//! Each eigenvector is sign-fixed so its first non-negligible component is
//! positive. Vectors belonging to a repeated eigenvalue are still only defined up
//! to a rotation inside their eigenspace: compare subspaces, not columns.

use nalgebra::{DMatrix, SymmetricEigen};

use crate::error::{Error, Result};

/// Components below this magnitude are skipped when fixing eigenvector signs.
const SIGN_EPS: f64 = 1e-12;

/// Relative tolerance for the symmetry check on the input matrix.
const SYMMETRY_TOL: f64 = 1e-9;

/// Full eigendecomposition of a symmetric matrix, sorted ascending.
#[derive(Clone, Debug)]
pub struct Spectrum {
    eigenvalues: Vec<f64>,
    /// Column `j` is the eigenvector of `eigenvalues[j]`.
    eigenvectors: DMatrix<f64>,
}

impl Spectrum {
    /// Decompose `matrix` with the default iteration cap.
    pub fn compute(matrix: &DMatrix<f64>) -> Result<Self> {
        Self::compute_with_max_iter(matrix, default_max_iter(matrix.nrows()))
    }

    /// Decompose `matrix`, failing with [`Error::NoConvergence`] if the solver
    /// needs more than `max_iter` QR sweeps.
    ///
    /// `max_iter == 0` means no cap.
    pub fn compute_with_max_iter(matrix: &DMatrix<f64>, max_iter: usize) -> Result<Self> {
        let n = check_symmetric(matrix)?;

        let eig = SymmetricEigen::try_new(matrix.clone(), f64::EPSILON, max_iter)
            .ok_or(Error::NoConvergence { max_iter })?;

        if eig.eigenvalues.iter().any(|v| !v.is_finite())
            || eig.eigenvectors.iter().any(|v| !v.is_finite())
        {
            return Err(Error::NonFinite {
                context: "eigendecomposition",
            });
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));

        let eigenvalues: Vec<f64> = order.iter().map(|&i| eig.eigenvalues[i]).collect();
        let mut eigenvectors = DMatrix::from_fn(n, n, |i, j| eig.eigenvectors[(i, order[j])]);
        fix_signs(&mut eigenvectors);

        tracing::debug!(
            n,
            lambda_min = eigenvalues[0],
            lambda_max = eigenvalues[n - 1],
            "eigendecomposition complete"
        );

        Ok(Self {
            eigenvalues,
            eigenvectors,
        })
    }

    /// Number of eigenpairs (= matrix order).
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Always false; a spectrum is computed from a non-empty matrix.
    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    /// Eigenvalues, ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Eigenvectors as columns, in the order of [`Spectrum::eigenvalues`].
    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.eigenvectors
    }

    /// The `n x k` embedding formed by the eigenvectors of the `k` smallest
    /// eigenvalues.
    pub fn embedding(&self, k: usize) -> Result<DMatrix<f64>> {
        check_dim(k, self.len())?;
        Ok(self.eigenvectors.columns(0, k).into_owned())
    }

    /// Consecutive differences `λ[i+1] - λ[i]`.
    pub fn gaps(&self) -> Vec<f64> {
        self.eigenvalues.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Number of eigenvalues with `|λ| <= tol`.
    ///
    /// For an unnormalized Laplacian this counts connected components.
    pub fn near_zero_count(&self, tol: f64) -> usize {
        self.eigenvalues.iter().filter(|v| v.abs() <= tol).count()
    }

    /// Eigengap heuristic: the `k` in `1..=max_k` whose gap `λ[k] - λ[k-1]` is
    /// largest. Earliest `k` wins ties. Returns 1 for a single-node spectrum.
    pub fn suggest_k(&self, max_k: usize) -> usize {
        let gaps = self.gaps();
        let limit = max_k.min(gaps.len());
        let mut best_k = 1;
        let mut best_gap = f64::NEG_INFINITY;
        for (i, &gap) in gaps.iter().take(limit).enumerate() {
            if gap > best_gap {
                best_gap = gap;
                best_k = i + 1;
            }
        }
        best_k
    }
}

/// Spectral embedding of a graph: the `k` lowest eigenvectors plus the full
/// ascending spectrum.
#[derive(Clone, Debug)]
pub struct SpectralEmbedding {
    /// `n x k` matrix; row `i` is node `i`'s coordinates.
    pub embedding: DMatrix<f64>,
    /// All `n` eigenvalues, ascending.
    pub eigenvalues: Vec<f64>,
}

impl SpectralEmbedding {
    /// Rows of the embedding as point vectors, ready for [`crate::Clustering`].
    pub fn points(&self) -> Vec<Vec<f64>> {
        rows(&self.embedding)
    }
}

/// Embed with the `k` eigenvectors of smallest eigenvalue of `laplacian`.
///
/// `k` is checked before the decomposition runs.
pub fn embed(laplacian: &DMatrix<f64>, k: usize) -> Result<SpectralEmbedding> {
    check_dim(k, laplacian.nrows())?;
    let spectrum = Spectrum::compute(laplacian)?;
    Ok(SpectralEmbedding {
        embedding: spectrum.embedding(k)?,
        eigenvalues: spectrum.eigenvalues,
    })
}

/// Scale each row to unit Euclidean norm. Zero rows are left as they are.
pub fn normalize_rows(embedding: &mut DMatrix<f64>) {
    for mut row in embedding.row_iter_mut() {
        let norm = row.norm();
        if norm > SIGN_EPS {
            row /= norm;
        }
    }
}

pub(crate) fn rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

fn default_max_iter(n: usize) -> usize {
    (100 * n).max(1_000)
}

fn check_dim(k: usize, n: usize) -> Result<()> {
    if k == 0 || k > n {
        return Err(Error::InvalidEmbeddingDim {
            requested: k,
            n_nodes: n,
        });
    }
    Ok(())
}

fn check_symmetric(m: &DMatrix<f64>) -> Result<usize> {
    let (rows, cols) = m.shape();
    if rows == 0 {
        return Err(Error::EmptyInput);
    }
    if rows != cols {
        return Err(Error::NotSquare { rows, cols });
    }
    if m.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinite {
            context: "laplacian",
        });
    }
    let tol = SYMMETRY_TOL * m.amax().max(1.0);
    for i in 0..rows {
        for j in (i + 1)..cols {
            let delta = (m[(i, j)] - m[(j, i)]).abs();
            if delta > tol {
                return Err(Error::NotSymmetric {
                    row: i,
                    col: j,
                    delta,
                });
            }
        }
    }
    Ok(rows)
}

fn fix_signs(vectors: &mut DMatrix<f64>) {
    for mut col in vectors.column_iter_mut() {
        if let Some(&pivot) = col.iter().find(|v| v.abs() > SIGN_EPS) {
            if pivot < 0.0 {
                col.neg_mut();
            }
        }
    }
}
