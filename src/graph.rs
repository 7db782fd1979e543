//! Graph input: a validated dense adjacency matrix.
//!
//! Everything downstream assumes the adjacency matrix is square, finite,
//! non-negative and symmetric. [`Adjacency`] checks this once at construction,
//! so later stages can borrow it without re-validating.
//!
//! Dense storage is O(n²); it is intended for graphs up to a few thousand nodes,
//! which is also where the O(n³) eigendecomposition stops being practical.

use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::cluster::util::UnionFind;
use crate::error::{Error, Result};

/// Relative tolerance for the symmetry check.
const SYMMETRY_TOL: f64 = 1e-9;

/// Symmetric, non-negative adjacency matrix of an undirected graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Adjacency {
    matrix: DMatrix<f64>,
}

impl Adjacency {
    /// Validate and wrap a dense matrix.
    ///
    /// Rejects empty, non-square, non-finite, negative or asymmetric input.
    /// Asymmetry is measured against `1e-9 * max(1, max |a_ij|)`.
    pub fn new(matrix: DMatrix<f64>) -> Result<Self> {
        let (rows, cols) = matrix.shape();
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyInput);
        }
        if rows != cols {
            return Err(Error::NotSquare { rows, cols });
        }

        let mut max_abs = 0.0f64;
        for j in 0..cols {
            for i in 0..rows {
                let v = matrix[(i, j)];
                if !v.is_finite() {
                    return Err(Error::NonFinite {
                        context: "adjacency matrix",
                    });
                }
                if v < 0.0 {
                    return Err(Error::NegativeWeight {
                        row: i,
                        col: j,
                        value: v,
                    });
                }
                max_abs = max_abs.max(v);
            }
        }

        let tol = SYMMETRY_TOL * max_abs.max(1.0);
        for i in 0..rows {
            for j in (i + 1)..cols {
                let delta = (matrix[(i, j)] - matrix[(j, i)]).abs();
                if delta > tol {
                    return Err(Error::NotSymmetric {
                        row: i,
                        col: j,
                        delta,
                    });
                }
            }
        }

        Ok(Self { matrix })
    }

    /// Build from row vectors.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        for row in rows {
            if row.len() != n {
                return Err(Error::NotSquare {
                    rows: n,
                    cols: row.len(),
                });
            }
        }
        Self::new(DMatrix::from_fn(n, n, |i, j| rows[i][j]))
    }

    /// Densify an unweighted, undirected edge list over `n_nodes` nodes.
    ///
    /// Repeated edges accumulate weight.
    pub fn from_edges(n_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let weighted: Vec<(usize, usize, f64)> = edges.iter().map(|&(u, v)| (u, v, 1.0)).collect();
        Self::from_weighted_edges(n_nodes, &weighted)
    }

    /// Densify a weighted, undirected edge list over `n_nodes` nodes.
    pub fn from_weighted_edges(n_nodes: usize, edges: &[(usize, usize, f64)]) -> Result<Self> {
        if n_nodes == 0 {
            return Err(Error::EmptyInput);
        }
        let mut matrix = DMatrix::<f64>::zeros(n_nodes, n_nodes);
        for &(u, v, w) in edges {
            for node in [u, v] {
                if node >= n_nodes {
                    return Err(Error::NodeOutOfRange { node, n_nodes });
                }
            }
            if u == v {
                return Err(Error::SelfLoop { node: u });
            }
            if !w.is_finite() {
                return Err(Error::NonFinite {
                    context: "edge weight",
                });
            }
            if w < 0.0 {
                return Err(Error::NegativeWeight {
                    row: u,
                    col: v,
                    value: w,
                });
            }
            matrix[(u, v)] += w;
            matrix[(v, u)] += w;
        }
        Ok(Self { matrix })
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.matrix.nrows()
    }

    /// Borrow the underlying matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Unwrap into the underlying matrix.
    pub fn into_inner(self) -> DMatrix<f64> {
        self.matrix
    }

    /// Degree vector: `d[i] = Σ_j a[i, j]`.
    pub fn degrees(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.n_nodes(),
            self.matrix.row_iter().map(|row| row.sum()),
        )
    }

    /// Number of connected components (edges with positive weight only).
    ///
    /// For the unnormalized Laplacian this equals the multiplicity of the zero
    /// eigenvalue.
    pub fn connected_components(&self) -> usize {
        let n = self.n_nodes();
        let mut uf = UnionFind::new(n);
        for j in 0..n {
            for i in (j + 1)..n {
                if self.matrix[(i, j)] > 0.0 {
                    uf.union(i, j);
                }
            }
        }
        uf.count_roots()
    }
}

/// Two-community random graph (a two-block stochastic block model).
///
/// Nodes `0..n1` form the first block and `n1..n1+n2` the second. Each pair is
/// joined with probability `p_in` inside a block and `p_out` across blocks.
/// Pairs are visited block one, block two, then cross pairs, so a seeded `rng`
/// gives a reproducible graph.
pub fn two_block<R: Rng + ?Sized>(
    n1: usize,
    n2: usize,
    p_in: f64,
    p_out: f64,
    rng: &mut R,
) -> Result<Adjacency> {
    let n = n1 + n2;
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if !(0.0..=1.0).contains(&p_in) {
        return Err(Error::InvalidParameter {
            name: "p_in",
            message: "must be in [0, 1]",
        });
    }
    if !(0.0..=1.0).contains(&p_out) {
        return Err(Error::InvalidParameter {
            name: "p_out",
            message: "must be in [0, 1]",
        });
    }

    let mut matrix = DMatrix::<f64>::zeros(n, n);
    let mut link = |i: usize, j: usize, p: f64, rng: &mut R| {
        if rng.random::<f64>() < p {
            matrix[(i, j)] = 1.0;
            matrix[(j, i)] = 1.0;
        }
    };

    for i in 0..n1 {
        for j in (i + 1)..n1 {
            link(i, j, p_in, &mut *rng);
        }
    }
    for i in n1..n {
        for j in (i + 1)..n {
            link(i, j, p_in, &mut *rng);
        }
    }
    for i in 0..n1 {
        for j in n1..n {
            link(i, j, p_out, &mut *rng);
        }
    }

    Ok(Adjacency { matrix })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::prelude::*;

    #[test]
    fn test_adjacency_rejects_asymmetric() {
        let err = Adjacency::from_rows(&[vec![0.0, 1.0], vec![0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, Error::NotSymmetric { row: 0, col: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_adjacency_rejects_non_square_and_negative() {
        let err = Adjacency::new(DMatrix::zeros(2, 3)).unwrap_err();
        assert!(matches!(err, Error::NotSquare { rows: 2, cols: 3 }));

        let err = Adjacency::from_rows(&[vec![0.0, -1.0], vec![-1.0, 0.0]]).unwrap_err();
        assert!(matches!(err, Error::NegativeWeight { .. }));

        let err = Adjacency::from_rows(&[vec![0.0, f64::NAN], vec![f64::NAN, 0.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }

    #[test]
    fn test_adjacency_tolerates_tiny_asymmetry() {
        let a = Adjacency::from_rows(&[vec![0.0, 1.0], vec![1.0 + 1e-12, 0.0]]);
        assert!(a.is_ok());
    }

    #[test]
    fn test_adjacency_edge_list_densifies() {
        let a = Adjacency::from_edges(4, &[(0, 1), (1, 2), (1, 2)]).unwrap();
        assert_eq!(a.matrix()[(1, 2)], 2.0);
        assert_eq!(a.matrix()[(2, 1)], 2.0);
        assert_eq!(a.degrees().as_slice(), &[1.0, 3.0, 2.0, 0.0]);
        assert_eq!(a.connected_components(), 2);

        assert!(matches!(
            Adjacency::from_edges(3, &[(0, 3)]),
            Err(Error::NodeOutOfRange { node: 3, n_nodes: 3 })
        ));
        assert!(matches!(
            Adjacency::from_edges(3, &[(1, 1)]),
            Err(Error::SelfLoop { node: 1 })
        ));
    }

    #[test]
    fn test_two_block_is_reproducible() {
        let a = two_block(20, 20, 0.4, 0.02, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = two_block(20, 20, 0.4, 0.02, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_nodes(), 40);
        // Symmetric with zero diagonal by construction.
        assert!(Adjacency::new(a.matrix().clone()).is_ok());
        assert!((0..40).all(|i| a.matrix()[(i, i)] == 0.0));
    }

    #[test]
    fn test_two_block_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = two_block(3, 4, 1.0, 0.0, &mut rng).unwrap();
        assert_eq!(a.connected_components(), 2);
        assert_eq!(a.degrees()[0], 2.0);
        assert_eq!(a.degrees()[5], 3.0);

        assert!(two_block(3, 3, 1.5, 0.0, &mut rng).is_err());
    }
}
