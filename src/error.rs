use thiserror::Error;

/// Pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Adjacency validation and Laplacian construction.
    Laplacian,
    /// Eigendecomposition and embedding selection.
    Embedding,
    /// Centroid-based clustering of the embedding.
    Clustering,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Laplacian => "laplacian builder",
            Stage::Embedding => "spectral embedder",
            Stage::Clustering => "cluster assigner",
        };
        f.write_str(name)
    }
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed matrix or out-of-range parameter. Never retried.
    InvalidInput,
    /// Solver failure or non-finite values.
    Numerical,
}

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Input is empty.
    #[error("empty input")]
    EmptyInput,

    /// Matrix is not square.
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },

    /// Matrix is not symmetric within tolerance.
    #[error("matrix is not symmetric: a[{row},{col}] and a[{col},{row}] differ by {delta:e}")]
    NotSymmetric {
        /// Row of the offending entry.
        row: usize,
        /// Column of the offending entry.
        col: usize,
        /// Absolute difference between the mirrored entries.
        delta: f64,
    },

    /// Adjacency matrix has a negative weight.
    #[error("negative edge weight {value} at ({row}, {col})")]
    NegativeWeight {
        /// Row of the offending entry.
        row: usize,
        /// Column of the offending entry.
        col: usize,
        /// The weight.
        value: f64,
    },

    /// Edge endpoint outside the node range.
    #[error("edge endpoint {node} out of range for {n_nodes} nodes")]
    NodeOutOfRange {
        /// Offending endpoint.
        node: usize,
        /// Number of nodes in the graph.
        n_nodes: usize,
    },

    /// Edge list contains a self-loop.
    #[error("self-loop on node {node}")]
    SelfLoop {
        /// Node with the loop.
        node: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Requested embedding dimension is outside `[1, n]`.
    #[error("invalid embedding dimension: requested {requested}, but graph has {n_nodes} nodes")]
    InvalidEmbeddingDim {
        /// Requested number of eigenvectors.
        requested: usize,
        /// Number of nodes.
        n_nodes: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// NaN or infinity encountered.
    #[error("non-finite value in {context}")]
    NonFinite {
        /// Where the value was found.
        context: &'static str,
    },

    /// The symmetric eigensolver did not converge.
    #[error("eigensolver did not converge within {max_iter} iterations")]
    NoConvergence {
        /// Iteration cap handed to the solver.
        max_iter: usize,
    },

    /// A component error annotated with the stage that raised it.
    #[error("{stage}: {source}")]
    Stage {
        /// Failing stage.
        stage: Stage,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NonFinite { .. } | Error::NoConvergence { .. } => ErrorKind::Numerical,
            Error::Stage { source, .. } => source.kind(),
            _ => ErrorKind::InvalidInput,
        }
    }

    /// Stage that raised this error, if it was raised by the pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub(crate) fn in_stage(self, stage: Stage) -> Self {
        match self {
            // Keep the innermost stage.
            e @ Error::Stage { .. } => e,
            e => Error::Stage {
                stage,
                source: Box::new(e),
            },
        }
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_sees_through_stage() {
        let e = Error::NoConvergence { max_iter: 10 }.in_stage(Stage::Embedding);
        assert_eq!(e.kind(), ErrorKind::Numerical);
        assert_eq!(e.stage(), Some(Stage::Embedding));
        assert!(e.to_string().starts_with("spectral embedder:"));

        let e = Error::EmptyInput.in_stage(Stage::Laplacian).in_stage(Stage::Clustering);
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert_eq!(e.stage(), Some(Stage::Laplacian));
    }
}
