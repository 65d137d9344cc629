use thiserror::Error;

use crate::types::{CentroidIdx, Dimension, Distance, PointCount};

/// Everything that can go wrong while building point sets, computing distances or clustering.
#[derive(Debug, Error)]
pub enum ClusteringError {
    /// Rows of a point set have different lengths, or flat data does not match n*m.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Two point sets that are combined have a different number of coordinates.
    #[error("dimension mismatch: left points have {left} coordinates, right points have {right}")]
    DimensionMismatch { left: Dimension, right: Dimension },

    /// A point set without points or without coordinates.
    #[error("point set is empty (n = {n}, dim = {dim})")]
    EmptyPointSet { n: PointCount, dim: Dimension },

    /// k must satisfy 1 <= k <= n.
    #[error("invalid number of clusters: k = {k}, but there are n = {n} points (need 1 <= k <= n)")]
    InvalidK { k: PointCount, n: PointCount },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A centroid lost all of its points and the empty-cluster policy is `Fail`.
    #[error("centroid {centroid} has no assigned points in iteration {iteration}")]
    EmptyCluster {
        centroid: CentroidIdx,
        iteration: usize,
    },

    /// Raised by [Clustering::assert_converged](crate::Clustering::assert_converged).
    #[error("did not converge within {iterations} iterations (last shift: {shift})")]
    NotConverged { iterations: usize, shift: Distance },

    #[error("cannot parse line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ClusteringError>;
