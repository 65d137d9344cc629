//! K-means clustering with Lloyd's algorithm and pairwise Euclidean distances.
//!
//! Given n points with m coordinates each and a number of clusters k, [compute_kmeans] returns
//! k centroids and for each point the index of its nearest centroid.
//!
//! - [pairwise_distance] computes the matrix of Euclidean distances between two point sets
//!   (or one point set and itself). The result is always a matrix, also for a single pair.
//! - [compute_kmeans] chooses k initial centroids from the data, then alternates between
//!   assigning points to their nearest centroid and moving every centroid to the mean of its
//!   points, until the summed centroid shift is smaller than sqrt(tolerance).
//!
//! The random source is explicit: set [OptionalParameters::seed] or use
//! [compute_kmeans_with_rng] for reproducible runs.
//!
//! # Example
//!
//! ```rust
//! use lloyd_kmeans::{compute_kmeans, ClusteringProblem, Initialization, OptionalParameters, PointSet};
//!
//! let points = PointSet::new(vec![
//!     vec![0.0, 0.0], vec![0.0, 1.0],
//!     vec![10.0, 0.0], vec![10.0, 1.0],
//! ]).unwrap();
//! let prob = ClusteringProblem { k: 2 };
//! let params = OptionalParameters::default()
//!     .with_seed(42)
//!     .with_initialization(Initialization::FarthestFirst);
//!
//! let clustering = compute_kmeans(&points, &prob, &params).unwrap();
//! assert!(clustering.converged());
//! let labels = clustering.assignment();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[1], labels[2]);
//! ```

mod types;
pub use types::{Assignment, CentroidIdx, Coordinate, Dimension, Distance, PointCount, PointIdx};

mod error;
pub use error::{ClusteringError, Result};

pub mod space;
pub use space::PointSet;

pub mod distance;
pub use distance::{euclidean, pairwise_distance, DistanceMatrix};

mod config;
pub use config::{
    ClusteringProblem, EmptyClusterPolicy, Initialization, OptionalParameters, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TOLERANCE,
};

mod assertions;
pub use assertions::{assert_clustering_problem, assert_problem_parameters};

pub mod initialization;

mod clustering;
pub use clustering::Clustering;

pub mod lloyd;
pub use lloyd::{compute_kmeans, compute_kmeans_with_rng};

#[cfg(feature = "python")]
mod python_interface;
