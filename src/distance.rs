///////////////////////////////////////////////////////////////
///////////////////// module: distance ////////////////////////
///////////////////////////////////////////////////////////////

/// Euclidean distances between all pairs of points of two point sets.
///
/// The result is always a [DistanceMatrix] of shape n1 x n2, also for a single pair of points.
use rayon::prelude::*;
use tracing::warn;

use crate::error::{ClusteringError, Result};
use crate::space::PointSet;
use crate::types::{CentroidIdx, Coordinate, Distance, PointCount, PointIdx};

/// Returns the Euclidean distance between two coordinate slices of the same length.
pub fn euclidean(a: &[Coordinate], b: &[Coordinate]) -> Distance {
    squared_euclidean(a, b).sqrt()
}

pub(crate) fn squared_euclidean(a: &[Coordinate], b: &[Coordinate]) -> Distance {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// A dense, row-major matrix of distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    distances: Vec<Distance>,
    rows: PointCount,
    cols: PointCount,
}

impl DistanceMatrix {
    /// Number of rows, i.e., points of the left point set.
    pub fn rows(&self) -> PointCount {
        self.rows
    }

    /// Number of columns, i.e., points of the right point set.
    pub fn cols(&self) -> PointCount {
        self.cols
    }

    /// Returns the distance between left point i and right point j.
    pub fn get(&self, i: PointIdx, j: PointIdx) -> Distance {
        self.distances[i * self.cols + j]
    }

    /// Returns all distances of left point i.
    pub fn row(&self, i: PointIdx) -> &[Distance] {
        &self.distances[i * self.cols..(i + 1) * self.cols]
    }

    /// Returns the matrix as a vector of rows.
    pub fn to_rows(&self) -> Vec<Vec<Distance>> {
        self.distances.chunks(self.cols).map(|row| row.to_vec()).collect()
    }

    /// Returns the transposed matrix (n2 x n1).
    pub fn transpose(&self) -> DistanceMatrix {
        let mut distances = Vec::with_capacity(self.distances.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                distances.push(self.get(i, j));
            }
        }
        DistanceMatrix {
            distances,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Returns the column index of the smallest entry in row i.
    /// Ties are broken by the lowest index.
    pub fn argmin_row(&self, i: PointIdx) -> CentroidIdx {
        let mut best = 0;
        let mut best_d = Distance::INFINITY;
        for (j, &d) in self.row(i).iter().enumerate() {
            if d < best_d {
                best_d = d;
                best = j;
            }
        }
        best
    }

    /// Checks that the matrix is square, symmetric (up to eps) and has a zero diagonal.
    pub fn is_symmetric(&self, eps: Distance) -> bool {
        if self.rows != self.cols {
            warn!("matrix is not square: {} x {}", self.rows, self.cols);
            return false;
        }
        for i in 0..self.rows {
            if self.get(i, i).abs() > eps {
                warn!("identity of indiscernibles is violated: i={}, d(i,i)={}", i, self.get(i, i));
                return false;
            }
            for j in (i + 1)..self.cols {
                let (d_ij, d_ji) = (self.get(i, j), self.get(j, i));
                if (d_ij - d_ji).abs() > eps {
                    warn!("symmetry is violated: i={}, j={}, d(i,j)={}, d(j,i)={}", i, j, d_ij, d_ji);
                    return false;
                }
            }
        }
        true
    }

    /// Checks the triangle inequality d(x,y) <= d(x,z) + d(z,y) (up to eps) for all triples.
    /// Care: this needs O(n<sup>3</sup>) time.
    pub fn satisfies_triangle_inequality(&self, eps: Distance) -> bool {
        if self.rows != self.cols {
            warn!("matrix is not square: {} x {}", self.rows, self.cols);
            return false;
        }
        for x in 0..self.rows {
            for y in 0..self.rows {
                let d_xy = self.get(x, y);
                for z in 0..self.rows {
                    let (d_xz, d_zy) = (self.get(x, z), self.get(z, y));
                    if d_xy > d_xz + d_zy + eps {
                        warn!(
                            "triangle inequality is violated: x={}, y={}, z={}, i.e., {} > {} + {}",
                            x, y, z, d_xy, d_xz, d_zy
                        );
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Computes the n1 x n2 matrix of Euclidean distances between the points of a and b.
/// If b is None, the distances of a to itself are computed (n1 x n1).
///
/// Fails with [ClusteringError::DimensionMismatch] before any computation if a and b have a
/// different number of coordinates. Rows are computed in parallel on the current rayon pool.
///
/// # Example
///
/// ```rust
/// use lloyd_kmeans::{pairwise_distance, PointSet};
/// let a = PointSet::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
/// let b = PointSet::new(vec![vec![11.0, 12.0, 13.0], vec![14.0, 15.0, 16.0]]).unwrap();
/// let d = pairwise_distance(&a, Some(&b)).unwrap();
/// assert_eq!((d.rows(), d.cols()), (2, 2));
/// assert!((d.get(0, 0) - 300f64.sqrt()).abs() < 1e-12);
/// ```
pub fn pairwise_distance(a: &PointSet, b: Option<&PointSet>) -> Result<DistanceMatrix> {
    let b = b.unwrap_or(a);
    if a.dim() != b.dim() {
        return Err(ClusteringError::DimensionMismatch {
            left: a.dim(),
            right: b.dim(),
        });
    }

    let cols = b.n();
    let mut distances = vec![0.0; a.n() * cols];
    distances
        .par_chunks_mut(cols)
        .zip(a.rows().collect::<Vec<_>>().into_par_iter())
        .for_each(|(out, x)| {
            for (d, y) in out.iter_mut().zip(b.rows()) {
                *d = euclidean(x, y);
            }
        });

    Ok(DistanceMatrix {
        distances,
        rows: a.n(),
        cols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pairwise_distance_of_two_sets() {
        let a = PointSet::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let b = PointSet::new(vec![vec![11.0, 12.0, 13.0], vec![14.0, 15.0, 16.0]]).unwrap();
        let d = pairwise_distance(&a, Some(&b)).unwrap();
        assert_eq!((d.rows(), d.cols()), (2, 2));
        assert_relative_eq!(d.get(0, 0), 300f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(d.get(0, 1), 507f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(d.get(1, 0), 147f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(d.get(1, 1), 300f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(d.get(0, 0), 17.320508, epsilon = 1e-6);
    }

    #[test]
    fn single_pair_stays_a_matrix() {
        let a = PointSet::new(vec![vec![0.0, 0.0]]).unwrap();
        let b = PointSet::new(vec![vec![3.0, 4.0]]).unwrap();
        let d = pairwise_distance(&a, Some(&b)).unwrap();
        assert_eq!((d.rows(), d.cols()), (1, 1));
        assert_eq!(d.to_rows(), vec![vec![5.0]]);
    }

    #[test]
    fn dimension_mismatch_fails() {
        let a = PointSet::new(vec![vec![0.0, 0.0]]).unwrap();
        let b = PointSet::new(vec![vec![0.0, 0.0, 0.0]]).unwrap();
        match pairwise_distance(&a, Some(&b)) {
            Err(ClusteringError::DimensionMismatch { left, right }) => assert_eq!((left, right), (2, 3)),
            other => panic!("expected dimension mismatch, got {:?}", other),
        }
    }

    #[test]
    fn self_distance_is_a_metric() {
        let mut rng = StdRng::seed_from_u64(42);
        let points = PointSet::new_random(40, 5, &mut rng).unwrap();
        let d = pairwise_distance(&points, None).unwrap();
        assert_eq!((d.rows(), d.cols()), (40, 40));
        assert!(d.is_symmetric(0.0));
        assert!(d.satisfies_triangle_inequality(1e-9));
        for i in 0..40 {
            assert_eq!(d.get(i, i), 0.0);
        }
    }

    #[test]
    fn swapping_arguments_transposes() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = PointSet::new_random(7, 4, &mut rng).unwrap();
        let b = PointSet::new_random(11, 4, &mut rng).unwrap();
        let ab = pairwise_distance(&a, Some(&b)).unwrap();
        let ba = pairwise_distance(&b, Some(&a)).unwrap();
        assert_eq!(ab.transpose(), ba);
        for i in 0..7 {
            for j in 0..11 {
                assert_eq!(ab.get(i, j), ba.get(j, i));
            }
        }
    }

    #[test]
    fn argmin_prefers_lowest_index() {
        let points = PointSet::new(vec![vec![0.0], vec![2.0]]).unwrap();
        let centroids = PointSet::new(vec![vec![1.0], vec![1.0], vec![3.0]]).unwrap();
        let d = pairwise_distance(&points, Some(&centroids)).unwrap();
        assert_eq!(d.argmin_row(0), 0);
        assert_eq!(d.argmin_row(1), 0);
    }

    #[test]
    fn detects_broken_metric() {
        let points = PointSet::new(vec![vec![0.0], vec![1.0]]).unwrap();
        let mut d = pairwise_distance(&points, None).unwrap();
        d.distances[1] = 2.0;
        assert!(!d.is_symmetric(1e-9));
        assert!(!pairwise_distance(&points, Some(&PointSet::new(vec![vec![0.0]]).unwrap()))
            .unwrap()
            .is_symmetric(0.0));
    }
}
