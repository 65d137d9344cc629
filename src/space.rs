///////////////////////////////////////////////////////////////
///////////////////// module: space ///////////////////////////
///////////////////////////////////////////////////////////////

/// Module space maintains point sets: n points with m real-valued coordinates each.
///
/// A [PointSet] is always rectangular (every point has the same dimension) and never empty.
/// It is used for the input data as well as for the centroids of a clustering.
///
/// Builder functions:
/// - [PointSet::new] from a vector of rows,
/// - [PointSet::from_flat] from row-major storage,
/// - [PointSet::by_file] from a text-file with one point per line,
/// - [PointSet::new_random] with uniformly drawn points.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::Rng;
use tracing::{debug, info};

use crate::error::{ClusteringError, Result};
use crate::types::{Coordinate, Dimension, PointCount, PointIdx};

/// An n x m point set stored row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    coordinates: Vec<Coordinate>,
    n: PointCount,
    dim: Dimension,
}

impl PointSet {
    /// Creates a new [PointSet] from a vector of rows.
    ///
    /// Fails with [ClusteringError::EmptyPointSet] if there are no rows or the rows have no
    /// coordinates, and with [ClusteringError::InvalidShape] if the rows have different lengths.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lloyd_kmeans::PointSet;
    /// let points = PointSet::new(vec![vec![0.0, 0.0], vec![1.5, 1.1], vec![1.0, 0.5]]).unwrap();
    /// assert_eq!(points.n(), 3);
    /// assert_eq!(points.dim(), 2);
    /// assert_eq!(points.row(1), &[1.5, 1.1]);
    /// ```
    pub fn new(rows: Vec<Vec<Coordinate>>) -> Result<PointSet> {
        let n = rows.len();
        let dim = rows.first().map_or(0, |row| row.len());
        if n == 0 || dim == 0 {
            return Err(ClusteringError::EmptyPointSet { n, dim });
        }

        let mut coordinates: Vec<Coordinate> = Vec::with_capacity(n * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(ClusteringError::InvalidShape(format!(
                    "row {} has {} coordinates, but row 0 has {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            coordinates.extend(row);
        }
        Ok(PointSet { coordinates, n, dim })
    }

    /// Creates a new [PointSet] of n points in dimension dim from row-major storage.
    pub fn from_flat(coordinates: Vec<Coordinate>, n: PointCount, dim: Dimension) -> Result<PointSet> {
        if n == 0 || dim == 0 {
            return Err(ClusteringError::EmptyPointSet { n, dim });
        }
        if coordinates.len() != n * dim {
            return Err(ClusteringError::InvalidShape(format!(
                "{} coordinates cannot be arranged as {} x {}",
                coordinates.len(),
                n,
                dim
            )));
        }
        Ok(PointSet { coordinates, n, dim })
    }

    /// Creates n random points in the box [-100,100)^dim.
    pub fn new_random<R: Rng + ?Sized>(n: PointCount, dim: Dimension, rng: &mut R) -> Result<PointSet> {
        let coordinates = (0..n * dim).map(|_| rng.gen_range(-100.0..100.0)).collect();
        PointSet::from_flat(coordinates, n, dim)
    }

    /// Loads a [PointSet] from a text-file.
    /// The expected_number_of_points is only used to allocate enough storage.
    /// Each line contains the coordinates of one point, separated by a comma.
    /// Empty lines are ignored; all other lines must have the same number of entries.
    ///
    /// Example:
    /// ```txt
    /// -8.19,-7.88
    /// -8.06,-6.58
    /// -7.3,-6.9
    /// ```
    pub fn by_file<P: AsRef<Path>>(file_path: P, expected_number_of_points: PointCount) -> Result<PointSet> {
        let file_path = file_path.as_ref();
        let f = BufReader::new(File::open(file_path)?);

        let mut rows: Vec<Vec<Coordinate>> = Vec::with_capacity(expected_number_of_points);
        for (line_idx, line) in f.lines().enumerate() {
            let content = line?;
            let content = content.trim();
            if content.is_empty() {
                continue;
            }
            let row = content
                .split(',')
                .map(|entry| {
                    entry.trim().parse::<Coordinate>().map_err(|err| ClusteringError::Parse {
                        line: line_idx + 1,
                        reason: format!("'{}' is not a number ({})", entry.trim(), err),
                    })
                })
                .collect::<Result<Vec<Coordinate>>>()?;
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(ClusteringError::Parse {
                        line: line_idx + 1,
                        reason: format!("expected {} coordinates, found {}", first.len(), row.len()),
                    });
                }
            }
            rows.push(row);
        }

        let points = PointSet::new(rows)?;
        info!(
            n = points.n(),
            dim = points.dim(),
            "loaded points from '{}'",
            file_path.display()
        );
        debug!("points: {:?}", points.coordinates);
        Ok(points)
    }

    /// Returns the number of points.
    pub fn n(&self) -> PointCount {
        self.n
    }

    /// Returns the number of coordinates of each point.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// Returns the coordinates of point i.
    ///
    /// # Panics
    ///
    /// Panics if i >= n.
    pub fn row(&self, i: PointIdx) -> &[Coordinate] {
        &self.coordinates[i * self.dim..(i + 1) * self.dim]
    }

    pub(crate) fn row_mut(&mut self, i: PointIdx) -> &mut [Coordinate] {
        &mut self.coordinates[i * self.dim..(i + 1) * self.dim]
    }

    /// Provides an iterator over all points (as coordinate slices) in index order.
    pub fn rows(&self) -> std::slice::Chunks<'_, Coordinate> {
        self.coordinates.chunks(self.dim)
    }

    /// Returns a copy of the points as a vector of rows.
    pub fn to_rows(&self) -> Vec<Vec<Coordinate>> {
        self.rows().map(|row| row.to_vec()).collect()
    }

    /// Returns the row-major coordinate storage.
    pub fn as_flat(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Builds a new point set from the points with the given indices (duplicates allowed).
    pub fn select(&self, indices: &[PointIdx]) -> Result<PointSet> {
        let mut coordinates = Vec::with_capacity(indices.len() * self.dim);
        for &i in indices {
            coordinates.extend_from_slice(self.row(i));
        }
        PointSet::from_flat(coordinates, indices.len(), self.dim)
    }
}
