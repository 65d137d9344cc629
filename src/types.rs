/// Type of the number of points in a point set.
pub type PointCount = usize;
/// Type of the number of coordinates of each point.
pub type Dimension = usize;
/// Type of a single coordinate value.
pub type Coordinate = f64;
/// Type of the Euclidean distance between two points.
pub type Distance = f64;
/// Index of a point (row) inside a [PointSet](crate::PointSet).
pub type PointIdx = usize;
/// Index of a centroid, i.e., a cluster label in [0, k).
pub type CentroidIdx = usize;
/// For each point the index of the centroid it is assigned to.
pub type Assignment = Vec<CentroidIdx>;
