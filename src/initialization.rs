use rand::Rng;

use crate::config::Initialization;
use crate::distance::euclidean;
use crate::error::Result;
use crate::space::PointSet;
use crate::types::{Distance, PointCount, PointIdx};

/// Chooses k initial centroids from the points with the given method.
pub(crate) fn initial_centroids<R: Rng + ?Sized>(
    points: &PointSet,
    k: PointCount,
    method: Initialization,
    rng: &mut R,
) -> Result<PointSet> {
    match method {
        Initialization::Forgy => forgy(points, k, rng),
        Initialization::FarthestFirst => farthest_first(points, k, rng),
    }
}

/// Forgy initialization: draws k points uniformly at random, with replacement.
/// The same point can therefore be chosen more than once.
pub fn forgy<R: Rng + ?Sized>(points: &PointSet, k: PointCount, rng: &mut R) -> Result<PointSet> {
    let indices: Vec<PointIdx> = (0..k).map(|_| rng.gen_range(0..points.n())).collect();
    points.select(&indices)
}

/// Gonzalez heuristic: the first centroid is a random point, every further centroid is the point
/// with the largest distance to the centroids chosen so far.
/// For k <= number of distinct points all centroids are distinct.
pub fn farthest_first<R: Rng + ?Sized>(points: &PointSet, k: PointCount, rng: &mut R) -> Result<PointSet> {
    let mut chosen: Vec<PointIdx> = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..points.n()));

    // current distance of each point to the set of already chosen centroids
    let mut dist_to_chosen: Vec<Distance> = points
        .rows()
        .map(|p| euclidean(p, points.row(chosen[0])))
        .collect();

    for i in 1..k {
        let newest = points.row(chosen[i - 1]);
        let mut current_distance = Distance::MIN;
        let mut current_point: PointIdx = 0;
        for (j, p) in points.rows().enumerate() {
            // only the distance to the newest centroid can lower the known distance
            let d = euclidean(p, newest);
            if d < dist_to_chosen[j] {
                dist_to_chosen[j] = d;
            }
            if dist_to_chosen[j] > current_distance {
                current_distance = dist_to_chosen[j];
                current_point = j;
            }
        }
        chosen.push(current_point);
    }
    points.select(&chosen)
}
