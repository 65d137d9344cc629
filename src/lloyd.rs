//////////////////////////////////////////////////////////////
////////////////////// module: lloyd /////////////////////////
//////////////////////////////////////////////////////////////

/// Lloyd's algorithm for k-means.
///
/// 1. choose k initial centroids from the points ([Initialization](crate::Initialization));
/// 2. assign every point to its nearest centroid ([assign]);
/// 3. move every centroid to the mean of its points ([update]);
/// 4. stop if the summed centroid shift is below sqrt(tolerance), otherwise go to 2.
///
/// Step 4 compares a sum of distances against the square root of the tolerance. This keeps
/// results comparable with existing k-means runs that use the same rule.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::assertions::{assert_clustering_problem, assert_problem_parameters};
use crate::clustering::{inertia, Clustering};
use crate::config::{ClusteringProblem, EmptyClusterPolicy, OptionalParameters};
use crate::distance::{euclidean, pairwise_distance};
use crate::error::{ClusteringError, Result};
use crate::initialization::initial_centroids;
use crate::space::PointSet;
use crate::types::{Assignment, Coordinate, Distance, PointCount, PointIdx};

/// Assigns each point to the index of its nearest centroid (lowest index on ties).
pub fn assign(points: &PointSet, centroids: &PointSet) -> Result<Assignment> {
    let distances = pairwise_distance(points, Some(centroids))?;
    Ok((0..distances.rows()).map(|i| distances.argmin_row(i)).collect())
}

/// Computes the new centroids as the coordinate-wise mean of the points assigned to them.
/// Centroids without points are treated according to the policy; iteration is only used for
/// error reporting.
pub fn update(
    points: &PointSet,
    assignment: &Assignment,
    centroids: &PointSet,
    policy: EmptyClusterPolicy,
    iteration: usize,
) -> Result<PointSet> {
    if points.dim() != centroids.dim() {
        return Err(ClusteringError::DimensionMismatch {
            left: points.dim(),
            right: centroids.dim(),
        });
    }
    if assignment.len() != points.n() {
        return Err(ClusteringError::InvalidShape(format!(
            "assignment has {} entries for {} points",
            assignment.len(),
            points.n()
        )));
    }
    let k = centroids.n();
    if let Some(&c) = assignment.iter().find(|&&c| c >= k) {
        return Err(ClusteringError::InvalidShape(format!(
            "label {} is out of range for k = {}",
            c, k
        )));
    }

    let mut sums: Vec<Coordinate> = vec![0.0; k * points.dim()];
    let mut counts: Vec<PointCount> = vec![0; k];
    for (p, &c) in points.rows().zip(assignment.iter()) {
        counts[c] += 1;
        for (s, x) in sums[c * points.dim()..(c + 1) * points.dim()].iter_mut().zip(p) {
            *s += x;
        }
    }

    let mut next = PointSet::from_flat(sums, k, points.dim())?;
    let mut used_for_reseed: Vec<PointIdx> = Vec::new();
    for c in 0..k {
        if counts[c] > 0 {
            let count = counts[c] as Coordinate;
            next.row_mut(c).iter_mut().for_each(|x| *x /= count);
            continue;
        }
        match policy {
            EmptyClusterPolicy::Fail => {
                return Err(ClusteringError::EmptyCluster {
                    centroid: c,
                    iteration,
                })
            }
            EmptyClusterPolicy::Keep => {
                next.row_mut(c).copy_from_slice(centroids.row(c));
            }
            EmptyClusterPolicy::Reseed => {
                let p = farthest_from_own_centroid(points, assignment, centroids, &used_for_reseed);
                warn!(centroid = c, iteration, point = p, "empty cluster, reseeding centroid");
                used_for_reseed.push(p);
                next.row_mut(c).copy_from_slice(points.row(p));
            }
        }
    }
    Ok(next)
}

// The point (not in excluded) with the largest distance to its currently assigned centroid;
// the lowest index wins ties.
fn farthest_from_own_centroid(
    points: &PointSet,
    assignment: &Assignment,
    centroids: &PointSet,
    excluded: &[PointIdx],
) -> PointIdx {
    let mut best: PointIdx = 0;
    let mut best_d: Distance = Distance::NEG_INFINITY;
    for (i, (p, &c)) in points.rows().zip(assignment.iter()).enumerate() {
        if excluded.contains(&i) {
            continue;
        }
        let d = euclidean(p, centroids.row(c));
        if d > best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

/// The sum over all centroids of the Euclidean distance between old and new position.
pub fn total_shift(old: &PointSet, new: &PointSet) -> Result<Distance> {
    if old.dim() != new.dim() {
        return Err(ClusteringError::DimensionMismatch {
            left: old.dim(),
            right: new.dim(),
        });
    }
    if old.n() != new.n() {
        return Err(ClusteringError::InvalidShape(format!(
            "cannot compare {} old centroids with {} new centroids",
            old.n(),
            new.n()
        )));
    }
    Ok(old.rows().zip(new.rows()).map(|(a, b)| euclidean(a, b)).sum())
}

/// Computes a k-means clustering of the points with Lloyd's algorithm.
///
/// The random source is seeded from params.seed, or from the operating system if no seed is
/// given. See [compute_kmeans_with_rng] to provide the random source directly.
///
/// # Example
///
/// ```rust
/// use lloyd_kmeans::{compute_kmeans, ClusteringProblem, OptionalParameters, PointSet};
/// let points = PointSet::new(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]).unwrap();
/// let clustering = compute_kmeans(&points, &ClusteringProblem { k: 2 }, &OptionalParameters::default().with_seed(3)).unwrap();
/// assert_eq!(clustering.assignment().len(), 4);
/// assert!(clustering.assignment().iter().all(|&c| c < 2));
/// ```
pub fn compute_kmeans(
    points: &PointSet,
    prob: &ClusteringProblem,
    params: &OptionalParameters,
) -> Result<Clustering> {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    compute_kmeans_with_rng(points, prob, params, &mut rng)
}

/// Same as [compute_kmeans], but draws the initial centroids from the given random source.
/// params.seed is ignored.
pub fn compute_kmeans_with_rng<R: Rng + ?Sized>(
    points: &PointSet,
    prob: &ClusteringProblem,
    params: &OptionalParameters,
    rng: &mut R,
) -> Result<Clustering> {
    assert_problem_parameters(prob, params)?;
    assert_clustering_problem(points, prob)?;

    let thread_count = params.effective_thread_count();
    let thread_pool = ThreadPoolBuilder::new().num_threads(thread_count).build()?;

    let centroids = initial_centroids(points, prob.k, params.initialization, rng)?;
    debug!(
        k = prob.k,
        n = points.n(),
        dim = points.dim(),
        init = %params.initialization,
        thread_count,
        "initialized centroids"
    );

    thread_pool.install(move || iterate(points, centroids, params))
}

fn iterate(points: &PointSet, mut centroids: PointSet, params: &OptionalParameters) -> Result<Clustering> {
    let threshold = params.tolerance.sqrt();
    let mut iterations = 0;
    let mut shift = Distance::INFINITY;
    let mut converged = false;

    while iterations < params.max_iterations {
        iterations += 1;
        let assignment = assign(points, &centroids)?;
        let next = update(points, &assignment, &centroids, params.empty_cluster, iterations)?;
        shift = total_shift(&centroids, &next)?;
        centroids = next;
        debug!(iteration = iterations, shift, "finished iteration");

        if shift < threshold {
            converged = true;
            break;
        }
    }

    // the assignment has to belong to the returned centroids
    let assignment = assign(points, &centroids)?;
    let inertia = inertia(points, &centroids, &assignment);

    if converged {
        info!(iterations, shift, inertia, "k-means converged");
    } else {
        warn!(
            iterations,
            shift,
            threshold,
            "k-means did not converge within the iteration cap"
        );
    }

    Ok(Clustering {
        centroids,
        assignment,
        iterations,
        shift,
        converged,
        inertia,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Initialization;
    use approx::assert_relative_eq;

    fn four_points() -> PointSet {
        PointSet::new(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]]).unwrap()
    }

    fn sorted_centroids(clustering: &Clustering) -> Vec<Vec<f64>> {
        let mut rows = clustering.centroids().to_rows();
        rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
        rows
    }

    fn assert_two_groups(clustering: &Clustering) {
        let a = clustering.assignment();
        assert_eq!(a[0], a[1]);
        assert_eq!(a[2], a[3]);
        assert_ne!(a[0], a[2]);
        let rows = sorted_centroids(clustering);
        assert_relative_eq!(rows[0][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(rows[0][1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(rows[1][0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(rows[1][1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn two_clusters_with_farthest_first() {
        let params = OptionalParameters::default().with_initialization(Initialization::FarthestFirst);
        for seed in 0..10 {
            let clustering = compute_kmeans(&four_points(), &ClusteringProblem { k: 2 }, &params.clone().with_seed(seed)).unwrap();
            assert!(clustering.converged());
            assert_two_groups(&clustering);
            assert_relative_eq!(clustering.inertia(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn two_clusters_with_forgy() {
        // Forgy may start with both centroids on one side, which Lloyd cannot always leave
        // ([5,0], [5,1] is a fixed point). The global optimum has inertia 1.
        let mut reached_optimum = false;
        for seed in 0..30 {
            let params = OptionalParameters::default().with_seed(seed);
            let clustering = compute_kmeans(&four_points(), &ClusteringProblem { k: 2 }, &params).unwrap();
            assert!(clustering.converged());
            assert_eq!(clustering.assignment().len(), 4);
            if clustering.inertia() < 1.0 + 1e-9 {
                assert_two_groups(&clustering);
                reached_optimum = true;
            }
        }
        assert!(reached_optimum);
    }

    #[test]
    fn result_shape_and_idempotent_assignment() {
        let mut rng = StdRng::seed_from_u64(99);
        let points = PointSet::new_random(300, 4, &mut rng).unwrap();
        let prob = ClusteringProblem { k: 6 };
        let clustering = compute_kmeans_with_rng(&points, &prob, &OptionalParameters::default(), &mut rng).unwrap();

        assert_eq!(clustering.assignment().len(), 300);
        assert!(clustering.assignment().iter().all(|&c| c < 6));
        assert_eq!((clustering.centroids().n(), clustering.centroids().dim()), (6, 4));
        assert_eq!(clustering.cluster_sizes().iter().sum::<usize>(), 300);

        assert!(clustering.converged());
        assert_eq!(&assign(&points, clustering.centroids()).unwrap(), clustering.assignment());
    }

    #[test]
    fn seed_makes_runs_reproducible() {
        let mut rng = StdRng::seed_from_u64(1);
        let points = PointSet::new_random(120, 3, &mut rng).unwrap();
        let prob = ClusteringProblem { k: 4 };
        let params = OptionalParameters::default().with_seed(2024);
        let a = compute_kmeans(&points, &prob, &params).unwrap();
        let b = compute_kmeans(&points, &prob, &params.clone().with_thread_count(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn k_equals_n_gives_every_point_its_own_centroid() {
        let points = four_points();
        let params = OptionalParameters::default()
            .with_seed(5)
            .with_initialization(Initialization::FarthestFirst);
        let clustering = compute_kmeans(&points, &ClusteringProblem { k: 4 }, &params).unwrap();
        assert!(clustering.converged());
        assert_eq!(clustering.iterations(), 1);
        assert_eq!(clustering.shift(), 0.0);
        assert_eq!(clustering.inertia(), 0.0);
        assert_eq!(clustering.cluster_sizes(), vec![1, 1, 1, 1]);

        // Forgy draws with replacement, reseeding then separates the duplicates
        for seed in 0..10 {
            let params = OptionalParameters::default().with_seed(seed);
            let clustering = compute_kmeans(&points, &ClusteringProblem { k: 4 }, &params).unwrap();
            assert!(clustering.converged());
            assert_eq!(clustering.inertia(), 0.0);
            assert_eq!(clustering.cluster_sizes(), vec![1, 1, 1, 1]);
        }
    }

    #[test]
    fn identical_points() {
        let points = PointSet::new(vec![vec![2.0, -1.0]; 5]).unwrap();
        for policy in [EmptyClusterPolicy::Reseed, EmptyClusterPolicy::Keep] {
            let params = OptionalParameters::default().with_seed(8).with_empty_cluster(policy);
            let clustering = compute_kmeans(&points, &ClusteringProblem { k: 3 }, &params).unwrap();
            assert!(clustering.converged());
            for c in clustering.centroids().rows() {
                assert_eq!(c, &[2.0, -1.0]);
            }
            assert!(clustering.assignment().iter().all(|&c| c == 0));
        }

        let params = OptionalParameters::default().with_seed(8).with_empty_cluster(EmptyClusterPolicy::Fail);
        match compute_kmeans(&points, &ClusteringProblem { k: 3 }, &params) {
            Err(ClusteringError::EmptyCluster { centroid, iteration }) => {
                assert_eq!((centroid, iteration), (1, 1));
            }
            other => panic!("expected an empty cluster, got {:?}", other),
        }
    }

    #[test]
    fn update_policies() {
        let points = four_points();
        let centroids = PointSet::new(vec![vec![0.0, 0.5], vec![50.0, 50.0], vec![10.0, 0.5]]).unwrap();
        let assignment = vec![0, 0, 2, 2];

        let kept = update(&points, &assignment, &centroids, EmptyClusterPolicy::Keep, 1).unwrap();
        assert_eq!(kept.row(1), &[50.0, 50.0]);
        assert_eq!(kept.row(0), &[0.0, 0.5]);

        // all points have distance 0.5 to their centroid, so the lowest index wins
        let reseeded = update(&points, &assignment, &centroids, EmptyClusterPolicy::Reseed, 1).unwrap();
        assert_eq!(reseeded.row(1), &[0.0, 0.0]);
        assert_eq!(reseeded.row(2), &[10.0, 0.5]);

        assert!(matches!(
            update(&points, &assignment, &centroids, EmptyClusterPolicy::Fail, 4),
            Err(ClusteringError::EmptyCluster { centroid: 1, iteration: 4 })
        ));
    }

    #[test]
    fn reseed_uses_each_point_once() {
        let points = PointSet::new(vec![vec![0.0], vec![1.0], vec![5.0]]).unwrap();
        let centroids = PointSet::new(vec![vec![0.0], vec![100.0], vec![200.0]]).unwrap();
        let next = update(&points, &vec![0, 0, 0], &centroids, EmptyClusterPolicy::Reseed, 1).unwrap();
        assert_eq!(next.row(0), &[2.0]);
        assert_eq!(next.row(1), &[5.0]);
        assert_eq!(next.row(2), &[1.0]);
    }

    #[test]
    fn update_rejects_bad_input() {
        let points = four_points();
        let centroids = PointSet::new(vec![vec![0.0], vec![1.0]]).unwrap();
        assert!(matches!(
            update(&points, &vec![0, 0, 1, 1], &centroids, EmptyClusterPolicy::Keep, 1),
            Err(ClusteringError::DimensionMismatch { left: 2, right: 1 })
        ));
        let centroids = PointSet::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        assert!(update(&points, &vec![0, 0, 2, 1], &centroids, EmptyClusterPolicy::Keep, 1).is_err());
        assert!(update(&points, &vec![0, 0], &centroids, EmptyClusterPolicy::Keep, 1).is_err());
    }

    #[test]
    fn total_shift_sums_euclidean_moves() {
        let old = PointSet::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        let new = PointSet::new(vec![vec![3.0, 4.0], vec![1.0, 2.0]]).unwrap();
        assert_relative_eq!(total_shift(&old, &new).unwrap(), 6.0);
        assert_eq!(total_shift(&old, &old).unwrap(), 0.0);
        let other = PointSet::new(vec![vec![0.0, 0.0]]).unwrap();
        assert!(total_shift(&old, &other).is_err());
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let mut rng = StdRng::seed_from_u64(17);
        let points = PointSet::new_random(200, 2, &mut rng).unwrap();
        // with tolerance 0 the shift can never be below sqrt(0)
        let params = OptionalParameters::default()
            .with_seed(17)
            .with_tolerance(0.0)
            .with_max_iterations(3);
        let clustering = compute_kmeans(&points, &ClusteringProblem { k: 5 }, &params).unwrap();
        assert!(!clustering.converged());
        assert_eq!(clustering.iterations(), 3);
        assert_eq!(clustering.assignment().len(), 200);
        assert!(matches!(
            clustering.assert_converged(),
            Err(ClusteringError::NotConverged { iterations: 3, .. })
        ));
    }

    #[test]
    fn invalid_problems_fail_early() {
        let points = four_points();
        let params = OptionalParameters::default().with_seed(0);
        assert!(matches!(
            compute_kmeans(&points, &ClusteringProblem { k: 0 }, &params),
            Err(ClusteringError::InvalidK { .. })
        ));
        assert!(matches!(
            compute_kmeans(&points, &ClusteringProblem { k: 5 }, &params),
            Err(ClusteringError::InvalidK { k: 5, n: 4 })
        ));
        assert!(matches!(
            assign(&points, &PointSet::new(vec![vec![0.0, 0.0, 0.0]]).unwrap()),
            Err(ClusteringError::DimensionMismatch { left: 2, right: 3 })
        ));
    }
}
