use crate::config::{ClusteringProblem, OptionalParameters};
use crate::error::{ClusteringError, Result};
use crate::space::PointSet;

/// Checks the parameters of a clustering problem independently of the data.
///
/// # Errors
/// * k must be at least 1;
/// * the tolerance must be finite and non-negative;
/// * max_iterations must be at least 1;
/// * thread_count, if given, must be at least 1.
pub fn assert_problem_parameters(prob: &ClusteringProblem, params: &OptionalParameters) -> Result<()> {
    if prob.k == 0 {
        return Err(ClusteringError::InvalidK { k: prob.k, n: 0 });
    }
    if !params.tolerance.is_finite() || params.tolerance < 0.0 {
        return Err(ClusteringError::InvalidParameter(format!(
            "tolerance must be finite and non-negative, got {}",
            params.tolerance
        )));
    }
    if params.max_iterations == 0 {
        return Err(ClusteringError::InvalidParameter(
            "max_iterations must be at least 1".to_string(),
        ));
    }
    if params.thread_count == Some(0) {
        return Err(ClusteringError::InvalidParameter(
            "thread_count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Checks whether the clustering problem is feasible for the given points. If this passes, the
/// clusterer can run on the data.
///
/// # Errors
/// * k must satisfy 1 <= k <= n;
/// * all coordinates must be finite.
pub fn assert_clustering_problem(points: &PointSet, prob: &ClusteringProblem) -> Result<()> {
    if prob.k == 0 || prob.k > points.n() {
        return Err(ClusteringError::InvalidK {
            k: prob.k,
            n: points.n(),
        });
    }
    if let Some(pos) = points.as_flat().iter().position(|x| !x.is_finite()) {
        return Err(ClusteringError::InvalidParameter(format!(
            "coordinate {} of point {} is not finite",
            pos % points.dim(),
            pos / points.dim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> PointSet {
        PointSet::new(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0]]).unwrap()
    }

    #[test]
    fn k_bounds() {
        assert!(assert_clustering_problem(&points(), &ClusteringProblem { k: 1 }).is_ok());
        assert!(assert_clustering_problem(&points(), &ClusteringProblem { k: 3 }).is_ok());
        assert!(matches!(
            assert_clustering_problem(&points(), &ClusteringProblem { k: 0 }),
            Err(ClusteringError::InvalidK { k: 0, n: 3 })
        ));
        assert!(matches!(
            assert_clustering_problem(&points(), &ClusteringProblem { k: 4 }),
            Err(ClusteringError::InvalidK { k: 4, n: 3 })
        ));
    }

    #[test]
    fn non_finite_coordinates() {
        let points = PointSet::new(vec![vec![0.0, 0.0], vec![0.0, f64::NAN]]).unwrap();
        match assert_clustering_problem(&points, &ClusteringProblem { k: 1 }) {
            Err(ClusteringError::InvalidParameter(msg)) => assert!(msg.contains("point 1")),
            other => panic!("expected invalid parameter, got {:?}", other),
        }
    }

    #[test]
    fn parameter_checks() {
        let prob = ClusteringProblem { k: 2 };
        assert!(assert_problem_parameters(&prob, &OptionalParameters::default()).is_ok());
        assert!(assert_problem_parameters(&ClusteringProblem { k: 0 }, &OptionalParameters::default()).is_err());
        assert!(assert_problem_parameters(&prob, &OptionalParameters::default().with_tolerance(-1.0)).is_err());
        assert!(assert_problem_parameters(&prob, &OptionalParameters::default().with_tolerance(f64::NAN)).is_err());
        assert!(assert_problem_parameters(&prob, &OptionalParameters::default().with_max_iterations(0)).is_err());
        assert!(assert_problem_parameters(&prob, &OptionalParameters::default().with_thread_count(0)).is_err());
    }
}
