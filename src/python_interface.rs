use pyo3::create_exception;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::assertions::assert_problem_parameters;
use crate::clustering::Clustering;
use crate::config::{ClusteringProblem, EmptyClusterPolicy, Initialization, OptionalParameters};
use crate::distance::pairwise_distance as compute_pairwise_distance;
use crate::error::ClusteringError;
use crate::lloyd::{assign, compute_kmeans};
use crate::space::PointSet;
use crate::types::{CentroidIdx, Coordinate, Distance, PointCount};

create_exception!(lloyd_kmeans, InvalidClusteringProblemError, pyo3::exceptions::PyException);
create_exception!(lloyd_kmeans, ClusteringMissingError, pyo3::exceptions::PyException);
create_exception!(lloyd_kmeans, ClusteringFailedError, pyo3::exceptions::PyException);

const NOCLUSTERING: &str = "No clustering computed yet. Run fit(data) first.";

fn to_py_err(err: ClusteringError) -> PyErr {
    match err {
        ClusteringError::InvalidK { .. }
        | ClusteringError::InvalidParameter(_)
        | ClusteringError::InvalidShape(_)
        | ClusteringError::EmptyPointSet { .. }
        | ClusteringError::DimensionMismatch { .. } => InvalidClusteringProblemError::new_err(err.to_string()),
        _ => ClusteringFailedError::new_err(err.to_string()),
    }
}

/// K-means model. Set the parameters in the constructor, run fit(data) and read the result from
/// cluster_centers, labels, n_iter, converged and inertia.
#[pyclass]
pub(crate) struct KMeans {
    // parameters
    prob: ClusteringProblem,
    params: OptionalParameters,

    // attributes
    clustering: Option<Clustering>,
}

impl KMeans {
    fn get_clustering(&self) -> PyResult<&Clustering> {
        self.clustering
            .as_ref()
            .ok_or_else(|| ClusteringMissingError::new_err(NOCLUSTERING))
    }
}

#[pymethods]
impl KMeans {
    /// Optional keyword-arguments:
    /// * tolerance = 1e-5 (stop once the summed centroid shift is below sqrt(tolerance))
    /// * max_iterations = 300
    /// * seed = None (random seed for the initial centroids)
    /// * thread_count = 0 (0: all cores)
    /// * empty_cluster = None ("reseed", "keep" or "fail"; default "reseed")
    /// * init = None ("forgy" or "farthest-first"; default "forgy")
    #[new]
    #[args(
        k,
        "*",
        tolerance = "1e-5",
        max_iterations = "300",
        seed = "None",
        thread_count = "0",
        empty_cluster = "None",
        init = "None"
    )]
    fn new(
        k: PointCount,
        tolerance: f64,
        max_iterations: usize,
        seed: Option<u64>,
        thread_count: usize,
        empty_cluster: Option<String>,
        init: Option<String>,
    ) -> PyResult<KMeans> {
        let mut params = OptionalParameters::default()
            .with_tolerance(tolerance)
            .with_max_iterations(max_iterations);
        params.seed = seed;
        params.thread_count = match thread_count {
            0 => None,
            t => Some(t),
        };
        if let Some(policy) = empty_cluster {
            params.empty_cluster = policy.parse::<EmptyClusterPolicy>().map_err(to_py_err)?;
        }
        if let Some(init) = init {
            params.initialization = init.parse::<Initialization>().map_err(to_py_err)?;
        }

        let prob = ClusteringProblem { k };
        assert_problem_parameters(&prob, &params).map_err(to_py_err)?;
        Ok(KMeans {
            prob,
            params,
            clustering: None,
        })
    }

    #[getter]
    fn get_k(&self) -> PointCount {
        self.prob.k
    }

    #[getter]
    fn get_tolerance(&self) -> f64 {
        self.params.tolerance
    }

    /// Computes the clustering of data (a list of points, each a list of floats).
    fn fit(&mut self, data: Vec<Vec<Coordinate>>) -> PyResult<()> {
        self.clustering = None;
        let points = PointSet::new(data).map_err(to_py_err)?;
        self.clustering = Some(compute_kmeans(&points, &self.prob, &self.params).map_err(to_py_err)?);
        Ok(())
    }

    /// Returns the index of the nearest fitted centroid for each point in data.
    fn predict(&self, data: Vec<Vec<Coordinate>>) -> PyResult<Vec<CentroidIdx>> {
        let clustering = self.get_clustering()?;
        let points = PointSet::new(data).map_err(to_py_err)?;
        assign(&points, clustering.centroids()).map_err(to_py_err)
    }

    #[getter]
    fn get_cluster_centers(&self) -> PyResult<Vec<Vec<Coordinate>>> {
        Ok(self.get_clustering()?.centroids().to_rows())
    }

    #[getter]
    fn get_labels(&self) -> PyResult<Vec<CentroidIdx>> {
        Ok(self.get_clustering()?.assignment().clone())
    }

    #[getter]
    fn get_n_iter(&self) -> PyResult<usize> {
        Ok(self.get_clustering()?.iterations())
    }

    #[getter]
    fn get_converged(&self) -> PyResult<bool> {
        Ok(self.get_clustering()?.converged())
    }

    #[getter]
    fn get_inertia(&self) -> PyResult<Distance> {
        Ok(self.get_clustering()?.inertia())
    }

    /// Saves the clustering in a txt-file. One line for each cluster.
    fn save_clustering_to_file(&self, file_path: String) -> PyResult<()> {
        self.get_clustering()?.save_to_file(file_path).map_err(to_py_err)
    }
}

/// Euclidean distances between all points of a and all points of b (b defaults to a).
/// Always returns a list of lists, also for single points.
#[pyfunction(b = "None")]
fn pairwise_distance(a: Vec<Vec<Coordinate>>, b: Option<Vec<Vec<Coordinate>>>) -> PyResult<Vec<Vec<Distance>>> {
    let a = PointSet::new(a).map_err(to_py_err)?;
    let matrix = match b {
        Some(b) => {
            let b = PointSet::new(b).map_err(to_py_err)?;
            compute_pairwise_distance(&a, Some(&b))
        }
        None => compute_pairwise_distance(&a, None),
    }
    .map_err(to_py_err)?;
    Ok(matrix.to_rows())
}

#[pymodule]
fn lloyd_kmeans(py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<KMeans>()?;
    m.add_function(wrap_pyfunction!(pairwise_distance, m)?)?;
    m.add("InvalidClusteringProblemError", py.get_type::<InvalidClusteringProblemError>())?;
    m.add("ClusteringMissingError", py.get_type::<ClusteringMissingError>())?;
    m.add("ClusteringFailedError", py.get_type::<ClusteringFailedError>())?;
    Ok(())
}
