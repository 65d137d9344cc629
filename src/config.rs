use std::fmt;
use std::str::FromStr;

use crate::error::ClusteringError;
use crate::types::PointCount;

/// Default convergence tolerance; the run stops once the summed centroid shift is below its square root.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;
/// Default cap on the number of assign/update iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 300;

/// The required parameter of a k-means run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringProblem {
    pub k: PointCount, // number of clusters
}

/// What to do when a centroid has no assigned points after an assign step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Move the centroid onto the point that is farthest from its own centroid.
    #[default]
    Reseed,
    /// Leave the centroid where it is.
    Keep,
    /// Abort the run with [ClusteringError::EmptyCluster].
    Fail,
}

/// How the initial centroids are chosen from the input points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Initialization {
    /// k points drawn uniformly with replacement (duplicates possible).
    #[default]
    Forgy,
    /// Gonzalez heuristic: a random first point, then always the point farthest from the chosen ones.
    FarthestFirst,
}

impl FromStr for EmptyClusterPolicy {
    type Err = ClusteringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reseed" => Ok(EmptyClusterPolicy::Reseed),
            "keep" => Ok(EmptyClusterPolicy::Keep),
            "fail" => Ok(EmptyClusterPolicy::Fail),
            other => Err(ClusteringError::InvalidParameter(format!(
                "unknown empty-cluster policy '{}' (expected reseed, keep or fail)",
                other
            ))),
        }
    }
}

impl fmt::Display for EmptyClusterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmptyClusterPolicy::Reseed => write!(f, "reseed"),
            EmptyClusterPolicy::Keep => write!(f, "keep"),
            EmptyClusterPolicy::Fail => write!(f, "fail"),
        }
    }
}

impl FromStr for Initialization {
    type Err = ClusteringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forgy" | "random" => Ok(Initialization::Forgy),
            "farthest-first" | "gonzalez" => Ok(Initialization::FarthestFirst),
            other => Err(ClusteringError::InvalidParameter(format!(
                "unknown initialization '{}' (expected forgy or farthest-first)",
                other
            ))),
        }
    }
}

impl fmt::Display for Initialization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Initialization::Forgy => write!(f, "forgy"),
            Initialization::FarthestFirst => write!(f, "farthest-first"),
        }
    }
}

/// Optional parameters of a k-means run. Use [OptionalParameters::default] and the `with_*`
/// methods to change single values.
///
/// # Example
///
/// ```rust
/// use lloyd_kmeans::{EmptyClusterPolicy, OptionalParameters};
/// let params = OptionalParameters::default()
///     .with_seed(7)
///     .with_max_iterations(50)
///     .with_empty_cluster(EmptyClusterPolicy::Fail);
/// assert_eq!(params.tolerance, 1e-5);
/// assert_eq!(params.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalParameters {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub empty_cluster: EmptyClusterPolicy,
    pub initialization: Initialization,
    /// Seed for the random source; None uses a seed from the operating system.
    pub seed: Option<u64>,
    /// Number of threads for the distance computations; None uses all cores.
    pub thread_count: Option<usize>,
}

impl Default for OptionalParameters {
    fn default() -> Self {
        OptionalParameters {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            empty_cluster: EmptyClusterPolicy::default(),
            initialization: Initialization::default(),
            seed: None,
            thread_count: None,
        }
    }
}

impl OptionalParameters {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    pub fn with_initialization(mut self, initialization: Initialization) -> Self {
        self.initialization = initialization;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = Some(thread_count);
        self
    }

    /// The number of threads that is actually used.
    pub fn effective_thread_count(&self) -> usize {
        self.thread_count.unwrap_or_else(num_cpus::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_policies() {
        assert_eq!("Reseed".parse::<EmptyClusterPolicy>().unwrap(), EmptyClusterPolicy::Reseed);
        assert_eq!(" keep ".parse::<EmptyClusterPolicy>().unwrap(), EmptyClusterPolicy::Keep);
        assert_eq!("fail".parse::<EmptyClusterPolicy>().unwrap(), EmptyClusterPolicy::Fail);
        assert!("drop".parse::<EmptyClusterPolicy>().is_err());
        for policy in [EmptyClusterPolicy::Reseed, EmptyClusterPolicy::Keep, EmptyClusterPolicy::Fail] {
            assert_eq!(policy.to_string().parse::<EmptyClusterPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn parse_initialization() {
        assert_eq!("gonzalez".parse::<Initialization>().unwrap(), Initialization::FarthestFirst);
        assert_eq!(Initialization::FarthestFirst.to_string(), "farthest-first");
        assert!("kmeans++".parse::<Initialization>().is_err());
    }

    #[test]
    fn effective_thread_count_defaults_to_cores() {
        assert_eq!(OptionalParameters::default().effective_thread_count(), num_cpus::get());
        assert_eq!(OptionalParameters::default().with_thread_count(3).effective_thread_count(), 3);
    }
}
