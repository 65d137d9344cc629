use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use lloyd_kmeans::{
    compute_kmeans, ClusteringProblem, EmptyClusterPolicy, Initialization, OptionalParameters, PointSet,
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};

/// Cluster the points of a text-file (one point per line, coordinates separated by ',') with
/// Lloyd's k-means algorithm.
#[derive(Parser)]
#[command(name = "kmeans_bin")]
#[command(version)]
struct Cli {
    /// File with one point per line
    points: PathBuf,

    /// Number of clusters
    #[arg(short, long)]
    k: usize,

    /// Stop once the summed centroid shift is below sqrt(tolerance)
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Seed for the initial centroids (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of threads (all cores if omitted)
    #[arg(long)]
    threads: Option<usize>,

    /// reseed, keep or fail
    #[arg(long, default_value = "reseed")]
    empty_cluster: EmptyClusterPolicy,

    /// forgy or farthest-first
    #[arg(long, default_value = "forgy")]
    init: Initialization,

    /// Write the clustering to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exit with an error if the iteration cap is reached
    #[arg(long)]
    require_convergence: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(cli: Cli) -> lloyd_kmeans::Result<()> {
    let points = PointSet::by_file(&cli.points, 1000)?;
    let prob = ClusteringProblem { k: cli.k };
    let mut params = OptionalParameters::default()
        .with_tolerance(cli.tolerance)
        .with_max_iterations(cli.max_iterations)
        .with_empty_cluster(cli.empty_cluster)
        .with_initialization(cli.init);
    params.seed = cli.seed;
    params.thread_count = cli.threads;

    let mut clustering = compute_kmeans(&points, &prob, &params)?;
    if cli.require_convergence {
        clustering = clustering.assert_converged()?;
    }

    println!(
        "k = {}, n = {}, dim = {}: {} after {} iterations (shift {:e}), inertia {}",
        prob.k,
        points.n(),
        points.dim(),
        if clustering.converged() { "converged" } else { "not converged" },
        clustering.iterations(),
        clustering.shift(),
        clustering.inertia()
    );
    for (c, (centroid, size)) in clustering
        .centroids()
        .rows()
        .zip(clustering.cluster_sizes())
        .enumerate()
    {
        println!("  centroid {}: {:?} ({} points)", c, centroid, size);
    }

    if let Some(output) = cli.output {
        clustering.save_to_file(&output)?;
        println!("clustering saved to '{}'", output.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
