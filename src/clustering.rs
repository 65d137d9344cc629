//////////////////////////////////////////////////////////////
//////////////////// module: clustering //////////////////////
//////////////////////////////////////////////////////////////

/// The result of a k-means run: the centroids, the assignment of every point to a centroid and
/// some information about the run (iterations, last shift, convergence, inertia).
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::distance::squared_euclidean;
use crate::error::{ClusteringError, Result};
use crate::space::PointSet;
use crate::types::{Assignment, Distance, PointCount, PointIdx};

/// A complete clustering of a point set.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub(crate) centroids: PointSet,
    pub(crate) assignment: Assignment,
    pub(crate) iterations: usize,
    pub(crate) shift: Distance,
    pub(crate) converged: bool,
    pub(crate) inertia: Distance,
}

impl Clustering {
    /// The k x m centroids. Centroid i is the mean of all points with label i.
    pub fn centroids(&self) -> &PointSet {
        &self.centroids
    }

    /// For each point the index of its centroid.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// The number of assign/update iterations that were executed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The summed centroid shift of the last iteration.
    pub fn shift(&self) -> Distance {
        self.shift
    }

    /// False if the iteration cap was reached before the shift dropped below the threshold.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Sum of squared distances between each point and its centroid.
    pub fn inertia(&self) -> Distance {
        self.inertia
    }

    /// The number of clusters.
    pub fn k(&self) -> PointCount {
        self.centroids.n()
    }

    /// The number of points assigned to each centroid.
    pub fn cluster_sizes(&self) -> Vec<PointCount> {
        let mut sizes = vec![0; self.k()];
        for &c in self.assignment.iter() {
            sizes[c] += 1;
        }
        sizes
    }

    /// Returns the clustering itself if it converged and [ClusteringError::NotConverged] otherwise.
    pub fn assert_converged(self) -> Result<Clustering> {
        if self.converged {
            Ok(self)
        } else {
            Err(ClusteringError::NotConverged {
                iterations: self.iterations,
                shift: self.shift,
            })
        }
    }

    /// Saves the clustering to the text-file specified by file_path.
    /// For each centroid there is one line of the form
    /// index:coordinates|points
    ///
    /// Example:
    /// ```txt
    /// 0:0,0.5|0,1
    /// 1:10,0.5|2,3
    /// ```
    pub fn save_to_file<P: AsRef<Path>>(&self, file_path: P) -> Result<()> {
        let mut members_of: Vec<Vec<PointIdx>> = vec![Vec::new(); self.k()];
        for (point_idx, &c) in self.assignment.iter().enumerate() {
            members_of[c].push(point_idx);
        }

        let mut text = String::new();
        for (c, (centroid, members)) in self.centroids.rows().zip(members_of.iter()).enumerate() {
            let coordinates: Vec<String> = centroid.iter().map(|x| x.to_string()).collect();
            let members: Vec<String> = members.iter().map(|p| p.to_string()).collect();
            text += &format!("{}:{}|{}\n", c, coordinates.join(","), members.join(","));
        }
        text.pop(); // delete last newline

        let mut f = File::create(file_path)?;
        f.write_all(text.as_bytes())?;
        Ok(())
    }
}

/// Sum of squared distances of each point to the centroid it is assigned to.
pub(crate) fn inertia(points: &PointSet, centroids: &PointSet, assignment: &Assignment) -> Distance {
    points
        .rows()
        .zip(assignment.iter())
        .map(|(p, &c)| squared_euclidean(p, centroids.row(c)))
        .sum()
}
