use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::landmarks::LandmarkSet;

/// Result of generalized Procrustes analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpaResult {
    /// Aligned coordinates, same shape and landmark names as the input.
    pub coordinates: LandmarkSet,
    /// Centroid size of every input specimen before scaling.
    pub centroid_sizes: Array1<f64>,
    /// Mean aligned configuration (`p x k`, unit centroid size).
    pub consensus: Array2<f64>,
    /// Procrustes distance of every specimen to the consensus.
    pub procrustes_distances: Array1<f64>,
    /// Number of superimposition iterations performed.
    pub iterations: usize,
    /// Whether the consensus change dropped below the tolerance.
    pub converged: bool,
    /// Squared consensus change at the last iteration.
    pub criterion: f64,
}

impl GpaResult {
    pub fn n_specimens(&self) -> usize {
        self.coordinates.n_specimens()
    }

    pub fn n_landmarks(&self) -> usize {
        self.coordinates.n_landmarks()
    }

    pub fn n_dims(&self) -> usize {
        self.coordinates.n_dims()
    }
}
