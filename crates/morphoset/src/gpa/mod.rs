//! Generalized Procrustes analysis (GPA).
//!
//! Every specimen is centered, scaled to unit centroid size and rotated
//! onto an iteratively refined consensus. Curve and surface semilandmarks
//! may slide along their tangents between rotations, minimizing either
//! bending energy or Procrustes distance to the consensus.
//!
//! The result keeps the centroid size of every specimen as measured before
//! scaling, which is what subset combination uses to restore relative size.

mod config;
mod error;
mod procrustes;
mod projection;
mod result;
mod sliding;
mod superimpose;

pub use config::{CurveSlider, GpaConfig, SlideCriterion};
pub use error::AlignError;
pub use procrustes::generalized_procrustes;
pub use result::GpaResult;

use crate::landmarks::LandmarkSet;

/// Superimposition of a landmark sample.
///
/// Implement this trait to combine subsets with a custom alignment
/// procedure. Implementations must return coordinates with the same shape
/// as the input and one centroid size per specimen.
///
/// Built-in implementation: [`GeneralizedProcrustes`].
///
/// # Example
///
/// ```
/// use morphoset::{AlignError, Aligner, GpaResult, LandmarkSet};
/// use ndarray::{Array1, Array2};
///
/// /// Leaves coordinates untouched and reports unit sizes.
/// struct Identity;
///
/// impl Aligner for Identity {
///     fn align(&self, set: &LandmarkSet) -> Result<GpaResult, AlignError> {
///         Ok(GpaResult {
///             coordinates: set.clone(),
///             centroid_sizes: Array1::ones(set.n_specimens()),
///             consensus: Array2::zeros((set.n_landmarks(), set.n_dims())),
///             procrustes_distances: Array1::zeros(set.n_specimens()),
///             iterations: 0,
///             converged: true,
///             criterion: 0.0,
///         })
///     }
/// }
/// ```
pub trait Aligner {
    /// Align `set` and report the pre-alignment centroid size of every specimen.
    fn align(&self, set: &LandmarkSet) -> Result<GpaResult, AlignError>;
}

/// [`Aligner`] running [`generalized_procrustes`] with a fixed configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneralizedProcrustes {
    config: GpaConfig,
}

impl GeneralizedProcrustes {
    pub fn new(config: GpaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GpaConfig {
        &self.config
    }
}

impl Aligner for GeneralizedProcrustes {
    fn align(&self, set: &LandmarkSet) -> Result<GpaResult, AlignError> {
        generalized_procrustes(set, &self.config)
    }
}
