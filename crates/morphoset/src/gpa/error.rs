use thiserror::Error;

use crate::landmarks::LandmarkError;

/// Errors that can occur during generalized Procrustes analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignError {
    /// Input or output coordinates are not a well-formed landmark array.
    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
    /// Superimposition needs a sample, not a single configuration.
    #[error("generalized Procrustes analysis needs at least 2 specimens, got {0}")]
    TooFewSpecimens(usize),
    /// Specimen collapses to a single point.
    #[error("specimen {0} has zero centroid size")]
    DegenerateSpecimen(usize),
    /// Configuration is inconsistent with the landmark layout.
    #[error("invalid alignment configuration: {0}")]
    InvalidConfig(String),
    /// A decomposition or linear solve failed.
    #[error("numerical failure: {0}")]
    Numerical(String),
}
