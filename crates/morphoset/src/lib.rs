//! morphoset — landmark-based geometric morphometrics in pure Rust.
//!
//! The crate aligns landmark configurations with generalized Procrustes
//! analysis and combines landmark subsets that were aligned separately.
//! The stages are:
//!
//! 1. **Landmarks** – `(landmark, dimension, specimen)` arrays with
//!    validation, flat-row conversion and centroid sizes.
//! 2. **GPA** – centering, unit scaling and iterative rotation onto a
//!    consensus, with optional curve/surface semilandmark sliding,
//!    principal-axis orientation and tangent-space projection.
//! 3. **Combine** – relative centroid-size weighting of each subset and
//!    stacking along the landmark axis.
//! 4. **Documents** – versioned JSON inputs for the command-line tool.
//!
//! # Public API
//! - [`SubsetCombiner`] and [`combine_subsets`] as primary entry points
//! - [`generalized_procrustes`] and the [`Aligner`] trait for alignment
//! - [`LandmarkSet`], configuration and result structures

mod api;
mod combine;
mod document;
mod gpa;
mod landmarks;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::SubsetCombiner;
pub use combine::{
    combine_subsets, combine_subsets_with, CentroidSizeTable, CombineConfig, CombineError,
    CombineNotice, CombinedConfiguration, Subset, SubsetInput, SubsetSizes,
};
pub use document::{DocumentError, SubsetsDocument, LANDMARKS_SCHEMA_V1, SUBSETS_SCHEMA_V1};
pub use gpa::{
    generalized_procrustes, AlignError, Aligner, CurveSlider, GeneralizedProcrustes, GpaConfig,
    GpaResult, SlideCriterion,
};
pub use landmarks::{centroid_size, LandmarkError, LandmarkSet};
