use ndarray::Array2;
use serde::Serialize;

use super::error::CombineNotice;
use crate::gpa::GpaResult;
use crate::landmarks::LandmarkSet;

/// Combined landmark configuration built from several subsets.
///
/// Read-only once built. Rows of the size matrices are specimens, columns
/// are subsets in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedConfiguration {
    pub(crate) coordinates: LandmarkSet,
    pub(crate) subset_names: Vec<String>,
    pub(crate) centroid_sizes: Array2<f64>,
    pub(crate) relative_centroid_sizes: Array2<f64>,
    pub(crate) alignment_results: Vec<Option<GpaResult>>,
    pub(crate) per_subset_aligned_coordinates: Vec<LandmarkSet>,
    pub(crate) per_subset_scaled_coordinates: Vec<LandmarkSet>,
    pub(crate) landmark_counts_per_subset: Vec<usize>,
    pub(crate) notices: Vec<CombineNotice>,
}

impl CombinedConfiguration {
    /// Stacked coordinates; landmark names are `{subset}.{index}`.
    pub fn coordinates(&self) -> &LandmarkSet {
        &self.coordinates
    }

    pub fn subset_names(&self) -> &[String] {
        &self.subset_names
    }

    /// Absolute centroid sizes (`specimens x subsets`).
    pub fn centroid_sizes(&self) -> &Array2<f64> {
        &self.centroid_sizes
    }

    /// Centroid sizes divided by their row sums (`specimens x subsets`).
    pub fn relative_centroid_sizes(&self) -> &Array2<f64> {
        &self.relative_centroid_sizes
    }

    /// Alignment output per subset; `None` when combined without alignment.
    pub fn alignment_results(&self) -> &[Option<GpaResult>] {
        &self.alignment_results
    }

    /// Per-subset coordinates before relative scaling.
    pub fn per_subset_aligned_coordinates(&self) -> &[LandmarkSet] {
        &self.per_subset_aligned_coordinates
    }

    /// Per-subset coordinates after relative scaling.
    pub fn per_subset_scaled_coordinates(&self) -> &[LandmarkSet] {
        &self.per_subset_scaled_coordinates
    }

    pub fn landmark_counts_per_subset(&self) -> &[usize] {
        &self.landmark_counts_per_subset
    }

    /// Warning-level conditions met while combining.
    pub fn notices(&self) -> &[CombineNotice] {
        &self.notices
    }

    /// Index range of subset `index` along the combined landmark axis.
    pub fn subset_landmark_range(&self, index: usize) -> Option<std::ops::Range<usize>> {
        let count = *self.landmark_counts_per_subset.get(index)?;
        let start: usize = self.landmark_counts_per_subset[..index].iter().sum();
        Some(start..start + count)
    }
}
