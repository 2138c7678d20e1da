//! High-level combination API.
//!
//! [`SubsetCombiner`] is the primary entry point for combining landmark
//! subsets. It wraps a [`CombineConfig`] and provides convenience methods
//! for the common cases (with/without alignment, external sizes, custom
//! aligner).

use crate::combine::{
    combine_subsets, combine_subsets_with, CentroidSizeTable, CombineConfig, CombineError,
    CombinedConfiguration, Subset,
};
use crate::gpa::{Aligner, GpaConfig};

/// Primary combination interface.
///
/// Create once, combine many subset collections.
///
/// # Examples
///
/// ```
/// use morphoset::{LandmarkSet, Subset, SubsetCombiner};
/// use ndarray::Array3;
///
/// let head = LandmarkSet::new(Array3::from_shape_fn((4, 2, 3), |(j, d, i)| {
///     ((j * 2 + d) as f64).sin() * (1.0 + i as f64)
/// }))
/// .unwrap();
/// let tail = LandmarkSet::new(Array3::from_shape_fn((6, 2, 3), |(j, d, i)| {
///     ((j * 3 + d) as f64).cos() + i as f64 * 0.1
/// }))
/// .unwrap();
///
/// let combiner = SubsetCombiner::new();
/// let combined = combiner
///     .combine(&[Subset::new("head", head), Subset::new("tail", tail)])
///     .unwrap();
/// assert_eq!(combined.coordinates().n_landmarks(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SubsetCombiner {
    config: CombineConfig,
}

impl SubsetCombiner {
    /// Combiner that aligns every subset with default GPA settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Combiner that uses raw coordinates without aligning them.
    pub fn without_alignment() -> Self {
        Self::with_config(CombineConfig {
            align_first: false,
            ..CombineConfig::default()
        })
    }

    /// Combiner that aligns with the given GPA settings.
    pub fn with_gpa_config(gpa: GpaConfig) -> Self {
        Self::with_config(CombineConfig {
            gpa,
            ..CombineConfig::default()
        })
    }

    /// Create with full config control.
    pub fn with_config(config: CombineConfig) -> Self {
        Self { config }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &CombineConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut CombineConfig {
        &mut self.config
    }

    /// Combine subsets using sizes measured during alignment, or unit sizes
    /// when alignment is disabled.
    pub fn combine(&self, subsets: &[Subset]) -> Result<CombinedConfiguration, CombineError> {
        combine_subsets(subsets, &self.config, None)
    }

    /// Combine subsets with externally supplied centroid sizes.
    ///
    /// The sizes are only used when alignment is disabled.
    pub fn combine_with_sizes(
        &self,
        subsets: &[Subset],
        centroid_sizes: &CentroidSizeTable,
    ) -> Result<CombinedConfiguration, CombineError> {
        combine_subsets(subsets, &self.config, Some(centroid_sizes))
    }

    /// Combine with a custom aligner in place of the built-in GPA.
    pub fn combine_with_aligner(
        &self,
        aligner: &dyn Aligner,
        subsets: &[Subset],
        centroid_sizes: Option<&CentroidSizeTable>,
    ) -> Result<CombinedConfiguration, CombineError> {
        combine_subsets_with(aligner, subsets, self.config.align_first, centroid_sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::CombineNotice;
    use crate::test_utils::similarity_sample;
    use ndarray::array;

    fn subsets() -> Vec<Subset> {
        let (_, a) = similarity_sample(1, 5, 2, 3, 0.05);
        let (_, b) = similarity_sample(2, 7, 2, 3, 0.05);
        vec![Subset::new("a", a), Subset::new("b", b)]
    }

    #[test]
    fn config_mut_switches_branch() {
        let mut combiner = SubsetCombiner::new();
        assert!(combiner.config().align_first);
        combiner.config_mut().align_first = false;
        let combined = combiner.combine(&subsets()).expect("combine");
        assert!(combined.alignment_results().iter().all(Option::is_none));
    }

    #[test]
    fn without_alignment_uses_supplied_sizes() {
        let table = CentroidSizeTable::Matrix(array![[1.0, 3.0], [1.0, 1.0], [2.0, 2.0]]);
        let combined = SubsetCombiner::without_alignment()
            .combine_with_sizes(&subsets(), &table)
            .expect("combine");
        assert_eq!(combined.relative_centroid_sizes()[(0, 1)], 0.75);
        assert!(combined.notices().is_empty());
    }

    #[test]
    fn gpa_config_is_forwarded() {
        let combiner = SubsetCombiner::with_gpa_config(GpaConfig {
            max_iter: 1,
            ..GpaConfig::default()
        });
        let combined = combiner.combine(&subsets()).expect("combine");
        for result in combined.alignment_results().iter().flatten() {
            assert_eq!(result.iterations, 1);
        }
        assert!(!combined.notices().contains(&CombineNotice::UnitCentroidSizes));
    }
}
