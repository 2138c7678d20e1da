//! Combination of separately aligned landmark subsets.
//!
//! Landmarks digitized as independent subsets (head and tail, cranium and
//! mandible) are aligned subset by subset, which discards their relative
//! size. Combination restores it: every subset of a specimen is scaled by
//! its centroid size divided by the summed centroid sizes of all subsets of
//! that specimen, and the scaled subsets are stacked along the landmark
//! axis. Relative orientation and position of the subsets are not restored.

mod centroid_sizes;
mod config;
mod engine;
mod error;
mod result;
mod subset;

pub use centroid_sizes::{CentroidSizeTable, SubsetSizes};
pub use config::CombineConfig;
pub use engine::{combine_subsets, combine_subsets_with};
pub use error::{CombineError, CombineNotice};
pub use result::CombinedConfiguration;
pub use subset::{Subset, SubsetInput};
