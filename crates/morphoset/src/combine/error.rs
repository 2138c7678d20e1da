use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::gpa::AlignError;

/// Errors that abort subset combination.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombineError {
    /// Fewer than two subsets were supplied.
    #[error("at least 2 landmark subsets are required, got {0}")]
    InsufficientSubsets(usize),
    /// Subsets disagree in structure (names, specimen count, dimension).
    #[error("structural mismatch in subset(s) {}: {reason}", .subsets.join(", "))]
    StructuralMismatch {
        /// Names of the offending subsets.
        subsets: Vec<String>,
        reason: String,
    },
    /// Alignment of one subset failed.
    #[error("alignment of subset '{subset}' failed: {source}")]
    Alignment {
        subset: String,
        #[source]
        source: AlignError,
    },
    /// Externally supplied centroid sizes cannot be used.
    #[error("invalid centroid sizes: {0}")]
    InvalidCentroidSizes(String),
}

/// Non-fatal conditions recorded while combining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombineNotice {
    /// The centroid-size table covers a different number of subsets than
    /// were combined; unit sizes were used instead.
    CentroidSizeCardinalityMismatch { supplied: usize, expected: usize },
    /// No sizes were available, so every subset was weighted equally.
    UnitCentroidSizes,
    /// External sizes were supplied but alignment produced its own.
    CentroidSizesIgnored,
}

impl fmt::Display for CombineNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CentroidSizeCardinalityMismatch { supplied, expected } => write!(
                f,
                "centroid sizes supplied for {supplied} subsets but {expected} were combined; \
                 all centroid sizes set to 1"
            ),
            Self::UnitCentroidSizes => f.write_str(
                "no centroid sizes available without alignment; all centroid sizes set to 1",
            ),
            Self::CentroidSizesIgnored => f.write_str(
                "external centroid sizes ignored; sizes measured during alignment were used",
            ),
        }
    }
}
