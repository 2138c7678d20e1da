use serde::{Deserialize, Serialize};

use crate::gpa::GpaConfig;

/// Configuration for subset combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    /// Align every raw subset before combining.
    pub align_first: bool,
    /// Options forwarded to the built-in aligner.
    pub gpa: GpaConfig,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            align_first: true,
            gpa: GpaConfig::default(),
        }
    }
}
