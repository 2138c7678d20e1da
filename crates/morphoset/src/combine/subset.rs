use crate::gpa::GpaResult;
use crate::landmarks::LandmarkSet;

/// Data supplied for one subset.
#[derive(Debug, Clone, PartialEq)]
pub enum SubsetInput {
    /// Raw landmark coordinates.
    Landmarks(LandmarkSet),
    /// Output of a previous alignment, reused as is.
    Aligned(GpaResult),
}

impl SubsetInput {
    /// Coordinates carried by this input (raw or aligned).
    pub fn coordinates(&self) -> &LandmarkSet {
        match self {
            Self::Landmarks(set) => set,
            Self::Aligned(result) => &result.coordinates,
        }
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self, Self::Aligned(_))
    }
}

impl From<LandmarkSet> for SubsetInput {
    fn from(set: LandmarkSet) -> Self {
        Self::Landmarks(set)
    }
}

impl From<GpaResult> for SubsetInput {
    fn from(result: GpaResult) -> Self {
        Self::Aligned(result)
    }
}

/// A named landmark subset, e.g. `"head"` or `"tail"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Subset {
    pub name: String,
    pub input: SubsetInput,
}

impl Subset {
    pub fn new(name: impl Into<String>, input: impl Into<SubsetInput>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
        }
    }

    pub fn n_specimens(&self) -> usize {
        self.input.coordinates().n_specimens()
    }

    pub fn n_landmarks(&self) -> usize {
        self.input.coordinates().n_landmarks()
    }

    pub fn n_dims(&self) -> usize {
        self.input.coordinates().n_dims()
    }
}
