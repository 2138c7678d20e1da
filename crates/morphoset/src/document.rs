//! JSON documents for landmark data.
//!
//! Two versioned schemas are read:
//!
//! - `morphoset.landmarks.v1`: one landmark sample, `specimens` is a list
//!   of specimens, each a list of `[x, y]` or `[x, y, z]` points.
//! - `morphoset.subsets.v1`: named subsets in that same layout, plus
//!   optional centroid sizes and combination settings.
//!
//! Unknown fields are rejected. Shapes are validated after parsing.

use std::path::Path;

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combine::{
    combine_subsets, CentroidSizeTable, CombineConfig, CombineError, CombinedConfiguration,
    Subset, SubsetSizes,
};
use crate::landmarks::{LandmarkError, LandmarkSet};

pub const LANDMARKS_SCHEMA_V1: &str = "morphoset.landmarks.v1";
pub const SUBSETS_SCHEMA_V1: &str = "morphoset.subsets.v1";

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised while loading a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema '{found}' (expected '{expected}')")]
    Schema {
        found: String,
        expected: &'static str,
    },
    /// Well-formed JSON whose content is inconsistent.
    #[error("invalid document: {0}")]
    Invalid(String),
    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
}

// ── Wire types ─────────────────────────────────────────────────────────────

type SpecimenPoints = Vec<Vec<Vec<f64>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LandmarksDocV1 {
    schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    landmark_names: Option<Vec<String>>,
    specimens: SpecimenPoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubsetDocV1 {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    landmark_names: Option<Vec<String>>,
    specimens: SpecimenPoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubsetSizesDocV1 {
    name: String,
    sizes: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CentroidSizesDocV1 {
    PerSubset(Vec<SubsetSizesDocV1>),
    Matrix(Vec<Vec<f64>>),
    Stacked(Vec<Vec<Vec<f64>>>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubsetsDocV1 {
    schema: String,
    subsets: Vec<SubsetDocV1>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    centroid_sizes: Option<CentroidSizesDocV1>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    combine: Option<CombineConfig>,
}

// ── Landmark documents ─────────────────────────────────────────────────────

impl LandmarkSet {
    /// Parse a `morphoset.landmarks.v1` document.
    pub fn from_json_str(data: &str) -> Result<Self, DocumentError> {
        let doc: LandmarksDocV1 = serde_json::from_str(data)?;
        check_schema(&doc.schema, LANDMARKS_SCHEMA_V1)?;
        landmark_set(doc.specimens, doc.landmark_names, "specimens")
    }

    /// Load a `morphoset.landmarks.v1` document from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, DocumentError> {
        Self::from_json_str(&read(path)?)
    }

    /// Render as a `morphoset.landmarks.v1` document.
    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        let specimens: SpecimenPoints = (0..self.n_specimens())
            .map(|i| {
                self.specimen(i)
                    .rows()
                    .into_iter()
                    .map(|row| row.to_vec())
                    .collect::<Vec<_>>()
            })
            .collect();
        let doc = LandmarksDocV1 {
            schema: LANDMARKS_SCHEMA_V1.to_string(),
            landmark_names: Some(self.landmark_names().to_vec()),
            specimens,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

// ── Subset documents ───────────────────────────────────────────────────────

/// Parsed `morphoset.subsets.v1` document.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetsDocument {
    pub subsets: Vec<Subset>,
    pub centroid_sizes: Option<CentroidSizeTable>,
    /// Settings from the document, or defaults when absent.
    pub combine: CombineConfig,
}

impl SubsetsDocument {
    pub fn from_json_str(data: &str) -> Result<Self, DocumentError> {
        let doc: SubsetsDocV1 = serde_json::from_str(data)?;
        check_schema(&doc.schema, SUBSETS_SCHEMA_V1)?;

        let subsets = doc
            .subsets
            .into_iter()
            .map(|s| {
                let context = format!("subset '{}'", s.name);
                let set = landmark_set(s.specimens, s.landmark_names, &context)?;
                Ok(Subset::new(s.name, set))
            })
            .collect::<Result<Vec<_>, DocumentError>>()?;

        let centroid_sizes = doc.centroid_sizes.map(size_table).transpose()?;

        Ok(Self {
            subsets,
            centroid_sizes,
            combine: doc.combine.unwrap_or_default(),
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DocumentError> {
        Self::from_json_str(&read(path)?)
    }

    /// Combine the subsets with the document's own settings.
    pub fn combine(&self) -> Result<CombinedConfiguration, CombineError> {
        combine_subsets(&self.subsets, &self.combine, self.centroid_sizes.as_ref())
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn read(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn check_schema(found: &str, expected: &'static str) -> Result<(), DocumentError> {
    if found != expected {
        return Err(DocumentError::Schema {
            found: found.to_string(),
            expected,
        });
    }
    Ok(())
}

fn landmark_set(
    specimens: SpecimenPoints,
    names: Option<Vec<String>>,
    context: &str,
) -> Result<LandmarkSet, DocumentError> {
    let n = specimens.len();
    let p = specimens.first().map_or(0, Vec::len);
    let k = specimens
        .first()
        .and_then(|s| s.first())
        .map_or(0, Vec::len);
    if n == 0 || p == 0 {
        return Err(DocumentError::Invalid(format!(
            "{context}: needs at least one specimen with at least one landmark"
        )));
    }

    let mut coords = Array3::zeros((p, k, n));
    for (i, specimen) in specimens.iter().enumerate() {
        if specimen.len() != p {
            return Err(DocumentError::Invalid(format!(
                "{context}: specimen {} has {} landmarks, expected {p}",
                i + 1,
                specimen.len()
            )));
        }
        for (j, point) in specimen.iter().enumerate() {
            if point.len() != k {
                return Err(DocumentError::Invalid(format!(
                    "{context}: landmark {} of specimen {} has {} coordinates, expected {k}",
                    j + 1,
                    i + 1,
                    point.len()
                )));
            }
            for (d, &v) in point.iter().enumerate() {
                coords[(j, d, i)] = v;
            }
        }
    }

    let set = LandmarkSet::new(coords)?;
    Ok(match names {
        Some(names) => set.with_landmark_names(names)?,
        None => set,
    })
}

fn size_table(doc: CentroidSizesDocV1) -> Result<CentroidSizeTable, DocumentError> {
    Ok(match doc {
        CentroidSizesDocV1::PerSubset(entries) => CentroidSizeTable::PerSubset(
            entries
                .into_iter()
                .map(|e| SubsetSizes {
                    name: e.name,
                    sizes: e.sizes,
                })
                .collect(),
        ),
        CentroidSizesDocV1::Matrix(rows) => CentroidSizeTable::Matrix(matrix(rows)?),
        CentroidSizesDocV1::Stacked(planes) => {
            let n = planes.len();
            let g = planes.first().map_or(0, Vec::len);
            let depth = planes
                .first()
                .and_then(|p| p.first())
                .map_or(0, Vec::len);
            let mut out = Array3::zeros((n, g, depth));
            for (i, plane) in planes.iter().enumerate() {
                if plane.len() != g || plane.iter().any(|cell| cell.len() != depth) {
                    return Err(DocumentError::Invalid(format!(
                        "centroid_sizes.stacked: row {} is ragged",
                        i + 1
                    )));
                }
                for (s, cell) in plane.iter().enumerate() {
                    for (d, &v) in cell.iter().enumerate() {
                        out[(i, s, d)] = v;
                    }
                }
            }
            CentroidSizeTable::Stacked(out)
        }
    })
}

fn matrix(rows: Vec<Vec<f64>>) -> Result<Array2<f64>, DocumentError> {
    let cols = rows.first().map_or(0, Vec::len);
    if let Some(i) = rows.iter().position(|r| r.len() != cols) {
        return Err(DocumentError::Invalid(format!(
            "centroid_sizes.matrix: row {} has {} entries, expected {cols}",
            i + 1,
            rows[i].len()
        )));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let n = if cols == 0 { 0 } else { flat.len() / cols };
    Array2::from_shape_vec((n, cols), flat)
        .map_err(|e| DocumentError::Invalid(format!("centroid_sizes.matrix: {e}")))
}
