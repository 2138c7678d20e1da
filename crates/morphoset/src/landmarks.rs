//! Landmark configurations stored as `(landmark, dimension, specimen)` arrays.
//!
//! [`LandmarkSet`] is the common currency of the crate: alignment consumes
//! and produces it, and subset combination concatenates several of them
//! along the landmark axis.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use serde::Serialize;
use thiserror::Error;

const DIMENSION_LABELS: [&str; 3] = ["X", "Y", "Z"];

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised when a landmark array is not well formed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    /// The array has no landmarks or no specimens.
    #[error("landmark array needs at least one landmark and one specimen, got shape {shape:?}")]
    Empty {
        /// Offending `(landmarks, dims, specimens)` shape.
        shape: [usize; 3],
    },
    /// Coordinate dimension other than 2 or 3.
    #[error("coordinate dimension must be 2 or 3, got {0}")]
    UnsupportedDimension(usize),
    /// A coordinate is NaN or infinite.
    #[error("non-finite coordinate at landmark {landmark}, dimension {dim}, specimen {specimen}")]
    NonFinite {
        landmark: usize,
        dim: usize,
        specimen: usize,
    },
    /// Landmark name list does not match the landmark count.
    #[error("expected {expected} landmark names, got {got}")]
    NameCount { expected: usize, got: usize },
    /// Specimens supplied one by one disagree in shape.
    #[error("specimen {index} has shape {got:?}, expected {expected:?}")]
    RaggedSpecimen {
        index: usize,
        expected: [usize; 2],
        got: [usize; 2],
    },
    /// Flat specimen rows cannot be split into `landmarks x dims`.
    #[error("flat row length {len} does not match {landmarks} landmarks x {dims} dimensions")]
    FlatLayout {
        len: usize,
        landmarks: usize,
        dims: usize,
    },
}

// ── Types ──────────────────────────────────────────────────────────────────

/// Landmark coordinates for a sample of specimens.
///
/// Shape is `(p landmarks, k dimensions, n specimens)` with `k` equal to 2
/// or 3. Every coordinate is finite. Landmark names default to 1-based
/// indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkSet {
    coords: Array3<f64>,
    landmark_names: Vec<String>,
}

impl LandmarkSet {
    /// Wrap a `(landmarks, dims, specimens)` array after validating it.
    pub fn new(coords: Array3<f64>) -> Result<Self, LandmarkError> {
        validate_coords(&coords)?;
        let landmark_names = default_landmark_names(coords.dim().0);
        Ok(Self {
            coords,
            landmark_names,
        })
    }

    /// Replace the landmark names.
    pub fn with_landmark_names(mut self, names: Vec<String>) -> Result<Self, LandmarkError> {
        if names.len() != self.n_landmarks() {
            return Err(LandmarkError::NameCount {
                expected: self.n_landmarks(),
                got: names.len(),
            });
        }
        self.landmark_names = names;
        Ok(self)
    }

    /// Build from one `p x k` matrix per specimen.
    pub fn from_specimens(specimens: &[DMatrix<f64>]) -> Result<Self, LandmarkError> {
        let Some(first) = specimens.first() else {
            return Err(LandmarkError::Empty { shape: [0, 0, 0] });
        };
        let (p, k) = first.shape();
        let mut coords = Array3::zeros((p, k, specimens.len()));
        for (index, specimen) in specimens.iter().enumerate() {
            if specimen.shape() != (p, k) {
                return Err(LandmarkError::RaggedSpecimen {
                    index,
                    expected: [p, k],
                    got: [specimen.nrows(), specimen.ncols()],
                });
            }
            let mut slot = coords.index_axis_mut(Axis(2), index);
            for ((r, c), v) in slot.indexed_iter_mut() {
                *v = specimen[(r, c)];
            }
        }
        Self::new(coords)
    }

    /// Build from a specimens-by-variables matrix whose rows are laid out
    /// `x1, y1, [z1,] x2, y2, ...`.
    pub fn from_flat_rows(
        rows: &Array2<f64>,
        n_landmarks: usize,
        n_dims: usize,
    ) -> Result<Self, LandmarkError> {
        let (n, len) = rows.dim();
        if n_landmarks == 0 || n_dims == 0 || len != n_landmarks * n_dims {
            return Err(LandmarkError::FlatLayout {
                len,
                landmarks: n_landmarks,
                dims: n_dims,
            });
        }
        let coords = Array3::from_shape_fn((n_landmarks, n_dims, n), |(j, d, i)| {
            rows[[i, j * n_dims + d]]
        });
        Self::new(coords)
    }

    /// Flatten to one row per specimen, `x1, y1, [z1,] x2, ...`.
    pub fn to_flat_rows(&self) -> Array2<f64> {
        let (p, k, n) = self.coords.dim();
        Array2::from_shape_fn((n, p * k), |(i, c)| self.coords[[c / k, c % k, i]])
    }

    pub fn n_landmarks(&self) -> usize {
        self.coords.dim().0
    }

    pub fn n_dims(&self) -> usize {
        self.coords.dim().1
    }

    pub fn n_specimens(&self) -> usize {
        self.coords.dim().2
    }

    /// Raw `(landmarks, dims, specimens)` array.
    pub fn coords(&self) -> &Array3<f64> {
        &self.coords
    }

    pub fn into_coords(self) -> Array3<f64> {
        self.coords
    }

    pub fn landmark_names(&self) -> &[String] {
        &self.landmark_names
    }

    /// `"X", "Y"` and, for 3-D data, `"Z"`.
    pub fn dimension_labels(&self) -> &'static [&'static str] {
        &DIMENSION_LABELS[..self.n_dims()]
    }

    /// `p x k` view of one specimen.
    ///
    /// Panics if `index >= n_specimens()`.
    pub fn specimen(&self, index: usize) -> ArrayView2<'_, f64> {
        self.coords.index_axis(Axis(2), index)
    }

    /// Owned `p x k` nalgebra copy of one specimen.
    pub fn specimen_matrix(&self, index: usize) -> DMatrix<f64> {
        let view = self.specimen(index);
        DMatrix::from_fn(view.nrows(), view.ncols(), |r, c| view[[r, c]])
    }

    pub fn specimen_matrices(&self) -> Vec<DMatrix<f64>> {
        (0..self.n_specimens())
            .map(|i| self.specimen_matrix(i))
            .collect()
    }

    /// Centroid size of every specimen.
    pub fn centroid_sizes(&self) -> Array1<f64> {
        (0..self.n_specimens())
            .map(|i| centroid_size(self.specimen(i)))
            .collect()
    }
}

/// Square root of the summed squared distances from each landmark to the
/// configuration centroid.
pub fn centroid_size(config: ArrayView2<'_, f64>) -> f64 {
    let Some(centroid) = config.mean_axis(Axis(0)) else {
        return 0.0;
    };
    (&config - &centroid).mapv(|v| v * v).sum().sqrt()
}

pub(crate) fn default_landmark_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| i.to_string()).collect()
}

fn validate_coords(coords: &Array3<f64>) -> Result<(), LandmarkError> {
    let (p, k, n) = coords.dim();
    if p == 0 || n == 0 {
        return Err(LandmarkError::Empty { shape: [p, k, n] });
    }
    if !(2..=3).contains(&k) {
        return Err(LandmarkError::UnsupportedDimension(k));
    }
    if let Some(((landmark, dim, specimen), _)) =
        coords.indexed_iter().find(|(_, v)| !v.is_finite())
    {
        return Err(LandmarkError::NonFinite {
            landmark,
            dim,
            specimen,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> DMatrix<f64> {
        DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
    }

    #[test]
    fn centroid_size_of_unit_square() {
        let set = LandmarkSet::from_specimens(&[unit_square()]).expect("valid set");
        assert_relative_eq!(set.centroid_sizes()[0], 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn centroid_size_ignores_translation() {
        let shifted = unit_square().add_scalar(17.5);
        let set = LandmarkSet::from_specimens(&[unit_square(), shifted]).expect("valid set");
        let sizes = set.centroid_sizes();
        assert_relative_eq!(sizes[0], sizes[1], epsilon = 1e-12);
    }

    #[test]
    fn default_names_and_labels() {
        let set = LandmarkSet::new(Array3::zeros((3, 3, 2))).expect("valid set");
        assert_eq!(set.landmark_names(), &["1", "2", "3"]);
        assert_eq!(set.dimension_labels(), &["X", "Y", "Z"]);
        assert_eq!((set.n_landmarks(), set.n_dims(), set.n_specimens()), (3, 3, 2));
    }

    #[test]
    fn rejects_unsupported_dimension() {
        let err = LandmarkSet::new(Array3::zeros((3, 4, 2))).expect_err("k=4 is invalid");
        assert_eq!(err, LandmarkError::UnsupportedDimension(4));
    }

    #[test]
    fn rejects_empty_array() {
        let err = LandmarkSet::new(Array3::zeros((0, 2, 2))).expect_err("no landmarks");
        assert_eq!(err, LandmarkError::Empty { shape: [0, 2, 2] });
    }

    #[test]
    fn rejects_non_finite_coordinate() {
        let mut coords = Array3::zeros((3, 2, 2));
        coords[[2, 1, 1]] = f64::NAN;
        let err = LandmarkSet::new(coords).expect_err("NaN is invalid");
        assert_eq!(
            err,
            LandmarkError::NonFinite {
                landmark: 2,
                dim: 1,
                specimen: 1
            }
        );
    }

    #[test]
    fn rejects_ragged_specimens() {
        let err = LandmarkSet::from_specimens(&[unit_square(), DMatrix::zeros(3, 2)])
            .expect_err("ragged input");
        assert_eq!(
            err,
            LandmarkError::RaggedSpecimen {
                index: 1,
                expected: [4, 2],
                got: [3, 2]
            }
        );
    }

    #[test]
    fn landmark_names_must_match_count() {
        let set = LandmarkSet::new(Array3::zeros((2, 2, 1))).expect("valid set");
        let err = set
            .with_landmark_names(vec!["a".into()])
            .expect_err("one name for two landmarks");
        assert_eq!(err, LandmarkError::NameCount { expected: 2, got: 1 });
    }

    #[test]
    fn flat_rows_use_interleaved_layout() {
        // Two specimens, three 2-D landmarks each.
        let rows = Array2::from_shape_vec(
            (2, 6),
            vec![
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, //
                7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
            ],
        )
        .expect("shape");
        let set = LandmarkSet::from_flat_rows(&rows, 3, 2).expect("valid layout");
        assert_eq!(set.coords()[[0, 0, 0]], 1.0);
        assert_eq!(set.coords()[[0, 1, 0]], 2.0);
        assert_eq!(set.coords()[[2, 1, 1]], 12.0);
        assert_eq!(set.to_flat_rows(), rows);
    }

    #[test]
    fn flat_rows_reject_bad_width() {
        let rows = Array2::zeros((2, 5));
        let err = LandmarkSet::from_flat_rows(&rows, 3, 2).expect_err("5 != 3*2");
        assert!(matches!(err, LandmarkError::FlatLayout { len: 5, .. }));
    }

    #[test]
    fn specimen_matrix_matches_view() {
        let set = LandmarkSet::from_specimens(&[unit_square()]).expect("valid set");
        let m = set.specimen_matrix(0);
        assert_eq!(m, unit_square());
        assert_eq!(set.specimen(0)[[2, 1]], 1.0);
    }
}
