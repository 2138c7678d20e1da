//! Externally supplied centroid sizes and relative subset weights.

use ndarray::{Array1, Array2, Array3, Axis};

use super::error::{CombineError, CombineNotice};

/// Centroid sizes of one named subset, one entry per specimen.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetSizes {
    pub name: String,
    pub sizes: Vec<f64>,
}

/// Centroid sizes supplied for combination without alignment.
///
/// The orientation of every variant is fixed; tables are never transposed
/// to make them fit.
#[derive(Debug, Clone, PartialEq)]
pub enum CentroidSizeTable {
    /// One vector per subset, matched by subset name.
    PerSubset(Vec<SubsetSizes>),
    /// Rows are specimens, columns are subsets in input order.
    Matrix(Array2<f64>),
    /// Shape `(specimens, subsets, 1)`; collapsed to [`Self::Matrix`].
    Stacked(Array3<f64>),
}

impl CentroidSizeTable {
    /// Number of subsets the table covers.
    pub fn n_subsets(&self) -> usize {
        match self {
            Self::PerSubset(entries) => entries.len(),
            Self::Matrix(m) => m.ncols(),
            Self::Stacked(s) => s.dim().1,
        }
    }
}

/// Resolve `table` into an `n x g` matrix ordered like `names`.
///
/// A table covering the wrong number of subsets is not an error: unit sizes
/// are returned together with a notice.
pub(crate) fn resolve_table(
    table: &CentroidSizeTable,
    names: &[&str],
    n_specimens: usize,
) -> Result<(Array2<f64>, Option<CombineNotice>), CombineError> {
    let expected = names.len();

    if let CentroidSizeTable::Stacked(stacked) = table {
        if stacked.dim().2 != 1 {
            return Err(CombineError::InvalidCentroidSizes(format!(
                "stacked table must have shape (specimens, subsets, 1), got {:?}",
                stacked.shape()
            )));
        }
    }

    let supplied = table.n_subsets();
    if supplied != expected {
        return Ok((
            Array2::ones((n_specimens, expected)),
            Some(CombineNotice::CentroidSizeCardinalityMismatch { supplied, expected }),
        ));
    }

    let matrix = match table {
        CentroidSizeTable::PerSubset(entries) => per_subset_matrix(entries, names, n_specimens)?,
        CentroidSizeTable::Matrix(m) => oriented(m.clone(), n_specimens)?,
        CentroidSizeTable::Stacked(s) => {
            oriented(s.index_axis(Axis(2), 0).to_owned(), n_specimens)?
        }
    };

    if let Some(((specimen, subset), v)) = matrix
        .indexed_iter()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(CombineError::InvalidCentroidSizes(format!(
            "centroid size {v} for specimen {} in subset '{}' must be finite and non-negative",
            specimen + 1,
            names[subset]
        )));
    }

    Ok((matrix, None))
}

fn oriented(matrix: Array2<f64>, n_specimens: usize) -> Result<Array2<f64>, CombineError> {
    if matrix.nrows() != n_specimens {
        return Err(CombineError::InvalidCentroidSizes(format!(
            "centroid-size matrix has shape {:?}; expected {} rows (specimens) by subsets",
            matrix.shape(),
            n_specimens
        )));
    }
    Ok(matrix)
}

fn per_subset_matrix(
    entries: &[SubsetSizes],
    names: &[&str],
    n_specimens: usize,
) -> Result<Array2<f64>, CombineError> {
    let mut matrix = Array2::zeros((n_specimens, names.len()));
    for (col, name) in names.iter().enumerate() {
        let entry = entries.iter().find(|e| e.name == *name).ok_or_else(|| {
            CombineError::InvalidCentroidSizes(format!("no centroid sizes for subset '{name}'"))
        })?;
        if entry.sizes.len() != n_specimens {
            return Err(CombineError::InvalidCentroidSizes(format!(
                "subset '{name}' has {} centroid sizes, expected {n_specimens}",
                entry.sizes.len()
            )));
        }
        matrix
            .column_mut(col)
            .assign(&Array1::from(entry.sizes.clone()));
    }
    Ok(matrix)
}

/// Divide every row by its sum so the subsets of each specimen sum to one.
pub(crate) fn relative_weights(sizes: &Array2<f64>) -> Result<Array2<f64>, CombineError> {
    let totals = sizes.sum_axis(Axis(1));
    if let Some((specimen, total)) = totals
        .iter()
        .enumerate()
        .find(|(_, t)| !(t.is_finite() && **t > 0.0))
    {
        let reason = if total.is_finite() {
            "sum to zero"
        } else {
            "have a non-finite sum"
        };
        return Err(CombineError::InvalidCentroidSizes(format!(
            "centroid sizes of specimen {} {reason}",
            specimen + 1
        )));
    }
    Ok(sizes / &totals.insert_axis(Axis(1)))
}
