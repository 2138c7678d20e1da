use std::collections::HashSet;

use ndarray::{Array2, ArrayView3, Axis};

use super::centroid_sizes::{relative_weights, resolve_table, CentroidSizeTable};
use super::config::CombineConfig;
use super::error::{CombineError, CombineNotice};
use super::result::CombinedConfiguration;
use super::subset::{Subset, SubsetInput};
use crate::gpa::{Aligner, GeneralizedProcrustes, GpaResult};
use crate::landmarks::{LandmarkError, LandmarkSet};

/// Combine landmark subsets with the built-in Procrustes aligner.
///
/// See [`combine_subsets_with`] for the procedure.
pub fn combine_subsets(
    subsets: &[Subset],
    config: &CombineConfig,
    centroid_sizes: Option<&CentroidSizeTable>,
) -> Result<CombinedConfiguration, CombineError> {
    let aligner = GeneralizedProcrustes::new(config.gpa.clone());
    combine_subsets_with(&aligner, subsets, config.align_first, centroid_sizes)
}

/// Combine separately aligned landmark subsets into one configuration.
///
/// Each subset is aligned on its own (or taken raw when `align_first` is
/// false), scaled specimen-wise by its share of the summed centroid sizes,
/// and stacked along the landmark axis in input order.
///
/// Structure is validated for all subsets before any alignment runs.
pub fn combine_subsets_with(
    aligner: &dyn Aligner,
    subsets: &[Subset],
    align_first: bool,
    centroid_sizes: Option<&CentroidSizeTable>,
) -> Result<CombinedConfiguration, CombineError> {
    validate_subsets(subsets, align_first)?;

    let g = subsets.len();
    let n = subsets[0].n_specimens();
    let names: Vec<&str> = subsets.iter().map(|s| s.name.as_str()).collect();
    let mut notices = Vec::new();

    let (per_subset, alignment_results, sizes) = if align_first {
        if centroid_sizes.is_some() {
            notices.push(CombineNotice::CentroidSizesIgnored);
        }
        let mut coords = Vec::with_capacity(g);
        let mut results = Vec::with_capacity(g);
        let mut sizes = Array2::<f64>::zeros((n, g));
        for (col, subset) in subsets.iter().enumerate() {
            let result = align_subset(aligner, subset)?;
            sizes.column_mut(col).assign(&result.centroid_sizes);
            coords.push(result.coordinates.clone());
            results.push(Some(result));
        }
        (coords, results, sizes)
    } else {
        let coords: Vec<LandmarkSet> = subsets
            .iter()
            .map(|s| s.input.coordinates().clone())
            .collect();
        let sizes = match centroid_sizes {
            None => {
                notices.push(CombineNotice::UnitCentroidSizes);
                Array2::ones((n, g))
            }
            Some(table) => {
                let (sizes, notice) = resolve_table(table, &names, n)?;
                notices.extend(notice);
                sizes
            }
        };
        (coords, vec![None; g], sizes)
    };

    for notice in &notices {
        tracing::warn!("{}", notice);
    }

    let relative = relative_weights(&sizes)?;

    let mut scaled = Vec::with_capacity(g);
    for (col, set) in per_subset.iter().enumerate() {
        // Shape (1, 1, n) broadcasts one weight over every landmark and
        // dimension of a specimen.
        let weights = relative
            .column(col)
            .to_owned()
            .insert_axis(Axis(0))
            .insert_axis(Axis(0));
        let coords = set.coords() * &weights;
        let scaled_set = LandmarkSet::new(coords)
            .and_then(|s| s.with_landmark_names(set.landmark_names().to_vec()))
            .map_err(|e| landmark_mismatch(names[col], e))?;
        scaled.push(scaled_set);
    }

    let views: Vec<ArrayView3<'_, f64>> = scaled.iter().map(|s| s.coords().view()).collect();
    let stacked = ndarray::concatenate(Axis(0), &views).map_err(|e| {
        CombineError::StructuralMismatch {
            subsets: owned(&names),
            reason: format!("subsets cannot be stacked along the landmark axis: {e}"),
        }
    })?;

    let landmark_counts: Vec<usize> = per_subset.iter().map(|s| s.n_landmarks()).collect();
    let landmark_names: Vec<String> = names
        .iter()
        .zip(&landmark_counts)
        .flat_map(|(name, &count)| (1..=count).map(move |i| format!("{name}.{i}")))
        .collect();
    let coordinates = LandmarkSet::new(stacked)
        .and_then(|s| s.with_landmark_names(landmark_names))
        .map_err(|e| CombineError::StructuralMismatch {
            subsets: owned(&names),
            reason: e.to_string(),
        })?;

    tracing::info!(
        "combined {} subsets into {} landmarks x {} specimens",
        g,
        coordinates.n_landmarks(),
        n
    );

    Ok(CombinedConfiguration {
        coordinates,
        subset_names: owned(&names),
        centroid_sizes: sizes,
        relative_centroid_sizes: relative,
        alignment_results,
        per_subset_aligned_coordinates: per_subset,
        per_subset_scaled_coordinates: scaled,
        landmark_counts_per_subset: landmark_counts,
        notices,
    })
}

/// Structural checks shared by every branch, run before any numeric work.
fn validate_subsets(subsets: &[Subset], align_first: bool) -> Result<(), CombineError> {
    if subsets.len() < 2 {
        return Err(CombineError::InsufficientSubsets(subsets.len()));
    }

    let mut seen = HashSet::new();
    let mut bad_names = Vec::new();
    for s in subsets {
        if s.name.is_empty() || !seen.insert(s.name.as_str()) {
            bad_names.push(if s.name.is_empty() {
                "<unnamed>".to_string()
            } else {
                s.name.clone()
            });
        }
    }
    if !bad_names.is_empty() {
        return Err(CombineError::StructuralMismatch {
            subsets: bad_names,
            reason: "subset names must be non-empty and unique".to_string(),
        });
    }

    check_uniform(subsets, "specimen counts", Subset::n_specimens)?;
    check_uniform(subsets, "coordinate dimensions", Subset::n_dims)?;

    if !align_first {
        let aligned: Vec<String> = subsets
            .iter()
            .filter(|s| s.input.is_aligned())
            .map(|s| s.name.clone())
            .collect();
        if !aligned.is_empty() {
            return Err(CombineError::StructuralMismatch {
                subsets: aligned,
                reason: "combining without alignment requires raw landmark sets".to_string(),
            });
        }
    }
    Ok(())
}

fn check_uniform(
    subsets: &[Subset],
    what: &str,
    measure: fn(&Subset) -> usize,
) -> Result<(), CombineError> {
    let expected = measure(&subsets[0]);
    let offenders: Vec<String> = subsets
        .iter()
        .filter(|s| measure(s) != expected)
        .map(|s| s.name.clone())
        .collect();
    if offenders.is_empty() {
        return Ok(());
    }
    let listing: Vec<String> = subsets
        .iter()
        .map(|s| format!("{}={}", s.name, measure(s)))
        .collect();
    Err(CombineError::StructuralMismatch {
        subsets: offenders,
        reason: format!("{what} differ ({})", listing.join(", ")),
    })
}

fn align_subset(aligner: &dyn Aligner, subset: &Subset) -> Result<GpaResult, CombineError> {
    let result = match &subset.input {
        SubsetInput::Landmarks(set) => {
            tracing::debug!(
                "aligning subset '{}' ({} landmarks)",
                subset.name,
                set.n_landmarks()
            );
            aligner
                .align(set)
                .map_err(|source| CombineError::Alignment {
                    subset: subset.name.clone(),
                    source,
                })?
        }
        SubsetInput::Aligned(result) => {
            tracing::debug!("reusing alignment of subset '{}'", subset.name);
            result.clone()
        }
    };

    let input = subset.input.coordinates();
    if result.coordinates.coords().dim() != input.coords().dim() {
        return Err(CombineError::StructuralMismatch {
            subsets: vec![subset.name.clone()],
            reason: format!(
                "aligned coordinates have shape {:?}, input has {:?}",
                result.coordinates.coords().shape(),
                input.coords().shape()
            ),
        });
    }
    if result.centroid_sizes.len() != input.n_specimens() {
        return Err(CombineError::StructuralMismatch {
            subsets: vec![subset.name.clone()],
            reason: format!(
                "alignment reported {} centroid sizes for {} specimens",
                result.centroid_sizes.len(),
                input.n_specimens()
            ),
        });
    }
    Ok(result)
}

fn landmark_mismatch(subset: &str, err: LandmarkError) -> CombineError {
    CombineError::StructuralMismatch {
        subsets: vec![subset.to_string()],
        reason: err.to_string(),
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
