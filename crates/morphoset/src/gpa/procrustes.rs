use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use super::config::GpaConfig;
use super::error::AlignError;
use super::projection::{align_principal_axes, procrustes_distances, project_to_tangent_space};
use super::result::GpaResult;
use super::superimpose::{center_and_scale, superimpose};
use crate::landmarks::LandmarkSet;

/// Generalized Procrustes analysis of a landmark sample.
///
/// Removes location, scale and orientation from every specimen and returns
/// the aligned coordinates together with the centroid sizes measured
/// before scaling. Landmark names carry over unchanged.
pub fn generalized_procrustes(
    set: &LandmarkSet,
    config: &GpaConfig,
) -> Result<GpaResult, AlignError> {
    config.validate(set.n_landmarks(), set.n_dims())?;
    let n = set.n_specimens();
    if n < 2 {
        return Err(AlignError::TooFewSpecimens(n));
    }

    let mut centroid_sizes = Vec::with_capacity(n);
    let mut shapes = Vec::with_capacity(n);
    for (index, specimen) in set.specimen_matrices().iter().enumerate() {
        let (shape, size) =
            center_and_scale(specimen).ok_or(AlignError::DegenerateSpecimen(index))?;
        centroid_sizes.push(size);
        shapes.push(shape);
    }

    let fit = superimpose(shapes, config)?;
    if !fit.converged {
        tracing::warn!(
            "GPA did not converge after {} iterations (criterion {:.3e}, tolerance {:.1e})",
            fit.iterations,
            fit.criterion,
            config.tolerance
        );
    }

    let mut shapes = fit.shapes;
    let mut consensus = fit.consensus;
    let distances = procrustes_distances(&shapes, &consensus);

    if config.principal_axes {
        align_principal_axes(&mut shapes, &mut consensus)?;
    }
    if config.project_tangent {
        project_to_tangent_space(&mut shapes, &consensus);
    }

    let coordinates = LandmarkSet::from_specimens(&shapes)?
        .with_landmark_names(set.landmark_names().to_vec())?;

    tracing::info!(
        "GPA aligned {} specimens x {} landmarks in {} iterations",
        n,
        set.n_landmarks(),
        fit.iterations
    );

    Ok(GpaResult {
        coordinates,
        centroid_sizes: Array1::from(centroid_sizes),
        consensus: to_array2(&consensus),
        procrustes_distances: Array1::from(distances),
        iterations: fit.iterations,
        converged: fit.converged,
        criterion: fit.criterion,
    })
}

fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn(m.shape(), |(r, c)| m[(r, c)])
}
