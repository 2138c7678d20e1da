//! Sliding semilandmarks along curve tangents and surface tangent planes.

use nalgebra::{DMatrix, DVector};

use super::config::{GpaConfig, SlideCriterion};
use super::error::AlignError;
use super::superimpose::{center, center_and_scale, descending_order};

/// Tangents shorter than this leave the semilandmark in place.
const MIN_TANGENT_NORM: f64 = 1e-12;

/// Orthonormal tangent directions of one semilandmark.
#[derive(Debug, Clone)]
pub(crate) struct Tangents {
    pub landmark: usize,
    pub directions: Vec<DVector<f64>>,
}

/// Slide every shape toward `consensus`, then re-center and re-scale it.
pub(crate) fn slide_semilandmarks(
    shapes: &mut [DMatrix<f64>],
    consensus: &DMatrix<f64>,
    config: &GpaConfig,
) -> Result<(), AlignError> {
    let bending = match config.slide_criterion {
        SlideCriterion::BendingEnergy => Some(bending_energy_matrix(consensus)?),
        SlideCriterion::ProcrustesDistance => None,
    };

    for (index, shape) in shapes.iter_mut().enumerate() {
        let tangents = tangent_directions(shape, config)?;
        match &bending {
            Some(be) => slide_bending_energy(shape, &tangents, be)?,
            None => slide_procrustes_distance(shape, &tangents, consensus),
        }
        let (rescaled, _) =
            center_and_scale(shape).ok_or(AlignError::DegenerateSpecimen(index))?;
        *shape = rescaled;
    }
    Ok(())
}

/// Tangent directions of every configured semilandmark in `shape`.
pub(crate) fn tangent_directions(
    shape: &DMatrix<f64>,
    config: &GpaConfig,
) -> Result<Vec<Tangents>, AlignError> {
    let mut out = Vec::with_capacity(config.curves.len() + config.surfaces.len());

    for curve in &config.curves {
        let chord = (shape.row(curve.after) - shape.row(curve.before)).transpose();
        let norm = chord.norm();
        let directions = if norm > MIN_TANGENT_NORM {
            vec![chord / norm]
        } else {
            Vec::new()
        };
        out.push(Tangents {
            landmark: curve.slider,
            directions,
        });
    }

    for &surface in &config.surfaces {
        out.push(Tangents {
            landmark: surface,
            directions: surface_tangent_plane(shape, surface, config.surface_neighbors)?,
        });
    }

    Ok(out)
}

/// Two leading principal directions of the landmark and its nearest
/// neighbors.
fn surface_tangent_plane(
    shape: &DMatrix<f64>,
    landmark: usize,
    n_neighbors: usize,
) -> Result<Vec<DVector<f64>>, AlignError> {
    let point = shape.row(landmark);
    let mut others: Vec<(usize, f64)> = (0..shape.nrows())
        .filter(|&j| j != landmark)
        .map(|j| (j, (shape.row(j) - point).norm_squared()))
        .collect();
    others.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut rows = Vec::with_capacity(n_neighbors + 1);
    rows.push(point.clone_owned());
    rows.extend(
        others
            .iter()
            .take(n_neighbors)
            .map(|&(j, _)| shape.row(j).clone_owned()),
    );
    let patch = center(&DMatrix::from_rows(&rows));

    let svd = patch
        .try_svd(false, true, f64::EPSILON, 0)
        .ok_or_else(|| AlignError::Numerical("surface neighborhood SVD did not converge".into()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| AlignError::Numerical("SVD did not return right singular vectors".into()))?;

    Ok(descending_order(&svd.singular_values)
        .into_iter()
        .take(2)
        .map(|i| v_t.row(i).transpose())
        .collect())
}

/// Move each semilandmark by the projection of its offset from the
/// consensus onto its tangent space.
pub(crate) fn slide_procrustes_distance(
    shape: &mut DMatrix<f64>,
    tangents: &[Tangents],
    consensus: &DMatrix<f64>,
) {
    let original = shape.clone();
    for t in tangents {
        let offset = (consensus.row(t.landmark) - original.row(t.landmark)).transpose();
        let mut step = DVector::zeros(offset.len());
        for dir in &t.directions {
            step += dir * dir.dot(&offset);
        }
        let mut row = shape.row_mut(t.landmark);
        row += step.transpose();
    }
}

/// Thin-plate-spline bending energy matrix of `reference` (`p x p`).
pub(crate) fn bending_energy_matrix(reference: &DMatrix<f64>) -> Result<DMatrix<f64>, AlignError> {
    let (p, k) = reference.shape();
    let n = p + k + 1;
    let mut l = DMatrix::zeros(n, n);

    for i in 0..p {
        for j in (i + 1)..p {
            let r = (reference.row(i) - reference.row(j)).norm();
            let u = tps_kernel(r, k);
            l[(i, j)] = u;
            l[(j, i)] = u;
        }
        l[(i, p)] = 1.0;
        l[(p, i)] = 1.0;
        for d in 0..k {
            l[(i, p + 1 + d)] = reference[(i, d)];
            l[(p + 1 + d, i)] = reference[(i, d)];
        }
    }

    let inverse = l.try_inverse().ok_or_else(|| {
        AlignError::Numerical("thin-plate spline system is singular (coincident landmarks?)".into())
    })?;
    Ok(inverse.view((0, 0), (p, p)).into_owned())
}

fn tps_kernel(r: f64, dims: usize) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    if dims == 2 {
        let r2 = r * r;
        r2 * r2.ln()
    } else {
        r
    }
}

/// Slide along the tangents to minimize bending energy relative to the
/// reference encoded in `be`.
///
/// Solves `Y' = Y - U (Uᵀ L U)⁻¹ Uᵀ L Y` with `L = I_k ⊗ be` and `Y` the
/// dimension-major vectorization of the shape.
pub(crate) fn slide_bending_energy(
    shape: &mut DMatrix<f64>,
    tangents: &[Tangents],
    be: &DMatrix<f64>,
) -> Result<(), AlignError> {
    let (p, k) = shape.shape();
    let m: usize = tangents.iter().map(|t| t.directions.len()).sum();
    if m == 0 {
        return Ok(());
    }

    let mut u = DMatrix::zeros(p * k, m);
    let mut col = 0;
    for t in tangents {
        for dir in &t.directions {
            for d in 0..k {
                u[(d * p + t.landmark, col)] = dir[d];
            }
            col += 1;
        }
    }

    // Column-major storage of a p x k matrix is already dimension-major.
    let y = DVector::from_column_slice(shape.as_slice());
    let l = DMatrix::<f64>::identity(k, k).kronecker(be);
    let lu = &l * &u;
    let system = u.transpose() * &lu;
    let rhs = lu.transpose() * &y;
    let shift = system
        .lu()
        .solve(&rhs)
        .ok_or_else(|| AlignError::Numerical("bending-energy sliding system is singular".into()))?;

    let slid = y - &u * shift;
    *shape = DMatrix::from_column_slice(p, k, slid.as_slice());
    Ok(())
}
