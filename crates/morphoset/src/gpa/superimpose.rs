//! Ordinary Procrustes fits and the iterative superimposition loop.

use nalgebra::{DMatrix, DVector};

use super::config::GpaConfig;
use super::error::AlignError;
use super::sliding::slide_semilandmarks;

/// Sizes below this are treated as a configuration collapsed to a point.
const MIN_CENTROID_SIZE: f64 = 1e-12;

/// Iteration cap handed to the SVD; 0 means "until converged".
const SVD_MAX_ITER: usize = 0;

#[derive(Debug, Clone)]
pub(crate) struct Superimposition {
    pub shapes: Vec<DMatrix<f64>>,
    pub consensus: DMatrix<f64>,
    pub iterations: usize,
    pub converged: bool,
    pub criterion: f64,
}

/// Translate a `p x k` configuration so its centroid is the origin.
pub(crate) fn center(config: &DMatrix<f64>) -> DMatrix<f64> {
    let mut centered = config.clone();
    for mut column in centered.column_iter_mut() {
        let mean = column.mean();
        column.add_scalar_mut(-mean);
    }
    centered
}

/// Center and scale to unit centroid size. Returns the configuration and
/// its original centroid size, or `None` for a degenerate configuration.
pub(crate) fn center_and_scale(config: &DMatrix<f64>) -> Option<(DMatrix<f64>, f64)> {
    let mut centered = center(config);
    let size = centered.norm();
    if !size.is_finite() || size <= MIN_CENTROID_SIZE {
        return None;
    }
    centered /= size;
    Some((centered, size))
}

/// Indices of `values` ordered from largest to smallest.
pub(crate) fn descending_order(values: &DVector<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

/// Orthogonal `k x k` matrix `R` minimizing `||shape * R - target||`, with
/// reflections excluded.
pub(crate) fn optimal_rotation(
    shape: &DMatrix<f64>,
    target: &DMatrix<f64>,
) -> Result<DMatrix<f64>, AlignError> {
    let cross = shape.transpose() * target;
    let svd = cross
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITER)
        .ok_or_else(|| AlignError::Numerical("SVD of cross-product did not converge".into()))?;
    let (Some(mut u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(AlignError::Numerical(
            "SVD did not return singular vectors".into(),
        ));
    };

    let mut rotation = &u * &v_t;
    if rotation.determinant() < 0.0 {
        // Flip the axis carrying the least variance to turn the reflection
        // into a proper rotation.
        let weakest = descending_order(&svd.singular_values)
            .last()
            .copied()
            .unwrap_or(0);
        u.column_mut(weakest).neg_mut();
        rotation = &u * &v_t;
    }
    Ok(rotation)
}

pub(crate) fn rotate_onto(
    shape: &mut DMatrix<f64>,
    target: &DMatrix<f64>,
) -> Result<(), AlignError> {
    let rotation = optimal_rotation(shape, target)?;
    *shape = &*shape * rotation;
    Ok(())
}

/// Mean of the aligned shapes, re-centered and scaled to unit size.
pub(crate) fn consensus_of(shapes: &[DMatrix<f64>]) -> Result<DMatrix<f64>, AlignError> {
    let Some(first) = shapes.first() else {
        return Err(AlignError::TooFewSpecimens(0));
    };
    let mut sum = DMatrix::zeros(first.nrows(), first.ncols());
    for shape in shapes {
        sum += shape;
    }
    sum /= shapes.len() as f64;
    center_and_scale(&sum)
        .map(|(mean, _)| mean)
        .ok_or_else(|| AlignError::Numerical("consensus collapsed to a single point".into()))
}

/// Iteratively rotate unit-size, centered shapes onto their mean.
///
/// Shapes are first rotated onto specimen 0 to seed the consensus. Each
/// iteration then slides semilandmarks (when configured), re-fits every
/// shape to the consensus and recomputes it.
pub(crate) fn superimpose(
    mut shapes: Vec<DMatrix<f64>>,
    config: &GpaConfig,
) -> Result<Superimposition, AlignError> {
    let reference = shapes
        .first()
        .cloned()
        .ok_or(AlignError::TooFewSpecimens(0))?;
    for shape in shapes.iter_mut().skip(1) {
        rotate_onto(shape, &reference)?;
    }
    let mut consensus = consensus_of(&shapes)?;

    let mut iterations = 0;
    let mut converged = false;
    let mut criterion = f64::INFINITY;
    while iterations < config.max_iter {
        iterations += 1;

        if config.has_semilandmarks() {
            slide_semilandmarks(&mut shapes, &consensus, config)?;
        }
        for shape in shapes.iter_mut() {
            rotate_onto(shape, &consensus)?;
        }

        let updated = consensus_of(&shapes)?;
        criterion = (&updated - &consensus).norm_squared();
        consensus = updated;
        tracing::debug!("GPA iteration {}: consensus change {:.3e}", iterations, criterion);

        if criterion < config.tolerance {
            converged = true;
            break;
        }
    }

    Ok(Superimposition {
        shapes,
        consensus,
        iterations,
        converged,
        criterion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 2, &[0.0, 0.0, 2.0, 0.0, 0.5, 1.5])
    }

    #[test]
    fn center_and_scale_gives_unit_size() {
        let (scaled, size) = center_and_scale(&(triangle() * 3.0)).expect("non-degenerate");
        assert_relative_eq!(scaled.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(scaled.row_sum()[0], 0.0, epsilon = 1e-12);
        assert!(size > 0.0);
    }

    #[test]
    fn degenerate_configuration_is_rejected() {
        let point = DMatrix::from_element(4, 2, 3.0);
        assert!(center_and_scale(&point).is_none());
    }

    #[test]
    fn optimal_rotation_recovers_known_angle() {
        let (shape, _) = center_and_scale(&triangle()).expect("non-degenerate");
        let (sin, cos) = 0.7f64.sin_cos();
        let rot = DMatrix::from_row_slice(2, 2, &[cos, -sin, sin, cos]);
        let rotated = &shape * &rot;
        let r = optimal_rotation(&rotated, &shape).expect("svd");
        let back = &rotated * &r;
        assert_relative_eq!((&back - &shape).norm(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn optimal_rotation_never_reflects() {
        let (shape, _) = center_and_scale(&triangle()).expect("non-degenerate");
        let mut mirrored = shape.clone();
        mirrored.column_mut(0).neg_mut();
        let r = optimal_rotation(&mirrored, &shape).expect("svd");
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn descending_order_sorts_values() {
        let v = DVector::from_vec(vec![0.2, 3.0, 1.0]);
        assert_eq!(descending_order(&v), vec![1, 2, 0]);
    }
}
