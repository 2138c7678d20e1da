//! Post-superimposition steps: principal-axis orientation, tangent-space
//! projection and Procrustes distances.

use nalgebra::DMatrix;

use super::error::AlignError;
use super::superimpose::descending_order;

/// Rotate the consensus and every shape so the consensus principal axes
/// line up with the coordinate axes (largest variance first).
pub(crate) fn align_principal_axes(
    shapes: &mut [DMatrix<f64>],
    consensus: &mut DMatrix<f64>,
) -> Result<(), AlignError> {
    let k = consensus.ncols();
    let scatter = consensus.transpose() * &*consensus;
    let eig = scatter.symmetric_eigen();

    let order = descending_order(&eig.eigenvalues);
    let mut axes = DMatrix::zeros(k, k);
    for (dst, &src) in order.iter().enumerate() {
        axes.set_column(dst, &eig.eigenvectors.column(src));
    }
    if axes.determinant() < 0.0 {
        axes.column_mut(k - 1).neg_mut();
    }
    if !axes.iter().all(|v| v.is_finite()) {
        return Err(AlignError::Numerical(
            "principal axes of the consensus are not finite".into(),
        ));
    }

    *consensus = &*consensus * &axes;
    for shape in shapes.iter_mut() {
        *shape = &*shape * &axes;
    }
    Ok(())
}

/// Orthogonal projection of each shape onto the tangent space at `consensus`.
///
/// Each shape `y` becomes `y - (y·m / m·m) m + m`, so the projected shapes
/// differ from the consensus only in directions orthogonal to it.
pub(crate) fn project_to_tangent_space(shapes: &mut [DMatrix<f64>], consensus: &DMatrix<f64>) {
    let mm = consensus.dot(consensus);
    if mm <= 0.0 {
        return;
    }
    for shape in shapes.iter_mut() {
        let coeff = shape.dot(consensus) / mm;
        *shape -= consensus * coeff;
        *shape += consensus;
    }
}

/// Full Procrustes distance of every shape to the consensus.
pub(crate) fn procrustes_distances(shapes: &[DMatrix<f64>], consensus: &DMatrix<f64>) -> Vec<f64> {
    shapes.iter().map(|s| (s - consensus).norm()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn elongated() -> DMatrix<f64> {
        // Long axis along y before alignment.
        DMatrix::from_row_slice(4, 2, &[0.1, -2.0, -0.1, 2.0, 0.5, 0.0, -0.5, 0.0])
    }

    #[test]
    fn principal_axes_put_largest_variance_first() {
        let mut consensus = elongated();
        let mut shapes = vec![elongated()];
        align_principal_axes(&mut shapes, &mut consensus).expect("finite");

        let var_x: f64 = consensus.column(0).iter().map(|v| v * v).sum();
        let var_y: f64 = consensus.column(1).iter().map(|v| v * v).sum();
        assert!(var_x > var_y);
        assert_relative_eq!((&shapes[0] - &consensus).norm(), 0.0, epsilon = 1e-12);
        // Rotation preserves size.
        assert_relative_eq!(consensus.norm(), elongated().norm(), epsilon = 1e-12);
    }

    #[test]
    fn tangent_projection_is_orthogonal_to_consensus() {
        let consensus = elongated();
        let mut shapes = vec![&elongated() * 1.1 + DMatrix::from_element(4, 2, 0.05)];
        project_to_tangent_space(&mut shapes, &consensus);
        let residual = &shapes[0] - &consensus;
        assert_relative_eq!(residual.dot(&consensus), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let c = elongated();
        let d = procrustes_distances(&[c.clone(), &c * 2.0], &c);
        assert_relative_eq!(d[0], 0.0);
        assert_relative_eq!(d[1], c.norm(), epsilon = 1e-12);
    }
}
