//! Shared synthetic-specimen helpers for unit tests.

use nalgebra::{DMatrix, Rotation3};
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::landmarks::LandmarkSet;

/// Random `p x k` configuration with coordinates in `[-1, 1]`.
pub(crate) fn random_shape(rng: &mut StdRng, p: usize, k: usize) -> DMatrix<f64> {
    DMatrix::from_fn(p, k, |_, _| rng.gen_range(-1.0..1.0))
}

/// Proper rotation matrix (`k x k`) built from the given angles.
///
/// 2-D uses `angles[0]`; 3-D uses all three as roll/pitch/yaw.
pub(crate) fn rotation_matrix(k: usize, angles: [f64; 3]) -> DMatrix<f64> {
    if k == 2 {
        let (s, c) = angles[0].sin_cos();
        DMatrix::from_row_slice(2, 2, &[c, -s, s, c])
    } else {
        let r = Rotation3::from_euler_angles(angles[0], angles[1], angles[2]);
        DMatrix::from_iterator(3, 3, r.matrix().iter().copied())
    }
}

/// Apply `scale * shape * rotation + translation`.
pub(crate) fn similarity(
    shape: &DMatrix<f64>,
    scale: f64,
    rotation: &DMatrix<f64>,
    translation: &[f64],
) -> DMatrix<f64> {
    let mut out = shape * rotation * scale;
    for (mut column, t) in out.column_iter_mut().zip(translation) {
        column.add_scalar_mut(*t);
    }
    out
}

/// Sample of `n` similarity-transformed copies of one base shape, each with
/// optional isotropic landmark noise.
pub(crate) fn similarity_sample(
    seed: u64,
    p: usize,
    k: usize,
    n: usize,
    noise: f64,
) -> (DMatrix<f64>, LandmarkSet) {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = random_shape(&mut rng, p, k);
    let specimens: Vec<DMatrix<f64>> = (0..n)
        .map(|_| {
            let scale = rng.gen_range(0.5..4.0);
            let angles = [
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-3.0..3.0),
            ];
            let translation: Vec<f64> = (0..k).map(|_| rng.gen_range(-10.0..10.0)).collect();
            let mut s = similarity(&base, scale, &rotation_matrix(k, angles), &translation);
            if noise > 0.0 {
                s.apply(|v| *v += rng.gen_range(-noise..noise));
            }
            s
        })
        .collect();
    let set = LandmarkSet::from_specimens(&specimens).expect("synthetic sample is valid");
    (base, set)
}

/// Landmark set whose specimen `i` is `shape` multiplied by `sizes[i]`.
pub(crate) fn scaled_copies(shape: &DMatrix<f64>, sizes: &[f64]) -> LandmarkSet {
    let (p, k) = shape.shape();
    let coords = Array3::from_shape_fn((p, k, sizes.len()), |(j, d, i)| shape[(j, d)] * sizes[i]);
    LandmarkSet::new(coords).expect("scaled copies are valid")
}
