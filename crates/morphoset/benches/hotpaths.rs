use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use morphoset::{
    generalized_procrustes, CombineConfig, CurveSlider, GpaConfig, LandmarkSet, SlideCriterion,
    Subset,
};
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Noisy, randomly rotated and scaled ellipse outlines (`p x 2 x n`).
fn make_outlines(p: usize, n: usize, seed: u64) -> LandmarkSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut coords = Array3::zeros((p, 2, n));
    for i in 0..n {
        let angle = rng.gen_range(-PI..PI);
        let scale = rng.gen_range(0.5f64..3.0f64);
        let (s, c) = angle.sin_cos();
        for j in 0..p {
            let t = 2.0 * PI * (j as f64) / (p as f64);
            let x = 2.0 * t.cos() + rng.gen_range(-0.05f64..0.05f64);
            let y = t.sin() + rng.gen_range(-0.05f64..0.05f64);
            coords[(j, 0, i)] = scale * (c * x - s * y) + 10.0;
            coords[(j, 1, i)] = scale * (s * x + c * y) - 4.0;
        }
    }
    LandmarkSet::new(coords).expect("deterministic fixture is valid")
}

fn outline_curves(p: usize) -> Vec<CurveSlider> {
    (1..p - 1)
        .filter(|j| j % 4 != 0)
        .map(|j| CurveSlider::from([j - 1, j, j + 1]))
        .collect()
}

fn bench_gpa(c: &mut Criterion) {
    let set = make_outlines(40, 50, 12345);
    let rigid = GpaConfig::default();
    c.bench_function("gpa_40lm_50spec", |b| {
        b.iter(|| {
            let res = generalized_procrustes(black_box(&set), black_box(&rigid))
                .expect("deterministic fixture should align");
            black_box(res.iterations)
        })
    });

    let procd = GpaConfig {
        slide_criterion: SlideCriterion::ProcrustesDistance,
        curves: outline_curves(40),
        ..GpaConfig::default()
    };
    c.bench_function("gpa_40lm_50spec_slide_procd", |b| {
        b.iter(|| {
            let res = generalized_procrustes(black_box(&set), black_box(&procd))
                .expect("deterministic fixture should align");
            black_box(res.iterations)
        })
    });

    let bending = GpaConfig {
        curves: outline_curves(40),
        ..GpaConfig::default()
    };
    c.bench_function("gpa_40lm_50spec_slide_bending", |b| {
        b.iter(|| {
            let res = generalized_procrustes(black_box(&set), black_box(&bending))
                .expect("deterministic fixture should align");
            black_box(res.iterations)
        })
    });
}

fn bench_combine(c: &mut Criterion) {
    let subsets = vec![
        Subset::new("head", make_outlines(26, 50, 1)),
        Subset::new("tail", make_outlines(64, 50, 2)),
    ];
    let aligned = CombineConfig::default();
    c.bench_function("combine_26_64lm_50spec_aligned", |b| {
        b.iter(|| {
            let res = morphoset::combine_subsets(black_box(&subsets), black_box(&aligned), None)
                .expect("deterministic fixture should combine");
            black_box(res.coordinates().n_landmarks())
        })
    });

    let raw = CombineConfig {
        align_first: false,
        ..CombineConfig::default()
    };
    c.bench_function("combine_26_64lm_50spec_raw", |b| {
        b.iter(|| {
            let res = morphoset::combine_subsets(black_box(&subsets), black_box(&raw), None)
                .expect("deterministic fixture should combine");
            black_box(res.coordinates().n_landmarks())
        })
    });
}

criterion_group!(hotpaths, bench_gpa, bench_combine);
criterion_main!(hotpaths);
