use serde::{Deserialize, Serialize};

use super::error::AlignError;

/// Criterion minimized when sliding semilandmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideCriterion {
    /// Thin-plate-spline bending energy relative to the consensus.
    #[default]
    BendingEnergy,
    /// Procrustes distance to the consensus.
    ProcrustesDistance,
}

/// A curve semilandmark and the two landmarks whose chord defines its tangent.
///
/// Serialized as `[before, slider, after]` (0-based landmark indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct CurveSlider {
    pub before: usize,
    pub slider: usize,
    pub after: usize,
}

impl From<[usize; 3]> for CurveSlider {
    fn from([before, slider, after]: [usize; 3]) -> Self {
        Self {
            before,
            slider,
            after,
        }
    }
}

impl From<CurveSlider> for [usize; 3] {
    fn from(c: CurveSlider) -> Self {
        [c.before, c.slider, c.after]
    }
}

/// Configuration for generalized Procrustes analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpaConfig {
    /// Maximum number of superimposition iterations.
    pub max_iter: usize,
    /// Stop once the squared change of the consensus drops below this value.
    pub tolerance: f64,
    /// Rotate the aligned sample onto the principal axes of the consensus.
    pub principal_axes: bool,
    /// Project aligned coordinates into the tangent space at the consensus.
    pub project_tangent: bool,
    /// Criterion used to slide semilandmarks.
    pub slide_criterion: SlideCriterion,
    /// Curve semilandmarks.
    pub curves: Vec<CurveSlider>,
    /// Surface semilandmarks (3-D data only).
    pub surfaces: Vec<usize>,
    /// Number of nearest landmarks used to estimate a surface tangent plane.
    pub surface_neighbors: usize,
}

impl Default for GpaConfig {
    fn default() -> Self {
        Self {
            max_iter: 10,
            tolerance: 1e-4,
            principal_axes: true,
            project_tangent: true,
            slide_criterion: SlideCriterion::BendingEnergy,
            curves: Vec::new(),
            surfaces: Vec::new(),
            surface_neighbors: 5,
        }
    }
}

impl GpaConfig {
    /// Whether any landmark is allowed to slide.
    pub fn has_semilandmarks(&self) -> bool {
        !self.curves.is_empty() || !self.surfaces.is_empty()
    }

    /// Check the configuration against a landmark layout.
    pub fn validate(&self, n_landmarks: usize, n_dims: usize) -> Result<(), AlignError> {
        if self.max_iter == 0 {
            return Err(invalid("max_iter must be >= 1".to_string()));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(invalid("tolerance must be finite and > 0".to_string()));
        }

        let mut sliding = vec![false; n_landmarks];
        let in_range = |idx: usize, what: &str| {
            if idx < n_landmarks {
                Ok(())
            } else {
                Err(invalid(format!(
                    "{what} index {idx} out of range for {n_landmarks} landmarks"
                )))
            }
        };

        for curve in &self.curves {
            in_range(curve.before, "curve")?;
            in_range(curve.slider, "curve")?;
            in_range(curve.after, "curve")?;
            if curve.before == curve.slider || curve.after == curve.slider {
                return Err(invalid(format!(
                    "curve slider {} cannot be its own neighbor",
                    curve.slider
                )));
            }
            if std::mem::replace(&mut sliding[curve.slider], true) {
                return Err(invalid(format!(
                    "landmark {} is listed as a curve slider more than once",
                    curve.slider
                )));
            }
        }

        if !self.surfaces.is_empty() {
            if n_dims != 3 {
                return Err(invalid(format!(
                    "surface semilandmarks require 3-D data, got {n_dims}-D"
                )));
            }
            if self.surface_neighbors < 2 || self.surface_neighbors >= n_landmarks {
                return Err(invalid(format!(
                    "surface_neighbors must be in [2, {}), got {}",
                    n_landmarks, self.surface_neighbors
                )));
            }
        }
        for &surface in &self.surfaces {
            in_range(surface, "surface")?;
            if std::mem::replace(&mut sliding[surface], true) {
                return Err(invalid(format!(
                    "landmark {surface} is listed as a sliding semilandmark more than once"
                )));
            }
        }

        Ok(())
    }
}

fn invalid(msg: String) -> AlignError {
    AlignError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_for_any_layout() {
        let cfg = GpaConfig::default();
        assert!(cfg.validate(3, 2).is_ok());
        assert!(!cfg.has_semilandmarks());
    }

    #[test]
    fn curve_sliders_serialize_as_triples() {
        let cfg = GpaConfig {
            curves: vec![CurveSlider::from([0, 1, 2])],
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).expect("serialize");
        assert!(json.contains("\"curves\":[[0,1,2]]"));
        let back: GpaConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.curves[0].slider, 1);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: GpaConfig =
            serde_json::from_str(r#"{"max_iter": 3, "slide_criterion": "procrustes_distance"}"#)
                .expect("valid json");
        assert_eq!(cfg.max_iter, 3);
        assert_eq!(cfg.slide_criterion, SlideCriterion::ProcrustesDistance);
        assert!(cfg.principal_axes);
    }

    #[test]
    fn rejects_out_of_range_curve() {
        let cfg = GpaConfig {
            curves: vec![CurveSlider::from([0, 1, 5])],
            ..Default::default()
        };
        let err = cfg.validate(4, 2).expect_err("index 5 out of range");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_duplicate_sliders() {
        let cfg = GpaConfig {
            curves: vec![CurveSlider::from([0, 2, 3])],
            surfaces: vec![2],
            surface_neighbors: 3,
            ..Default::default()
        };
        assert!(cfg.validate(8, 3).is_err());
    }

    #[test]
    fn rejects_surfaces_in_2d() {
        let cfg = GpaConfig {
            surfaces: vec![1],
            ..Default::default()
        };
        let err = cfg.validate(10, 2).expect_err("2-D surfaces");
        assert!(err.to_string().contains("3-D"));
    }

    #[test]
    fn rejects_zero_iterations() {
        let cfg = GpaConfig {
            max_iter: 0,
            ..Default::default()
        };
        assert!(cfg.validate(4, 2).is_err());
    }
}
