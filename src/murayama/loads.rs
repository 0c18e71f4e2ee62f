//! Equivalent loads on the sliding wedge
//!
//! Everything here is closed form: no numerical integration of the spiral.
//! The wedge is split into a triangle (face crown, face toe, surface end) and
//! the curved region between the chord and the spiral.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::ground::{GroundParameters, Strength};
use crate::murayama::ModelOptions;
use crate::murayama::geometry::SpiralGeometry;
use crate::physics::statics::{PointLoad, resultant_arm};

/// How the arm of the curved sub-region (lw2) is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentroidMethod {
    /// Equivalent circular-segment construction
    #[default]
    ClosedForm,
    /// la + B/√3, matches the reference spreadsheet
    Simplified,
}

impl CentroidMethod {
    /// Arm of the curved sub-region about the pole (m)
    pub fn curved_arm(&self, geometry: &SpiralGeometry) -> f64 {
        match self {
            CentroidMethod::ClosedForm => closed_form_curved_arm(geometry),
            CentroidMethod::Simplified => geometry.la + geometry.width / 3f64.sqrt(),
        }
    }
}

/// Which surcharge formula applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum CoverRegime {
    /// Bracket term taken as 1
    Deep,
    /// Finite overburden H (m)
    Finite { overburden: f64 },
}

impl CoverRegime {
    /// Finite when forced, or when H ≤ `deep_cover_ratio`·B; deep otherwise
    ///
    /// Forcing without an overburden still gives the deep formula.
    pub fn select(ground: &GroundParameters, deep_cover_ratio: f64, width: f64) -> Self {
        match ground.overburden() {
            Some(h) if ground.force_finite_cover() || h <= deep_cover_ratio * width => {
                CoverRegime::Finite { overburden: h }
            }
            _ => CoverRegime::Deep,
        }
    }
}

/// Equivalent loads for one resolved geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadComponents {
    /// Triangular sub-region weight w1 (kN/m)
    pub w1: f64,
    /// Arm of w1 (m)
    pub lw1: f64,
    /// Curved sub-region weight w2 (kN/m)
    pub w2: f64,
    /// Arm of w2 (m)
    pub lw2: f64,
    /// Self-weight Wf = w1 + w2 (kN/m)
    pub self_weight: f64,
    /// Composite arm lw (m)
    pub lw: f64,
    /// Equivalent surcharge q (kPa)
    pub surcharge: f64,
    pub cover_regime: CoverRegime,
    /// Cohesive resisting moment Mc (kN·m/m)
    pub cohesive_moment: f64,
}

impl LoadComponents {
    /// Compute loads for `geometry`
    ///
    /// The geometry must have been resolved with `strength`'s friction angle,
    /// and callers are expected to have rejected narrow wedges already.
    pub fn compute(
        ground: &GroundParameters,
        strength: Strength,
        options: &ModelOptions,
        geometry: &SpiralGeometry,
    ) -> Self {
        let gamma = ground.unit_weight();
        let h_f = ground.face_height();
        let tan_phi = strength.tan_phi;
        let b = geometry.width;
        let (r0, rd, la) = (geometry.r0, geometry.rd, geometry.la);

        let cover_regime = CoverRegime::select(ground, options.deep_cover_ratio, b);
        let surcharge = match cover_regime {
            CoverRegime::Deep => deep_surcharge(ground, strength, b),
            CoverRegime::Finite { overburden } => finite_surcharge(ground, strength, b, overburden),
        };

        let w1 = gamma * h_f * b / 2.0;
        let lw1 = la + b / 3.0;

        let w2 = gamma * ((rd * rd - r0 * r0) / (4.0 * tan_phi) - r0 * rd * geometry.theta_d.sin() / 2.0);
        let lw2 = options.centroid_method.curved_arm(geometry);

        let parts = [PointLoad::new(w1, lw1), PointLoad::new(w2, lw2)];
        let lw = resultant_arm(&parts).unwrap_or(la + b / 2.0);

        Self {
            w1,
            lw1,
            w2,
            lw2,
            self_weight: w1 + w2,
            lw,
            surcharge,
            cover_regime,
            cohesive_moment: cohesive_moment(strength, geometry),
        }
    }

    /// Self-weight as a point load at lw
    pub fn self_weight_load(&self) -> PointLoad {
        PointLoad::new(self.self_weight, self.lw)
    }
}

/// q = αB(γ − 2c/(αB)) / (2K·tanφ)
pub fn deep_surcharge(ground: &GroundParameters, strength: Strength, width: f64) -> f64 {
    let alpha_b = ground.influence_width() * width;
    alpha_b * (ground.unit_weight() - 2.0 * strength.cohesion / alpha_b)
        / (2.0 * ground.empirical_coefficient() * strength.tan_phi)
}

/// Deep surcharge scaled by 1 − exp(−2KH·tanφ/(αB))
pub fn finite_surcharge(
    ground: &GroundParameters,
    strength: Strength,
    width: f64,
    overburden: f64,
) -> f64 {
    let alpha_b = ground.influence_width() * width;
    let arching = 1.0
        - (-2.0 * ground.empirical_coefficient() * overburden * strength.tan_phi / alpha_b).exp();
    deep_surcharge(ground, strength, width) * arching
}

/// Mc = c·(rd² − r0²) / (2·tanφ)
pub fn cohesive_moment(strength: Strength, geometry: &SpiralGeometry) -> f64 {
    strength.cohesion * (geometry.rd.powi(2) - geometry.r0.powi(2)) / (2.0 * strength.tan_phi)
}

/// Arm of the curved sub-region through an equivalent circular segment
///
/// The chord O from surface end to toe, its angle P, the distance S from the
/// pole to the chord midpoint, the angle correction T, the segment height U
/// and the segment sweep V are chained in closed form.
pub fn closed_form_curved_arm(geometry: &SpiralGeometry) -> f64 {
    let phi = geometry.friction_angle;
    let r0 = geometry.r0;
    let chord = geometry.chord();

    let o = chord.norm();
    let p = (-chord.y).atan2(-chord.x);

    let s = (o * o / 4.0 + r0 * r0 - o * r0 * (p + phi).cos()).sqrt();
    let r = r0 * (p + phi).sin();

    let cos_arg = if s > 0.0 { (r / s).clamp(-1.0, 1.0) } else { 1.0 };
    let t = cos_arg.acos() - (p + phi - PI / 2.0);

    let u = (r0 * (t * phi.tan()).exp() - s) * r / if s != 0.0 { s } else { 1.0 };
    let v = if u.abs() > 1e-12 {
        PI - 2.0 * (o / (2.0 * u)).atan()
    } else {
        PI
    };

    let (sin_v, cos_v) = v.sin_cos();
    let segment = u / (1.0 - cos_v) * ((1.0 - cos_v * cos_v) / (v - sin_v * cos_v)) * sin_v
        - u * cos_v / (1.0 - cos_v);
    let projection = (geometry.width / geometry.face_height).atan().cos();

    s * (phi + t).cos() + 2.0 / 3.0 * segment * projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::murayama::geometry::DEFAULT_CLOSURE_TOLERANCE;
    use approx::assert_relative_eq;

    fn ground() -> GroundParameters {
        GroundParameters::new(10.0, 20.0, 30.0, 20.0)
            .unwrap()
            .with_overburden(50.0)
            .unwrap()
            .forcing_finite_cover(true)
    }

    fn geometry_at(theta_deg: f64) -> SpiralGeometry {
        SpiralGeometry::resolve(
            10.0,
            30f64.to_radians(),
            theta_deg.to_radians(),
            DEFAULT_CLOSURE_TOLERANCE,
        )
        .unwrap()
    }

    #[test]
    fn test_reference_loads() {
        let ground = ground();
        let loads = LoadComponents::compute(
            &ground,
            ground.strength(),
            &ModelOptions::default(),
            &geometry_at(60.0),
        );

        assert_relative_eq!(loads.w1, 650.8926968399547, epsilon = 1e-6);
        assert_relative_eq!(loads.lw1, 2.16964232279985, epsilon = 1e-9);
        assert_relative_eq!(loads.w2, 254.52298574301267, epsilon = 1e-6);
        assert_relative_eq!(loads.lw2, 6.876457485791017, epsilon = 1e-6);
        assert_relative_eq!(loads.surcharge, 167.06849770684155, epsilon = 1e-6);
        assert_relative_eq!(loads.cohesive_moment, 2300.0332995990752, epsilon = 1e-6);
        assert_eq!(loads.cover_regime, CoverRegime::Finite { overburden: 50.0 });
    }

    #[test]
    fn test_simplified_centroid() {
        let ground = ground();
        let geometry = geometry_at(60.0);
        let options = ModelOptions {
            centroid_method: CentroidMethod::Simplified,
            ..ModelOptions::default()
        };
        let loads = LoadComponents::compute(&ground, ground.strength(), &options, &geometry);

        assert_relative_eq!(
            loads.lw2,
            geometry.la + geometry.width / 3f64.sqrt(),
            epsilon = 1e-12
        );
        // Weights do not depend on the centroid method
        assert_relative_eq!(loads.w2, 254.52298574301267, epsilon = 1e-6);
    }

    #[test]
    fn test_composite_arm_between_parts() {
        let ground = ground();
        for theta in [25.0, 40.0, 55.0, 70.0] {
            let loads = LoadComponents::compute(
                &ground,
                ground.strength(),
                &ModelOptions::default(),
                &geometry_at(theta),
            );
            let (lo, hi) = if loads.lw1 < loads.lw2 {
                (loads.lw1, loads.lw2)
            } else {
                (loads.lw2, loads.lw1)
            };
            assert!(loads.lw >= lo - 1e-9 && loads.lw <= hi + 1e-9);
            assert_relative_eq!(loads.self_weight, loads.w1 + loads.w2);
        }
    }

    #[test]
    fn test_regime_selection() {
        let deep = GroundParameters::new(10.0, 20.0, 30.0, 20.0).unwrap();
        assert_eq!(CoverRegime::select(&deep, 1.5, 6.5), CoverRegime::Deep);

        // Forced without overburden stays deep
        let forced = deep.forcing_finite_cover(true);
        assert_eq!(CoverRegime::select(&forced, 1.5, 6.5), CoverRegime::Deep);

        let shallow = deep.with_overburden(9.0).unwrap();
        assert_eq!(
            CoverRegime::select(&shallow, 1.5, 6.5),
            CoverRegime::Finite { overburden: 9.0 }
        );
        assert_eq!(CoverRegime::select(&shallow, 1.0, 6.5), CoverRegime::Deep);
    }

    #[test]
    fn test_finite_surcharge_converges_to_deep() {
        let ground = GroundParameters::new(10.0, 20.0, 30.0, 20.0).unwrap();
        let width = 6.5;
        let deep = deep_surcharge(&ground, ground.strength(), width);
        let finite = finite_surcharge(&ground, ground.strength(), width, 10_000.0 * width);

        assert_relative_eq!(finite, deep, max_relative = 1e-9);

        let shallow = finite_surcharge(&ground, ground.strength(), width, 5.0);
        assert!(shallow < deep);
    }
}
