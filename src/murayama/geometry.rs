//! Geometric closure of the logarithmic-spiral failure surface
//!
//! # Coordinate system
//!
//! Planar section through the tunnel axis, per metre run:
//! - **Origin** at the spiral pole
//! - **X-axis**: toward the face (+)
//! - **Y-axis**: Down(-) / Up(+)
//!
//! The spiral starts at the ground-surface end of the wedge (radius r0,
//! direction φ below horizontal) and sweeps θ_d to the face toe (radius rd).
//! The face is the vertical segment x = la between crown and toe.

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Closure denominators smaller than this are rejected
pub const DEFAULT_CLOSURE_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Degenerate closure at θ_d = {angle}: denominator {denominator:e}")]
    DegenerateClosure { angle: DisplayAngle, denominator: f64 },

    #[error("Spiral geometry at θ_d = {0} is not finite")]
    NonFinite(DisplayAngle),

    #[error("Non-positive initial radius at θ_d = {angle}: r0 = {r0}")]
    NonPositiveRadius { angle: DisplayAngle, r0: f64 },
}

/// Closed spiral geometry for one search angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralGeometry {
    /// θ_d (radians)
    pub theta_d: f64,
    /// φ the spiral was resolved for (radians)
    pub friction_angle: f64,
    /// H_f (m)
    pub face_height: f64,
    /// Initial radius r0 (m)
    pub r0: f64,
    /// Terminal radius rd (m)
    pub rd: f64,
    /// Horizontal offset of the face from the pole (m)
    pub la: f64,
    /// Horizontal projection width of the wedge (m)
    pub width: f64,
    /// Lever arm of the support pressure resultant (m)
    pub lp: f64,
}

/// exp(θ_d·tanφ)·sin(φ+θ_d) − sinφ
#[inline]
pub fn closure_denominator(friction_angle: f64, theta_d: f64) -> f64 {
    (theta_d * friction_angle.tan()).exp() * (friction_angle + theta_d).sin() - friction_angle.sin()
}

impl SpiralGeometry {
    /// Close the spiral for a search angle
    ///
    /// # Arguments
    /// * `face_height` - H_f (m)
    /// * `friction_angle` - φ (radians)
    /// * `theta_d` - search angle (radians)
    /// * `tolerance` - smallest accepted |closure denominator|
    pub fn resolve(
        face_height: f64,
        friction_angle: f64,
        theta_d: f64,
        tolerance: f64,
    ) -> Result<Self, GeometryError> {
        let denominator = closure_denominator(friction_angle, theta_d);
        if !denominator.is_finite() || denominator.abs() < tolerance {
            return Err(GeometryError::DegenerateClosure {
                angle: DisplayAngle(from_radians(theta_d)),
                denominator,
            });
        }

        let r0 = face_height / denominator;
        let rd = r0 * (theta_d * friction_angle.tan()).exp();
        let la = rd * (friction_angle + theta_d).cos();
        let width = r0 * friction_angle.cos() - la;
        let lp = r0 * friction_angle.sin() + face_height / 2.0;

        if ![r0, rd, la, width, lp].iter().all(|v| v.is_finite()) {
            return Err(GeometryError::NonFinite(DisplayAngle(from_radians(theta_d))));
        }
        if r0 <= 0.0 {
            return Err(GeometryError::NonPositiveRadius {
                angle: DisplayAngle(from_radians(theta_d)),
                r0,
            });
        }

        Ok(Self {
            theta_d,
            friction_angle,
            face_height,
            r0,
            rd,
            la,
            width,
            lp,
        })
    }

    /// Point on the spiral `sweep` radians past the initial radius
    pub fn spiral_point(&self, sweep: f64) -> na::Point2<f64> {
        let r = self.r0 * (sweep * self.friction_angle.tan()).exp();
        let direction = self.friction_angle + sweep;
        na::Point2::new(r * direction.cos(), -r * direction.sin())
    }

    /// Spiral pole (origin)
    pub fn pole(&self) -> na::Point2<f64> {
        na::Point2::origin()
    }

    /// Where the spiral meets the top of the wedge (radius r0)
    pub fn surface_end(&self) -> na::Point2<f64> {
        self.spiral_point(0.0)
    }

    /// Face toe (radius rd)
    pub fn face_toe(&self) -> na::Point2<f64> {
        self.spiral_point(self.theta_d)
    }

    /// Top of the face, level with the surface end
    pub fn face_crown(&self) -> na::Point2<f64> {
        na::Point2::new(self.la, self.surface_end().y)
    }

    /// Chord from the surface end down to the face toe
    pub fn chord(&self) -> na::Vector2<f64> {
        self.face_toe() - self.surface_end()
    }

    /// Sampled failure surface from surface end to toe
    pub fn failure_surface(&self, samples: usize) -> Vec<na::Point2<f64>> {
        let segments = samples.max(2) - 1;
        (0..=segments)
            .map(|i| self.spiral_point(self.theta_d * i as f64 / segments as f64))
            .collect()
    }

    /// Wedge width as a UOM length
    pub fn wedge_width(&self) -> Length {
        from_coord(self.width)
    }

    pub fn search_angle(&self) -> SearchAngle {
        from_radians(self.theta_d)
    }
}

/// Recover θ_d from an initial radius (inverse closure)
///
/// The closure denominator increases strictly on (0, π/2), so the angle is
/// found by bisection. Returns `None` when `r0` is not attainable there.
pub fn search_angle_for_radius(face_height: f64, friction_angle: f64, r0: f64) -> Option<f64> {
    if r0 <= 0.0 || face_height <= 0.0 {
        return None;
    }

    let target = face_height / r0;
    let mut lo = 0.0_f64;
    let mut hi = std::f64::consts::FRAC_PI_2;

    if target > closure_denominator(friction_angle, hi) {
        return None;
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if closure_denominator(friction_angle, mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-15 {
            break;
        }
    }

    Some(0.5 * (lo + hi))
}
