use serde::{Deserialize, Serialize};

use crate::ground::{GroundParameters, Strength};
use crate::murayama::ModelOptions;
use crate::murayama::geometry::{GeometryError, SpiralGeometry};
use crate::murayama::loads::LoadComponents;
use crate::physics::statics::{PointLoad, balancing_force, sum_moments};
use crate::types::*;

/// Moments about the spiral pole (kN·m/m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentBalance {
    /// Wf·lw
    pub self_weight: f64,
    /// q·B·(la + B/2)
    pub surcharge: f64,
    /// Mc (resisting)
    pub cohesion: f64,
    /// Driving minus resisting
    pub net: f64,
}

/// Required support pressure for one search angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureResult {
    /// θ_d (radians)
    pub theta_d: f64,
    /// P (kPa); negative means the face stands unsupported
    pub support_pressure: f64,
    pub strength: Strength,
    pub geometry: SpiralGeometry,
    pub loads: LoadComponents,
    pub moments: MomentBalance,
}

impl PressureResult {
    pub fn support_pressure(&self) -> SupportPressure {
        from_kpa(self.support_pressure)
    }

    pub fn theta_d_deg(&self) -> f64 {
        self.theta_d.to_degrees()
    }
}

/// Outcome of one evaluation
///
/// A wedge too narrow to be meaningful is an expected outcome during sweeps,
/// so it is a variant rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PressureEvaluation {
    Valid(PressureResult),
    InvalidWedge { theta_d: f64, width: f64 },
}

impl PressureEvaluation {
    pub fn is_valid(&self) -> bool {
        matches!(self, PressureEvaluation::Valid(_))
    }

    pub fn valid(&self) -> Option<&PressureResult> {
        match self {
            PressureEvaluation::Valid(result) => Some(result),
            PressureEvaluation::InvalidWedge { .. } => None,
        }
    }

    pub fn into_valid(self) -> Option<PressureResult> {
        match self {
            PressureEvaluation::Valid(result) => Some(result),
            PressureEvaluation::InvalidWedge { .. } => None,
        }
    }

    /// P (kPa) when valid
    pub fn pressure(&self) -> Option<f64> {
        self.valid().map(|r| r.support_pressure)
    }

    pub fn theta_d(&self) -> f64 {
        match self {
            PressureEvaluation::Valid(result) => result.theta_d,
            PressureEvaluation::InvalidWedge { theta_d, .. } => *theta_d,
        }
    }
}

/// Support pressure from the moment balance about the spiral pole
///
/// P = (Wf·lw + q·B·(la + B/2) − Mc) / lp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureSolver {
    ground: GroundParameters,
    options: ModelOptions,
}

impl PressureSolver {
    pub fn new(ground: GroundParameters, options: ModelOptions) -> Self {
        Self { ground, options }
    }

    pub fn ground(&self) -> &GroundParameters {
        &self.ground
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Evaluate with the ground's own strength
    pub fn solve(&self, theta_d: f64) -> Result<PressureEvaluation, GeometryError> {
        self.solve_with_strength(self.ground.strength(), theta_d)
    }

    /// Evaluate with an explicit strength pair (strength reduction)
    pub fn solve_with_strength(
        &self,
        strength: Strength,
        theta_d: f64,
    ) -> Result<PressureEvaluation, GeometryError> {
        let geometry = SpiralGeometry::resolve(
            self.ground.face_height(),
            strength.friction_angle(),
            theta_d,
            self.options.closure_tolerance,
        )?;

        if geometry.width <= self.options.min_wedge_width {
            return Ok(PressureEvaluation::InvalidWedge {
                theta_d,
                width: geometry.width,
            });
        }

        let loads = LoadComponents::compute(&self.ground, strength, &self.options, &geometry);

        let surcharge_load = PointLoad::new(
            loads.surcharge * geometry.width,
            geometry.la + geometry.width / 2.0,
        );
        let driving = [loads.self_weight_load(), surcharge_load];
        let net = sum_moments(&driving) - loads.cohesive_moment;
        let support_pressure = balancing_force(net, geometry.lp);

        if !support_pressure.is_finite() {
            return Err(GeometryError::NonFinite(DisplayAngle(from_radians(theta_d))));
        }

        Ok(PressureEvaluation::Valid(PressureResult {
            theta_d,
            support_pressure,
            strength,
            geometry,
            loads,
            moments: MomentBalance {
                self_weight: driving[0].moment(),
                surcharge: driving[1].moment(),
                cohesion: loads.cohesive_moment,
                net,
            },
        }))
    }
}
