//! Planar statics for the sliding wedge (per metre run of tunnel)
//!
//! Loads are vertical and measured by their horizontal arm from the spiral
//! pole; moments are positive when they drive the wedge into the tunnel.

use serde::{Deserialize, Serialize};

/// Below this total force the resultant arm is undefined
pub const ZERO_FORCE_TOLERANCE: f64 = 1e-10;

/// A vertical load with its lever arm about the spiral pole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Force (kN/m)
    pub force: f64,
    /// Horizontal arm from the pole (m)
    pub arm: f64,
}

impl PointLoad {
    pub fn new(force: f64, arm: f64) -> Self {
        Self { force, arm }
    }

    /// Moment about the pole (kN·m/m)
    pub fn moment(&self) -> f64 {
        self.force * self.arm
    }
}

/// Sum all forces in a system
pub fn sum_forces(loads: &[PointLoad]) -> f64 {
    loads.iter().map(|l| l.force).sum()
}

/// Sum all moments about the pole
pub fn sum_moments(loads: &[PointLoad]) -> f64 {
    loads.iter().map(PointLoad::moment).sum()
}

/// Arm of the resultant of parallel loads (their centre of gravity)
///
/// Returns `None` when the loads cancel out.
pub fn resultant_arm(loads: &[PointLoad]) -> Option<f64> {
    let total = sum_forces(loads);

    if total.abs() <= ZERO_FORCE_TOLERANCE {
        return None;
    }

    Some(sum_moments(loads) / total)
}

/// Force needed at `arm` to balance a net moment
pub fn balancing_force(net_moment: f64, arm: f64) -> f64 {
    net_moment / arm
}
