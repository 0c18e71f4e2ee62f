//! Murayama limit-equilibrium analysis of a tunnel face
//!
//! Stages, each a pure function of (ground, options, θ_d):
//! geometry closure → equivalent loads → support pressure → critical-angle
//! sweep → strength-reduction safety factor.

pub mod geometry;
pub mod loads;
pub mod pressure;
pub mod safety;
pub mod search;

pub use geometry::*;
pub use loads::*;
pub use pressure::*;
pub use safety::*;
pub use search::*;

use serde::{Deserialize, Serialize};

/// Default H/B ratio at or below which the finite-cover surcharge applies
pub const DEFAULT_DEEP_COVER_RATIO: f64 = 1.5;

/// Wedges no wider than this (m) are rejected
pub const DEFAULT_MIN_WEDGE_WIDTH: f64 = 0.1;

/// Model switches shared by every evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    pub centroid_method: CentroidMethod,
    /// Finite-cover surcharge when H ≤ ratio·B
    pub deep_cover_ratio: f64,
    /// Minimum wedge width B (m)
    pub min_wedge_width: f64,
    /// Smallest accepted |closure denominator|
    pub closure_tolerance: f64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            centroid_method: CentroidMethod::ClosedForm,
            deep_cover_ratio: DEFAULT_DEEP_COVER_RATIO,
            min_wedge_width: DEFAULT_MIN_WEDGE_WIDTH,
            closure_tolerance: DEFAULT_CLOSURE_TOLERANCE,
        }
    }
}
