//! Strength-reduction safety factor
//!
//! Cohesion and tanφ are both divided by a factor F and the support pressure
//! is re-evaluated at a fixed search angle. The safety factor is the F* at
//! which the required pressure crosses zero:
//! - F* > 1: the ground can be weakened by F* before the face fails
//! - F* < 1: the ground must be strengthened by 1/F* to stand unsupported
//!
//! Reduced strength is passed by value into every evaluation, so the ground
//! parameters are never modified.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

use crate::ground::Strength;
use crate::murayama::pressure::{PressureEvaluation, PressureSolver};
use crate::types::*;

/// Safety factor at or above which the face is rated stable
pub const STABLE_SAFETY_FACTOR: f64 = 1.5;

/// Safety factor at or above which the face needs attention only
pub const CAUTION_SAFETY_FACTOR: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SafetyFactorError {
    #[error("Support pressure cannot be evaluated at θ_d = {0} for the unreduced ground")]
    UnevaluableAngle(DisplayAngle),
}

/// Bracketing and bisection controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyFactorSettings {
    /// Factor limits before expansion
    pub initial_bracket: (f64, f64),
    /// Doublings/halvings allowed beyond the initial limits
    pub max_expansions: u32,
    /// Stop bisecting once the bracket is narrower than this
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Evenly spaced points in the visualisation trace
    pub dense_samples: usize,
}

impl Default for SafetyFactorSettings {
    fn default() -> Self {
        Self {
            initial_bracket: (0.1, 10.0),
            max_expansions: 8,
            tolerance: 1e-3,
            max_iterations: 30,
            dense_samples: 20,
        }
    }
}

impl SafetyFactorSettings {
    /// Smallest and largest factor the bracket walk may reach
    pub fn factor_limits(&self) -> (f64, f64) {
        let scale = 2f64.powi(self.max_expansions as i32);
        (self.initial_bracket.0 / scale, self.initial_bracket.1 * scale)
    }
}

/// One strength-reduction evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReductionPoint {
    /// F
    pub factor: f64,
    /// c' (kPa)
    pub cohesion: f64,
    /// φ' (degrees)
    pub friction_angle_deg: f64,
    /// P (kPa)
    pub support_pressure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SafetyFactorOutcome {
    /// Zero crossing bracketed and bisected below the tolerance
    Converged { iterations: usize, bracket: (f64, f64) },
    /// Bisection stopped on an invalid midpoint or the iteration limit;
    /// F* is interpolated across a bracket wider than the tolerance
    Truncated { iterations: usize, bracket: (f64, f64) },
    /// P stays ≤ 0 however far the ground is weakened (F* = ∞)
    UnconditionallyStable,
    /// P stays > 0 however far the ground is strengthened (F* = 0)
    CannotStabilize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyFactorResult {
    /// θ_d the factor was computed at (radians)
    pub theta_d: f64,
    /// F*
    pub safety_factor: f64,
    /// P at F = 1 (kPa)
    pub original_pressure: f64,
    pub outcome: SafetyFactorOutcome,
    /// Every evaluation made while bracketing and bisecting, in order
    pub trace: Vec<ReductionPoint>,
    /// Evenly sampled curve around F* for plotting; does not affect F*
    pub dense_trace: Vec<ReductionPoint>,
}

impl SafetyFactorOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, SafetyFactorOutcome::Converged { .. })
    }
}

impl SafetyFactorResult {
    pub fn stability(&self) -> FaceStability {
        FaceStability::from_safety_factor(self.safety_factor)
    }

    /// Strength multiplier needed to bring P to zero (1/F*)
    pub fn required_strength_increase(&self) -> f64 {
        1.0 / self.safety_factor
    }
}

/// Qualitative rating from the safety factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceStability {
    Stable,
    Caution,
    Unstable,
}

impl FaceStability {
    pub fn from_safety_factor(safety_factor: f64) -> Self {
        if safety_factor >= STABLE_SAFETY_FACTOR {
            FaceStability::Stable
        } else if safety_factor >= CAUTION_SAFETY_FACTOR {
            FaceStability::Caution
        } else {
            FaceStability::Unstable
        }
    }
}

impl fmt::Display for FaceStability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FaceStability::Stable => "Stable",
            FaceStability::Caution => "Caution",
            FaceStability::Unstable => "Unstable",
        };
        write!(f, "{}", label)
    }
}

/// 0-100 rating, 50 per unit of safety factor
pub fn stability_index(safety_factor: f64) -> f64 {
    if safety_factor.is_infinite() {
        100.0
    } else {
        (safety_factor * 50.0).min(100.0)
    }
}

/// Bracket-then-bisect search for F*
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyFactorSolver {
    solver: PressureSolver,
    settings: SafetyFactorSettings,
}

impl SafetyFactorSolver {
    pub fn new(solver: PressureSolver, settings: SafetyFactorSettings) -> Self {
        Self { solver, settings }
    }

    pub fn settings(&self) -> &SafetyFactorSettings {
        &self.settings
    }

    /// Support pressure with strength divided by `factor`
    ///
    /// `None` when the reduced ground gives no valid wedge at `theta_d`.
    pub fn evaluate(&self, theta_d: f64, factor: f64) -> Option<ReductionPoint> {
        let strength: Strength = self.solver.ground().strength().reduced(factor);

        match self.solver.solve_with_strength(strength, theta_d) {
            Ok(PressureEvaluation::Valid(result)) => Some(ReductionPoint {
                factor,
                cohesion: strength.cohesion,
                friction_angle_deg: strength.friction_angle_deg(),
                support_pressure: result.support_pressure,
            }),
            Ok(PressureEvaluation::InvalidWedge { width, .. }) => {
                debug!(factor, width, "reduced strength gives no valid wedge");
                None
            }
            Err(e) => {
                debug!(factor, error = %e, "reduced strength geometry failed");
                None
            }
        }
    }

    /// Compute F* at a fixed search angle
    pub fn compute(&self, theta_d: f64) -> Result<SafetyFactorResult, SafetyFactorError> {
        let mut trace = Vec::new();

        let original = self
            .evaluate(theta_d, 1.0)
            .ok_or(SafetyFactorError::UnevaluableAngle(DisplayAngle(from_radians(theta_d))))?;
        trace.push(original);

        let (safety_factor, outcome) = match self.bracket(theta_d, original, &mut trace) {
            Bracket::Found { lower, upper } => self.bisect(theta_d, lower, upper, &mut trace),
            Bracket::Exact(factor) => (
                factor,
                SafetyFactorOutcome::Converged {
                    iterations: 0,
                    bracket: (factor, factor),
                },
            ),
            Bracket::Unbounded(outcome) => {
                let value = match outcome {
                    SafetyFactorOutcome::CannotStabilize => 0.0,
                    _ => f64::INFINITY,
                };
                warn!(
                    theta_d_deg = theta_d.to_degrees(),
                    ?outcome,
                    "no zero crossing within the factor limits"
                );
                (value, outcome)
            }
        };

        let dense_trace = self.dense_trace(theta_d, safety_factor);

        Ok(SafetyFactorResult {
            theta_d,
            safety_factor,
            original_pressure: original.support_pressure,
            outcome,
            trace,
            dense_trace,
        })
    }

    /// Walk outward from F = 1 until P changes sign
    ///
    /// Starting at the unreduced ground finds the crossing nearest to it; the
    /// pressure is not monotone in F far from there.
    fn bracket(
        &self,
        theta_d: f64,
        original: ReductionPoint,
        trace: &mut Vec<ReductionPoint>,
    ) -> Bracket {
        let (lowest, highest) = self.settings.factor_limits();

        if original.support_pressure == 0.0 {
            return Bracket::Exact(1.0);
        }

        if original.support_pressure > 0.0 {
            // Unsafe as is: strengthen (F < 1) until P ≤ 0
            let mut upper = original;
            let mut factor = 1.0;
            loop {
                factor /= 2.0;
                if factor < lowest {
                    return Bracket::Unbounded(SafetyFactorOutcome::CannotStabilize);
                }
                let Some(point) = self.evaluate(theta_d, factor) else {
                    return Bracket::Unbounded(SafetyFactorOutcome::CannotStabilize);
                };
                trace.push(point);
                if point.support_pressure <= 0.0 {
                    return Bracket::Found { lower: point, upper };
                }
                upper = point;
            }
        }

        // Self-supporting as is: weaken (F > 1) until P > 0
        let mut lower = original;
        let mut factor = 1.0;
        loop {
            factor *= 2.0;
            if factor > highest {
                return Bracket::Unbounded(SafetyFactorOutcome::UnconditionallyStable);
            }
            let Some(point) = self.evaluate(theta_d, factor) else {
                return Bracket::Unbounded(SafetyFactorOutcome::UnconditionallyStable);
            };
            trace.push(point);
            if point.support_pressure > 0.0 {
                return Bracket::Found { lower, upper: point };
            }
            lower = point;
        }
    }

    /// Bisect with P(lower) ≤ 0 < P(upper), then interpolate the crossing
    fn bisect(
        &self,
        theta_d: f64,
        mut lower: ReductionPoint,
        mut upper: ReductionPoint,
        trace: &mut Vec<ReductionPoint>,
    ) -> (f64, SafetyFactorOutcome) {
        let mut iterations = 0;

        while (upper.factor - lower.factor).abs() >= self.settings.tolerance
            && iterations < self.settings.max_iterations
        {
            let mid = 0.5 * (lower.factor + upper.factor);
            iterations += 1;

            let Some(point) = self.evaluate(theta_d, mid) else {
                debug!(factor = mid, "bisection midpoint has no valid wedge");
                break;
            };
            trace.push(point);
            trace!(
                iteration = iterations,
                factor = mid,
                pressure = point.support_pressure,
                "bisection step"
            );

            if point.support_pressure > 0.0 {
                upper = point;
            } else {
                lower = point;
            }
        }

        let span = upper.support_pressure - lower.support_pressure;
        let safety_factor = if span > 0.0 {
            lower.factor + (upper.factor - lower.factor) * (-lower.support_pressure) / span
        } else {
            0.5 * (lower.factor + upper.factor)
        };

        let bracket = (lower.factor, upper.factor);
        let outcome = if bracket.1 - bracket.0 < self.settings.tolerance {
            SafetyFactorOutcome::Converged { iterations, bracket }
        } else {
            warn!(
                theta_d_deg = theta_d.to_degrees(),
                lower = bracket.0,
                upper = bracket.1,
                "bisection stopped before reaching the tolerance"
            );
            SafetyFactorOutcome::Truncated { iterations, bracket }
        };

        (safety_factor, outcome)
    }

    /// Evenly spaced factors around F*, plus F = 1 and F = F*
    fn dense_trace(&self, theta_d: f64, safety_factor: f64) -> Vec<ReductionPoint> {
        let (start, end) = if safety_factor.is_infinite() {
            (0.5, 4.0)
        } else if safety_factor <= 0.0 {
            (self.settings.initial_bracket.0, 1.5)
        } else {
            (0.5 * safety_factor.min(1.0), 1.5 * safety_factor.max(1.0))
        };

        let n = self.settings.dense_samples.max(2);
        let mut factors: Vec<f64> = (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect();
        factors.push(1.0);
        if safety_factor.is_finite() && safety_factor > 0.0 {
            factors.push(safety_factor);
        }
        factors.sort_by(|a, b| a.total_cmp(b));
        factors.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        factors
            .into_iter()
            .filter_map(|factor| self.evaluate(theta_d, factor))
            .collect()
    }
}

enum Bracket {
    Found {
        lower: ReductionPoint,
        upper: ReductionPoint,
    },
    Exact(f64),
    Unbounded(SafetyFactorOutcome),
}
