//! Critical search angle sweep
//!
//! The critical θ_d is the one demanding the largest support pressure. Angles
//! whose closure degenerates or whose wedge is too narrow are skipped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::murayama::pressure::{PressureEvaluation, PressureResult, PressureSolver};
use crate::murayama::safety::{
    FaceStability, SafetyFactorError, SafetyFactorResult, SafetyFactorSettings,
    SafetyFactorSolver, stability_index,
};
use crate::types::*;

/// Slack when deciding whether the last step lands on `max_deg`
const STEP_EPSILON: f64 = 1e-9;

/// Largest number of angles a sweep may sample
pub const MAX_SEARCH_SAMPLES: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("No valid search angle between {from} and {to}")]
    NoValidSolution { from: DisplayAngle, to: DisplayAngle },

    #[error("Invalid search range: {0}")]
    InvalidRange(String),

    #[error(transparent)]
    SafetyFactor(#[from] SafetyFactorError),
}

/// Inclusive sweep of search angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRange {
    pub min_deg: f64,
    pub max_deg: f64,
    pub step_deg: f64,
}

impl Default for SearchRange {
    fn default() -> Self {
        Self {
            min_deg: 20.0,
            max_deg: 80.0,
            step_deg: 1.0,
        }
    }
}

impl SearchRange {
    pub fn new(min_deg: f64, max_deg: f64, step_deg: f64) -> Result<Self, SearchError> {
        let range = Self {
            min_deg,
            max_deg,
            step_deg,
        };
        range.validate()?;
        Ok(range)
    }

    /// `points` evenly spaced angles from `min_deg` to `max_deg`
    pub fn from_point_count(min_deg: f64, max_deg: f64, points: usize) -> Result<Self, SearchError> {
        if points < 2 {
            return Err(SearchError::InvalidRange(format!(
                "at least 2 points required, got {}",
                points
            )));
        }
        Self::new(min_deg, max_deg, (max_deg - min_deg) / (points - 1) as f64)
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if ![self.min_deg, self.max_deg, self.step_deg].iter().all(|v| v.is_finite()) {
            return Err(SearchError::InvalidRange("bounds and step must be finite".into()));
        }
        if self.min_deg <= 0.0 || self.max_deg > 90.0 {
            return Err(SearchError::InvalidRange(format!(
                "angles must lie in (0°, 90°], got {}° to {}°",
                self.min_deg, self.max_deg
            )));
        }
        if self.min_deg >= self.max_deg {
            return Err(SearchError::InvalidRange(format!(
                "minimum {}° must be below maximum {}°",
                self.min_deg, self.max_deg
            )));
        }
        if self.step_deg <= 0.0 {
            return Err(SearchError::InvalidRange(format!(
                "step must be positive, got {}°",
                self.step_deg
            )));
        }
        let samples = self.sample_count();
        if samples > MAX_SEARCH_SAMPLES {
            return Err(SearchError::InvalidRange(format!(
                "step {}° gives {} samples, limit is {}",
                self.step_deg, samples, MAX_SEARCH_SAMPLES
            )));
        }
        Ok(())
    }

    /// Number of angles `angles` yields for a valid range
    pub fn sample_count(&self) -> usize {
        let steps = ((self.max_deg - self.min_deg) / self.step_deg + STEP_EPSILON).floor() as usize;
        steps.saturating_add(1)
    }

    /// Sampled angles in radians, both ends included
    ///
    /// Empty when the range does not validate.
    pub fn angles(&self) -> Vec<f64> {
        if self.validate().is_err() {
            return Vec::new();
        }
        (0..self.sample_count())
            .map(|i| (self.min_deg + self.step_deg * i as f64).to_radians())
            .collect()
    }
}

/// One valid point of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleSample {
    /// θ_d (radians)
    pub theta_d: f64,
    /// P (kPa)
    pub support_pressure: f64,
    /// B (m)
    pub width: f64,
    /// r0 (m)
    pub r0: f64,
}

impl From<&PressureResult> for AngleSample {
    fn from(result: &PressureResult) -> Self {
        Self {
            theta_d: result.theta_d,
            support_pressure: result.support_pressure,
            width: result.geometry.width,
            r0: result.geometry.r0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalResult {
    pub critical: PressureResult,
    pub safety: SafetyFactorResult,
    pub stability: FaceStability,
    /// Valid sweep points in angle order
    pub samples: Vec<AngleSample>,
    /// Angles rejected for degenerate closure or narrow wedge
    pub skipped: usize,
}

impl CriticalResult {
    pub fn theta_d(&self) -> f64 {
        self.critical.theta_d
    }

    pub fn theta_d_deg(&self) -> f64 {
        self.critical.theta_d.to_degrees()
    }

    /// Maximum required support pressure (kPa)
    pub fn max_pressure(&self) -> f64 {
        self.critical.support_pressure
    }

    pub fn safety_factor(&self) -> f64 {
        self.safety.safety_factor
    }

    pub fn stability_index(&self) -> f64 {
        stability_index(self.safety.safety_factor)
    }
}

/// Sweeps θ_d and rates the face at the critical angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalSearch {
    solver: PressureSolver,
    range: SearchRange,
    safety_settings: SafetyFactorSettings,
}

impl CriticalSearch {
    pub fn new(solver: PressureSolver, range: SearchRange) -> Self {
        Self {
            solver,
            range,
            safety_settings: SafetyFactorSettings::default(),
        }
    }

    pub fn with_safety_settings(mut self, settings: SafetyFactorSettings) -> Self {
        self.safety_settings = settings;
        self
    }

    pub fn range(&self) -> &SearchRange {
        &self.range
    }

    pub fn find_critical(&self) -> Result<CriticalResult, SearchError> {
        self.range.validate()?;

        let mut critical: Option<PressureResult> = None;
        let mut samples = Vec::new();
        let mut skipped = 0;

        for theta_d in self.range.angles() {
            let result = match self.solver.solve(theta_d) {
                Ok(PressureEvaluation::Valid(result)) => result,
                Ok(PressureEvaluation::InvalidWedge { width, .. }) => {
                    debug!(theta_d_deg = theta_d.to_degrees(), width, "wedge too narrow, skipped");
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    debug!(theta_d_deg = theta_d.to_degrees(), error = %e, "angle skipped");
                    skipped += 1;
                    continue;
                }
            };

            samples.push(AngleSample::from(&result));
            // Ties keep the smaller angle
            if critical
                .as_ref()
                .is_none_or(|best| result.support_pressure > best.support_pressure)
            {
                critical = Some(result);
            }
        }

        let critical = critical.ok_or(SearchError::NoValidSolution {
            from: DisplayAngle(from_degrees(self.range.min_deg)),
            to: DisplayAngle(from_degrees(self.range.max_deg)),
        })?;

        let safety =
            SafetyFactorSolver::new(self.solver, self.safety_settings).compute(critical.theta_d)?;
        let stability = safety.stability();

        Ok(CriticalResult {
            critical,
            safety,
            stability,
            samples,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::GroundParameters;
    use crate::murayama::ModelOptions;
    use approx::assert_relative_eq;

    fn scenario_a() -> PressureSolver {
        let ground = GroundParameters::new(10.0, 20.0, 30.0, 20.0)
            .unwrap()
            .with_overburden(30.0)
            .unwrap()
            .forcing_finite_cover(true);
        PressureSolver::new(ground, ModelOptions::default())
    }

    #[test]
    fn test_default_range_inclusive() {
        let angles = SearchRange::default().angles();
        assert_eq!(angles.len(), 61);
        assert_relative_eq!(angles[0], 20f64.to_radians());
        assert_relative_eq!(angles[60], 80f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_point_count_range() {
        let range = SearchRange::from_point_count(30.0, 70.0, 5).unwrap();
        assert_relative_eq!(range.step_deg, 10.0);
        assert_eq!(range.angles().len(), 5);

        assert!(SearchRange::from_point_count(30.0, 70.0, 1).is_err());
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            SearchRange::new(50.0, 40.0, 1.0),
            Err(SearchError::InvalidRange(_))
        ));
        assert!(matches!(
            SearchRange::new(20.0, 80.0, 0.0),
            Err(SearchError::InvalidRange(_))
        ));
        assert!(matches!(
            SearchRange::new(0.0, 80.0, 1.0),
            Err(SearchError::InvalidRange(_))
        ));
        assert!(matches!(
            SearchRange::new(20.0, 95.0, 1.0),
            Err(SearchError::InvalidRange(_))
        ));
        assert!(matches!(
            SearchRange::new(f64::NAN, 80.0, 1.0),
            Err(SearchError::InvalidRange(_))
        ));
        assert!(SearchRange::new(20.0, 90.0, 1.0).is_ok());
    }

    #[test]
    fn test_excessive_sample_count_rejected() {
        assert!(matches!(
            SearchRange::new(20.0, 80.0, 1e-12),
            Err(SearchError::InvalidRange(_))
        ));
        assert!(SearchRange::from_point_count(20.0, 80.0, MAX_SEARCH_SAMPLES + 1_000).is_err());
        assert!(SearchRange::from_point_count(20.0, 80.0, 1_000).is_ok());

        let unchecked = SearchRange {
            min_deg: 20.0,
            max_deg: 80.0,
            step_deg: 1e-12,
        };
        assert!(unchecked.angles().is_empty());
    }

    #[test]
    fn test_scenario_a_critical_angle() {
        let result = CriticalSearch::new(scenario_a(), SearchRange::default())
            .find_critical()
            .unwrap();

        assert_relative_eq!(result.theta_d_deg(), 54.0, epsilon = 1e-9);
        assert_relative_eq!(result.max_pressure(), 511.1513518466389, epsilon = 1e-6);
        assert!(result.safety_factor() < 1.0);
        assert_eq!(result.stability, FaceStability::Unstable);
        assert_eq!(result.samples.len() + result.skipped, 61);

        let peak = result
            .samples
            .iter()
            .map(|s| s.support_pressure)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(peak, result.max_pressure());
    }

    #[test]
    fn test_no_valid_solution() {
        let ground = GroundParameters::new(0.05, 20.0, 30.0, 20.0).unwrap();
        let search = CriticalSearch::new(
            PressureSolver::new(ground, ModelOptions::default()),
            SearchRange::default(),
        );

        assert!(matches!(
            search.find_critical(),
            Err(SearchError::NoValidSolution { .. })
        ));
    }

    #[test]
    fn test_invalid_range_rejected_before_sweep() {
        let range = SearchRange {
            min_deg: 60.0,
            max_deg: 30.0,
            step_deg: 1.0,
        };
        let search = CriticalSearch::new(scenario_a(), range);
        assert!(matches!(search.find_critical(), Err(SearchError::InvalidRange(_))));
    }
}
