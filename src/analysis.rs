//! End-to-end face analysis: sweep, critical angle, safety factor, report

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

use crate::config::{AnalysisConfig, ConfigFileError};
use crate::ground::{ConfigurationError, GroundParameters, GroundParametersInput};
use crate::murayama::{
    CriticalResult, CriticalSearch, CoverRegime, ModelOptions, PressureSolver, SafetyFactorOutcome,
    SearchError, SearchRange,
};
use crate::types::*;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] ConfigFileError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceStabilityAnalysis {
    config: AnalysisConfig,
}

impl FaceStabilityAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Validate raw ground values and analyse with default settings
    pub fn from_input(input: GroundParametersInput) -> Result<Self, AnalysisError> {
        Ok(Self::new(AnalysisConfig::new(GroundParameters::try_from(input)?)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        Ok(Self::new(AnalysisConfig::from_file(path)?))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self) -> Result<FaceStabilityReport, AnalysisError> {
        self.config.validate()?;

        let solver = PressureSolver::new(self.config.ground, self.config.model);
        let result = CriticalSearch::new(solver, self.config.search)
            .with_safety_settings(self.config.safety)
            .find_critical()?;

        Ok(FaceStabilityReport {
            ground: self.config.ground,
            model: self.config.model,
            search: self.config.search,
            result,
        })
    }
}

/// Inputs and outcome of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceStabilityReport {
    pub ground: GroundParameters,
    pub model: ModelOptions,
    pub search: SearchRange,
    pub result: CriticalResult,
}

impl FaceStabilityReport {
    /// Non-finite safety factors serialise as `null`
    pub fn to_json_pretty(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable multi-line summary
    pub fn summary(&self) -> String {
        let ground = &self.ground;
        let result = &self.result;
        let critical = &result.critical;
        let geometry = &critical.geometry;
        let loads = &critical.loads;
        let safety = &result.safety;

        let mut out = String::new();
        let _ = writeln!(out, "Tunnel face stability (Murayama)");
        let _ = writeln!(
            out,
            "  Ground: γ = {:.1} kN/m³, φ = {}, c = {}",
            ground.unit_weight(),
            DisplayAngle(from_degrees(ground.friction_angle_deg())),
            DisplayPressure(from_kpa(ground.cohesion())),
        );
        let _ = writeln!(
            out,
            "  Face height: {}",
            DisplayLength(from_coord(ground.face_height()))
        );
        let cover = match loads.cover_regime {
            CoverRegime::Deep => "deep".to_string(),
            CoverRegime::Finite { overburden } => {
                format!("finite, H = {}", DisplayLength(from_coord(overburden)))
            }
        };
        let _ = writeln!(out, "  Cover: {}", cover);
        let _ = writeln!(
            out,
            "  Sweep: {:.1}° to {:.1}° ({} valid, {} skipped)",
            self.search.min_deg,
            self.search.max_deg,
            result.samples.len(),
            result.skipped
        );
        let _ = writeln!(
            out,
            "  Critical angle: {}",
            DisplayAngle(from_radians(critical.theta_d))
        );
        let _ = writeln!(
            out,
            "  Wedge: B = {}, r0 = {:.3} m, rd = {:.3} m",
            DisplayLength(geometry.wedge_width()),
            geometry.r0,
            geometry.rd
        );
        let _ = writeln!(
            out,
            "  Required support pressure: {}",
            DisplayPressure(critical.support_pressure())
        );

        let factor = match safety.outcome {
            SafetyFactorOutcome::UnconditionallyStable => "∞ (unconditionally stable)".to_string(),
            SafetyFactorOutcome::CannotStabilize => "0 (cannot be stabilised)".to_string(),
            SafetyFactorOutcome::Converged { .. } => format!("{:.3}", safety.safety_factor),
            SafetyFactorOutcome::Truncated { bracket, .. } => format!(
                "{:.3} (bisection stopped in [{:.4}, {:.4}])",
                safety.safety_factor, bracket.0, bracket.1
            ),
        };
        let _ = writeln!(out, "  Safety factor: {}", factor);
        let _ = write!(
            out,
            "  Rating: {} (index {:.0})",
            result.stability,
            result.stability_index()
        );

        out
    }
}
