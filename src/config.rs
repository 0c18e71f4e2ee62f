//! Analysis configuration files
//!
//! One TOML document carries the ground, the model switches, the sweep and
//! the safety-factor controls. Every table except `[ground]` may be omitted.
//!
//! ```toml
//! [ground]
//! face_height = 10.0
//! unit_weight = 20.0
//! friction_angle = 30.0
//! cohesion = 20.0
//! overburden = 30.0
//! force_finite_cover = true
//!
//! [search]
//! min_deg = 20.0
//! max_deg = 80.0
//! step_deg = 1.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::ground::GroundParameters;
use crate::murayama::{ModelOptions, SafetyFactorSettings, SearchError, SearchRange};

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error(transparent)]
    SearchRange(#[from] SearchError),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Complete input for one face analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub ground: GroundParameters,
    #[serde(default)]
    pub model: ModelOptions,
    #[serde(default)]
    pub search: SearchRange,
    #[serde(default)]
    pub safety: SafetyFactorSettings,
}

impl AnalysisConfig {
    /// Default model, sweep and safety settings for `ground`
    pub fn new(ground: GroundParameters) -> Self {
        Self {
            ground,
            model: ModelOptions::default(),
            search: SearchRange::default(),
            safety: SafetyFactorSettings::default(),
        }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigFileError> {
        let config: AnalysisConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigFileError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the settings the ground validation does not cover
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.search.validate()?;

        let model = &self.model;
        if !(model.deep_cover_ratio.is_finite() && model.deep_cover_ratio > 0.0) {
            return Err(ConfigFileError::InvalidSetting(format!(
                "deep_cover_ratio must be positive, got {}",
                model.deep_cover_ratio
            )));
        }
        if !(model.min_wedge_width.is_finite() && model.min_wedge_width >= 0.0) {
            return Err(ConfigFileError::InvalidSetting(format!(
                "min_wedge_width must be non-negative, got {}",
                model.min_wedge_width
            )));
        }
        if !(model.closure_tolerance.is_finite() && model.closure_tolerance > 0.0) {
            return Err(ConfigFileError::InvalidSetting(format!(
                "closure_tolerance must be positive, got {}",
                model.closure_tolerance
            )));
        }

        let safety = &self.safety;
        let (lo, hi) = safety.initial_bracket;
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < 1.0 && hi > 1.0) {
            return Err(ConfigFileError::InvalidSetting(format!(
                "initial_bracket must satisfy 0 < low < 1 < high, got ({}, {})",
                lo, hi
            )));
        }
        if !(safety.tolerance.is_finite() && safety.tolerance > 0.0) {
            return Err(ConfigFileError::InvalidSetting(format!(
                "tolerance must be positive, got {}",
                safety.tolerance
            )));
        }
        if safety.max_iterations == 0 {
            return Err(ConfigFileError::InvalidSetting(
                "max_iterations must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::murayama::CentroidMethod;
    use approx::assert_relative_eq;
    use std::io::Write;

    const SCENARIO_A: &str = r#"
[ground]
face_height = 10.0
unit_weight = 20.0
friction_angle = 30.0
cohesion = 20.0
overburden = 30.0
force_finite_cover = true
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AnalysisConfig::from_toml_str(SCENARIO_A).unwrap();

        assert_relative_eq!(config.ground.face_height(), 10.0);
        assert_eq!(config.ground.overburden(), Some(30.0));
        assert!(config.ground.force_finite_cover());
        assert_relative_eq!(config.ground.influence_width(), 1.8);
        assert_eq!(config.model, ModelOptions::default());
        assert_eq!(config.search, SearchRange::default());
        assert_eq!(config.safety, SafetyFactorSettings::default());
    }

    #[test]
    fn test_partial_tables() {
        let toml_str = format!(
            "{}\n[model]\ncentroid_method = \"simplified\"\n\n[search]\nstep_deg = 0.5\n",
            SCENARIO_A
        );
        let config = AnalysisConfig::from_toml_str(&toml_str).unwrap();

        assert_eq!(config.model.centroid_method, CentroidMethod::Simplified);
        assert_relative_eq!(config.model.deep_cover_ratio, 1.5);
        assert_relative_eq!(config.search.step_deg, 0.5);
        assert_relative_eq!(config.search.min_deg, 20.0);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalysisConfig::from_toml_str(SCENARIO_A).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AnalysisConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_ground_rejected() {
        let bad = SCENARIO_A.replace("cohesion = 20.0", "cohesion = -5.0");
        assert!(matches!(
            AnalysisConfig::from_toml_str(&bad),
            Err(ConfigFileError::TomlError(_))
        ));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let range = format!("{}\n[search]\nmin_deg = 70.0\nmax_deg = 30.0\n", SCENARIO_A);
        assert!(matches!(
            AnalysisConfig::from_toml_str(&range),
            Err(ConfigFileError::SearchRange(_))
        ));

        let ratio = format!("{}\n[model]\ndeep_cover_ratio = 0.0\n", SCENARIO_A);
        assert!(matches!(
            AnalysisConfig::from_toml_str(&ratio),
            Err(ConfigFileError::InvalidSetting(_))
        ));

        let bracket = format!("{}\n[safety]\ninitial_bracket = [2.0, 10.0]\n", SCENARIO_A);
        assert!(matches!(
            AnalysisConfig::from_toml_str(&bracket),
            Err(ConfigFileError::InvalidSetting(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENARIO_A.as_bytes()).unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_relative_eq!(config.ground.cohesion(), 20.0);

        assert!(matches!(
            AnalysisConfig::from_file(file.path().with_extension("missing")),
            Err(ConfigFileError::IoError(_))
        ));
    }
}
