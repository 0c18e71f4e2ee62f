//! Ground and face parameters for a single analysis request
//!
//! # Internal units
//!
//! - Lengths in **metres**
//! - Unit weight in **kN/m³**
//! - Cohesion and pressures in **kPa**
//! - Friction angle stored in **degrees**, converted to radians on use
//!
//! Public constructors accepting UOM quantities convert at the boundary.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::*;

/// Default influence-width coefficient α
pub const DEFAULT_INFLUENCE_WIDTH: f64 = 1.8;

/// Default empirical (arching) coefficient K
pub const DEFAULT_EMPIRICAL_COEFFICIENT: f64 = 1.0;

/// Smallest friction angle accepted (degrees)
pub const MIN_FRICTION_ANGLE_DEG: f64 = 1.0;

/// Usual unit weight band (kN/m³); values outside only produce a warning
pub const TYPICAL_UNIT_WEIGHT: (f64, f64) = (10.0, 30.0);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("Face height must be positive, got {0}")]
    NonPositiveFaceHeight(DisplayLength),

    #[error("Unit weight must be positive, got {0} kN/m³")]
    NonPositiveUnitWeight(f64),

    #[error("Friction angle {0} outside 0-90°")]
    FrictionAngleOutOfRange(DisplayAngle),

    #[error("Friction angle {0} below 1° is numerically unstable")]
    FrictionAngleTooSmall(DisplayAngle),

    #[error("Cohesion cannot be negative, got {0}")]
    NegativeCohesion(DisplayPressure),

    #[error("Overburden cannot be negative, got {0}")]
    NegativeOverburden(DisplayLength),

    #[error("Influence-width coefficient must be positive, got {0}")]
    NonPositiveInfluenceWidth(f64),

    #[error("Empirical coefficient must be positive, got {0}")]
    NonPositiveEmpiricalCoefficient(f64),
}

/// Validated ground and face description
///
/// Immutable once built: the `with_*` methods return a new, re-validated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GroundParametersInput", into = "GroundParametersInput")]
pub struct GroundParameters {
    unit_weight: f64,
    friction_angle_deg: f64,
    cohesion: f64,
    face_height: f64,
    overburden: Option<f64>,
    influence_width: f64,
    empirical_coefficient: f64,
    force_finite_cover: bool,
}

/// Plain, unvalidated form of [`GroundParameters`] (config files, builders)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundParametersInput {
    /// γ (kN/m³)
    pub unit_weight: f64,
    /// φ (degrees)
    pub friction_angle: f64,
    /// c (kPa)
    pub cohesion: f64,
    /// H_f (m)
    pub face_height: f64,
    /// H (m); absent means deep cover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overburden: Option<f64>,
    /// α
    #[serde(default = "default_influence_width")]
    pub influence_width: f64,
    /// K
    #[serde(default = "default_empirical_coefficient")]
    pub empirical_coefficient: f64,
    #[serde(default)]
    pub force_finite_cover: bool,
}

fn default_influence_width() -> f64 {
    DEFAULT_INFLUENCE_WIDTH
}

fn default_empirical_coefficient() -> f64 {
    DEFAULT_EMPIRICAL_COEFFICIENT
}

impl GroundParametersInput {
    pub fn new(face_height: f64, unit_weight: f64, friction_angle: f64, cohesion: f64) -> Self {
        Self {
            unit_weight,
            friction_angle,
            cohesion,
            face_height,
            overburden: None,
            influence_width: DEFAULT_INFLUENCE_WIDTH,
            empirical_coefficient: DEFAULT_EMPIRICAL_COEFFICIENT,
            force_finite_cover: false,
        }
    }
}

impl TryFrom<GroundParametersInput> for GroundParameters {
    type Error = ConfigurationError;

    fn try_from(input: GroundParametersInput) -> Result<Self, Self::Error> {
        let params = Self {
            unit_weight: input.unit_weight,
            friction_angle_deg: input.friction_angle,
            cohesion: input.cohesion,
            face_height: input.face_height,
            overburden: input.overburden,
            influence_width: input.influence_width,
            empirical_coefficient: input.empirical_coefficient,
            force_finite_cover: input.force_finite_cover,
        };
        params.validate()?;
        Ok(params)
    }
}

impl From<GroundParameters> for GroundParametersInput {
    fn from(params: GroundParameters) -> Self {
        Self {
            unit_weight: params.unit_weight,
            friction_angle: params.friction_angle_deg,
            cohesion: params.cohesion,
            face_height: params.face_height,
            overburden: params.overburden,
            influence_width: params.influence_width,
            empirical_coefficient: params.empirical_coefficient,
            force_finite_cover: params.force_finite_cover,
        }
    }
}

impl GroundParameters {
    /// Create parameters with default α, K and deep cover
    ///
    /// # Arguments
    /// * `face_height` - H_f (m)
    /// * `unit_weight` - γ (kN/m³)
    /// * `friction_angle` - φ (degrees)
    /// * `cohesion` - c (kPa)
    pub fn new(
        face_height: f64,
        unit_weight: f64,
        friction_angle: f64,
        cohesion: f64,
    ) -> Result<Self, ConfigurationError> {
        GroundParametersInput::new(face_height, unit_weight, friction_angle, cohesion).try_into()
    }

    /// Create parameters from UOM quantities
    ///
    /// Unit weight has no UOM dimension here and is taken in kN/m³.
    pub fn from_quantities(
        face_height: Length,
        unit_weight: f64,
        friction_angle: FrictionAngle,
        cohesion: Cohesion,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            to_coord(face_height),
            unit_weight,
            friction_angle.get::<degree>(),
            to_kpa(cohesion),
        )
    }

    pub fn with_overburden(self, overburden: f64) -> Result<Self, ConfigurationError> {
        self.rebuild(|input| input.overburden = Some(overburden))
    }

    pub fn with_overburden_depth(self, overburden: Depth) -> Result<Self, ConfigurationError> {
        self.with_overburden(to_coord(overburden))
    }

    /// Drop the overburden, falling back to the deep-cover assumption
    pub fn without_overburden(self) -> Self {
        Self { overburden: None, ..self }
    }

    pub fn with_influence_width(self, alpha: f64) -> Result<Self, ConfigurationError> {
        self.rebuild(|input| input.influence_width = alpha)
    }

    pub fn with_empirical_coefficient(self, k: f64) -> Result<Self, ConfigurationError> {
        self.rebuild(|input| input.empirical_coefficient = k)
    }

    /// Always use the finite-cover surcharge, regardless of depth ratio
    pub fn forcing_finite_cover(self, force: bool) -> Self {
        Self { force_finite_cover: force, ..self }
    }

    fn rebuild(
        self,
        edit: impl FnOnce(&mut GroundParametersInput),
    ) -> Result<Self, ConfigurationError> {
        let mut input = GroundParametersInput::from(self);
        edit(&mut input);
        input.try_into()
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let finite = [
            ("unit weight", self.unit_weight),
            ("friction angle", self.friction_angle_deg),
            ("cohesion", self.cohesion),
            ("face height", self.face_height),
            ("influence-width coefficient", self.influence_width),
            ("empirical coefficient", self.empirical_coefficient),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigurationError::NotFinite(name));
            }
        }
        if self.overburden.is_some_and(|h| !h.is_finite()) {
            return Err(ConfigurationError::NotFinite("overburden"));
        }

        if self.face_height <= 0.0 {
            return Err(ConfigurationError::NonPositiveFaceHeight(DisplayLength(
                from_coord(self.face_height),
            )));
        }
        if self.face_height > 50.0 {
            warn!(face_height = self.face_height, "face height above 50 m is unusual");
        }

        if self.unit_weight <= 0.0 {
            return Err(ConfigurationError::NonPositiveUnitWeight(self.unit_weight));
        }
        let (gamma_lo, gamma_hi) = TYPICAL_UNIT_WEIGHT;
        if self.unit_weight < gamma_lo || self.unit_weight > gamma_hi {
            warn!(
                unit_weight = self.unit_weight,
                "unit weight outside the usual 10-30 kN/m³ band"
            );
        }

        if !(0.0..=90.0).contains(&self.friction_angle_deg) {
            return Err(ConfigurationError::FrictionAngleOutOfRange(DisplayAngle(
                from_degrees(self.friction_angle_deg),
            )));
        }
        if self.friction_angle_deg < MIN_FRICTION_ANGLE_DEG {
            return Err(ConfigurationError::FrictionAngleTooSmall(DisplayAngle(
                from_degrees(self.friction_angle_deg),
            )));
        }
        if self.friction_angle_deg > 60.0 {
            warn!(
                friction_angle = self.friction_angle_deg,
                "friction angle above 60° is unusual"
            );
        }

        if self.cohesion < 0.0 {
            return Err(ConfigurationError::NegativeCohesion(DisplayPressure(
                from_kpa(self.cohesion),
            )));
        }

        if let Some(h) = self.overburden {
            if h < 0.0 {
                return Err(ConfigurationError::NegativeOverburden(DisplayLength(
                    from_coord(h),
                )));
            }
        }

        if self.influence_width <= 0.0 {
            return Err(ConfigurationError::NonPositiveInfluenceWidth(
                self.influence_width,
            ));
        }
        if self.empirical_coefficient <= 0.0 {
            return Err(ConfigurationError::NonPositiveEmpiricalCoefficient(
                self.empirical_coefficient,
            ));
        }

        Ok(())
    }

    /// γ (kN/m³)
    pub fn unit_weight(&self) -> f64 {
        self.unit_weight
    }

    /// φ (degrees)
    pub fn friction_angle_deg(&self) -> f64 {
        self.friction_angle_deg
    }

    /// φ (radians)
    pub fn friction_angle(&self) -> f64 {
        self.friction_angle_deg.to_radians()
    }

    /// c (kPa)
    pub fn cohesion(&self) -> f64 {
        self.cohesion
    }

    /// H_f (m)
    pub fn face_height(&self) -> f64 {
        self.face_height
    }

    /// H (m), `None` for deep cover
    pub fn overburden(&self) -> Option<f64> {
        self.overburden
    }

    /// α
    pub fn influence_width(&self) -> f64 {
        self.influence_width
    }

    /// K
    pub fn empirical_coefficient(&self) -> f64 {
        self.empirical_coefficient
    }

    pub fn force_finite_cover(&self) -> bool {
        self.force_finite_cover
    }

    /// Unreduced strength pair of this ground
    pub fn strength(&self) -> Strength {
        Strength {
            cohesion: self.cohesion,
            tan_phi: self.friction_angle().tan(),
        }
    }
}

/// Strength pair (c, tanφ) used for one pressure evaluation
///
/// Strength reduction works on copies of this value; the ground parameters
/// themselves are never modified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    /// c (kPa)
    pub cohesion: f64,
    /// tanφ
    pub tan_phi: f64,
}

impl Strength {
    /// c' = c/F, tanφ' = tanφ/F
    pub fn reduced(self, factor: f64) -> Self {
        Self {
            cohesion: self.cohesion / factor,
            tan_phi: self.tan_phi / factor,
        }
    }

    /// φ (radians)
    pub fn friction_angle(&self) -> f64 {
        self.tan_phi.atan()
    }

    /// φ (degrees)
    pub fn friction_angle_deg(&self) -> f64 {
        self.friction_angle().to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_ground() -> GroundParameters {
        GroundParameters::new(10.0, 20.0, 30.0, 20.0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let ground = reference_ground();
        assert_relative_eq!(ground.influence_width(), 1.8);
        assert_relative_eq!(ground.empirical_coefficient(), 1.0);
        assert!(ground.overburden().is_none());
        assert!(!ground.force_finite_cover());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(matches!(
            GroundParameters::new(0.0, 20.0, 30.0, 20.0),
            Err(ConfigurationError::NonPositiveFaceHeight(_))
        ));
        assert!(matches!(
            GroundParameters::new(10.0, -1.0, 30.0, 20.0),
            Err(ConfigurationError::NonPositiveUnitWeight(_))
        ));
        assert!(matches!(
            GroundParameters::new(10.0, 20.0, 95.0, 20.0),
            Err(ConfigurationError::FrictionAngleOutOfRange(_))
        ));
        assert!(matches!(
            GroundParameters::new(10.0, 20.0, 0.5, 20.0),
            Err(ConfigurationError::FrictionAngleTooSmall(_))
        ));
        assert!(matches!(
            GroundParameters::new(10.0, 20.0, 30.0, -5.0),
            Err(ConfigurationError::NegativeCohesion(_))
        ));
        assert!(matches!(
            reference_ground().with_overburden(-1.0),
            Err(ConfigurationError::NegativeOverburden(_))
        ));
        assert!(matches!(
            reference_ground().with_influence_width(0.0),
            Err(ConfigurationError::NonPositiveInfluenceWidth(_))
        ));
        assert!(matches!(
            reference_ground().with_empirical_coefficient(-0.5),
            Err(ConfigurationError::NonPositiveEmpiricalCoefficient(_))
        ));
        assert!(matches!(
            GroundParameters::new(f64::NAN, 20.0, 30.0, 20.0),
            Err(ConfigurationError::NotFinite(_))
        ));
    }

    #[test]
    fn test_borderline_unit_weight_is_accepted() {
        // Outside 10-30 is a warning only
        let ground = GroundParameters::new(10.0, 8.0, 30.0, 20.0).unwrap();
        assert_relative_eq!(ground.unit_weight(), 8.0);
    }

    #[test]
    fn test_from_quantities() {
        let ground = GroundParameters::from_quantities(
            Length::new::<foot>(32.808_398_95),
            20.0,
            Angle::new::<degree>(30.0),
            Pressure::new::<pascal>(20_000.0),
        )
        .unwrap();

        assert_relative_eq!(ground.face_height(), 10.0, epsilon = 1e-6);
        assert_relative_eq!(ground.cohesion(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(ground.friction_angle_deg(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overburden_round_trip() {
        let shallow = reference_ground()
            .with_overburden(12.0)
            .unwrap()
            .forcing_finite_cover(true);
        assert_eq!(shallow.overburden(), Some(12.0));

        let deep = shallow.without_overburden();
        assert!(deep.overburden().is_none());
        // Other settings survive
        assert!(deep.force_finite_cover());
        assert_eq!(deep.without_overburden(), deep);
        assert_eq!(shallow.overburden(), Some(12.0));
    }

    #[test]
    fn test_strength_reduction() {
        let strength = reference_ground().strength();
        let reduced = strength.reduced(2.0);

        assert_relative_eq!(reduced.cohesion, 10.0);
        assert_relative_eq!(reduced.tan_phi, 30f64.to_radians().tan() / 2.0);
        assert!(reduced.friction_angle_deg() < 30.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = r#"{"unit_weight":20.0,"friction_angle":30.0,"cohesion":-1.0,"face_height":10.0}"#;
        assert!(serde_json::from_str::<GroundParameters>(bad).is_err());

        let good = r#"{"unit_weight":20.0,"friction_angle":30.0,"cohesion":20.0,"face_height":10.0,"overburden":30.0}"#;
        let ground: GroundParameters = serde_json::from_str(good).unwrap();
        assert_eq!(ground.overburden(), Some(30.0));
        assert_relative_eq!(ground.influence_width(), 1.8);
    }
}
