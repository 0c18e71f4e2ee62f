mod display;

pub use uom::si::f64::*;
pub use uom::si::{
    angle::{degree, radian},
    force::{kilonewton, newton},
    length::{centimeter, foot, meter, millimeter},
    pressure::{kilopascal, megapascal, pascal, psi},
};
pub use uom::si::{angle, force, length, pressure};

pub use display::{DisplayAngle, DisplayLength, DisplayPressure};

// Type aliases for domain clarity (zero cost)
pub type Depth = Length;
pub type FrictionAngle = Angle;
pub type SearchAngle = Angle;
pub type Cohesion = Pressure;
pub type SupportPressure = Pressure;

// Standard units we use internally (just documentation)
/// Internal standard: metres
pub const INTERNAL_LENGTH_UNIT: &str = "meters";
/// Internal standard: kilonewtons (per metre run of tunnel)
pub const INTERNAL_FORCE_UNIT: &str = "kilonewtons";
/// Internal standard: kilopascals
pub const INTERNAL_PRESSURE_UNIT: &str = "kilopascals";
/// Internal standard: radians
pub const INTERNAL_ANGLE_UNIT: &str = "radians";

/// Convert UOM Length to internal coordinate (metres)
#[inline]
pub fn to_coord(length: Length) -> f64 {
    length.get::<meter>()
}

/// Convert internal coordinate (metres) to UOM Length
#[inline]
pub fn from_coord(value: f64) -> Length {
    Length::new::<meter>(value)
}

/// Convert UOM Pressure to internal kPa
#[inline]
pub fn to_kpa(pressure: Pressure) -> f64 {
    pressure.get::<kilopascal>()
}

/// Convert internal kPa to UOM Pressure
#[inline]
pub fn from_kpa(value: f64) -> Pressure {
    Pressure::new::<kilopascal>(value)
}

/// Internal radians to UOM Angle
#[inline]
pub fn from_radians(value: f64) -> Angle {
    Angle::new::<radian>(value)
}

/// Internal degrees to UOM Angle
#[inline]
pub fn from_degrees(value: f64) -> Angle {
    Angle::new::<degree>(value)
}
