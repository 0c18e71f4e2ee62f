use std::fmt;

use uom::si::f64::{Angle, Length, Pressure};
use uom::si::{
    angle::degree,
    length::{foot, meter},
    pressure::{kilopascal, psi},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPressure(pub Pressure);
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayAngle(pub Angle);
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayLength(pub Length);

impl fmt::Display for DisplayPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kpa = self.0.get::<kilopascal>();
        let psi_f64 = self.0.get::<psi>();
        write!(f, "{:.1}kPa ({:.1}psi)", kpa, psi_f64)
    }
}

impl fmt::Display for DisplayAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°", self.0.get::<degree>())
    }
}

impl fmt::Display for DisplayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meters = self.0.get::<meter>();
        let feet = self.0.get::<foot>();
        write!(f, "{:.3}m ({:.2}ft)", meters, feet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_units() {
        let p = DisplayPressure(Pressure::new::<kilopascal>(100.0));
        assert!(p.to_string().starts_with("100.0kPa"));

        let a = DisplayAngle(Angle::new::<degree>(54.0));
        assert_eq!(a.to_string(), "54.00°");

        let l = DisplayLength(Length::new::<meter>(10.0));
        assert!(l.to_string().starts_with("10.000m"));
    }
}
