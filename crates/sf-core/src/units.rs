// sf-core/src/units.rs

use uom::si::f64::{Length as UomLength, Pressure as UomPressure, Velocity as UomVelocity};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Velocity = UomVelocity;

/// Seconds per hour.
const S_PER_HOUR: f64 = 3_600.0;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

/// Rainfall intensity given in mm/h, as a depth rate.
#[inline]
pub fn mm_per_hour(v: f64) -> Velocity {
    mps(v / 1_000.0 / S_PER_HOUR)
}

/// Depth rate back to mm/h.
#[inline]
pub fn to_mm_per_hour(rate: Velocity) -> f64 {
    rate.value * 1_000.0 * S_PER_HOUR
}

pub mod constants {
    use super::*;

    /// Specific weight of water at 10 °C (N/m³).
    pub const WATER_SPECIFIC_WEIGHT: f64 = 9_810.0;

    /// Reference wall shear stress for self-cleansing sewers.
    #[inline]
    pub fn self_cleansing_shear() -> Pressure {
        pa(2.0)
    }
}
