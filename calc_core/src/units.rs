//! # Unit Types
//!
//! Type-safe wrappers for the units used by the optical and RF calculators.
//! These provide compile-time safety against unit confusion while remaining
//! lightweight (just f64 wrappers).
//!
//! ## SI Units (Primary)
//!
//! Laser safety tables are written in SI units, so calc_core uses them internally:
//! - Length: meters (m), millimeters (mm), nanometers (nm) for wavelength
//! - Angle: radians (rad), milliradians (mrad) for divergence and source subtense
//! - Time: seconds (s)
//! - Power/energy: watts (W), milliwatts (mW), joules (J)
//! - Exposure: irradiance (W/m²), radiant exposure (J/m²)
//!
//! Link budgets use logarithmic units:
//! - Optical power: dBm (dB relative to 1 mW)
//! - RF signal level: dBµV (dB relative to 1 µV across 75 Ω)
//! - Gain/loss: dB
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{Dbm, Dbuv, Millimeters, Meters, Milliwatts};
//!
//! let diameter = Millimeters(7.0);
//! let meters: Meters = diameter.into();
//! assert!((meters.0 - 0.007).abs() < 1e-12);
//!
//! let level = Dbm::from(Milliwatts(1.0));
//! assert!(level.0.abs() < 1e-12);
//!
//! let rf: Dbm = Dbuv(108.75).into();
//! assert!(rf.0.abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

use crate::constants::DBUV_TO_DBM_75_OHM;

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in kilometers (fiber spans)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilometers(pub f64);

/// Wavelength in nanometers
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nanometers(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Kilometers> for Meters {
    fn from(km: Kilometers) -> Self {
        Meters(km.0 * 1000.0)
    }
}

impl From<Meters> for Kilometers {
    fn from(m: Meters) -> Self {
        Kilometers(m.0 / 1000.0)
    }
}

impl From<Nanometers> for Meters {
    fn from(nm: Nanometers) -> Self {
        Meters(nm.0 * 1e-9)
    }
}

// ============================================================================
// Angle Units
// ============================================================================

/// Plane angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(pub f64);

/// Plane angle in milliradians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milliradians(pub f64);

impl From<Milliradians> for Radians {
    fn from(mrad: Milliradians) -> Self {
        Radians(mrad.0 / 1000.0)
    }
}

impl From<Radians> for Milliradians {
    fn from(rad: Radians) -> Self {
        Milliradians(rad.0 * 1000.0)
    }
}

// ============================================================================
// Time and Frequency Units
// ============================================================================

/// Duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seconds(pub f64);

/// Frequency in hertz
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hertz(pub f64);

/// Frequency in megahertz
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megahertz(pub f64);

impl From<Megahertz> for Hertz {
    fn from(mhz: Megahertz) -> Self {
        Hertz(mhz.0 * 1e6)
    }
}

impl From<Hertz> for Megahertz {
    fn from(hz: Hertz) -> Self {
        Megahertz(hz.0 / 1e6)
    }
}

// ============================================================================
// Power and Energy Units
// ============================================================================

/// Power in watts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

/// Power in milliwatts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milliwatts(pub f64);

/// Energy in joules
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Joules(pub f64);

impl From<Watts> for Milliwatts {
    fn from(w: Watts) -> Self {
        Milliwatts(w.0 * 1000.0)
    }
}

impl From<Milliwatts> for Watts {
    fn from(mw: Milliwatts) -> Self {
        Watts(mw.0 / 1000.0)
    }
}

// ============================================================================
// Exposure Units
// ============================================================================

/// Irradiance in watts per square meter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WattsPerM2(pub f64);

/// Radiant exposure in joules per square meter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoulesPerM2(pub f64);

// ============================================================================
// Logarithmic Units
// ============================================================================

/// Relative gain or loss in decibels
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decibels(pub f64);

/// Absolute optical/RF power in dB relative to 1 mW
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dbm(pub f64);

/// RF signal level in dB relative to 1 µV (75 Ω systems)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dbuv(pub f64);

impl From<Milliwatts> for Dbm {
    fn from(mw: Milliwatts) -> Self {
        Dbm(10.0 * mw.0.log10())
    }
}

impl From<Dbm> for Milliwatts {
    fn from(dbm: Dbm) -> Self {
        Milliwatts(10f64.powf(dbm.0 / 10.0))
    }
}

impl From<Watts> for Dbm {
    fn from(w: Watts) -> Self {
        Dbm::from(Milliwatts::from(w))
    }
}

impl From<Dbm> for Watts {
    fn from(dbm: Dbm) -> Self {
        Watts::from(Milliwatts::from(dbm))
    }
}

impl From<Dbuv> for Dbm {
    fn from(level: Dbuv) -> Self {
        Dbm(level.0 - DBUV_TO_DBM_75_OHM)
    }
}

impl From<Dbm> for Dbuv {
    fn from(dbm: Dbm) -> Self {
        Dbuv(dbm.0 + DBUV_TO_DBM_75_OHM)
    }
}

impl Decibels {
    /// Linear power ratio represented by this value
    pub fn power_ratio(self) -> f64 {
        10f64.powf(self.0 / 10.0)
    }

    /// Decibel value of a linear power ratio
    pub fn from_power_ratio(ratio: f64) -> Self {
        Decibels(10.0 * ratio.log10())
    }
}

impl Add<Decibels> for Dbm {
    type Output = Dbm;
    fn add(self, rhs: Decibels) -> Self::Output {
        Dbm(self.0 + rhs.0)
    }
}

impl Sub<Decibels> for Dbm {
    type Output = Dbm;
    fn sub(self, rhs: Decibels) -> Self::Output {
        Dbm(self.0 - rhs.0)
    }
}

impl Add<Decibels> for Dbuv {
    type Output = Dbuv;
    fn add(self, rhs: Decibels) -> Self::Output {
        Dbuv(self.0 + rhs.0)
    }
}

impl Sub<Decibels> for Dbuv {
    type Output = Dbuv;
    fn sub(self, rhs: Decibels) -> Self::Output {
        Dbuv(self.0 - rhs.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Kilometers);
impl_arithmetic!(Nanometers);
impl_arithmetic!(Radians);
impl_arithmetic!(Milliradians);
impl_arithmetic!(Seconds);
impl_arithmetic!(Hertz);
impl_arithmetic!(Megahertz);
impl_arithmetic!(Watts);
impl_arithmetic!(Milliwatts);
impl_arithmetic!(Joules);
impl_arithmetic!(WattsPerM2);
impl_arithmetic!(JoulesPerM2);
impl_arithmetic!(Decibels);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millimeters_to_meters() {
        let mm = Millimeters(50.0);
        let m: Meters = mm.into();
        assert!((m.0 - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_milliradians_to_radians() {
        let mrad = Milliradians(1.5);
        let rad: Radians = mrad.into();
        assert!((rad.0 - 0.0015).abs() < 1e-12);
    }

    #[test]
    fn test_dbm_milliwatt_conversion() {
        let dbm: Dbm = Milliwatts(100.0).into();
        assert!((dbm.0 - 20.0).abs() < 1e-9);

        let mw: Milliwatts = Dbm(-3.0).into();
        assert!((mw.0 - 0.501).abs() < 0.001);

        let w: Watts = Dbm(30.0).into();
        assert!((w.0 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dbuv_dbm_conversion() {
        // 60 dBµV across 75 Ω is -48.75 dBm
        let dbm: Dbm = Dbuv(60.0).into();
        assert!((dbm.0 + 48.75).abs() < 1e-9);

        let back: Dbuv = dbm.into();
        assert!((back.0 - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_decibel_ratio() {
        assert!((Decibels(3.0).power_ratio() - 1.995).abs() < 0.001);
        assert!((Decibels::from_power_ratio(32.0).0 - 15.05).abs() < 0.01);
    }

    #[test]
    fn test_level_arithmetic() {
        let level = Dbuv(80.0) - Decibels(12.5) + Decibels(20.0);
        assert!((level.0 - 87.5).abs() < 1e-12);

        let a = Watts(0.5);
        let b = Watts(0.25);
        assert_eq!((a + b).0, 0.75);
        assert_eq!((a * 2.0).0, 1.0);
    }

    #[test]
    fn test_serialization() {
        let wl = Nanometers(532.0);
        let json = serde_json::to_string(&wl).unwrap();
        assert_eq!(json, "532.0");

        let roundtrip: Nanometers = serde_json::from_str(&json).unwrap();
        assert_eq!(wl, roundtrip);
    }
}
