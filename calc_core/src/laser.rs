//! # Laser Emission Data
//!
//! Description of one emitted wavelength of a laser product. A product with
//! several lines (RGB projectors, pump + signal sources) carries one
//! [`WavelengthData`] per line.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "id": "5f0c...",
//!   "wavelength_nm": 532.0,
//!   "emission": { "type": "ContinuousWave", "power_w": 0.005 },
//!   "beam_diameter_mm": 1.0,
//!   "divergence_mrad": 1.0
//! }
//! ```
//!
//! ```json
//! {
//!   "wavelength_nm": 1064.0,
//!   "emission": {
//!     "type": "Pulsed",
//!     "pulse_energy_j": 0.001,
//!     "pulse_width_s": 1e-8,
//!     "repetition_rate_hz": 10.0
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_WAVELENGTH_NM, MIN_PULSE_WIDTH_S, MIN_WAVELENGTH_NM};
use crate::errors::{CalcError, CalcResult};
use crate::iec60825::correction::ALPHA_MIN_MRAD;

/// Continuous-wave or pulsed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaserType {
    ContinuousWave,
    Pulsed,
}

impl LaserType {
    pub fn display_name(&self) -> &'static str {
        match self {
            LaserType::ContinuousWave => "Continuous wave",
            LaserType::Pulsed => "Pulsed",
        }
    }
}

impl std::fmt::Display for LaserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Temporal emission of one wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Emission {
    /// Constant output power
    ContinuousWave { power_w: f64 },
    /// Pulse train; `repetition_rate_hz == 0` is a single pulse
    Pulsed {
        pulse_energy_j: f64,
        pulse_width_s: f64,
        repetition_rate_hz: f64,
    },
}

/// One emitted wavelength and its beam geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavelengthData {
    /// Stable identifier (UUID v4)
    #[serde(default = "new_id")]
    pub id: String,
    pub wavelength_nm: f64,
    pub emission: Emission,
    /// Beam diameter (d63) at the exit aperture (mm)
    #[serde(default)]
    pub beam_diameter_mm: f64,
    /// Full-angle divergence (d63, mrad)
    #[serde(default)]
    pub divergence_mrad: f64,
    /// Apparent source subtense α (mrad)
    #[serde(default = "default_source_subtense")]
    pub source_subtense_mrad: f64,
    /// Inactive wavelengths are kept in the input but not evaluated
    #[serde(default = "default_active")]
    pub active: bool,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_source_subtense() -> f64 {
    ALPHA_MIN_MRAD
}

fn default_active() -> bool {
    true
}

impl WavelengthData {
    /// Create a point-source wavelength entry with a fresh id
    pub fn new(wavelength_nm: f64, emission: Emission) -> Self {
        WavelengthData {
            id: new_id(),
            wavelength_nm,
            emission,
            beam_diameter_mm: 0.0,
            divergence_mrad: 0.0,
            source_subtense_mrad: ALPHA_MIN_MRAD,
            active: true,
        }
    }

    /// Continuous-wave emission of `power_w`
    pub fn continuous(wavelength_nm: f64, power_w: f64) -> Self {
        Self::new(wavelength_nm, Emission::ContinuousWave { power_w })
    }

    /// Pulsed emission
    pub fn pulsed(wavelength_nm: f64, pulse_energy_j: f64, pulse_width_s: f64, repetition_rate_hz: f64) -> Self {
        Self::new(
            wavelength_nm,
            Emission::Pulsed {
                pulse_energy_j,
                pulse_width_s,
                repetition_rate_hz,
            },
        )
    }

    /// Set exit beam diameter (mm) and full-angle divergence (mrad)
    pub fn with_beam(mut self, beam_diameter_mm: f64, divergence_mrad: f64) -> Self {
        self.beam_diameter_mm = beam_diameter_mm;
        self.divergence_mrad = divergence_mrad;
        self
    }

    /// Set apparent source subtense α (mrad)
    pub fn with_source_subtense(mut self, alpha_mrad: f64) -> Self {
        self.source_subtense_mrad = alpha_mrad;
        self
    }

    pub fn laser_type(&self) -> LaserType {
        match self.emission {
            Emission::ContinuousWave { .. } => LaserType::ContinuousWave,
            Emission::Pulsed { .. } => LaserType::Pulsed,
        }
    }

    /// Whether this is a single pulse rather than a train
    pub fn is_single_pulse(&self) -> bool {
        matches!(self.emission, Emission::Pulsed { repetition_rate_hz, .. } if repetition_rate_hz <= 0.0)
    }

    /// Mean power (W) over `time_base_s`.
    ///
    /// A single pulse delivers its energy once within the time base.
    pub fn average_power_w(&self, time_base_s: f64) -> f64 {
        match self.emission {
            Emission::ContinuousWave { power_w } => power_w,
            Emission::Pulsed {
                pulse_energy_j,
                repetition_rate_hz,
                ..
            } => {
                if repetition_rate_hz > 0.0 {
                    pulse_energy_j * repetition_rate_hz
                } else {
                    pulse_energy_j / time_base_s
                }
            }
        }
    }

    /// Peak power (W); equal to the CW power for continuous emission
    pub fn peak_power_w(&self) -> f64 {
        match self.emission {
            Emission::ContinuousWave { power_w } => power_w,
            Emission::Pulsed {
                pulse_energy_j,
                pulse_width_s,
                ..
            } => pulse_energy_j / pulse_width_s,
        }
    }

    /// Short description for step logs ("532 nm CW 5.000e-3 W")
    pub fn summary(&self) -> String {
        match self.emission {
            Emission::ContinuousWave { power_w } => {
                format!("{} nm CW {:.3e} W", self.wavelength_nm, power_w)
            }
            Emission::Pulsed {
                pulse_energy_j,
                pulse_width_s,
                repetition_rate_hz,
            } => format!(
                "{} nm pulsed {:.3e} J, {:.3e} s, {} Hz",
                self.wavelength_nm, pulse_energy_j, pulse_width_s, repetition_rate_hz
            ),
        }
    }

    /// Validate the wavelength entry.
    ///
    /// `field` prefixes error field names (e.g., "wavelengths[2]").
    pub fn validate(&self, field: &str) -> CalcResult<()> {
        let wl = self.wavelength_nm;
        if !wl.is_finite() || wl < MIN_WAVELENGTH_NM {
            return Err(CalcError::unsupported_wavelength(wl, "below 180 nm"));
        }
        if wl > MAX_WAVELENGTH_NM {
            return Err(CalcError::unsupported_wavelength(wl, "above 1 mm"));
        }

        match self.emission {
            Emission::ContinuousWave { power_w } => {
                if !power_w.is_finite() || power_w <= 0.0 {
                    return Err(CalcError::invalid_input(
                        format!("{}.power_w", field),
                        power_w.to_string(),
                        "Power must be positive",
                    ));
                }
            }
            Emission::Pulsed {
                pulse_energy_j,
                pulse_width_s,
                repetition_rate_hz,
            } => {
                if !pulse_energy_j.is_finite() || pulse_energy_j <= 0.0 {
                    return Err(CalcError::invalid_input(
                        format!("{}.pulse_energy_j", field),
                        pulse_energy_j.to_string(),
                        "Pulse energy must be positive",
                    ));
                }
                if !pulse_width_s.is_finite() || pulse_width_s < MIN_PULSE_WIDTH_S {
                    return Err(CalcError::invalid_input(
                        format!("{}.pulse_width_s", field),
                        pulse_width_s.to_string(),
                        "Pulse width must be at least 100 fs",
                    ));
                }
                if !repetition_rate_hz.is_finite() || repetition_rate_hz < 0.0 {
                    return Err(CalcError::invalid_input(
                        format!("{}.repetition_rate_hz", field),
                        repetition_rate_hz.to_string(),
                        "Repetition rate cannot be negative",
                    ));
                }
                if pulse_width_s * repetition_rate_hz > 1.0 {
                    return Err(CalcError::invalid_input(
                        format!("{}.repetition_rate_hz", field),
                        repetition_rate_hz.to_string(),
                        "Duty cycle exceeds 100% (pulse width x repetition rate > 1)",
                    ));
                }
            }
        }

        for (name, value) in [
            ("beam_diameter_mm", self.beam_diameter_mm),
            ("divergence_mrad", self.divergence_mrad),
            ("source_subtense_mrad", self.source_subtense_mrad),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid_input(
                    format!("{}.{}", field, name),
                    value.to_string(),
                    "Must be finite and non-negative",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = WavelengthData::continuous(532.0, 1e-3);
        let b = WavelengthData::continuous(532.0, 1e-3);
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_average_and_peak_power() {
        let pulsed = WavelengthData::pulsed(1064.0, 1e-3, 1e-8, 10.0);
        assert!((pulsed.average_power_w(100.0) - 1e-2).abs() < 1e-15);
        assert!((pulsed.peak_power_w() - 1e5).abs() < 1e-6);
        assert_eq!(pulsed.laser_type(), LaserType::Pulsed);

        let single = WavelengthData::pulsed(1064.0, 1e-3, 1e-8, 0.0);
        assert!(single.is_single_pulse());
        assert!((single.average_power_w(100.0) - 1e-5).abs() < 1e-15);

        let cw = WavelengthData::continuous(633.0, 5e-3);
        assert_eq!(cw.average_power_w(0.25), 5e-3);
        assert_eq!(cw.peak_power_w(), 5e-3);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(WavelengthData::continuous(150.0, 1e-3).validate("w").is_err());
        assert!(WavelengthData::continuous(2e6, 1e-3).validate("w").is_err());
        assert!(WavelengthData::continuous(532.0, 0.0).validate("w").is_err());
        assert!(WavelengthData::pulsed(532.0, 1e-3, 1e-15, 10.0).validate("w").is_err());
        assert!(WavelengthData::pulsed(532.0, 1e-3, 1e-3, 2000.0).validate("w").is_err());

        let err = WavelengthData::continuous(532.0, 1e-3)
            .with_beam(-1.0, 1.0)
            .validate("wavelengths[0]")
            .unwrap_err();
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "wavelengths[0].beam_diameter_mm"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_validation_accepts_edges() {
        assert!(WavelengthData::continuous(180.0, 1e-3).validate("w").is_ok());
        assert!(WavelengthData::continuous(1e6, 1e-3).validate("w").is_ok());
        assert!(WavelengthData::pulsed(800.0, 1e-6, 1e-13, 8e7).validate("w").is_ok());
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "wavelength_nm": 532.0,
            "emission": { "type": "ContinuousWave", "power_w": 0.005 }
        }"#;
        let data: WavelengthData = serde_json::from_str(json).unwrap();
        assert!(!data.id.is_empty());
        assert!(data.active);
        assert_eq!(data.source_subtense_mrad, 1.5);
        assert_eq!(data.beam_diameter_mm, 0.0);
    }

    #[test]
    fn test_emission_serialization() {
        let data = WavelengthData::pulsed(1064.0, 1e-3, 1e-8, 10.0);
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"type\":\"Pulsed\""));
        let roundtrip: WavelengthData = serde_json::from_str(&json).unwrap();
        assert_eq!(data, roundtrip);
    }
}
