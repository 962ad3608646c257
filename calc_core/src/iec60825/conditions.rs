//! # Measurement Conditions
//!
//! Aperture and distance geometry used to measure the accessible emission
//! (IEC 60825-1:2007 Table 11). Condition 1 models viewing through a telescope
//! or binoculars; Condition 3 models the unaided eye.

use serde::{Deserialize, Serialize};

use crate::equations::optics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementCondition {
    /// 50 mm aperture at 2000 mm
    Condition1,
    /// Limiting aperture at 100 mm
    Condition3,
}

impl MeasurementCondition {
    pub const ALL: [MeasurementCondition; 2] = [MeasurementCondition::Condition1, MeasurementCondition::Condition3];

    pub fn display_name(&self) -> &'static str {
        match self {
            MeasurementCondition::Condition1 => "Condition 1 (50 mm at 2 m)",
            MeasurementCondition::Condition3 => "Condition 3 (limiting aperture at 100 mm)",
        }
    }

    /// Whether the condition applies at the given wavelength.
    ///
    /// Optical instruments only transmit 302.5 nm to 4000 nm.
    pub fn applies_to(&self, wavelength_nm: f64) -> bool {
        match self {
            MeasurementCondition::Condition1 => (302.5..4000.0).contains(&wavelength_nm),
            MeasurementCondition::Condition3 => true,
        }
    }

    /// Measurement aperture diameter (mm)
    pub fn aperture_diameter_mm(&self, wavelength_nm: f64, duration_s: f64) -> f64 {
        match self {
            MeasurementCondition::Condition1 => 50.0,
            MeasurementCondition::Condition3 => limiting_aperture_mm(wavelength_nm, duration_s),
        }
    }

    /// Distance from the reference point to the aperture (mm)
    pub fn distance_mm(&self) -> f64 {
        match self {
            MeasurementCondition::Condition1 => 2000.0,
            MeasurementCondition::Condition3 => 100.0,
        }
    }

    /// Fraction of a beam's power collected by this condition's aperture.
    pub fn coupled_fraction(
        &self,
        wavelength_nm: f64,
        duration_s: f64,
        beam_diameter_mm: f64,
        divergence_mrad: f64,
    ) -> f64 {
        let beam_at_aperture = optics::beam_diameter_at(beam_diameter_mm, divergence_mrad, self.distance_mm());
        optics::coupled_fraction(self.aperture_diameter_mm(wavelength_nm, duration_s), beam_at_aperture)
    }
}

impl std::fmt::Display for MeasurementCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Limiting aperture diameter (mm) for wavelength λ and exposure duration t.
pub fn limiting_aperture_mm(wavelength_nm: f64, duration_s: f64) -> f64 {
    if wavelength_nm < 400.0 {
        1.0
    } else if wavelength_nm < 1400.0 {
        7.0
    } else if wavelength_nm < 1.0e5 {
        if duration_s <= 0.35 {
            1.0
        } else if duration_s < 10.0 {
            1.5 * duration_s.powf(0.375)
        } else {
            3.5
        }
    } else {
        11.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition1_window() {
        assert!(!MeasurementCondition::Condition1.applies_to(266.0));
        assert!(MeasurementCondition::Condition1.applies_to(1550.0));
        assert!(!MeasurementCondition::Condition1.applies_to(10_600.0));
        assert!(MeasurementCondition::Condition3.applies_to(10_600.0));
    }

    #[test]
    fn test_limiting_aperture() {
        assert_eq!(limiting_aperture_mm(355.0, 100.0), 1.0);
        assert_eq!(limiting_aperture_mm(633.0, 0.25), 7.0);
        assert_eq!(limiting_aperture_mm(1550.0, 0.1), 1.0);
        assert!((limiting_aperture_mm(1550.0, 1.0) - 1.5).abs() < 1e-12);
        assert_eq!(limiting_aperture_mm(1550.0, 100.0), 3.5);
        assert_eq!(limiting_aperture_mm(200_000.0, 100.0), 11.0);
    }

    #[test]
    fn test_small_beam_fully_coupled() {
        let eta = MeasurementCondition::Condition3.coupled_fraction(633.0, 0.25, 1.0, 1.0);
        assert!(eta > 0.999);
    }

    #[test]
    fn test_divergent_beam_partially_coupled_at_two_meters() {
        // 2 mm beam diverging at 50 mrad is 102 mm wide at 2 m
        let eta = MeasurementCondition::Condition1.coupled_fraction(633.0, 0.25, 2.0, 50.0);
        let expected = 1.0 - (-(50.0f64 / 102.0).powi(2)).exp();
        assert!((eta - expected).abs() < 1e-12);
    }
}
