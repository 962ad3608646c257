//! # Ocular Maximum Permissible Exposure
//!
//! MPE at the cornea (IEC 60825-1:2007 Table A.1), used by the NOHD and
//! eyewear calculators. The breakpoints are those of the Class 1 AEL table.

use serde::{Deserialize, Serialize};

use super::ael::{table_inputs, Dose, ExposureTable};
use super::correction::CorrectionFactors;
use crate::errors::CalcResult;

/// Ocular MPE constants (J/m², W/m²)
const OCULAR_MPE_TABLE: ExposureTable = ExposureTable {
    uv_actinic: 30.0,
    uv_c1_scale: 1.0,
    uva_plateau: 1.0e4,
    uva_rate: 10.0,
    visible_short: 5.0e-3,
    visible_coefficient: 18.0,
    photochemical_dose: 100.0,
    photochemical_rate: 1.0,
    nir_short: 5.0e-2,
    nir_coefficient: 90.0,
    ir_short: 100.0,
    ir_coefficient: 5.6e3,
    ir_rate: 1.0e3,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MpeUnit {
    JoulesPerM2,
    WattsPerM2,
}

/// Maximum permissible exposure, tabulated as radiant exposure or irradiance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mpe {
    pub value: f64,
    pub unit: MpeUnit,
}

impl Mpe {
    /// Limit as radiant exposure (J/m²) accumulated over `duration_s`
    pub fn radiant_exposure_over(&self, duration_s: f64) -> f64 {
        match self.unit {
            MpeUnit::JoulesPerM2 => self.value,
            MpeUnit::WattsPerM2 => self.value * duration_s,
        }
    }

    /// Limit as mean irradiance (W/m²) over `duration_s`
    pub fn irradiance_over(&self, duration_s: f64) -> f64 {
        match self.unit {
            MpeUnit::JoulesPerM2 => self.value / duration_s,
            MpeUnit::WattsPerM2 => self.value,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Mpe {
            value: self.value * factor,
            unit: self.unit,
        }
    }

    pub fn unit_label(&self) -> &'static str {
        match self.unit {
            MpeUnit::JoulesPerM2 => "J/m²",
            MpeUnit::WattsPerM2 => "W/m²",
        }
    }
}

impl std::fmt::Display for Mpe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4e} {}", self.value, self.unit_label())
    }
}

/// Ocular MPE at wavelength λ for exposure duration t.
///
/// # Example
///
/// ```rust
/// use calc_core::iec60825::correction::CorrectionFactors;
/// use calc_core::iec60825::mpe::ocular_mpe;
///
/// // Visible CW, 0.25 s blink reflex: 18 t^0.75 J/m² -> 25.4 W/m²
/// let factors = CorrectionFactors::new(532.0, 1.5);
/// let mpe = ocular_mpe(532.0, 0.25, &factors).unwrap();
/// assert!((mpe.irradiance_over(0.25) - 25.46).abs() < 0.01);
/// ```
pub fn ocular_mpe(wavelength_nm: f64, duration_s: f64, factors: &CorrectionFactors) -> CalcResult<Mpe> {
    let t = table_inputs(wavelength_nm, duration_s)?;
    let mpe = match OCULAR_MPE_TABLE.evaluate(wavelength_nm, t, factors) {
        Dose::Integrated(value) => Mpe {
            value,
            unit: MpeUnit::JoulesPerM2,
        },
        Dose::Rate(value) => Mpe {
            value,
            unit: MpeUnit::WattsPerM2,
        },
    };
    Ok(mpe)
}
