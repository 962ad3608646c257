//! # Accessible Emission Limits
//!
//! AEL tables for the base classes 1, 2, 3R and 3B (IEC 60825-1:2007 Tables 4
//! to 8). Classes 1M and 2M reuse the Class 1 and Class 2 tables under a
//! different measurement-condition rule, so they have no table of their own.
//!
//! The Class 1 table and the ocular MPE table share their breakpoints; both are
//! evaluated through [`ExposureTable`] with different constants.

use serde::{Deserialize, Serialize};

use super::correction::{c1, CorrectionFactors};
use crate::constants::{MAX_WAVELENGTH_NM, MIN_TABLE_DURATION_S, MIN_WAVELENGTH_NM};
use crate::errors::{CalcError, CalcResult};

/// Class whose AEL table is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AelClass {
    #[serde(rename = "1")]
    Class1,
    #[serde(rename = "2")]
    Class2,
    #[serde(rename = "3R")]
    Class3R,
    #[serde(rename = "3B")]
    Class3B,
}

impl AelClass {
    /// All tabulated classes, in ladder order
    pub const ALL: [AelClass; 4] = [AelClass::Class1, AelClass::Class2, AelClass::Class3R, AelClass::Class3B];

    pub fn display_name(&self) -> &'static str {
        match self {
            AelClass::Class1 => "Class 1",
            AelClass::Class2 => "Class 2",
            AelClass::Class3R => "Class 3R",
            AelClass::Class3B => "Class 3B",
        }
    }

    /// Clause reference for this class's table
    pub fn table_reference(&self) -> &'static str {
        use crate::constants::iec_ref;
        match self {
            AelClass::Class1 => iec_ref::AEL_CLASS_1,
            AelClass::Class2 => iec_ref::AEL_CLASS_2,
            AelClass::Class3R => iec_ref::AEL_CLASS_3R,
            AelClass::Class3B => iec_ref::AEL_CLASS_3B,
        }
    }

    /// Whether the pulse-train rule (C5) applies to this class
    pub fn uses_pulse_train_rule(&self) -> bool {
        !matches!(self, AelClass::Class3B)
    }
}

impl std::fmt::Display for AelClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Unit in which an AEL is tabulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AelUnit {
    Joules,
    Watts,
}

/// Accessible emission limit, tabulated either as energy or as power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ael {
    pub value: f64,
    pub unit: AelUnit,
}

impl Ael {
    pub fn joules(value: f64) -> Self {
        Ael { value, unit: AelUnit::Joules }
    }

    pub fn watts(value: f64) -> Self {
        Ael { value, unit: AelUnit::Watts }
    }

    /// Limit expressed as energy (J) accumulated over `duration_s`
    pub fn energy_over(&self, duration_s: f64) -> f64 {
        match self.unit {
            AelUnit::Joules => self.value,
            AelUnit::Watts => self.value * duration_s,
        }
    }

    /// Limit expressed as mean power (W) over `duration_s`
    pub fn power_over(&self, duration_s: f64) -> f64 {
        match self.unit {
            AelUnit::Joules => self.value / duration_s,
            AelUnit::Watts => self.value,
        }
    }

    /// Scale the limit by a dimensionless factor (C5, class multipliers)
    pub fn scaled(self, factor: f64) -> Self {
        Ael {
            value: self.value * factor,
            unit: self.unit,
        }
    }

    pub fn unit_label(&self) -> &'static str {
        match self.unit {
            AelUnit::Joules => "J",
            AelUnit::Watts => "W",
        }
    }
}

impl std::fmt::Display for Ael {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4e} {}", self.value, self.unit_label())
    }
}

// ============================================================================
// Shared Class 1 / MPE breakpoints
// ============================================================================

/// Tabulated quantity before a unit is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Dose {
    /// Energy or radiant exposure
    Integrated(f64),
    /// Power or irradiance
    Rate(f64),
}

impl Dose {
    fn integrated_over(self, duration_s: f64) -> f64 {
        match self {
            Dose::Integrated(v) => v,
            Dose::Rate(v) => v * duration_s,
        }
    }
}

/// Constants of a table with the Class 1 breakpoint structure.
///
/// The Class 1 AEL is the ocular MPE integrated over the 7 mm (or 1 mm / 3.5 mm)
/// limiting aperture, so both tables change value at the same durations.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExposureTable {
    pub uv_actinic: f64,
    pub uv_c1_scale: f64,
    pub uva_plateau: f64,
    pub uva_rate: f64,
    pub visible_short: f64,
    pub visible_coefficient: f64,
    pub photochemical_dose: f64,
    pub photochemical_rate: f64,
    pub nir_short: f64,
    pub nir_coefficient: f64,
    pub ir_short: f64,
    pub ir_coefficient: f64,
    pub ir_rate: f64,
}

/// Class 1 AEL constants (J, W)
pub(crate) const CLASS_1_TABLE: ExposureTable = ExposureTable {
    uv_actinic: 2.4e-5,
    uv_c1_scale: 7.9e-7,
    uva_plateau: 7.9e-3,
    uva_rate: 7.9e-6,
    visible_short: 2.0e-7,
    visible_coefficient: 7.0e-4,
    photochemical_dose: 3.9e-3,
    photochemical_rate: 3.9e-5,
    nir_short: 2.0e-6,
    nir_coefficient: 3.5e-3,
    ir_short: 8.0e-5,
    ir_coefficient: 4.4e-3,
    ir_rate: 1.0e-2,
};

impl ExposureTable {
    /// Evaluate the table for a duration already clamped to the tabulated range.
    pub(crate) fn evaluate(&self, wavelength_nm: f64, duration_s: f64, factors: &CorrectionFactors) -> Dose {
        let t = duration_s;
        if wavelength_nm < 302.5 {
            Dose::Integrated(self.uv_actinic)
        } else if wavelength_nm < 315.0 {
            if t < factors.t1_s {
                Dose::Integrated(self.uv_c1_scale * c1(t))
            } else {
                Dose::Integrated(self.uv_c1_scale * factors.c2)
            }
        } else if wavelength_nm < 400.0 {
            if t <= 10.0 {
                Dose::Integrated(self.uv_c1_scale * c1(t))
            } else if t <= 1e3 {
                Dose::Integrated(self.uva_plateau)
            } else {
                Dose::Rate(self.uva_rate)
            }
        } else if wavelength_nm < 1050.0 {
            // C4 is 1 below 700 nm, C7 is 1 below 1150 nm
            let scale = factors.c4 * factors.c6;
            let thermal = retinal_thermal(
                t,
                self.visible_short * scale,
                1.8e-5,
                self.visible_coefficient * scale,
                factors.t2_s,
            );
            if wavelength_nm < 600.0 && t >= 10.0 {
                let photochemical = if t < 100.0 {
                    Dose::Integrated(self.photochemical_dose * factors.c3)
                } else {
                    Dose::Rate(self.photochemical_rate * factors.c3)
                };
                lower_of(thermal, photochemical, t)
            } else {
                thermal
            }
        } else if wavelength_nm < 1400.0 {
            let scale = factors.c6 * factors.c7;
            retinal_thermal(t, self.nir_short * scale, 5e-5, self.nir_coefficient * scale, factors.t2_s)
        } else if t < 1e-7 {
            Dose::Integrated(self.ir_short)
        } else if t < 10.0 {
            Dose::Integrated(self.ir_coefficient * t.powf(0.25))
        } else {
            Dose::Rate(self.ir_rate)
        }
    }
}

fn retinal_thermal(t: f64, short: f64, short_until_s: f64, coefficient: f64, t2_s: f64) -> Dose {
    if t < short_until_s {
        Dose::Integrated(short)
    } else if t <= t2_s {
        Dose::Integrated(coefficient * t.powf(0.75))
    } else {
        Dose::Rate(coefficient * t2_s.powf(-0.25))
    }
}

/// Dual limit: the more restrictive of two limits compared over the same duration
fn lower_of(a: Dose, b: Dose, duration_s: f64) -> Dose {
    if b.integrated_over(duration_s) < a.integrated_over(duration_s) {
        b
    } else {
        a
    }
}

/// Check the wavelength is covered and clamp the duration to the tabulated range.
pub(crate) fn table_inputs(wavelength_nm: f64, duration_s: f64) -> CalcResult<f64> {
    if !wavelength_nm.is_finite() || wavelength_nm < MIN_WAVELENGTH_NM {
        return Err(CalcError::unsupported_wavelength(wavelength_nm, "below 180 nm"));
    }
    if wavelength_nm > MAX_WAVELENGTH_NM {
        return Err(CalcError::unsupported_wavelength(wavelength_nm, "above 1 mm"));
    }
    if !duration_s.is_finite() || duration_s <= 0.0 {
        return Err(CalcError::invalid_input(
            "duration_s",
            duration_s.to_string(),
            "Duration must be positive and finite",
        ));
    }
    Ok(duration_s.max(MIN_TABLE_DURATION_S))
}

// ============================================================================
// Per-class tables
// ============================================================================

/// Accessible emission limit for `class` at wavelength λ, emission duration t
/// and apparent source subtense α (through `factors`).
///
/// Durations below 1 ns are evaluated at 1 ns.
///
/// # Example
///
/// ```rust
/// use calc_core::iec60825::ael::{accessible_emission_limit, AelClass};
/// use calc_core::iec60825::correction::CorrectionFactors;
///
/// let factors = CorrectionFactors::new(532.0, 1.5);
/// let ael = accessible_emission_limit(AelClass::Class2, 532.0, 0.25, &factors).unwrap();
/// assert!((ael.power_over(0.25) - 1e-3).abs() < 1e-12);
/// ```
pub fn accessible_emission_limit(
    class: AelClass,
    wavelength_nm: f64,
    duration_s: f64,
    factors: &CorrectionFactors,
) -> CalcResult<Ael> {
    let t = table_inputs(wavelength_nm, duration_s)?;
    let visible = (400.0..700.0).contains(&wavelength_nm);

    let ael = match class {
        AelClass::Class1 => class_1(wavelength_nm, t, factors),
        AelClass::Class2 => {
            if visible && t >= 0.25 {
                Ael::watts(1e-3 * factors.c6)
            } else {
                class_1(wavelength_nm, t, factors)
            }
        }
        AelClass::Class3R => {
            if visible && t >= 0.25 {
                Ael::watts(5e-3 * factors.c6)
            } else {
                class_1(wavelength_nm, t, factors).scaled(5.0)
            }
        }
        AelClass::Class3B => class_3b(wavelength_nm, t, factors),
    };
    Ok(ael)
}

fn class_1(wavelength_nm: f64, t: f64, factors: &CorrectionFactors) -> Ael {
    match CLASS_1_TABLE.evaluate(wavelength_nm, t, factors) {
        Dose::Integrated(v) => Ael::joules(v),
        Dose::Rate(v) => Ael::watts(v),
    }
}

fn class_3b(wavelength_nm: f64, t: f64, factors: &CorrectionFactors) -> Ael {
    let short = t < 0.25;
    match wavelength_nm {
        w if w < 302.5 => {
            if short {
                Ael::joules(3.8e-4)
            } else {
                Ael::watts(1.5e-3)
            }
        }
        w if w < 315.0 => {
            if short {
                Ael::joules((1.25e-5 * factors.c2).min(0.125))
            } else {
                Ael::watts((5e-5 * factors.c2).min(0.5))
            }
        }
        w if w < 400.0 => {
            if short {
                Ael::joules(0.125)
            } else {
                Ael::watts(0.5)
            }
        }
        w if w < 1050.0 => {
            // C4 = 1 in the visible
            if short {
                if t < 0.06 * factors.c4 {
                    Ael::joules(0.03 * factors.c4)
                } else {
                    Ael::joules(0.5 * t)
                }
            } else {
                Ael::watts(0.5)
            }
        }
        w if w < 1400.0 => {
            if short {
                Ael::joules(0.15)
            } else {
                Ael::watts(0.5)
            }
        }
        _ => {
            if short {
                Ael::joules(0.125)
            } else {
                Ael::watts(0.5)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ael(class: AelClass, wavelength_nm: f64, t: f64, alpha_mrad: f64) -> Ael {
        let factors = CorrectionFactors::new(wavelength_nm, alpha_mrad);
        accessible_emission_limit(class, wavelength_nm, t, &factors).unwrap()
    }

    #[test]
    fn test_class1_visible_cw_long_exposure() {
        // 7e-4 * T2^-0.25 with T2 = 10 s -> 0.39 mW at 100 s (thermal, 633 nm)
        let limit = ael(AelClass::Class1, 633.0, 100.0, 1.5);
        assert_eq!(limit.unit, AelUnit::Watts);
        assert!((limit.value - 3.936e-4).abs() < 1e-6);
    }

    #[test]
    fn test_class1_photochemical_dual_limit() {
        // At 450 nm / 100 s the photochemical limit (39 µW) is below the thermal one
        let limit = ael(AelClass::Class1, 450.0, 100.0, 1.5);
        assert_eq!(limit.unit, AelUnit::Watts);
        assert!((limit.value - 3.9e-5).abs() < 1e-12);

        // At 580 nm C3 = 10^2.6, thermal wins
        let limit = ael(AelClass::Class1, 580.0, 100.0, 1.5);
        assert!((limit.power_over(100.0) - 3.936e-4).abs() < 1e-6);
    }

    #[test]
    fn test_class1_short_pulse_visible() {
        let limit = ael(AelClass::Class1, 532.0, 1e-8, 1.5);
        assert_eq!(limit, Ael::joules(2e-7));
    }

    #[test]
    fn test_class1_sub_nanosecond_clamped() {
        let clamped = ael(AelClass::Class1, 1550.0, 1e-12, 1.5);
        let at_limit = ael(AelClass::Class1, 1550.0, 1e-9, 1.5);
        assert_eq!(clamped, at_limit);
        assert_eq!(clamped, Ael::joules(8e-5));
    }

    #[test]
    fn test_class1_nir_uses_c4() {
        // 905 nm, 100 s: 7e-4 * C4 * 10^-0.25
        let limit = ael(AelClass::Class1, 905.0, 100.0, 1.5);
        let expected = 7e-4 * 10f64.powf(0.002 * 205.0) * 10f64.powf(-0.25);
        assert!((limit.value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_class1_far_infrared() {
        assert_eq!(ael(AelClass::Class1, 10_600.0, 100.0, 1.5), Ael::watts(1e-2));
        let limit = ael(AelClass::Class1, 1550.0, 1.0, 1.5);
        assert!((limit.value - 4.4e-3).abs() < 1e-12);
    }

    #[test]
    fn test_class1_uv() {
        assert_eq!(ael(AelClass::Class1, 266.0, 3e4, 1.5), Ael::joules(2.4e-5));
        assert_eq!(ael(AelClass::Class1, 355.0, 3e4, 1.5), Ael::watts(7.9e-6));
    }

    #[test]
    fn test_class2_visible_and_fallback() {
        assert_eq!(ael(AelClass::Class2, 650.0, 0.25, 1.5), Ael::watts(1e-3));
        // Extended source raises the Class 2 limit by C6
        let extended = ael(AelClass::Class2, 650.0, 0.25, 15.0);
        assert!((extended.value - 1e-2).abs() < 1e-12);
        // Outside the visible the Class 1 table applies
        assert_eq!(ael(AelClass::Class2, 1550.0, 100.0, 1.5), ael(AelClass::Class1, 1550.0, 100.0, 1.5));
    }

    #[test]
    fn test_class3r_multiplier() {
        assert_eq!(ael(AelClass::Class3R, 532.0, 0.25, 1.5), Ael::watts(5e-3));
        let ir = ael(AelClass::Class3R, 1550.0, 100.0, 1.5);
        assert!((ir.value - 5e-2).abs() < 1e-12);
    }

    #[test]
    fn test_class3b_limits() {
        assert_eq!(ael(AelClass::Class3B, 532.0, 100.0, 1.5), Ael::watts(0.5));
        assert_eq!(ael(AelClass::Class3B, 532.0, 1e-3, 1.5), Ael::joules(0.03));
        let mid = ael(AelClass::Class3B, 532.0, 0.1, 1.5);
        assert!((mid.value - 0.05).abs() < 1e-12);
        assert_eq!(ael(AelClass::Class3B, 1064.0, 1e-3, 1.5), Ael::joules(0.15));
        assert_eq!(ael(AelClass::Class3B, 266.0, 1e-3, 1.5), Ael::joules(3.8e-4));
    }

    #[test]
    fn test_ael_unit_conversion() {
        let limit = Ael::watts(1e-3);
        assert!((limit.energy_over(0.25) - 2.5e-4).abs() < 1e-15);
        let limit = Ael::joules(2e-7);
        assert!((limit.power_over(1e-3) - 2e-4).abs() < 1e-15);
    }

    #[test]
    fn test_class_ordering_at_fixed_wavelength() {
        for wavelength in [266.0, 355.0, 532.0, 905.0, 1064.0, 1550.0, 10_600.0] {
            let t = 100.0;
            let l1 = ael(AelClass::Class1, wavelength, t, 1.5).power_over(t);
            let l3r = ael(AelClass::Class3R, wavelength, t, 1.5).power_over(t);
            let l3b = ael(AelClass::Class3B, wavelength, t, 1.5).power_over(t);
            assert!(l1 <= l3r, "{} nm", wavelength);
            assert!(l3r <= l3b, "{} nm", wavelength);
        }
    }

    #[test]
    fn test_out_of_range_wavelength() {
        let factors = CorrectionFactors::new(150.0, 1.5);
        let err = accessible_emission_limit(AelClass::Class1, 150.0, 1.0, &factors).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_WAVELENGTH");
    }

    #[test]
    fn test_class_serde_names() {
        assert_eq!(serde_json::to_string(&AelClass::Class3R).unwrap(), "\"3R\"");
    }
}
