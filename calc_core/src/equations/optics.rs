//! # Beam Optics Formulas
//!
//! Beam propagation, aperture coupling and exposure formulas shared by the
//! classification, NOHD and eyewear calculators.
//!
//! ## Notation
//!
//! - `d0` = Beam diameter at the exit aperture (d63)
//! - `φ` = Full-angle beam divergence (d63)
//! - `z` = Distance from the exit aperture
//! - `D` = Measurement (or limiting) aperture diameter
//! - `P` = Power, `E` = irradiance, `H` = radiant exposure
//!
//! All beam diameters are 1/e (63 % power) diameters of a Gaussian profile.
//!
//! ## References
//!
//! - IEC 60825-1:2007 Clause 9.3 (measurement apertures)
//! - IEC/TR 60825-14:2004 Clause 8.3 (NOHD)
//! - EN 207:2009 Annex B (scale numbers)

use std::f64::consts::PI;

// =============================================================================
// BEAM PROPAGATION
// =============================================================================

/// Beam diameter at distance z for a linearly diverging beam.
///
/// # Formula
/// d(z) = d0 + z·φ
///
/// Millimetres and milliradians give millimetres (mm·mrad/1000 = mm).
#[inline]
pub fn beam_diameter_at(d0_mm: f64, divergence_mrad: f64, distance_mm: f64) -> f64 {
    d0_mm + distance_mm * divergence_mrad / 1000.0
}

/// Fraction of a Gaussian beam's power passing a circular aperture.
///
/// # Formula
/// η = 1 − exp(−(D/d)²)
///
/// A zero-diameter beam is fully collected.
#[inline]
pub fn coupled_fraction(aperture_mm: f64, beam_diameter_mm: f64) -> f64 {
    if beam_diameter_mm <= 0.0 {
        return 1.0;
    }
    1.0 - (-(aperture_mm / beam_diameter_mm).powi(2)).exp()
}

/// Area of a circle of diameter d (m²)
#[inline]
pub fn circle_area_m2(diameter_m: f64) -> f64 {
    PI * diameter_m * diameter_m / 4.0
}

/// Mean irradiance of a beam of power P over its d63 diameter.
///
/// # Formula
/// E = 4P / (πd²)
#[inline]
pub fn beam_irradiance(power_w: f64, diameter_m: f64) -> f64 {
    4.0 * power_w / (PI * diameter_m * diameter_m)
}

/// Exposure at the eye, averaged over the limiting aperture.
///
/// A beam smaller than the aperture is averaged over the aperture area (the
/// pupil collects η of the power); a larger beam uses its own mean irradiance.
/// Works for both power (→ W/m²) and energy (→ J/m²).
pub fn aperture_averaged_exposure(quantity: f64, beam_diameter_m: f64, aperture_m: f64) -> f64 {
    if beam_diameter_m < aperture_m {
        let eta = coupled_fraction(aperture_m, beam_diameter_m);
        quantity * eta / circle_area_m2(aperture_m)
    } else {
        beam_irradiance(quantity, beam_diameter_m)
    }
}

// =============================================================================
// HAZARD DISTANCE
// =============================================================================

/// Nominal ocular hazard distance.
///
/// # Formula (IEC/TR 60825-14, 8.3)
/// NOHD = (√(4P / (π·E_MPE)) − a) / φ
///
/// # Arguments
/// * `power_w` - Power (or energy) in the beam
/// * `mpe` - MPE in the matching unit (W/m² or J/m²)
/// * `exit_diameter_m` - Beam diameter at the exit aperture
/// * `divergence_rad` - Full-angle divergence
///
/// # Returns
/// Distance in metres, 0 when the beam is below the MPE at the exit aperture.
#[inline]
pub fn nohd(power_w: f64, mpe: f64, exit_diameter_m: f64, divergence_rad: f64) -> f64 {
    let hazard_diameter = (4.0 * power_w / (PI * mpe)).sqrt();
    ((hazard_diameter - exit_diameter_m) / divergence_rad).max(0.0)
}

/// Power gain from viewing through an optical aid.
///
/// # Formula
/// G = min(M², max(1, (D_obj / d0)²))
///
/// The aid cannot collect more than its objective intercepts, and cannot
/// concentrate more than its magnification squared. A beam of unknown
/// (zero) diameter is fully intercepted, so M² applies.
#[inline]
pub fn optical_aid_gain(magnification: f64, objective_diameter_mm: f64, beam_diameter_mm: f64) -> f64 {
    let m2 = magnification * magnification;
    if beam_diameter_mm <= 0.0 {
        return m2.max(1.0);
    }
    let collection = (objective_diameter_mm / beam_diameter_mm).powi(2).max(1.0);
    m2.min(collection).max(1.0)
}

// =============================================================================
// EYE PROTECTION
// =============================================================================

/// Required optical density.
///
/// # Formula
/// OD = max(0, log10(H / MPE))
#[inline]
pub fn optical_density(exposure: f64, limit: f64) -> f64 {
    if exposure <= 0.0 || limit <= 0.0 {
        return 0.0;
    }
    (exposure / limit).log10().max(0.0)
}

/// EN 207 scale number for an exposure and the LB0 base value.
///
/// # Formula (EN 207, Annex B)
/// n = max(1, ⌈log10(E / base)⌉)
#[inline]
pub fn scale_number(exposure: f64, base: f64) -> u32 {
    if exposure <= base {
        return 1;
    }
    let n = (exposure / base).log10().ceil();
    n.max(1.0) as u32
}
