//! # RF and Link Budget Formulas
//!
//! Noise, level and attenuation formulas for coaxial TV distribution networks
//! and optical fiber links.
//!
//! ## Conventions
//!
//! - Signal levels in dBµV across 75 Ω
//! - Gains positive, losses positive (subtracted by the caller)
//! - C/N in dB, combined in linear power

use crate::constants::BOLTZMANN_J_PER_K;

// =============================================================================
// NOISE
// =============================================================================

/// Thermal noise voltage level across the system impedance.
///
/// # Formula
/// N = 10·log10(k·T·B·R) + 120 dBµV
///
/// 290 K, 8 MHz and 75 Ω give about 3.8 dBµV.
#[inline]
pub fn thermal_noise_floor_dbuv(bandwidth_hz: f64, temperature_k: f64, impedance_ohm: f64) -> f64 {
    10.0 * (BOLTZMANN_J_PER_K * temperature_k * bandwidth_hz * impedance_ohm).log10() + 120.0
}

/// Carrier-to-noise ratio contributed by one amplifier stage.
///
/// # Formula
/// C/N = L_in − N − NF
#[inline]
pub fn amplifier_stage_cn_db(input_level_dbuv: f64, noise_floor_dbuv: f64, noise_figure_db: f64) -> f64 {
    input_level_dbuv - noise_floor_dbuv - noise_figure_db
}

/// Combine independent C/N contributions.
///
/// # Formula
/// C/N_total = −10·log10(Σ 10^(−C/N_i / 10))
///
/// Returns `f64::INFINITY` for an empty chain (no noise added).
pub fn cascade_cn_db(stages_db: &[f64]) -> f64 {
    let sum: f64 = stages_db.iter().map(|cn| 10f64.powf(-cn / 10.0)).sum();
    if sum <= 0.0 {
        f64::INFINITY
    } else {
        -10.0 * sum.log10()
    }
}

// =============================================================================
// ATTENUATION
// =============================================================================

/// Scale a coaxial attenuation to another frequency by the skin-effect law.
///
/// # Formula
/// α(f) = α_ref · √(f / f_ref)
#[inline]
pub fn skin_effect_scaling(attenuation_ref: f64, reference_mhz: f64, frequency_mhz: f64) -> f64 {
    attenuation_ref * (frequency_mhz / reference_mhz).sqrt()
}

/// Interpolate attenuation (dB/100 m) between catalog points, linear in √f.
///
/// Points must be sorted by frequency. Outside the tabulated range the
/// nearest point is scaled by the skin-effect law.
pub fn interpolate_sqrt_f(points: &[(f64, f64)], frequency_mhz: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if frequency_mhz <= first.0 {
        return Some(skin_effect_scaling(first.1, first.0, frequency_mhz));
    }
    if frequency_mhz >= last.0 {
        return Some(skin_effect_scaling(last.1, last.0, frequency_mhz));
    }
    let x = frequency_mhz.sqrt();
    points.windows(2).find_map(|pair| {
        let (f0, a0) = pair[0];
        let (f1, a1) = pair[1];
        if frequency_mhz >= f0 && frequency_mhz <= f1 {
            let (x0, x1) = (f0.sqrt(), f1.sqrt());
            Some(a0 + (a1 - a0) * (x - x0) / (x1 - x0))
        } else {
            None
        }
    })
}

/// Ideal power-split loss of a 1:N splitter.
///
/// # Formula
/// L = 10·log10(N)
#[inline]
pub fn ideal_split_loss_db(outputs: u32) -> f64 {
    10.0 * f64::from(outputs.max(1)).log10()
}

// =============================================================================
// LINK BUDGET
// =============================================================================

/// Power budget between transmitter and receiver sensitivity (dB)
#[inline]
pub fn power_budget_db(transmit_dbm: f64, sensitivity_dbm: f64) -> f64 {
    transmit_dbm - sensitivity_dbm
}

/// Link margin after losses and the safety allowance.
///
/// # Formula
/// M = (P_tx − S) − L_total − M_safety
#[inline]
pub fn link_margin_db(budget_db: f64, total_loss_db: f64, safety_margin_db: f64) -> f64 {
    budget_db - total_loss_db - safety_margin_db
}

/// Longest fiber length the budget can carry (km).
///
/// # Formula
/// L_max = (budget − fixed losses − safety margin) / α
///
/// Returns 0 when fixed losses already exhaust the budget.
#[inline]
pub fn maximum_reach_km(budget_db: f64, fixed_loss_db: f64, safety_margin_db: f64, attenuation_db_per_km: f64) -> f64 {
    if attenuation_db_per_km <= 0.0 {
        return f64::INFINITY;
    }
    ((budget_db - fixed_loss_db - safety_margin_db) / attenuation_db_per_km).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_noise_floor_8mhz() {
        let floor = thermal_noise_floor_dbuv(8e6, 290.0, 75.0);
        assert!((floor - 3.81).abs() < 0.02);
    }

    #[test]
    fn test_amplifier_stage_cn() {
        assert!((amplifier_stage_cn_db(60.0, 3.8, 6.0) - 50.2).abs() < 1e-9);
    }

    #[test]
    fn test_cascade_equal_stages() {
        // Two equal stages lose 3 dB
        let cn = cascade_cn_db(&[40.0, 40.0]);
        assert!((cn - 36.99).abs() < 0.01);
        assert_eq!(cascade_cn_db(&[]), f64::INFINITY);
    }

    #[test]
    fn test_cascade_dominated_by_worst() {
        let cn = cascade_cn_db(&[60.0, 30.0]);
        assert!(cn < 30.0 && cn > 29.9);
    }

    #[test]
    fn test_skin_effect_scaling() {
        // Four times the frequency doubles the attenuation
        assert!((skin_effect_scaling(10.0, 200.0, 800.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_between_points() {
        let points = [(100.0, 4.0), (400.0, 8.0)];
        // √f halfway: f = 225 MHz
        let a = interpolate_sqrt_f(&points, 225.0).unwrap();
        assert!((a - 6.0).abs() < 1e-12);
        // Above the table: skin-effect from the last point
        let a = interpolate_sqrt_f(&points, 1600.0).unwrap();
        assert!((a - 16.0).abs() < 1e-12);
        assert!(interpolate_sqrt_f(&[], 100.0).is_none());
    }

    #[test]
    fn test_split_loss() {
        assert!((ideal_split_loss_db(2) - 3.0103).abs() < 1e-4);
        assert_eq!(ideal_split_loss_db(1), 0.0);
    }

    #[test]
    fn test_link_budget() {
        let budget = power_budget_db(0.0, -28.0);
        assert_eq!(budget, 28.0);
        assert_eq!(link_margin_db(budget, 20.0, 3.0), 5.0);
        assert!((maximum_reach_km(budget, 2.0, 3.0, 0.4) - 57.5).abs() < 1e-9);
        assert_eq!(maximum_reach_km(budget, 30.0, 3.0, 0.4), 0.0);
    }
}
