//! Property-based tests for the optics and RF formulas.
//!
//! Covers: beam growth, aperture coupling, NOHD, optical density,
//! EN 207 scale numbers, C/N cascades and link budgets.

use calc_core::equations::{optics, rf};
use proptest::prelude::*;

// ── Optics ───────────────────────────────────────────────────────────

proptest! {
    /// A diverging beam never shrinks.
    #[test]
    fn beam_grows_with_distance(
        d0 in 0.1f64..50.0,
        div in 0.0f64..10.0,
        z1 in 0.0f64..1e6,
        z2 in 0.0f64..1e6,
    ) {
        let (near, far) = if z1 <= z2 { (z1, z2) } else { (z2, z1) };
        prop_assert!(optics::beam_diameter_at(d0, div, near) <= optics::beam_diameter_at(d0, div, far));
    }

    /// Coupled fraction stays in [0, 1] and grows with the aperture.
    #[test]
    fn coupled_fraction_bounded(
        beam in 0.01f64..100.0,
        a1 in 0.1f64..100.0,
        a2 in 0.1f64..100.0,
    ) {
        let (small, large) = if a1 <= a2 { (a1, a2) } else { (a2, a1) };
        let f_small = optics::coupled_fraction(small, beam);
        let f_large = optics::coupled_fraction(large, beam);
        prop_assert!((0.0..=1.0).contains(&f_small));
        prop_assert!((0.0..=1.0).contains(&f_large));
        prop_assert!(f_small <= f_large);
    }

    /// At the NOHD the beam irradiance equals the MPE.
    #[test]
    fn irradiance_at_nohd_equals_mpe(
        power in 1e-3f64..10.0,
        mpe in 1.0f64..100.0,
        exit_mm in 0.5f64..5.0,
        div_mrad in 0.1f64..5.0,
    ) {
        let exit_m = exit_mm / 1000.0;
        let div_rad = div_mrad / 1000.0;
        let distance = optics::nohd(power, mpe, exit_m, div_rad);
        prop_assert!(distance >= 0.0);
        if distance > 0.0 {
            let diameter = exit_m + distance * div_rad;
            let irradiance = optics::beam_irradiance(power, diameter);
            prop_assert!((irradiance - mpe).abs() <= 1e-6 * mpe);
        }
    }

    /// Attenuating by 10^OD brings the exposure down to the limit.
    #[test]
    fn optical_density_reaches_limit(
        limit in 1e-3f64..1e3,
        factor in 1.0f64..1e8,
    ) {
        let exposure = limit * factor;
        let od = optics::optical_density(exposure, limit);
        prop_assert!(od >= 0.0);
        prop_assert!((exposure / 10f64.powf(od) - limit).abs() <= 1e-6 * limit);
    }

    /// Scale number n brackets the exposure between 10^(n-1) and 10^n times the base.
    #[test]
    fn scale_number_brackets_exposure(
        base in 1e-2f64..1e3,
        factor in 1.0f64..1e9,
    ) {
        let exposure = base * factor;
        let n = optics::scale_number(exposure, base);
        prop_assert!(n >= 1);
        prop_assert!(exposure <= base * 10f64.powi(n as i32) * (1.0 + 1e-9));
        if n > 1 {
            prop_assert!(exposure > base * 10f64.powi(n as i32 - 1) * (1.0 - 1e-9));
        }
    }
}

// ── RF and link budgets ──────────────────────────────────────────────

proptest! {
    /// A cascade is never better than its worst stage.
    #[test]
    fn cascade_below_worst_stage(
        stages in prop::collection::vec(10.0f64..80.0, 1..8),
    ) {
        let total = rf::cascade_cn_db(&stages);
        let worst = stages.iter().cloned().fold(f64::INFINITY, f64::min);
        prop_assert!(total <= worst + 1e-9);
    }

    /// Filling the reach with fiber leaves exactly zero margin.
    #[test]
    fn zero_margin_at_maximum_reach(
        tx in -5.0f64..10.0,
        sensitivity in -40.0f64..-10.0,
        fixed in 0.0f64..10.0,
        safety in 0.0f64..5.0,
        alpha in 0.1f64..4.0,
    ) {
        let budget = rf::power_budget_db(tx, sensitivity);
        let reach = rf::maximum_reach_km(budget, fixed, safety, alpha);
        prop_assert!(reach >= 0.0);
        if reach > 0.0 {
            let margin = rf::link_margin_db(budget, fixed + alpha * reach, safety);
            prop_assert!(margin.abs() < 1e-9);
        }
    }
}
