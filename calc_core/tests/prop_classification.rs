//! Property-based tests for laser classification.
//!
//! Covers: class ordering against power and pulse energy, linearity of emission ratios,
//! and the ordering of aggregation modes.

use calc_core::calculations::classification::{
    aggregate_ratios, calculate, emission_ratio, AggregationMode, ClassificationInput,
};
use calc_core::iec60825::{AelClass, HazardGroup, LaserClass, MeasurementCondition};
use calc_core::laser::WavelengthData;
use calc_core::settings::CalculatorSettings;
use proptest::prelude::*;

fn classify(lines: Vec<WavelengthData>, mode: AggregationMode) -> LaserClass {
    let input = ClassificationInput::new("prop", lines).with_aggregation(mode);
    calculate(&input, &CalculatorSettings::default())
        .expect("valid input classifies")
        .laser_class
}

// ── Power ordering ───────────────────────────────────────────────────

proptest! {
    /// More power never gives a lower class, for point sources and wide beams.
    #[test]
    fn class_non_decreasing_in_power(
        wavelength in 400.0f64..1400.0,
        a in 1e-6f64..10.0,
        b in 1e-6f64..10.0,
        beam_mm in prop_oneof![Just(0.0f64), 0.5f64..30.0],
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let line = |p: f64| WavelengthData::continuous(wavelength, p).with_beam(beam_mm, 0.0);
        let low = classify(vec![line(lo)], AggregationMode::Auto);
        let high = classify(vec![line(hi)], AggregationMode::Auto);
        prop_assert!(low <= high, "{} W -> {}, {} W -> {}", lo, low, hi, high);
    }

    /// More pulse energy never gives a lower class.
    #[test]
    fn pulsed_class_non_decreasing_in_energy(
        wavelength in 400.0f64..1400.0,
        a in 1e-9f64..1e-1,
        b in 1e-9f64..1e-1,
        pulse_width_s in 1e-9f64..1e-6,
        repetition_rate_hz in 1.0f64..1e4,
        beam_mm in prop_oneof![Just(0.0f64), 0.5f64..30.0],
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let line = |e: f64| {
            WavelengthData::pulsed(wavelength, e, pulse_width_s, repetition_rate_hz).with_beam(beam_mm, 0.0)
        };
        let low = classify(vec![line(lo)], AggregationMode::Auto);
        let high = classify(vec![line(hi)], AggregationMode::Auto);
        prop_assert!(low <= high, "{} J -> {}, {} J -> {}", lo, low, hi, high);
    }

    /// CW emission ratios scale linearly with power.
    #[test]
    fn cw_ratio_linear_in_power(
        wavelength in 400.0f64..1400.0,
        power in 1e-5f64..1.0,
        scale in 1.0f64..100.0,
    ) {
        let base = WavelengthData::continuous(wavelength, power);
        let scaled = WavelengthData::continuous(wavelength, power * scale);
        for condition in MeasurementCondition::ALL {
            let r1 = emission_ratio(AelClass::Class1, &base, condition, 100.0).unwrap();
            let r2 = emission_ratio(AelClass::Class1, &scaled, condition, 100.0).unwrap();
            if let (Some(r1), Some(r2)) = (r1, r2) {
                prop_assert!((r2.ratio - scale * r1.ratio).abs() <= 1e-9 * r2.ratio.max(1.0));
            }
        }
    }
}

// ── Aggregation ──────────────────────────────────────────────────────

proptest! {
    /// Independent <= Auto <= Additive for any set of ratios.
    #[test]
    fn aggregation_modes_ordered(
        ratios in prop::collection::vec((0usize..HazardGroup::ALL.len(), 0.0f64..5.0), 1..6),
    ) {
        let ratios: Vec<(HazardGroup, f64)> = ratios
            .into_iter()
            .map(|(g, r)| (HazardGroup::ALL[g], r))
            .collect();
        let independent = aggregate_ratios(AggregationMode::Independent, &ratios).unwrap();
        let auto = aggregate_ratios(AggregationMode::Auto, &ratios).unwrap();
        let additive = aggregate_ratios(AggregationMode::Additive, &ratios).unwrap();
        prop_assert!(independent <= auto + 1e-12);
        prop_assert!(auto <= additive + 1e-12);
    }

    /// Summing visible lines never gives a lower class than treating them separately.
    #[test]
    fn additive_class_not_below_independent(
        p1 in 1e-5f64..5e-3,
        p2 in 1e-5f64..5e-3,
    ) {
        let lines = || vec![WavelengthData::continuous(532.0, p1), WavelengthData::continuous(635.0, p2)];
        let independent = classify(lines(), AggregationMode::Independent);
        let additive = classify(lines(), AggregationMode::Additive);
        prop_assert!(additive >= independent);
    }
}
