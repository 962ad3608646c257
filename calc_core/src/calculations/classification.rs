//! # Laser Classification
//!
//! Assigns an IEC 60825-1 class to a laser product with one or more emitted
//! wavelengths.
//!
//! ## Procedure
//!
//! 1. For each base class K (1, 2, 3R, 3B), each active wavelength and each
//!    measurement condition, compute the emission ratio AE/AEL. Pulsed
//!    emission takes the largest ratio of the single-pulse, average-power and
//!    pulse-train rules.
//! 2. Combine the per-wavelength ratios of each condition according to the
//!    [`AggregationMode`].
//! 3. Walk the class ladder 1 → 1M → 2 → 2M → 3R → 3B and stop at the first
//!    class whose conditions all have a ratio ≤ 1; otherwise Class 4.
//!
//! Every ratio is linear in power, so raising the output never lowers the
//! class.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::classification::{calculate, ClassificationInput};
//! use calc_core::iec60825::LaserClass;
//! use calc_core::laser::WavelengthData;
//! use calc_core::settings::CalculatorSettings;
//!
//! let input = ClassificationInput::new("Green pointer", vec![WavelengthData::continuous(532.0, 0.8e-3)]);
//! let result = calculate(&input, &CalculatorSettings::default()).unwrap();
//! assert_eq!(result.laser_class, LaserClass::Class2);
//! ```

use serde::{Deserialize, Serialize};

use super::steps::{CalculationStep, StepLog};
use crate::constants::{MAX_TABLE_DURATION_S, MIN_TABLE_DURATION_S};
use crate::equations::registry::Equation;
use crate::errors::{CalcError, CalcResult};
use crate::iec60825::ael::{accessible_emission_limit, AelClass, AelUnit};
use crate::iec60825::conditions::MeasurementCondition;
use crate::iec60825::correction::{self, CorrectionFactors, ALPHA_MIN_MRAD};
use crate::iec60825::{is_visible, HazardGroup, LaserClass};
use crate::laser::{Emission, LaserType, WavelengthData};
use crate::settings::{CalculatorSettings, ClassificationSettings};

// ============================================================================
// Input
// ============================================================================

/// How emission ratios of different wavelengths combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AggregationMode {
    /// Sum within each hazard group, maximum across groups
    #[default]
    Auto,
    /// Sum every wavelength
    Additive,
    /// Treat every wavelength on its own (maximum)
    Independent,
}

impl AggregationMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            AggregationMode::Auto => "Additive within hazard groups",
            AggregationMode::Additive => "Fully additive",
            AggregationMode::Independent => "Independent",
        }
    }
}

/// Input for a classification.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "RGB projector",
///   "wavelengths": [
///     { "wavelength_nm": 450.0, "emission": { "type": "ContinuousWave", "power_w": 0.002 } },
///     { "wavelength_nm": 638.0, "emission": { "type": "ContinuousWave", "power_w": 0.002 } }
///   ],
///   "aggregation": "Auto"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationInput {
    pub label: String,
    pub wavelengths: Vec<WavelengthData>,
    /// Falls back to the settings default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationMode>,
    /// Overrides the per-class time base (s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_base_s: Option<f64>,
}

impl ClassificationInput {
    pub fn new(label: impl Into<String>, wavelengths: Vec<WavelengthData>) -> Self {
        ClassificationInput {
            label: label.into(),
            wavelengths,
            aggregation: None,
            time_base_s: None,
        }
    }

    pub fn with_aggregation(mut self, mode: AggregationMode) -> Self {
        self.aggregation = Some(mode);
        self
    }

    pub fn with_time_base(mut self, time_base_s: f64) -> Self {
        self.time_base_s = Some(time_base_s);
        self
    }

    /// Wavelengths that take part in the evaluation
    pub fn active_wavelengths(&self) -> impl Iterator<Item = &WavelengthData> {
        self.wavelengths.iter().filter(|w| w.active)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.wavelengths.is_empty() {
            return Err(CalcError::missing_field("wavelengths"));
        }
        if self.active_wavelengths().next().is_none() {
            return Err(CalcError::invalid_input(
                "wavelengths",
                format!("{} entries", self.wavelengths.len()),
                "At least one wavelength must be active",
            ));
        }
        for (i, wavelength) in self.wavelengths.iter().enumerate() {
            if wavelength.active {
                wavelength.validate(&format!("wavelengths[{}]", i))?;
            }
        }
        if let Some(t) = self.time_base_s {
            if !t.is_finite() || t <= 0.0 || t > MAX_TABLE_DURATION_S {
                return Err(CalcError::invalid_input(
                    "time_base_s",
                    t.to_string(),
                    "Time base must be positive and at most 30000 s",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Emission ratios
// ============================================================================

/// Rule under which a ratio was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PulseRule {
    /// CW power over the time base
    ContinuousWave,
    /// Rule 1: energy of a single pulse
    SinglePulse,
    /// Rule 2: average power over the time base
    AveragePower,
    /// Rule 3: pulse energy against the C5-reduced single-pulse limit
    PulseTrain,
}

impl PulseRule {
    pub fn display_name(&self) -> &'static str {
        match self {
            PulseRule::ContinuousWave => "CW",
            PulseRule::SinglePulse => "Rule 1 (single pulse)",
            PulseRule::AveragePower => "Rule 2 (average power)",
            PulseRule::PulseTrain => "Rule 3 (pulse train)",
        }
    }
}

/// Ratio of the accessible emission to the limit under one rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionRatio {
    pub rule: PulseRule,
    /// Duration the limit was evaluated for (s)
    pub duration_s: f64,
    /// Fraction of the beam collected by the measurement aperture
    pub coupled_fraction: f64,
    /// Accessible emission in `unit`
    pub accessible_emission: f64,
    /// Limit in `unit`
    pub limit: f64,
    pub unit: AelUnit,
    pub ratio: f64,
}

impl EmissionRatio {
    fn new(rule: PulseRule, duration_s: f64, coupled_fraction: f64, emission: f64, limit: f64, unit: AelUnit) -> Self {
        EmissionRatio {
            rule,
            duration_s,
            coupled_fraction,
            accessible_emission: emission,
            limit,
            unit,
            ratio: emission / limit,
        }
    }
}

/// Effective pulses of a repetitive train inside the time base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseTrain {
    /// Pulses emitted within the time base
    pub pulse_count: f64,
    /// Energy of one effective pulse (J)
    pub energy_j: f64,
    /// Duration of one effective pulse (s)
    pub duration_s: f64,
    /// Effective pulses after merging within Ti
    pub effective_count: f64,
    /// Whether pulses closer than Ti were merged
    pub merged: bool,
}

/// Count the pulses in the time base and merge those closer than Ti.
///
/// N = f·min(T, T2) in the retinal region, f·T elsewhere. When the pulse
/// period is shorter than Ti, the f·Ti pulses inside each Ti window act as one
/// pulse of energy E·f·Ti and duration Ti.
pub fn pulse_train(
    wavelength_nm: f64,
    pulse_energy_j: f64,
    pulse_width_s: f64,
    repetition_rate_hz: f64,
    time_base_s: f64,
    factors: &CorrectionFactors,
) -> PulseTrain {
    let window = if correction::is_retinal(wavelength_nm) {
        time_base_s.min(factors.t2_s)
    } else {
        time_base_s
    };
    let pulse_count = repetition_rate_hz * window;

    match correction::ti(wavelength_nm) {
        Some(ti) if repetition_rate_hz * ti > 1.0 => {
            let per_window = repetition_rate_hz * ti;
            PulseTrain {
                pulse_count,
                energy_j: pulse_energy_j * per_window,
                duration_s: ti,
                effective_count: pulse_count / per_window,
                merged: true,
            }
        }
        _ => PulseTrain {
            pulse_count,
            energy_j: pulse_energy_j,
            duration_s: pulse_width_s,
            effective_count: pulse_count,
            merged: false,
        },
    }
}

/// Governing emission ratio of one wavelength for one class and condition.
///
/// Returns `None` when the condition does not apply at this wavelength.
pub fn emission_ratio(
    class: AelClass,
    laser: &WavelengthData,
    condition: MeasurementCondition,
    time_base_s: f64,
) -> CalcResult<Option<EmissionRatio>> {
    let wl = laser.wavelength_nm;
    if !condition.applies_to(wl) {
        return Ok(None);
    }
    let factors = CorrectionFactors::new(wl, laser.source_subtense_mrad);
    let coupling =
        |duration_s: f64| condition.coupled_fraction(wl, duration_s, laser.beam_diameter_mm, laser.divergence_mrad);

    let mut candidates = Vec::with_capacity(3);
    match laser.emission {
        Emission::ContinuousWave { power_w } => {
            let ael = accessible_emission_limit(class, wl, time_base_s, &factors)?;
            let eta = coupling(time_base_s);
            candidates.push(EmissionRatio::new(
                PulseRule::ContinuousWave,
                time_base_s,
                eta,
                power_w * eta,
                ael.power_over(time_base_s),
                AelUnit::Watts,
            ));
        }
        Emission::Pulsed {
            pulse_energy_j,
            pulse_width_s,
            repetition_rate_hz,
        } => {
            let t = pulse_width_s.max(MIN_TABLE_DURATION_S);
            let ael = accessible_emission_limit(class, wl, t, &factors)?;
            let eta = coupling(t);
            candidates.push(EmissionRatio::new(
                PulseRule::SinglePulse,
                t,
                eta,
                pulse_energy_j * eta,
                ael.energy_over(t),
                AelUnit::Joules,
            ));

            let ael = accessible_emission_limit(class, wl, time_base_s, &factors)?;
            let eta = coupling(time_base_s);
            candidates.push(EmissionRatio::new(
                PulseRule::AveragePower,
                time_base_s,
                eta,
                laser.average_power_w(time_base_s) * eta,
                ael.power_over(time_base_s),
                AelUnit::Watts,
            ));

            if wl >= 400.0 && class.uses_pulse_train_rule() && repetition_rate_hz > 0.0 {
                let train = pulse_train(wl, pulse_energy_j, pulse_width_s, repetition_rate_hz, time_base_s, &factors);
                let t_eff = train.duration_s.max(MIN_TABLE_DURATION_S);
                let ael = accessible_emission_limit(class, wl, t_eff, &factors)?;
                let eta = coupling(t_eff);
                candidates.push(EmissionRatio::new(
                    PulseRule::PulseTrain,
                    t_eff,
                    eta,
                    train.energy_j * eta,
                    ael.energy_over(t_eff) * correction::c5(train.effective_count),
                    AelUnit::Joules,
                ));
            }
        }
    }

    Ok(candidates.into_iter().max_by(|a, b| a.ratio.total_cmp(&b.ratio)))
}

/// Combine per-wavelength ratios of one condition.
///
/// Returns `None` when no wavelength contributed.
pub fn aggregate_ratios(mode: AggregationMode, ratios: &[(HazardGroup, f64)]) -> Option<f64> {
    if ratios.is_empty() {
        return None;
    }
    let total = match mode {
        AggregationMode::Additive => ratios.iter().map(|(_, r)| r).sum::<f64>(),
        AggregationMode::Independent => ratios.iter().map(|(_, r)| *r).fold(f64::NEG_INFINITY, f64::max),
        AggregationMode::Auto => HazardGroup::ALL
            .iter()
            .map(|group| ratios.iter().filter(|(g, _)| g == group).map(|(_, r)| r).sum::<f64>())
            .fold(f64::NEG_INFINITY, f64::max),
    };
    Some(total)
}

/// Time base (s) used when evaluating `class` at wavelength λ.
pub fn time_base_s(
    class: AelClass,
    wavelength_nm: f64,
    override_s: Option<f64>,
    settings: &ClassificationSettings,
) -> f64 {
    if let Some(t) = override_s {
        return t;
    }
    if wavelength_nm < 400.0 {
        settings.ultraviolet_time_base_s
    } else if is_visible(wavelength_nm) && matches!(class, AelClass::Class2 | AelClass::Class3R) {
        settings.aversion_time_base_s
    } else {
        settings.default_time_base_s
    }
}

// ============================================================================
// Result
// ============================================================================

/// Ratio of one wavelength for one base class and condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRatio {
    pub ael_class: AelClass,
    pub condition: MeasurementCondition,
    pub time_base_s: f64,
    /// `None` when the condition does not apply at this wavelength
    pub governing: Option<EmissionRatio>,
}

/// Everything computed for one active wavelength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavelengthEvaluation {
    pub wavelength_id: String,
    pub wavelength_nm: f64,
    pub laser_type: LaserType,
    pub hazard_group: HazardGroup,
    pub factors: CorrectionFactors,
    pub ratios: Vec<ConditionRatio>,
}

impl WavelengthEvaluation {
    /// Ratio for a class and condition, if the condition applies
    pub fn ratio(&self, class: AelClass, condition: MeasurementCondition) -> Option<f64> {
        self.ratios
            .iter()
            .find(|r| r.ael_class == class && r.condition == condition)
            .and_then(|r| r.governing.map(|g| g.ratio))
    }
}

/// Aggregated ratio of one condition against one base-class table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionOutcome {
    pub condition: MeasurementCondition,
    pub ael_class: AelClass,
    /// `None` when the condition applies to no wavelength
    pub ratio: Option<f64>,
}

impl ConditionOutcome {
    /// Not-applicable conditions pass
    pub fn passes(&self) -> bool {
        self.ratio.map_or(true, |r| r <= 1.0)
    }

    fn describe(&self) -> String {
        match self.ratio {
            Some(r) => format!("{} vs {} AEL: ratio {:.3}", short_condition(self.condition), self.ael_class, r),
            None => format!("{} not applicable", short_condition(self.condition)),
        }
    }
}

fn short_condition(condition: MeasurementCondition) -> &'static str {
    match condition {
        MeasurementCondition::Condition1 => "Condition 1",
        MeasurementCondition::Condition3 => "Condition 3",
    }
}

/// Outcome of testing one rung of the class ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCheck {
    pub class: LaserClass,
    /// Wavelength prerequisites of the class (visible for 2/2M, 302.5–4000 nm for 1M/2M)
    pub prerequisite_met: bool,
    pub outcomes: Vec<ConditionOutcome>,
    pub passed: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub laser_class: LaserClass,
    pub aggregation: AggregationMode,
    /// Ladder checks in the order they were made
    pub checks: Vec<ClassCheck>,
    pub evaluations: Vec<WavelengthEvaluation>,
    pub steps: Vec<CalculationStep>,
    pub equations_used: Vec<Equation>,
    pub warnings: Vec<String>,
}

impl ClassificationResult {
    /// The check that decided the class
    pub fn deciding_check(&self) -> Option<&ClassCheck> {
        self.checks.iter().find(|c| c.class == self.laser_class)
    }

    /// Largest aggregated ratio of the assigned class (headroom below 1)
    pub fn governing_ratio(&self) -> Option<f64> {
        self.deciding_check()?
            .outcomes
            .iter()
            .filter_map(|o| o.ratio)
            .reduce(f64::max)
    }
}

// ============================================================================
// Calculation
// ============================================================================

/// Aggregated ratios of every base class, by condition.
struct RatioTable {
    entries: Vec<ConditionOutcome>,
}

impl RatioTable {
    fn outcome(&self, class: AelClass, condition: MeasurementCondition) -> ConditionOutcome {
        self.entries
            .iter()
            .copied()
            .find(|o| o.ael_class == class && o.condition == condition)
            .unwrap_or(ConditionOutcome {
                condition,
                ael_class: class,
                ratio: None,
            })
    }
}

/// Classify a laser product.
pub fn calculate(input: &ClassificationInput, settings: &CalculatorSettings) -> CalcResult<ClassificationResult> {
    input.validate()?;

    let mode = input.aggregation.unwrap_or(settings.classification.default_aggregation);
    let mut log = StepLog::new(&input.label);
    let mut warnings = Vec::new();

    log.note(
        "Aggregation",
        format!("{} ({} active wavelengths)", mode.display_name(), input.active_wavelengths().count()),
    );

    let mut evaluations = Vec::new();
    for laser in input.active_wavelengths() {
        evaluations.push(evaluate_wavelength(input, laser, settings, &mut log, &mut warnings)?);
    }

    let skipped = input.wavelengths.len() - evaluations.len();
    if skipped > 0 {
        log.note("Inactive wavelengths", format!("{} wavelength(s) excluded", skipped));
    }

    if mode == AggregationMode::Auto && evaluations.len() > 1 {
        log.uses(Equation::HazardGroupAdditivity, "Auto aggregation");
    }
    let table = aggregate(&evaluations, mode);

    let has_visible = evaluations.iter().any(|e| is_visible(e.wavelength_nm));
    let magnifiable = evaluations
        .iter()
        .any(|e| MeasurementCondition::Condition1.applies_to(e.wavelength_nm));

    let mut checks = Vec::new();
    let mut laser_class = LaserClass::Class4;
    for class in LaserClass::ALL {
        let check = check_class(class, &table, has_visible, magnifiable);
        tracing::debug!(
            label = %input.label,
            class = class.code(),
            passed = check.passed,
            reason = %check.reason,
            "class check"
        );
        log.note(format!("{} check", class), check.reason.clone());
        let passed = check.passed;
        checks.push(check);
        if passed {
            laser_class = class;
            break;
        }
    }

    log.note("Classification", format!("{}", laser_class));
    let (steps, equations_used) = log.finish();

    Ok(ClassificationResult {
        label: input.label.clone(),
        laser_class,
        aggregation: mode,
        checks,
        evaluations,
        steps,
        equations_used,
        warnings,
    })
}

fn evaluate_wavelength(
    input: &ClassificationInput,
    laser: &WavelengthData,
    settings: &CalculatorSettings,
    log: &mut StepLog,
    warnings: &mut Vec<String>,
) -> CalcResult<WavelengthEvaluation> {
    let wl = laser.wavelength_nm;
    let factors = CorrectionFactors::new(wl, laser.source_subtense_mrad);
    log.note(format!("{} nm", wl), format!("{}; {}", laser.summary(), factors.summary()));
    record_factor_equations(laser, &factors, log);

    if let Emission::Pulsed { pulse_width_s, .. } = laser.emission {
        if pulse_width_s < MIN_TABLE_DURATION_S {
            tracing::warn!(
                wavelength_nm = wl,
                pulse_width_s,
                "pulse shorter than 1 ns evaluated with 1 ns limits"
            );
            warnings.push(format!(
                "{} nm: pulse width {:.2e} s is below 1 ns; the 1 ns limits were used",
                wl, pulse_width_s
            ));
        }
    }
    if laser.beam_diameter_mm <= 0.0 {
        log.note(format!("{} nm beam", wl), "no beam diameter given, full power assumed in every aperture");
    } else {
        log.uses(Equation::ApertureCoupledFraction, format!("{} nm", wl));
        log.uses(Equation::BeamDiameterAtDistance, format!("{} nm", wl));
        log.uses(Equation::LimitingAperture, format!("{} nm", wl));
    }

    let mut ratios = Vec::with_capacity(AelClass::ALL.len() * MeasurementCondition::ALL.len());
    for class in AelClass::ALL {
        let t = time_base_s(class, wl, input.time_base_s, &settings.classification);
        log.uses(Equation::AccessibleEmissionLimit, format!("{} nm {} T = {} s", wl, class, t));

        if let Emission::Pulsed {
            pulse_energy_j,
            pulse_width_s,
            repetition_rate_hz,
        } = laser.emission
        {
            if wl >= 400.0 && class.uses_pulse_train_rule() && repetition_rate_hz > 0.0 {
                let train = pulse_train(wl, pulse_energy_j, pulse_width_s, repetition_rate_hz, t, &factors);
                log.computed(
                    Equation::PulseCount,
                    format!("{} nm {} pulse count", wl, class),
                    format!("N = f·T over {} s", t),
                    train.pulse_count,
                    "pulses",
                );
                if train.merged {
                    log.computed(
                        Equation::PulseMerging,
                        format!("{} nm {} merged pulses", wl, class),
                        format!("pulses within Ti = {:.1e} s act as one", train.duration_s),
                        train.effective_count,
                        "pulses",
                    );
                }
                log.uses(Equation::PulseTrainCorrectionC5, format!("{} nm {}", wl, class));
            }
        }

        for condition in MeasurementCondition::ALL {
            let governing = emission_ratio(class, laser, condition, t)?;
            if let Some(g) = governing {
                tracing::trace!(
                    wavelength_nm = wl,
                    class = %class,
                    condition = ?condition,
                    rule = g.rule.display_name(),
                    ratio = g.ratio,
                    "emission ratio"
                );
                log.computed(
                    Equation::EmissionRatio,
                    format!("{} nm {} {}", wl, class, short_condition(condition)),
                    format!(
                        "{}: {:.3e} / {:.3e} {}, η = {:.3}",
                        g.rule.display_name(),
                        g.accessible_emission,
                        g.limit,
                        match g.unit {
                            AelUnit::Joules => "J",
                            AelUnit::Watts => "W",
                        },
                        g.coupled_fraction
                    ),
                    g.ratio,
                    "-",
                );
            }
            ratios.push(ConditionRatio {
                ael_class: class,
                condition,
                time_base_s: t,
                governing,
            });
        }
    }

    Ok(WavelengthEvaluation {
        wavelength_id: laser.id.clone(),
        wavelength_nm: wl,
        laser_type: laser.laser_type(),
        hazard_group: HazardGroup::for_wavelength(wl),
        factors,
        ratios,
    })
}

fn record_factor_equations(laser: &WavelengthData, factors: &CorrectionFactors, log: &mut StepLog) {
    let wl = laser.wavelength_nm;
    let context = format!("{} nm", wl);
    if (302.5..400.0).contains(&wl) {
        log.uses(Equation::UltravioletCorrectionC1, context.clone());
    }
    if (400.0..600.0).contains(&wl) {
        log.uses(Equation::BlueLightCorrectionC3, context.clone());
        log.uses(Equation::DualLimit, context.clone());
    }
    if (700.0..1400.0).contains(&wl) {
        log.uses(Equation::NearInfraredCorrectionC4, context.clone());
    }
    if correction::is_retinal(wl) {
        if laser.source_subtense_mrad > ALPHA_MIN_MRAD {
            log.uses(Equation::ExtendedSourceCorrectionC6, context.clone());
        }
        log.uses(Equation::ThermalBreakpointT2, format!("{} (T2 = {:.2} s)", context, factors.t2_s));
    }
}

fn aggregate(evaluations: &[WavelengthEvaluation], mode: AggregationMode) -> RatioTable {
    let mut entries = Vec::new();
    for class in AelClass::ALL {
        for condition in MeasurementCondition::ALL {
            let ratios: Vec<(HazardGroup, f64)> = evaluations
                .iter()
                .filter_map(|e| e.ratio(class, condition).map(|r| (e.hazard_group, r)))
                .collect();
            entries.push(ConditionOutcome {
                condition,
                ael_class: class,
                ratio: aggregate_ratios(mode, &ratios),
            });
        }
    }
    RatioTable { entries }
}

fn check_class(class: LaserClass, table: &RatioTable, has_visible: bool, magnifiable: bool) -> ClassCheck {
    use MeasurementCondition::{Condition1, Condition3};

    let (needs_visible, needs_magnifiable, outcomes) = match class {
        LaserClass::Class1 => (
            false,
            false,
            vec![
                table.outcome(AelClass::Class1, Condition1),
                table.outcome(AelClass::Class1, Condition3),
            ],
        ),
        LaserClass::Class1M => (
            false,
            true,
            vec![
                table.outcome(AelClass::Class3B, Condition1),
                table.outcome(AelClass::Class1, Condition3),
            ],
        ),
        LaserClass::Class2 => (
            true,
            false,
            vec![
                table.outcome(AelClass::Class2, Condition1),
                table.outcome(AelClass::Class2, Condition3),
            ],
        ),
        LaserClass::Class2M => (
            true,
            true,
            vec![
                table.outcome(AelClass::Class3B, Condition1),
                table.outcome(AelClass::Class2, Condition3),
            ],
        ),
        LaserClass::Class3R => (
            false,
            false,
            vec![
                table.outcome(AelClass::Class3R, Condition1),
                table.outcome(AelClass::Class3R, Condition3),
            ],
        ),
        LaserClass::Class3B => (
            false,
            false,
            vec![
                table.outcome(AelClass::Class3B, Condition1),
                table.outcome(AelClass::Class3B, Condition3),
            ],
        ),
        LaserClass::Class4 => {
            return ClassCheck {
                class,
                prerequisite_met: true,
                outcomes: Vec::new(),
                passed: true,
                reason: "Accessible emission exceeds the Class 3B limits".to_string(),
            }
        }
    };

    let mut missing = Vec::new();
    if needs_visible && !has_visible {
        missing.push("no visible wavelength");
    }
    if needs_magnifiable && !magnifiable {
        missing.push("no wavelength in 302.5–4000 nm");
    }
    let prerequisite_met = missing.is_empty();
    if !prerequisite_met {
        return ClassCheck {
            class,
            prerequisite_met,
            outcomes,
            passed: false,
            reason: format!("Not applicable: {}", missing.join("; ")),
        };
    }

    let passed = outcomes.iter().all(ConditionOutcome::passes);
    let detail = outcomes.iter().map(ConditionOutcome::describe).collect::<Vec<_>>().join("; ");
    let reason = if passed {
        format!("Within limits: {}", detail)
    } else {
        format!("Exceeded: {}", detail)
    };

    ClassCheck {
        class,
        prerequisite_met,
        outcomes,
        passed,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(wavelengths: Vec<WavelengthData>) -> ClassificationResult {
        calculate(&ClassificationInput::new("test", wavelengths), &CalculatorSettings::default()).unwrap()
    }

    #[test]
    fn test_visible_cw_ladder() {
        // Class 1 at 100 s: 7e-4 * 10^-0.25 = 0.394 mW
        assert_eq!(classify(vec![WavelengthData::continuous(532.0, 0.3e-3)]).laser_class, LaserClass::Class1);
        assert_eq!(classify(vec![WavelengthData::continuous(532.0, 0.5e-3)]).laser_class, LaserClass::Class2);
        assert_eq!(classify(vec![WavelengthData::continuous(532.0, 3e-3)]).laser_class, LaserClass::Class3R);
        assert_eq!(classify(vec![WavelengthData::continuous(532.0, 0.1)]).laser_class, LaserClass::Class3B);
        assert_eq!(classify(vec![WavelengthData::continuous(532.0, 1.0)]).laser_class, LaserClass::Class4);
    }

    #[test]
    fn test_invisible_cannot_be_class_2() {
        // 1064 nm, 100 mW: Class 1 is 2 mW at 100 s, so this lands in 3B
        let result = classify(vec![WavelengthData::continuous(1064.0, 0.1)]);
        let class2 = result.checks.iter().find(|c| c.class == LaserClass::Class2).unwrap();
        assert!(!class2.prerequisite_met);
        assert!(!class2.passed);
        assert_ne!(result.laser_class, LaserClass::Class2);
    }

    #[test]
    fn test_class_1m_large_beam() {
        // 1550 nm, 50 mW in a 20 mm beam: Condition 3 collects 3 % through 3.5 mm
        let laser = WavelengthData::continuous(1550.0, 0.05).with_beam(20.0, 0.0);
        let result = classify(vec![laser]);
        assert_eq!(result.laser_class, LaserClass::Class1M);

        let class1 = &result.checks[0];
        assert_eq!(class1.class, LaserClass::Class1);
        assert!(!class1.passed);
        assert!(result.deciding_check().unwrap().passed);
    }

    #[test]
    fn test_class_2m_large_visible_beam() {
        // 532 nm, 5 mW in a 20 mm beam: 7 mm at 100 mm collects 11.5 % (0.58 mW)
        let laser = WavelengthData::continuous(532.0, 5e-3).with_beam(20.0, 0.0);
        let result = classify(vec![laser]);
        assert_eq!(result.laser_class, LaserClass::Class2M);

        let classes: Vec<LaserClass> = result.checks.iter().map(|c| c.class).collect();
        assert_eq!(
            classes,
            vec![LaserClass::Class1, LaserClass::Class1M, LaserClass::Class2, LaserClass::Class2M]
        );
        for check in &result.checks[..3] {
            assert!(check.prerequisite_met);
            assert!(!check.passed, "{} should fail", check.class);
        }
        // Class 2 fails on Condition 1 only
        let class2 = &result.checks[2];
        let cond1 = class2.outcomes.iter().find(|o| o.condition == MeasurementCondition::Condition1).unwrap();
        assert!(!cond1.passes());
        assert!(result.deciding_check().unwrap().passed);
    }

    #[test]
    fn test_missing_prerequisites_named() {
        // 10.6 µm: neither visible nor inside 302.5–4000 nm
        let result = classify(vec![WavelengthData::continuous(10_600.0, 1.0)]);
        let reason_of = |class: LaserClass| result.checks.iter().find(|c| c.class == class).unwrap().reason.clone();

        let reason_1m = reason_of(LaserClass::Class1M);
        assert!(reason_1m.contains("302.5–4000 nm"));
        assert!(!reason_1m.contains("visible"));

        assert!(reason_of(LaserClass::Class2).contains("no visible wavelength"));
        assert!(!reason_of(LaserClass::Class2).contains("4000"));

        let reason_2m = reason_of(LaserClass::Class2M);
        assert!(reason_2m.contains("no visible wavelength"));
        assert!(reason_2m.contains("302.5–4000 nm"));
    }

    #[test]
    fn test_pulsed_nd_yag() {
        // 1064 nm, 1 mJ, 10 ns, 10 Hz: Class 1 single-pulse AEL is 2e-6 J, Class 3B is 0.15 J
        let result = classify(vec![WavelengthData::pulsed(1064.0, 1e-3, 1e-8, 10.0)]);
        assert_eq!(result.laser_class, LaserClass::Class3B);

        // Rule 3 governs Class 1: N = 10 Hz * T2 = 100 pulses, C5 = 100^-0.25
        let ratio = result.evaluations[0]
            .ratios
            .iter()
            .find(|r| r.ael_class == AelClass::Class1 && r.condition == MeasurementCondition::Condition3)
            .and_then(|r| r.governing)
            .unwrap();
        assert_eq!(ratio.rule, PulseRule::PulseTrain);
        assert!((ratio.ratio - 500.0 * 10f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_additive_visible_lines() {
        let lines = || {
            vec![
                WavelengthData::continuous(520.0, 0.3e-3),
                WavelengthData::continuous(638.0, 0.3e-3),
            ]
        };
        let settings = CalculatorSettings::default();

        // Same hazard group: ratios 0.76 + 0.76 exceed Class 1
        let auto = calculate(&ClassificationInput::new("rgb", lines()), &settings).unwrap();
        assert_eq!(auto.laser_class, LaserClass::Class2);

        let independent = calculate(
            &ClassificationInput::new("rgb", lines()).with_aggregation(AggregationMode::Independent),
            &settings,
        )
        .unwrap();
        assert_eq!(independent.laser_class, LaserClass::Class1);
    }

    #[test]
    fn test_aggregate_ratios_modes() {
        let ratios = [
            (HazardGroup::Ultraviolet, 0.6),
            (HazardGroup::Retinal, 0.5),
            (HazardGroup::Retinal, 0.3),
        ];
        assert!((aggregate_ratios(AggregationMode::Additive, &ratios).unwrap() - 1.4).abs() < 1e-12);
        assert!((aggregate_ratios(AggregationMode::Independent, &ratios).unwrap() - 0.6).abs() < 1e-12);
        assert!((aggregate_ratios(AggregationMode::Auto, &ratios).unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(aggregate_ratios(AggregationMode::Auto, &[]), None);
    }

    #[test]
    fn test_pulse_train_merging() {
        let factors = CorrectionFactors::new(532.0, 1.5);
        // 1 MHz: 18 pulses per Ti merge
        let train = pulse_train(532.0, 1e-9, 1e-9, 1e6, 0.25, &factors);
        assert!(train.merged);
        assert!((train.duration_s - 18e-6).abs() < 1e-15);
        assert!((train.energy_j - 18e-9).abs() < 1e-18);
        assert!((train.pulse_count - 2.5e5).abs() < 1e-6);
        assert!((train.effective_count - 2.5e5 / 18.0).abs() < 1e-6);

        // 1 kHz: period longer than Ti, N limited by T2 = 10 s
        let train = pulse_train(532.0, 1e-6, 1e-9, 1e3, 100.0, &factors);
        assert!(!train.merged);
        assert!((train.pulse_count - 1e4).abs() < 1e-9);
    }

    #[test]
    fn test_time_base_selection() {
        let settings = ClassificationSettings::default();
        assert_eq!(time_base_s(AelClass::Class1, 355.0, None, &settings), 3.0e4);
        assert_eq!(time_base_s(AelClass::Class2, 532.0, None, &settings), 0.25);
        assert_eq!(time_base_s(AelClass::Class1, 532.0, None, &settings), 100.0);
        assert_eq!(time_base_s(AelClass::Class3R, 905.0, None, &settings), 100.0);
        assert_eq!(time_base_s(AelClass::Class1, 532.0, Some(10.0), &settings), 10.0);
    }

    #[test]
    fn test_condition1_not_applicable_in_uvc() {
        let result = classify(vec![WavelengthData::continuous(266.0, 1e-6)]);
        let evaluation = &result.evaluations[0];
        assert_eq!(evaluation.ratio(AelClass::Class1, MeasurementCondition::Condition1), None);
        let check = &result.checks[0];
        assert!(check.outcomes.iter().any(|o| o.ratio.is_none() && o.passes()));
    }

    #[test]
    fn test_sub_nanosecond_warning() {
        let result = classify(vec![WavelengthData::pulsed(800.0, 1e-9, 1e-13, 80e6)]);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("below 1 ns"));
    }

    #[test]
    fn test_inactive_wavelengths_ignored() {
        let mut strong = WavelengthData::continuous(532.0, 1.0);
        strong.active = false;
        let result = classify(vec![WavelengthData::continuous(532.0, 0.3e-3), strong]);
        assert_eq!(result.laser_class, LaserClass::Class1);
        assert_eq!(result.evaluations.len(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let settings = CalculatorSettings::default();
        let empty = ClassificationInput::new("empty", Vec::new());
        assert_eq!(calculate(&empty, &settings).unwrap_err().error_code(), "MISSING_FIELD");

        let mut off = WavelengthData::continuous(532.0, 1e-3);
        off.active = false;
        assert!(calculate(&ClassificationInput::new("off", vec![off]), &settings).is_err());

        let bad = ClassificationInput::new("bad", vec![WavelengthData::continuous(532.0, -1.0)]);
        assert_eq!(calculate(&bad, &settings).unwrap_err().error_code(), "INVALID_INPUT");

        let uv = ClassificationInput::new("uv", vec![WavelengthData::continuous(150.0, 1e-3)]);
        assert_eq!(calculate(&uv, &settings).unwrap_err().error_code(), "UNSUPPORTED_WAVELENGTH");

        let t = ClassificationInput::new("t", vec![WavelengthData::continuous(532.0, 1e-3)]).with_time_base(0.0);
        assert!(calculate(&t, &settings).is_err());
    }

    #[test]
    fn test_result_records_steps_and_equations() {
        let result = classify(vec![WavelengthData::pulsed(532.0, 1e-7, 1e-9, 1e3)]);
        assert!(!result.steps.is_empty());
        assert!(result.equations_used.contains(&Equation::EmissionRatio));
        assert!(result.equations_used.contains(&Equation::PulseCount));
        assert!(result.checks.last().unwrap().passed);
    }

    #[test]
    fn test_result_json() {
        let result = classify(vec![WavelengthData::continuous(650.0, 1e-3)]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"laser_class\""));
        let input: ClassificationInput = serde_json::from_str(
            r#"{"label": "x", "wavelengths": [{"wavelength_nm": 650.0, "emission": {"type": "ContinuousWave", "power_w": 0.001}}]}"#,
        )
        .unwrap();
        assert_eq!(input.aggregation, None);
        assert!(input.wavelengths[0].active);
    }
}
