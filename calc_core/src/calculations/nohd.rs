//! # Nominal Ocular Hazard Distance
//!
//! Distance from the laser beyond which the exposure falls below the ocular
//! MPE (IEC/TR 60825-14). With an optical aid the extended NOHD (ENOHD) uses
//! the power collected by the instrument.
//!
//! ## Rules
//!
//! - CW: beam power against the MPE irradiance over the exposure duration.
//! - Pulsed: the longest of the single-pulse, average-power and pulse-train
//!   distances, mirroring the classification rules.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::nohd::{calculate, NohdInput};
//! use calc_core::laser::WavelengthData;
//! use calc_core::settings::CalculatorSettings;
//!
//! let laser = WavelengthData::continuous(532.0, 5e-3).with_beam(1.0, 1.0);
//! let result = calculate(&NohdInput::new("Pointer", laser), &CalculatorSettings::default()).unwrap();
//! assert!(result.hazardous);
//! assert!((result.nohd_m - 14.8).abs() < 0.1);
//! ```

use serde::{Deserialize, Serialize};

use super::classification::{pulse_train, PulseRule};
use super::steps::{CalculationStep, StepLog};
use crate::constants::{MAX_TABLE_DURATION_S, MIN_TABLE_DURATION_S};
use crate::equations::optics;
use crate::equations::registry::Equation;
use crate::errors::{CalcError, CalcResult};
use crate::iec60825::correction::{self, CorrectionFactors};
use crate::iec60825::mpe::{ocular_mpe, Mpe};
use crate::laser::{Emission, WavelengthData};
use crate::settings::CalculatorSettings;
use crate::units::{Meters, Millimeters, Milliradians, Radians};

/// Magnifying instrument used to view the beam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalAid {
    /// Angular magnification (e.g., 7 for 7×50 binoculars)
    pub magnification: f64,
    /// Objective lens diameter (mm)
    pub objective_diameter_mm: f64,
}

impl OpticalAid {
    pub fn binoculars_7x50() -> Self {
        OpticalAid {
            magnification: 7.0,
            objective_diameter_mm: 50.0,
        }
    }
}

/// Input for a hazard-distance calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Show laser",
///   "laser": {
///     "wavelength_nm": 532.0,
///     "emission": { "type": "ContinuousWave", "power_w": 1.0 },
///     "beam_diameter_mm": 3.0,
///     "divergence_mrad": 1.2
///   },
///   "optical_aid": { "magnification": 7.0, "objective_diameter_mm": 50.0 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NohdInput {
    pub label: String,
    pub laser: WavelengthData,
    /// Falls back to the settings default for the wavelength region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_duration_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optical_aid: Option<OpticalAid>,
}

impl NohdInput {
    pub fn new(label: impl Into<String>, laser: WavelengthData) -> Self {
        NohdInput {
            label: label.into(),
            laser,
            exposure_duration_s: None,
            optical_aid: None,
        }
    }

    pub fn with_exposure(mut self, duration_s: f64) -> Self {
        self.exposure_duration_s = Some(duration_s);
        self
    }

    pub fn with_optical_aid(mut self, aid: OpticalAid) -> Self {
        self.optical_aid = Some(aid);
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        validate_exposure_source(&self.laser, self.exposure_duration_s)?;
        if self.laser.divergence_mrad <= 0.0 {
            return Err(CalcError::invalid_input(
                "laser.divergence_mrad",
                self.laser.divergence_mrad.to_string(),
                "Divergence must be positive to compute a hazard distance",
            ));
        }
        if let Some(aid) = self.optical_aid {
            if !aid.magnification.is_finite() || aid.magnification < 1.0 {
                return Err(CalcError::invalid_input(
                    "optical_aid.magnification",
                    aid.magnification.to_string(),
                    "Magnification must be at least 1",
                ));
            }
            if !aid.objective_diameter_mm.is_finite() || aid.objective_diameter_mm <= 0.0 {
                return Err(CalcError::invalid_input(
                    "optical_aid.objective_diameter_mm",
                    aid.objective_diameter_mm.to_string(),
                    "Objective diameter must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Checks shared by the NOHD and eyewear inputs.
pub(crate) fn validate_exposure_source(laser: &WavelengthData, exposure_duration_s: Option<f64>) -> CalcResult<()> {
    laser.validate("laser")?;
    if let Some(t) = exposure_duration_s {
        if !t.is_finite() || t <= 0.0 || t > MAX_TABLE_DURATION_S {
            return Err(CalcError::invalid_input(
                "exposure_duration_s",
                t.to_string(),
                "Exposure duration must be positive and at most 30000 s",
            ));
        }
    }
    Ok(())
}

/// Beam quantity compared with an MPE under one rule.
///
/// `quantity` is W for [`PulseRule::ContinuousWave`] and
/// [`PulseRule::AveragePower`], J otherwise; `mpe` is in the matching
/// irradiance or radiant-exposure unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureRule {
    pub rule: PulseRule,
    pub quantity: f64,
    pub mpe: f64,
    /// Duration the MPE was evaluated for (s)
    pub duration_s: f64,
}

impl ExposureRule {
    pub fn is_energy(&self) -> bool {
        matches!(self.rule, PulseRule::SinglePulse | PulseRule::PulseTrain)
    }

    pub fn mpe_unit(&self) -> &'static str {
        if self.is_energy() {
            "J/m²"
        } else {
            "W/m²"
        }
    }
}

/// Rules that apply to a source for an exposure duration `t`.
///
/// The NOHD and eyewear calculators both take the worst of these.
pub(crate) fn exposure_rules(
    laser: &WavelengthData,
    exposure_duration_s: f64,
    factors: &CorrectionFactors,
    log: &mut StepLog,
) -> CalcResult<Vec<ExposureRule>> {
    let wl = laser.wavelength_nm;
    let t_exp = exposure_duration_s;
    let mut rules = Vec::with_capacity(3);

    match laser.emission {
        Emission::ContinuousWave { power_w } => {
            let mpe = ocular_mpe(wl, t_exp, factors)?;
            log_mpe(log, wl, t_exp, &mpe);
            rules.push(ExposureRule {
                rule: PulseRule::ContinuousWave,
                quantity: power_w,
                mpe: mpe.irradiance_over(t_exp),
                duration_s: t_exp,
            });
        }
        Emission::Pulsed {
            pulse_energy_j,
            pulse_width_s,
            repetition_rate_hz,
        } => {
            let t = pulse_width_s.max(MIN_TABLE_DURATION_S);
            let single = ocular_mpe(wl, t, factors)?;
            log_mpe(log, wl, t, &single);
            rules.push(ExposureRule {
                rule: PulseRule::SinglePulse,
                quantity: pulse_energy_j,
                mpe: single.radiant_exposure_over(t),
                duration_s: t,
            });

            let average = ocular_mpe(wl, t_exp, factors)?;
            log_mpe(log, wl, t_exp, &average);
            rules.push(ExposureRule {
                rule: PulseRule::AveragePower,
                quantity: laser.average_power_w(t_exp),
                mpe: average.irradiance_over(t_exp),
                duration_s: t_exp,
            });

            if wl >= 400.0 && repetition_rate_hz > 0.0 {
                let train = pulse_train(wl, pulse_energy_j, pulse_width_s, repetition_rate_hz, t_exp, factors);
                let t_eff = train.duration_s.max(MIN_TABLE_DURATION_S);
                let c5 = correction::c5(train.effective_count);
                let mpe = ocular_mpe(wl, t_eff, factors)?;
                log.computed(
                    Equation::PulseTrainCorrectionC5,
                    "C5",
                    format!("N = {:.3e} effective pulses", train.effective_count),
                    c5,
                    "-",
                );
                if train.merged {
                    log.uses(Equation::PulseMerging, format!("{} nm", wl));
                }
                rules.push(ExposureRule {
                    rule: PulseRule::PulseTrain,
                    quantity: train.energy_j,
                    mpe: mpe.radiant_exposure_over(t_eff) * c5,
                    duration_s: t_eff,
                });
            }
        }
    }
    Ok(rules)
}

fn log_mpe(log: &mut StepLog, wavelength_nm: f64, duration_s: f64, mpe: &Mpe) {
    log.computed(
        Equation::MaximumPermissibleExposure,
        "MPE",
        format!("{} nm, t = {:.3e} s", wavelength_nm, duration_s),
        mpe.value,
        mpe.unit_label(),
    );
}

/// Hazard distance under one rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleDistance {
    pub rule: ExposureRule,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NohdResult {
    pub label: String,
    pub exposure_duration_s: f64,
    /// Rule giving the longest distance
    pub governing_rule: PulseRule,
    pub nohd_m: f64,
    /// Beam diameter at the NOHD (mm)
    pub beam_diameter_at_nohd_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optical_aid_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enohd_m: Option<f64>,
    /// The beam exceeds the MPE somewhere beyond the exit aperture
    pub hazardous: bool,
    pub rule_distances: Vec<RuleDistance>,
    pub steps: Vec<CalculationStep>,
    pub equations_used: Vec<Equation>,
}

/// Compute the NOHD (and ENOHD with an optical aid).
pub fn calculate(input: &NohdInput, settings: &CalculatorSettings) -> CalcResult<NohdResult> {
    input.validate()?;

    let laser = &input.laser;
    let wl = laser.wavelength_nm;
    let t_exp = input
        .exposure_duration_s
        .unwrap_or_else(|| settings.exposure.duration_for(wl));
    let factors = CorrectionFactors::new(wl, laser.source_subtense_mrad);
    let exit_m = Meters::from(Millimeters(laser.beam_diameter_mm)).0;
    let divergence_rad = Radians::from(Milliradians(laser.divergence_mrad)).0;

    let mut log = StepLog::new(&input.label);
    log.note("Source", laser.summary());
    log.note("Exposure duration", format!("{} s; {}", t_exp, factors.summary()));

    let rules = exposure_rules(laser, t_exp, &factors, &mut log)?;
    let rule_distances: Vec<RuleDistance> = rules
        .iter()
        .map(|rule| RuleDistance {
            rule: *rule,
            distance_m: optics::nohd(rule.quantity, rule.mpe, exit_m, divergence_rad),
        })
        .collect();

    let governing = rule_distances
        .iter()
        .copied()
        .max_by(|a, b| a.distance_m.total_cmp(&b.distance_m))
        .ok_or_else(|| CalcError::calculation_failed("NOHD", "no exposure rule applied"))?;
    for rd in &rule_distances {
        log.computed(
            Equation::NominalOcularHazardDistance,
            format!("NOHD {}", rd.rule.rule.display_name()),
            format!("{:.3e} vs MPE {:.3e} {}", rd.rule.quantity, rd.rule.mpe, rd.rule.mpe_unit()),
            rd.distance_m,
            "m",
        );
    }

    let nohd_m = governing.distance_m;
    let beam_diameter_at_nohd_mm = optics::beam_diameter_at(laser.beam_diameter_mm, laser.divergence_mrad, Millimeters::from(Meters(nohd_m)).0);
    log.uses(Equation::BeamDiameterAtDistance, "beam at NOHD");

    let (optical_aid_gain, enohd_m) = match input.optical_aid {
        Some(aid) => {
            let gain = optics::optical_aid_gain(aid.magnification, aid.objective_diameter_mm, laser.beam_diameter_mm);
            log.computed(
                Equation::OpticalAidGain,
                "Optical aid gain",
                format!("{}× with {} mm objective", aid.magnification, aid.objective_diameter_mm),
                gain,
                "-",
            );
            let rule = governing.rule;
            let enohd = rules
                .iter()
                .map(|r| optics::nohd(r.quantity * gain, r.mpe, exit_m, divergence_rad))
                .fold(0.0, f64::max);
            log.computed(
                Equation::NominalOcularHazardDistance,
                "ENOHD",
                format!("{} with collected power × {:.1}", rule.rule.display_name(), gain),
                enohd,
                "m",
            );
            (Some(gain), Some(enohd))
        }
        None => (None, None),
    };

    let hazardous = nohd_m > 0.0;
    tracing::debug!(label = %input.label, nohd_m, enohd_m = ?enohd_m, hazardous, "hazard distance");
    let (steps, equations_used) = log.finish();

    Ok(NohdResult {
        label: input.label.clone(),
        exposure_duration_s: t_exp,
        governing_rule: governing.rule.rule,
        nohd_m,
        beam_diameter_at_nohd_mm,
        optical_aid_gain,
        enohd_m,
        hazardous,
        rule_distances,
        steps,
        equations_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: NohdInput) -> NohdResult {
        calculate(&input, &CalculatorSettings::default()).unwrap()
    }

    #[test]
    fn test_visible_cw_pointer() {
        // E_MPE = 18 * 0.25^0.75 / 0.25 = 25.46 W/m²; √(4P/πE) = 15.8 mm
        let result = run(NohdInput::new("pointer", WavelengthData::continuous(532.0, 5e-3).with_beam(1.0, 1.0)));
        assert_eq!(result.exposure_duration_s, 0.25);
        assert_eq!(result.governing_rule, PulseRule::ContinuousWave);
        assert!((result.nohd_m - 14.81).abs() < 0.02);
        assert!(result.hazardous);
        assert!(result.enohd_m.is_none());
    }

    #[test]
    fn test_binoculars_extend_distance() {
        let laser = WavelengthData::continuous(532.0, 5e-3).with_beam(1.0, 1.0);
        let result = run(NohdInput::new("pointer", laser).with_optical_aid(OpticalAid::binoculars_7x50()));
        // Gain limited by M² = 49, so the hazard diameter grows by 7
        assert_eq!(result.optical_aid_gain, Some(49.0));
        let enohd = result.enohd_m.unwrap();
        assert!((enohd - 109.7).abs() < 0.2);
        assert!(enohd > result.nohd_m);
    }

    #[test]
    fn test_binoculars_on_beam_without_diameter() {
        let laser = WavelengthData::continuous(532.0, 5e-3).with_beam(0.0, 1.0);
        let result = run(NohdInput::new("pointer", laser).with_optical_aid(OpticalAid::binoculars_7x50()));
        assert_eq!(result.optical_aid_gain, Some(49.0));
        // Zero exit diameter: distance scales with √gain
        let enohd = result.enohd_m.unwrap();
        assert!((result.nohd_m - 15.81).abs() < 0.02);
        assert!((enohd - 7.0 * result.nohd_m).abs() < 1e-6);
    }

    #[test]
    fn test_below_mpe_at_aperture() {
        let result = run(NohdInput::new("weak", WavelengthData::continuous(532.0, 1e-4).with_beam(7.0, 1.0)));
        assert_eq!(result.nohd_m, 0.0);
        assert!(!result.hazardous);
    }

    #[test]
    fn test_pulsed_train_governs() {
        // 1064 nm, 1 mJ at 10 Hz over 10 s: N = 100, C5 = 0.316, H = 0.05 * C5 J/m²
        let laser = WavelengthData::pulsed(1064.0, 1e-3, 1e-8, 10.0).with_beam(2.0, 1.0);
        let result = run(NohdInput::new("yag", laser));
        assert_eq!(result.exposure_duration_s, 10.0);
        assert_eq!(result.governing_rule, PulseRule::PulseTrain);
        assert!((result.nohd_m - 281.77).abs() < 0.1);
        assert_eq!(result.rule_distances.len(), 3);
        let single = result
            .rule_distances
            .iter()
            .find(|r| r.rule.rule == PulseRule::SinglePulse)
            .unwrap();
        assert!((single.distance_m - 157.6).abs() < 0.1);
    }

    #[test]
    fn test_exposure_override() {
        let laser = WavelengthData::continuous(532.0, 5e-3).with_beam(1.0, 1.0);
        let short = run(NohdInput::new("a", laser.clone()));
        let long = run(NohdInput::new("b", laser).with_exposure(10.0));
        assert!(long.nohd_m > short.nohd_m);
    }

    #[test]
    fn test_zero_divergence_rejected() {
        let input = NohdInput::new("collimated", WavelengthData::continuous(532.0, 5e-3).with_beam(1.0, 0.0));
        let err = calculate(&input, &CalculatorSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("divergence"));
    }

    #[test]
    fn test_invalid_optical_aid() {
        let laser = WavelengthData::continuous(532.0, 5e-3).with_beam(1.0, 1.0);
        let input = NohdInput::new("aid", laser).with_optical_aid(OpticalAid {
            magnification: 0.5,
            objective_diameter_mm: 50.0,
        });
        assert!(calculate(&input, &CalculatorSettings::default()).is_err());
    }

    #[test]
    fn test_steps_and_equations() {
        let result = run(NohdInput::new("pointer", WavelengthData::continuous(650.0, 5e-3).with_beam(1.0, 1.0)));
        assert!(result.equations_used.contains(&Equation::NominalOcularHazardDistance));
        assert!(result.equations_used.contains(&Equation::MaximumPermissibleExposure));
        assert!(result.steps.iter().any(|s| s.title.starts_with("NOHD")));
    }
}
