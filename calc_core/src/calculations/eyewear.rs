//! # Protective Eyewear
//!
//! Optical density needed to bring the exposure at a given distance below the
//! ocular MPE, and the EN 207 scale numbers (LB) for the laser's operating
//! mode.
//!
//! ## EN 207 modes
//!
//! | Mode | Emission | Quantity tested |
//! |------|----------|-----------------|
//! | D | CW (and the average power of pulsed lasers) | Irradiance (W/m²) |
//! | I | Pulses ≥ 1 ns | Radiant exposure per pulse (J/m²) |
//! | M | Pulses < 1 ns | Radiant exposure (315–1400 nm) or peak irradiance |
//!
//! LB n protects up to base·10ⁿ; scale numbers above the settings maximum
//! (LB10) are reported as unavailable.

use serde::{Deserialize, Serialize};

use super::classification::PulseRule;
use super::nohd::{exposure_rules, validate_exposure_source};
use super::steps::{CalculationStep, StepLog};
use crate::constants::MIN_TABLE_DURATION_S;
use crate::equations::optics;
use crate::equations::registry::Equation;
use crate::errors::{CalcError, CalcResult};
use crate::iec60825::conditions::limiting_aperture_mm;
use crate::iec60825::correction::CorrectionFactors;
use crate::laser::{Emission, WavelengthData};
use crate::settings::CalculatorSettings;
use crate::units::{Meters, Millimeters};

/// EN 207 test mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum En207Mode {
    /// Continuous wave
    D,
    /// Pulsed, 1 ns to 0.25 s
    I,
    /// Mode-locked, below 1 ns
    M,
}

impl En207Mode {
    pub fn code(&self) -> &'static str {
        match self {
            En207Mode::D => "D",
            En207Mode::I => "I",
            En207Mode::M => "M",
        }
    }

    /// Base exposure of LB0 and its unit for a wavelength.
    pub fn base(&self, wavelength_nm: f64) -> (f64, &'static str) {
        let region = if wavelength_nm < 315.0 {
            0
        } else if wavelength_nm < 1400.0 {
            1
        } else {
            2
        };
        match (self, region) {
            (En207Mode::D, 0) => (1e-2, "W/m²"),
            (En207Mode::D, 1) => (1e1, "W/m²"),
            (En207Mode::D, _) => (1e3, "W/m²"),
            (En207Mode::I, 0) => (3e1, "J/m²"),
            (En207Mode::I, 1) => (5e-3, "J/m²"),
            (En207Mode::I, _) => (1e2, "J/m²"),
            (En207Mode::M, 0) => (3e10, "W/m²"),
            (En207Mode::M, 1) => (1.5e-4, "J/m²"),
            (En207Mode::M, _) => (1e11, "W/m²"),
        }
    }

    /// Whether the mode is tested with peak irradiance at this wavelength
    fn uses_peak_irradiance(&self, wavelength_nm: f64) -> bool {
        matches!(self, En207Mode::M) && !(315.0..1400.0).contains(&wavelength_nm)
    }
}

/// Input for an eyewear calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Lab Nd:YAG",
///   "laser": {
///     "wavelength_nm": 1064.0,
///     "emission": { "type": "Pulsed", "pulse_energy_j": 0.001, "pulse_width_s": 1e-8, "repetition_rate_hz": 10.0 },
///     "beam_diameter_mm": 2.0,
///     "divergence_mrad": 1.0
///   },
///   "distance_m": 0.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EyewearInput {
    pub label: String,
    pub laser: WavelengthData,
    /// Distance from the exit aperture to the eye (m)
    #[serde(default)]
    pub distance_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_duration_s: Option<f64>,
}

impl EyewearInput {
    pub fn new(label: impl Into<String>, laser: WavelengthData) -> Self {
        EyewearInput {
            label: label.into(),
            laser,
            distance_m: 0.0,
            exposure_duration_s: None,
        }
    }

    pub fn at_distance(mut self, distance_m: f64) -> Self {
        self.distance_m = distance_m;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        validate_exposure_source(&self.laser, self.exposure_duration_s)?;
        if !self.distance_m.is_finite() || self.distance_m < 0.0 {
            return Err(CalcError::invalid_input(
                "distance_m",
                self.distance_m.to_string(),
                "Distance cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Exposure at the eye under one rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleExposure {
    pub rule: PulseRule,
    /// W/m² or J/m², matching `mpe`
    pub exposure: f64,
    pub mpe: f64,
    pub optical_density: f64,
}

/// EN 207 rating for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleRating {
    pub mode: En207Mode,
    pub exposure: f64,
    pub unit: String,
    /// `None` when the exposure exceeds the highest available scale number
    pub scale_number: Option<u32>,
    /// Marking as printed on filters, e.g. "D 532 LB5"
    pub marking: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EyewearResult {
    pub label: String,
    pub distance_m: f64,
    pub exposure_duration_s: f64,
    pub beam_diameter_at_eye_mm: f64,
    pub exposures: Vec<RuleExposure>,
    pub governing_rule: PulseRule,
    pub od_required: f64,
    /// Required OD rounded up to a whole filter rating
    pub od_rating: u32,
    pub scale_ratings: Vec<ScaleRating>,
    pub steps: Vec<CalculationStep>,
    pub equations_used: Vec<Equation>,
}

impl EyewearResult {
    /// Highest scale number over the rated modes, `None` if any mode is out of range
    pub fn required_scale_number(&self) -> Option<u32> {
        self.scale_ratings
            .iter()
            .map(|r| r.scale_number)
            .collect::<Option<Vec<u32>>>()?
            .into_iter()
            .max()
    }
}

/// Compute the required optical density and EN 207 scale numbers.
///
/// # Example
///
/// ```rust
/// use calc_core::calculations::eyewear::{calculate, EyewearInput};
/// use calc_core::laser::WavelengthData;
/// use calc_core::settings::CalculatorSettings;
///
/// let laser = WavelengthData::continuous(532.0, 1.0).with_beam(2.0, 1.0);
/// let result = calculate(&EyewearInput::new("Green 1 W", laser), &CalculatorSettings::default()).unwrap();
/// assert_eq!(result.od_rating, 4);
/// ```
pub fn calculate(input: &EyewearInput, settings: &CalculatorSettings) -> CalcResult<EyewearResult> {
    input.validate()?;

    let laser = &input.laser;
    let wl = laser.wavelength_nm;
    let t_exp = input
        .exposure_duration_s
        .unwrap_or_else(|| settings.exposure.duration_for(wl));
    let factors = CorrectionFactors::new(wl, laser.source_subtense_mrad);

    let mut log = StepLog::new(&input.label);
    log.note("Source", laser.summary());

    let beam_mm = optics::beam_diameter_at(laser.beam_diameter_mm, laser.divergence_mrad, Millimeters::from(Meters(input.distance_m)).0);
    log.computed(
        Equation::BeamDiameterAtDistance,
        "Beam at the eye",
        format!("{} m from the exit aperture", input.distance_m),
        beam_mm,
        "mm",
    );

    let rules = exposure_rules(laser, t_exp, &factors, &mut log)?;
    let exposures: Vec<RuleExposure> = rules
        .iter()
        .map(|rule| {
            let exposure = eye_exposure(wl, rule.quantity, beam_mm, rule.duration_s);
            RuleExposure {
                rule: rule.rule,
                exposure,
                mpe: rule.mpe,
                optical_density: optics::optical_density(exposure, rule.mpe),
            }
        })
        .collect();
    log.uses(Equation::ApertureAveragedExposure, "exposure at the eye");

    let governing = exposures
        .iter()
        .copied()
        .max_by(|a, b| a.optical_density.total_cmp(&b.optical_density))
        .ok_or_else(|| CalcError::calculation_failed("Eyewear", "no exposure rule applied"))?;
    for e in &exposures {
        log.computed(
            Equation::OpticalDensity,
            format!("OD {}", e.rule.display_name()),
            format!("exposure {:.3e} vs MPE {:.3e}", e.exposure, e.mpe),
            e.optical_density,
            "OD",
        );
    }

    let od_required = governing.optical_density;
    let od_rating = od_required.ceil() as u32;

    let scale_ratings = if settings.eyewear.include_scale_number {
        scale_ratings(laser, beam_mm, settings.eyewear.max_scale_number, &mut log)
    } else {
        Vec::new()
    };

    tracing::debug!(label = %input.label, od_required, od_rating, "eyewear optical density");
    let (steps, equations_used) = log.finish();

    Ok(EyewearResult {
        label: input.label.clone(),
        distance_m: input.distance_m,
        exposure_duration_s: t_exp,
        beam_diameter_at_eye_mm: beam_mm,
        exposures,
        governing_rule: governing.rule,
        od_required,
        od_rating,
        scale_ratings,
        steps,
        equations_used,
    })
}

/// Exposure at the eye (W/m² or J/m²), averaged over the limiting aperture.
fn eye_exposure(wavelength_nm: f64, quantity: f64, beam_mm: f64, duration_s: f64) -> f64 {
    let aperture = Meters::from(Millimeters(limiting_aperture_mm(wavelength_nm, duration_s)));
    optics::aperture_averaged_exposure(quantity, Meters::from(Millimeters(beam_mm)).0, aperture.0)
}

fn scale_ratings(laser: &WavelengthData, beam_mm: f64, max_scale: u32, log: &mut StepLog) -> Vec<ScaleRating> {
    let wl = laser.wavelength_nm;
    let mut modes = Vec::with_capacity(2);
    match laser.emission {
        Emission::ContinuousWave { power_w } => {
            modes.push((En207Mode::D, eye_exposure(wl, power_w, beam_mm, 10.0)));
        }
        Emission::Pulsed {
            pulse_energy_j,
            pulse_width_s,
            repetition_rate_hz,
        } => {
            let t = pulse_width_s.max(MIN_TABLE_DURATION_S);
            let mode = if pulse_width_s < 1e-9 { En207Mode::M } else { En207Mode::I };
            let radiant_exposure = eye_exposure(wl, pulse_energy_j, beam_mm, t);
            let exposure = if mode.uses_peak_irradiance(wl) {
                radiant_exposure / pulse_width_s
            } else {
                radiant_exposure
            };
            modes.push((mode, exposure));
            if repetition_rate_hz > 0.0 {
                let average = pulse_energy_j * repetition_rate_hz;
                modes.push((En207Mode::D, eye_exposure(wl, average, beam_mm, 10.0)));
            }
        }
    }

    modes
        .into_iter()
        .map(|(mode, exposure)| {
            let (base, unit) = mode.base(wl);
            let n = optics::scale_number(exposure, base);
            let scale_number = (n <= max_scale).then_some(n);
            log.computed(
                Equation::En207ScaleNumber,
                format!("EN 207 mode {}", mode.code()),
                format!("{:.3e} {} vs LB0 base {:.1e}", exposure, unit, base),
                n as f64,
                "LB",
            );
            if scale_number.is_none() {
                tracing::warn!(mode = mode.code(), scale = n, "exposure exceeds the highest EN 207 scale number");
            }
            ScaleRating {
                mode,
                exposure,
                unit: unit.to_string(),
                scale_number,
                marking: scale_number.map(|n| format!("{} {} LB{}", mode.code(), wl, n)),
            }
        })
        .collect()
}
