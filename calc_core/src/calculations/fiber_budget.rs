//! # Fiber Power Budget
//!
//! Point-to-point (or PON) optical link budget: fiber attenuation, connectors,
//! splices and passive splitters against the transmitter power and receiver
//! sensitivity.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::fiber_budget::{calculate, FiberBudgetInput};
//! use calc_core::catalog::FiberType;
//! use calc_core::settings::CalculatorSettings;
//!
//! let input = FiberBudgetInput::new("Campus link", FiberType::Os2, 1310.0, 10.0, 0.0, -28.0);
//! let result = calculate(&input, &CalculatorSettings::default()).unwrap();
//! assert!(result.passed);
//! ```

use serde::{Deserialize, Serialize};

use super::steps::{CalculationStep, StepLog};
use crate::catalog::fiber::{self, FiberType};
use crate::equations::registry::Equation;
use crate::equations::rf;
use crate::errors::{CalcError, CalcResult};
use crate::settings::CalculatorSettings;
use crate::units::{Dbm, Decibels, Milliwatts};

/// Input for a fiber link budget.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "FTTH feeder",
///   "fiber_type": "OS2",
///   "wavelength_nm": 1490.0,
///   "length_km": 12.0,
///   "transmitter_power_dbm": 3.0,
///   "receiver_sensitivity_dbm": -27.0,
///   "connector_count": 4,
///   "splice_count": 6,
///   "splitter_ratios": [32]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiberBudgetInput {
    pub label: String,
    pub fiber_type: FiberType,
    pub wavelength_nm: f64,
    pub length_km: f64,
    /// Overrides the catalog attenuation (dB/km)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attenuation_db_per_km: Option<f64>,
    pub transmitter_power_dbm: f64,
    pub receiver_sensitivity_dbm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_overload_dbm: Option<f64>,
    #[serde(default)]
    pub connector_count: u32,
    /// Per connector pair; defaults to settings (dB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_loss_db: Option<f64>,
    #[serde(default)]
    pub splice_count: u32,
    /// Per splice; defaults to settings (dB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splice_loss_db: Option<f64>,
    /// Cascaded splitters, e.g. `[4, 8]` for 1:4 followed by 1:8
    #[serde(default)]
    pub splitter_ratios: Vec<u32>,
    /// Patch panels, WDM filters and other fixed losses (dB)
    #[serde(default)]
    pub other_losses_db: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_margin_db: Option<f64>,
}

impl FiberBudgetInput {
    pub fn new(
        label: impl Into<String>,
        fiber_type: FiberType,
        wavelength_nm: f64,
        length_km: f64,
        transmitter_power_dbm: f64,
        receiver_sensitivity_dbm: f64,
    ) -> Self {
        FiberBudgetInput {
            label: label.into(),
            fiber_type,
            wavelength_nm,
            length_km,
            attenuation_db_per_km: None,
            transmitter_power_dbm,
            receiver_sensitivity_dbm,
            receiver_overload_dbm: None,
            connector_count: 0,
            connector_loss_db: None,
            splice_count: 0,
            splice_loss_db: None,
            splitter_ratios: Vec::new(),
            other_losses_db: 0.0,
            safety_margin_db: None,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        if !self.wavelength_nm.is_finite() || self.wavelength_nm <= 0.0 {
            return Err(CalcError::invalid_input(
                "wavelength_nm",
                self.wavelength_nm.to_string(),
                "Wavelength must be positive",
            ));
        }
        if !self.length_km.is_finite() || self.length_km < 0.0 {
            return Err(CalcError::invalid_input(
                "length_km",
                self.length_km.to_string(),
                "Length cannot be negative",
            ));
        }
        for (name, value) in [
            ("transmitter_power_dbm", Some(self.transmitter_power_dbm)),
            ("receiver_sensitivity_dbm", Some(self.receiver_sensitivity_dbm)),
            ("receiver_overload_dbm", self.receiver_overload_dbm),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(CalcError::invalid_input(name, v.to_string(), "Level must be finite"));
                }
            }
        }
        for (name, value) in [
            ("attenuation_db_per_km", self.attenuation_db_per_km),
            ("connector_loss_db", self.connector_loss_db),
            ("splice_loss_db", self.splice_loss_db),
            ("safety_margin_db", self.safety_margin_db),
            ("other_losses_db", Some(self.other_losses_db)),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CalcError::invalid_input(name, v.to_string(), "Loss cannot be negative"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiberBudgetResult {
    pub label: String,
    pub attenuation_db_per_km: f64,
    pub fiber_loss_db: f64,
    pub connector_loss_db: f64,
    pub splice_loss_db: f64,
    pub splitter_loss_db: f64,
    pub other_losses_db: f64,
    pub total_loss_db: f64,
    pub received_power_dbm: f64,
    pub received_power_mw: f64,
    pub power_budget_db: f64,
    pub safety_margin_db: f64,
    pub link_margin_db: f64,
    /// Margin is non-negative
    pub passed: bool,
    /// Received power above the receiver overload level
    pub overloaded: bool,
    /// Longest fiber the budget supports with the same fixed losses (km);
    /// `None` when the fiber is lossless and the reach is unbounded
    pub maximum_reach_km: Option<f64>,
    pub warnings: Vec<String>,
    pub steps: Vec<CalculationStep>,
    pub equations_used: Vec<Equation>,
}

/// Compute the optical link budget.
pub fn calculate(input: &FiberBudgetInput, settings: &CalculatorSettings) -> CalcResult<FiberBudgetResult> {
    input.validate()?;

    let defaults = &settings.fiber;
    let mut log = StepLog::new(&input.label);
    let mut warnings = Vec::new();

    let attenuation_db_per_km = match input.attenuation_db_per_km {
        Some(a) => a,
        None => fiber::attenuation_db_per_km(input.fiber_type, input.wavelength_nm)?,
    };
    let fiber_loss_db = attenuation_db_per_km * input.length_km;
    log.computed(
        Equation::FiberAttenuation,
        "Fiber loss",
        format!(
            "{} at {} nm: {} dB/km × {} km",
            input.fiber_type, input.wavelength_nm, attenuation_db_per_km, input.length_km
        ),
        fiber_loss_db,
        "dB",
    );

    let connector_loss_db = f64::from(input.connector_count) * input.connector_loss_db.unwrap_or(defaults.connector_loss_db);
    let splice_loss_db = f64::from(input.splice_count) * input.splice_loss_db.unwrap_or(defaults.splice_loss_db);
    log.note(
        "Connectors and splices",
        format!(
            "{} connectors ({:.2} dB), {} splices ({:.2} dB)",
            input.connector_count, connector_loss_db, input.splice_count, splice_loss_db
        ),
    );

    let mut splitter_loss_db = 0.0;
    for &ratio in &input.splitter_ratios {
        let loss = fiber::splitter_loss_db(ratio)?;
        log.computed(
            Equation::FiberSplitterLoss,
            format!("1:{} splitter", ratio),
            "catalog insertion loss",
            loss,
            "dB",
        );
        splitter_loss_db += loss;
    }

    let fixed_loss_db = connector_loss_db + splice_loss_db + splitter_loss_db + input.other_losses_db;
    let total_loss_db = fiber_loss_db + fixed_loss_db;
    let received = Dbm(input.transmitter_power_dbm) - Decibels(total_loss_db);
    log.computed(
        Equation::PowerBudget,
        "Received power",
        format!("{} dBm − {:.2} dB", input.transmitter_power_dbm, total_loss_db),
        received.0,
        "dBm",
    );

    let power_budget_db = rf::power_budget_db(input.transmitter_power_dbm, input.receiver_sensitivity_dbm);
    if power_budget_db <= 0.0 {
        tracing::warn!(label = %input.label, power_budget_db, "transmitter at or below receiver sensitivity");
        warnings.push(format!(
            "Transmitter power {} dBm is not above the receiver sensitivity {} dBm",
            input.transmitter_power_dbm, input.receiver_sensitivity_dbm
        ));
    }
    let safety_margin_db = input.safety_margin_db.unwrap_or(defaults.safety_margin_db);
    let link_margin_db = rf::link_margin_db(power_budget_db, total_loss_db, safety_margin_db);
    log.computed(
        Equation::LinkMargin,
        "Link margin",
        format!(
            "budget {:.2} dB − loss {:.2} dB − safety {:.2} dB",
            power_budget_db, total_loss_db, safety_margin_db
        ),
        link_margin_db,
        "dB",
    );
    let passed = link_margin_db >= 0.0;
    if !passed {
        warnings.push(format!("Link margin is {:.2} dB short", -link_margin_db));
    }

    let overloaded = input.receiver_overload_dbm.is_some_and(|max| received.0 > max);
    if overloaded {
        tracing::warn!(label = %input.label, received_dbm = received.0, "receiver overloaded");
        warnings.push(format!(
            "Received power {:.2} dBm exceeds the receiver overload level; add attenuation",
            received.0
        ));
    }

    let reach = rf::maximum_reach_km(power_budget_db, fixed_loss_db, safety_margin_db, attenuation_db_per_km);
    let maximum_reach_km = reach.is_finite().then_some(reach);
    match maximum_reach_km {
        Some(km) => log.computed(
            Equation::MaximumReach,
            "Maximum reach",
            format!("at {} dB/km with the same fixed losses", attenuation_db_per_km),
            km,
            "km",
        ),
        None => log.note("Maximum reach", "unbounded for a lossless fiber"),
    }

    tracing::debug!(label = %input.label, total_loss_db, link_margin_db, passed, "fiber budget");
    let (steps, equations_used) = log.finish();

    Ok(FiberBudgetResult {
        label: input.label.clone(),
        attenuation_db_per_km,
        fiber_loss_db,
        connector_loss_db,
        splice_loss_db,
        splitter_loss_db,
        other_losses_db: input.other_losses_db,
        total_loss_db,
        received_power_dbm: received.0,
        received_power_mw: Milliwatts::from(received).0,
        power_budget_db,
        safety_margin_db,
        link_margin_db,
        passed,
        overloaded,
        maximum_reach_km,
        warnings,
        steps,
        equations_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pon_link() -> FiberBudgetInput {
        let mut input = FiberBudgetInput::new("PON", FiberType::Os2, 1310.0, 10.0, 0.0, -28.0);
        input.connector_count = 2;
        input.splice_count = 4;
        input.splitter_ratios = vec![8];
        input.receiver_overload_dbm = Some(-8.0);
        input
    }

    #[test]
    fn test_single_mode_pon() {
        let result = calculate(&pon_link(), &CalculatorSettings::default()).unwrap();
        // 4.0 fiber + 1.0 connectors + 0.4 splices + 10.5 splitter
        assert!((result.fiber_loss_db - 4.0).abs() < 1e-9);
        assert!((result.total_loss_db - 15.9).abs() < 1e-9);
        assert!((result.received_power_dbm + 15.9).abs() < 1e-9);
        assert!((result.power_budget_db - 28.0).abs() < 1e-9);
        assert!((result.link_margin_db - 9.1).abs() < 1e-9);
        assert!(result.passed);
        assert!(!result.overloaded);
        // (28 - 11.9 - 3) / 0.4
        assert!((result.maximum_reach_km.unwrap() - 32.75).abs() < 1e-9);
        assert!((result.received_power_mw - 10f64.powf(-1.59)).abs() < 1e-9);
    }

    #[test]
    fn test_short_link_overloads_receiver() {
        let mut input = pon_link();
        input.splitter_ratios.clear();
        input.length_km = 0.5;
        let result = calculate(&input, &CalculatorSettings::default()).unwrap();
        assert!(result.overloaded);
        assert!(result.warnings.iter().any(|w| w.contains("overload")));
    }

    #[test]
    fn test_insufficient_margin() {
        let mut input = pon_link();
        input.splitter_ratios = vec![4, 8];
        input.length_km = 20.0;
        let result = calculate(&input, &CalculatorSettings::default()).unwrap();
        // 8.0 + 1.0 + 0.4 + 7.3 + 10.5 = 27.2 dB, margin 28 - 27.2 - 3 = -2.2
        assert!((result.link_margin_db + 2.2).abs() < 1e-9);
        assert!(!result.passed);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_multimode_and_overrides() {
        let mut input = FiberBudgetInput::new("LAN", FiberType::Om3, 850.0, 0.3, -3.0, -17.0);
        input.connector_count = 2;
        input.connector_loss_db = Some(0.75);
        input.safety_margin_db = Some(0.0);
        let result = calculate(&input, &CalculatorSettings::default()).unwrap();
        assert!((result.fiber_loss_db - 1.05).abs() < 1e-9);
        assert!((result.connector_loss_db - 1.5).abs() < 1e-9);

        input.attenuation_db_per_km = Some(3.0);
        let result = calculate(&input, &CalculatorSettings::default()).unwrap();
        assert!((result.fiber_loss_db - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_settings_defaults_apply() {
        let mut settings = CalculatorSettings::default();
        settings.fiber.connector_loss_db = 0.3;
        settings.fiber.safety_margin_db = 0.0;
        let result = calculate(&pon_link(), &settings).unwrap();
        assert!((result.connector_loss_db - 0.6).abs() < 1e-9);
        assert_eq!(result.safety_margin_db, 0.0);
    }

    #[test]
    fn test_sensitivity_above_transmitter_fails_link() {
        let mut input = pon_link();
        input.receiver_sensitivity_dbm = 5.0;
        let result = calculate(&input, &CalculatorSettings::default()).unwrap();
        assert!((result.power_budget_db + 5.0).abs() < 1e-9);
        assert!(!result.passed);
        assert_eq!(result.maximum_reach_km, Some(0.0));
        assert!(result.warnings.iter().any(|w| w.contains("not above the receiver sensitivity")));
    }

    #[test]
    fn test_lossless_fiber_reach_survives_json() {
        let mut input = pon_link();
        input.attenuation_db_per_km = Some(0.0);
        let result = calculate(&input, &CalculatorSettings::default()).unwrap();
        assert_eq!(result.fiber_loss_db, 0.0);
        assert_eq!(result.maximum_reach_km, None);

        let json = serde_json::to_string(&result).unwrap();
        let back: FiberBudgetResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.maximum_reach_km, None);
        assert!((back.link_margin_db - result.link_margin_db).abs() < 1e-12);
    }

    #[test]
    fn test_wavelength_outside_windows() {
        let input = FiberBudgetInput::new("bad", FiberType::Os2, 850.0, 1.0, 0.0, -20.0);
        let err = calculate(&input, &CalculatorSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "CATALOG_ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_validation() {
        let mut input = pon_link();
        input.length_km = -1.0;
        assert!(calculate(&input, &CalculatorSettings::default()).is_err());

        let mut input = pon_link();
        input.splitter_ratios = vec![1];
        assert_eq!(
            calculate(&input, &CalculatorSettings::default()).unwrap_err().error_code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_equations_recorded() {
        let result = calculate(&pon_link(), &CalculatorSettings::default()).unwrap();
        for eq in [
            Equation::FiberAttenuation,
            Equation::FiberSplitterLoss,
            Equation::PowerBudget,
            Equation::LinkMargin,
            Equation::MaximumReach,
        ] {
            assert!(result.equations_used.contains(&eq), "{:?} missing", eq);
        }
    }
}
