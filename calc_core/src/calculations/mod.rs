//! # Laser Safety and Link Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results with the step log and equations used
//! - `calculate(input, settings) -> CalcResult<*Result>` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`classification`] - IEC 60825-1 laser class
//! - [`nohd`] - Nominal ocular hazard distance
//! - [`eyewear`] - Protective eyewear optical density and EN 207 scale number
//! - [`tv_signal`] - Terrestrial/cable TV distribution signal budget
//! - [`fiber_budget`] - Optical fiber power budget

pub mod classification;
pub mod eyewear;
pub mod fiber_budget;
pub mod nohd;
pub mod steps;
pub mod tv_signal;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::settings::CalculatorSettings;

// Re-export commonly used types
pub use classification::{AggregationMode, ClassificationInput, ClassificationResult};
pub use eyewear::{EyewearInput, EyewearResult};
pub use fiber_budget::{FiberBudgetInput, FiberBudgetResult};
pub use nohd::{NohdInput, NohdResult};
pub use steps::{CalculationStep, StepLog};
pub use tv_signal::{SignalBudgetInput, SignalBudgetResult};

/// Enum wrapper for all calculation types.
///
/// ```json
/// { "type": "Nohd", "label": "Green pointer", "laser": { ... } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    Classification(ClassificationInput),
    Nohd(NohdInput),
    Eyewear(EyewearInput),
    SignalBudget(SignalBudgetInput),
    FiberBudget(FiberBudgetInput),
}

impl CalculationItem {
    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::Classification(c) => &c.label,
            CalculationItem::Nohd(n) => &n.label,
            CalculationItem::Eyewear(e) => &e.label,
            CalculationItem::SignalBudget(s) => &s.label,
            CalculationItem::FiberBudget(f) => &f.label,
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Classification(_) => "Classification",
            CalculationItem::Nohd(_) => "Nohd",
            CalculationItem::Eyewear(_) => "Eyewear",
            CalculationItem::SignalBudget(_) => "SignalBudget",
            CalculationItem::FiberBudget(_) => "FiberBudget",
        }
    }

    /// Run the wrapped calculation.
    pub fn calculate(&self, settings: &CalculatorSettings) -> CalcResult<CalculationOutput> {
        tracing::debug!(calc_type = self.calc_type(), label = self.label(), "running calculation");
        Ok(match self {
            CalculationItem::Classification(i) => CalculationOutput::Classification(classification::calculate(i, settings)?),
            CalculationItem::Nohd(i) => CalculationOutput::Nohd(nohd::calculate(i, settings)?),
            CalculationItem::Eyewear(i) => CalculationOutput::Eyewear(eyewear::calculate(i, settings)?),
            CalculationItem::SignalBudget(i) => CalculationOutput::SignalBudget(tv_signal::calculate(i, settings)?),
            CalculationItem::FiberBudget(i) => CalculationOutput::FiberBudget(fiber_budget::calculate(i, settings)?),
        })
    }
}

/// Result counterpart of [`CalculationItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    Classification(ClassificationResult),
    Nohd(NohdResult),
    Eyewear(EyewearResult),
    SignalBudget(SignalBudgetResult),
    FiberBudget(FiberBudgetResult),
}

impl CalculationOutput {
    pub fn label(&self) -> &str {
        match self {
            CalculationOutput::Classification(r) => &r.label,
            CalculationOutput::Nohd(r) => &r.label,
            CalculationOutput::Eyewear(r) => &r.label,
            CalculationOutput::SignalBudget(r) => &r.label,
            CalculationOutput::FiberBudget(r) => &r.label,
        }
    }

    pub fn steps(&self) -> &[CalculationStep] {
        match self {
            CalculationOutput::Classification(r) => &r.steps,
            CalculationOutput::Nohd(r) => &r.steps,
            CalculationOutput::Eyewear(r) => &r.steps,
            CalculationOutput::SignalBudget(r) => &r.steps,
            CalculationOutput::FiberBudget(r) => &r.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FiberType;
    use crate::iec60825::LaserClass;
    use crate::laser::WavelengthData;

    #[test]
    fn test_dispatch_classification() {
        let item = CalculationItem::Classification(ClassificationInput::new(
            "Pointer",
            vec![WavelengthData::continuous(532.0, 3e-3)],
        ));
        assert_eq!(item.calc_type(), "Classification");
        assert_eq!(item.label(), "Pointer");

        match item.calculate(&CalculatorSettings::default()).unwrap() {
            CalculationOutput::Classification(r) => assert_eq!(r.laser_class, LaserClass::Class3R),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_errors_propagate() {
        let item = CalculationItem::Classification(ClassificationInput::new("Empty", vec![]));
        assert!(item.calculate(&CalculatorSettings::default()).is_err());
    }

    #[test]
    fn test_tagged_json() {
        let item = CalculationItem::FiberBudget(FiberBudgetInput::new("Link", FiberType::Os2, 1550.0, 40.0, 3.0, -28.0));
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"FiberBudget\""));

        let back: CalculationItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.calc_type(), "FiberBudget");

        let output = back.calculate(&CalculatorSettings::default()).unwrap();
        assert_eq!(output.label(), "Link");
        assert!(!output.steps().is_empty());
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"type\":\"FiberBudget\""));
    }

    #[test]
    fn test_nohd_from_json() {
        let laser = WavelengthData::continuous(532.0, 5e-3).with_beam(1.0, 1.0);
        let json = serde_json::to_string(&CalculationItem::Nohd(NohdInput::new("Green", laser))).unwrap();
        let item: CalculationItem = serde_json::from_str(&json).unwrap();
        let output = item.calculate(&CalculatorSettings::default()).unwrap();
        match output {
            CalculationOutput::Nohd(r) => assert!((r.nohd_m - 14.81).abs() < 0.01),
            other => panic!("unexpected output {:?}", other),
        }
    }
}
