//! Narrative step log shared by all calculators.
//!
//! Each step names what was computed, the equation behind it (when there is
//! one) and the resulting value. Equations are also recorded in an
//! [`EquationTracker`] so a front end can list the formulas a result relied on.

use serde::{Deserialize, Serialize};

use crate::equations::registry::{Equation, EquationTracker};

/// One line of a calculation narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    pub title: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equation: Option<Equation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl CalculationStep {
    pub fn note(title: impl Into<String>, detail: impl Into<String>) -> Self {
        CalculationStep {
            title: title.into(),
            detail: detail.into(),
            equation: None,
            value: None,
            unit: None,
        }
    }

    /// Attach a value and its unit
    pub fn with_value(mut self, value: f64, unit: impl Into<String>) -> Self {
        self.value = Some(value);
        self.unit = Some(unit.into());
        self
    }

    pub fn with_equation(mut self, equation: Equation) -> Self {
        self.equation = Some(equation);
        self
    }
}

impl std::fmt::Display for CalculationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.detail)?;
        if let (Some(value), Some(unit)) = (self.value, &self.unit) {
            write!(f, " = {:.4e} {}", value, unit)?;
        }
        Ok(())
    }
}

/// Accumulates steps and equation usage for one calculation.
#[derive(Debug, Clone, Default)]
pub struct StepLog {
    label: String,
    steps: Vec<CalculationStep>,
    tracker: EquationTracker,
}

impl StepLog {
    pub fn new(label: impl Into<String>) -> Self {
        StepLog {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, step: CalculationStep) {
        if let Some(equation) = step.equation {
            self.tracker.record(equation, step.title.clone(), self.label.clone());
        }
        self.steps.push(step);
    }

    pub fn note(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(CalculationStep::note(title, detail));
    }

    /// Record a computed value produced by `equation`
    pub fn computed(
        &mut self,
        equation: Equation,
        title: impl Into<String>,
        detail: impl Into<String>,
        value: f64,
        unit: &str,
    ) {
        self.push(
            CalculationStep::note(title, detail)
                .with_equation(equation)
                .with_value(value, unit),
        );
    }

    /// Record that an equation was used without adding a visible step
    pub fn uses(&mut self, equation: Equation, context: impl Into<String>) {
        self.tracker.record(equation, context, self.label.clone());
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Finish the log, yielding the steps and the distinct equations used
    pub fn finish(self) -> (Vec<CalculationStep>, Vec<Equation>) {
        let equations = self.tracker.unique_equations();
        (self.steps, equations)
    }

    /// Finish the log, keeping the full usage tracker
    pub fn into_parts(self) -> (Vec<CalculationStep>, EquationTracker) {
        (self.steps, self.tracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_log_records_equations() {
        let mut log = StepLog::new("L-1");
        log.note("Input", "532 nm CW");
        log.computed(Equation::BeamIrradiance, "Irradiance", "4P/(πd²)", 25.4, "W/m²");
        log.computed(Equation::BeamIrradiance, "Irradiance again", "repeat", 12.0, "W/m²");
        assert_eq!(log.len(), 3);

        let (steps, tracker) = log.clone().into_parts();
        assert_eq!(steps.len(), 3);
        assert_eq!(tracker.usages().len(), 2);
        assert_eq!(tracker.usages()[0].calculation_label, "L-1");

        let (_, equations) = log.finish();
        assert_eq!(equations, vec![Equation::BeamIrradiance]);
    }

    #[test]
    fn test_step_display() {
        let step = CalculationStep::note("NOHD", "distance").with_value(12.5, "m");
        assert_eq!(step.to_string(), "NOHD: distance = 1.2500e1 m");
        assert_eq!(CalculationStep::note("Note", "text").to_string(), "Note: text");
    }

    #[test]
    fn test_step_json_skips_empty_fields() {
        let json = serde_json::to_string(&CalculationStep::note("a", "b")).unwrap();
        assert_eq!(json, r#"{"title":"a","detail":"b"}"#);
    }
}
