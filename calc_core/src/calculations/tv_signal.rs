//! # TV Signal Budget
//!
//! Levels and carrier-to-noise ratios through a coaxial distribution network
//! (EN 60728-1), from the antenna to every subscriber outlet.
//!
//! ## Method
//!
//! The diagram is validated as a tree rooted at the antenna and walked parents
//! first. Each component adds its gain or subtracts its loss; amplifiers also
//! add a noise contribution referred to their input level. C/N contributions
//! combine in linear power along each path.
//!
//! The antenna's own C/N defaults to its output level above the thermal noise
//! floor when not given.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::steps::{CalculationStep, StepLog};
use crate::catalog::coax;
use crate::catalog::tv_standards::{ReceptionStandard, StandardRequirements};
use crate::diagram::{ComponentKind, DiagramComponent, SignalDiagram, Topology};
use crate::equations::registry::Equation;
use crate::equations::rf;
use crate::errors::{CalcError, CalcResult};
use crate::settings::{CalculatorSettings, TvSettings};
use crate::units::{Dbm, Dbuv, Decibels};

/// Input for a signal budget.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Apartment block",
///   "frequency_mhz": 794.0,
///   "standard": "DVB-T2",
///   "components": [
///     { "id": "ant", "kind": { "type": "Antenna", "output_level_dbuv": 68.0 } },
///     { "id": "amp", "input": "ant", "kind": { "type": "Amplifier", "gain_db": 25.0, "noise_figure_db": 5.0 } },
///     { "id": "c1", "input": "amp", "kind": { "type": "Cable", "cable_type": "RG-6", "length_m": 30.0 } },
///     { "id": "tv", "input": "c1", "kind": { "type": "Outlet", "loss_db": 1.5 } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBudgetInput {
    pub label: String,
    /// Carrier frequency used for cable attenuation (MHz)
    pub frequency_mhz: f64,
    /// Noise bandwidth; defaults to the standard's channel bandwidth (MHz)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth_mhz: Option<f64>,
    pub standard: ReceptionStandard,
    pub components: Vec<DiagramComponent>,
}

impl SignalBudgetInput {
    pub fn validate(&self) -> CalcResult<()> {
        if !self.frequency_mhz.is_finite() || self.frequency_mhz <= 0.0 {
            return Err(CalcError::invalid_input(
                "frequency_mhz",
                self.frequency_mhz.to_string(),
                "Frequency must be positive",
            ));
        }
        if let Some(b) = self.bandwidth_mhz {
            if !b.is_finite() || b <= 0.0 {
                return Err(CalcError::invalid_input(
                    "bandwidth_mhz",
                    b.to_string(),
                    "Bandwidth must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Level and noise after one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentReport {
    pub component_id: String,
    pub label: String,
    pub component_type: String,
    /// `None` for the antenna
    pub input_level_dbuv: Option<f64>,
    pub output_level_dbuv: f64,
    /// Gain (positive) or loss (negative) applied by the component
    pub change_db: f64,
    /// Cascaded C/N at the component output
    pub carrier_to_noise_db: f64,
    pub overloaded: bool,
}

/// Result at the end of a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafReport {
    pub component_id: String,
    pub label: String,
    /// Branch ends in an outlet rather than an open component
    pub terminated: bool,
    pub level_dbuv: f64,
    pub level_dbm: f64,
    pub carrier_to_noise_db: f64,
    /// Level above the standard's minimum (negative when too low)
    pub level_margin_low_db: f64,
    /// Level below the standard's maximum (negative when too high)
    pub level_margin_high_db: f64,
    pub cn_margin_db: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBudgetResult {
    pub label: String,
    pub standard: ReceptionStandard,
    pub frequency_mhz: f64,
    pub bandwidth_mhz: f64,
    pub noise_floor_dbuv: f64,
    /// Components in traversal order
    pub components: Vec<ComponentReport>,
    pub leaves: Vec<LeafReport>,
    /// Every leaf meets the level window and minimum C/N
    pub all_passed: bool,
    pub warnings: Vec<String>,
    pub steps: Vec<CalculationStep>,
    pub equations_used: Vec<Equation>,
}

impl SignalBudgetResult {
    /// Leaf with the smallest level or C/N margin
    pub fn worst_leaf(&self) -> Option<&LeafReport> {
        self.leaves.iter().min_by(|a, b| worst_margin(a).total_cmp(&worst_margin(b)))
    }
}

fn worst_margin(leaf: &LeafReport) -> f64 {
    leaf.level_margin_low_db
        .min(leaf.level_margin_high_db)
        .min(leaf.cn_margin_db)
}

/// Signal state at a component output.
#[derive(Debug, Clone)]
struct NodeState {
    level: Dbuv,
    /// C/N contributions (dB) along the path from the antenna
    noise_stages: Vec<f64>,
}

/// Walk the validated tree and compute every component's output.
fn propagate(
    topology: &Topology<'_>,
    frequency_mhz: f64,
    noise_floor_dbuv: f64,
    tv: &TvSettings,
    log: &mut StepLog,
    warnings: &mut Vec<String>,
) -> CalcResult<Vec<ComponentReport>> {
    let mut states: HashMap<&str, NodeState> = HashMap::new();
    let mut reports = Vec::with_capacity(topology.order().len());

    for &component in topology.order() {
        let upstream = match component.input.as_deref() {
            Some(id) => Some(
                states
                    .get(id)
                    .cloned()
                    .ok_or_else(|| CalcError::invalid_diagram(&component.id, "Input evaluated out of order"))?,
            ),
            None => None,
        };

        let (state, change_db, overloaded) = match (&component.kind, upstream) {
            (
                ComponentKind::Antenna {
                    output_level_dbuv,
                    carrier_to_noise_db,
                },
                None,
            ) => {
                let cn = carrier_to_noise_db.unwrap_or(output_level_dbuv - noise_floor_dbuv);
                let state = NodeState {
                    level: Dbuv(*output_level_dbuv),
                    noise_stages: vec![cn],
                };
                (state, 0.0, false)
            }
            (ComponentKind::Antenna { .. }, Some(_)) => {
                return Err(CalcError::invalid_diagram(&component.id, "Antenna cannot have an input"));
            }
            (_, None) => {
                return Err(CalcError::invalid_diagram(&component.id, "Component has no input"));
            }
            (kind, Some(mut state)) => {
                let change = match kind {
                    ComponentKind::Amplifier {
                        gain_db,
                        noise_figure_db,
                        ..
                    } => {
                        let stage_cn = rf::amplifier_stage_cn_db(state.level.0, noise_floor_dbuv, *noise_figure_db);
                        log.computed(
                            Equation::AmplifierCarrierToNoise,
                            format!("{} stage C/N", component.name()),
                            format!("input {:.2} dBµV, NF {} dB", state.level.0, noise_figure_db),
                            stage_cn,
                            "dB",
                        );
                        state.noise_stages.push(stage_cn);
                        *gain_db
                    }
                    ComponentKind::Cable {
                        cable_type,
                        length_m,
                        attenuation_db_per_100m,
                    } => {
                        let attenuation = match attenuation_db_per_100m {
                            Some(a) => *a,
                            None => {
                                let a = coax::cable(cable_type)?.attenuation_db_per_100m(frequency_mhz)?;
                                log.uses(Equation::CableAttenuationScaling, format!("{} at {} MHz", cable_type, frequency_mhz));
                                a
                            }
                        };
                        -attenuation * length_m / 100.0
                    }
                    ComponentKind::Splitter { outputs, loss_db } => {
                        let loss = match loss_db {
                            Some(loss) => *loss,
                            None => {
                                log.uses(Equation::SplitterLoss, format!("1:{} splitter", outputs));
                                rf::ideal_split_loss_db(*outputs) + tv.splitter_excess_loss_db
                            }
                        };
                        -loss
                    }
                    ComponentKind::Attenuator { loss_db } | ComponentKind::Outlet { loss_db } => -loss_db,
                    ComponentKind::Antenna { .. } => 0.0,
                };
                state.level = state.level + Decibels(change);

                let overloaded = match kind {
                    ComponentKind::Amplifier {
                        max_output_dbuv: Some(max),
                        ..
                    } => state.level.0 > *max,
                    _ => false,
                };
                if overloaded {
                    tracing::warn!(component = %component.id, level_dbuv = state.level.0, "amplifier overloaded");
                    warnings.push(format!(
                        "{}: output {:.1} dBµV exceeds the maximum output level",
                        component.name(),
                        state.level.0
                    ));
                }
                (state, change, overloaded)
            }
        };

        let cn = rf::cascade_cn_db(&state.noise_stages);
        log.computed(
            Equation::SignalLevelChain,
            format!("{} ({})", component.name(), component.kind.type_name()),
            format!("{:+.2} dB, C/N {:.2} dB", change_db, cn),
            state.level.0,
            "dBµV",
        );
        reports.push(ComponentReport {
            component_id: component.id.clone(),
            label: component.label.clone(),
            component_type: component.kind.type_name().to_string(),
            input_level_dbuv: component
                .input
                .as_deref()
                .and_then(|id| states.get(id))
                .map(|s| s.level.0),
            output_level_dbuv: state.level.0,
            change_db,
            carrier_to_noise_db: cn,
            overloaded,
        });
        states.insert(component.id.as_str(), state);
    }
    log.uses(Equation::CascadedCarrierToNoise, "path C/N");
    Ok(reports)
}

fn leaf_report(
    component: &DiagramComponent,
    report: &ComponentReport,
    requirements: &StandardRequirements,
) -> LeafReport {
    let level = report.output_level_dbuv;
    let level_margin_low_db = level - requirements.min_level_dbuv;
    let level_margin_high_db = requirements.max_level_dbuv - level;
    let cn_margin_db = report.carrier_to_noise_db - requirements.min_cn_db;
    LeafReport {
        component_id: component.id.clone(),
        label: component.label.clone(),
        terminated: matches!(component.kind, ComponentKind::Outlet { .. }),
        level_dbuv: level,
        level_dbm: Dbm::from(Dbuv(level)).0,
        carrier_to_noise_db: report.carrier_to_noise_db,
        level_margin_low_db,
        level_margin_high_db,
        cn_margin_db,
        passed: requirements.level_in_window(level) && cn_margin_db >= 0.0,
    }
}

/// Compute the signal budget of a distribution diagram.
pub fn calculate(input: &SignalBudgetInput, settings: &CalculatorSettings) -> CalcResult<SignalBudgetResult> {
    input.validate()?;

    let requirements = input.standard.requirements()?;
    let bandwidth_mhz = input.bandwidth_mhz.unwrap_or(requirements.bandwidth_mhz);
    let diagram = SignalDiagram::new(input.components.clone());
    let topology = diagram.validate()?;

    let mut log = StepLog::new(&input.label);
    let mut warnings = Vec::new();

    let tv = &settings.tv;
    let noise_floor_dbuv = rf::thermal_noise_floor_dbuv(bandwidth_mhz * 1e6, tv.noise_temperature_k, tv.impedance_ohm);
    log.computed(
        Equation::ThermalNoiseFloor,
        "Thermal noise floor",
        format!("{} MHz at {} K, {} Ω", bandwidth_mhz, tv.noise_temperature_k, tv.impedance_ohm),
        noise_floor_dbuv,
        "dBµV",
    );

    let components = propagate(&topology, input.frequency_mhz, noise_floor_dbuv, tv, &mut log, &mut warnings)?;
    let reports: HashMap<&str, &ComponentReport> = components.iter().map(|r| (r.component_id.as_str(), r)).collect();

    let mut leaves = Vec::new();
    for component in topology.leaves() {
        let report = reports
            .get(component.id.as_str())
            .ok_or_else(|| CalcError::invalid_diagram(&component.id, "Leaf was not evaluated"))?;
        let leaf = leaf_report(component, report, requirements);
        if !leaf.terminated {
            warnings.push(format!("{} is not terminated by an outlet", component.name()));
        }
        log.note(
            format!("{} result", component.name()),
            format!(
                "{:.2} dBµV ({:.2} dBm), C/N {:.2} dB: {}",
                leaf.level_dbuv,
                leaf.level_dbm,
                leaf.carrier_to_noise_db,
                if leaf.passed { "OK" } else { "FAIL" }
            ),
        );
        leaves.push(leaf);
    }
    log.uses(Equation::DbuvToDbm, "leaf levels");

    let all_passed = leaves.iter().all(|l| l.passed);
    tracing::debug!(
        label = %input.label,
        leaves = leaves.len(),
        all_passed,
        "signal budget"
    );
    let (steps, equations_used) = log.finish();

    Ok(SignalBudgetResult {
        label: input.label.clone(),
        standard: input.standard,
        frequency_mhz: input.frequency_mhz,
        bandwidth_mhz,
        noise_floor_dbuv,
        components,
        leaves,
        all_passed,
        warnings,
        steps,
        equations_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: &str, input: Option<&str>, kind: ComponentKind) -> DiagramComponent {
        DiagramComponent {
            id: id.to_string(),
            label: String::new(),
            kind,
            input: input.map(str::to_string),
            position: None,
        }
    }

    /// Antenna 70 dBµV → amp +20 dB → 50 m RG-6 → 1:4 splitter → outlets and an open attenuator
    fn network(max_output_dbuv: Option<f64>) -> Vec<DiagramComponent> {
        vec![
            component(
                "ant",
                None,
                ComponentKind::Antenna {
                    output_level_dbuv: 70.0,
                    carrier_to_noise_db: None,
                },
            ),
            component(
                "amp",
                Some("ant"),
                ComponentKind::Amplifier {
                    gain_db: 20.0,
                    noise_figure_db: 6.0,
                    max_output_dbuv,
                },
            ),
            component(
                "riser",
                Some("amp"),
                ComponentKind::Cable {
                    cable_type: "RG-6".to_string(),
                    length_m: 50.0,
                    attenuation_db_per_100m: None,
                },
            ),
            component(
                "split",
                Some("riser"),
                ComponentKind::Splitter {
                    outputs: 4,
                    loss_db: None,
                },
            ),
            component("tv1", Some("split"), ComponentKind::Outlet { loss_db: 1.5 }),
            component("tv2", Some("split"), ComponentKind::Outlet { loss_db: 1.5 }),
            component("tv3", Some("split"), ComponentKind::Outlet { loss_db: 1.5 }),
            component("spare", Some("split"), ComponentKind::Attenuator { loss_db: 10.0 }),
        ]
    }

    fn budget(standard: ReceptionStandard, components: Vec<DiagramComponent>) -> CalcResult<SignalBudgetResult> {
        let input = SignalBudgetInput {
            label: "block".to_string(),
            frequency_mhz: 800.0,
            bandwidth_mhz: None,
            standard,
            components,
        };
        calculate(&input, &CalculatorSettings::default())
    }

    #[test]
    fn test_outlet_levels() {
        let result = budget(ReceptionStandard::DvbT, network(None)).unwrap();
        // 70 + 20 - 9.7 - (6.02 + 0.5) - 1.5
        let tv1 = result.leaves.iter().find(|l| l.component_id == "tv1").unwrap();
        assert!((tv1.level_dbuv - 72.279).abs() < 0.01);
        assert!((tv1.level_dbm - (72.279 - 108.75)).abs() < 0.01);
        assert!(tv1.terminated);
        assert!(tv1.passed);
        assert_eq!(result.leaves.len(), 4);
    }

    #[test]
    fn test_noise_floor_and_cascade() {
        let result = budget(ReceptionStandard::DvbT, network(None)).unwrap();
        assert!((result.noise_floor_dbuv - 3.806).abs() < 0.01);

        // Antenna 66.19 dB and amplifier 60.19 dB combine to 59.22 dB
        let tv1 = result.leaves.iter().find(|l| l.component_id == "tv1").unwrap();
        assert!((tv1.carrier_to_noise_db - 59.22).abs() < 0.02);
        let antenna = &result.components[0];
        assert_eq!(antenna.input_level_dbuv, None);
    }

    #[test]
    fn test_unterminated_leaf_warning() {
        let result = budget(ReceptionStandard::DvbT, network(None)).unwrap();
        let spare = result.leaves.iter().find(|l| l.component_id == "spare").unwrap();
        assert!(!spare.terminated);
        assert!(result.warnings.iter().any(|w| w.contains("spare")));
    }

    #[test]
    fn test_level_window_failure() {
        // DVB-C allows at most 67 dBµV at the outlet
        let result = budget(ReceptionStandard::DvbC, network(None)).unwrap();
        let tv1 = result.leaves.iter().find(|l| l.component_id == "tv1").unwrap();
        assert!(!tv1.passed);
        assert!(tv1.level_margin_high_db < 0.0);
        assert!(!result.all_passed);
    }

    #[test]
    fn test_amplifier_overload() {
        let result = budget(ReceptionStandard::DvbT, network(Some(85.0))).unwrap();
        let amp = result.components.iter().find(|c| c.component_id == "amp").unwrap();
        assert!(amp.overloaded);
        assert!(result.warnings.iter().any(|w| w.contains("maximum output")));
    }

    #[test]
    fn test_traversal_order() {
        let mut components = network(None);
        components.reverse();
        let result = budget(ReceptionStandard::DvbT, components).unwrap();
        assert_eq!(result.components[0].component_id, "ant");
        assert_eq!(result.components[1].component_id, "amp");
    }

    #[test]
    fn test_invalid_diagrams() {
        let mut components = network(None);
        components.push(component("orphan", Some("missing"), ComponentKind::Outlet { loss_db: 0.0 }));
        let err = budget(ReceptionStandard::DvbT, components).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DIAGRAM");

        let mut components = network(None);
        components.push(component("extra", Some("amp"), ComponentKind::Outlet { loss_db: 0.0 }));
        assert!(budget(ReceptionStandard::DvbT, components).is_err());
    }

    #[test]
    fn test_unknown_cable() {
        let mut components = network(None);
        components[2].kind = ComponentKind::Cable {
            cable_type: "RG-999".to_string(),
            length_m: 10.0,
            attenuation_db_per_100m: None,
        };
        let err = budget(ReceptionStandard::DvbT, components).unwrap_err();
        assert_eq!(err.error_code(), "CATALOG_ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_worst_leaf() {
        let result = budget(ReceptionStandard::DvbT, network(None)).unwrap();
        // Outlets sit 1.72 dB under the 74 dBµV ceiling; the first one is reported
        let worst = result.worst_leaf().unwrap();
        assert_eq!(worst.component_id, "tv1");
        assert!((worst.level_margin_high_db - 1.721).abs() < 0.01);
    }

    #[test]
    fn test_invalid_frequency() {
        let input = SignalBudgetInput {
            label: "x".to_string(),
            frequency_mhz: 0.0,
            bandwidth_mhz: None,
            standard: ReceptionStandard::DvbT,
            components: network(None),
        };
        assert!(calculate(&input, &CalculatorSettings::default()).is_err());
    }
}
