//! # Signal Distribution Diagram
//!
//! The TV signal budget works on a tree of components fed from a single
//! antenna. Each component names the component feeding it through `input`;
//! only splitters may feed more than one component.
//!
//! Positions are carried for front ends that draw the diagram; the calculators
//! never read them.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::diagram::{ComponentKind, DiagramComponent, SignalDiagram};
//!
//! let antenna = DiagramComponent::new("Roof antenna", ComponentKind::Antenna {
//!     output_level_dbuv: 65.0,
//!     carrier_to_noise_db: None,
//! });
//! let outlet = DiagramComponent::new("Living room", ComponentKind::Outlet { loss_db: 1.5 })
//!     .fed_by(&antenna.id);
//!
//! let diagram = SignalDiagram::new(vec![antenna, outlet]);
//! let topology = diagram.validate().unwrap();
//! assert_eq!(topology.order().len(), 2);
//! assert_eq!(topology.leaves().len(), 1);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};

/// Canvas position of a component (front-end data only)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagramPosition {
    pub x: f64,
    pub y: f64,
}

/// Component type and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentKind {
    /// Signal source; exactly one per diagram
    Antenna {
        /// Level delivered at the antenna terminals
        output_level_dbuv: f64,
        /// C/N of the received signal, if known
        #[serde(default)]
        carrier_to_noise_db: Option<f64>,
    },
    Amplifier {
        gain_db: f64,
        noise_figure_db: f64,
        /// Maximum output level before intermodulation becomes unacceptable
        #[serde(default)]
        max_output_dbuv: Option<f64>,
    },
    Cable {
        /// Coax catalog code (e.g., "RG-6")
        cable_type: String,
        length_m: f64,
        /// Overrides the catalog attenuation
        #[serde(default)]
        attenuation_db_per_100m: Option<f64>,
    },
    Splitter {
        outputs: u32,
        /// Loss per branch; defaults to the ideal split plus excess loss
        #[serde(default)]
        loss_db: Option<f64>,
    },
    Attenuator { loss_db: f64 },
    /// Subscriber outlet
    Outlet {
        #[serde(default)]
        loss_db: f64,
    },
}

impl ComponentKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentKind::Antenna { .. } => "Antenna",
            ComponentKind::Amplifier { .. } => "Amplifier",
            ComponentKind::Cable { .. } => "Cable",
            ComponentKind::Splitter { .. } => "Splitter",
            ComponentKind::Attenuator { .. } => "Attenuator",
            ComponentKind::Outlet { .. } => "Outlet",
        }
    }

    /// Number of components this kind may feed
    pub fn max_fan_out(&self) -> usize {
        match self {
            ComponentKind::Splitter { outputs, .. } => *outputs as usize,
            ComponentKind::Outlet { .. } => 0,
            _ => 1,
        }
    }
}

/// A node of the distribution diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramComponent {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub kind: ComponentKind,
    /// Id of the component feeding this one (None for the antenna)
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub position: Option<DiagramPosition>,
}

impl DiagramComponent {
    /// Create a component with a fresh UUID
    pub fn new(label: impl Into<String>, kind: ComponentKind) -> Self {
        DiagramComponent {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            kind,
            input: None,
            position: None,
        }
    }

    /// Connect this component's input to `upstream_id`
    pub fn fed_by(mut self, upstream_id: &str) -> Self {
        self.input = Some(upstream_id.to_string());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(DiagramPosition { x, y });
        self
    }

    /// Label if set, otherwise the id
    pub fn name(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    fn validate_parameters(&self) -> CalcResult<()> {
        let check = |name: &str, value: f64, allow_negative: bool| -> CalcResult<()> {
            if !value.is_finite() || (!allow_negative && value < 0.0) {
                return Err(CalcError::invalid_diagram(
                    &self.id,
                    format!("{} {} is not valid ({})", self.kind.type_name(), name, value),
                ));
            }
            Ok(())
        };
        match &self.kind {
            ComponentKind::Antenna {
                output_level_dbuv,
                carrier_to_noise_db,
            } => {
                check("output_level_dbuv", *output_level_dbuv, true)?;
                if let Some(cn) = carrier_to_noise_db {
                    check("carrier_to_noise_db", *cn, true)?;
                }
            }
            ComponentKind::Amplifier {
                gain_db,
                noise_figure_db,
                max_output_dbuv,
            } => {
                check("gain_db", *gain_db, true)?;
                check("noise_figure_db", *noise_figure_db, false)?;
                if let Some(max) = max_output_dbuv {
                    check("max_output_dbuv", *max, true)?;
                }
            }
            ComponentKind::Cable {
                length_m,
                attenuation_db_per_100m,
                ..
            } => {
                check("length_m", *length_m, false)?;
                if let Some(a) = attenuation_db_per_100m {
                    check("attenuation_db_per_100m", *a, false)?;
                }
            }
            ComponentKind::Splitter { outputs, loss_db } => {
                if *outputs < 2 {
                    return Err(CalcError::invalid_diagram(&self.id, "Splitter needs at least 2 outputs"));
                }
                if let Some(loss) = loss_db {
                    check("loss_db", *loss, false)?;
                }
            }
            ComponentKind::Attenuator { loss_db } | ComponentKind::Outlet { loss_db } => {
                check("loss_db", *loss_db, false)?;
            }
        }
        Ok(())
    }
}

/// The full diagram as entered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalDiagram {
    pub components: Vec<DiagramComponent>,
}

/// Validated tree structure of a diagram.
#[derive(Debug, Clone)]
pub struct Topology<'a> {
    order: Vec<&'a DiagramComponent>,
    children: HashMap<&'a str, Vec<&'a DiagramComponent>>,
}

impl<'a> Topology<'a> {
    /// Components in depth-first order from the antenna; parents precede children
    pub fn order(&self) -> &[&'a DiagramComponent] {
        &self.order
    }

    /// Components fed by `id`, in declaration order
    pub fn children(&self, id: &str) -> &[&'a DiagramComponent] {
        self.children.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Components feeding nothing
    pub fn leaves(&self) -> Vec<&'a DiagramComponent> {
        self.order
            .iter()
            .filter(|c| self.children(&c.id).is_empty())
            .copied()
            .collect()
    }
}

impl SignalDiagram {
    pub fn new(components: Vec<DiagramComponent>) -> Self {
        SignalDiagram { components }
    }

    pub fn get(&self, id: &str) -> Option<&DiagramComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Check the diagram forms a tree rooted at a single antenna.
    pub fn validate(&self) -> CalcResult<Topology<'_>> {
        if self.components.is_empty() {
            return Err(CalcError::invalid_diagram("", "Diagram has no components"));
        }

        let mut ids = HashSet::new();
        for component in &self.components {
            if component.id.trim().is_empty() {
                return Err(CalcError::invalid_diagram(component.name(), "Component id is empty"));
            }
            if !ids.insert(component.id.as_str()) {
                return Err(CalcError::invalid_diagram(&component.id, "Duplicate component id"));
            }
            component.validate_parameters()?;
        }

        let antennas: Vec<&DiagramComponent> = self
            .components
            .iter()
            .filter(|c| matches!(c.kind, ComponentKind::Antenna { .. }))
            .collect();
        let antenna = match antennas.as_slice() {
            [single] => *single,
            [] => return Err(CalcError::invalid_diagram("", "Diagram has no antenna")),
            [_, second, ..] => {
                return Err(CalcError::invalid_diagram(&second.id, "Diagram has more than one antenna"));
            }
        };
        if antenna.input.is_some() {
            return Err(CalcError::invalid_diagram(&antenna.id, "Antenna cannot have an input"));
        }

        let mut children: HashMap<&str, Vec<&DiagramComponent>> = HashMap::new();
        for component in &self.components {
            if component.id == antenna.id {
                continue;
            }
            let input = component
                .input
                .as_deref()
                .ok_or_else(|| CalcError::invalid_diagram(&component.id, "Component has no input"))?;
            if !ids.contains(input) {
                return Err(CalcError::invalid_diagram(
                    &component.id,
                    format!("Input '{}' does not exist", input),
                ));
            }
            children.entry(input).or_default().push(component);
        }

        for component in &self.components {
            let fed = children.get(component.id.as_str()).map_or(0, Vec::len);
            let allowed = component.kind.max_fan_out();
            if fed > allowed {
                let reason = match component.kind {
                    ComponentKind::Outlet { .. } => "Outlet cannot feed other components".to_string(),
                    ComponentKind::Splitter { outputs, .. } => {
                        format!("Splitter has {} outputs but feeds {} components", outputs, fed)
                    }
                    _ => format!(
                        "{} feeds {} components; only splitters may branch",
                        component.kind.type_name(),
                        fed
                    ),
                };
                return Err(CalcError::invalid_diagram(&component.id, reason));
            }
        }

        let mut order = Vec::with_capacity(self.components.len());
        let mut stack = vec![antenna];
        let mut visited = HashSet::new();
        while let Some(component) = stack.pop() {
            if !visited.insert(component.id.as_str()) {
                continue;
            }
            order.push(component);
            if let Some(next) = children.get(component.id.as_str()) {
                stack.extend(next.iter().rev().copied());
            }
        }

        if let Some(orphan) = self.components.iter().find(|c| !visited.contains(c.id.as_str())) {
            return Err(CalcError::invalid_diagram(&orphan.id, "Component is not connected to the antenna"));
        }

        Ok(Topology { order, children })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn antenna() -> DiagramComponent {
        DiagramComponent {
            id: "ant".to_string(),
            label: "Antenna".to_string(),
            kind: ComponentKind::Antenna {
                output_level_dbuv: 70.0,
                carrier_to_noise_db: None,
            },
            input: None,
            position: None,
        }
    }

    fn component(id: &str, kind: ComponentKind, input: &str) -> DiagramComponent {
        DiagramComponent {
            id: id.to_string(),
            label: String::new(),
            kind,
            input: Some(input.to_string()),
            position: None,
        }
    }

    fn outlet(id: &str, input: &str) -> DiagramComponent {
        component(id, ComponentKind::Outlet { loss_db: 1.0 }, input)
    }

    fn splitter(id: &str, outputs: u32, input: &str) -> DiagramComponent {
        component(id, ComponentKind::Splitter { outputs, loss_db: None }, input)
    }

    fn reason(err: CalcError) -> String {
        match err {
            CalcError::InvalidDiagram { reason, .. } => reason,
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_tree_order_parents_first() {
        let diagram = SignalDiagram::new(vec![
            outlet("o2", "sp"),
            splitter("sp", 2, "ant"),
            antenna(),
            outlet("o1", "sp"),
        ]);
        let topology = diagram.validate().unwrap();
        let order: Vec<&str> = topology.order().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["ant", "sp", "o2", "o1"]);
        assert_eq!(topology.leaves().len(), 2);
        assert_eq!(topology.children("sp").len(), 2);
    }

    #[test]
    fn test_rejects_missing_antenna() {
        let diagram = SignalDiagram::new(vec![outlet("o1", "x")]);
        assert_eq!(reason(diagram.validate().unwrap_err()), "Diagram has no antenna");
    }

    #[test]
    fn test_rejects_two_antennas() {
        let mut second = antenna();
        second.id = "ant2".to_string();
        let diagram = SignalDiagram::new(vec![antenna(), second]);
        assert!(reason(diagram.validate().unwrap_err()).contains("more than one antenna"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let diagram = SignalDiagram::new(vec![antenna(), outlet("o1", "ant"), outlet("o1", "ant")]);
        assert_eq!(reason(diagram.validate().unwrap_err()), "Duplicate component id");
    }

    #[test]
    fn test_rejects_dangling_input() {
        let diagram = SignalDiagram::new(vec![antenna(), outlet("o1", "nowhere")]);
        assert!(reason(diagram.validate().unwrap_err()).contains("does not exist"));
    }

    #[test]
    fn test_rejects_branching_without_splitter() {
        let amp = component(
            "amp",
            ComponentKind::Amplifier {
                gain_db: 20.0,
                noise_figure_db: 5.0,
                max_output_dbuv: None,
            },
            "ant",
        );
        let diagram = SignalDiagram::new(vec![antenna(), amp, outlet("o1", "amp"), outlet("o2", "amp")]);
        assert!(reason(diagram.validate().unwrap_err()).contains("only splitters may branch"));
    }

    #[test]
    fn test_rejects_overfull_splitter() {
        let diagram = SignalDiagram::new(vec![
            antenna(),
            splitter("sp", 2, "ant"),
            outlet("o1", "sp"),
            outlet("o2", "sp"),
            outlet("o3", "sp"),
        ]);
        assert!(reason(diagram.validate().unwrap_err()).contains("2 outputs but feeds 3"));
    }

    #[test]
    fn test_rejects_outlet_feeding_component() {
        let diagram = SignalDiagram::new(vec![antenna(), outlet("o1", "ant"), outlet("o2", "o1")]);
        assert!(reason(diagram.validate().unwrap_err()).contains("Outlet cannot feed"));
    }

    #[test]
    fn test_rejects_disconnected_cycle() {
        let diagram = SignalDiagram::new(vec![
            antenna(),
            outlet("o1", "ant"),
            component("a", ComponentKind::Attenuator { loss_db: 3.0 }, "b"),
            component("b", ComponentKind::Attenuator { loss_db: 3.0 }, "a"),
        ]);
        assert!(reason(diagram.validate().unwrap_err()).contains("not connected"));
    }

    #[test]
    fn test_rejects_negative_cable_length() {
        let cable = component(
            "c1",
            ComponentKind::Cable {
                cable_type: "RG-6".to_string(),
                length_m: -5.0,
                attenuation_db_per_100m: None,
            },
            "ant",
        );
        let diagram = SignalDiagram::new(vec![antenna(), cable]);
        assert!(reason(diagram.validate().unwrap_err()).contains("length_m"));
    }

    #[test]
    fn test_component_json() {
        let json = r#"{
            "id": "c1",
            "kind": { "type": "Cable", "cable_type": "RG-6", "length_m": 20.0 },
            "input": "ant",
            "position": { "x": 120.0, "y": 40.0 }
        }"#;
        let c: DiagramComponent = serde_json::from_str(json).unwrap();
        assert_eq!(c.kind.type_name(), "Cable");
        assert_eq!(c.name(), "c1");
        assert_eq!(c.position, Some(DiagramPosition { x: 120.0, y: 40.0 }));
    }

    #[test]
    fn test_builder_helpers() {
        let ant = DiagramComponent::new("Mast", ComponentKind::Antenna {
            output_level_dbuv: 60.0,
            carrier_to_noise_db: Some(35.0),
        });
        let out = DiagramComponent::new("Outlet", ComponentKind::Outlet { loss_db: 0.0 })
            .fed_by(&ant.id)
            .at(10.0, 20.0);
        assert_eq!(out.input.as_deref(), Some(ant.id.as_str()));
        assert!(SignalDiagram::new(vec![ant, out]).validate().is_ok());
    }
}
