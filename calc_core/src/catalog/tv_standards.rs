//! Reception standards and their outlet planning targets.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::parse_catalog;
use crate::errors::{CalcError, CalcResult};

const STANDARDS_TOML: &str = include_str!("../../data/tv_standards.toml");

/// Broadcast or cable reception standard carried by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceptionStandard {
    #[serde(rename = "DVB-T")]
    DvbT,
    #[serde(rename = "DVB-T2")]
    DvbT2,
    #[serde(rename = "DVB-C")]
    DvbC,
    #[serde(rename = "DVB-S")]
    DvbS,
    #[serde(rename = "DVB-S2")]
    DvbS2,
    #[serde(rename = "PAL")]
    AnalogPal,
}

impl ReceptionStandard {
    pub const ALL: [ReceptionStandard; 6] = [
        ReceptionStandard::DvbT,
        ReceptionStandard::DvbT2,
        ReceptionStandard::DvbC,
        ReceptionStandard::DvbS,
        ReceptionStandard::DvbS2,
        ReceptionStandard::AnalogPal,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ReceptionStandard::DvbT => "DVB-T",
            ReceptionStandard::DvbT2 => "DVB-T2",
            ReceptionStandard::DvbC => "DVB-C",
            ReceptionStandard::DvbS => "DVB-S",
            ReceptionStandard::DvbS2 => "DVB-S2",
            ReceptionStandard::AnalogPal => "PAL",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReceptionStandard::DvbT => "DVB-T terrestrial",
            ReceptionStandard::DvbT2 => "DVB-T2 terrestrial",
            ReceptionStandard::DvbC => "DVB-C cable (256-QAM)",
            ReceptionStandard::DvbS => "DVB-S satellite IF",
            ReceptionStandard::DvbS2 => "DVB-S2 satellite IF",
            ReceptionStandard::AnalogPal => "Analog PAL",
        }
    }

    /// Planning targets for this standard
    pub fn requirements(&self) -> CalcResult<&'static StandardRequirements> {
        CATALOG
            .as_ref()
            .map_err(Clone::clone)?
            .iter()
            .find(|r| r.code == self.code())
            .ok_or_else(|| CalcError::catalog_entry_not_found("reception standard", self.code()))
    }
}

impl std::fmt::Display for ReceptionStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Outlet level window and minimum C/N for a standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardRequirements {
    pub code: String,
    pub min_level_dbuv: f64,
    pub max_level_dbuv: f64,
    pub min_cn_db: f64,
    /// Noise bandwidth used for the thermal floor (MHz)
    pub bandwidth_mhz: f64,
}

impl StandardRequirements {
    /// Whether a level lies inside the outlet window
    pub fn level_in_window(&self, level_dbuv: f64) -> bool {
        level_dbuv >= self.min_level_dbuv && level_dbuv <= self.max_level_dbuv
    }
}

#[derive(Debug, Deserialize)]
struct StandardsCatalog {
    standard: Vec<StandardRequirements>,
}

static CATALOG: Lazy<CalcResult<Vec<StandardRequirements>>> = Lazy::new(|| {
    let catalog: StandardsCatalog = parse_catalog("tv_standards.toml", STANDARDS_TOML)?;
    Ok(catalog.standard)
});
