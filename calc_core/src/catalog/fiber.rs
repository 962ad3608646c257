//! Optical fiber catalog: attenuation per transmission window and passive
//! splitter insertion loss.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::parse_catalog;
use crate::equations::rf;
use crate::errors::{CalcError, CalcResult};

const FIBER_TOML: &str = include_str!("../../data/fiber.toml");

/// Window lookups match within this distance of the catalog wavelength (nm)
pub const WINDOW_TOLERANCE_NM: f64 = 30.0;

/// Excess loss added to the ideal split for ratios not in the catalog (dB)
pub const SPLITTER_EXCESS_LOSS_DB: f64 = 1.0;

/// Fiber type per ISO/IEC 11801.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiberType {
    #[serde(rename = "OM1")]
    Om1,
    #[serde(rename = "OM2")]
    Om2,
    #[serde(rename = "OM3")]
    Om3,
    #[serde(rename = "OM4")]
    Om4,
    #[serde(rename = "OS2")]
    Os2,
}

impl FiberType {
    pub const ALL: [FiberType; 5] = [FiberType::Om1, FiberType::Om2, FiberType::Om3, FiberType::Om4, FiberType::Os2];

    /// Code string for catalog lookup
    pub fn code(&self) -> &'static str {
        match self {
            FiberType::Om1 => "OM1",
            FiberType::Om2 => "OM2",
            FiberType::Om3 => "OM3",
            FiberType::Om4 => "OM4",
            FiberType::Os2 => "OS2",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FiberType::Om1 => "OM1 multimode 62.5/125 µm",
            FiberType::Om2 => "OM2 multimode 50/125 µm",
            FiberType::Om3 => "OM3 laser-optimised multimode 50/125 µm",
            FiberType::Om4 => "OM4 laser-optimised multimode 50/125 µm",
            FiberType::Os2 => "OS2 single-mode (ITU-T G.652.D)",
        }
    }

    pub fn is_single_mode(&self) -> bool {
        matches!(self, FiberType::Os2)
    }

    /// Parse from a code, accepting "G.652" and "SMF" for single-mode
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase().replace(['.', ' ', '-'], "");
        match upper.as_str() {
            "OM1" => Some(FiberType::Om1),
            "OM2" => Some(FiberType::Om2),
            "OM3" => Some(FiberType::Om3),
            "OM4" => Some(FiberType::Om4),
            "OS2" | "OS1" | "G652" | "G652D" | "SMF" => Some(FiberType::Os2),
            _ => None,
        }
    }
}

impl std::fmt::Display for FiberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttenuationWindow {
    pub wavelength_nm: f64,
    pub attenuation_db_per_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct FiberEntry {
    code: String,
    windows: Vec<AttenuationWindow>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct SplitterEntry {
    ratio: u32,
    loss_db: f64,
}

#[derive(Debug, Deserialize)]
struct FiberCatalog {
    fiber: Vec<FiberEntry>,
    splitter: Vec<SplitterEntry>,
}

static CATALOG: Lazy<CalcResult<FiberCatalog>> = Lazy::new(|| parse_catalog("fiber.toml", FIBER_TOML));

fn catalog() -> CalcResult<&'static FiberCatalog> {
    CATALOG.as_ref().map_err(Clone::clone)
}

/// Catalog transmission windows for a fiber type
pub fn windows(fiber: FiberType) -> CalcResult<&'static [AttenuationWindow]> {
    catalog()?
        .fiber
        .iter()
        .find(|f| f.code == fiber.code())
        .map(|f| f.windows.as_slice())
        .ok_or_else(|| CalcError::catalog_entry_not_found("fiber", fiber.code()))
}

/// Attenuation (dB/km) of the window nearest to λ, within ±30 nm.
pub fn attenuation_db_per_km(fiber: FiberType, wavelength_nm: f64) -> CalcResult<f64> {
    windows(fiber)?
        .iter()
        .map(|w| ((w.wavelength_nm - wavelength_nm).abs(), w.attenuation_db_per_km))
        .filter(|(distance, _)| *distance <= WINDOW_TOLERANCE_NM)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, attenuation)| attenuation)
        .ok_or_else(|| {
            CalcError::catalog_entry_not_found("fiber window", format!("{} @ {} nm", fiber.code(), wavelength_nm))
        })
}

/// Insertion loss (dB) of a 1:N splitter.
///
/// Catalog values for 1:2 to 1:64, otherwise 10·log10(N) + 1 dB.
pub fn splitter_loss_db(ratio: u32) -> CalcResult<f64> {
    if ratio < 2 {
        return Err(CalcError::invalid_input(
            "splitter_ratio",
            ratio.to_string(),
            "Splitter must have at least 2 outputs",
        ));
    }
    let tabulated = catalog()?.splitter.iter().find(|s| s.ratio == ratio).map(|s| s.loss_db);
    Ok(tabulated.unwrap_or_else(|| rf::ideal_split_loss_db(ratio) + SPLITTER_EXCESS_LOSS_DB))
}
