//! Coaxial cable attenuation catalog.
//!
//! Attenuation is tabulated in dB/100 m at fixed frequencies and interpolated
//! in √f between them; outside the tabulated range the nearest point is scaled
//! by the skin-effect law.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::parse_catalog;
use crate::equations::rf;
use crate::errors::{CalcError, CalcResult};

const COAX_TOML: &str = include_str!("../../data/coax_cables.toml");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttenuationPoint {
    pub frequency_mhz: f64,
    pub attenuation_db_per_100m: f64,
}

/// A coaxial cable type with its attenuation curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoaxCable {
    /// Catalog code (e.g., "RG-6")
    pub code: String,
    pub description: String,
    /// Sorted by frequency
    pub points: Vec<AttenuationPoint>,
}

impl CoaxCable {
    /// Attenuation (dB/100 m) at the given frequency
    pub fn attenuation_db_per_100m(&self, frequency_mhz: f64) -> CalcResult<f64> {
        if !frequency_mhz.is_finite() || frequency_mhz <= 0.0 {
            return Err(CalcError::invalid_input(
                "frequency_mhz",
                frequency_mhz.to_string(),
                "Frequency must be positive",
            ));
        }
        let points: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| (p.frequency_mhz, p.attenuation_db_per_100m))
            .collect();
        rf::interpolate_sqrt_f(&points, frequency_mhz)
            .ok_or_else(|| CalcError::catalog_entry_not_found("coax attenuation", &self.code))
    }

    /// Loss (dB) of a run of `length_m` at the given frequency
    pub fn loss_db(&self, length_m: f64, frequency_mhz: f64) -> CalcResult<f64> {
        Ok(self.attenuation_db_per_100m(frequency_mhz)? * length_m / 100.0)
    }
}

#[derive(Debug, Deserialize)]
struct CoaxCatalog {
    cable: Vec<CoaxCable>,
}

static CATALOG: Lazy<CalcResult<Vec<CoaxCable>>> = Lazy::new(|| {
    let catalog: CoaxCatalog = parse_catalog("coax_cables.toml", COAX_TOML)?;
    let mut cables = catalog.cable;
    for cable in &mut cables {
        cable
            .points
            .sort_by(|a, b| a.frequency_mhz.total_cmp(&b.frequency_mhz));
    }
    Ok(cables)
});

/// All cables in the catalog
pub fn all_cables() -> CalcResult<&'static [CoaxCable]> {
    CATALOG.as_ref().map(|v| v.as_slice()).map_err(Clone::clone)
}

/// Look up a cable by code, ignoring case, spaces and hyphens
pub fn cable(code: &str) -> CalcResult<&'static CoaxCable> {
    let wanted = normalize(code);
    all_cables()?
        .iter()
        .find(|c| normalize(&c.code) == wanted)
        .ok_or_else(|| CalcError::catalog_entry_not_found("coax cable", code))
}

fn normalize(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_parses() {
        let cables = all_cables().unwrap();
        assert_eq!(cables.len(), 4);
        for c in cables {
            assert!(c.points.windows(2).all(|w| w[0].frequency_mhz < w[1].frequency_mhz));
        }
    }

    #[test]
    fn test_lookup_flexible_code() {
        assert_eq!(cable("rg6").unwrap().code, "RG-6");
        assert_eq!(cable("RG 11").unwrap().code, "RG-11");
        let err = cable("RG-999").unwrap_err();
        assert_eq!(err.error_code(), "CATALOG_ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_tabulated_frequency() {
        let rg6 = cable("RG-6").unwrap();
        assert!((rg6.attenuation_db_per_100m(400.0).unwrap() - 13.5).abs() < 1e-9);
    }

    #[test]
    fn test_interpolated_frequency() {
        let rg6 = cable("RG-6").unwrap();
        let a = rg6.attenuation_db_per_100m(600.0).unwrap();
        assert!(a > 13.5 && a < 19.4);
    }

    #[test]
    fn test_run_loss() {
        let rg6 = cable("RG-6").unwrap();
        // 25 m at 800 MHz
        assert!((rg6.loss_db(25.0, 800.0).unwrap() - 4.85).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_frequency() {
        let rg6 = cable("RG-6").unwrap();
        assert!(rg6.attenuation_db_per_100m(0.0).is_err());
    }
}
