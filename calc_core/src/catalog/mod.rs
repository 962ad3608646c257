//! # Component Catalogs
//!
//! Reference data for the link-budget calculators. The data lives in TOML files
//! under `calc_core/data/`, embedded at compile time and parsed on first use.
//!
//! ## Catalogs
//!
//! - [`coax`] - Coaxial cable attenuation vs frequency
//! - [`fiber`] - Optical fiber attenuation windows and splitter losses
//! - [`tv_standards`] - Outlet level windows and minimum C/N per reception standard
//!
//! ## Example
//!
//! ```rust
//! use calc_core::catalog::{coax, fiber::{self, FiberType}, tv_standards::ReceptionStandard};
//!
//! let rg6 = coax::cable("RG-6").unwrap();
//! let loss = rg6.attenuation_db_per_100m(800.0).unwrap();
//! assert!((loss - 19.4).abs() < 1e-9);
//!
//! let alpha = fiber::attenuation_db_per_km(FiberType::Os2, 1550.0).unwrap();
//! assert_eq!(alpha, 0.3);
//!
//! let dvbt = ReceptionStandard::DvbT.requirements().unwrap();
//! assert_eq!(dvbt.min_cn_db, 25.0);
//! ```

pub mod coax;
pub mod fiber;
pub mod tv_standards;

pub use coax::CoaxCable;
pub use fiber::FiberType;
pub use tv_standards::{ReceptionStandard, StandardRequirements};

use serde::de::DeserializeOwned;

use crate::errors::{CalcError, CalcResult};

/// Parse an embedded catalog, reporting failures as configuration errors.
pub(crate) fn parse_catalog<T: DeserializeOwned>(source_name: &str, text: &str) -> CalcResult<T> {
    toml::from_str(text).map_err(|e| CalcError::config_error(source_name, e.to_string()))
}
