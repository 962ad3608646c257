//! # Calculator Settings
//!
//! Defaults that the calculators fall back to when an input leaves a value
//! unset: time bases, exposure durations, component losses, noise reference.
//! Every section has a `Default`, so an empty file is a valid configuration.
//!
//! ## TOML Format
//!
//! ```toml
//! [classification]
//! default_aggregation = "Auto"
//! default_time_base_s = 100.0
//!
//! [exposure]
//! visible_duration_s = 0.25
//!
//! [fiber]
//! connector_loss_db = 0.75
//! safety_margin_db = 3.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calculations::classification::AggregationMode;
use crate::constants::{MAX_TABLE_DURATION_S, REFERENCE_TEMPERATURE_K, SYSTEM_IMPEDANCE_OHM};
use crate::errors::{CalcError, CalcResult};

/// Full settings file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculatorSettings {
    #[serde(default)]
    pub classification: ClassificationSettings,
    #[serde(default)]
    pub exposure: ExposureSettings,
    #[serde(default)]
    pub eyewear: EyewearSettings,
    #[serde(default)]
    pub tv: TvSettings,
    #[serde(default)]
    pub fiber: FiberSettings,
}

/// Time bases and aggregation for the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationSettings {
    /// Used when the input does not choose a mode
    pub default_aggregation: AggregationMode,
    /// Time base below 400 nm (s)
    pub ultraviolet_time_base_s: f64,
    /// Time base for Classes 2, 2M and 3R in the visible (s)
    pub aversion_time_base_s: f64,
    /// Time base everywhere else (s)
    pub default_time_base_s: f64,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            default_aggregation: AggregationMode::Auto,
            ultraviolet_time_base_s: 3.0e4,
            aversion_time_base_s: 0.25,
            default_time_base_s: 100.0,
        }
    }
}

/// Default exposure durations for NOHD and eyewear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureSettings {
    /// 400–700 nm, aversion response (s)
    pub visible_duration_s: f64,
    /// 700 nm and above (s)
    pub infrared_duration_s: f64,
    /// Below 400 nm, a working day (s)
    pub ultraviolet_duration_s: f64,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            visible_duration_s: 0.25,
            infrared_duration_s: 10.0,
            ultraviolet_duration_s: 3.0e4,
        }
    }
}

impl ExposureSettings {
    /// Default exposure duration for a wavelength
    pub fn duration_for(&self, wavelength_nm: f64) -> f64 {
        if wavelength_nm < 400.0 {
            self.ultraviolet_duration_s
        } else if wavelength_nm < 700.0 {
            self.visible_duration_s
        } else {
            self.infrared_duration_s
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyewearSettings {
    /// Report EN 207 scale numbers alongside the optical density
    pub include_scale_number: bool,
    /// Highest scale number available (LB10)
    pub max_scale_number: u32,
}

impl Default for EyewearSettings {
    fn default() -> Self {
        Self {
            include_scale_number: true,
            max_scale_number: 10,
        }
    }
}

/// Noise reference and default component losses for TV networks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvSettings {
    pub noise_temperature_k: f64,
    pub impedance_ohm: f64,
    /// Added to the ideal split loss when a splitter has no explicit loss (dB)
    pub splitter_excess_loss_db: f64,
}

impl Default for TvSettings {
    fn default() -> Self {
        Self {
            noise_temperature_k: REFERENCE_TEMPERATURE_K,
            impedance_ohm: SYSTEM_IMPEDANCE_OHM,
            splitter_excess_loss_db: 0.5,
        }
    }
}

/// Default per-element losses for fiber budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiberSettings {
    pub connector_loss_db: f64,
    pub splice_loss_db: f64,
    pub safety_margin_db: f64,
}

impl Default for FiberSettings {
    fn default() -> Self {
        Self {
            connector_loss_db: 0.5,
            splice_loss_db: 0.1,
            safety_margin_db: 3.0,
        }
    }
}

impl CalculatorSettings {
    /// Parse and validate TOML settings
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        let settings: CalculatorSettings =
            toml::from_str(text).map_err(|e| CalcError::config_error("settings (TOML)", e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate JSON settings
    pub fn from_json_str(text: &str) -> CalcResult<Self> {
        let settings: CalculatorSettings =
            serde_json::from_str(text).map_err(|e| CalcError::config_error("settings (JSON)", e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        tracing::debug!(path = %source_name, "loading calculator settings");
        let content =
            std::fs::read_to_string(path).map_err(|e| CalcError::config_error(&source_name, e.to_string()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        parsed.map_err(|e| match e {
            CalcError::ConfigError { reason, .. } => CalcError::config_error(source_name, reason),
            other => other,
        })
    }

    /// Check every value is usable by the calculators
    pub fn validate(&self) -> CalcResult<()> {
        let durations = [
            ("classification.ultraviolet_time_base_s", self.classification.ultraviolet_time_base_s),
            ("classification.aversion_time_base_s", self.classification.aversion_time_base_s),
            ("classification.default_time_base_s", self.classification.default_time_base_s),
            ("exposure.visible_duration_s", self.exposure.visible_duration_s),
            ("exposure.infrared_duration_s", self.exposure.infrared_duration_s),
            ("exposure.ultraviolet_duration_s", self.exposure.ultraviolet_duration_s),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value <= 0.0 || value > MAX_TABLE_DURATION_S {
                return Err(CalcError::config_error(
                    name,
                    format!("{} s is outside (0, {}] s", value, MAX_TABLE_DURATION_S),
                ));
            }
        }

        let non_negative = [
            ("tv.splitter_excess_loss_db", self.tv.splitter_excess_loss_db),
            ("fiber.connector_loss_db", self.fiber.connector_loss_db),
            ("fiber.splice_loss_db", self.fiber.splice_loss_db),
            ("fiber.safety_margin_db", self.fiber.safety_margin_db),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::config_error(name, format!("{} must be non-negative", value)));
            }
        }

        for (name, value) in [
            ("tv.noise_temperature_k", self.tv.noise_temperature_k),
            ("tv.impedance_ohm", self.tv.impedance_ohm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::config_error(name, format!("{} must be positive", value)));
            }
        }

        if self.eyewear.max_scale_number == 0 {
            return Err(CalcError::config_error("eyewear.max_scale_number", "must be at least 1"));
        }
        Ok(())
    }
}
