//! # Error Types
//!
//! Structured error types for calc_core. These errors are designed to be
//! informative for both humans and LLMs, providing enough context to
//! understand and fix issues programmatically.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_power(power_w: f64) -> CalcResult<()> {
//!     if power_w <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "power_w".to_string(),
//!             value: power_w.to_string(),
//!             reason: "Power must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by LLMs and other consumers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Wavelength lies outside the range covered by the exposure-limit tables
    #[error("Unsupported wavelength: {wavelength_nm} nm - {reason}")]
    UnsupportedWavelength { wavelength_nm: f64, reason: String },

    /// Catalog lookup failed (cable type, fiber window, reception standard)
    #[error("Catalog entry not found: {catalog} '{key}'")]
    CatalogEntryNotFound { catalog: String, key: String },

    /// Signal diagram is structurally invalid (dangling input, cycle, fan-out)
    #[error("Invalid diagram at '{component_id}': {reason}")]
    InvalidDiagram { component_id: String, reason: String },

    /// Calculation failed (no applicable limit, non-finite intermediate, etc.)
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// Settings file could not be read or failed validation
    #[error("Configuration error: {source_name} - {reason}")]
    ConfigError { source_name: String, reason: String },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnsupportedWavelength error
    pub fn unsupported_wavelength(wavelength_nm: f64, reason: impl Into<String>) -> Self {
        CalcError::UnsupportedWavelength {
            wavelength_nm,
            reason: reason.into(),
        }
    }

    /// Create a CatalogEntryNotFound error
    pub fn catalog_entry_not_found(catalog: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::CatalogEntryNotFound {
            catalog: catalog.into(),
            key: key.into(),
        }
    }

    /// Create an InvalidDiagram error
    pub fn invalid_diagram(component_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidDiagram {
            component_id: component_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConfigError
    pub fn config_error(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if this error is caused by the caller's input (fixable by editing the form)
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::MissingField { .. }
                | CalcError::UnsupportedWavelength { .. }
                | CalcError::InvalidDiagram { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnsupportedWavelength { .. } => "UNSUPPORTED_WAVELENGTH",
            CalcError::CatalogEntryNotFound { .. } => "CATALOG_ENTRY_NOT_FOUND",
            CalcError::InvalidDiagram { .. } => "INVALID_DIAGRAM",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::serialization(e.to_string())
    }
}
