//! # calc_core - Laser Safety and Link Budget Calculation Engine
//!
//! `calc_core` is the computational heart of Beamsafe: IEC 60825-1 laser
//! classification, nominal ocular hazard distance, EN 207 protective eyewear,
//! TV distribution signal budgets and optical fiber power budgets. All inputs
//! and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and settings and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Traceable**: Every result carries its calculation steps and the equations used
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::calculations::classification::{calculate, ClassificationInput};
//! use calc_core::iec60825::LaserClass;
//! use calc_core::laser::WavelengthData;
//! use calc_core::settings::CalculatorSettings;
//!
//! let input = ClassificationInput::new("Green pointer", vec![WavelengthData::continuous(532.0, 3e-3)]);
//! let result = calculate(&input, &CalculatorSettings::default()).unwrap();
//! assert_eq!(result.laser_class, LaserClass::Class3R);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Classification, NOHD, eyewear, TV and fiber budgets
//! - [`iec60825`] - Correction factors, AEL and MPE tables, measurement conditions
//! - [`catalog`] - Coax, fiber, splitter and reception standard data
//! - [`equations`] - Optics/RF formulas and the equation registry
//! - [`laser`] - Laser emission description
//! - [`diagram`] - TV distribution diagram graph
//! - [`settings`] - Calculator configuration
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod catalog;
pub mod constants;
pub mod diagram;
pub mod equations;
pub mod errors;
pub mod iec60825;
pub mod laser;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationItem, CalculationOutput};
pub use errors::{CalcError, CalcResult};
pub use iec60825::LaserClass;
pub use laser::WavelengthData;
pub use settings::CalculatorSettings;
