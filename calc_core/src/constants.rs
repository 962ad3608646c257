//! # Physical Constants and Standard References
//!
//! Constants shared by the optical and RF calculators, plus traceable clause
//! references used in step logs and the equation registry.

/// Boltzmann constant k (J/K)
pub const BOLTZMANN_J_PER_K: f64 = 1.380_649e-23;

/// Reference noise temperature T0 (K) for receiver noise figures
pub const REFERENCE_TEMPERATURE_K: f64 = 290.0;

/// Characteristic impedance of TV distribution networks (Ω)
pub const SYSTEM_IMPEDANCE_OHM: f64 = 75.0;

/// Offset between dBµV and dBm in a 75 Ω system: dBm = dBµV − 108.75
///
/// 1 mW into 75 Ω is sqrt(1e-3 · 75) V = 273 861 µV = 108.75 dBµV.
pub const DBUV_TO_DBM_75_OHM: f64 = 108.75;

/// Lower bound of the wavelength range covered by IEC 60825-1 (nm)
pub const MIN_WAVELENGTH_NM: f64 = 180.0;

/// Upper bound of the wavelength range covered by IEC 60825-1 (nm)
pub const MAX_WAVELENGTH_NM: f64 = 1.0e6;

/// Shortest emission duration the exposure tables are evaluated at (s)
pub const MIN_TABLE_DURATION_S: f64 = 1.0e-9;

/// Shortest pulse width accepted as input (s)
pub const MIN_PULSE_WIDTH_S: f64 = 1.0e-13;

/// Longest emission duration covered by the exposure tables (s)
pub const MAX_TABLE_DURATION_S: f64 = 3.0e4;

// ============================================================================
// Standard Clause References
// ============================================================================

/// Clause references for IEC 60825-1:2007 and the companion standards.
///
/// These constants provide traceable references in step logs so an auditor can
/// find the table a number came from.
pub mod iec_ref {
    /// Classification rules and time bases
    pub const CLASSIFICATION: &str = "IEC 60825-1:2007 Clause 8.3";
    /// Repetitively pulsed emission rules
    pub const PULSE_RULES: &str = "IEC 60825-1:2007 Clause 8.3 f)";
    /// Measurement conditions (apertures and distances)
    pub const MEASUREMENT_CONDITIONS: &str = "IEC 60825-1:2007 Clause 9.3, Table 11";
    /// Class 1 and 1M accessible emission limits
    pub const AEL_CLASS_1: &str = "IEC 60825-1:2007 Table 4";
    /// Class 2 and 2M accessible emission limits
    pub const AEL_CLASS_2: &str = "IEC 60825-1:2007 Table 6";
    /// Class 3R accessible emission limits
    pub const AEL_CLASS_3R: &str = "IEC 60825-1:2007 Table 7";
    /// Class 3B accessible emission limits
    pub const AEL_CLASS_3B: &str = "IEC 60825-1:2007 Table 8";
    /// Correction factors and breakpoints
    pub const CORRECTION_FACTORS: &str = "IEC 60825-1:2007 Table 10";
    /// Additivity of multi-wavelength exposures
    pub const ADDITIVITY: &str = "IEC 60825-1:2007 Table A.5";
    /// Ocular maximum permissible exposure
    pub const MPE_EYE: &str = "IEC 60825-1:2007 Table A.1";
    /// Nominal ocular hazard distance
    pub const NOHD: &str = "IEC/TR 60825-14:2004 Clause 8.3";
    /// Laser eye protection scale numbers
    pub const EN207: &str = "EN 207:2009 Annex B, Table B.2";
    /// Outlet levels and carrier-to-noise requirements
    pub const EN60728: &str = "EN 60728-1:2014 Table 7";
}
