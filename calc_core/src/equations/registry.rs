//! # Equation Registry
//!
//! Central registry of all formulas used by the calculators. Each equation has
//! metadata including its standard reference, formula and variable definitions.
//!
//! ## Architecture
//!
//! The registry provides:
//! - Type-safe equation identification via the `Equation` enum
//! - Full metadata for step logs, audit trails and EQUATIONS.md
//! - Serialization support for JSON export
//!
//! ## Usage
//!
//! ```rust
//! use calc_core::equations::registry::{Equation, EquationTracker};
//!
//! // Track equation usage during calculation
//! let mut tracker = EquationTracker::new();
//! tracker.record(Equation::NominalOcularHazardDistance, "532 nm, 0.25 s", "Pointer");
//!
//! let meta = Equation::NominalOcularHazardDistance.metadata();
//! println!("Formula: {}", meta.formula_plain);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Code References
// ============================================================================

/// Reference to a standard or textbook source.
///
/// All equations should cite their source for auditability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeReference {
    /// IEC 60825-1 Safety of laser products
    Iec60825 { edition: u8, clause: &'static str },
    /// IEC/TR 60825-14 Safety of laser products, user's guide
    Tr60825_14 { year: u16, clause: &'static str },
    /// EN 207 Personal eye-protection equipment against laser radiation
    En207 { year: u16, clause: &'static str },
    /// EN 60728-1 Cable networks for television signals
    En60728 { year: u16, clause: &'static str },
    /// ITU-T recommendation (G.652, G.671, ...)
    ItuT { recommendation: &'static str },
    /// ISO/IEC 11801 Generic cabling
    Iso11801 { year: u16, clause: &'static str },
    /// Fundamental physics (no specific standard needed)
    Physics,
}

impl CodeReference {
    /// Format the reference for display
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Iec60825 { edition, clause } => {
                format!("IEC 60825-1 Ed.{} {}", edition, clause)
            }
            CodeReference::Tr60825_14 { year, clause } => {
                format!("IEC/TR 60825-14:{} {}", year, clause)
            }
            CodeReference::En207 { year, clause } => format!("EN 207:{} {}", year, clause),
            CodeReference::En60728 { year, clause } => format!("EN 60728-1:{} {}", year, clause),
            CodeReference::ItuT { recommendation } => format!("ITU-T {}", recommendation),
            CodeReference::Iso11801 { year, clause } => format!("ISO/IEC 11801:{} {}", year, clause),
            CodeReference::Physics => "Fundamental Physics".to_string(),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            CodeReference::Iec60825 { .. } => "IEC 60825-1",
            CodeReference::Tr60825_14 { .. } => "IEC/TR 60825-14",
            CodeReference::En207 { .. } => "EN 207",
            CodeReference::En60728 { .. } => "EN 60728-1",
            CodeReference::ItuT { .. } => "ITU-T",
            CodeReference::Iso11801 { .. } => "ISO/IEC 11801",
            CodeReference::Physics => "Physics",
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for organizing equations in EQUATIONS.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// C1–C7, T2
    CorrectionFactors,
    /// AEL and MPE table lookups
    ExposureLimits,
    /// Beam diameter, aperture coupling, irradiance
    BeamPropagation,
    /// Emission ratios, pulse rules, additivity
    Classification,
    /// NOHD and optical aids
    HazardDistance,
    /// Optical density and scale numbers
    EyeProtection,
    /// Level chain through a distribution network
    SignalLevels,
    /// Thermal noise and carrier-to-noise
    Noise,
    /// Fiber attenuation and power budget
    FiberLinks,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::CorrectionFactors => "Correction Factors",
            EquationCategory::ExposureLimits => "Exposure Limits",
            EquationCategory::BeamPropagation => "Beam Propagation",
            EquationCategory::Classification => "Classification",
            EquationCategory::HazardDistance => "Hazard Distance",
            EquationCategory::EyeProtection => "Eye Protection",
            EquationCategory::SignalLevels => "Signal Levels",
            EquationCategory::Noise => "Noise",
            EquationCategory::FiberLinks => "Fiber Links",
        }
    }

    /// Sort order for EQUATIONS.md (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::CorrectionFactors => 1,
            EquationCategory::ExposureLimits => 2,
            EquationCategory::BeamPropagation => 3,
            EquationCategory::Classification => 4,
            EquationCategory::HazardDistance => 5,
            EquationCategory::EyeProtection => 6,
            EquationCategory::SignalLevels => 7,
            EquationCategory::Noise => 8,
            EquationCategory::FiberLinks => 9,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "P", "λ", "φ")
    pub symbol: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g., "W", "nm", "mrad")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for an equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name (e.g., "Nominal Ocular Hazard Distance")
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    /// Standard reference
    pub reference: CodeReference,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    /// Category for grouping
    pub category: EquationCategory,
    /// Source module where the equation implementation lives
    pub source_module: &'static str,
    /// Function name implementing the equation
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used by the calculators.
///
/// Each variant maps to a specific formula with full metadata.
/// This enum is the primary interface for equation tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    // -------------------------------------------------------------------------
    // Correction Factors
    // -------------------------------------------------------------------------
    /// C1 = 5.6e3 t^0.25
    UltravioletCorrectionC1,
    /// C3 = 10^(0.02(λ−450))
    BlueLightCorrectionC3,
    /// C4 = 10^(0.002(λ−700))
    NearInfraredCorrectionC4,
    /// C5 = N^−0.25
    PulseTrainCorrectionC5,
    /// C6 = α/αmin
    ExtendedSourceCorrectionC6,
    /// T2 = 10·10^((α−αmin)/98.5)
    ThermalBreakpointT2,

    // -------------------------------------------------------------------------
    // Exposure Limits
    // -------------------------------------------------------------------------
    /// AEL(class, λ, t, α)
    AccessibleEmissionLimit,
    /// MPE(λ, t, α)
    MaximumPermissibleExposure,
    /// min(thermal, photochemical)
    DualLimit,

    // -------------------------------------------------------------------------
    // Beam Propagation
    // -------------------------------------------------------------------------
    /// d(z) = d0 + zφ
    BeamDiameterAtDistance,
    /// η = 1 − exp(−(D/d)²)
    ApertureCoupledFraction,
    /// 1.5 t^0.375 mm
    LimitingAperture,
    /// E = 4P/(πd²)
    BeamIrradiance,
    /// E = ηP / A_aperture
    ApertureAveragedExposure,

    // -------------------------------------------------------------------------
    // Classification
    // -------------------------------------------------------------------------
    /// AE/AEL
    EmissionRatio,
    /// N = f·T
    PulseCount,
    /// E' = E·f·Ti
    PulseMerging,
    /// Σ within group, max across groups
    HazardGroupAdditivity,

    // -------------------------------------------------------------------------
    // Hazard Distance
    // -------------------------------------------------------------------------
    /// NOHD = (√(4P/(πE)) − a)/φ
    NominalOcularHazardDistance,
    /// G = min(M², (D/d0)²)
    OpticalAidGain,

    // -------------------------------------------------------------------------
    // Eye Protection
    // -------------------------------------------------------------------------
    /// OD = log10(H/MPE)
    OpticalDensity,
    /// LB n
    En207ScaleNumber,

    // -------------------------------------------------------------------------
    // Signal Levels
    // -------------------------------------------------------------------------
    /// L_out = L_in + G − A
    SignalLevelChain,
    /// α(f) = α_ref √(f/f_ref)
    CableAttenuationScaling,
    /// 10 log10 N
    SplitterLoss,
    /// dBm = dBµV − 108.75
    DbuvToDbm,

    // -------------------------------------------------------------------------
    // Noise
    // -------------------------------------------------------------------------
    /// 10 log10(kTBR) + 120
    ThermalNoiseFloor,
    /// C/N = L_in − N − NF
    AmplifierCarrierToNoise,
    /// −10 log10 Σ 10^(−C/N_i/10)
    CascadedCarrierToNoise,

    // -------------------------------------------------------------------------
    // Fiber Links
    // -------------------------------------------------------------------------
    /// A = α·L
    FiberAttenuation,
    /// Catalog or 10 log10 N + excess
    FiberSplitterLoss,
    /// B = P_tx − S
    PowerBudget,
    /// M = B − L − M_safety
    LinkMargin,
    /// L_max = (B − L_fixed − M_safety)/α
    MaximumReach,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            // Correction factors
            Equation::UltravioletCorrectionC1 => EquationMetadata {
                name: "Ultraviolet Correction C1",
                description: "Time-dependent scaling of the 302.5–400 nm limits",
                formula_plain: "C1 = 5.6e3 * t^0.25",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table 10" },
                variables: vec![
                    Variable::new("C1", "Correction factor", "-"),
                    Variable::new("t", "Emission duration", "s"),
                ],
                assumptions: vec!["302.5 nm ≤ λ < 400 nm"],
                category: EquationCategory::CorrectionFactors,
                source_module: "iec60825/correction.rs",
                source_function: "c1",
            },

            Equation::BlueLightCorrectionC3 => EquationMetadata {
                name: "Blue-Light Correction C3",
                description: "Relaxes the photochemical limit toward longer visible wavelengths",
                formula_plain: "C3 = 1 for λ < 450 nm, C3 = 10^(0.02(λ-450)) for 450-700 nm",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table 10" },
                variables: vec![
                    Variable::new("C3", "Correction factor", "-"),
                    Variable::new("λ", "Wavelength", "nm"),
                ],
                assumptions: vec!["Applies to the photochemical limit only"],
                category: EquationCategory::CorrectionFactors,
                source_module: "iec60825/correction.rs",
                source_function: "c3",
            },

            Equation::NearInfraredCorrectionC4 => EquationMetadata {
                name: "Near-Infrared Correction C4",
                description: "Accounts for reduced ocular absorption in the near infrared",
                formula_plain: "C4 = 10^(0.002(λ-700)) for 700-1050 nm, C4 = 5 for 1050-1400 nm",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table 10" },
                variables: vec![
                    Variable::new("C4", "Correction factor", "-"),
                    Variable::new("λ", "Wavelength", "nm"),
                ],
                assumptions: vec!["1 outside 700-1400 nm"],
                category: EquationCategory::CorrectionFactors,
                source_module: "iec60825/correction.rs",
                source_function: "c4",
            },

            Equation::PulseTrainCorrectionC5 => EquationMetadata {
                name: "Pulse-Train Correction C5",
                description: "Reduces the single-pulse limit for a train of N effective pulses",
                formula_plain: "C5 = N^-0.25",
                reference: CodeReference::Iec60825 { edition: 2, clause: "8.3 f) 3)" },
                variables: vec![
                    Variable::new("C5", "Correction factor", "-"),
                    Variable::new("N", "Effective number of pulses in the time base", "-"),
                ],
                assumptions: vec!["λ ≥ 400 nm", "Not applied to Class 3B"],
                category: EquationCategory::CorrectionFactors,
                source_module: "iec60825/correction.rs",
                source_function: "c5",
            },

            Equation::ExtendedSourceCorrectionC6 => EquationMetadata {
                name: "Extended-Source Correction C6",
                description: "Relaxes the retinal thermal limit for sources larger than a point",
                formula_plain: "C6 = 1 (α ≤ 1.5 mrad), α/αmin (≤ 100 mrad), αmax/αmin (above)",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table 10" },
                variables: vec![
                    Variable::new("α", "Apparent source subtense", "mrad"),
                    Variable::new("αmin", "Minimum subtense, 1.5", "mrad"),
                    Variable::new("αmax", "Maximum subtense, 100", "mrad"),
                ],
                assumptions: vec!["400 nm ≤ λ < 1400 nm"],
                category: EquationCategory::CorrectionFactors,
                source_module: "iec60825/correction.rs",
                source_function: "c6",
            },

            Equation::ThermalBreakpointT2 => EquationMetadata {
                name: "Thermal Breakpoint T2",
                description: "Duration after which the retinal thermal limit becomes a constant power",
                formula_plain: "T2 = 10 * 10^((α - αmin)/98.5) s, between 10 s and 100 s",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table 10" },
                variables: vec![
                    Variable::new("T2", "Breakpoint", "s"),
                    Variable::new("α", "Apparent source subtense", "mrad"),
                ],
                assumptions: vec!["400 nm ≤ λ < 1400 nm"],
                category: EquationCategory::CorrectionFactors,
                source_module: "iec60825/correction.rs",
                source_function: "t2",
            },

            // Exposure limits
            Equation::AccessibleEmissionLimit => EquationMetadata {
                name: "Accessible Emission Limit",
                description: "Maximum accessible emission permitted within a class",
                formula_plain: "AEL = table(class, λ, t, α), in J or W",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Tables 4-8" },
                variables: vec![
                    Variable::new("λ", "Wavelength", "nm"),
                    Variable::new("t", "Emission duration", "s"),
                    Variable::new("α", "Apparent source subtense", "mrad"),
                ],
                assumptions: vec!["Durations below 1 ns evaluated at 1 ns"],
                category: EquationCategory::ExposureLimits,
                source_module: "iec60825/ael.rs",
                source_function: "accessible_emission_limit",
            },

            Equation::MaximumPermissibleExposure => EquationMetadata {
                name: "Maximum Permissible Exposure",
                description: "Ocular exposure limit at the cornea",
                formula_plain: "MPE = table(λ, t, α), in J/m² or W/m²",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table A.1" },
                variables: vec![
                    Variable::new("λ", "Wavelength", "nm"),
                    Variable::new("t", "Exposure duration", "s"),
                ],
                assumptions: vec!["Ocular exposure, not skin"],
                category: EquationCategory::ExposureLimits,
                source_module: "iec60825/mpe.rs",
                source_function: "ocular_mpe",
            },

            Equation::DualLimit => EquationMetadata {
                name: "Dual Limit",
                description: "Thermal and photochemical limits both apply; the lower governs",
                formula_plain: "Limit = min(thermal, photochemical) over the same duration",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table 4 note" },
                variables: vec![Variable::new("t", "Emission duration", "s")],
                assumptions: vec!["400 nm ≤ λ < 600 nm", "t ≥ 10 s"],
                category: EquationCategory::ExposureLimits,
                source_module: "iec60825/ael.rs",
                source_function: "lower_of",
            },

            // Beam propagation
            Equation::BeamDiameterAtDistance => EquationMetadata {
                name: "Beam Diameter at Distance",
                description: "Far-field growth of a diverging beam",
                formula_plain: "d(z) = d0 + z * φ",
                reference: CodeReference::Tr60825_14 { year: 2004, clause: "8.3" },
                variables: vec![
                    Variable::new("d0", "Exit beam diameter (d63)", "mm"),
                    Variable::new("z", "Distance", "mm"),
                    Variable::new("φ", "Full-angle divergence", "rad"),
                ],
                assumptions: vec!["Linear growth (far field)"],
                category: EquationCategory::BeamPropagation,
                source_module: "equations/optics.rs",
                source_function: "beam_diameter_at",
            },

            Equation::ApertureCoupledFraction => EquationMetadata {
                name: "Aperture Coupled Fraction",
                description: "Fraction of a Gaussian beam passing a circular aperture",
                formula_plain: "η = 1 - exp(-(D/d)^2)",
                reference: CodeReference::Iec60825 { edition: 2, clause: "9.3" },
                variables: vec![
                    Variable::new("D", "Aperture diameter", "mm"),
                    Variable::new("d", "Beam diameter at the aperture (d63)", "mm"),
                ],
                assumptions: vec!["Gaussian (TEM00) profile", "Beam centred on aperture"],
                category: EquationCategory::BeamPropagation,
                source_module: "equations/optics.rs",
                source_function: "coupled_fraction",
            },

            Equation::LimitingAperture => EquationMetadata {
                name: "Limiting Aperture",
                description: "Averaging aperture for the eye in the far infrared",
                formula_plain: "D = 1 mm (t ≤ 0.35 s), 1.5 t^0.375 mm (< 10 s), 3.5 mm (≥ 10 s)",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table 11" },
                variables: vec![
                    Variable::new("D", "Limiting aperture", "mm"),
                    Variable::new("t", "Exposure duration", "s"),
                ],
                assumptions: vec!["1400 nm ≤ λ < 10^5 nm; 1 mm (UV), 7 mm (retinal), 11 mm (far IR) elsewhere"],
                category: EquationCategory::BeamPropagation,
                source_module: "iec60825/conditions.rs",
                source_function: "limiting_aperture_mm",
            },

            Equation::BeamIrradiance => EquationMetadata {
                name: "Beam Irradiance",
                description: "Mean irradiance over the d63 beam cross-section",
                formula_plain: "E = 4P / (π d^2)",
                reference: CodeReference::Physics,
                variables: vec![
                    Variable::new("E", "Irradiance", "W/m²"),
                    Variable::new("P", "Power", "W"),
                    Variable::new("d", "Beam diameter", "m"),
                ],
                assumptions: vec!["Uniform over the d63 diameter"],
                category: EquationCategory::BeamPropagation,
                source_module: "equations/optics.rs",
                source_function: "beam_irradiance",
            },

            Equation::ApertureAveragedExposure => EquationMetadata {
                name: "Aperture-Averaged Exposure",
                description: "Exposure of a beam smaller than the limiting aperture, averaged over the aperture",
                formula_plain: "E = η P / (π D^2 / 4)",
                reference: CodeReference::Tr60825_14 { year: 2004, clause: "8.2" },
                variables: vec![
                    Variable::new("η", "Coupled fraction", "-"),
                    Variable::new("D", "Limiting aperture", "m"),
                ],
                assumptions: vec!["Beam diameter below the limiting aperture"],
                category: EquationCategory::BeamPropagation,
                source_module: "equations/optics.rs",
                source_function: "aperture_averaged_exposure",
            },

            // Classification
            Equation::EmissionRatio => EquationMetadata {
                name: "Emission Ratio",
                description: "Accessible emission relative to the class limit; the class passes when ≤ 1",
                formula_plain: "R = η Q / AEL",
                reference: CodeReference::Iec60825 { edition: 2, clause: "8.3" },
                variables: vec![
                    Variable::new("Q", "Power or energy of the emission", "W or J"),
                    Variable::new("η", "Fraction coupled into the measurement aperture", "-"),
                ],
                assumptions: vec!["Maximum over all applicable pulse rules"],
                category: EquationCategory::Classification,
                source_module: "calculations/classification.rs",
                source_function: "emission_ratio",
            },

            Equation::PulseCount => EquationMetadata {
                name: "Pulse Count",
                description: "Number of pulses inside the applicable time base",
                formula_plain: "N = f * min(T, T2) (400-1400 nm), N = f * T otherwise",
                reference: CodeReference::Iec60825 { edition: 2, clause: "8.3 f)" },
                variables: vec![
                    Variable::new("f", "Pulse repetition rate", "Hz"),
                    Variable::new("T", "Time base", "s"),
                ],
                assumptions: vec!["Regular pulse train"],
                category: EquationCategory::Classification,
                source_module: "calculations/classification.rs",
                source_function: "pulse_train",
            },

            Equation::PulseMerging => EquationMetadata {
                name: "Pulse Merging",
                description: "Pulses within the thermal confinement time act as one longer pulse",
                formula_plain: "E' = E f Ti, t' = Ti, N' = N / (f Ti)",
                reference: CodeReference::Iec60825 { edition: 2, clause: "8.3 f)" },
                variables: vec![
                    Variable::new("Ti", "Thermal confinement time", "s"),
                    Variable::new("E", "Pulse energy", "J"),
                ],
                assumptions: vec!["Pulse period shorter than Ti"],
                category: EquationCategory::Classification,
                source_module: "calculations/classification.rs",
                source_function: "pulse_train",
            },

            Equation::HazardGroupAdditivity => EquationMetadata {
                name: "Hazard Group Additivity",
                description: "Emission ratios of wavelengths acting on the same tissue add",
                formula_plain: "R = max over groups of (Σ R_i in group)",
                reference: CodeReference::Iec60825 { edition: 2, clause: "Table A.5" },
                variables: vec![Variable::new("R_i", "Emission ratio of wavelength i", "-")],
                assumptions: vec!["Groups: ultraviolet, retinal (400-1400 nm), infrared"],
                category: EquationCategory::Classification,
                source_module: "calculations/classification.rs",
                source_function: "aggregate_ratios",
            },

            // Hazard distance
            Equation::NominalOcularHazardDistance => EquationMetadata {
                name: "Nominal Ocular Hazard Distance",
                description: "Distance beyond which the beam irradiance falls below the MPE",
                formula_plain: "NOHD = (sqrt(4P / (π MPE)) - a) / φ",
                reference: CodeReference::Tr60825_14 { year: 2004, clause: "8.3" },
                variables: vec![
                    Variable::new("P", "Power (or energy per pulse)", "W or J"),
                    Variable::new("MPE", "Maximum permissible exposure", "W/m² or J/m²"),
                    Variable::new("a", "Exit beam diameter", "m"),
                    Variable::new("φ", "Full-angle divergence", "rad"),
                ],
                assumptions: vec!["Intrabeam viewing, no atmospheric attenuation"],
                category: EquationCategory::HazardDistance,
                source_module: "equations/optics.rs",
                source_function: "nohd",
            },

            Equation::OpticalAidGain => EquationMetadata {
                name: "Optical Aid Gain",
                description: "Increase in collected power when viewing through binoculars or a telescope",
                formula_plain: "G = min(M^2, max(1, (D_obj / d0)^2))",
                reference: CodeReference::Tr60825_14 { year: 2004, clause: "8.4" },
                variables: vec![
                    Variable::new("M", "Magnification", "-"),
                    Variable::new("D_obj", "Objective diameter", "mm"),
                    Variable::new("d0", "Exit beam diameter", "mm"),
                ],
                assumptions: vec!["302.5 nm to 4000 nm (instrument transmission)"],
                category: EquationCategory::HazardDistance,
                source_module: "equations/optics.rs",
                source_function: "optical_aid_gain",
            },

            // Eye protection
            Equation::OpticalDensity => EquationMetadata {
                name: "Required Optical Density",
                description: "Attenuation needed to bring the exposure down to the MPE",
                formula_plain: "OD = max(0, log10(H / MPE))",
                reference: CodeReference::Tr60825_14 { year: 2004, clause: "9.5" },
                variables: vec![
                    Variable::new("H", "Exposure at the eye", "W/m² or J/m²"),
                    Variable::new("MPE", "Maximum permissible exposure", "W/m² or J/m²"),
                ],
                assumptions: vec!["Maximum over applicable pulse rules"],
                category: EquationCategory::EyeProtection,
                source_module: "equations/optics.rs",
                source_function: "optical_density",
            },

            Equation::En207ScaleNumber => EquationMetadata {
                name: "EN 207 Scale Number",
                description: "Protection level LB n of laser eyewear",
                formula_plain: "n = max(1, ceil(log10(E / E_LB0)))",
                reference: CodeReference::En207 { year: 2009, clause: "Annex B, Table B.2" },
                variables: vec![
                    Variable::new("E", "Exposure in the test mode (D, I, M)", "W/m² or J/m²"),
                    Variable::new("E_LB0", "Base value for the mode and wavelength range", "W/m² or J/m²"),
                ],
                assumptions: vec!["Scale numbers above LB10 are not available"],
                category: EquationCategory::EyeProtection,
                source_module: "equations/optics.rs",
                source_function: "scale_number",
            },

            // Signal levels
            Equation::SignalLevelChain => EquationMetadata {
                name: "Signal Level Chain",
                description: "Level after each component of a distribution network",
                formula_plain: "L_out = L_in + G - A",
                reference: CodeReference::En60728 { year: 2014, clause: "4" },
                variables: vec![
                    Variable::new("L", "Signal level", "dBµV"),
                    Variable::new("G", "Amplifier gain", "dB"),
                    Variable::new("A", "Cable, splitter, attenuator or outlet loss", "dB"),
                ],
                assumptions: vec!["Matched 75 Ω network"],
                category: EquationCategory::SignalLevels,
                source_module: "calculations/tv_signal.rs",
                source_function: "propagate",
            },

            Equation::CableAttenuationScaling => EquationMetadata {
                name: "Cable Attenuation Scaling",
                description: "Coaxial attenuation between catalog frequencies",
                formula_plain: "α(f) = α_ref * sqrt(f / f_ref)",
                reference: CodeReference::Physics,
                variables: vec![
                    Variable::new("α", "Attenuation", "dB/100 m"),
                    Variable::new("f", "Frequency", "MHz"),
                ],
                assumptions: vec!["Conductor (skin-effect) loss dominates"],
                category: EquationCategory::SignalLevels,
                source_module: "equations/rf.rs",
                source_function: "skin_effect_scaling",
            },

            Equation::SplitterLoss => EquationMetadata {
                name: "Splitter Loss",
                description: "Ideal power-split loss of a 1:N splitter",
                formula_plain: "L = 10 log10(N)",
                reference: CodeReference::Physics,
                variables: vec![Variable::new("N", "Number of outputs", "-")],
                assumptions: vec!["Equal split, excess loss added separately"],
                category: EquationCategory::SignalLevels,
                source_module: "equations/rf.rs",
                source_function: "ideal_split_loss_db",
            },

            Equation::DbuvToDbm => EquationMetadata {
                name: "dBµV to dBm",
                description: "Voltage level to power level across 75 Ω",
                formula_plain: "dBm = dBµV - 108.75",
                reference: CodeReference::Physics,
                variables: vec![Variable::new("R", "System impedance, 75", "Ω")],
                assumptions: vec!["75 Ω system"],
                category: EquationCategory::SignalLevels,
                source_module: "units.rs",
                source_function: "from",
            },

            // Noise
            Equation::ThermalNoiseFloor => EquationMetadata {
                name: "Thermal Noise Floor",
                description: "Noise voltage level of a matched resistive source",
                formula_plain: "N = 10 log10(k T B R) + 120 dBµV",
                reference: CodeReference::En60728 { year: 2014, clause: "4.5" },
                variables: vec![
                    Variable::new("k", "Boltzmann constant", "J/K"),
                    Variable::new("T", "Noise temperature", "K"),
                    Variable::new("B", "Channel bandwidth", "Hz"),
                    Variable::new("R", "System impedance", "Ω"),
                ],
                assumptions: vec!["290 K reference temperature"],
                category: EquationCategory::Noise,
                source_module: "equations/rf.rs",
                source_function: "thermal_noise_floor_dbuv",
            },

            Equation::AmplifierCarrierToNoise => EquationMetadata {
                name: "Amplifier Carrier-to-Noise",
                description: "C/N contributed by a single amplifier stage",
                formula_plain: "C/N = L_in - N - NF",
                reference: CodeReference::En60728 { year: 2014, clause: "4.5" },
                variables: vec![
                    Variable::new("L_in", "Amplifier input level", "dBµV"),
                    Variable::new("N", "Thermal noise floor", "dBµV"),
                    Variable::new("NF", "Noise figure", "dB"),
                ],
                assumptions: vec!["Noise figure referred to the input"],
                category: EquationCategory::Noise,
                source_module: "equations/rf.rs",
                source_function: "amplifier_stage_cn_db",
            },

            Equation::CascadedCarrierToNoise => EquationMetadata {
                name: "Cascaded Carrier-to-Noise",
                description: "Combined C/N of independent noise contributions",
                formula_plain: "C/N = -10 log10(Σ 10^(-C/N_i / 10))",
                reference: CodeReference::En60728 { year: 2014, clause: "4.5" },
                variables: vec![Variable::new("C/N_i", "Stage carrier-to-noise ratio", "dB")],
                assumptions: vec!["Uncorrelated noise sources"],
                category: EquationCategory::Noise,
                source_module: "equations/rf.rs",
                source_function: "cascade_cn_db",
            },

            // Fiber links
            Equation::FiberAttenuation => EquationMetadata {
                name: "Fiber Attenuation",
                description: "Loss of a fiber span",
                formula_plain: "A = α * L",
                reference: CodeReference::ItuT { recommendation: "G.652" },
                variables: vec![
                    Variable::new("α", "Attenuation coefficient", "dB/km"),
                    Variable::new("L", "Fiber length", "km"),
                ],
                assumptions: vec!["Catalog value at the nearest window within ±30 nm"],
                category: EquationCategory::FiberLinks,
                source_module: "calculations/fiber_budget.rs",
                source_function: "calculate",
            },

            Equation::FiberSplitterLoss => EquationMetadata {
                name: "Optical Splitter Loss",
                description: "Insertion loss of a 1:N passive optical splitter",
                formula_plain: "L = catalog(N), otherwise 10 log10(N) + 1 dB",
                reference: CodeReference::ItuT { recommendation: "G.671" },
                variables: vec![Variable::new("N", "Split ratio", "-")],
                assumptions: vec!["Catalog covers 1:2 to 1:64"],
                category: EquationCategory::FiberLinks,
                source_module: "catalog/fiber.rs",
                source_function: "splitter_loss_db",
            },

            Equation::PowerBudget => EquationMetadata {
                name: "Power Budget",
                description: "Loss the link can tolerate between transmitter and receiver",
                formula_plain: "B = P_tx - S",
                reference: CodeReference::Iso11801 { year: 2017, clause: "Annex E" },
                variables: vec![
                    Variable::new("P_tx", "Launch power", "dBm"),
                    Variable::new("S", "Receiver sensitivity", "dBm"),
                ],
                assumptions: vec!["Worst-case transmitter and receiver values"],
                category: EquationCategory::FiberLinks,
                source_module: "equations/rf.rs",
                source_function: "power_budget_db",
            },

            Equation::LinkMargin => EquationMetadata {
                name: "Link Margin",
                description: "Budget remaining after losses and the safety allowance",
                formula_plain: "M = B - L_total - M_safety",
                reference: CodeReference::Iso11801 { year: 2017, clause: "Annex E" },
                variables: vec![
                    Variable::new("B", "Power budget", "dB"),
                    Variable::new("L_total", "Total link loss", "dB"),
                    Variable::new("M_safety", "Safety margin", "dB"),
                ],
                assumptions: vec!["Link passes when M ≥ 0"],
                category: EquationCategory::FiberLinks,
                source_module: "equations/rf.rs",
                source_function: "link_margin_db",
            },

            Equation::MaximumReach => EquationMetadata {
                name: "Maximum Reach",
                description: "Longest fiber the budget supports with the same fixed losses",
                formula_plain: "L_max = (B - L_fixed - M_safety) / α",
                reference: CodeReference::Iso11801 { year: 2017, clause: "Annex E" },
                variables: vec![
                    Variable::new("L_fixed", "Connector, splice, splitter and other losses", "dB"),
                    Variable::new("α", "Attenuation coefficient", "dB/km"),
                ],
                assumptions: vec!["Fixed losses independent of length"],
                category: EquationCategory::FiberLinks,
                source_module: "equations/rf.rs",
                source_function: "maximum_reach_km",
            },
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }

    /// Get all categories that contain at least one equation
    pub fn all_categories() -> Vec<EquationCategory> {
        use EquationCategory::*;
        let mut cats = vec![
            CorrectionFactors,
            ExposureLimits,
            BeamPropagation,
            Classification,
            HazardDistance,
            EyeProtection,
            SignalLevels,
            Noise,
            FiberLinks,
        ];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All equations in the registry (for iteration)
pub static ALL_EQUATIONS: &[Equation] = &[
    // Correction factors
    Equation::UltravioletCorrectionC1,
    Equation::BlueLightCorrectionC3,
    Equation::NearInfraredCorrectionC4,
    Equation::PulseTrainCorrectionC5,
    Equation::ExtendedSourceCorrectionC6,
    Equation::ThermalBreakpointT2,
    // Exposure limits
    Equation::AccessibleEmissionLimit,
    Equation::MaximumPermissibleExposure,
    Equation::DualLimit,
    // Beam propagation
    Equation::BeamDiameterAtDistance,
    Equation::ApertureCoupledFraction,
    Equation::LimitingAperture,
    Equation::BeamIrradiance,
    Equation::ApertureAveragedExposure,
    // Classification
    Equation::EmissionRatio,
    Equation::PulseCount,
    Equation::PulseMerging,
    Equation::HazardGroupAdditivity,
    // Hazard distance
    Equation::NominalOcularHazardDistance,
    Equation::OpticalAidGain,
    // Eye protection
    Equation::OpticalDensity,
    Equation::En207ScaleNumber,
    // Signal levels
    Equation::SignalLevelChain,
    Equation::CableAttenuationScaling,
    Equation::SplitterLoss,
    Equation::DbuvToDbm,
    // Noise
    Equation::ThermalNoiseFloor,
    Equation::AmplifierCarrierToNoise,
    Equation::CascadedCarrierToNoise,
    // Fiber links
    Equation::FiberAttenuation,
    Equation::FiberSplitterLoss,
    Equation::PowerBudget,
    Equation::LinkMargin,
    Equation::MaximumReach,
];

// ============================================================================
// Equation Usage Tracking
// ============================================================================

/// Record of an equation being used in a calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationUsage {
    pub equation: Equation,
    /// Where it was applied (e.g., "532 nm, Condition 3")
    pub context: String,
    /// Label of the calculation it was applied to
    pub calculation_label: String,
}

/// Collector for equation usage during a calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationTracker {
    usages: Vec<EquationUsage>,
}

impl EquationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an equation was used by the calculation `label`
    pub fn record(&mut self, equation: Equation, context: impl Into<String>, label: impl Into<String>) {
        self.usages.push(EquationUsage {
            equation,
            context: context.into(),
            calculation_label: label.into(),
        });
    }

    pub fn usages(&self) -> &[EquationUsage] {
        &self.usages
    }

    /// Unique equations used, in first-use order
    pub fn unique_equations(&self) -> Vec<Equation> {
        let mut seen = std::collections::HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.equation))
            .map(|u| u.equation)
            .collect()
    }
}

// ============================================================================
// Markdown Generation
// ============================================================================

/// Generate EQUATIONS.md from the registry.
///
/// ```rust
/// use calc_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("Beamsafe Equations Reference"));
/// assert!(markdown.contains("Correction Factors"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(32_000);

    output.push_str(
        r#"# Beamsafe Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

This document lists all formulas used in Beamsafe calculations.
Each equation includes its formula, standard reference, source location, and assumptions.

## Conventions

| Quantity | Convention |
|----------|------------|
| Beam diameter | 1/e (d63) diameter |
| Divergence | Full angle, d63 |
| Signal level | dBµV across 75 Ω |
| Gain / loss | Positive dB; losses are subtracted |
| Emission ratio | Accessible emission / AEL; ≤ 1 passes |

---

"#,
    );

    let categories = Equation::all_categories();

    for category in &categories {
        let equations = Equation::in_category(*category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Equations:** {}\n- **Categories:** {}\n\n",
        ALL_EQUATIONS.len(),
        categories.len()
    ));

    output.push_str(
        r#"## How to Audit

1. Find the equation you want to verify in the sections above
2. Check the **Reference** for the original source (IEC 60825-1, EN 207, EN 60728-1, ...)
3. Click the **Source** link to view the implementation code
4. Run `cargo test` to verify equations against known values
"#,
    );

    output
}

// ============================================================================
// Tests
// ============================================================================
