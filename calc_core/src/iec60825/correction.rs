//! # IEC 60825-1 Correction Factors
//!
//! Correction factors and time breakpoints that scale the exposure-limit tables
//! per IEC 60825-1:2007 Table 10.
//!
//! ## Factor Summary
//!
//! | Factor | Range (nm)   | Value                                   |
//! |--------|--------------|-----------------------------------------|
//! | T1     | 302.5 – 315  | 10^(0.8(λ−295)) × 10⁻¹⁵ s               |
//! | C1     | 302.5 – 400  | 5.6 × 10³ t^0.25                        |
//! | C2     | 302.5 – 315  | 10^(0.2(λ−295))                         |
//! | C3     | 400 – 700    | 1 below 450 nm, 10^(0.02(λ−450)) above  |
//! | C4     | 700 – 1400   | 10^(0.002(λ−700)), 5 above 1050 nm      |
//! | C5     | pulse trains | N^−0.25                                 |
//! | C6     | 400 – 1400   | α/αmin clamped to [1, αmax/αmin]        |
//! | C7     | 700 – 1400   | 1, 10^(0.018(λ−1150)), 8                |
//! | T2     | 400 – 1400   | 10 × 10^((α−αmin)/98.5) s, 10 s – 100 s |
//!
//! ## Example
//!
//! ```rust
//! use calc_core::iec60825::correction::{CorrectionFactors, c5};
//!
//! let factors = CorrectionFactors::new(905.0, 1.5);
//! assert!((factors.c4 - 2.57).abs() < 0.01);
//! assert_eq!(factors.c6, 1.0);
//! assert_eq!(factors.t2_s, 10.0);
//!
//! // 16 pulses inside the thermal time base
//! assert!((c5(16.0) - 0.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

/// Minimum angular subtense αmin (mrad); smaller sources are point sources
pub const ALPHA_MIN_MRAD: f64 = 1.5;

/// Maximum angular subtense αmax (mrad); C6 and T2 saturate above it
pub const ALPHA_MAX_MRAD: f64 = 100.0;

/// Breakpoint T1 (s) for 302.5 nm ≤ λ < 315 nm.
pub fn t1(wavelength_nm: f64) -> f64 {
    10f64.powf(0.8 * (wavelength_nm - 295.0)) * 1e-15
}

/// Time-dependent ultraviolet factor C1 = 5.6 × 10³ t^0.25.
pub fn c1(duration_s: f64) -> f64 {
    5.6e3 * duration_s.powf(0.25)
}

/// Ultraviolet factor C2 = 10^(0.2(λ−295)).
pub fn c2(wavelength_nm: f64) -> f64 {
    10f64.powf(0.2 * (wavelength_nm - 295.0))
}

/// Photochemical (blue-light) factor C3.
pub fn c3(wavelength_nm: f64) -> f64 {
    if (450.0..700.0).contains(&wavelength_nm) {
        10f64.powf(0.02 * (wavelength_nm - 450.0))
    } else {
        1.0
    }
}

/// Near-infrared transmission factor C4.
pub fn c4(wavelength_nm: f64) -> f64 {
    if (700.0..1050.0).contains(&wavelength_nm) {
        10f64.powf(0.002 * (wavelength_nm - 700.0))
    } else if (1050.0..1400.0).contains(&wavelength_nm) {
        5.0
    } else {
        1.0
    }
}

/// Pulse-train factor C5 = N^−0.25 for N pulses (1 for a single pulse).
pub fn c5(pulse_count: f64) -> f64 {
    if pulse_count > 1.0 {
        pulse_count.powf(-0.25)
    } else {
        1.0
    }
}

/// Extended-source factor C6 for apparent source subtense α (mrad).
pub fn c6(alpha_mrad: f64) -> f64 {
    if alpha_mrad <= ALPHA_MIN_MRAD {
        1.0
    } else if alpha_mrad <= ALPHA_MAX_MRAD {
        alpha_mrad / ALPHA_MIN_MRAD
    } else {
        ALPHA_MAX_MRAD / ALPHA_MIN_MRAD
    }
}

/// Water-absorption factor C7.
pub fn c7(wavelength_nm: f64) -> f64 {
    if (1150.0..1200.0).contains(&wavelength_nm) {
        10f64.powf(0.018 * (wavelength_nm - 1150.0))
    } else if (1200.0..1400.0).contains(&wavelength_nm) {
        8.0
    } else {
        1.0
    }
}

/// Thermal breakpoint T2 (s) for apparent source subtense α (mrad).
pub fn t2(alpha_mrad: f64) -> f64 {
    if alpha_mrad <= ALPHA_MIN_MRAD {
        10.0
    } else if alpha_mrad <= ALPHA_MAX_MRAD {
        10.0 * 10f64.powf((alpha_mrad - ALPHA_MIN_MRAD) / 98.5)
    } else {
        100.0
    }
}

/// Thermal confinement time Ti (s); pulses closer together than Ti act as one.
///
/// Returns `None` below 400 nm where the pulse-train rule does not apply.
pub fn ti(wavelength_nm: f64) -> Option<f64> {
    match wavelength_nm {
        w if w < 400.0 => None,
        w if w < 1050.0 => Some(18e-6),
        w if w < 1400.0 => Some(50e-6),
        w if w < 1500.0 => Some(1e-3),
        w if w < 1800.0 => Some(10.0),
        w if w < 2600.0 => Some(1e-3),
        _ => Some(1e-7),
    }
}

/// Whether the wavelength lies in the retinal hazard region (400–1400 nm)
pub fn is_retinal(wavelength_nm: f64) -> bool {
    (400.0..1400.0).contains(&wavelength_nm)
}

/// Correction factors that depend only on wavelength and source size.
///
/// Time-dependent factors (C1, C5) are evaluated at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionFactors {
    /// Wavelength the factors were evaluated at (nm)
    pub wavelength_nm: f64,
    /// Apparent source subtense α (mrad)
    pub alpha_mrad: f64,
    /// C2 (1 outside 302.5–315 nm)
    pub c2: f64,
    /// C3
    pub c3: f64,
    /// C4
    pub c4: f64,
    /// C6 (1 outside the retinal hazard region)
    pub c6: f64,
    /// C7
    pub c7: f64,
    /// T1 (s); meaningful for 302.5–315 nm
    pub t1_s: f64,
    /// T2 (s); meaningful for 400–1400 nm
    pub t2_s: f64,
}

impl CorrectionFactors {
    /// Evaluate the wavelength/source-size factors.
    pub fn new(wavelength_nm: f64, alpha_mrad: f64) -> Self {
        let retinal = is_retinal(wavelength_nm);
        let uv_b = (302.5..315.0).contains(&wavelength_nm);
        CorrectionFactors {
            wavelength_nm,
            alpha_mrad,
            c2: if uv_b { c2(wavelength_nm) } else { 1.0 },
            c3: c3(wavelength_nm),
            c4: c4(wavelength_nm),
            c6: if retinal { c6(alpha_mrad) } else { 1.0 },
            c7: c7(wavelength_nm),
            t1_s: t1(wavelength_nm),
            t2_s: if retinal { t2(alpha_mrad) } else { 10.0 },
        }
    }

    /// One-line summary of the non-unity factors for step logs
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        for (name, value) in [("C2", self.c2), ("C3", self.c3), ("C4", self.c4), ("C6", self.c6), ("C7", self.c7)] {
            if (value - 1.0).abs() > 1e-12 {
                parts.push(format!("{} = {:.4}", name, value));
            }
        }
        if is_retinal(self.wavelength_nm) {
            parts.push(format!("T2 = {:.2} s", self.t2_s));
        }
        if parts.is_empty() {
            "all correction factors = 1".to_string()
        } else {
            parts.join(", ")
        }
    }
}
