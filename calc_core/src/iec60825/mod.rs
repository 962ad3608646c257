//! # IEC 60825-1 Tables
//!
//! Exposure-limit data for laser product classification (IEC 60825-1:2007).
//!
//! ## Modules
//!
//! - [`correction`] - Correction factors C1–C7 and breakpoints T1, T2, Ti
//! - [`ael`] - Accessible emission limits for Classes 1, 2, 3R, 3B
//! - [`mpe`] - Ocular maximum permissible exposure
//! - [`conditions`] - Measurement conditions 1 and 3, limiting apertures
//!
//! ## Class Ladder
//!
//! | Class | Meaning |
//! |-------|---------|
//! | 1     | Safe under all reasonably foreseeable conditions |
//! | 1M    | Safe for the naked eye, hazardous with optical instruments |
//! | 2     | Visible, eye protected by aversion response (0.25 s) |
//! | 2M    | As 2, hazardous with optical instruments |
//! | 3R    | Up to 5× the Class 1/2 limit, low risk |
//! | 3B    | Direct viewing hazardous, diffuse reflections normally safe |
//! | 4     | Everything above Class 3B |

pub mod ael;
pub mod conditions;
pub mod correction;
pub mod mpe;

pub use ael::{accessible_emission_limit, Ael, AelClass, AelUnit};
pub use conditions::{limiting_aperture_mm, MeasurementCondition};
pub use correction::CorrectionFactors;
pub use mpe::{ocular_mpe, Mpe, MpeUnit};

use serde::{Deserialize, Serialize};

/// Laser product class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LaserClass {
    #[serde(rename = "1")]
    Class1,
    #[serde(rename = "1M")]
    Class1M,
    #[serde(rename = "2")]
    Class2,
    #[serde(rename = "2M")]
    Class2M,
    #[serde(rename = "3R")]
    Class3R,
    #[serde(rename = "3B")]
    Class3B,
    #[serde(rename = "4")]
    Class4,
}

impl LaserClass {
    /// Ladder order, least to most hazardous
    pub const ALL: [LaserClass; 7] = [
        LaserClass::Class1,
        LaserClass::Class1M,
        LaserClass::Class2,
        LaserClass::Class2M,
        LaserClass::Class3R,
        LaserClass::Class3B,
        LaserClass::Class4,
    ];

    /// Short code as printed on labels ("1M", "3B", ...)
    pub fn code(&self) -> &'static str {
        match self {
            LaserClass::Class1 => "1",
            LaserClass::Class1M => "1M",
            LaserClass::Class2 => "2",
            LaserClass::Class2M => "2M",
            LaserClass::Class3R => "3R",
            LaserClass::Class3B => "3B",
            LaserClass::Class4 => "4",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LaserClass::Class1 => "Class 1",
            LaserClass::Class1M => "Class 1M",
            LaserClass::Class2 => "Class 2",
            LaserClass::Class2M => "Class 2M",
            LaserClass::Class3R => "Class 3R",
            LaserClass::Class3B => "Class 3B",
            LaserClass::Class4 => "Class 4",
        }
    }

    /// Parse from a code, accepting an optional "Class " prefix and any case
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let code = trimmed
            .strip_prefix("Class ")
            .or_else(|| trimmed.strip_prefix("class "))
            .unwrap_or(trimmed)
            .trim()
            .to_uppercase();
        LaserClass::ALL.into_iter().find(|class| class.code() == code)
    }

    /// AEL table this class is tested against (under Condition 3 for the M classes)
    pub fn ael_class(&self) -> Option<AelClass> {
        match self {
            LaserClass::Class1 | LaserClass::Class1M => Some(AelClass::Class1),
            LaserClass::Class2 | LaserClass::Class2M => Some(AelClass::Class2),
            LaserClass::Class3R => Some(AelClass::Class3R),
            LaserClass::Class3B => Some(AelClass::Class3B),
            LaserClass::Class4 => None,
        }
    }

    /// Whether the class is hazardous when viewed with optical instruments
    pub fn is_magnifier_class(&self) -> bool {
        matches!(self, LaserClass::Class1M | LaserClass::Class2M)
    }
}

impl std::fmt::Display for LaserClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Spectral group whose exposures add (IEC 60825-1:2007 Table A.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HazardGroup {
    /// 180–400 nm
    Ultraviolet,
    /// 400–1400 nm
    Retinal,
    /// 1400 nm – 1 mm
    Infrared,
}

impl HazardGroup {
    pub const ALL: [HazardGroup; 3] = [HazardGroup::Ultraviolet, HazardGroup::Retinal, HazardGroup::Infrared];

    pub fn for_wavelength(wavelength_nm: f64) -> Self {
        if wavelength_nm < 400.0 {
            HazardGroup::Ultraviolet
        } else if wavelength_nm < 1400.0 {
            HazardGroup::Retinal
        } else {
            HazardGroup::Infrared
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HazardGroup::Ultraviolet => "Ultraviolet (180–400 nm)",
            HazardGroup::Retinal => "Retinal (400–1400 nm)",
            HazardGroup::Infrared => "Infrared (1400 nm – 1 mm)",
        }
    }
}

/// Whether the wavelength is visible (400–700 nm)
pub fn is_visible(wavelength_nm: f64) -> bool {
    (400.0..700.0).contains(&wavelength_nm)
}
