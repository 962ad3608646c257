//! # Engineering Equations
//!
//! This module contains the fundamental optics and RF formulas used in calculations.
//! Having equations in one place enables:
//! - Easy verification against the standards (IEC 60825-1, EN 207, EN 60728-1)
//! - Documentation of assumptions and conventions
//! - Consistent implementation across calculation types
//!
//! ## Modules
//!
//! - [`optics`] - Beam propagation, aperture coupling, NOHD, optical density
//! - [`rf`] - Thermal noise, C/N cascades, cable attenuation, link budgets
//! - [`registry`] - Equation metadata and usage tracking for step logs and EQUATIONS.md
//!
//! ## Conventions
//!
//! - **Beam diameter and divergence**: 1/e (d63) values, full angle
//! - **Signal level**: dBµV across 75 Ω
//! - **Gains and losses**: Positive dB values; losses are subtracted
//!
//! ## References
//!
//! - IEC 60825-1:2007 Safety of laser products - Part 1
//! - IEC/TR 60825-14:2004 Safety of laser products - Part 14: A user's guide
//! - EN 207:2009 Personal eye-protection equipment against laser radiation
//! - EN 60728-1:2014 Cable networks for television signals

pub mod optics;
pub mod registry;
pub mod rf;

pub use optics::{
    aperture_averaged_exposure,
    beam_diameter_at,
    beam_irradiance,
    circle_area_m2,
    coupled_fraction,
    nohd,
    optical_aid_gain,
    optical_density,
    scale_number,
};

pub use rf::{
    amplifier_stage_cn_db,
    cascade_cn_db,
    ideal_split_loss_db,
    interpolate_sqrt_f,
    link_margin_db,
    maximum_reach_km,
    power_budget_db,
    skin_effect_scaling,
    thermal_noise_floor_dbuv,
};

pub use registry::{
    CodeReference,
    Equation,
    EquationCategory,
    EquationMetadata,
    EquationTracker,
    EquationUsage,
    Variable,
    ALL_EQUATIONS,
    generate_equations_markdown,
};
