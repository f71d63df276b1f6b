// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Physical constants.
//!
//! SI is the working system of the mapper. The cgs submodule carries the
//! Gaussian values used by the older diagnostic codes.

/// Elementary charge (C)
pub const Q_ELECTRON: f64 = 1.602176634e-19;

/// Electron mass (kg)
pub const M_ELECTRON: f64 = 9.1093837015e-31;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.67262192369e-27;

/// Deuterium mass (kg)
pub const M_DEUTERIUM: f64 = 3.3435837724e-27;

/// Vacuum permittivity (F/m)
pub const EPSILON_0: f64 = 8.8541878128e-12;

/// Vacuum permeability (H/m)
pub const MU0_SI: f64 = 1.25663706212e-6;

/// Speed of light (m/s)
pub const C_LIGHT: f64 = 2.99792458e8;

/// One electron-volt in joules. Temperatures are carried in eV.
pub const EV_TO_J: f64 = Q_ELECTRON;

/// Gaussian (cgs) values.
pub mod cgs {
    /// Elementary charge (statC)
    pub const Q_ELECTRON: f64 = 4.80320471e-10;
    /// Electron mass (g)
    pub const M_ELECTRON: f64 = 9.1093837015e-28;
    /// Proton mass (g)
    pub const M_PROTON: f64 = 1.67262192369e-24;
    /// Speed of light (cm/s)
    pub const C_LIGHT: f64 = 2.99792458e10;
    /// One electron-volt in erg
    pub const EV_TO_ERG: f64 = 1.602176634e-12;
}
