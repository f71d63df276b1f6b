// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Plasma
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! GTS profile mapping onto Cartesian diagnostic meshes.
//!
//! Equilibrium and flux coordinates, radial profiles, potential
//! fluctuations, the adiabatic electron response and the mapper that
//! chains them. `dispersion` holds the cold-plasma formulas the
//! diagnostics evaluate on the mapped profiles.

pub mod dispersion;
pub mod equilibrium;
pub mod fluctuations;
pub mod mapper;
pub mod profiles;
pub mod response;
