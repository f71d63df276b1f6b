// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Coordinates
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Laboratory Cartesian ↔ cylindrical (R, Z, φ) transforms.
//!
//! X is the horizontal direction through φ = 0, Y is vertical and Z is
//! toroidal. With φ = atan2(-Z, X) both X-Y-Z and R-φ-Z(vertical) are
//! right-handed, so positive φ points along negative Z.

use std::f64::consts::PI;

use ndarray::ArrayView3;
use sdp_types::error::{SdpError, SdpResult};

const TWO_PI: f64 = 2.0 * PI;

/// Wrap an angle into [0, 2π).
pub fn wrap_angle(phi: f64) -> f64 {
    let w = phi.rem_euclid(TWO_PI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if w >= TWO_PI {
        0.0
    } else {
        w
    }
}

/// `(X, Y, Z)` → `(R, Z_cyl, φ)` with φ ∈ [0, 2π).
pub fn cartesian_to_cylindrical(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let r = x.hypot(z);
    let phi = if r == 0.0 { 0.0 } else { wrap_angle((-z).atan2(x)) };
    (r, y, phi)
}

/// `(R, Z_cyl, φ)` → `(X, Y, Z)`.
pub fn cylindrical_to_cartesian(r: f64, z_cyl: f64, phi: f64) -> (f64, f64, f64) {
    let (sin_p, cos_p) = phi.sin_cos();
    (r * cos_p, z_cyl, -r * sin_p)
}

/// Cylindrical coordinates of every point of a 3D mesh, flattened in
/// memory (C) order.
#[derive(Debug, Clone)]
pub struct CylindricalPoints {
    pub r: Vec<f64>,
    pub z: Vec<f64>,
    pub phi: Vec<f64>,
}

impl CylindricalPoints {
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }
}

/// Convert three same-shaped mesh arrays to cylindrical points. Every
/// coordinate must be finite.
pub fn mesh_to_cylindrical(
    x: ArrayView3<'_, f64>,
    y: ArrayView3<'_, f64>,
    z: ArrayView3<'_, f64>,
) -> SdpResult<CylindricalPoints> {
    SdpError::check_shape("y", x.shape(), y.shape())?;
    SdpError::check_shape("z", x.shape(), z.shape())?;

    let n = x.len();
    let mut out = CylindricalPoints {
        r: Vec::with_capacity(n),
        z: Vec::with_capacity(n),
        phi: Vec::with_capacity(n),
    };
    for (i, ((&xv, &yv), &zv)) in x.iter().zip(y.iter()).zip(z.iter()).enumerate() {
        if !(xv.is_finite() && yv.is_finite() && zv.is_finite()) {
            return Err(SdpError::DataFormat(format!(
                "non-finite mesh coordinate at point {i}: ({xv}, {yv}, {zv})"
            )));
        }
        let (r, zc, phi) = cartesian_to_cylindrical(xv, yv, zv);
        out.r.push(r);
        out.z.push(zc);
        out.phi.push(phi);
    }
    Ok(out)
}
