// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::{Array1, Array3};

use crate::error::{SdpError, SdpResult};

/// Cartesian 3D mesh in the laboratory frame requested by a diagnostic.
/// X horizontal, Y vertical, Z toroidal. Arrays are laid out (NZ, NY, NX),
/// X fastest.
#[derive(Debug, Clone)]
pub struct Grid3D {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub x: Array1<f64>, // [nx] linspace(Xmin, Xmax, NX)
    pub y: Array1<f64>, // [ny]
    pub z: Array1<f64>, // [nz]
    pub dx: f64,        // 0 when nx == 1
    pub dy: f64,
    pub dz: f64,
}

fn axis(name: &str, lo: f64, hi: f64, n: usize) -> SdpResult<(Array1<f64>, f64)> {
    if n == 0 {
        return Err(SdpError::GridError(format!("N{name} must be >= 1")));
    }
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(SdpError::GridError(format!(
            "{name} limits invalid: min={lo}, max={hi}"
        )));
    }
    let step = if n > 1 { (hi - lo) / (n - 1) as f64 } else { 0.0 };
    Ok((Array1::linspace(lo, hi, n), step))
}

/// Point count giving a spacing no coarser than `res` over `[lo, hi]`.
///
/// A degenerate axis (`lo == hi`) gets a single point with spacing 0,
/// not the two coincident points `floor(0 / res) + 2` would give.
fn count_from_resolution(name: &str, lo: f64, hi: f64, res: f64) -> SdpResult<usize> {
    if !(res.is_finite() && res > 0.0) {
        return Err(SdpError::GridError(format!(
            "Res{name} must be positive, got {res}"
        )));
    }
    let range = hi - lo;
    if range == 0.0 {
        return Ok(1);
    }
    Ok((range / res).floor() as usize + 2)
}

impl Grid3D {
    /// Build from `(min, max, count)` per axis.
    pub fn new(
        x: (f64, f64, usize),
        y: (f64, f64, usize),
        z: (f64, f64, usize),
    ) -> SdpResult<Self> {
        let (xs, dx) = axis("X", x.0, x.1, x.2)?;
        let (ys, dy) = axis("Y", y.0, y.1, y.2)?;
        let (zs, dz) = axis("Z", z.0, z.1, z.2)?;
        Ok(Grid3D {
            nx: x.2,
            ny: y.2,
            nz: z.2,
            x: xs,
            y: ys,
            z: zs,
            dx,
            dy,
            dz,
        })
    }

    /// Build from `(min, max, resolution)` per axis. The realised spacing is
    /// never coarser than requested.
    pub fn from_resolution(
        x: (f64, f64, f64),
        y: (f64, f64, f64),
        z: (f64, f64, f64),
    ) -> SdpResult<Self> {
        let nx = count_from_resolution("X", x.0, x.1, x.2)?;
        let ny = count_from_resolution("Y", y.0, y.1, y.2)?;
        let nz = count_from_resolution("Z", z.0, z.1, z.2)?;
        Self::new((x.0, x.1, nx), (y.0, y.1, ny), (z.0, z.1, nz))
    }

    /// (NZ, NY, NX)
    pub fn shape(&self) -> [usize; 3] {
        [self.nz, self.ny, self.nx]
    }

    /// Number of mesh points.
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full 3D coordinate arrays `(X3D, Y3D, Z3D)`, each (NZ, NY, NX).
    pub fn meshes(&self) -> (Array3<f64>, Array3<f64>, Array3<f64>) {
        let shape = (self.nz, self.ny, self.nx);
        let x3d = Array3::from_shape_fn(shape, |(_, _, i)| self.x[i]);
        let y3d = Array3::from_shape_fn(shape, |(_, j, _)| self.y[j]);
        let z3d = Array3::from_shape_fn(shape, |(k, _, _)| self.z[k]);
        (x3d, y3d, z3d)
    }
}

/// Field-line coordinates of a flattened set of mesh points.
#[derive(Debug, Clone)]
pub struct FluxCoordinates {
    pub a: Vec<f64>,          // radial flux label, 0 on axis, 1 on LCFS
    pub theta: Vec<f64>,      // poloidal angle [0, 2π)
    pub r_actual: Vec<f64>,   // R reached by the solve [m]
    pub z_actual: Vec<f64>,   // Z reached by the solve [m]
    pub inside_lcfs: Vec<bool>,
    pub converged: Vec<bool>,
}

impl FluxCoordinates {
    pub fn with_len(n: usize) -> Self {
        FluxCoordinates {
            a: vec![0.0; n],
            theta: vec![0.0; n],
            r_actual: vec![0.0; n],
            z_actual: vec![0.0; n],
            inside_lcfs: vec![false; n],
            converged: vec![false; n],
        }
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

/// Equilibrium quantities evaluated on the flattened mesh.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    pub ne0: Vec<f64>,      // electron density [m^-3]
    pub te: Vec<f64>,       // electron temperature [eV]
    pub ti: Vec<f64>,       // ion temperature [eV]
    pub pressure: Vec<f64>, // [Pa]
    pub bpol: Vec<f64>,     // poloidal field [T]
    pub b_total: Vec<f64>,  // |B| [T]
    pub q: Vec<f64>,        // safety factor
}

impl ProfileSet {
    pub fn len(&self) -> usize {
        self.ne0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ne0.is_empty()
    }
}
