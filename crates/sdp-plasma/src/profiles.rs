// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Profiles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radial density and temperature profiles and their evaluation on the
//! mesh.

use std::fs::File;

use ndarray::{Array1, Ix1, OwnedRepr};
use ndarray_npy::NpzReader;
use sdp_math::interp::LinearInterp1D;
use sdp_types::constants::EV_TO_J;
use sdp_types::error::{SdpError, SdpResult};
use sdp_types::state::{FluxCoordinates, ProfileSet};
use tracing::debug;

use crate::equilibrium::Equilibrium;

/// Profile values on the LCFS (a = 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeValues {
    pub ne: f64,
    pub te: f64,
    pub ti: f64,
}

/// `f(a) = edge + (core − edge)(1 − a²)^alpha` on [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct ParabolicProfile {
    pub core: f64,
    pub edge: f64,
    pub alpha: f64,
}

impl ParabolicProfile {
    pub fn eval(&self, a: f64) -> f64 {
        let s = (1.0 - a * a).max(0.0);
        self.edge + (self.core - self.edge) * s.powf(self.alpha)
    }
}

/// ne [m⁻³], Te [eV] and Ti [eV] tabulated on a monotonic `a` grid.
#[derive(Debug, Clone)]
pub struct FluxProfiles {
    ne: LinearInterp1D,
    te: LinearInterp1D,
    ti: LinearInterp1D,
}

impl FluxProfiles {
    pub fn new(a: Vec<f64>, ne: Vec<f64>, te: Vec<f64>, ti: Vec<f64>) -> SdpResult<Self> {
        for (name, values) in [("ne", &ne), ("te", &te), ("ti", &ti)] {
            if values.iter().any(|&v| v < 0.0) {
                return Err(SdpError::PhysicsViolation(format!(
                    "{name} profile has negative values"
                )));
            }
        }
        Ok(FluxProfiles {
            ne: LinearInterp1D::new(a.clone(), ne)?,
            te: LinearInterp1D::new(a.clone(), te)?,
            ti: LinearInterp1D::new(a, ti)?,
        })
    }

    /// Load the NT profile archive (arrays `a`, `ne`, `te`, `ti`).
    pub fn from_npz(path: &str) -> SdpResult<Self> {
        let file = File::open(path)?;
        let mut npz = NpzReader::new(file)
            .map_err(|e| SdpError::DataFormat(format!("Failed to open npz '{path}': {e}")))?;
        let a = read_array1(&mut npz, "a")?;
        let ne = read_array1(&mut npz, "ne")?;
        let te = read_array1(&mut npz, "te")?;
        let ti = read_array1(&mut npz, "ti")?;
        debug!(path, points = a.len(), "NT profiles loaded");
        Self::new(a.to_vec(), ne.to_vec(), te.to_vec(), ti.to_vec())
    }

    /// Sample analytic profiles on `n` uniform points over [0, 1].
    pub fn parabolic(
        ne: ParabolicProfile,
        te: ParabolicProfile,
        ti: ParabolicProfile,
        n: usize,
    ) -> SdpResult<Self> {
        if n < 2 {
            return Err(SdpError::ConfigError(format!(
                "profile table needs at least 2 points, got {n}"
            )));
        }
        let a: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
        let sample = |p: &ParabolicProfile| a.iter().map(|&x| p.eval(x)).collect::<Vec<_>>();
        Self::new(a.clone(), sample(&ne), sample(&te), sample(&ti))
    }

    /// `(ne, Te, Ti)` at `a`; values past either end of the table are held.
    pub fn at(&self, a: f64) -> (f64, f64, f64) {
        (self.ne.eval(a), self.te.eval(a), self.ti.eval(a))
    }

    pub fn edge(&self) -> EdgeValues {
        let (ne, te, ti) = self.at(1.0);
        EdgeValues { ne, te, ti }
    }
}

fn read_array1(npz: &mut NpzReader<File>, key: &str) -> SdpResult<Array1<f64>> {
    npz.by_name::<OwnedRepr<f64>, Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix1>(key))
        .map_err(|e| SdpError::DataFormat(format!("Failed to read {key} from npz: {e}")))
}

/// Plasma pressure ne·(Te + Ti)·e [Pa].
pub fn pressure(ne: f64, te: f64, ti: f64) -> f64 {
    ne * (te + ti) * EV_TO_J
}

/// Equilibrium quantities at every flux-coordinate point.
pub fn evaluate_profiles<E: Equilibrium + ?Sized>(
    eq: &E,
    profiles: &FluxProfiles,
    coords: &FluxCoordinates,
) -> SdpResult<ProfileSet> {
    let n = coords.len();
    SdpError::check_shape("theta", &[n], &[coords.theta.len()])?;

    let mut set = ProfileSet {
        ne0: Vec::with_capacity(n),
        te: Vec::with_capacity(n),
        ti: Vec::with_capacity(n),
        pressure: Vec::with_capacity(n),
        bpol: Vec::with_capacity(n),
        b_total: Vec::with_capacity(n),
        q: Vec::with_capacity(n),
    };
    for (&a, &theta) in coords.a.iter().zip(&coords.theta) {
        let (ne, te, ti) = profiles.at(a);
        let (bp, b) = eq.b_field(a, theta);
        set.ne0.push(ne);
        set.te.push(te);
        set.ti.push(ti);
        set.pressure.push(pressure(ne, te, ti));
        set.bpol.push(bp);
        set.b_total.push(b);
        set.q.push(eq.safety_factor(a));
    }
    debug!(points = n, "profiles evaluated");
    Ok(set)
}

/// Replace ne, Te and Ti outside the LCFS by the edge value decaying as
/// exp(−(a − 1)/decay_length). Pressure is updated to match.
pub fn decay_outside_lcfs(
    coords: &FluxCoordinates,
    set: &mut ProfileSet,
    edge: EdgeValues,
    decay_length: f64,
) -> SdpResult<()> {
    if !(decay_length.is_finite() && decay_length > 0.0) {
        return Err(SdpError::ConfigError(format!(
            "DecayLength must be positive, got {decay_length}"
        )));
    }
    SdpError::check_shape("profile set", &[coords.len()], &[set.len()])?;

    let mut decayed = 0usize;
    for i in 0..coords.len() {
        if coords.inside_lcfs[i] {
            continue;
        }
        let factor = (-(coords.a[i].max(1.0) - 1.0) / decay_length).exp();
        set.ne0[i] = edge.ne * factor;
        set.te[i] = edge.te * factor;
        set.ti[i] = edge.ti * factor;
        set.pressure[i] = pressure(set.ne0[i], set.te[i], set.ti[i]);
        decayed += 1;
    }
    debug!(decayed, decay_length, "profiles decayed outside LCFS");
    Ok(())
}
