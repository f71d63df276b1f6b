// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Equilibrium
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Magnetic equilibrium and the (R, Z) → (a, θ) flux-coordinate solve.
//!
//! The equilibrium is described by nested flux surfaces parametrised by a
//! radial label `a` (0 on the magnetic axis, 1 on the LCFS) and a poloidal
//! angle θ. `ShapedEquilibrium` uses Miller-like shaping:
//!
//!   R = R0 + Δ0(1 − a²) + a·a_min·cos(θ + δ·a·sinθ)
//!   Z = Z0 + κ·a·a_min·sinθ
//!
//! with q(a) = q0 + (q_edge − q0)a², B_t = B0·R0/R and B_p = B_t·ε/q,
//! ε = a·a_min/R0.

use std::f64::consts::PI;

use sdp_math::coords::wrap_angle;
use sdp_math::newton::{solve_2d, NewtonOptions};
use sdp_math::polygon::Polygon;
use sdp_types::error::{SdpError, SdpResult};
use sdp_types::state::FluxCoordinates;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Magnetic equilibrium as seen by the mapper.
pub trait Equilibrium {
    /// Vacuum toroidal field at `r0` [T].
    fn b0(&self) -> f64;

    /// Reference major radius [m].
    fn r0(&self) -> f64;

    /// `(R, Z)` of the magnetic axis.
    fn magnetic_axis(&self) -> (f64, f64);

    /// `(R, Z)` of the flux-surface point `(a, θ)`.
    fn position(&self, a: f64, theta: f64) -> (f64, f64);

    fn safety_factor(&self, a: f64) -> f64;

    /// `(B_pol, |B|)` at `(a, θ)` [T]. The vacuum toroidal part goes as
    /// 1/R, so |B| grows without bound toward the symmetry axis R = 0;
    /// mesh points there are not filtered.
    fn b_field(&self, a: f64, theta: f64) -> (f64, f64);

    /// Starting point of the flux-coordinate solve for `(R, Z)`.
    fn initial_guess(&self, r: f64, z: f64) -> (f64, f64);

    /// `n` points on the LCFS, uniform in θ.
    fn boundary_points(&self, n: usize) -> (Vec<f64>, Vec<f64>) {
        (0..n)
            .map(|i| self.position(1.0, 2.0 * PI * i as f64 / n as f64))
            .unzip()
    }
}

/// Shape and field parameters of a `ShapedEquilibrium`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumParams {
    #[serde(default = "default_r0")]
    pub r0: f64,
    #[serde(default)]
    pub z0: f64,
    #[serde(default = "default_b0")]
    pub b0: f64,
    #[serde(default = "default_a_minor")]
    pub a_minor: f64,
    #[serde(default = "default_elongation")]
    pub elongation: f64,
    #[serde(default = "default_triangularity")]
    pub triangularity: f64,
    /// Shafranov shift of the axis relative to the boundary centre [m].
    #[serde(default = "default_shafranov_shift")]
    pub shafranov_shift: f64,
    #[serde(default = "default_q0")]
    pub q0: f64,
    #[serde(default = "default_q_edge")]
    pub q_edge: f64,
}

fn default_r0() -> f64 {
    1.67
}
fn default_b0() -> f64 {
    2.0
}
fn default_a_minor() -> f64 {
    0.67
}
fn default_elongation() -> f64 {
    1.7
}
fn default_triangularity() -> f64 {
    0.3
}
fn default_shafranov_shift() -> f64 {
    0.05
}
fn default_q0() -> f64 {
    1.0
}
fn default_q_edge() -> f64 {
    4.5
}

impl Default for EquilibriumParams {
    fn default() -> Self {
        EquilibriumParams {
            r0: default_r0(),
            z0: 0.0,
            b0: default_b0(),
            a_minor: default_a_minor(),
            elongation: default_elongation(),
            triangularity: default_triangularity(),
            shafranov_shift: default_shafranov_shift(),
            q0: default_q0(),
            q_edge: default_q_edge(),
        }
    }
}

impl EquilibriumParams {
    pub fn from_file(path: &str) -> SdpResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&contents)?;
        Ok(params)
    }

    pub fn to_file(&self, path: &str) -> SdpResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> SdpResult<()> {
        let values = [
            self.r0,
            self.z0,
            self.b0,
            self.a_minor,
            self.elongation,
            self.triangularity,
            self.shafranov_shift,
            self.q0,
            self.q_edge,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SdpError::PhysicsViolation(
                "equilibrium parameters must be finite".into(),
            ));
        }
        if self.a_minor <= 0.0 || self.elongation <= 0.0 {
            return Err(SdpError::PhysicsViolation(format!(
                "a_minor and elongation must be positive, got {} and {}",
                self.a_minor, self.elongation
            )));
        }
        if self.triangularity.abs() >= 1.0 {
            return Err(SdpError::PhysicsViolation(format!(
                "|triangularity| must be < 1, got {}",
                self.triangularity
            )));
        }
        if self.r0 - self.a_minor + self.shafranov_shift.min(0.0) <= 0.0 {
            return Err(SdpError::PhysicsViolation(format!(
                "plasma crosses R = 0: r0={}, a_minor={}",
                self.r0, self.a_minor
            )));
        }
        if self.q0 <= 0.0 || self.q_edge <= 0.0 {
            return Err(SdpError::PhysicsViolation(
                "safety factor must be positive".into(),
            ));
        }
        if self.b0 == 0.0 {
            return Err(SdpError::PhysicsViolation("B0 must be non-zero".into()));
        }
        Ok(())
    }
}

/// Analytic equilibrium with elongated, triangular, shifted flux surfaces.
#[derive(Debug, Clone)]
pub struct ShapedEquilibrium {
    params: EquilibriumParams,
}

impl ShapedEquilibrium {
    pub fn new(params: EquilibriumParams) -> SdpResult<Self> {
        params.validate()?;
        Ok(ShapedEquilibrium { params })
    }

    pub fn params(&self) -> &EquilibriumParams {
        &self.params
    }
}

impl Equilibrium for ShapedEquilibrium {
    fn b0(&self) -> f64 {
        self.params.b0
    }

    fn r0(&self) -> f64 {
        self.params.r0
    }

    fn magnetic_axis(&self) -> (f64, f64) {
        self.position(0.0, 0.0)
    }

    fn position(&self, a: f64, theta: f64) -> (f64, f64) {
        let p = &self.params;
        let shift = p.shafranov_shift * (1.0 - a * a);
        let r = p.r0 + shift + a * p.a_minor * (theta + p.triangularity * a * theta.sin()).cos();
        let z = p.z0 + p.elongation * a * p.a_minor * theta.sin();
        (r, z)
    }

    fn safety_factor(&self, a: f64) -> f64 {
        self.params.q0 + (self.params.q_edge - self.params.q0) * a * a
    }

    fn b_field(&self, a: f64, theta: f64) -> (f64, f64) {
        let (r, _) = self.position(a, theta);
        let bt = self.params.b0 * self.params.r0 / r;
        let eps = a * self.params.a_minor / self.params.r0;
        let bp = bt * eps / self.safety_factor(a);
        (bp.abs(), bt.hypot(bp))
    }

    /// Circular inversion about the axis, with Z scaled by the elongation.
    fn initial_guess(&self, r: f64, z: f64) -> (f64, f64) {
        let (r_axis, z_axis) = self.magnetic_axis();
        let dr = r - r_axis;
        let dz = (z - z_axis) / self.params.elongation;
        let a = dr.hypot(dz) / self.params.a_minor;
        let theta = if a == 0.0 { 0.0 } else { wrap_angle(dz.atan2(dr)) };
        (a, theta)
    }
}

/// Load the equilibrium description stored at `path`. Returns `(B0, R0, eq)`.
pub fn read_equilibrium(path: &str) -> SdpResult<(f64, f64, ShapedEquilibrium)> {
    let params = EquilibriumParams::from_file(path)?;
    let eq = ShapedEquilibrium::new(params)?;
    debug!(path, b0 = eq.b0(), r0 = eq.r0(), "equilibrium loaded");
    Ok((eq.b0(), eq.r0(), eq))
}

/// Solve `position(a, θ) = (R, Z)` for every point.
///
/// Inside/outside the LCFS is decided by containment in the polygon of
/// `n_boundary` boundary points. Points where Newton does not converge keep
/// their best estimate and are reported through `converged`.
pub fn flux_coordinates<E: Equilibrium + ?Sized>(
    eq: &E,
    r: &[f64],
    z: &[f64],
    n_boundary: usize,
    tolerance: f64,
    max_iter: usize,
) -> SdpResult<FluxCoordinates> {
    SdpError::check_shape("Z", &[r.len()], &[z.len()])?;
    let (br, bz) = eq.boundary_points(n_boundary);
    let lcfs = Polygon::new(br, bz)?;
    let opts = NewtonOptions {
        tolerance,
        max_iter,
    };
    let project = |x: [f64; 2]| [x[0].max(0.0), wrap_angle(x[1])];

    let mut out = FluxCoordinates::with_len(r.len());
    let mut failed = 0usize;
    for (i, (&ri, &zi)) in r.iter().zip(z).enumerate() {
        let (a0, t0) = eq.initial_guess(ri, zi);
        let res = solve_2d(
            |a, t| eq.position(a, t),
            [ri, zi],
            [a0, t0],
            project,
            opts,
        );
        if !res.converged {
            failed += 1;
            if failed == 1 {
                warn!(
                    index = i,
                    r = ri,
                    z = zi,
                    residual = res.residual,
                    "flux coordinate solve did not converge"
                );
            }
        }
        out.a[i] = res.x[0];
        out.theta[i] = res.x[1];
        out.r_actual[i] = res.value[0];
        out.z_actual[i] = res.value[1];
        out.converged[i] = res.converged;
        out.inside_lcfs[i] = lcfs.contains(ri, zi);
    }

    if failed > 0 {
        warn!(failed, total = r.len(), "unconverged flux coordinate points kept at best estimate");
    }
    debug!(
        points = r.len(),
        inside = out.inside_lcfs.iter().filter(|&&f| f).count(),
        "flux coordinates solved"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circular() -> ShapedEquilibrium {
        ShapedEquilibrium::new(EquilibriumParams {
            elongation: 1.0,
            triangularity: 0.0,
            shafranov_shift: 0.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_axis_and_boundary() {
        let eq = ShapedEquilibrium::new(EquilibriumParams::default()).unwrap();
        let (ra, za) = eq.magnetic_axis();
        assert!((ra - 1.72).abs() < 1e-12);
        assert_eq!(za, 0.0);
        let (r, z) = eq.boundary_points(64);
        assert_eq!(r.len(), 64);
        // Outboard midplane is R0 + a_min, top is κ·a_min
        assert!((r[0] - 2.34).abs() < 1e-12);
        assert!((z[16] - 1.7 * 0.67).abs() < 1e-12);
    }

    #[test]
    fn test_field_and_q() {
        let eq = circular();
        assert!((eq.safety_factor(0.0) - 1.0).abs() < 1e-15);
        assert!((eq.safety_factor(1.0) - 4.5).abs() < 1e-15);
        let (bp, b) = eq.b_field(0.0, 0.0);
        assert_eq!(bp, 0.0);
        assert!((b - 2.0).abs() < 1e-12);
        // Outboard edge: Bt = B0 R0 / (R0 + a)
        let (bp, b) = eq.b_field(1.0, 0.0);
        let bt = 2.0 * 1.67 / 2.34;
        assert!((bp - bt * (0.67 / 1.67) / 4.5).abs() < 1e-12);
        assert!(b > bt);
    }

    #[test]
    fn test_field_follows_inverse_r_inboard() {
        let eq = circular();
        // Far outside on the inboard side R shrinks toward the symmetry axis
        let a_near = (1.67 - 0.01) / 0.67;
        let a_far = (1.67 - 0.001) / 0.67;
        let (_, b_near) = eq.b_field(a_near, PI);
        let (_, b_far) = eq.b_field(a_far, PI);
        assert!((eq.position(a_far, PI).0 - 0.001).abs() < 1e-12);
        let bt_far = 2.0 * 1.67 / 0.001;
        assert!(b_far >= bt_far && b_far > 9.0 * b_near);
    }

    #[test]
    fn test_flux_coordinates_reproduce_position() {
        let eq = ShapedEquilibrium::new(EquilibriumParams::default()).unwrap();
        let samples = [(0.3, 0.4), (0.8, 2.0), (0.95, 4.5), (0.5, 5.9)];
        let (r, z): (Vec<f64>, Vec<f64>) = samples.iter().map(|&(a, t)| eq.position(a, t)).unzip();
        let fc = flux_coordinates(&eq, &r, &z, 1001, 1e-12, 50).unwrap();
        for (i, &(a, t)) in samples.iter().enumerate() {
            assert!(fc.converged[i], "point {i} did not converge");
            assert!((fc.a[i] - a).abs() < 1e-8, "a[{i}] = {}", fc.a[i]);
            assert!((fc.theta[i] - t).abs() < 1e-8, "theta[{i}] = {}", fc.theta[i]);
            assert!((fc.r_actual[i] - r[i]).abs() < 1e-10);
            assert!((fc.z_actual[i] - z[i]).abs() < 1e-10);
            assert!(fc.inside_lcfs[i]);
        }
    }

    #[test]
    fn test_axis_and_outside_points_classified() {
        let eq = circular();
        let (ra, za) = eq.magnetic_axis();
        let r = vec![ra, 2.5, 1.67];
        let z = vec![za, 0.0, 0.8];
        let fc = flux_coordinates(&eq, &r, &z, 1001, 1e-10, 50).unwrap();
        assert!(fc.inside_lcfs[0]);
        assert!(fc.a[0] < 1e-8);
        assert!(!fc.inside_lcfs[1]);
        assert!(!fc.inside_lcfs[2]);
        // Circular surfaces: a is the normalised distance from the axis
        assert!((fc.a[1] - 0.83 / 0.67).abs() < 1e-8);
        assert!((fc.a[2] - 0.8 / 0.67).abs() < 1e-8);
    }

    #[test]
    fn test_points_straddling_lcfs_classified() {
        let eq = ShapedEquilibrium::new(EquilibriumParams::default()).unwrap();
        let thetas = [0.0, 0.7, 1.6, 2.5, PI, 4.0, 5.5];
        for &da in &[-1e-3, 1e-3] {
            let (r, z): (Vec<f64>, Vec<f64>) =
                thetas.iter().map(|&t| eq.position(1.0 + da, t)).unzip();
            let fc = flux_coordinates(&eq, &r, &z, 1001, 1e-12, 50).unwrap();
            for (i, &t) in thetas.iter().enumerate() {
                assert_eq!(fc.inside_lcfs[i], da < 0.0, "a = {}, theta = {t}", 1.0 + da);
                assert!(fc.converged[i]);
                assert!((fc.a[i] - (1.0 + da)).abs() < 1e-8, "a[{i}] = {}", fc.a[i]);
            }
        }
    }

    #[test]
    fn test_rejects_bad_params() {
        let bad = EquilibriumParams {
            a_minor: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            ShapedEquilibrium::new(bad),
            Err(SdpError::PhysicsViolation(_))
        ));
        let bad = EquilibriumParams {
            triangularity: 1.2,
            ..Default::default()
        };
        assert!(ShapedEquilibrium::new(bad).is_err());
    }

    #[test]
    fn test_read_equilibrium_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "sdp_equilibrium_{}.json",
            std::process::id()
        ));
        let params = EquilibriumParams {
            b0: 2.5,
            r0: 1.8,
            ..Default::default()
        };
        params.to_file(path.to_str().unwrap()).unwrap();
        let (b0, r0, eq) = read_equilibrium(path.to_str().unwrap()).unwrap();
        assert_eq!(b0, 2.5);
        assert_eq!(r0, 1.8);
        assert_eq!(eq.params(), &params);
        std::fs::remove_file(path).ok();

        assert!(matches!(
            read_equilibrium("/nonexistent/sdp/ESI_EQFILE"),
            Err(SdpError::Io(_))
        ));
    }
}
