// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Property-Based Tests (proptest) for sdp-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for sdp-math using proptest.
//!
//! Covers: cylindrical transform, 1D/3D linear interpolation, the 2D Newton
//! solver and polygon containment.

use ndarray::Array3;
use proptest::prelude::*;
use sdp_math::coords::{cartesian_to_cylindrical, cylindrical_to_cartesian};
use sdp_math::interp::{interp3d, GridAxis, LinearInterp1D};
use sdp_math::newton::{solve_2d, NewtonOptions};
use sdp_math::polygon::Polygon;
use std::f64::consts::PI;

// ── Coordinate Transform ─────────────────────────────────────────────

proptest! {
    /// Cartesian → cylindrical → Cartesian recovers the point.
    #[test]
    fn cylindrical_roundtrip(
        x in -5.0f64..5.0,
        y in -2.0f64..2.0,
        z in -5.0f64..5.0,
    ) {
        prop_assume!(x.hypot(z) > 1e-9);
        let (r, zc, phi) = cartesian_to_cylindrical(x, y, z);
        prop_assert!(r >= 0.0);
        prop_assert!((0.0..2.0 * PI).contains(&phi));
        prop_assert_eq!(zc, y);
        let (x2, y2, z2) = cylindrical_to_cartesian(r, zc, phi);
        prop_assert!((x2 - x).abs() < 1e-12 && (y2 - y).abs() < 1e-12 && (z2 - z).abs() < 1e-12);
    }

    /// R depends only on X and Z.
    #[test]
    fn major_radius_is_horizontal_distance(
        x in -5.0f64..5.0,
        y1 in -2.0f64..2.0,
        y2 in -2.0f64..2.0,
        z in -5.0f64..5.0,
    ) {
        let (r1, _, _) = cartesian_to_cylindrical(x, y1, z);
        let (r2, _, _) = cartesian_to_cylindrical(x, y2, z);
        prop_assert_eq!(r1, r2);
        prop_assert!((r1 * r1 - (x * x + z * z)).abs() < 1e-10);
    }
}

// ── Interpolation ────────────────────────────────────────────────────

proptest! {
    /// A linear table is reproduced exactly inside its range.
    #[test]
    fn interp1d_reproduces_linear(
        slope in -10.0f64..10.0,
        offset in -10.0f64..10.0,
        n in 2usize..50,
        frac in 0.0f64..1.0,
    ) {
        let x: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| slope * v + offset).collect();
        let table = LinearInterp1D::new(x, y).unwrap();
        prop_assert!((table.eval(frac) - (slope * frac + offset)).abs() < 1e-10);
    }

    /// Interpolated values never leave the range of the table values.
    #[test]
    fn interp1d_bounded_by_data(
        ys in prop::collection::vec(-100.0f64..100.0, 2..30),
        xq in -1.0f64..2.0,
    ) {
        let n = ys.len();
        let x: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
        let lo = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let table = LinearInterp1D::new(x, ys).unwrap();
        let v = table.eval(xq);
        prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
    }

    /// Trilinear interpolation is exact for fields linear in each axis.
    #[test]
    fn interp3d_trilinear_exact(
        c0 in -3.0f64..3.0,
        c1 in -3.0f64..3.0,
        c2 in -3.0f64..3.0,
        p0 in 0.0f64..2.0,
        p1 in 0.0f64..1.0,
        p2 in 0.0f64..3.0,
    ) {
        let ax0 = GridAxis::bounded(vec![0.0, 1.0, 2.0]).unwrap();
        let ax1 = GridAxis::bounded(vec![0.0, 0.5, 1.0]).unwrap();
        let ax2 = GridAxis::bounded(vec![0.0, 1.5, 3.0]).unwrap();
        let field = Array3::from_shape_fn((3, 3, 3), |(i, j, k)| {
            c0 * ax0.points()[i] + c1 * ax1.points()[j] + c2 * ax2.points()[k]
        });
        let v = interp3d(&field, [&ax0, &ax1, &ax2], [p0, p1, p2]).unwrap();
        prop_assert!((v - (c0 * p0 + c1 * p1 + c2 * p2)).abs() < 1e-10);
    }
}

// ── Newton Solver ────────────────────────────────────────────────────

proptest! {
    /// Any well-conditioned linear map is inverted.
    #[test]
    fn newton_inverts_linear_maps(
        a in 1.0f64..4.0,
        b in -0.5f64..0.5,
        c in -0.5f64..0.5,
        d in 1.0f64..4.0,
        t0 in -5.0f64..5.0,
        t1 in -5.0f64..5.0,
    ) {
        let f = |u: f64, v: f64| (a * u + b * v, c * u + d * v);
        let res = solve_2d(f, [t0, t1], [0.0, 0.0], |x| x, NewtonOptions::default());
        prop_assert!(res.converged, "residual = {}", res.residual);
        let (f0, f1) = f(res.x[0], res.x[1]);
        prop_assert!((f0 - t0).abs() < 1e-9 && (f1 - t1).abs() < 1e-9);
    }
}

// ── Polygon Containment ──────────────────────────────────────────────

proptest! {
    /// A finely sampled circle classifies points away from its edge the same
    /// way the exact circle does.
    #[test]
    fn polygon_matches_circle(
        rad in 0.2f64..1.0,
        px in -1.5f64..1.5,
        pz in -1.5f64..1.5,
    ) {
        let n = 720;
        let (r, z): (Vec<f64>, Vec<f64>) = (0..n)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / n as f64;
                (rad * t.cos(), rad * t.sin())
            })
            .unzip();
        let poly = Polygon::new(r, z).unwrap();
        let d = px.hypot(pz);
        prop_assume!((d - rad).abs() > 1e-3);
        prop_assert_eq!(poly.contains(px, pz), d < rad);
    }
}
