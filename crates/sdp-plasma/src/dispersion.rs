//! Cold-plasma characteristic frequencies, cutoffs and refractive indices
//! for O- and X-mode propagation perpendicular to B, plus the field
//! formulas used to evaluate them on a tokamak cross-section.
//!
//! Frequencies are angular [rad/s]. SI throughout, except the `cgs`
//! submodule.

use sdp_types::constants::{C_LIGHT, EPSILON_0, MU0_SI, M_ELECTRON, Q_ELECTRON};

/// Electron plasma frequency ωpe for density `ne` [m⁻³].
pub fn plasma_frequency(ne: f64) -> f64 {
    (ne * Q_ELECTRON * Q_ELECTRON / (EPSILON_0 * M_ELECTRON)).sqrt()
}

/// Cyclotron frequency |q|B/m of a species.
pub fn cyclotron_frequency(b: f64, charge: f64, mass: f64) -> f64 {
    (charge * b / mass).abs()
}

fn electron_cyclotron(b: f64) -> f64 {
    cyclotron_frequency(b, Q_ELECTRON, M_ELECTRON)
}

/// ωuh = sqrt(ωpe² + ωce²).
pub fn upper_hybrid_frequency(ne: f64, b: f64) -> f64 {
    plasma_frequency(ne).hypot(electron_cyclotron(b))
}

/// X-mode right-hand cutoff ωR = (ωce + sqrt(ωce² + 4ωpe²)) / 2.
pub fn right_cutoff(ne: f64, b: f64) -> f64 {
    let wpe = plasma_frequency(ne);
    let wce = electron_cyclotron(b);
    0.5 * (wce + (wce * wce + 4.0 * wpe * wpe).sqrt())
}

/// X-mode left-hand cutoff ωL = (−ωce + sqrt(ωce² + 4ωpe²)) / 2.
pub fn left_cutoff(ne: f64, b: f64) -> f64 {
    let wpe = plasma_frequency(ne);
    let wce = electron_cyclotron(b);
    0.5 * (-wce + (wce * wce + 4.0 * wpe * wpe).sqrt())
}

/// N² = 1 − ωpe²/ω² for the ordinary mode.
pub fn o_mode_index_squared(ne: f64, omega: f64) -> f64 {
    let wpe = plasma_frequency(ne);
    1.0 - (wpe * wpe) / (omega * omega)
}

/// N² = 1 − (ωpe²/ω²)(ω² − ωpe²)/(ω² − ωuh²) for the extraordinary mode.
/// Diverges at the upper hybrid resonance.
pub fn x_mode_index_squared(ne: f64, b: f64, omega: f64) -> f64 {
    let wpe2 = plasma_frequency(ne).powi(2);
    let wuh2 = upper_hybrid_frequency(ne, b).powi(2);
    let w2 = omega * omega;
    1.0 - (wpe2 / w2) * (w2 - wpe2) / (w2 - wuh2)
}

/// Wavenumber k = N ω / c of a propagating wave, `None` where N² < 0.
pub fn wavenumber(index_squared: f64, omega: f64) -> Option<f64> {
    (index_squared >= 0.0).then(|| index_squared.sqrt() * omega / C_LIGHT)
}

/// Vacuum toroidal field B0·R0/R.
pub fn toroidal_field(b0: f64, r0: f64, r: f64) -> f64 {
    b0 * r0 / r
}

pub fn total_field(bt: f64, bp: f64) -> f64 {
    bt.hypot(bp)
}

/// Plasma beta 2μ0·p/B².
pub fn plasma_beta(pressure: f64, b: f64) -> f64 {
    2.0 * MU0_SI * pressure / (b * b)
}

/// Gaussian-unit forms, density in cm⁻³ and field in gauss.
pub mod cgs {
    use sdp_types::constants::cgs::{C_LIGHT, M_ELECTRON, Q_ELECTRON};
    use std::f64::consts::PI;

    /// ωpe = sqrt(4π ne e²/me).
    pub fn plasma_frequency(ne: f64) -> f64 {
        (4.0 * PI * ne * Q_ELECTRON * Q_ELECTRON / M_ELECTRON).sqrt()
    }

    /// ωce = eB/(me c).
    pub fn cyclotron_frequency(b: f64) -> f64 {
        Q_ELECTRON * b / (M_ELECTRON * C_LIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdp_types::constants::M_DEUTERIUM;
    use std::f64::consts::PI;

    const NE: f64 = 3e19;
    const B: f64 = 2.0;

    #[test]
    fn test_reference_frequencies() {
        // fpe ≈ 8.98 kHz · sqrt(ne[m^-3]); fce ≈ 28 GHz/T
        let fpe = plasma_frequency(1e20) / (2.0 * PI);
        assert!((fpe - 89.8e9).abs() / 89.8e9 < 1e-3, "fpe = {fpe}");
        let fce = cyclotron_frequency(1.0, Q_ELECTRON, M_ELECTRON) / (2.0 * PI);
        assert!((fce - 27.99e9).abs() / 27.99e9 < 1e-3, "fce = {fce}");
        // Deuterium ion cyclotron ≈ 7.6 MHz/T
        let fcd = cyclotron_frequency(1.0, Q_ELECTRON, M_DEUTERIUM) / (2.0 * PI);
        assert!((fcd - 7.62e6).abs() / 7.62e6 < 1e-2);
    }

    #[test]
    fn test_cutoff_ordering() {
        let wl = left_cutoff(NE, B);
        let wr = right_cutoff(NE, B);
        let wuh = upper_hybrid_frequency(NE, B);
        assert!(wl > 0.0);
        assert!(wl < wuh && wuh < wr);
        assert!((wr - wl - electron_cyclotron(B)).abs() / wr < 1e-12);
    }

    #[test]
    fn test_indices_vanish_at_cutoffs() {
        let wpe = plasma_frequency(NE);
        assert!(o_mode_index_squared(NE, wpe).abs() < 1e-12);
        assert!(x_mode_index_squared(NE, B, right_cutoff(NE, B)).abs() < 1e-9);
        assert!(x_mode_index_squared(NE, B, left_cutoff(NE, B)).abs() < 1e-9);
        // Far above every cutoff the plasma is nearly transparent
        let w = 100.0 * right_cutoff(NE, B);
        assert!((x_mode_index_squared(NE, B, w) - 1.0).abs() < 1e-3);
        assert!(wavenumber(o_mode_index_squared(NE, 0.5 * wpe), 0.5 * wpe).is_none());
    }

    #[test]
    fn test_field_formulas() {
        assert!((toroidal_field(2.0, 1.67, 1.67) - 2.0).abs() < 1e-15);
        assert!((toroidal_field(2.0, 1.67, 2.34) - 2.0 * 1.67 / 2.34).abs() < 1e-15);
        assert_eq!(total_field(3.0, 4.0), 5.0);
        let beta = plasma_beta(1e5, 2.0);
        assert!((beta - 2.0 * MU0_SI * 1e5 / 4.0).abs() < 1e-15);
    }

    #[test]
    fn test_cgs_matches_si() {
        let si = plasma_frequency(NE);
        let gauss = cgs::plasma_frequency(NE * 1e-6);
        assert!((si - gauss).abs() / si < 1e-6);
        let si = electron_cyclotron(B);
        let gauss = cgs::cyclotron_frequency(B * 1e4);
        assert!((si - gauss).abs() / si < 1e-6);
    }
}
