// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Fluctuations
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Electrostatic potential fluctuations in flux coordinates.
//!
//! Two sources: potential snapshots written by the turbulence code (one
//! NPZ per time step), and an analytic drift-wave spectrum for synthetic
//! runs.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fs::File;
use std::path::Path;

use ndarray::{Array1, Array2, Array3, Dimension, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use sdp_math::interp::{interp3d, GridAxis};
use sdp_types::config::MapperConfig;
use sdp_types::error::{SdpError, SdpResult};
use sdp_types::state::FluxCoordinates;
use tracing::debug;

const TWO_PI: f64 = 2.0 * PI;

/// Potential φ [V] as a function of time step and flux coordinates.
pub trait FluctuationSource {
    /// `None` when `(a, θ, ζ)` or the time step lies outside the data.
    fn potential(&self, timestep: i64, a: f64, theta: f64, zeta: f64) -> Option<f64>;
}

/// Potential at every point and time step.
///
/// Returns `phi` of shape (NT, n) and one flag per point that is true only
/// when every time step had data there. Points without data carry φ = 0.
pub fn get_fluctuations<S: FluctuationSource + ?Sized>(
    source: &S,
    coords: &FluxCoordinates,
    zeta: &[f64],
    timesteps: &[i64],
) -> SdpResult<(Array2<f64>, Vec<bool>)> {
    let n = coords.len();
    SdpError::check_shape("zeta", &[n], &[zeta.len()])?;

    let mut phi = Array2::zeros((timesteps.len(), n));
    let mut flags = vec![true; n];
    for (it, &t) in timesteps.iter().enumerate() {
        for i in 0..n {
            match source.potential(t, coords.a[i], coords.theta[i], zeta[i]) {
                Some(v) => phi[[it, i]] = v,
                None => flags[i] = false,
            }
        }
    }
    // A point missing in any step is dropped from every step
    for (i, &covered) in flags.iter().enumerate() {
        if !covered {
            phi.column_mut(i).fill(0.0);
        }
    }
    debug!(
        points = n,
        steps = timesteps.len(),
        covered = flags.iter().filter(|&&f| f).count(),
        "fluctuations retrieved"
    );
    Ok((phi, flags))
}

// ── Potential snapshots ──────────────────────────────────────────────

/// φ on a (ζ, θ, a) grid for one time step. θ and ζ are periodic and
/// uniform over [0, 2π).
#[derive(Debug, Clone)]
pub struct PhiSnapshot {
    a: GridAxis,
    theta: GridAxis,
    zeta: GridAxis,
    phi: Array3<f64>, // [n_zeta, n_theta, n_a]
}

fn check_uniform_angle(name: &str, values: &Array1<f64>) -> SdpResult<()> {
    let n = values.len();
    if n == 0 {
        return Err(SdpError::DataFormat(format!("{name} axis is empty")));
    }
    let step = TWO_PI / n as f64;
    for (i, &v) in values.iter().enumerate() {
        if (v - values[0] - step * i as f64).abs() > 1e-6 * TWO_PI {
            return Err(SdpError::DataFormat(format!(
                "{name} must be uniform on [0, 2π) with {n} points"
            )));
        }
    }
    Ok(())
}

impl PhiSnapshot {
    pub fn new(a: Vec<f64>, theta_start: f64, zeta_start: f64, phi: Array3<f64>) -> SdpResult<Self> {
        let (nz, nt, na) = phi.dim();
        SdpError::check_shape("phi", &[nz, nt, a.len()], &[nz, nt, na])?;
        Ok(PhiSnapshot {
            a: GridAxis::bounded(a)?,
            theta: GridAxis::periodic(theta_start, TWO_PI, nt)?,
            zeta: GridAxis::periodic(zeta_start, TWO_PI, nz)?,
            phi,
        })
    }

    /// Read arrays `a`, `theta`, `zeta` and `phi` from an NPZ archive.
    pub fn from_npz(path: &Path) -> SdpResult<Self> {
        let file = File::open(path)?;
        let name = path.display();
        let mut npz = NpzReader::new(file)
            .map_err(|e| SdpError::DataFormat(format!("Failed to open npz '{name}': {e}")))?;
        let a: Array1<f64> = read_array(&mut npz, "a")?;
        let theta: Array1<f64> = read_array(&mut npz, "theta")?;
        let zeta: Array1<f64> = read_array(&mut npz, "zeta")?;
        let phi: Array3<f64> = read_array(&mut npz, "phi")?;
        check_uniform_angle("theta", &theta)?;
        check_uniform_angle("zeta", &zeta)?;
        SdpError::check_shape("phi", &[zeta.len(), theta.len(), a.len()], phi.shape())?;
        Self::new(a.to_vec(), theta[0], zeta[0], phi)
    }

    pub fn write_npz(&self, path: &Path) -> SdpResult<()> {
        let file = File::create(path)?;
        let mut npz = NpzWriter::new(file);
        let write_err = |e: ndarray_npy::WriteNpzError| {
            SdpError::DataFormat(format!("Failed to write '{}': {e}", path.display()))
        };
        npz.add_array("a", &Array1::from(self.a.points().to_vec())).map_err(write_err)?;
        npz.add_array("theta", &Array1::from(self.theta.points().to_vec())).map_err(write_err)?;
        npz.add_array("zeta", &Array1::from(self.zeta.points().to_vec())).map_err(write_err)?;
        npz.add_array("phi", &self.phi).map_err(write_err)?;
        npz.finish().map_err(write_err)?;
        Ok(())
    }

    /// Trilinear φ at `(a, θ, ζ)`, `None` off the radial range.
    pub fn sample(&self, a: f64, theta: f64, zeta: f64) -> Option<f64> {
        interp3d(&self.phi, [&self.zeta, &self.theta, &self.a], [zeta, theta, a])
    }
}

fn read_array<D: Dimension>(
    npz: &mut NpzReader<File>,
    key: &str,
) -> SdpResult<ndarray::ArrayBase<OwnedRepr<f64>, D>> {
    npz.by_name::<OwnedRepr<f64>, D>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<f64>, D>(key))
        .map_err(|e| SdpError::DataFormat(format!("Failed to read {key} from npz: {e}")))
}

/// Potential snapshots for a fixed set of time steps.
#[derive(Debug, Clone, Default)]
pub struct PhiFileSource {
    snapshots: BTreeMap<i64, PhiSnapshot>,
}

impl PhiFileSource {
    /// Load `{PHIDataDir}{PHIFileNameStart}{t:05}.npz` for every configured
    /// time step.
    pub fn load(config: &MapperConfig) -> SdpResult<Self> {
        let mut source = PhiFileSource::default();
        for t in config.timesteps() {
            let path = config.phi_file(t);
            let snapshot = PhiSnapshot::from_npz(&path).map_err(|e| match e {
                SdpError::Io(io) => SdpError::Io(std::io::Error::new(
                    io.kind(),
                    format!("time step {t}: {}: {io}", path.display()),
                )),
                SdpError::DataFormat(msg) => SdpError::DataFormat(format!("time step {t}: {msg}")),
                other => other,
            })?;
            source.insert(t, snapshot);
        }
        debug!(steps = source.len(), dir = %config.phi_data_dir, "potential snapshots loaded");
        Ok(source)
    }

    pub fn insert(&mut self, timestep: i64, snapshot: PhiSnapshot) {
        self.snapshots.insert(timestep, snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl FluctuationSource for PhiFileSource {
    fn potential(&self, timestep: i64, a: f64, theta: f64, zeta: f64) -> Option<f64> {
        self.snapshots.get(&timestep)?.sample(a, theta, zeta)
    }
}

// ── Analytic drift-wave spectrum ─────────────────────────────────────

/// One (m, n) Fourier mode of the potential.
#[derive(Debug, Clone, Copy)]
pub struct DriftWaveMode {
    pub m: i32,
    pub n: i32,
    pub amplitude: f64, // [V]
    pub phase: f64,
    pub frequency: f64, // [rad per time step]
}

#[derive(Debug, Clone, Copy)]
pub struct SpectrumParams {
    pub n_modes: usize,
    pub m_max: i32,
    pub n_max: i32,
    /// RMS potential at the envelope peak [V].
    pub phi_rms: f64,
    pub envelope_center: f64,
    pub envelope_width: f64,
    pub max_frequency: f64,
    pub seed: u64,
}

impl Default for SpectrumParams {
    fn default() -> Self {
        SpectrumParams {
            n_modes: 32,
            m_max: 40,
            n_max: 12,
            phi_rms: 10.0,
            envelope_center: 0.7,
            envelope_width: 0.2,
            max_frequency: 0.05,
            seed: 1,
        }
    }
}

/// φ(t, a, θ, ζ) = E(a) Σ A_k cos(m_k θ − n_k ζ − ω_k t + φ_k), with a
/// Gaussian envelope E(a) = exp(−(a − a_c)²/w²). Defined for a ∈ [0, 1].
#[derive(Debug, Clone)]
pub struct DriftWaveSpectrum {
    modes: Vec<DriftWaveMode>,
    envelope_center: f64,
    envelope_width: f64,
}

impl DriftWaveSpectrum {
    pub fn new(params: SpectrumParams) -> SdpResult<Self> {
        if params.n_modes == 0 || params.m_max < 1 || params.n_max < 0 {
            return Err(SdpError::ConfigError(format!(
                "spectrum needs modes: n_modes={}, m_max={}, n_max={}",
                params.n_modes, params.m_max, params.n_max
            )));
        }
        if !(params.envelope_width > 0.0 && params.phi_rms >= 0.0 && params.max_frequency >= 0.0) {
            return Err(SdpError::ConfigError(
                "envelope width must be positive, phi_rms and max_frequency non-negative".into(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut modes: Vec<DriftWaveMode> = (0..params.n_modes)
            .map(|_| DriftWaveMode {
                m: rng.gen_range(1..=params.m_max),
                n: rng.gen_range(0..=params.n_max),
                amplitude: rng.sample::<f64, _>(StandardNormal),
                phase: rng.gen_range(0.0..TWO_PI),
                frequency: rng.gen_range(-params.max_frequency..=params.max_frequency),
            })
            .collect();

        // Mean square of Σ A cos(..) is Σ A²/2
        let ms: f64 = modes.iter().map(|m| 0.5 * m.amplitude * m.amplitude).sum();
        let scale = if ms > 0.0 { params.phi_rms / ms.sqrt() } else { 0.0 };
        for mode in &mut modes {
            mode.amplitude *= scale;
        }

        Ok(DriftWaveSpectrum {
            modes,
            envelope_center: params.envelope_center,
            envelope_width: params.envelope_width,
        })
    }

    pub fn modes(&self) -> &[DriftWaveMode] {
        &self.modes
    }

    pub fn envelope(&self, a: f64) -> f64 {
        let x = (a - self.envelope_center) / self.envelope_width;
        (-x * x).exp()
    }
}

impl FluctuationSource for DriftWaveSpectrum {
    fn potential(&self, timestep: i64, a: f64, theta: f64, zeta: f64) -> Option<f64> {
        if !(0.0..=1.0).contains(&a) {
            return None;
        }
        let t = timestep as f64;
        let sum: f64 = self
            .modes
            .iter()
            .map(|k| {
                let arg = k.m as f64 * theta - k.n as f64 * zeta - k.frequency * t + k.phase;
                k.amplitude * arg.cos()
            })
            .sum();
        Some(self.envelope(a) * sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(offset: f64) -> PhiSnapshot {
        let a: Vec<f64> = (0..11).map(|i| i as f64 / 10.0).collect();
        // φ = offset + 2a, uniform in both angles
        let phi = Array3::from_shape_fn((4, 8, 11), |(_, _, i)| offset + 2.0 * a[i]);
        PhiSnapshot::new(a, 0.0, 0.0, phi).unwrap()
    }

    #[test]
    fn test_snapshot_sampling() {
        let snap = snapshot(1.0);
        assert!((snap.sample(0.45, 3.0, 6.1).unwrap() - 1.9).abs() < 1e-12);
        assert!(snap.sample(1.2, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_get_fluctuations_flags() {
        let mut source = PhiFileSource::default();
        source.insert(100, snapshot(0.0));
        source.insert(110, snapshot(1.0));
        let mut coords = FluxCoordinates::with_len(3);
        coords.a = vec![0.5, 1.5, 0.25];
        let zeta = vec![0.0, 0.0, 1.0];

        let (phi, flags) = get_fluctuations(&source, &coords, &zeta, &[100, 110]).unwrap();
        assert_eq!(phi.dim(), (2, 3));
        assert_eq!(flags, vec![true, false, true]);
        assert!((phi[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((phi[[1, 0]] - 2.0).abs() < 1e-12);
        assert_eq!(phi[[1, 1]], 0.0);

        // A step without a snapshot removes every point
        let (phi, flags) = get_fluctuations(&source, &coords, &zeta, &[100, 120]).unwrap();
        assert!(flags.iter().all(|&f| !f));
        assert!(phi.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_get_fluctuations_zeta_length() {
        let coords = FluxCoordinates::with_len(3);
        let err = get_fluctuations(&PhiFileSource::default(), &coords, &[0.0], &[1]).unwrap_err();
        assert!(matches!(err, SdpError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_snapshot_npz_roundtrip() {
        let path = std::env::temp_dir().join(format!("sdp_phi_snapshot_{}.npz", std::process::id()));
        let snap = snapshot(0.5);
        snap.write_npz(&path).unwrap();
        let loaded = PhiSnapshot::from_npz(&path).unwrap();
        assert!((loaded.sample(0.3, 1.0, 2.0).unwrap() - 1.1).abs() < 1e-12);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_file_names_timestep() {
        let mut cfg = MapperConfig::default();
        cfg.phi_data_dir = "/nonexistent/sdp/".into();
        cfg.nt = 1;
        let err = PhiFileSource::load(&cfg).unwrap_err();
        assert!(matches!(err, SdpError::Io(_)));
        assert!(err.to_string().contains("time step 100"), "{err}");
    }

    #[test]
    fn test_spectrum_seeded_and_bounded() {
        let s1 = DriftWaveSpectrum::new(SpectrumParams::default()).unwrap();
        let s2 = DriftWaveSpectrum::new(SpectrumParams::default()).unwrap();
        let v1 = s1.potential(100, 0.7, 1.0, 2.0).unwrap();
        assert_eq!(v1, s2.potential(100, 0.7, 1.0, 2.0).unwrap());
        assert!(s1.potential(100, 1.01, 0.0, 0.0).is_none());

        let rms_amp: f64 = s1.modes().iter().map(|m| 0.5 * m.amplitude.powi(2)).sum::<f64>().sqrt();
        assert!((rms_amp - 10.0).abs() < 1e-9);
        let bound: f64 = s1.modes().iter().map(|m| m.amplitude.abs()).sum();
        assert!(v1.abs() <= bound);
        // Envelope suppresses the axis
        assert!(s1.envelope(0.0) < 1e-5);
    }

    #[test]
    fn test_spectrum_periodic_in_angles() {
        let s = DriftWaveSpectrum::new(SpectrumParams { seed: 7, ..Default::default() }).unwrap();
        let v = s.potential(3, 0.6, 0.4, 1.3).unwrap();
        let w = s.potential(3, 0.6, 0.4 + TWO_PI, 1.3 - TWO_PI).unwrap();
        assert!((v - w).abs() < 1e-9);
    }
}
