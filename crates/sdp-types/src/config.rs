// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mapper parameter store.
//!
//! Grid extents, time window, file locations and solver knobs used by the
//! GTS profile mapper. Keys are the keyword names accepted by the Python
//! setter (`Xmin`, `NX`, `PHIDataDir`, ...) and are also the JSON field names.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{SdpError, SdpResult};
use crate::state::Grid3D;

/// Every keyword understood by [`MapperConfig::set_parameter`], in display order.
pub const PARAMETER_KEYS: [&str; 23] = [
    "Xmin",
    "Xmax",
    "NX",
    "Ymin",
    "Ymax",
    "NY",
    "Zmin",
    "Zmax",
    "NZ",
    "TStart",
    "TStep",
    "NT",
    "NBOUNDARY",
    "Fluc_Amplification",
    "FlucFilePath",
    "EqFileName",
    "NTFileName",
    "PHIFileNameStart",
    "PHIDataDir",
    "DecayLength",
    "FlucFiltering",
    "FluxTolerance",
    "FluxMaxIter",
];

/// A single keyword value as handed in by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Str(String),
    Bool(bool),
}

impl ParamValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Float(_) => "float",
            ParamValue::Int(_) => "int",
            ParamValue::Str(_) => "string",
            ParamValue::Bool(_) => "bool",
        }
    }

    fn mismatch(&self, key: &str, expected: &'static str) -> SdpError {
        SdpError::ParameterType {
            key: key.to_string(),
            expected,
            found: self.kind(),
        }
    }

    /// Float keywords also accept ints.
    fn as_float(&self, key: &str) -> SdpResult<f64> {
        match *self {
            ParamValue::Float(v) => Ok(v),
            ParamValue::Int(v) => Ok(v as f64),
            _ => Err(self.mismatch(key, "float")),
        }
    }

    fn as_int(&self, key: &str) -> SdpResult<i64> {
        match *self {
            ParamValue::Int(v) => Ok(v),
            _ => Err(self.mismatch(key, "int")),
        }
    }

    fn as_count(&self, key: &str) -> SdpResult<usize> {
        let v = self.as_int(key)?;
        usize::try_from(v)
            .map_err(|_| SdpError::ConfigError(format!("{key} must be non-negative, got {v}")))
    }

    fn as_str(&self, key: &str) -> SdpResult<String> {
        match self {
            ParamValue::Str(s) => Ok(s.clone()),
            _ => Err(self.mismatch(key, "string")),
        }
    }

    fn as_bool(&self, key: &str) -> SdpResult<bool> {
        match *self {
            ParamValue::Bool(b) => Ok(b),
            _ => Err(self.mismatch(key, "bool")),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

/// Process configuration for the GTS profile mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    #[serde(rename = "Xmin")]
    pub x_min: f64,
    #[serde(rename = "Xmax")]
    pub x_max: f64,
    #[serde(rename = "NX")]
    pub nx: usize,
    #[serde(rename = "Ymin")]
    pub y_min: f64,
    #[serde(rename = "Ymax")]
    pub y_max: f64,
    #[serde(rename = "NY")]
    pub ny: usize,
    #[serde(rename = "Zmin")]
    pub z_min: f64,
    #[serde(rename = "Zmax")]
    pub z_max: f64,
    #[serde(rename = "NZ")]
    pub nz: usize,
    #[serde(rename = "TStart")]
    pub t_start: i64,
    #[serde(rename = "TStep")]
    pub t_step: i64,
    #[serde(rename = "NT")]
    pub nt: usize,
    /// Number of points sampled on the LCFS for inside/outside tests.
    #[serde(rename = "NBOUNDARY")]
    pub n_boundary: usize,
    #[serde(rename = "Fluc_Amplification")]
    pub fluc_amplification: f64,
    /// Output directory for mapped results.
    #[serde(rename = "FlucFilePath")]
    pub fluc_file_path: String,
    #[serde(rename = "EqFileName")]
    pub eq_file_name: String,
    #[serde(rename = "NTFileName")]
    pub nt_file_name: String,
    #[serde(rename = "PHIFileNameStart")]
    pub phi_file_name_start: String,
    #[serde(rename = "PHIDataDir")]
    pub phi_data_dir: String,
    /// e-folding length, in units of `a`, of the equilibrium outside the LCFS.
    #[serde(rename = "DecayLength")]
    pub decay_length: f64,
    /// Zero density fluctuations larger than the local equilibrium density.
    #[serde(rename = "FlucFiltering")]
    pub fluc_filtering: bool,
    /// Newton residual tolerance [m] for the flux-coordinate solve.
    #[serde(rename = "FluxTolerance")]
    pub flux_tolerance: f64,
    #[serde(rename = "FluxMaxIter")]
    pub flux_max_iter: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            x_min: 2.0,
            x_max: 2.6,
            nx: 101,
            y_min: -0.6,
            y_max: 0.6,
            ny: 201,
            z_min: 0.0,
            z_max: 0.0,
            nz: 1,
            t_start: 100,
            t_step: 10,
            nt: 10,
            n_boundary: 1001,
            fluc_amplification: 50.0,
            fluc_file_path: "./Fluctuations/".to_string(),
            eq_file_name: "./ESI_EQFILE".to_string(),
            nt_file_name: "./NTProfiles.cdf".to_string(),
            phi_file_name_start: "PHI.".to_string(),
            phi_data_dir: "./PHI_FILES/".to_string(),
            decay_length: 0.05,
            fluc_filtering: false,
            flux_tolerance: 1e-10,
            flux_max_iter: 50,
        }
    }
}

impl MapperConfig {
    /// Set one keyword. Unknown keys and wrongly typed values fail without
    /// touching the store.
    pub fn set_parameter(&mut self, key: &str, value: impl Into<ParamValue>) -> SdpResult<()> {
        let value = value.into();
        match key {
            "Xmin" => self.x_min = value.as_float(key)?,
            "Xmax" => self.x_max = value.as_float(key)?,
            "NX" => self.nx = value.as_count(key)?,
            "Ymin" => self.y_min = value.as_float(key)?,
            "Ymax" => self.y_max = value.as_float(key)?,
            "NY" => self.ny = value.as_count(key)?,
            "Zmin" => self.z_min = value.as_float(key)?,
            "Zmax" => self.z_max = value.as_float(key)?,
            "NZ" => self.nz = value.as_count(key)?,
            "TStart" => self.t_start = value.as_int(key)?,
            "TStep" => self.t_step = value.as_int(key)?,
            "NT" => self.nt = value.as_count(key)?,
            "NBOUNDARY" => self.n_boundary = value.as_count(key)?,
            "Fluc_Amplification" => self.fluc_amplification = value.as_float(key)?,
            "FlucFilePath" => self.fluc_file_path = value.as_str(key)?,
            "EqFileName" => self.eq_file_name = value.as_str(key)?,
            "NTFileName" => self.nt_file_name = value.as_str(key)?,
            "PHIFileNameStart" => self.phi_file_name_start = value.as_str(key)?,
            "PHIDataDir" => self.phi_data_dir = value.as_str(key)?,
            "DecayLength" => self.decay_length = value.as_float(key)?,
            "FlucFiltering" => self.fluc_filtering = value.as_bool(key)?,
            "FluxTolerance" => self.flux_tolerance = value.as_float(key)?,
            "FluxMaxIter" => self.flux_max_iter = value.as_count(key)?,
            _ => return Err(SdpError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    /// Apply a batch of keywords. Either all of them land or none does.
    pub fn set_parameters<K, V, I>(&mut self, params: I) -> SdpResult<()>
    where
        K: AsRef<str>,
        V: Into<ParamValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut staged = self.clone();
        for (key, value) in params {
            staged.set_parameter(key.as_ref(), value)?;
        }
        *self = staged;
        Ok(())
    }

    pub fn get_parameter(&self, key: &str) -> SdpResult<ParamValue> {
        let value = match key {
            "Xmin" => ParamValue::Float(self.x_min),
            "Xmax" => ParamValue::Float(self.x_max),
            "NX" => ParamValue::Int(self.nx as i64),
            "Ymin" => ParamValue::Float(self.y_min),
            "Ymax" => ParamValue::Float(self.y_max),
            "NY" => ParamValue::Int(self.ny as i64),
            "Zmin" => ParamValue::Float(self.z_min),
            "Zmax" => ParamValue::Float(self.z_max),
            "NZ" => ParamValue::Int(self.nz as i64),
            "TStart" => ParamValue::Int(self.t_start),
            "TStep" => ParamValue::Int(self.t_step),
            "NT" => ParamValue::Int(self.nt as i64),
            "NBOUNDARY" => ParamValue::Int(self.n_boundary as i64),
            "Fluc_Amplification" => ParamValue::Float(self.fluc_amplification),
            "FlucFilePath" => ParamValue::Str(self.fluc_file_path.clone()),
            "EqFileName" => ParamValue::Str(self.eq_file_name.clone()),
            "NTFileName" => ParamValue::Str(self.nt_file_name.clone()),
            "PHIFileNameStart" => ParamValue::Str(self.phi_file_name_start.clone()),
            "PHIDataDir" => ParamValue::Str(self.phi_data_dir.clone()),
            "DecayLength" => ParamValue::Float(self.decay_length),
            "FlucFiltering" => ParamValue::Bool(self.fluc_filtering),
            "FluxTolerance" => ParamValue::Float(self.flux_tolerance),
            "FluxMaxIter" => ParamValue::Int(self.flux_max_iter as i64),
            _ => return Err(SdpError::UnknownParameter(key.to_string())),
        };
        Ok(value)
    }

    /// All keywords with their current values, in display order.
    pub fn parameters(&self) -> Vec<(&'static str, ParamValue)> {
        PARAMETER_KEYS
            .iter()
            .filter_map(|&key| self.get_parameter(key).ok().map(|v| (key, v)))
            .collect()
    }

    pub fn validate(&self) -> SdpResult<()> {
        for (name, n) in [("NX", self.nx), ("NY", self.ny), ("NZ", self.nz), ("NT", self.nt)] {
            if n == 0 {
                return Err(SdpError::ConfigError(format!("{name} must be >= 1")));
            }
        }
        if self.n_boundary < 3 {
            return Err(SdpError::ConfigError(format!(
                "NBOUNDARY must be >= 3, got {}",
                self.n_boundary
            )));
        }
        for (axis, lo, hi) in [
            ("X", self.x_min, self.x_max),
            ("Y", self.y_min, self.y_max),
            ("Z", self.z_min, self.z_max),
        ] {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(SdpError::ConfigError(format!(
                    "{axis} extent invalid: min={lo}, max={hi}"
                )));
            }
        }
        if self.nt > 1 && self.t_step == 0 {
            return Err(SdpError::ConfigError(
                "TStep must be non-zero when NT > 1".into(),
            ));
        }
        if !self.fluc_amplification.is_finite() {
            return Err(SdpError::ConfigError(
                "Fluc_Amplification must be finite".into(),
            ));
        }
        if !(self.decay_length.is_finite() && self.decay_length > 0.0) {
            return Err(SdpError::ConfigError(format!(
                "DecayLength must be positive, got {}",
                self.decay_length
            )));
        }
        if !(self.flux_tolerance.is_finite() && self.flux_tolerance > 0.0) || self.flux_max_iter == 0
        {
            return Err(SdpError::ConfigError(
                "FluxTolerance must be positive and FluxMaxIter >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Mesh every caller-supplied array has to conform to.
    pub fn grid(&self) -> SdpResult<Grid3D> {
        self.validate()?;
        Grid3D::new(
            (self.x_min, self.x_max, self.nx),
            (self.y_min, self.y_max, self.ny),
            (self.z_min, self.z_max, self.nz),
        )
    }

    /// Simulation time steps: TStart + TStep * i, i in 0..NT.
    pub fn timesteps(&self) -> Vec<i64> {
        (0..self.nt as i64)
            .map(|i| self.t_start + self.t_step * i)
            .collect()
    }

    /// Expected shape (NT, NZ, NY, NX) of the density array.
    pub fn density_shape(&self) -> [usize; 4] {
        [self.nt, self.nz, self.ny, self.nx]
    }

    /// Location of the potential snapshot for one time step.
    pub fn phi_file(&self, timestep: i64) -> PathBuf {
        PathBuf::from(&self.phi_data_dir)
            .join(format!("{}{:05}.npz", self.phi_file_name_start, timestep))
    }

    pub fn from_file(path: &str) -> SdpResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> SdpResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl fmt::Display for MapperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parameters set as following:")?;
        writeln!(
            f,
            "X: (Xmin={:.6},Xmax={:.6},NX={})",
            self.x_min, self.x_max, self.nx
        )?;
        writeln!(
            f,
            "Y: (Ymin={:.6},Ymax={:.6},NY={})",
            self.y_min, self.y_max, self.ny
        )?;
        writeln!(
            f,
            "Z: (Zmin={:.6},Zmax={:.6},NZ={})",
            self.z_min, self.z_max, self.nz
        )?;
        writeln!(f, "NBOUNDARY: {}", self.n_boundary)?;
        writeln!(
            f,
            "T: (T0={},dT={},NT={})",
            self.t_start, self.t_step, self.nt
        )?;
        writeln!(f, "Fluc_Amplification: {:.6}", self.fluc_amplification)?;
        writeln!(f, "FlucFilePath: {} ", self.fluc_file_path)?;
        writeln!(f, "EqFileName: {} ", self.eq_file_name)?;
        writeln!(f, "NTFileName: {} ", self.nt_file_name)?;
        writeln!(f, "PHIFileNameStart: {} ", self.phi_file_name_start)?;
        writeln!(f, "PHIDataDir: {} ", self.phi_data_dir)?;
        writeln!(
            f,
            "DecayLength: {:.6}, FlucFiltering: {}",
            self.decay_length, self.fluc_filtering
        )?;
        write!(
            f,
            "FluxTolerance: {:e}, FluxMaxIter: {}",
            self.flux_tolerance, self.flux_max_iter
        )
    }
}
