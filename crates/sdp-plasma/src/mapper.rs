// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — GTS Profile Mapper
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Map GTS equilibrium and fluctuation profiles onto a Cartesian mesh.
//!
//! Fixed pipeline, per mesh point:
//! cartesian → cylindrical → flux coordinates → profiles → decay outside
//! the LCFS → potential per time step → adiabatic response → amplified
//! fluctuation superposed on ne0.

use std::fs::{self, File};
use std::path::Path;

use ndarray::{Array3, Array4, ArrayView3, ArrayViewMut3, ArrayViewMut4, Axis};
use ndarray_npy::{NpzWriter, WriteNpzError};
use sdp_math::coords::mesh_to_cylindrical;
use sdp_types::config::MapperConfig;
use sdp_types::error::{SdpError, SdpResult};
use tracing::{debug, info};

use crate::equilibrium::{flux_coordinates, read_equilibrium, Equilibrium};
use crate::fluctuations::{get_fluctuations, FluctuationSource, PhiFileSource};
use crate::profiles::{decay_outside_lcfs, evaluate_profiles, FluxProfiles};
use crate::response::{adiabatic_electron_response, amplify_and_superpose};

/// Mapped quantities on a (NZ, NY, NX) mesh; `ne` carries a leading time
/// axis.
#[derive(Debug, Clone)]
pub struct MappedProfiles {
    pub ne: Array4<f64>, // [NT, NZ, NY, NX] total density [m^-3]
    pub ne0: Array3<f64>,
    pub te: Array3<f64>, // [eV]
    pub ti: Array3<f64>, // [eV]
    pub b: Array3<f64>,  // |B| [T]
    pub a: Array3<f64>,
    pub theta: Array3<f64>,
    pub inside_lcfs: Array3<bool>,
}

impl MappedProfiles {
    /// Write `equilibrium.npz` and one `fluctuation{t:05}.npz` per time step
    /// into `dir`.
    pub fn write_npz(&self, dir: &str, timesteps: &[i64]) -> SdpResult<()> {
        SdpError::check_shape("timesteps", &[self.ne.len_of(Axis(0))], &[timesteps.len()])?;
        fs::create_dir_all(dir)?;
        let dir = Path::new(dir);

        let path = dir.join("equilibrium.npz");
        let npz_err = |e: WriteNpzError| SdpError::DataFormat(format!("Failed to write npz: {e}"));
        let mut npz = NpzWriter::new(File::create(&path)?);
        npz.add_array("ne0", &self.ne0).map_err(npz_err)?;
        npz.add_array("te", &self.te).map_err(npz_err)?;
        npz.add_array("ti", &self.ti).map_err(npz_err)?;
        npz.add_array("b", &self.b).map_err(npz_err)?;
        npz.add_array("a", &self.a).map_err(npz_err)?;
        npz.add_array("theta", &self.theta).map_err(npz_err)?;
        npz.add_array("inside_lcfs", &self.inside_lcfs).map_err(npz_err)?;
        npz.finish().map_err(npz_err)?;

        for (ne, t) in self.ne.axis_iter(Axis(0)).zip(timesteps) {
            let mut npz = NpzWriter::new(File::create(dir.join(format!("fluctuation{t:05}.npz")))?);
            npz.add_array("ne", &ne).map_err(npz_err)?;
            npz.finish().map_err(npz_err)?;
        }
        debug!(dir = %dir.display(), steps = timesteps.len(), "mapped profiles written");
        Ok(())
    }
}

fn to_array3<T>(name: &str, shape: [usize; 3], values: Vec<T>) -> SdpResult<Array3<T>> {
    Array3::from_shape_vec(shape, values)
        .map_err(|e| SdpError::GridError(format!("cannot shape {name} to {shape:?}: {e}")))
}

/// Check the six arrays of a mapping call against the configured grid:
/// mesh `x`, `y`, `z` and outputs `te`, `b` are (NZ, NY, NX), `ne` is
/// (NT, NZ, NY, NX). Touches no input file.
pub fn check_shapes(
    config: &MapperConfig,
    x: &[usize],
    y: &[usize],
    z: &[usize],
    ne: &[usize],
    te: &[usize],
    b: &[usize],
) -> SdpResult<()> {
    let grid = config.grid()?.shape();
    SdpError::check_shape("x", &grid, x)?;
    SdpError::check_shape("y", &grid, y)?;
    SdpError::check_shape("z", &grid, z)?;
    SdpError::check_shape("ne", &config.density_shape(), ne)?;
    SdpError::check_shape("Te", &grid, te)?;
    SdpError::check_shape("B", &grid, b)
}

/// The GTS profile mapper: an equilibrium, radial profiles and a
/// fluctuation source, driven by a `MapperConfig`.
pub struct GtsMapper {
    config: MapperConfig,
    equilibrium: Box<dyn Equilibrium>,
    profiles: FluxProfiles,
    source: Box<dyn FluctuationSource>,
}

impl GtsMapper {
    pub fn new(
        config: MapperConfig,
        equilibrium: impl Equilibrium + 'static,
        profiles: FluxProfiles,
        source: impl FluctuationSource + 'static,
    ) -> SdpResult<Self> {
        config.validate()?;
        Ok(GtsMapper {
            config,
            equilibrium: Box::new(equilibrium),
            profiles,
            source: Box::new(source),
        })
    }

    /// Read the equilibrium (`EqFileName`), the NT profiles (`NTFileName`)
    /// and the potential snapshots of every configured time step.
    pub fn from_config(config: &MapperConfig) -> SdpResult<Self> {
        config.validate()?;
        let (b0, r0, equilibrium) = read_equilibrium(&config.eq_file_name)?;
        debug!(b0, r0, "equilibrium initialised");
        let profiles = FluxProfiles::from_npz(&config.nt_file_name)?;
        let source = PhiFileSource::load(config)?;
        Self::new(config.clone(), equilibrium, profiles, source)
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn equilibrium(&self) -> &dyn Equilibrium {
        self.equilibrium.as_ref()
    }

    /// Map onto the mesh described by the configuration.
    pub fn map_grid(&self) -> SdpResult<MappedProfiles> {
        let grid = self.config.grid()?;
        let (x3d, y3d, z3d) = grid.meshes();
        self.map_points(x3d.view(), y3d.view(), z3d.view())
    }

    /// Map onto caller-supplied mesh coordinates of any common 3D shape.
    pub fn map_points(
        &self,
        x: ArrayView3<'_, f64>,
        y: ArrayView3<'_, f64>,
        z: ArrayView3<'_, f64>,
    ) -> SdpResult<MappedProfiles> {
        let cfg = &self.config;
        let (s0, s1, s2) = x.dim();
        let shape = [s0, s1, s2];

        let cyl = mesh_to_cylindrical(x, y, z)?;
        debug!(points = cyl.len(), "mesh converted to cylindrical");

        let eq = self.equilibrium.as_ref();
        let (r_axis, z_axis) = eq.magnetic_axis();
        debug!(r_axis, z_axis, "magnetic axis");

        let coords = flux_coordinates(
            eq,
            &cyl.r,
            &cyl.z,
            cfg.n_boundary,
            cfg.flux_tolerance,
            cfg.flux_max_iter,
        )?;

        let mut set = evaluate_profiles(eq, &self.profiles, &coords)?;
        decay_outside_lcfs(&coords, &mut set, self.profiles.edge(), cfg.decay_length)?;

        let timesteps = cfg.timesteps();
        let (phi, flags) = get_fluctuations(self.source.as_ref(), &coords, &cyl.phi, &timesteps)?;

        let mut ne = adiabatic_electron_response(&set.ne0, phi.view(), &set.te, &flags, cfg.fluc_filtering)?;
        debug!("adiabatic response computed");
        amplify_and_superpose(&mut ne, &set.ne0, cfg.fluc_amplification)?;

        let ne = ne
            .into_shape_with_order((timesteps.len(), s0, s1, s2))
            .map_err(|e| SdpError::GridError(format!("cannot shape ne: {e}")))?;

        let inside = coords.inside_lcfs.iter().filter(|&&f| f).count();
        let unconverged = coords.converged.iter().filter(|&&c| !c).count();
        info!(
            points = coords.len(),
            inside,
            unconverged,
            steps = timesteps.len(),
            amplification = cfg.fluc_amplification,
            "GTS profiles mapped"
        );

        Ok(MappedProfiles {
            ne,
            ne0: to_array3("ne0", shape, set.ne0)?,
            te: to_array3("Te", shape, set.te)?,
            ti: to_array3("Ti", shape, set.ti)?,
            b: to_array3("B", shape, set.b_total)?,
            a: to_array3("a", shape, coords.a)?,
            theta: to_array3("theta", shape, coords.theta)?,
            inside_lcfs: to_array3("inside_lcfs", shape, coords.inside_lcfs)?,
        })
    }

    /// Six-array call: mesh `x`, `y`, `z` and outputs `ne` (NT, NZ, NY, NX),
    /// `te` and `b` (NZ, NY, NX). Every shape must agree with the configured
    /// grid. Results are written in place; returns status 0.
    pub fn map_into(
        &self,
        x: ArrayView3<'_, f64>,
        y: ArrayView3<'_, f64>,
        z: ArrayView3<'_, f64>,
        mut ne: ArrayViewMut4<'_, f64>,
        mut te: ArrayViewMut3<'_, f64>,
        mut b: ArrayViewMut3<'_, f64>,
    ) -> SdpResult<i32> {
        check_shapes(
            &self.config,
            x.shape(),
            y.shape(),
            z.shape(),
            ne.shape(),
            te.shape(),
            b.shape(),
        )?;

        let mapped = self.map_points(x, y, z)?;
        ne.assign(&mapped.ne);
        te.assign(&mapped.te);
        b.assign(&mapped.b);
        Ok(0)
    }
}
