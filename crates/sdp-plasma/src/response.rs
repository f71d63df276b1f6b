//! Adiabatic (Boltzmann) electron response to the potential.
//!
//! δn/n0 = eφ/Te. With φ in volts and Te in eV this is δn = ne0·φ/Te.

use ndarray::{Array2, ArrayView2, Axis};
use sdp_types::error::{SdpError, SdpResult};
use tracing::debug;

/// δn for every time step (rows) and point (columns).
///
/// Points with `Te <= 0` or a false flag get δn = 0. With `filtering`,
/// |δn| > |ne0| is set to 0 so the total density cannot turn negative.
pub fn adiabatic_electron_response(
    ne0: &[f64],
    phi: ArrayView2<'_, f64>,
    te: &[f64],
    flags: &[bool],
    filtering: bool,
) -> SdpResult<Array2<f64>> {
    let n = ne0.len();
    SdpError::check_shape("phi", &[phi.nrows(), n], phi.shape())?;
    SdpError::check_shape("Te", &[n], &[te.len()])?;
    SdpError::check_shape("flags", &[n], &[flags.len()])?;

    let mut dn = Array2::zeros(phi.raw_dim());
    let mut filtered = 0usize;
    for (mut row, phi_row) in dn.axis_iter_mut(Axis(0)).zip(phi.axis_iter(Axis(0))) {
        for i in 0..n {
            if !flags[i] || te[i] <= 0.0 {
                continue;
            }
            let v = ne0[i] * phi_row[i] / te[i];
            if filtering && v.abs() > ne0[i].abs() {
                filtered += 1;
                continue;
            }
            row[i] = v;
        }
    }
    if filtering {
        debug!(filtered, "density fluctuations filtered");
    }
    Ok(dn)
}

/// `ne = dn·amplification + ne0`, in place. `dn` rows are time steps.
pub fn amplify_and_superpose(dn: &mut Array2<f64>, ne0: &[f64], amplification: f64) -> SdpResult<()> {
    SdpError::check_shape("ne0", &[dn.ncols()], &[ne0.len()])?;
    for mut row in dn.axis_iter_mut(Axis(0)) {
        for (v, &n0) in row.iter_mut().zip(ne0) {
            *v = *v * amplification + n0;
        }
    }
    Ok(())
}
