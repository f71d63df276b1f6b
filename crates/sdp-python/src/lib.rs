// ─────────────────────────────────────────────────────────────────────
// SDP Plasma Mapper — Python Bindings
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! PyO3 bindings for the GTS profile mapper.
//!
//! Module `sdp_mapper` keeps one process-wide parameter store:
//! `set_para_(**kwargs)` writes it, `show_para_()` prints it,
//! `get_para_()` returns it as a dict and
//! `get_GTS_profiles_(x, y, z, ne, Te, B)` fills the last three arrays in
//! place from the mesh in the first three.

use std::sync::{LazyLock, Mutex, MutexGuard};

use numpy::{PyReadonlyArray3, PyReadwriteArray3, PyReadwriteArray4, PyUntypedArrayMethods};
use pyo3::exceptions::{PyIOError, PyKeyError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyString};
use tracing::debug;

use sdp_plasma::mapper::{check_shapes, GtsMapper};
use sdp_types::config::{MapperConfig, ParamValue};
use sdp_types::error::SdpError;

static PARAMETERS: LazyLock<Mutex<MapperConfig>> =
    LazyLock::new(|| Mutex::new(MapperConfig::default()));

fn parameters() -> PyResult<MutexGuard<'static, MapperConfig>> {
    PARAMETERS
        .lock()
        .map_err(|_| PyRuntimeError::new_err("parameter store poisoned"))
}

fn to_py_err(e: SdpError) -> PyErr {
    let msg = e.to_string();
    match e {
        SdpError::UnknownParameter(_) => PyKeyError::new_err(msg),
        SdpError::ParameterType { .. } => PyTypeError::new_err(msg),
        SdpError::ConfigError(_)
        | SdpError::ShapeMismatch { .. }
        | SdpError::GridError(_)
        | SdpError::PhysicsViolation(_) => PyValueError::new_err(msg),
        SdpError::Io(_) | SdpError::DataFormat(_) | SdpError::Json(_) => PyIOError::new_err(msg),
    }
}

/// Python value → keyword value. Numpy integer scalars go through
/// `__index__`, numpy floats through `__float__`.
fn param_value(key: &str, value: &Bound<'_, PyAny>) -> PyResult<ParamValue> {
    if value.is_instance_of::<PyBool>() {
        return Ok(ParamValue::Bool(value.extract()?));
    }
    if value.is_instance_of::<PyInt>() {
        return Ok(ParamValue::Int(value.extract()?));
    }
    if value.is_instance_of::<PyFloat>() {
        return Ok(ParamValue::Float(value.extract()?));
    }
    if value.is_instance_of::<PyString>() {
        return Ok(ParamValue::Str(value.extract()?));
    }
    if let Ok(v) = value.extract::<i64>() {
        return Ok(ParamValue::Int(v));
    }
    if let Ok(v) = value.extract::<f64>() {
        return Ok(ParamValue::Float(v));
    }
    Err(PyTypeError::new_err(format!(
        "Parameter {key}: unsupported value type {}",
        value.get_type().name()?
    )))
}

// ─── Parameter store ───

/// Set the parameters used by the mapper. Keywords not given keep their
/// current value; a failing call changes nothing.
#[pyfunction]
#[pyo3(signature = (**kwargs))]
fn set_para_(kwargs: Option<&Bound<'_, PyDict>>) -> PyResult<i32> {
    let mut staged = Vec::new();
    if let Some(kwargs) = kwargs {
        for (key, value) in kwargs.iter() {
            let key: String = key.extract()?;
            let value = param_value(&key, &value)?;
            staged.push((key, value));
        }
    }
    let count = staged.len();
    parameters()?.set_parameters(staged).map_err(to_py_err)?;
    debug!(count, "mapper parameters updated");
    Ok(0)
}

/// Print out current parameters.
#[pyfunction]
fn show_para_(py: Python<'_>) -> PyResult<i32> {
    let text = parameters()?.to_string();
    py.import("builtins")?.getattr("print")?.call1((text,))?;
    Ok(0)
}

/// Current parameters as a dict keyed by keyword.
#[pyfunction]
fn get_para_(py: Python<'_>) -> PyResult<Bound<'_, PyDict>> {
    let dict = PyDict::new(py);
    for (key, value) in parameters()?.parameters() {
        match value {
            ParamValue::Float(v) => dict.set_item(key, v)?,
            ParamValue::Int(v) => dict.set_item(key, v)?,
            ParamValue::Str(v) => dict.set_item(key, v)?,
            ParamValue::Bool(v) => dict.set_item(key, v)?,
        }
    }
    Ok(dict)
}

// ─── Mapping ───

/// Map GTS profiles onto the mesh. Pass in arrays x, y, z, ne, Te, B where
/// ne is (NT, NZ, NY, NX) and the others are (NZ, NY, NX), consistent with
/// the parameters set through `set_para_`. ne, Te and B are overwritten.
#[pyfunction]
#[allow(non_snake_case)]
fn get_GTS_profiles_<'py>(
    x: PyReadonlyArray3<'py, f64>,
    y: PyReadonlyArray3<'py, f64>,
    z: PyReadonlyArray3<'py, f64>,
    mut ne: PyReadwriteArray4<'py, f64>,
    mut te: PyReadwriteArray3<'py, f64>,
    mut b: PyReadwriteArray3<'py, f64>,
) -> PyResult<i32> {
    let config = parameters()?.clone();
    check_shapes(
        &config,
        x.shape(),
        y.shape(),
        z.shape(),
        ne.shape(),
        te.shape(),
        b.shape(),
    )
    .map_err(to_py_err)?;
    let mapper = GtsMapper::from_config(&config).map_err(to_py_err)?;
    mapper
        .map_into(
            x.as_array(),
            y.as_array(),
            z.as_array(),
            ne.as_array_mut(),
            te.as_array_mut(),
            b.as_array_mut(),
        )
        .map_err(to_py_err)
}

// ─── Module registration ───

/// GTS profile mapper for synthetic diagnostics.
#[pymodule]
fn sdp_mapper(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(set_para_, m)?)?;
    m.add_function(wrap_pyfunction!(show_para_, m)?)?;
    m.add_function(wrap_pyfunction!(get_para_, m)?)?;
    m.add_function(wrap_pyfunction!(get_GTS_profiles_, m)?)?;
    Ok(())
}
