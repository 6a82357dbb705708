//! Loss operations exposed to Python.
//!
//! Thin wrappers over the batched Rust API: hypotheses arrive as lists of
//! (B, C) numpy arrays, mixtures as (B, M) / (B, M, C) arrays.

use numpy::{PyArray1, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
use pyo3::prelude::*;

use super::convert::{
    array1_to_numpy, array2_to_numpy, array3_to_numpy, numpy_list_to_hypotheses, numpy_to_array2,
};
use crate::loss::{
    adaptive_wta_loss, wta_loss, AbsoluteError, ElementwiseLoss, GaussianNll, LogSquaredError,
    SquaredError, WtaConfig,
};
use crate::mixture;
use crate::stack;

/// Resolve an elementwise loss primitive from its Python-facing name.
fn primitive_from_name(name: &str) -> PyResult<Box<dyn ElementwiseLoss>> {
    match name {
        "squared" => Ok(Box::new(SquaredError)),
        "log_squared" => Ok(Box::new(LogSquaredError)),
        "absolute" => Ok(Box::new(AbsoluteError)),
        "gaussian_nll" => Ok(Box::new(GaussianNll)),
        other => Err(pyo3::exceptions::PyValueError::new_err(format!(
            "unknown elementwise loss '{}'",
            other
        ))),
    }
}

/// Winner-takes-all loss over a list of (B, C) hypothesis arrays.
#[pyfunction]
#[pyo3(name = "wta_loss")]
#[pyo3(signature = (hypotheses, labels, loss="squared", relax=0.0, k_top=1))]
pub fn py_wta_loss(
    hypotheses: Vec<PyReadonlyArray2<'_, f64>>,
    labels: PyReadonlyArray2<'_, f64>,
    loss: &str,
    relax: f64,
    k_top: usize,
) -> PyResult<f64> {
    let primitive = primitive_from_name(loss)?;
    let hypotheses = numpy_list_to_hypotheses(hypotheses);
    let labels = numpy_to_array2(labels);
    let config = WtaConfig::new(relax, k_top);
    wta_loss(
        &hypotheses,
        hypotheses.len(),
        &labels,
        primitive.as_ref(),
        &config,
    )
    .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{:?}", e)))
}

/// Adaptive winner-takes-all loss over a list of (B, C) hypothesis arrays.
#[pyfunction]
#[pyo3(name = "adaptive_wta_loss")]
#[pyo3(signature = (hypotheses, labels, loss="squared", k_top=1))]
pub fn py_adaptive_wta_loss(
    hypotheses: Vec<PyReadonlyArray2<'_, f64>>,
    labels: PyReadonlyArray2<'_, f64>,
    loss: &str,
    k_top: usize,
) -> PyResult<f64> {
    let primitive = primitive_from_name(loss)?;
    let hypotheses = numpy_list_to_hypotheses(hypotheses);
    let labels = numpy_to_array2(labels);
    adaptive_wta_loss(
        &hypotheses,
        hypotheses.len(),
        &labels,
        primitive.as_ref(),
        k_top,
    )
    .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{:?}", e)))
}

/// Per-component Gaussian densities, shape (B, M).
#[pyfunction]
#[pyo3(name = "component_density")]
pub fn py_component_density<'py>(
    py: Python<'py>,
    means: PyReadonlyArray3<'_, f64>,
    spreads: PyReadonlyArray3<'_, f64>,
    labels: PyReadonlyArray2<'_, f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let densities =
        mixture::component_density(means.as_array(), spreads.as_array(), labels.as_array())
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{:?}", e)))?;
    Ok(array2_to_numpy(py, &densities))
}

/// Weighted mixture probabilities, shape (B,).
#[pyfunction]
#[pyo3(name = "mixture_probability")]
pub fn py_mixture_probability<'py>(
    py: Python<'py>,
    weights: PyReadonlyArray2<'_, f64>,
    means: PyReadonlyArray3<'_, f64>,
    spreads: PyReadonlyArray3<'_, f64>,
    labels: PyReadonlyArray2<'_, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let probabilities = mixture::mixture_probability(
        weights.as_array(),
        means.as_array(),
        spreads.as_array(),
        labels.as_array(),
    )
    .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{:?}", e)))?;
    Ok(array1_to_numpy(py, &probabilities))
}

/// Scalar mixture negative log-likelihood over a batch.
#[pyfunction]
#[pyo3(name = "mixture_nll")]
pub fn py_mixture_nll(
    weights: PyReadonlyArray2<'_, f64>,
    means: PyReadonlyArray3<'_, f64>,
    spreads: PyReadonlyArray3<'_, f64>,
    labels: PyReadonlyArray2<'_, f64>,
) -> PyResult<f64> {
    mixture::mixture_nll(
        weights.as_array(),
        means.as_array(),
        spreads.as_array(),
        labels.as_array(),
    )
    .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{:?}", e)))
}

/// Weighted Mahalanobis distances per sample, shape (B,).
#[pyfunction]
#[pyo3(name = "mahalanobis_loss")]
pub fn py_mahalanobis_loss<'py>(
    py: Python<'py>,
    weights: PyReadonlyArray2<'_, f64>,
    means: PyReadonlyArray3<'_, f64>,
    spreads: PyReadonlyArray3<'_, f64>,
    labels: PyReadonlyArray2<'_, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let distances = mixture::mahalanobis_loss_batched(
        weights.as_array(),
        means.as_array(),
        spreads.as_array(),
        labels.as_array(),
    )
    .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{:?}", e)))?;
    Ok(array1_to_numpy(py, &distances))
}

/// Central-oracle losses per sample, shape (B,).
#[pyfunction]
#[pyo3(name = "central_oracle_loss")]
pub fn py_central_oracle_loss<'py>(
    py: Python<'py>,
    means: PyReadonlyArray3<'_, f64>,
    labels: PyReadonlyArray2<'_, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let losses = mixture::central_oracle_loss_batched(means.as_array(), labels.as_array())
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{:?}", e)))?;
    Ok(array1_to_numpy(py, &losses))
}

/// Stack a list of (B, C) hypothesis arrays into a (B, M, C) array.
#[pyfunction]
#[pyo3(name = "stack_hypotheses")]
pub fn py_stack_hypotheses<'py>(
    py: Python<'py>,
    hypotheses: Vec<PyReadonlyArray2<'_, f64>>,
) -> PyResult<Bound<'py, PyArray3<f64>>> {
    let hypotheses = numpy_list_to_hypotheses(hypotheses);
    let stacked = stack::stack_hypotheses(&hypotheses)
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{:?}", e)))?;
    Ok(array3_to_numpy(py, &stacked))
}

/// Register loss operations with the Python module.
pub fn register_ops(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_wta_loss, m)?)?;
    m.add_function(wrap_pyfunction!(py_adaptive_wta_loss, m)?)?;
    m.add_function(wrap_pyfunction!(py_component_density, m)?)?;
    m.add_function(wrap_pyfunction!(py_mixture_probability, m)?)?;
    m.add_function(wrap_pyfunction!(py_mixture_nll, m)?)?;
    m.add_function(wrap_pyfunction!(py_mahalanobis_loss, m)?)?;
    m.add_function(wrap_pyfunction!(py_central_oracle_loss, m)?)?;
    m.add_function(wrap_pyfunction!(py_stack_hypotheses, m)?)?;
    Ok(())
}
