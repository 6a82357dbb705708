//! Internal numpy <-> ndarray conversion utilities.
//!
//! These are NOT exposed to Python - purely internal helpers.

use ndarray::{Array1, Array2, Array3};
use numpy::{PyArray1, PyArray2, PyArray3, PyReadonlyArray2, ToPyArray};
use pyo3::prelude::*;

/// Convert a numpy 2D array to an owned matrix
pub(crate) fn numpy_to_array2(arr: PyReadonlyArray2<'_, f64>) -> Array2<f64> {
    arr.as_array().to_owned()
}

/// Convert a list of numpy 2D arrays to owned hypothesis matrices
pub(crate) fn numpy_list_to_hypotheses(
    arrays: Vec<PyReadonlyArray2<'_, f64>>,
) -> Vec<Array2<f64>> {
    arrays.into_iter().map(numpy_to_array2).collect()
}

/// Convert an ndarray vector to a numpy 1D array
pub(crate) fn array1_to_numpy<'py>(py: Python<'py>, v: &Array1<f64>) -> Bound<'py, PyArray1<f64>> {
    v.to_pyarray(py)
}

/// Convert an ndarray matrix to a numpy 2D array
pub(crate) fn array2_to_numpy<'py>(py: Python<'py>, m: &Array2<f64>) -> Bound<'py, PyArray2<f64>> {
    m.to_pyarray(py)
}

/// Convert an ndarray 3D array to a numpy 3D array
pub(crate) fn array3_to_numpy<'py>(py: Python<'py>, a: &Array3<f64>) -> Bound<'py, PyArray3<f64>> {
    a.to_pyarray(py)
}
