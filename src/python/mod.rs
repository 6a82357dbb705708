//! Python bindings for multihypothesis-wta-losses-rs
//!
//! This module provides PyO3 bindings for the loss library.

mod convert;
mod ops;

use pyo3::prelude::*;

/// Python module definition
#[pymodule]
fn _multihypothesis_wta_losses_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    ops::register_ops(m)?;

    // Version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
