//! Python bindings for the FTP Calculator engine.
//!
//! Exposes the `FtpCalculator` class, which wraps an engine and returns
//! outputs as numpy arrays, plus the `compute_stock` / `compute_flux`
//! one-shot functions.

use pyo3::prelude::*;

mod calculator;
mod error;

use calculator::{compute_flux, compute_stock, PyFtpCalculator};

/// Funds transfer pricing analytics.
#[pymodule]
fn ftp_calculator(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFtpCalculator>()?;
    m.add_function(wrap_pyfunction!(compute_stock, m)?)?;
    m.add_function(wrap_pyfunction!(compute_flux, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
