//! Error handling and Python exception mapping.

use ftp_core::{ErrorKind, FtpError};
use pyo3::exceptions::{PyArithmeticError, PyRuntimeError, PyValueError};
use pyo3::PyErr;

/// Python exception class an [`FtpError`] is raised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PyErrorClass {
    /// `ValueError`
    Value,
    /// `RuntimeError`
    Runtime,
    /// `ArithmeticError`
    Arithmetic,
}

/// Exception class for an error kind.
pub fn error_class(kind: ErrorKind) -> PyErrorClass {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::BufferTooSmall => PyErrorClass::Value,
        ErrorKind::NotComputed => PyErrorClass::Runtime,
        ErrorKind::ComputeFailure => PyErrorClass::Arithmetic,
    }
}

/// Convert an engine error to a Python exception.
pub fn to_py_err(err: FtpError) -> PyErr {
    let msg = err.to_string();
    match error_class(err.kind()) {
        PyErrorClass::Value => PyValueError::new_err(msg),
        PyErrorClass::Runtime => PyRuntimeError::new_err(msg),
        PyErrorClass::Arithmetic => PyArithmeticError::new_err(msg),
    }
}

/// Extension trait for converting Results to PyResult.
pub trait IntoPyResult<T> {
    fn into_py_result(self) -> pyo3::PyResult<T>;
}

impl<T> IntoPyResult<T> for Result<T, FtpError> {
    fn into_py_result(self) -> pyo3::PyResult<T> {
        self.map_err(to_py_err)
    }
}
