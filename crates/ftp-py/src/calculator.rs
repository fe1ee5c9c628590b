//! `FtpCalculator` class and the one-shot compute functions.
//!
//! Arrays cross the boundary as row-major buffers, so numpy's ndarray version
//! never meets the engine's.

use ftp_core::{
    ComputeMethod, Engine, EngineConfig, FtpError, FtpResult, InputModel, OutputKind, OutputSet,
};
use numpy::{
    PyArray1, PyArray2, PyArrayMethods, PyReadonlyArray2, PyReadonlyArrayDyn,
    PyUntypedArrayMethods,
};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::error::IntoPyResult;

/// A matrix flattened row-major, with its shape.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RowMajor {
    pub(crate) values: Vec<f64>,
    pub(crate) shape: (usize, usize),
}

impl RowMajor {
    fn from_numpy(array: &PyReadonlyArray2<'_, f64>) -> Self {
        let view = array.as_array();
        Self {
            values: view.iter().copied().collect(),
            shape: view.dim(),
        }
    }

    fn from_output(output: &OutputSet, kind: OutputKind) -> FtpResult<Self> {
        let (rows, cols) = output.dims();
        let mut values = vec![0.0; rows * cols];
        output.copy_into(kind, &mut values)?;
        Ok(Self {
            values,
            shape: (rows, cols),
        })
    }

    fn into_numpy(self, py: Python<'_>) -> PyResult<Bound<'_, PyArray2<f64>>> {
        let (rows, cols) = self.shape;
        PyArray1::from_vec_bound(py, self.values).reshape([rows, cols])
    }
}

/// Checks that outstanding balances have shape `(N,)` or `(N, 1)`.
pub(crate) fn check_outstanding_shape(shape: &[usize]) -> FtpResult<()> {
    match shape {
        [_] | [_, 1] => Ok(()),
        other => Err(FtpError::invalid_input(format!(
            "outstanding must have shape (N,) or (N, 1), got {other:?}"
        ))),
    }
}

fn build_input(
    outstanding: &PyReadonlyArrayDyn<'_, f64>,
    profiles: &PyReadonlyArray2<'_, f64>,
    rates: &PyReadonlyArray2<'_, f64>,
) -> FtpResult<InputModel> {
    check_outstanding_shape(outstanding.shape())?;
    let balances: Vec<f64> = outstanding.as_array().iter().copied().collect();
    let profiles = RowMajor::from_numpy(profiles);
    let rates = RowMajor::from_numpy(rates);
    InputModel::from_row_major(
        &balances,
        &profiles.values,
        profiles.shape,
        &rates.values,
        rates.shape,
    )
}

fn engine_config(periods_per_year: Option<u32>) -> EngineConfig {
    match periods_per_year {
        Some(periods) => EngineConfig::default().with_periods_per_year(periods),
        None => EngineConfig::default(),
    }
}

/// Funds transfer pricing calculator over one portfolio.
///
/// Examples:
///     >>> import numpy as np
///     >>> from ftp_calculator import FtpCalculator
///     >>>
///     >>> calc = FtpCalculator(
///     ...     np.array([1000.0]),
///     ...     np.array([[0.5, 0.5]]),
///     ...     np.array([[0.05, 0.05, 0.05]]),
///     ... )
///     >>> calc.compute("stock")
///     >>> calc.stock_amort
///     array([[500., 500.]])
#[pyclass(name = "FtpCalculator")]
pub struct PyFtpCalculator {
    engine: Engine,
}

impl PyFtpCalculator {
    fn output<'py>(
        &self,
        py: Python<'py>,
        kind: OutputKind,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let (rows, cols) = self.engine.dimensions().into_py_result()?;
        let mut values = vec![0.0; rows * cols];
        self.engine.copy_matrix(kind, &mut values).into_py_result()?;
        RowMajor {
            values,
            shape: (rows, cols),
        }
        .into_numpy(py)
    }
}

#[pymethods]
impl PyFtpCalculator {
    /// Create a calculator.
    ///
    /// Args:
    ///     outstanding: Balances, shape (N,) or (N, 1)
    ///     profiles: Repayment fractions, shape (N, C)
    ///     rates: Market curves by tenor, shape (N, K)
    ///     periods_per_year: Accrual divisor for interest (default: 12)
    ///
    /// Raises:
    ///     ValueError: If the inputs are malformed or inconsistent
    #[new]
    #[pyo3(signature = (outstanding, profiles, rates, *, periods_per_year = None))]
    fn new(
        outstanding: PyReadonlyArrayDyn<'_, f64>,
        profiles: PyReadonlyArray2<'_, f64>,
        rates: PyReadonlyArray2<'_, f64>,
        periods_per_year: Option<u32>,
    ) -> PyResult<Self> {
        let input = build_input(&outstanding, &profiles, &rates).into_py_result()?;
        let engine = Engine::with_config(input, engine_config(periods_per_year)).into_py_result()?;
        Ok(Self { engine })
    }

    /// Run the computation. `method` is "stock" or "flux".
    ///
    /// Raises:
    ///     ValueError: If the method is unknown
    ///     ArithmeticError: If the schedule cannot be computed; earlier
    ///         results stay available
    fn compute(&mut self, method: &str) -> PyResult<()> {
        let method: ComputeMethod = method.parse().into_py_result()?;
        self.engine.compute(method).into_py_result()
    }

    /// (instruments, periods) of the portfolio.
    #[getter]
    fn dims(&self) -> (usize, usize) {
        let input = self.engine.input();
        (input.instruments(), input.periods())
    }

    /// Method of the last successful compute, or None.
    #[getter]
    fn method(&self) -> Option<&'static str> {
        self.engine.output().map(|output| output.method().name())
    }

    /// Output matrix by name, e.g. "ftp_rate".
    fn get<'py>(&self, py: Python<'py>, name: &str) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let kind: OutputKind = name.parse().into_py_result()?;
        self.output(py, kind)
    }

    #[getter]
    fn stock_amort<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        self.output(py, OutputKind::StockAmort)
    }

    #[getter]
    fn stock_instal<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        self.output(py, OutputKind::StockInstal)
    }

    #[getter]
    fn varstock_amort<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        self.output(py, OutputKind::VarstockAmort)
    }

    #[getter]
    fn varstock_instal<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        self.output(py, OutputKind::VarstockInstal)
    }

    #[getter]
    fn ftp_rate<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        self.output(py, OutputKind::FtpRate)
    }

    #[getter]
    fn ftp_int<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        self.output(py, OutputKind::FtpInt)
    }

    #[getter]
    fn market_rate<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        self.output(py, OutputKind::MarketRate)
    }

    fn __repr__(&self) -> String {
        format!("Ftp{}", self.engine)
    }
}

fn run_compute<'py>(
    py: Python<'py>,
    outstanding: &PyReadonlyArrayDyn<'py, f64>,
    profiles: &PyReadonlyArray2<'py, f64>,
    rates: &PyReadonlyArray2<'py, f64>,
    method: ComputeMethod,
) -> PyResult<Bound<'py, PyDict>> {
    let input = build_input(outstanding, profiles, rates).into_py_result()?;
    let output = ftp_core::engine::run(&input, &EngineConfig::default(), method).into_py_result()?;

    let dict = PyDict::new_bound(py);
    for kind in OutputKind::ALL {
        let matrix = RowMajor::from_output(&output, kind).into_py_result()?;
        dict.set_item(kind.name(), matrix.into_numpy(py)?)?;
    }
    Ok(dict)
}

/// Compute with the stock method. Returns a dict of numpy arrays keyed by
/// output name.
#[pyfunction]
pub fn compute_stock<'py>(
    py: Python<'py>,
    outstanding: PyReadonlyArrayDyn<'py, f64>,
    profiles: PyReadonlyArray2<'py, f64>,
    rates: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyDict>> {
    run_compute(py, &outstanding, &profiles, &rates, ComputeMethod::Stock)
}

/// Compute with the flux method. Returns a dict of numpy arrays keyed by
/// output name.
#[pyfunction]
pub fn compute_flux<'py>(
    py: Python<'py>,
    outstanding: PyReadonlyArrayDyn<'py, f64>,
    profiles: PyReadonlyArray2<'py, f64>,
    rates: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyDict>> {
    run_compute(py, &outstanding, &profiles, &rates, ComputeMethod::Flux)
}
