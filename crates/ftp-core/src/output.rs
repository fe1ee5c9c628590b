//! Output matrices of a compute run.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{FtpError, FtpResult};
use crate::methods::{ComputeMethod, InstrumentSchedule};

/// Identifies one of the seven output matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// Principal amortized, running basis.
    StockAmort,
    /// Installments, running basis.
    StockInstal,
    /// Principal amortized, frozen basis.
    VarstockAmort,
    /// Installments, frozen basis.
    VarstockInstal,
    /// Transfer rate.
    FtpRate,
    /// Transfer interest.
    FtpInt,
    /// Market rate.
    MarketRate,
}

impl OutputKind {
    /// All kinds in code order.
    pub const ALL: [OutputKind; 7] = [
        OutputKind::StockAmort,
        OutputKind::StockInstal,
        OutputKind::VarstockAmort,
        OutputKind::VarstockInstal,
        OutputKind::FtpRate,
        OutputKind::FtpInt,
        OutputKind::MarketRate,
    ];

    /// Integer code used across the C boundary.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            OutputKind::StockAmort => 0,
            OutputKind::StockInstal => 1,
            OutputKind::VarstockAmort => 2,
            OutputKind::VarstockInstal => 3,
            OutputKind::FtpRate => 4,
            OutputKind::FtpInt => 5,
            OutputKind::MarketRate => 6,
        }
    }

    /// Canonical matrix name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            OutputKind::StockAmort => "stock_amort",
            OutputKind::StockInstal => "stock_instal",
            OutputKind::VarstockAmort => "varstock_amort",
            OutputKind::VarstockInstal => "varstock_instal",
            OutputKind::FtpRate => "ftp_rate",
            OutputKind::FtpInt => "ftp_int",
            OutputKind::MarketRate => "market_rate",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputKind {
    type Err = FtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        OutputKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| FtpError::invalid_input(format!("unknown output matrix '{s}'")))
    }
}

impl TryFrom<i32> for OutputKind {
    type Error = FtpError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| OutputKind::ALL.get(idx).copied())
            .ok_or_else(|| FtpError::invalid_input(format!("unknown output matrix code {code}")))
    }
}

/// The seven `N x C` matrices produced by one compute run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSet {
    method: ComputeMethod,
    stock_amort: Array2<f64>,
    stock_instal: Array2<f64>,
    varstock_amort: Array2<f64>,
    varstock_instal: Array2<f64>,
    ftp_rate: Array2<f64>,
    ftp_int: Array2<f64>,
    market_rate: Array2<f64>,
}

impl OutputSet {
    /// Stacks per-instrument rows into matrices.
    pub(crate) fn assemble(
        method: ComputeMethod,
        periods: usize,
        rows: &[InstrumentSchedule],
    ) -> Self {
        let shape = (rows.len(), periods);
        let mut set = Self {
            method,
            stock_amort: Array2::zeros(shape),
            stock_instal: Array2::zeros(shape),
            varstock_amort: Array2::zeros(shape),
            varstock_instal: Array2::zeros(shape),
            ftp_rate: Array2::zeros(shape),
            ftp_int: Array2::zeros(shape),
            market_rate: Array2::zeros(shape),
        };

        for (i, row) in rows.iter().enumerate() {
            let pairs = [
                (&mut set.stock_amort, &row.stock_amort),
                (&mut set.stock_instal, &row.stock_instal),
                (&mut set.varstock_amort, &row.varstock_amort),
                (&mut set.varstock_instal, &row.varstock_instal),
                (&mut set.ftp_rate, &row.ftp_rate),
                (&mut set.ftp_int, &row.ftp_int),
                (&mut set.market_rate, &row.market_rate),
            ];
            for (matrix, values) in pairs {
                matrix.row_mut(i).assign(&ArrayView1::from(values.as_slice()));
            }
        }

        set
    }

    /// Method that produced this set.
    #[must_use]
    pub fn method(&self) -> ComputeMethod {
        self.method
    }

    /// Shared shape `(instruments, periods)`.
    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        self.stock_amort.dim()
    }

    /// Matrix by kind.
    #[must_use]
    pub fn get(&self, kind: OutputKind) -> &Array2<f64> {
        match kind {
            OutputKind::StockAmort => &self.stock_amort,
            OutputKind::StockInstal => &self.stock_instal,
            OutputKind::VarstockAmort => &self.varstock_amort,
            OutputKind::VarstockInstal => &self.varstock_instal,
            OutputKind::FtpRate => &self.ftp_rate,
            OutputKind::FtpInt => &self.ftp_int,
            OutputKind::MarketRate => &self.market_rate,
        }
    }

    /// Iterates over all matrices in code order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputKind, &Array2<f64>)> + '_ {
        OutputKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// `stock_amort - varstock_amort`, the balance-decay contribution.
    ///
    /// Row `i` matches [`AmortizationMethod::predicted_decay`] for instrument
    /// `i` under the method that produced this set.
    ///
    /// [`AmortizationMethod::predicted_decay`]: crate::methods::AmortizationMethod::predicted_decay
    #[must_use]
    pub fn balance_decay(&self) -> Array2<f64> {
        &self.stock_amort - &self.varstock_amort
    }

    /// Copies one matrix row-major into `dest` and returns the cell count.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooSmall` if `dest` cannot hold the matrix; `dest` is
    /// left untouched.
    pub fn copy_into(&self, kind: OutputKind, dest: &mut [f64]) -> FtpResult<usize> {
        let matrix = self.get(kind);
        let required = matrix.len();
        if dest.len() < required {
            return Err(FtpError::BufferTooSmall {
                matrix: kind.name(),
                required,
                capacity: dest.len(),
            });
        }
        for (slot, value) in dest.iter_mut().zip(matrix.iter()) {
            *slot = *value;
        }
        Ok(required)
    }

    /// First non-finite cell, if any.
    pub(crate) fn find_non_finite(&self) -> Option<(OutputKind, usize, usize, f64)> {
        self.iter().find_map(|(kind, matrix)| {
            matrix
                .indexed_iter()
                .find(|(_, v)| !v.is_finite())
                .map(|((row, col), value)| (kind, row, col, *value))
        })
    }
}
