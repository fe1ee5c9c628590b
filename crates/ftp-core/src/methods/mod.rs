//! Stock and Flux transfer pricing methods.
//!
//! Both methods share the amortization kernel and differ only in:
//!
//! - the [`Basis`] the profile fractions apply to for the `stock_*` and
//!   `varstock_*` schedules
//! - the maturity at which each remaining principal flow is priced
//!
//! [`AmortizationMethod`] captures those two choices; the per-instrument
//! pipeline is shared.

mod flux;
mod stock;

pub use flux::FluxMethod;
pub use stock::StockMethod;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::curve::TenorCurve;
use crate::error::{FtpError, FtpResult};
use crate::input::InputModel;
use crate::kernel::{self, Basis};

/// Accounting convention selected for a compute run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputeMethod {
    /// Re-base on the running balance.
    Stock,
    /// Re-base on the period cash flow.
    Flux,
}

impl ComputeMethod {
    /// Integer code used across the C boundary.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            ComputeMethod::Stock => 0,
            ComputeMethod::Flux => 1,
        }
    }

    /// Lowercase method name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ComputeMethod::Stock => "stock",
            ComputeMethod::Flux => "flux",
        }
    }

    /// Strategy implementing this method.
    #[must_use]
    pub fn strategy(self) -> &'static dyn AmortizationMethod {
        match self {
            ComputeMethod::Stock => &StockMethod,
            ComputeMethod::Flux => &FluxMethod,
        }
    }
}

impl fmt::Display for ComputeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComputeMethod {
    type Err = FtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(ComputeMethod::Stock),
            "flux" => Ok(ComputeMethod::Flux),
            other => Err(FtpError::invalid_input(format!(
                "unknown method '{other}', expected 'stock' or 'flux'"
            ))),
        }
    }
}

impl TryFrom<i32> for ComputeMethod {
    type Error = FtpError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ComputeMethod::Stock),
            1 => Ok(ComputeMethod::Flux),
            other => Err(FtpError::invalid_input(format!(
                "unknown method code {other}, expected 0 (stock) or 1 (flux)"
            ))),
        }
    }
}

/// Output rows for a single instrument, one entry per period.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSchedule {
    /// Principal amortized under the method's running basis.
    pub stock_amort: Vec<f64>,
    /// Installments under the running basis.
    pub stock_instal: Vec<f64>,
    /// Principal amortized under the method's frozen basis.
    pub varstock_amort: Vec<f64>,
    /// Installments under the frozen basis.
    pub varstock_instal: Vec<f64>,
    /// Amortization-weighted transfer rate of the remaining balance.
    pub ftp_rate: Vec<f64>,
    /// Transfer interest on the remaining balance for one period.
    pub ftp_int: Vec<f64>,
    /// Market rate at the elapsed maturity.
    pub market_rate: Vec<f64>,
}

/// A transfer pricing convention.
pub trait AmortizationMethod: Send + Sync {
    /// Method this strategy implements.
    fn method(&self) -> ComputeMethod;

    /// Basis of the `stock_*` schedule.
    fn stock_basis(&self) -> Basis;

    /// Basis of the `varstock_*` schedule.
    fn varstock_basis(&self) -> Basis;

    /// Maturity, in periods, at which a flow settling in period `settle` is
    /// priced when valued at `period`. Always called with `settle > period`.
    fn pricing_maturity(&self, settle: usize, period: usize) -> usize;

    /// Runs the full pipeline for one instrument.
    ///
    /// # Errors
    ///
    /// Returns `ComputeFailure` if the profile holds a negative fraction, or
    /// has no nonzero fraction while the balance is nonzero.
    fn price_instrument(
        &self,
        input: &InputModel,
        instrument: usize,
        periods_per_year: f64,
    ) -> FtpResult<InstrumentSchedule> {
        let balance = input.balance(instrument);
        let profile = input.profile(instrument);
        check_profile(instrument, balance, profile.view())?;

        let curve = input.curve(instrument);
        let market_rate = market_rates(&curve, input.periods());

        let stock = kernel::amortize(
            balance,
            profile.view(),
            self.stock_basis(),
            &market_rate,
            periods_per_year,
        );
        let varstock = kernel::amortize(
            balance,
            profile.view(),
            self.varstock_basis(),
            &market_rate,
            periods_per_year,
        );

        let (ftp_rate, ftp_int) = transfer_layers(self, &stock.amort, &curve, periods_per_year);

        Ok(InstrumentSchedule {
            stock_amort: stock.amort,
            stock_instal: stock.instal,
            varstock_amort: varstock.amort,
            varstock_instal: varstock.instal,
            ftp_rate,
            ftp_int,
            market_rate,
        })
    }

    /// Balance-decay contribution `stock_amort - varstock_amort` for one
    /// instrument, predicted cell by cell from the rule each schedule
    /// applied in that period.
    ///
    /// # Errors
    ///
    /// Fails on the same profiles as [`AmortizationMethod::price_instrument`].
    fn predicted_decay(&self, input: &InputModel, instrument: usize) -> FtpResult<Vec<f64>> {
        let balance = input.balance(instrument);
        let profile = input.profile(instrument);
        check_profile(instrument, balance, profile.view())?;

        let stock = kernel::amortize(balance, profile.view(), self.stock_basis(), &[], 1.0);
        let varstock = kernel::amortize(balance, profile.view(), self.varstock_basis(), &[], 1.0);
        Ok(kernel::rebasing_difference(profile.view(), &stock.trace, &varstock.trace))
    }
}

fn check_profile(
    instrument: usize,
    balance: f64,
    profile: ndarray::ArrayView1<'_, f64>,
) -> FtpResult<()> {
    if let Some((period, fraction)) = profile.iter().enumerate().find(|(_, f)| **f < 0.0) {
        return Err(FtpError::compute_failure(format!(
            "instrument {instrument}: negative repayment fraction {fraction} at period {period}"
        )));
    }
    if balance != 0.0 && kernel::horizon(profile) == 0 {
        return Err(FtpError::compute_failure(format!(
            "instrument {instrument}: balance {balance} has an all-zero repayment profile"
        )));
    }
    Ok(())
}

/// Market rate per period: the curve at the elapsed maturity.
pub(crate) fn market_rates(curve: &TenorCurve<'_>, periods: usize) -> Vec<f64> {
    (0..periods).map(|t| curve.rate_at(t)).collect()
}

/// Transfer rate and interest per period from the flows still outstanding.
fn transfer_layers<M: AmortizationMethod + ?Sized>(
    method: &M,
    amort: &[f64],
    curve: &TenorCurve<'_>,
    periods_per_year: f64,
) -> (Vec<f64>, Vec<f64>) {
    let periods = amort.len();
    let mut ftp_rate = vec![0.0; periods];
    let mut ftp_int = vec![0.0; periods];

    for t in 0..periods {
        let mut remaining = 0.0;
        let mut weighted = 0.0;
        for (s, flow) in amort.iter().enumerate().skip(t + 1) {
            remaining += flow;
            weighted += flow * curve.rate_at(method.pricing_maturity(s, t));
        }
        ftp_int[t] = weighted / periods_per_year;
        if remaining != 0.0 {
            ftp_rate[t] = weighted / remaining;
        }
    }

    (ftp_rate, ftp_int)
}
