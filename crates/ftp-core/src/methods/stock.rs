//! Stock method.
//!
//! The `stock_*` schedule applies each fraction to the balance still
//! outstanding at the start of the period; `varstock_*` applies it to the
//! original balance. Remaining flows are priced at their maturity from
//! origination.

use super::{AmortizationMethod, ComputeMethod};
use crate::kernel::Basis;

/// Re-bases on the running balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockMethod;

impl AmortizationMethod for StockMethod {
    fn method(&self) -> ComputeMethod {
        ComputeMethod::Stock
    }

    fn stock_basis(&self) -> Basis {
        Basis::Running
    }

    fn varstock_basis(&self) -> Basis {
        Basis::Frozen
    }

    fn pricing_maturity(&self, settle: usize, _period: usize) -> usize {
        settle
    }
}
