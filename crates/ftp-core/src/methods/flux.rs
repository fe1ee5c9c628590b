//! Flux method.
//!
//! The `stock_*` schedule applies each fraction to the previous period's
//! principal flow; `varstock_*` applies it to the first period's flow. Each
//! remaining flow is priced at its distance from the valuation period.

use super::{AmortizationMethod, ComputeMethod};
use crate::kernel::Basis;

/// Re-bases on the period cash flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FluxMethod;

impl AmortizationMethod for FluxMethod {
    fn method(&self) -> ComputeMethod {
        ComputeMethod::Flux
    }

    fn stock_basis(&self) -> Basis {
        Basis::Flow
    }

    fn varstock_basis(&self) -> Basis {
        Basis::FrozenFlow
    }

    fn pricing_maturity(&self, settle: usize, period: usize) -> usize {
        settle - period
    }
}
