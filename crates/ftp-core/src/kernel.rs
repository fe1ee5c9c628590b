//! Amortization kernel.
//!
//! Turns one instrument's balance and repayment profile into a principal
//! schedule (`amort`) and an installment schedule (`instal`). The kernel does
//! not know which method is running; methods choose the [`Basis`] that the
//! profile fractions apply to.
//!
//! # Schedule rules
//!
//! - The schedule horizon ends at the last nonzero profile fraction. Later
//!   periods amortize nothing and pay nothing.
//! - Period `t` proposes `fraction[t] * basis[t]` of principal.
//! - A proposal that reaches the remaining balance is capped to it, which
//!   exhausts the schedule.
//! - The last period of the horizon settles whatever remains.
//!
//! Together these make cumulative amortization equal to the balance.

use ndarray::ArrayView1;

/// Amount the profile fraction of a period applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// Outstanding balance at the start of the period.
    Running,
    /// Original balance, every period.
    Frozen,
    /// Principal flow of the previous period (the balance in period 0).
    Flow,
    /// Principal flow of period 0 (the balance in period 0).
    FrozenFlow,
}

/// Which schedule rule produced a period's principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The proposal `fraction * base` was amortized.
    Proposed,
    /// The proposal reached the opening balance, which was amortized instead.
    Capped,
    /// Last period of the horizon; the opening balance was amortized.
    Settled,
    /// Nothing left to amortize, or past the horizon.
    Exhausted,
}

/// Kernel state of one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Period {
    /// Rule applied.
    pub step: Step,
    /// Outstanding balance before the period.
    pub opening: f64,
    /// Amount the profile fraction applied to.
    pub base: f64,
}

impl Period {
    const EXHAUSTED: Period = Period {
        step: Step::Exhausted,
        opening: 0.0,
        base: 0.0,
    };

    /// Principal this period amortizes for the given profile fraction.
    pub fn principal(&self, fraction: f64) -> f64 {
        match self.step {
            Step::Proposed => fraction * self.base,
            Step::Capped | Step::Settled => self.opening,
            Step::Exhausted => 0.0,
        }
    }
}

/// Principal and installment series for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// Principal amortized per period.
    pub amort: Vec<f64>,
    /// Principal plus accrued interest per period.
    pub instal: Vec<f64>,
    /// Rule and balances behind each period.
    pub trace: Vec<Period>,
}

impl Schedule {
    /// Total principal amortized.
    pub fn total_amortized(&self) -> f64 {
        self.amort.iter().sum()
    }
}

/// Index one past the last nonzero fraction.
pub fn horizon(profile: ArrayView1<'_, f64>) -> usize {
    profile
        .iter()
        .rposition(|f| *f != 0.0)
        .map_or(0, |last| last + 1)
}

/// Runs the kernel for one instrument.
///
/// `accrual` holds the annual rate used for the interest part of each
/// installment; it is divided by `periods_per_year`.
pub fn amortize(
    balance: f64,
    profile: ArrayView1<'_, f64>,
    basis: Basis,
    accrual: &[f64],
    periods_per_year: f64,
) -> Schedule {
    let periods = profile.len();
    let end = horizon(profile);

    let mut amort = vec![0.0; periods];
    let mut instal = vec![0.0; periods];
    let mut trace = vec![Period::EXHAUSTED; periods];

    let mut residual = balance;
    let mut previous_flow = balance;
    let mut first_flow = balance;

    for t in 0..end {
        if residual == 0.0 {
            break;
        }
        let opening = residual;
        let base = match basis {
            Basis::Running => opening,
            Basis::Frozen => balance,
            Basis::Flow => previous_flow,
            Basis::FrozenFlow => {
                if t == 0 {
                    balance
                } else {
                    first_flow
                }
            }
        };

        let proposed = profile[t] * base;
        let step = if t + 1 == end {
            Step::Settled
        } else if proposed.abs() >= residual.abs() {
            Step::Capped
        } else {
            Step::Proposed
        };
        let period = Period {
            step,
            opening,
            base,
        };
        let principal = period.principal(profile[t]);
        residual = if principal == residual {
            0.0
        } else {
            residual - principal
        };

        let interest_base = match basis {
            Basis::Running => opening,
            Basis::Frozen => balance,
            Basis::Flow | Basis::FrozenFlow => base,
        };
        let rate = accrual.get(t).copied().unwrap_or(0.0);

        amort[t] = principal;
        trace[t] = period;
        instal[t] = principal + interest_base * rate / periods_per_year;

        previous_flow = principal;
        if t == 0 {
            first_flow = principal;
        }
    }

    Schedule {
        amort,
        instal,
        trace,
    }
}

/// Per-period principal difference between two runs over the same profile.
///
/// Each side contributes its own step's principal, so where both runs
/// propose the cell reduces to `fraction * (base_a - base_b)`, and where
/// either run caps, settles or is exhausted the opening balance or zero
/// stands in for the proposal.
pub fn rebasing_difference(profile: ArrayView1<'_, f64>, a: &[Period], b: &[Period]) -> Vec<f64> {
    profile
        .iter()
        .zip(a.iter().zip(b))
        .map(|(fraction, (pa, pb))| pa.principal(*fraction) - pb.principal(*fraction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_horizon_ignores_trailing_zeros() {
        assert_eq!(horizon(array![0.5, 0.5, 0.0, 0.0].view()), 2);
        assert_eq!(horizon(array![0.0, 0.0].view()), 0);
        assert_eq!(horizon(array![0.0, 1.0].view()), 2);
    }

    #[test]
    fn test_running_basis_rebases_on_opening_balance() {
        let profile = array![0.1, 0.2, 0.3, 0.4];
        let s = amortize(1000.0, profile.view(), Basis::Running, &[0.0; 4], 12.0);
        assert_relative_eq!(s.amort[0], 100.0, epsilon = 1e-9);
        assert_relative_eq!(s.amort[1], 180.0, epsilon = 1e-9);
        assert_relative_eq!(s.amort[2], 216.0, epsilon = 1e-9);
        assert_relative_eq!(s.amort[3], 504.0, epsilon = 1e-9);
        assert_relative_eq!(s.total_amortized(), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frozen_basis_uses_original_balance() {
        let profile = array![0.1, 0.2, 0.3, 0.4];
        let s = amortize(1000.0, profile.view(), Basis::Frozen, &[0.0; 4], 12.0);
        assert_relative_eq!(s.amort[1], 200.0, epsilon = 1e-9);
        assert_relative_eq!(s.amort[2], 300.0, epsilon = 1e-9);
        assert_relative_eq!(s.amort[3], 400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_over_amortization_is_capped() {
        let profile = array![0.6, 0.6, 0.6];
        let s = amortize(1000.0, profile.view(), Basis::Frozen, &[0.0; 3], 12.0);
        assert_eq!(s.amort, vec![600.0, 400.0, 0.0]);
        assert_eq!(s.instal[2], 0.0);
    }

    #[test]
    fn test_trace_records_steps() {
        let profile = array![0.6, 0.6, 0.6];
        let running = amortize(1000.0, profile.view(), Basis::Running, &[0.0; 3], 12.0);
        let steps: Vec<Step> = running.trace.iter().map(|p| p.step).collect();
        assert_eq!(steps, vec![Step::Proposed, Step::Proposed, Step::Settled]);
        assert_relative_eq!(running.trace[1].opening, 400.0, epsilon = 1e-9);

        let frozen = amortize(1000.0, profile.view(), Basis::Frozen, &[0.0; 3], 12.0);
        let steps: Vec<Step> = frozen.trace.iter().map(|p| p.step).collect();
        assert_eq!(steps, vec![Step::Proposed, Step::Capped, Step::Exhausted]);
    }

    #[test]
    fn test_rebasing_difference_on_capped_profile() {
        let profile = array![0.6, 0.6, 0.6];
        let running = amortize(1000.0, profile.view(), Basis::Running, &[0.0; 3], 12.0);
        let frozen = amortize(1000.0, profile.view(), Basis::Frozen, &[0.0; 3], 12.0);
        let diff = rebasing_difference(profile.view(), &running.trace, &frozen.trace);
        assert_relative_eq!(diff[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(diff[1], -160.0, epsilon = 1e-9);
        assert_relative_eq!(diff[2], 160.0, epsilon = 1e-9);
    }

    #[test]
    fn test_final_period_settles_residual() {
        let profile = array![0.1, 0.1];
        let s = amortize(500.0, profile.view(), Basis::Frozen, &[0.0; 2], 12.0);
        assert_eq!(s.amort, vec![50.0, 450.0]);
    }

    #[test]
    fn test_periods_past_horizon_are_zero() {
        let profile = array![0.5, 0.5, 0.0];
        let s = amortize(1000.0, profile.view(), Basis::Running, &[0.05; 3], 12.0);
        assert_eq!(s.amort[2], 0.0);
        assert_eq!(s.instal[2], 0.0);
    }

    #[test]
    fn test_installment_accrues_on_basis() {
        let profile = array![0.5, 0.5];
        let accrual = [0.0, 0.05];

        let running = amortize(1000.0, profile.view(), Basis::Running, &accrual, 12.0);
        assert_relative_eq!(running.instal[1], 500.0 + 500.0 * 0.05 / 12.0, epsilon = 1e-9);

        let frozen = amortize(1000.0, profile.view(), Basis::Frozen, &accrual, 12.0);
        assert_relative_eq!(frozen.instal[1], 500.0 + 1000.0 * 0.05 / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flow_bases() {
        let profile = array![0.2, 0.3, 0.25, 0.25];
        let flow = amortize(1000.0, profile.view(), Basis::Flow, &[0.0; 4], 12.0);
        assert_relative_eq!(flow.amort[1], 60.0, epsilon = 1e-9);
        assert_relative_eq!(flow.amort[2], 15.0, epsilon = 1e-9);
        assert_relative_eq!(flow.amort[3], 725.0, epsilon = 1e-9);

        let frozen = amortize(1000.0, profile.view(), Basis::FrozenFlow, &[0.0; 4], 12.0);
        assert_relative_eq!(frozen.amort[2], 50.0, epsilon = 1e-9);
        assert_relative_eq!(frozen.amort[3], 690.0, epsilon = 1e-9);
    }

    #[test]
    fn test_short_position() {
        let profile = array![0.25, 0.25, 0.25, 0.25];
        let s = amortize(-500.0, profile.view(), Basis::Running, &[0.0; 4], 12.0);
        assert_relative_eq!(s.amort[0], -125.0, epsilon = 1e-9);
        assert_relative_eq!(s.amort[1], -93.75, epsilon = 1e-9);
        assert_relative_eq!(s.total_amortized(), -500.0, epsilon = 1e-9);
    }
}
