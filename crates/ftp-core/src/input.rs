//! Validated input matrices.
//!
//! An [`InputModel`] owns copies of the three caller arrays:
//!
//! - **outstanding**: one balance per instrument (`N`)
//! - **profiles**: repayment fractions, one row per instrument (`N x C`)
//! - **rates**: one market curve per instrument (`N x K`)
//!
//! Once built the model is immutable; every value is finite and the row
//! counts agree.

use ndarray::{Array1, Array2, ArrayView1};

use crate::curve::TenorCurve;
use crate::error::{FtpError, FtpResult};

/// Validated, immutable view over the engine inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct InputModel {
    outstanding: Array1<f64>,
    profiles: Array2<f64>,
    rates: Array2<f64>,
}

impl InputModel {
    /// Builds a model from owned arrays.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput`-class error if:
    /// - any array is empty
    /// - `profiles` or `rates` row count differs from the outstanding length
    /// - any value is NaN or infinite
    pub fn new(
        outstanding: Array1<f64>,
        profiles: Array2<f64>,
        rates: Array2<f64>,
    ) -> FtpResult<Self> {
        let instruments = outstanding.len();
        if instruments == 0 {
            return Err(FtpError::invalid_input(
                "outstanding vector must hold at least one instrument",
            ));
        }
        if profiles.ncols() == 0 {
            return Err(FtpError::invalid_input("profile matrix has no periods"));
        }
        if rates.ncols() == 0 {
            return Err(FtpError::invalid_input("rate matrix has no tenors"));
        }
        if profiles.nrows() != instruments {
            return Err(FtpError::DimensionMismatch {
                what: "profiles",
                expected: instruments,
                got: profiles.nrows(),
            });
        }
        if rates.nrows() != instruments {
            return Err(FtpError::DimensionMismatch {
                what: "rates",
                expected: instruments,
                got: rates.nrows(),
            });
        }

        if let Some((row, value)) = outstanding
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(FtpError::NonFinite {
                what: "outstanding",
                row,
                col: 0,
                value: *value,
            });
        }
        check_finite("profiles", &profiles)?;
        check_finite("rates", &rates)?;

        Ok(Self {
            outstanding,
            profiles,
            rates,
        })
    }

    /// Builds a model from flat row-major buffers and their declared shapes.
    ///
    /// The buffers are copied; the caller's memory is not retained.
    pub fn from_row_major(
        outstanding: &[f64],
        profiles: &[f64],
        profile_shape: (usize, usize),
        rates: &[f64],
        rate_shape: (usize, usize),
    ) -> FtpResult<Self> {
        let (prof_rows, prof_cols) = profile_shape;
        let (rate_rows, rate_cols) = rate_shape;
        if prof_rows == 0 || prof_cols == 0 || rate_rows == 0 || rate_cols == 0 {
            return Err(FtpError::invalid_input("dimensions must be positive"));
        }

        let outstanding = Array1::from_vec(outstanding.to_vec());
        let profiles = Array2::from_shape_vec(profile_shape, profiles.to_vec())?;
        let rates = Array2::from_shape_vec(rate_shape, rates.to_vec())?;
        Self::new(outstanding, profiles, rates)
    }

    /// Number of instruments (`N`).
    pub fn instruments(&self) -> usize {
        self.outstanding.len()
    }

    /// Number of schedule periods (`C`).
    pub fn periods(&self) -> usize {
        self.profiles.ncols()
    }

    /// Number of curve tenors (`K`).
    pub fn tenors(&self) -> usize {
        self.rates.ncols()
    }

    /// Outstanding balances.
    pub fn outstanding(&self) -> &Array1<f64> {
        &self.outstanding
    }

    /// Repayment profiles.
    pub fn profiles(&self) -> &Array2<f64> {
        &self.profiles
    }

    /// Market rate curves.
    pub fn rates(&self) -> &Array2<f64> {
        &self.rates
    }

    /// Balance of one instrument.
    pub fn balance(&self, instrument: usize) -> f64 {
        self.outstanding[instrument]
    }

    /// Profile fraction of `instrument` at `period`.
    pub fn fraction(&self, instrument: usize, period: usize) -> f64 {
        self.profiles[[instrument, period]]
    }

    /// Market rate of `instrument` at tenor column `tenor`.
    pub fn rate(&self, instrument: usize, tenor: usize) -> f64 {
        self.rates[[instrument, tenor]]
    }

    /// Profile row of one instrument.
    pub fn profile(&self, instrument: usize) -> ArrayView1<'_, f64> {
        self.profiles.row(instrument)
    }

    /// Market curve of one instrument.
    pub fn curve(&self, instrument: usize) -> TenorCurve<'_> {
        TenorCurve::new(self.rates.row(instrument))
    }
}

fn check_finite(what: &'static str, matrix: &Array2<f64>) -> FtpResult<()> {
    match matrix.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), value)) => Err(FtpError::NonFinite {
            what,
            row,
            col,
            value: *value,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::array;

    fn model() -> InputModel {
        InputModel::new(
            array![1000.0, -250.0],
            array![[0.5, 0.5, 0.0], [0.2, 0.3, 0.5]],
            array![[0.01, 0.02], [0.03, 0.04]],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let m = model();
        assert_eq!(m.instruments(), 2);
        assert_eq!(m.periods(), 3);
        assert_eq!(m.tenors(), 2);
        assert_eq!(m.balance(1), -250.0);
        assert_eq!(m.fraction(1, 2), 0.5);
        assert_eq!(m.rate(0, 1), 0.02);
        assert_eq!(m.profile(0).to_vec(), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_negative_balance_allowed() {
        assert!(InputModel::new(array![-1.0], array![[1.0]], array![[0.01]]).is_ok());
    }

    #[test]
    fn test_empty_outstanding_rejected() {
        let err = InputModel::new(
            Array1::zeros(0),
            Array2::zeros((0, 2)),
            Array2::zeros((0, 1)),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_profile_row_mismatch_rejected() {
        let err = InputModel::new(
            array![1000.0, 1200.0],
            array![[1.0, 0.5]],
            array![[0.01], [0.02]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            FtpError::DimensionMismatch {
                what: "profiles",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_rate_row_mismatch_rejected() {
        let err = InputModel::new(array![1000.0], array![[1.0]], array![[0.01], [0.02]])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_nan_rejected() {
        let err = InputModel::new(
            array![1000.0],
            array![[0.5, f64::NAN]],
            array![[0.01]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FtpError::NonFinite {
                what: "profiles",
                row: 0,
                col: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_infinite_balance_rejected() {
        let err = InputModel::new(array![f64::INFINITY], array![[1.0]], array![[0.01]])
            .unwrap_err();
        assert!(matches!(err, FtpError::NonFinite { what: "outstanding", .. }));
    }

    #[test]
    fn test_from_row_major_copies() {
        let mut profiles = vec![0.5, 0.5, 0.25, 0.75];
        let m = InputModel::from_row_major(
            &[100.0, 200.0],
            &profiles,
            (2, 2),
            &[0.01, 0.02],
            (2, 1),
        )
        .unwrap();
        profiles[0] = 9.0;
        assert_eq!(m.fraction(0, 0), 0.5);
        assert_eq!(m.fraction(1, 1), 0.75);
    }

    #[test]
    fn test_from_row_major_short_buffer_rejected() {
        let err = InputModel::from_row_major(&[100.0], &[0.5], (1, 2), &[0.01], (1, 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_from_row_major_zero_dims_rejected() {
        let err = InputModel::from_row_major(&[100.0], &[], (1, 0), &[0.01], (1, 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
