//! Tenor-bucket market curve.
//!
//! Each instrument carries one row of the rate matrix. Column `k` of that row
//! is the annual market rate for a maturity of `k + 1` periods. Lookups use
//! the nearest bucket at or below the requested maturity and extrapolate flat
//! past the last bucket.

use ndarray::ArrayView1;

/// Read-only view over one instrument's market curve.
#[derive(Debug, Clone, Copy)]
pub struct TenorCurve<'a> {
    rates: ArrayView1<'a, f64>,
}

impl<'a> TenorCurve<'a> {
    /// Wraps a curve row.
    pub fn new(rates: ArrayView1<'a, f64>) -> Self {
        Self { rates }
    }

    /// Rate for a maturity of `periods` periods.
    ///
    /// Picks the longest bucket whose maturity does not exceed `periods`.
    /// A maturity of zero has no such bucket and yields `0.0`.
    pub fn rate_at(&self, periods: usize) -> f64 {
        if periods == 0 || self.rates.is_empty() {
            return 0.0;
        }
        self.rates[periods.min(self.rates.len()) - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_zero_maturity_has_no_bucket() {
        let rates = array![0.013, 0.014, 0.016];
        let curve = TenorCurve::new(rates.view());
        assert_eq!(curve.rate_at(0), 0.0);
    }

    #[test]
    fn test_bucket_alignment() {
        let rates = array![0.013, 0.014, 0.016];
        let curve = TenorCurve::new(rates.view());
        assert_eq!(curve.rate_at(1), 0.013);
        assert_eq!(curve.rate_at(2), 0.014);
        assert_eq!(curve.rate_at(3), 0.016);
    }

    #[test]
    fn test_flat_beyond_last_bucket() {
        let rates = array![0.02, 0.03];
        let curve = TenorCurve::new(rates.view());
        assert_eq!(curve.rate_at(7), 0.03);
    }

    #[test]
    fn test_empty_curve_is_zero() {
        let rates = ndarray::Array1::<f64>::zeros(0);
        let curve = TenorCurve::new(rates.view());
        assert_eq!(curve.rate_at(3), 0.0);
    }
}
