//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FtpError, FtpResult};

/// Configuration for an [`Engine`](crate::Engine) run.
///
/// Controls the interest accrual convention and per-instrument parallelism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of periods per year. Annual rates are divided by this to
    /// accrue one period of interest (12 for monthly schedules).
    pub periods_per_year: u32,

    /// Enable parallel processing (requires the `parallel` feature).
    pub parallel: bool,

    /// Minimum instrument count to trigger parallel processing.
    /// Below this threshold, sequential is faster due to thread overhead.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            periods_per_year: 12,
            parallel: true,
            parallel_threshold: 256,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always uses sequential processing.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Sets the number of accrual periods per year.
    #[must_use]
    pub fn with_periods_per_year(mut self, periods: u32) -> Self {
        self.periods_per_year = periods;
        self
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel processing.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Checks the settings are usable.
    pub fn validate(&self) -> FtpResult<()> {
        if self.periods_per_year == 0 {
            return Err(FtpError::invalid_input("periods_per_year must be positive"));
        }
        Ok(())
    }

    /// Returns true if parallel processing should be used for the given count.
    #[must_use]
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }

    pub(crate) fn accrual_divisor(&self) -> f64 {
        f64::from(self.periods_per_year)
    }
}
