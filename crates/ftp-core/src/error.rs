//! Error types for the FTP engine.
//!
//! Every fallible operation in this crate returns [`FtpResult`]. The variants
//! map one-to-one onto the failure classes callers dispatch on, see
//! [`ErrorKind`].

use thiserror::Error;

/// A specialized Result type for FTP operations.
pub type FtpResult<T> = Result<T, FtpError>;

/// Coarse failure class of an [`FtpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or inconsistent construction arguments.
    InvalidInput,
    /// Retrieval requested before any successful compute.
    NotComputed,
    /// Destination buffer cannot hold the requested matrix.
    BufferTooSmall,
    /// Numeric or logical failure while running a method.
    ComputeFailure,
}

/// The main error type for FTP operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FtpError {
    /// Construction arguments are malformed or inconsistent.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of what is wrong with the input.
        reason: String,
    },

    /// Two inputs disagree on the instrument count.
    #[error("Dimension mismatch: {what} has {got} rows, expected {expected}")]
    DimensionMismatch {
        /// Which input disagrees.
        what: &'static str,
        /// Row count implied by the outstanding vector.
        expected: usize,
        /// Row count actually supplied.
        got: usize,
    },

    /// An input value is NaN or infinite.
    #[error("Non-finite value {value} in {what} at ({row}, {col})")]
    NonFinite {
        /// Which input holds the value.
        what: &'static str,
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The offending value.
        value: f64,
    },

    /// Outputs were requested before a successful compute.
    #[error("{what}: not yet computed")]
    NotComputed {
        /// What was requested.
        what: &'static str,
    },

    /// The destination buffer is smaller than the matrix.
    #[error("{matrix}: buffer too small ({capacity} < {required})")]
    BufferTooSmall {
        /// Matrix name.
        matrix: &'static str,
        /// Cells needed (rows x cols).
        required: usize,
        /// Cells available.
        capacity: usize,
    },

    /// The method could not produce a representable schedule.
    #[error("Compute failure: {reason}")]
    ComputeFailure {
        /// Description of the failure.
        reason: String,
    },
}

impl FtpError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a compute failure error.
    #[must_use]
    pub fn compute_failure(reason: impl Into<String>) -> Self {
        Self::ComputeFailure {
            reason: reason.into(),
        }
    }

    /// Creates a not-computed error for the named output.
    #[must_use]
    pub fn not_computed(what: &'static str) -> Self {
        Self::NotComputed { what }
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } | Self::DimensionMismatch { .. } | Self::NonFinite { .. } => {
                ErrorKind::InvalidInput
            }
            Self::NotComputed { .. } => ErrorKind::NotComputed,
            Self::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Self::ComputeFailure { .. } => ErrorKind::ComputeFailure,
        }
    }
}

impl From<ndarray::ShapeError> for FtpError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::invalid_input(format!("buffer does not match declared shape: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FtpError::DimensionMismatch {
            what: "profiles",
            expected: 3,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: profiles has 2 rows, expected 3"
        );
    }

    #[test]
    fn test_buffer_too_small_display() {
        let err = FtpError::BufferTooSmall {
            matrix: "stock_amort",
            required: 2,
            capacity: 1,
        };
        assert!(err.to_string().contains("buffer too small (1 < 2)"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(FtpError::invalid_input("x").kind(), ErrorKind::InvalidInput);
        assert_eq!(
            FtpError::NonFinite {
                what: "rates",
                row: 0,
                col: 0,
                value: f64::NAN,
            }
            .kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(FtpError::not_computed("ftp_rate").kind(), ErrorKind::NotComputed);
        assert_eq!(FtpError::compute_failure("x").kind(), ErrorKind::ComputeFailure);
    }
}
