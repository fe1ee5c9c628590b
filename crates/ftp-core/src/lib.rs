//! # FTP Core
//!
//! Funds Transfer Pricing analytics for a portfolio of instruments.
//!
//! Given each instrument's outstanding balance, a repayment profile and a
//! market rate curve, the engine produces seven `N x C` matrices:
//!
//! - **stock_amort / stock_instal**: amortization and installments on the
//!   method's running basis
//! - **varstock_amort / varstock_instal**: the same on the frozen basis
//! - **ftp_rate / ftp_int**: transfer rate and interest of the remaining
//!   balance
//! - **market_rate**: curve rate at the elapsed maturity
//!
//! Two conventions are available, [`ComputeMethod::Stock`] and
//! [`ComputeMethod::Flux`], sharing one amortization kernel.
//!
//! ## Example
//!
//! ```rust
//! use ftp_core::prelude::*;
//! use ndarray::array;
//!
//! let input = InputModel::new(
//!     array![1000.0],
//!     array![[0.5, 0.5]],
//!     array![[0.05, 0.05, 0.05]],
//! )?;
//!
//! let mut engine = Engine::new(input);
//! engine.compute(ComputeMethod::Stock)?;
//!
//! assert_eq!(engine.dimensions()?, (1, 2));
//! let amort = engine.matrix(OutputKind::StockAmort)?;
//! assert_eq!(amort.sum(), 1000.0);
//! # Ok::<(), FtpError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod input;
pub mod kernel;
pub mod methods;
pub mod output;
pub mod parallel;

pub use config::EngineConfig;
pub use curve::TenorCurve;
pub use engine::{compute_flux, compute_stock, Engine, EngineState};
pub use error::{ErrorKind, FtpError, FtpResult};
pub use input::InputModel;
pub use methods::{AmortizationMethod, ComputeMethod, FluxMethod, StockMethod};
pub use output::{OutputKind, OutputSet};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{compute_flux, compute_stock, Engine, EngineState};
    pub use crate::error::{ErrorKind, FtpError, FtpResult};
    pub use crate::input::InputModel;
    pub use crate::methods::{ComputeMethod, FluxMethod, StockMethod};
    pub use crate::output::{OutputKind, OutputSet};
}
