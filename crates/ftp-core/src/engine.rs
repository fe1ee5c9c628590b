//! The FTP engine.
//!
//! An [`Engine`] owns a validated [`InputModel`] and, after a successful
//! [`Engine::compute`], the [`OutputSet`] of that run. A failed compute leaves
//! the engine as it was: state and previous outputs are unchanged.

use std::fmt;

use log::{debug, warn};
use ndarray::Array2;

use crate::config::EngineConfig;
use crate::error::{FtpError, FtpResult};
use crate::input::InputModel;
use crate::methods::{ComputeMethod, InstrumentSchedule};
use crate::output::{OutputKind, OutputSet};
use crate::parallel::maybe_parallel_map;

/// Lifecycle state of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Inputs validated, nothing computed yet.
    Validated,
    /// A compute succeeded; holds the method of the latest success.
    Computed(ComputeMethod),
}

/// Owns the inputs and the latest outputs of an FTP computation.
#[derive(Debug, Clone)]
pub struct Engine {
    input: InputModel,
    config: EngineConfig,
    output: Option<OutputSet>,
    state: EngineState,
}

impl Engine {
    /// Creates an engine with the default configuration.
    pub fn new(input: InputModel) -> Self {
        Self {
            input,
            config: EngineConfig::default(),
            output: None,
            state: EngineState::Validated,
        }
    }

    /// Creates an engine with a custom configuration.
    pub fn with_config(input: InputModel, config: EngineConfig) -> FtpResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(input)
        })
    }

    /// Validates flat row-major buffers and creates an engine over copies.
    pub fn from_row_major(
        outstanding: &[f64],
        profiles: &[f64],
        profile_shape: (usize, usize),
        rates: &[f64],
        rate_shape: (usize, usize),
    ) -> FtpResult<Self> {
        let input =
            InputModel::from_row_major(outstanding, profiles, profile_shape, rates, rate_shape)?;
        Ok(Self::new(input))
    }

    /// Runs `method` and replaces the outputs on success.
    ///
    /// # Errors
    ///
    /// Returns `ComputeFailure` if any instrument cannot be scheduled or an
    /// output cell is not finite. State and previous outputs are unchanged.
    pub fn compute(&mut self, method: ComputeMethod) -> FtpResult<()> {
        debug!(
            "computing {} for {} instruments over {} periods",
            method,
            self.input.instruments(),
            self.input.periods()
        );

        match run(&self.input, &self.config, method) {
            Ok(output) => {
                debug!("{method} compute complete");
                self.output = Some(output);
                self.state = EngineState::Computed(method);
                Ok(())
            }
            Err(err) => {
                warn!("{method} compute failed: {err}");
                Err(err)
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns true if outputs are available.
    pub fn is_computed(&self) -> bool {
        self.output.is_some()
    }

    /// Shape `(instruments, periods)` shared by all output matrices.
    pub fn dimensions(&self) -> FtpResult<(usize, usize)> {
        self.computed("dimensions").map(OutputSet::dims)
    }

    /// One output matrix.
    pub fn matrix(&self, kind: OutputKind) -> FtpResult<&Array2<f64>> {
        self.computed(kind.name()).map(|set| set.get(kind))
    }

    /// Copies one output matrix row-major into `dest`.
    ///
    /// # Errors
    ///
    /// - `NotComputed` if no compute has succeeded
    /// - `BufferTooSmall` if `dest` is shorter than rows x cols; `dest` is
    ///   not modified
    pub fn copy_matrix(&self, kind: OutputKind, dest: &mut [f64]) -> FtpResult<usize> {
        self.computed(kind.name())?.copy_into(kind, dest)
    }

    /// Outputs of the last successful compute.
    pub fn output(&self) -> Option<&OutputSet> {
        self.output.as_ref()
    }

    /// Consumes the engine, returning its outputs.
    pub fn into_output(self) -> Option<OutputSet> {
        self.output
    }

    /// The validated inputs.
    pub fn input(&self) -> &InputModel {
        &self.input
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the configuration used by later computes.
    pub fn set_config(&mut self, config: EngineConfig) -> FtpResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn computed(&self, what: &'static str) -> FtpResult<&OutputSet> {
        self.output
            .as_ref()
            .ok_or_else(|| FtpError::not_computed(what))
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            EngineState::Validated => "not computed".to_string(),
            EngineState::Computed(method) => format!("computed ({method})"),
        };
        write!(
            f,
            "Engine(instruments={}, periods={}, tenors={}, {state})",
            self.input.instruments(),
            self.input.periods(),
            self.input.tenors()
        )
    }
}

/// Prices every instrument with `method` and assembles the outputs.
pub fn run(
    input: &InputModel,
    config: &EngineConfig,
    method: ComputeMethod,
) -> FtpResult<OutputSet> {
    config.validate()?;
    let strategy = method.strategy();
    let periods_per_year = config.accrual_divisor();

    let instruments: Vec<usize> = (0..input.instruments()).collect();
    let rows = maybe_parallel_map(&instruments, config, |&i| {
        strategy.price_instrument(input, i, periods_per_year)
    })
    .into_iter()
    .collect::<FtpResult<Vec<InstrumentSchedule>>>()?;

    let output = OutputSet::assemble(method, input.periods(), &rows);
    if let Some((kind, row, col, value)) = output.find_non_finite() {
        return Err(FtpError::compute_failure(format!(
            "{kind} is {value} at ({row}, {col})"
        )));
    }
    Ok(output)
}

/// Runs the Stock method with the default configuration.
pub fn compute_stock(input: &InputModel) -> FtpResult<OutputSet> {
    run(input, &EngineConfig::default(), ComputeMethod::Stock)
}

/// Runs the Flux method with the default configuration.
pub fn compute_flux(input: &InputModel) -> FtpResult<OutputSet> {
    run(input, &EngineConfig::default(), ComputeMethod::Flux)
}
