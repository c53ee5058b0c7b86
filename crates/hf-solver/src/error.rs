use hf_components::ComponentError;
use hf_core::error::HfError;
use thiserror::Error;

/// Errors that can occur while building or advancing a model.
///
/// A Newton loop that runs out of iterations is not an error; it is reported
/// through `StepOutcome::Failed`.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The model is malformed; construction cannot continue.
    #[error("invalid model: {what}")]
    Configuration { what: String },

    /// Singular linear system or non-finite values during a step.
    #[error("numerical failure: {what}")]
    Numerical { what: String },

    #[error(transparent)]
    Component(#[from] ComponentError),

    /// Network topology errors surface here through `HfError::Invariant`.
    #[error(transparent)]
    Core(#[from] HfError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub fn config(what: impl Into<String>) -> Self {
        SolverError::Configuration { what: what.into() }
    }

    pub fn numerical(what: impl Into<String>) -> Self {
        SolverError::Numerical { what: what.into() }
    }
}
