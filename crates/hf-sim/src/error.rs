//! Error types for simulation instances.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown instance: {id}")]
    UnknownInstance { id: String },

    #[error("Instance already exists: {id}")]
    DuplicateInstance { id: String },

    #[error("Compile error: {message}")]
    Compile { message: String },

    #[error(transparent)]
    Solver(#[from] hf_solver::SolverError),

    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn compile(message: impl Into<String>) -> Self {
        SimError::Compile {
            message: message.into(),
        }
    }

    pub(crate) fn snapshot(message: impl Into<String>) -> Self {
        SimError::Snapshot {
            message: message.into(),
        }
    }
}

impl From<hf_components::ComponentError> for SimError {
    fn from(e: hf_components::ComponentError) -> Self {
        SimError::compile(e.to_string())
    }
}

impl From<hf_core::HfError> for SimError {
    fn from(e: hf_core::HfError) -> Self {
        SimError::compile(e.to_string())
    }
}

impl From<hf_project::ValidationError> for SimError {
    fn from(e: hf_project::ValidationError) -> Self {
        SimError::compile(e.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::snapshot(e.to_string())
    }
}
