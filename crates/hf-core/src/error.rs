use thiserror::Error;

pub type HfResult<T> = Result<T, HfError>;

/// Errors shared by the lower layers (ids, graph construction, numerics).
#[derive(Error, Debug)]
pub enum HfError {
    #[error("{what} is not finite ({value})")]
    NonFinite { what: &'static str, value: f64 },

    #[error("invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("broken invariant: {what}")]
    Invariant { what: String },
}
