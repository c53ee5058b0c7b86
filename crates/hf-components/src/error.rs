use thiserror::Error;

/// A block or activation curve was given settings it cannot work with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("{context}: {what}")]
    Configuration { context: String, what: String },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl ComponentError {
    pub fn config(context: impl Into<String>, what: impl Into<String>) -> Self {
        ComponentError::Configuration {
            context: context.into(),
            what: what.into(),
        }
    }
}
