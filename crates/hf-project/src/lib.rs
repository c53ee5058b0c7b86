//! Model descriptions: the serde schema, structural validation and YAML/JSON
//! file helpers.

use std::fs;
use std::path::Path;

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_description};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("invalid description: {0}")]
    Validation(#[from] ValidationError),

    #[error("cannot access model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn checked(description: ModelDescription) -> ProjectResult<ModelDescription> {
    validate_description(&description)?;
    Ok(description)
}

pub fn from_yaml_str(content: &str) -> ProjectResult<ModelDescription> {
    checked(serde_yaml::from_str(content)?)
}

pub fn from_json_str(content: &str) -> ProjectResult<ModelDescription> {
    checked(serde_json::from_str(content)?)
}

pub fn load_yaml(path: &Path) -> ProjectResult<ModelDescription> {
    from_yaml_str(&fs::read_to_string(path)?)
}

pub fn load_json(path: &Path) -> ProjectResult<ModelDescription> {
    from_json_str(&fs::read_to_string(path)?)
}

/// Validate, then write as YAML.
pub fn save_yaml(path: &Path, description: &ModelDescription) -> ProjectResult<()> {
    validate_description(description)?;
    fs::write(path, serde_yaml::to_string(description)?)?;
    Ok(())
}

/// Validate, then write as pretty-printed JSON.
pub fn save_json(path: &Path, description: &ModelDescription) -> ProjectResult<()> {
    validate_description(description)?;
    fs::write(path, serde_json::to_string_pretty(description)?)?;
    Ok(())
}

/// Load a description, choosing the format from the file extension
/// (`.json` is JSON, anything else YAML).
pub fn load(path: &Path) -> ProjectResult<ModelDescription> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}
