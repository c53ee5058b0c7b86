//! Structural validation of model descriptions.
//!
//! Checks here are limited to what the description alone can decide. Port
//! counts and parameter constancy are checked when blocks are built.

use std::collections::HashSet;

use crate::schema::{BlockDef, LATEST_VERSION, ModelDescription, ParameterDef, SimulationDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {name} in {context}")]
    MissingReference { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_description(description: &ModelDescription) -> Result<(), ValidationError> {
    if description.version == 0 || description.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: description.version,
        });
    }

    validate_simulation(&description.simulation)?;

    if description.blocks.is_empty() {
        return Err(invalid("blocks", 0, "model has no blocks"));
    }

    let mut nodes = HashSet::new();
    for node in &description.nodes {
        if node.is_empty() {
            return Err(invalid("nodes", "\"\"", "node names must not be empty"));
        }
        if !nodes.insert(node.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: node.clone(),
                context: "nodes".to_string(),
            });
        }
    }

    let mut blocks = HashSet::new();
    for block in &description.blocks {
        if !blocks.insert(block.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: block.name.clone(),
                context: "blocks".to_string(),
            });
        }
        validate_block(block, &nodes)?;
    }

    for (name, value) in &description.initial_condition {
        if !value.is_finite() {
            return Err(invalid(format!("initial_condition.{name}"), value, "must be finite"));
        }
    }

    Ok(())
}

fn validate_simulation(sim: &SimulationDef) -> Result<(), ValidationError> {
    if !(sim.dt > 0.0) || !sim.dt.is_finite() {
        return Err(invalid("simulation.dt", sim.dt, "must be positive"));
    }
    if !(0.0..=1.0).contains(&sim.rho) {
        return Err(invalid("simulation.rho", sim.rho, "must lie in [0, 1]"));
    }
    if !(sim.atol > 0.0) {
        return Err(invalid("simulation.atol", sim.atol, "must be positive"));
    }
    if sim.max_iter == 0 {
        return Err(invalid("simulation.max_iter", 0, "must be at least 1"));
    }
    if !(sim.damping > 0.0 && sim.damping <= 1.0) {
        return Err(invalid("simulation.damping", sim.damping, "must lie in (0, 1]"));
    }
    if !(sim.t_end >= 0.0) || !sim.t_end.is_finite() {
        return Err(invalid("simulation.t_end", sim.t_end, "must be non-negative"));
    }
    if sim.record_every == 0 {
        return Err(invalid("simulation.record_every", 0, "must be at least 1"));
    }
    Ok(())
}

fn validate_block(block: &BlockDef, nodes: &HashSet<&str>) -> Result<(), ValidationError> {
    if block.inlets.is_empty() && block.outlets.is_empty() {
        return Err(invalid(
            format!("{}.inlets", block.name),
            "[]",
            "block is not connected",
        ));
    }
    for node in block.inlets.iter().chain(&block.outlets) {
        if !nodes.contains(node.as_str()) {
            return Err(ValidationError::MissingReference {
                name: node.clone(),
                context: format!("block {}", block.name),
            });
        }
    }
    for (field, param) in block.kind.parameters() {
        validate_parameter(&format!("{}.{field}", block.name), param)?;
    }
    Ok(())
}

fn validate_parameter(field: &str, param: &ParameterDef) -> Result<(), ValidationError> {
    match param {
        ParameterDef::Constant(v) if !v.is_finite() => Err(invalid(field, v, "must be finite")),
        ParameterDef::Constant(_) => Ok(()),
        ParameterDef::Series { t, values, .. } => {
            if t.is_empty() {
                return Err(invalid(field, "[]", "time series has no samples"));
            }
            if t.len() != values.len() {
                return Err(invalid(
                    field,
                    format!("{} times, {} values", t.len(), values.len()),
                    "length mismatch",
                ));
            }
            if t.windows(2).any(|w| !(w[1] > w[0])) {
                return Err(invalid(field, "t", "times must be strictly increasing"));
            }
            Ok(())
        }
    }
}
