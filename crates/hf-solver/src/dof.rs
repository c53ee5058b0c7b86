//! Degree-of-freedom bookkeeping.

use std::collections::HashMap;
use std::ops::Range;

use crate::error::{SolverError, SolverResult};

/// Registry of named global variables and contiguous equation ranges.
#[derive(Debug, Clone, Default)]
pub struct DofHandler {
    variables: Vec<String>,
    lookup: HashMap<String, usize>,
    equations: usize,
}

impl DofHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_variable(&mut self, name: impl Into<String>) -> SolverResult<usize> {
        let name = name.into();
        if self.lookup.contains_key(&name) {
            return Err(SolverError::config(format!("duplicate variable {name}")));
        }
        let id = self.variables.len();
        self.lookup.insert(name.clone(), id);
        self.variables.push(name);
        Ok(id)
    }

    /// Reserve the next `count` equation rows.
    pub fn register_equations(&mut self, count: usize) -> Range<usize> {
        let start = self.equations;
        self.equations += count;
        start..self.equations
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_equations(&self) -> usize {
        self.equations
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }
}
