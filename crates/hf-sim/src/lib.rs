//! hf-sim: compiled model instances, stepping and restart.
//!
//! Provides:
//! - Compilation of a [`hf_project::ModelDescription`] into a solver model
//! - [`SolverInterface`], a registry of named instances stepped by an
//!   external caller, with restart snapshots
//! - A simulation runner with decimated recording

pub mod compile;
pub mod error;
pub mod interface;
pub mod sim;

pub use compile::{compile, initial_state, integrator_config};
pub use error::{SimError, SimResult};
pub use interface::{Instance, Snapshot, Solution, SolverInterface};
pub use sim::{Advance, SimOptions, SimRecord, advance_to, run_sim};
