//! Time-domain solver for lumped-parameter vascular networks.
//!
//! A [`Model`] numbers the unknowns of a validated network of blocks and owns
//! the [`SparseSystem`] they assemble into. [`GeneralizedAlpha`] advances a
//! [`State`] in time, solving
//!
//! `E(y, t) ẏ + F(y, t) y + c(y, ẏ, t) = 0`
//!
//! with Newton's method at every step.

pub mod dof;
pub mod error;
pub mod integrator;
pub mod model;
pub mod sparse;
pub mod state;

pub use dof::DofHandler;
pub use error::{SolverError, SolverResult};
pub use integrator::{
    GeneralizedAlpha, IntegratorConfig, IntegratorStatus, StepOutcome, steady_initial,
};
pub use model::Model;
pub use sparse::{Layer, SparseSystem};
pub use state::State;
