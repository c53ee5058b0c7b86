//! hf-components: block library for lumped-parameter vascular networks.
//!
//! Every element (vessel, junction, boundary condition, heart) implements the
//! [`Block`] trait and contributes rows to the global system
//! `E(y, t) ẏ + F(y, t) y + c(y, ẏ, t) = 0` through a [`BlockStamp`], using
//! only local equation and variable indices.
//!
//! # Example
//!
//! ```
//! use hf_components::{Block, BlockDofs, BlockStamp, DenseAssembly, ResistiveVessel};
//!
//! let mut vessel = ResistiveVessel::with_resistance("aorta", 100.0).unwrap();
//! let dofs = BlockDofs {
//!     vars: vec![0, 1, 2, 3],
//!     eqs: vec![0, 1],
//!     inlets: 1,
//!     outlets: 1,
//!     internals: 0,
//! };
//! let mut sink = DenseAssembly::new(4);
//! vessel.update_constant(&mut BlockStamp::new(&mut sink, &dofs));
//!
//! let r = sink.residual(&[500.0, 5.0, 0.0, 5.0], &[0.0; 4]);
//! assert!(r.iter().all(|v| v.abs() < 1e-12));
//! ```

pub mod activation;
pub mod boundary;
pub mod chamber;
pub mod closed_loop_rcr;
pub mod common;
pub mod coronary;
pub mod error;
pub mod heart;
pub mod junction;
pub mod parameter;
pub mod stamp;
pub mod traits;
pub mod vessel;

// Re-exports
pub use activation::{Activation, ActivationShape};
pub use boundary::{
    FlowReferenceBc, OpenLoopCoronaryBc, PressureReferenceBc, ResistanceBc, WindkesselBc,
};
pub use chamber::LinearElastanceChamber;
pub use closed_loop_rcr::ClosedLoopRcrBc;
pub use common::ParamSet;
pub use coronary::{ClosedLoopCoronaryBc, CoronarySide};
pub use error::{ComponentError, ComponentResult};
pub use heart::{CardiacPhase, ClosedLoopHeartPulmonary, HeartActivation, ValveState, Valves};
pub use junction::Junction;
pub use parameter::{Parameter, ParameterKind};
pub use stamp::{Assembly, BlockDofs, BlockStamp, DenseAssembly, LocalState, StampAudit};
pub use traits::{Block, BlockKind, Coupling, ParamSpec};
pub use vessel::{BloodVessel, BloodVesselCrl, ResistiveVessel};
