//! Shared building blocks for the hemoflow crates: unit systems and clinical
//! conversions, float helpers, typed network ids and the common error type.

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{HfError, HfResult};
pub use ids::{BlockId, DenseId, NodeId, PortId};
pub use numeric::*;
pub use units::UnitSystem;
