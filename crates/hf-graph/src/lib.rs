//! Network topology for hemoflow: nodes, blocks and the ports joining them.
//!
//! A node is a connection point carrying one pressure and one flow unknown. It
//! joins exactly one upstream block (which lists it as an outlet) to exactly one
//! downstream block (which lists it as an inlet). Flow through a node is
//! positive in the upstream → downstream direction.
//!
//! # Example
//!
//! ```
//! use hf_graph::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::new();
//! let n1 = builder.add_node("inflow:vessel");
//! let n2 = builder.add_node("vessel:outlet");
//! builder.add_block("INFLOW", &[], &[n1]);
//! builder.add_block("vessel", &[n1], &[n2]);
//! builder.add_block("OUT", &[n2], &[]);
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.nodes().len(), 2);
//! assert_eq!(network.blocks().len(), 3);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod indexing;
pub(crate) mod validate;

pub use builder::NetworkBuilder;
pub use error::GraphError;
pub use graph::{BlockInfo, Network, Node, NodeLink, Port, PortKind};
pub use indexing::IndexMap;
