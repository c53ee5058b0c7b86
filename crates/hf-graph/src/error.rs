use hf_core::{BlockId, HfError, NodeId, PortId};
use thiserror::Error;

/// Topology errors found while freezing a network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("{port} points at missing {node}")]
    UnknownNode { port: PortId, node: NodeId },

    #[error("{port} points at missing {block}")]
    UnknownBlock { port: PortId, block: BlockId },

    #[error("block '{name}' has no inlets or outlets")]
    NoPorts { name: String },

    #[error("block '{name}' touches {node} more than once")]
    DuplicateNode { name: String, node: NodeId },

    #[error("{port} is listed by {listed_by} but belongs to {owner}")]
    PortBlockMismatch {
        port: PortId,
        listed_by: BlockId,
        owner: BlockId,
    },

    /// Every node needs exactly one feeding block and one draining block.
    #[error(
        "node '{name}' joins {upstream} upstream and {downstream} downstream blocks, \
         expected one of each"
    )]
    DanglingNode {
        name: String,
        upstream: usize,
        downstream: usize,
    },

    #[error("name '{name}' is used more than once")]
    DuplicateName { name: String },

    #[error("{what} is not part of the network")]
    IdNotFound { what: &'static str },
}

impl From<GraphError> for HfError {
    fn from(err: GraphError) -> Self {
        HfError::Invariant {
            what: err.to_string(),
        }
    }
}
