//! Contiguous solver numbering for nodes and blocks.

use hf_core::{BlockId, DenseId, HfResult, NodeId};

use crate::error::GraphError;
use crate::graph::Network;

/// Ids in solver order plus the inverse lookup.
#[derive(Debug, Clone)]
struct Dense<I> {
    order: Vec<I>,
    slot_of: Vec<Option<usize>>,
}

impl<I: DenseId> Dense<I> {
    fn new(order: Vec<I>) -> Self {
        let len = order.iter().map(|id| id.index() as usize + 1).max().unwrap_or(0);
        let mut slot_of = vec![None; len];
        for (slot, id) in order.iter().enumerate() {
            slot_of[id.index() as usize] = Some(slot);
        }
        Self { order, slot_of }
    }

    fn slot(&self, id: I, what: &'static str) -> HfResult<usize> {
        self.slot_of
            .get(id.index() as usize)
            .copied()
            .flatten()
            .ok_or_else(|| GraphError::IdNotFound { what }.into())
    }
}

/// Maps node and block ids to `0..n` in network order. Node `i` owns solver
/// variables `2i` and `2i + 1`.
#[derive(Debug, Clone)]
pub struct IndexMap {
    nodes: Dense<NodeId>,
    blocks: Dense<BlockId>,
}

impl IndexMap {
    pub fn from_network(network: &Network) -> Self {
        Self {
            nodes: Dense::new(network.nodes().iter().map(|n| n.id).collect()),
            blocks: Dense::new(network.blocks().iter().map(|b| b.id).collect()),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.order.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.order.len()
    }

    pub fn node_idx(&self, id: NodeId) -> HfResult<usize> {
        self.nodes.slot(id, "node")
    }

    pub fn block_idx(&self, id: BlockId) -> HfResult<usize> {
        self.blocks.slot(id, "block")
    }

    pub fn node_id(&self, i: usize) -> Option<NodeId> {
        self.nodes.order.get(i).copied()
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.nodes.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NetworkBuilder;

    fn chain() -> (Network, Vec<NodeId>, Vec<BlockId>) {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.add_node("N1");
        let n2 = builder.add_node("N2");
        let b0 = builder.add_block("IN", &[], &[n1]);
        let b1 = builder.add_block("V", &[n1], &[n2]);
        let b2 = builder.add_block("OUT", &[n2], &[]);
        (builder.build().unwrap(), vec![n1, n2], vec![b0, b1, b2])
    }

    #[test]
    fn slots_invert_ids() {
        let (network, nodes, blocks) = chain();
        let map = IndexMap::from_network(&network);
        assert_eq!((map.node_count(), map.block_count()), (2, 3));
        for &n in &nodes {
            let i = map.node_idx(n).unwrap();
            assert_eq!(map.node_id(i), Some(n));
        }
        assert_eq!(map.block_idx(blocks[2]).unwrap(), 2);
        assert_eq!(map.node_id(5), None);
    }

    #[test]
    fn foreign_id_is_an_error() {
        let (network, _, _) = chain();
        let map = IndexMap::from_network(&network);
        let err = map.node_idx(NodeId::from_index(999)).unwrap_err();
        assert!(err.to_string().contains("node is not part of the network"));
    }
}
