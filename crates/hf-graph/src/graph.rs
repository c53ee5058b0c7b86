//! Frozen network topology.

use hf_core::{BlockId, NodeId, PortId};

/// Which side of a block a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Flow enters the block through this node.
    Inlet,
    /// Flow leaves the block through this node.
    Outlet,
}

/// A connection point. The solver gives each node a pressure and a flow
/// unknown; the node itself holds nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub block: BlockId,
    pub node: NodeId,
    pub kind: PortKind,
}

/// A block's name and ports, inlets first then outlets, each in the order
/// given to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub id: BlockId,
    pub name: String,
    pub ports: Vec<PortId>,
    pub(crate) inlet_count: usize,
}

impl BlockInfo {
    pub fn inlets(&self) -> &[PortId] {
        &self.ports[..self.inlet_count]
    }

    pub fn outlets(&self) -> &[PortId] {
        &self.ports[self.inlet_count..]
    }
}

/// The two ports meeting at a node: the feeding block's outlet and the
/// draining block's inlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLink {
    pub upstream: PortId,
    pub downstream: PortId,
}

/// Validated, immutable network. Nodes, blocks and ports are stored at the
/// index of their id.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) blocks: Vec<BlockInfo>,
    pub(crate) ports: Vec<Port>,
    pub(crate) links: Vec<NodeLink>,
}

impl Network {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index() as usize)
    }

    pub fn block(&self, id: BlockId) -> Option<&BlockInfo> {
        self.blocks.get(id.index() as usize)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.index() as usize)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn block_by_name(&self, name: &str) -> Option<&BlockInfo> {
        self.blocks.iter().find(|b| b.name == name)
    }

    pub fn link(&self, node: NodeId) -> Option<NodeLink> {
        self.links.get(node.index() as usize).copied()
    }

    /// The block listing `node` as an outlet.
    pub fn upstream_block(&self, node: NodeId) -> Option<BlockId> {
        self.link(node)
            .and_then(|l| self.port(l.upstream))
            .map(|p| p.block)
    }

    /// The block listing `node` as an inlet.
    pub fn downstream_block(&self, node: NodeId) -> Option<BlockId> {
        self.link(node)
            .and_then(|l| self.port(l.downstream))
            .map(|p| p.block)
    }

    pub fn block_nodes(&self, block: BlockId) -> Vec<NodeId> {
        self.block(block)
            .map(|b| self.port_nodes(&b.ports))
            .unwrap_or_default()
    }

    pub fn block_inlet_nodes(&self, block: BlockId) -> Vec<NodeId> {
        self.block(block)
            .map(|b| self.port_nodes(b.inlets()))
            .unwrap_or_default()
    }

    pub fn block_outlet_nodes(&self, block: BlockId) -> Vec<NodeId> {
        self.block(block)
            .map(|b| self.port_nodes(b.outlets()))
            .unwrap_or_default()
    }

    fn port_nodes(&self, ports: &[PortId]) -> Vec<NodeId> {
        ports
            .iter()
            .filter_map(|&p| self.port(p).map(|port| port.node))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_info_splits_inlets_and_outlets() {
        let block = BlockInfo {
            id: BlockId::from_index(0),
            name: "J0".into(),
            ports: vec![PortId::from_index(10), PortId::from_index(11), PortId::from_index(12)],
            inlet_count: 1,
        };
        assert_eq!(block.inlets(), &[PortId::from_index(10)]);
        assert_eq!(block.outlets().len(), 2);
        assert_eq!(block.outlets()[1].index(), 12);
    }

    #[test]
    fn unknown_ids_yield_nothing() {
        let network = Network {
            nodes: Vec::new(),
            blocks: Vec::new(),
            ports: Vec::new(),
            links: Vec::new(),
        };
        assert!(network.link(NodeId::from_index(0)).is_none());
        assert!(network.upstream_block(NodeId::from_index(0)).is_none());
        assert!(network.block_nodes(BlockId::from_index(3)).is_empty());
    }
}
