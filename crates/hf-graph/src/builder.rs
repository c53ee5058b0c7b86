//! Incremental network construction.

use hf_core::{BlockId, HfResult, NodeId, PortId};

use crate::graph::{BlockInfo, Network, Node, Port, PortKind};
use crate::validate;

/// Collects nodes and blocks, then checks and freezes them with [`build`].
///
/// Ids are handed out densely in insertion order, so the n-th node added has
/// `NodeId::from_index(n)`.
///
/// [`build`]: NetworkBuilder::build
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    blocks: Vec<BlockInfo>,
    ports: Vec<Port>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name: name.into(),
        });
        id
    }

    /// Add a block between `inlets` and `outlets`. One port is created per
    /// listed node, inlets first.
    pub fn add_block(
        &mut self,
        name: impl Into<String>,
        inlets: &[NodeId],
        outlets: &[NodeId],
    ) -> BlockId {
        let block = BlockId::from_index(self.blocks.len() as u32);
        let ends = inlets
            .iter()
            .map(|&node| (node, PortKind::Inlet))
            .chain(outlets.iter().map(|&node| (node, PortKind::Outlet)));
        let ports = ends
            .map(|(node, kind)| {
                let id = PortId::from_index(self.ports.len() as u32);
                self.ports.push(Port {
                    id,
                    block,
                    node,
                    kind,
                });
                id
            })
            .collect();
        self.blocks.push(BlockInfo {
            id: block,
            name: name.into(),
            ports,
            inlet_count: inlets.len(),
        });
        block
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check references, names and node connectivity, then freeze.
    pub fn build(self) -> HfResult<Network> {
        validate::check_ports(&self.nodes, &self.blocks, &self.ports)?;
        validate::check_names(&self.nodes, &self.blocks)?;
        let links = validate::link_nodes(&self.nodes, &self.ports)?;
        Ok(Network {
            nodes: self.nodes,
            blocks: self.blocks,
            ports: self.ports,
            links,
        })
    }
}
