//! Checks run by [`NetworkBuilder::build`](crate::NetworkBuilder::build).

use std::collections::HashSet;

use hf_core::{HfResult, NodeId};

use crate::error::GraphError;
use crate::graph::{BlockInfo, Node, NodeLink, Port, PortKind};

/// Every port points at an existing node and block, and every block lists its
/// own ports without touching a node twice.
pub(crate) fn check_ports(nodes: &[Node], blocks: &[BlockInfo], ports: &[Port]) -> HfResult<()> {
    for port in ports {
        if port.node.index() as usize >= nodes.len() {
            return Err(GraphError::UnknownNode {
                port: port.id,
                node: port.node,
            }
            .into());
        }
        if port.block.index() as usize >= blocks.len() {
            return Err(GraphError::UnknownBlock {
                port: port.id,
                block: port.block,
            }
            .into());
        }
    }

    for block in blocks {
        if block.ports.is_empty() {
            return Err(GraphError::NoPorts {
                name: block.name.clone(),
            }
            .into());
        }
        let mut touched: HashSet<NodeId> = HashSet::with_capacity(block.ports.len());
        for &id in &block.ports {
            let port = ports
                .get(id.index() as usize)
                .ok_or(GraphError::IdNotFound { what: "block port" })?;
            if port.block != block.id {
                return Err(GraphError::PortBlockMismatch {
                    port: id,
                    listed_by: block.id,
                    owner: port.block,
                }
                .into());
            }
            if !touched.insert(port.node) {
                return Err(GraphError::DuplicateNode {
                    name: block.name.clone(),
                    node: port.node,
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Node names and block names are each unique.
pub(crate) fn check_names(nodes: &[Node], blocks: &[BlockInfo]) -> HfResult<()> {
    fn unique<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), GraphError> {
        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name) {
                return Err(GraphError::DuplicateName { name: name.into() });
            }
        }
        Ok(())
    }
    unique(nodes.iter().map(|n| n.name.as_str()))?;
    unique(blocks.iter().map(|b| b.name.as_str()))?;
    Ok(())
}

/// Pair every node with the outlet port feeding it and the inlet port
/// draining it.
pub(crate) fn link_nodes(nodes: &[Node], ports: &[Port]) -> HfResult<Vec<NodeLink>> {
    let mut upstream = vec![Vec::new(); nodes.len()];
    let mut downstream = vec![Vec::new(); nodes.len()];
    for port in ports {
        let slot = port.node.index() as usize;
        match port.kind {
            PortKind::Outlet => upstream[slot].push(port.id),
            PortKind::Inlet => downstream[slot].push(port.id),
        }
    }
    nodes
        .iter()
        .zip(upstream.iter().zip(&downstream))
        .map(|(node, (up, down))| match (up.as_slice(), down.as_slice()) {
            (&[upstream], &[downstream]) => Ok(NodeLink {
                upstream,
                downstream,
            }),
            _ => Err(GraphError::DanglingNode {
                name: node.name.clone(),
                upstream: up.len(),
                downstream: down.len(),
            }
            .into()),
        })
        .collect()
}
