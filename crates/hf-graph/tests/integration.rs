//! Integration tests for hf-graph.

use hf_graph::{IndexMap, NetworkBuilder, PortKind};

#[test]
fn build_bifurcation() {
    // IN -> n0 -> [J] -> n1 -> OUT1
    //                 \-> n2 -> OUT2
    let mut builder = NetworkBuilder::new();
    let n0 = builder.add_node("n0");
    let n1 = builder.add_node("n1");
    let n2 = builder.add_node("n2");
    builder.add_block("IN", &[], &[n0]);
    let j = builder.add_block("J", &[n0], &[n1, n2]);
    builder.add_block("OUT1", &[n1], &[]);
    builder.add_block("OUT2", &[n2], &[]);

    let network = builder.build().unwrap();

    assert_eq!(network.nodes().len(), 3);
    assert_eq!(network.blocks().len(), 4);
    assert_eq!(network.ports().len(), 6);

    let junction = network.block(j).unwrap();
    assert_eq!(junction.inlets().len(), 1);
    assert_eq!(junction.outlets().len(), 2);

    let first_outlet = network.port(junction.outlets()[0]).unwrap();
    assert_eq!(first_outlet.node, n1);
    assert_eq!(first_outlet.kind, PortKind::Outlet);

    assert_eq!(network.block_inlet_nodes(j), vec![n0]);
    assert_eq!(network.block_outlet_nodes(j), vec![n1, n2]);
    assert_eq!(network.block_by_name("OUT2").map(|b| b.id.index()), Some(3));
    assert_eq!(network.node_by_name("n2").map(|n| n.id), Some(n2));
}

#[test]
fn every_node_has_two_ends() {
    let mut builder = NetworkBuilder::new();
    let n0 = builder.add_node("n0");
    builder.add_block("IN", &[], &[n0]);
    builder.add_block("OUT1", &[n0], &[]);
    builder.add_block("OUT2", &[n0], &[]);

    let err = builder.build().unwrap_err();
    assert!(format!("{err}").contains("2 downstream"));
}

#[test]
fn duplicate_block_names_rejected() {
    let mut builder = NetworkBuilder::new();
    let n0 = builder.add_node("n0");
    builder.add_block("B", &[], &[n0]);
    builder.add_block("B", &[n0], &[]);
    assert!(builder.build().is_err());
}

#[test]
fn index_map_is_contiguous() {
    let mut builder = NetworkBuilder::new();
    let n0 = builder.add_node("n0");
    let n1 = builder.add_node("n1");
    builder.add_block("IN", &[], &[n0]);
    builder.add_block("V", &[n0], &[n1]);
    builder.add_block("OUT", &[n1], &[]);
    let network = builder.build().unwrap();

    let idx = IndexMap::from_network(&network);
    assert_eq!(idx.node_idx(n0).unwrap(), 0);
    assert_eq!(idx.node_idx(n1).unwrap(), 1);
    assert_eq!(idx.node_ids(), &[n0, n1]);
}
