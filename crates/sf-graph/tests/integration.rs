//! Integration tests for sf-graph.

use proptest::prelude::*;
use sf_graph::{GraphBuilder, GraphError};

#[test]
fn converging_tree_topology() {
    // J1 -11-> J3 <-12- J2
    // J3 -13-> J5 <-14- J4
    // J5 -15-> Out
    let mut builder = GraphBuilder::new();
    let j1 = builder.add_node("J1");
    let j2 = builder.add_node("J2");
    let j3 = builder.add_node("J3");
    let j4 = builder.add_node("J4");
    let j5 = builder.add_node("J5");
    let out = builder.add_node("Out");
    let l11 = builder.add_link("11", j1, j3);
    let l12 = builder.add_link("12", j2, j3);
    let l13 = builder.add_link("13", j3, j5);
    let l14 = builder.add_link("14", j4, j5);
    let l15 = builder.add_link("15", j5, out);

    let graph = builder.build().unwrap();

    assert_eq!(graph.incoming_links(j3), &[l11, l12]);
    assert_eq!(graph.incoming_links(j5), &[l13, l14]);
    assert_eq!(graph.outgoing_link(j5), Some(l15));
    assert_eq!(graph.outgoing_link(out), None);
    assert_eq!(graph.upstream_links(l15), &[l13, l14]);

    let order = graph.upstream_first_links();
    assert_eq!(order.len(), 5);
    assert_eq!(*order.last().unwrap(), l15);
    let pos = |id| order.iter().position(|&l| l == id).unwrap();
    assert!(pos(l11) < pos(l13));
    assert!(pos(l12) < pos(l13));
    assert!(pos(l13) < pos(l15));
    assert!(pos(l14) < pos(l15));

    let branches = graph.converging_branches(l15);
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[&l13], vec![l13, l11, l12]);
    assert_eq!(branches[&l14], vec![l14]);

    assert!(graph.converging_branches(l11).is_empty());
}

#[test]
fn self_loop_rejected() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("A");
    builder.add_link("aa", a, a);
    assert!(matches!(
        builder.build().unwrap_err(),
        GraphError::SelfLoop { .. }
    ));
}

#[test]
fn error_messages_name_elements() {
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("A");
    let b = builder.add_node("B");
    let c = builder.add_node("C");
    builder.add_link("ab", a, b);
    builder.add_link("ac", a, c);
    let msg = builder.build().unwrap_err().to_string();
    assert!(msg.contains("drains into both"));
}

proptest! {
    /// Random in-trees: node i > 0 drains into some node j < i.
    #[test]
    fn upstream_first_respects_every_edge(parents in prop::collection::vec(any::<prop::sample::Index>(), 1..40)) {
        let mut builder = GraphBuilder::new();
        let nodes: Vec<_> = (0..=parents.len()).map(|i| builder.add_node(format!("N{i}"))).collect();
        let mut links = Vec::new();
        for (k, parent) in parents.iter().enumerate() {
            let child = k + 1;
            let down = parent.index(child);
            links.push(builder.add_link(format!("L{child}"), nodes[child], nodes[down]));
        }
        let graph = builder.build().unwrap();

        let order = graph.upstream_first_links();
        prop_assert_eq!(order.len(), links.len());
        let mut position = vec![0usize; links.len()];
        for (p, id) in order.iter().enumerate() {
            position[id.slot()] = p;
        }
        for &link in &links {
            for &up in graph.upstream_links(link) {
                prop_assert!(position[up.slot()] < position[link.slot()]);
            }
        }
    }
}
