//! Incremental graph builder.

use std::collections::HashMap;

use sf_core::{LinkId, NodeId};

use crate::error::GraphResult;
use crate::graph::{Graph, Link, Node};
use crate::validate;

/// Builder for constructing a network incrementally.
///
/// Use `add_node` and `add_link` to build up the network,
/// then call `build()` to validate and freeze it into an immutable `Graph`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    links: Vec<Link>,
    next_node_id: u32,
    next_link_id: u32,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the network and return its ID.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.push(Node {
            id,
            name: name.into(),
        });
        id
    }

    /// Add a link draining `upstream` into `downstream`.
    pub fn add_link(
        &mut self,
        name: impl Into<String>,
        upstream: NodeId,
        downstream: NodeId,
    ) -> LinkId {
        let id = LinkId::from_index(self.next_link_id);
        self.next_link_id += 1;
        self.links.push(Link {
            id,
            name: name.into(),
            upstream,
            downstream,
        });
        id
    }

    /// Build and validate the network, returning an immutable `Graph`.
    pub fn build(self) -> GraphResult<Graph> {
        let outgoing = validate::validate_structure(&self.nodes, &self.links)?;
        let link_order = validate::upstream_first_order(&self.nodes, &self.links, &outgoing)?;
        let (incoming_offsets, incoming) = Self::build_incoming(&self.nodes, &self.links);

        Ok(Graph {
            nodes: self.nodes,
            links: self.links,
            incoming_offsets,
            incoming,
            outgoing,
            link_order,
        })
    }

    /// Build compact adjacency lists: for each node, collect the links discharging into it.
    fn build_incoming(nodes: &[Node], links: &[Link]) -> (Vec<usize>, Vec<LinkId>) {
        let mut node_to_links: HashMap<NodeId, Vec<LinkId>> = HashMap::new();
        for link in links {
            node_to_links
                .entry(link.downstream)
                .or_default()
                .push(link.id);
        }

        // Sort each node's link list for determinism
        for list in node_to_links.values_mut() {
            list.sort();
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);

        for node in nodes {
            if let Some(list) = node_to_links.get(&node.id) {
                flat.extend_from_slice(list);
            }
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_basic() {
        let mut builder = GraphBuilder::new();
        let n1 = builder.add_node("Node1");
        let n2 = builder.add_node("Node2");
        let l1 = builder.add_link("Link1", n1, n2);

        assert_eq!(n1.index(), 0);
        assert_eq!(n2.index(), 1);
        assert_eq!(l1.index(), 0);
        assert_eq!(builder.nodes.len(), 2);
        assert_eq!(builder.links.len(), 1);
    }

    #[test]
    fn builder_build_simple() {
        let mut builder = GraphBuilder::new();
        let n1 = builder.add_node("N1");
        let n2 = builder.add_node("N2");
        let l1 = builder.add_link("L1", n1, n2);

        let graph = builder.build().unwrap();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.links().len(), 1);
        assert!(graph.incoming_links(n1).is_empty());
        assert_eq!(graph.incoming_links(n2), &[l1]);
        assert_eq!(graph.upstream_first_links(), &[l1]);
    }
}
