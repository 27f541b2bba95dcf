//! Core graph data structures.

use std::collections::BTreeMap;

use sf_core::{LinkId, NodeId};

/// A junction or outfall of the drainage network.
///
/// Nodes hold no hydraulic data, just an ID and a name for human reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
}

/// A directed link (conduit) carrying flow from `upstream` to `downstream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub name: String,
    pub upstream: NodeId,
    pub downstream: NodeId,
}

/// The network: a validated, immutable, dendritic set of nodes and links.
///
/// The graph stores:
/// - All nodes and links in vectors (indexed by their IDs).
/// - Compact incoming adjacency: for each node, which links discharge into it.
/// - The single outgoing link of each node (if any).
/// - A precomputed upstream-first ordering of the links.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) links: Vec<Link>,

    /// Offsets for node->incoming links: node i's links are in incoming[incoming_offsets[i]..incoming_offsets[i+1]].
    pub(crate) incoming_offsets: Vec<usize>,

    /// Flat list of incoming link IDs (sorted by node ID then link ID for determinism).
    pub(crate) incoming: Vec<LinkId>,

    pub(crate) outgoing: Vec<Option<LinkId>>,

    pub(crate) link_order: Vec<LinkId>,
}

impl Graph {
    /// Return all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all links.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    /// Get a link by ID (returns None if ID out of bounds).
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.slot())
    }

    /// Look a node up by name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Look a link up by name.
    pub fn link_by_name(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Links discharging into a node.
    pub fn incoming_links(&self, node_id: NodeId) -> &[LinkId] {
        let idx = node_id.slot();
        if idx >= self.nodes.len() {
            return &[];
        }
        let start = self.incoming_offsets[idx];
        let end = self.incoming_offsets[idx + 1];
        &self.incoming[start..end]
    }

    /// The link draining a node, `None` for an outfall.
    pub fn outgoing_link(&self, node_id: NodeId) -> Option<LinkId> {
        self.outgoing.get(node_id.slot()).copied().flatten()
    }

    /// Nodes without an outgoing link.
    pub fn outfalls(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .map(|n| n.id)
            .filter(|&id| self.outgoing_link(id).is_none())
    }

    /// Links ordered so that every link comes after all links upstream of it.
    pub fn upstream_first_links(&self) -> &[LinkId] {
        &self.link_order
    }

    /// Links discharging into the upstream node of `link`.
    pub fn upstream_links(&self, link: LinkId) -> &[LinkId] {
        match self.link(link) {
            Some(l) => self.incoming_links(l.upstream),
            None => &[],
        }
    }

    /// `link` followed by every link upstream of it, depth first.
    pub fn subtree_links(&self, link: LinkId) -> Vec<LinkId> {
        let mut out = Vec::new();
        let mut stack = vec![link];
        while let Some(current) = stack.pop() {
            if self.link(current).is_none() {
                continue;
            }
            out.push(current);
            // Reverse so lower ids are visited first.
            stack.extend(self.upstream_links(current).iter().rev().copied());
        }
        out
    }

    /// Branches converging into the upstream junction of `link`.
    ///
    /// Keyed by the branch head (the link discharging into the junction);
    /// each value lists the head first, followed by its whole upstream subtree.
    pub fn converging_branches(&self, link: LinkId) -> BTreeMap<LinkId, Vec<LinkId>> {
        self.upstream_links(link)
            .iter()
            .map(|&head| (head, self.subtree_links(head)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;

    #[test]
    fn lookup_by_name() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("J1");
        let b = builder.add_node("J2");
        let l = builder.add_link("11", a, b);
        let graph = builder.build().unwrap();

        assert_eq!(graph.node_by_name("J2").map(|n| n.id), Some(b));
        assert_eq!(graph.link_by_name("11").map(|l| l.id), Some(l));
        assert!(graph.node_by_name("J9").is_none());
    }

    #[test]
    fn outfalls_have_no_outgoing_link() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node("A");
        let b = builder.add_node("B");
        let c = builder.add_node("C");
        builder.add_link("ab", a, b);
        let graph = builder.build().unwrap();

        let outfalls: Vec<_> = graph.outfalls().collect();
        assert_eq!(outfalls, vec![b, c]);
    }
}
