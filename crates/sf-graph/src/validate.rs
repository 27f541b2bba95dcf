//! Graph validation logic.

use std::collections::VecDeque;

use sf_core::{LinkId, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Link, Node};

/// Validate link endpoints and the dendritic shape; returns the outgoing link of every node.
pub(crate) fn validate_structure(
    nodes: &[Node],
    links: &[Link],
) -> GraphResult<Vec<Option<LinkId>>> {
    let mut outgoing: Vec<Option<LinkId>> = vec![None; nodes.len()];

    for link in links {
        for node in [link.upstream, link.downstream] {
            if node.slot() >= nodes.len() {
                return Err(GraphError::InvalidNodeRef {
                    link: link.id,
                    node,
                });
            }
        }

        if link.upstream == link.downstream {
            return Err(GraphError::SelfLoop { link: link.id });
        }

        // At most one link may drain each node
        let slot = &mut outgoing[link.upstream.slot()];
        if let Some(first) = *slot {
            return Err(GraphError::MultipleOutgoing {
                node: link.upstream,
                first,
                second: link.id,
            });
        }
        *slot = Some(link.id);
    }

    Ok(outgoing)
}

/// Topologically order the links (Kahn's algorithm over nodes).
///
/// Fails with `Cycle` if some node is never released.
pub(crate) fn upstream_first_order(
    nodes: &[Node],
    links: &[Link],
    outgoing: &[Option<LinkId>],
) -> GraphResult<Vec<LinkId>> {
    let mut in_degree = vec![0_usize; nodes.len()];
    for link in links {
        in_degree[link.downstream.slot()] += 1;
    }

    let mut ready: VecDeque<NodeId> = nodes
        .iter()
        .filter(|n| in_degree[n.id.slot()] == 0)
        .map(|n| n.id)
        .collect();

    let mut order = Vec::with_capacity(links.len());
    let mut released = 0;
    while let Some(node) = ready.pop_front() {
        released += 1;
        if let Some(link_id) = outgoing[node.slot()] {
            order.push(link_id);
            let down = links[link_id.slot()].downstream;
            in_degree[down.slot()] -= 1;
            if in_degree[down.slot()] == 0 {
                ready.push_back(down);
            }
        }
    }

    if released != nodes.len() {
        let stuck = nodes
            .iter()
            .find(|n| in_degree[n.id.slot()] > 0)
            .map_or(NodeId::from_index(0), |n| n.id);
        return Err(GraphError::Cycle { node: stuck });
    }

    Ok(order)
}
