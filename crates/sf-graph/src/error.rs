//! Graph-specific error types.

use sf_core::{LinkId, NodeId};

pub type GraphResult<T> = Result<T, GraphError>;

/// Network construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A link refers to a node that doesn't exist.
    InvalidNodeRef { link: LinkId, node: NodeId },

    /// A link starts and ends at the same node.
    SelfLoop { link: LinkId },

    /// A node drains into more than one link (the network must be dendritic).
    MultipleOutgoing {
        node: NodeId,
        first: LinkId,
        second: LinkId,
    },

    /// The links form a cycle through the given node.
    Cycle { node: NodeId },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidNodeRef { link, node } => {
                write!(f, "Link {} refers to non-existent node {}", link, node)
            }
            GraphError::SelfLoop { link } => {
                write!(f, "Link {} connects a node to itself", link)
            }
            GraphError::MultipleOutgoing {
                node,
                first,
                second,
            } => {
                write!(
                    f,
                    "Node {} drains into both link {} and link {}",
                    node, first, second
                )
            }
            GraphError::Cycle { node } => {
                write!(f, "Links form a cycle through node {}", node)
            }
        }
    }
}

impl std::error::Error for GraphError {}
