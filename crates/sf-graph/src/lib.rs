//! sf-graph: drainage network topology for stormflow.
//!
//! Provides:
//! - Core graph data structures (Node, Link, Graph)
//! - Incremental graph builder with validation (dendritic, acyclic)
//! - Upstream-first link ordering and converging-branch discovery
//!
//! # Example
//!
//! ```
//! use sf_graph::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! let n1 = builder.add_node("J1");
//! let n2 = builder.add_node("Outfall");
//! let l1 = builder.add_link("11", n1, n2);
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.nodes().len(), 2);
//! assert_eq!(graph.outgoing_link(n1), Some(l1));
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Graph, Link, Node};
