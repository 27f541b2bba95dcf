//! Assembled drainage network: topology, conduits and subcatchments.

use sf_core::{LinkId, NodeId};
use sf_graph::Graph;
use sf_hydraulics::Conduit;
use sf_hydrology::Subcatchment;

use crate::error::{SimError, SimResult};

/// A subcatchment and the node receiving its discharge.
#[derive(Clone, Debug)]
pub struct CatchmentInlet {
    pub subcatchment: Subcatchment,
    pub node: NodeId,
}

/// Everything a run mutates, checked for consistency once.
#[derive(Clone, Debug)]
pub struct Network {
    graph: Graph,
    conduits: Vec<Conduit>,
    catchments: Vec<CatchmentInlet>,
}

impl Network {
    /// `conduits[i]` must describe link `i` of `graph`.
    pub fn new(
        graph: Graph,
        conduits: Vec<Conduit>,
        catchments: Vec<CatchmentInlet>,
    ) -> SimResult<Self> {
        if conduits.len() != graph.links().len() {
            return Err(SimError::InvalidArg {
                what: "one conduit per link is required",
            });
        }
        for (link, conduit) in graph.links().iter().zip(&conduits) {
            if conduit.id != link.id {
                return Err(SimError::InvalidArg {
                    what: "conduits must be listed in link order",
                });
            }
            if conduit.upstream.node != link.upstream || conduit.downstream.node != link.downstream
            {
                return Err(SimError::InvalidArg {
                    what: "conduit ends do not match link endpoints",
                });
            }
        }
        if catchments.iter().any(|c| graph.node(c.node).is_none()) {
            return Err(SimError::InvalidArg {
                what: "subcatchment drains into an unknown node",
            });
        }
        Ok(Self {
            graph,
            conduits,
            catchments,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn conduits(&self) -> &[Conduit] {
        &self.conduits
    }

    pub fn conduit(&self, id: LinkId) -> Option<&Conduit> {
        self.conduits.get(id.slot())
    }

    pub fn catchments(&self) -> &[CatchmentInlet] {
        &self.catchments
    }

    pub(crate) fn parts_mut(&mut self) -> (&Graph, &mut [Conduit], &mut [CatchmentInlet]) {
        (&self.graph, &mut self.conduits, &mut self.catchments)
    }
}
