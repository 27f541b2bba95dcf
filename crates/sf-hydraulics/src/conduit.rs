//! Conduit state: static geometry, sizing result and end offsets.

use sf_core::units::{Length, m};
use sf_core::{LinkId, NodeId};

use crate::error::{HydraulicsError, HydraulicsResult};
use crate::routing::MuskingumCunge;
use crate::sizing::PipeDesign;

/// One end of a conduit.
#[derive(Clone, Debug, PartialEq)]
pub struct ConduitEnd {
    pub node: NodeId,
    /// Terrain elevation above datum.
    pub terrain_elevation: Length,
    /// Extra burial depth applied to this end by offset normalisation.
    pub offset: Length,
}

impl ConduitEnd {
    pub fn new(node: NodeId, terrain_elevation: Length) -> Self {
        Self {
            node,
            terrain_elevation,
            offset: m(0.0),
        }
    }
}

/// A circular conduit between two nodes.
///
/// Slope and section are unset until [`Conduit::apply_design`] is called,
/// and may be set only once.
#[derive(Clone, Debug)]
pub struct Conduit {
    pub id: LinkId,
    pub name: String,
    pub length: Length,
    /// Gauckler-Strickler coefficient (m^(1/3)/s).
    pub roughness: f64,
    pub upstream: ConduitEnd,
    pub downstream: ConduitEnd,
    design: Option<PipeDesign>,
}

impl Conduit {
    pub fn new(
        id: LinkId,
        name: impl Into<String>,
        length: Length,
        roughness: f64,
        upstream: ConduitEnd,
        downstream: ConduitEnd,
    ) -> HydraulicsResult<Self> {
        if !(length.value > 0.0 && length.value.is_finite()) {
            return Err(HydraulicsError::InvalidArg {
                what: "conduit length must be positive",
            });
        }
        if !(roughness > 0.0 && roughness.is_finite()) {
            return Err(HydraulicsError::InvalidArg {
                what: "Strickler roughness must be positive",
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            length,
            roughness,
            upstream,
            downstream,
            design: None,
        })
    }

    /// Terrain fall over the run length (m/m); may be zero or negative.
    pub fn natural_slope(&self) -> f64 {
        (self.upstream.terrain_elevation - self.downstream.terrain_elevation).value
            / self.length.value
    }

    pub fn design(&self) -> Option<&PipeDesign> {
        self.design.as_ref()
    }

    pub fn is_sized(&self) -> bool {
        self.design.is_some()
    }

    /// Fix the section and slope.
    pub fn apply_design(&mut self, design: PipeDesign) -> HydraulicsResult<()> {
        if self.design.is_some() {
            return Err(HydraulicsError::AlreadySized);
        }
        self.design = Some(design);
        Ok(())
    }

    fn sized(&self) -> HydraulicsResult<&PipeDesign> {
        self.design.as_ref().ok_or(HydraulicsError::NotSized)
    }

    /// Depth of the design water surface below terrain at the upstream end.
    pub fn upstream_water_depth(&self) -> HydraulicsResult<Length> {
        Ok(self.sized()?.water_depth + self.upstream.offset)
    }

    /// Depth of the design water surface below terrain at the downstream end.
    pub fn downstream_water_depth(&self) -> HydraulicsResult<Length> {
        Ok(self.sized()?.water_depth + self.downstream.offset)
    }

    /// Invert depths below terrain, `(upstream, downstream)`.
    pub fn invert_depths(&self) -> HydraulicsResult<(Length, Length)> {
        let exc = self.sized()?.excavation;
        Ok((exc + self.upstream.offset, exc + self.downstream.offset))
    }

    /// Invert elevations above datum, `(upstream, downstream)`.
    pub fn invert_elevations(&self) -> HydraulicsResult<(Length, Length)> {
        let (up, down) = self.invert_depths()?;
        Ok((
            self.upstream.terrain_elevation - up,
            self.downstream.terrain_elevation - down,
        ))
    }

    /// Lower both ends by `delta`.
    pub fn shift_offsets(&mut self, delta: Length) {
        self.upstream.offset += delta;
        self.downstream.offset += delta;
    }

    /// Routing parameters of the sized conduit.
    pub fn router(&self) -> HydraulicsResult<MuskingumCunge> {
        MuskingumCunge::from_design(self.length, self.sized()?)
    }
}
