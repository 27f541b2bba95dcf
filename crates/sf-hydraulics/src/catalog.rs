//! Commercial pipe sizes.

use sf_core::units::{Length, mm};

use crate::error::{HydraulicsError, HydraulicsResult};

/// One commercial size: inner and outer diameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeSize {
    pub inner: Length,
    pub outer: Length,
}

impl PipeSize {
    pub fn from_mm(inner_mm: f64, outer_mm: f64) -> Self {
        Self {
            inner: mm(inner_mm),
            outer: mm(outer_mm),
        }
    }

    /// Wall thickness (outer minus inner diameter).
    pub fn wall(&self) -> Length {
        self.outer - self.inner
    }
}

/// Immutable list of commercial sizes ordered by inner diameter.
#[derive(Clone, Debug, PartialEq)]
pub struct CommercialPipeCatalog {
    name: String,
    sizes: Vec<PipeSize>,
}

impl CommercialPipeCatalog {
    /// Build a catalog; sizes are sorted and checked.
    pub fn new(name: impl Into<String>, mut sizes: Vec<PipeSize>) -> HydraulicsResult<Self> {
        if sizes.is_empty() {
            return Err(HydraulicsError::InvalidArg {
                what: "catalog must list at least one size",
            });
        }
        for size in &sizes {
            if !(size.inner.value > 0.0) || size.outer <= size.inner {
                return Err(HydraulicsError::InvalidArg {
                    what: "catalog sizes need 0 < inner < outer",
                });
            }
        }
        sizes.sort_by(|a, b| a.inner.value.total_cmp(&b.inner.value));
        if sizes.windows(2).any(|w| w[0].inner == w[1].inner) {
            return Err(HydraulicsError::InvalidArg {
                what: "catalog inner diameters must be unique",
            });
        }
        Ok(Self {
            name: name.into(),
            sizes,
        })
    }

    /// PVC sewer pipes.
    pub fn pvc() -> Self {
        let sizes = [
            (153.6, 160.0),
            (192.2, 200.0),
            (240.2, 250.0),
            (302.6, 315.0),
            (384.2, 400.0),
            (480.4, 500.0),
            (605.4, 630.0),
        ]
        .into_iter()
        .map(|(inner, outer)| PipeSize::from_mm(inner, outer))
        .collect();
        Self {
            name: "PVC".to_string(),
            sizes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sizes(&self) -> &[PipeSize] {
        &self.sizes
    }

    pub fn smallest(&self) -> PipeSize {
        self.sizes[0]
    }

    pub fn largest(&self) -> PipeSize {
        // Non-empty by construction
        self.sizes[self.sizes.len() - 1]
    }

    /// Smallest size whose inner diameter is at least `required`.
    pub fn select(&self, required: Length) -> HydraulicsResult<PipeSize> {
        self.sizes
            .iter()
            .find(|s| s.inner >= required)
            .copied()
            .ok_or_else(|| HydraulicsError::OutOfCatalogRange {
                required_mm: required.value * 1_000.0,
                largest_mm: self.largest().inner.value * 1_000.0,
            })
    }
}
