//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub time: TimeDef,
    pub rainfall: RainfallDef,
    #[serde(default)]
    pub runoff: RunoffDef,
    #[serde(default)]
    pub catalog: CatalogDef,
    #[serde(default)]
    pub sizing: SizingDef,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
    #[serde(default)]
    pub subcatchments: Vec<SubcatchmentDef>,
}

/// Simulation window and step sizes. Timestamps are RFC 3339.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeDef {
    pub start: String,
    pub end: String,
    pub runoff_step_s: i64,
    /// Defaults to the runoff step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_step_s: Option<i64>,
}

impl TimeDef {
    pub fn routing_step(&self) -> i64 {
        self.routing_step_s.unwrap_or(self.runoff_step_s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RainfallDef {
    /// Measured record, run as a single scenario.
    Record { samples: Vec<RainSampleDef> },
    /// Rectangular storms from `h = a·t^n` (mm, hours), one scenario each.
    DesignStorms { a: f64, n: f64, count: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RainSampleDef {
    pub time: String,
    pub intensity_mm_per_hour: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum IntegratorDef {
    #[default]
    DormandPrince,
    RK4,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunoffDef {
    #[serde(default)]
    pub integrator: IntegratorDef,
    #[serde(default = "default_tolerance")]
    pub abs_tol: f64,
    #[serde(default = "default_tolerance")]
    pub rel_tol: f64,
    #[serde(default = "default_min_step")]
    pub min_step_s: f64,
    #[serde(default = "default_max_step")]
    pub max_step_s: f64,
    #[serde(default)]
    pub evaporation_mm_per_hour: f64,
    #[serde(default = "default_flow_conversion")]
    pub flow_conversion: f64,
}

impl Default for RunoffDef {
    fn default() -> Self {
        Self {
            integrator: IntegratorDef::default(),
            abs_tol: default_tolerance(),
            rel_tol: default_tolerance(),
            min_step_s: default_min_step(),
            max_step_s: default_max_step(),
            evaporation_mm_per_hour: 0.0,
            flow_conversion: default_flow_conversion(),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-5
}

fn default_min_step() -> f64 {
    1e-8
}

fn default_max_step() -> f64 {
    1e3
}

fn default_flow_conversion() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum CatalogDef {
    #[default]
    Pvc,
    Custom {
        name: String,
        sizes: Vec<PipeSizeDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeSizeDef {
    pub inner_mm: f64,
    pub outer_mm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizingDef {
    #[serde(default = "default_fill")]
    pub fill_coefficient: f64,
    #[serde(default = "default_shear")]
    pub max_shear_stress_pa: f64,
    #[serde(default = "default_excavation")]
    pub minimum_excavation_m: f64,
    #[serde(default = "default_min_slope")]
    pub nominal_min_slope: f64,
}

impl Default for SizingDef {
    fn default() -> Self {
        Self {
            fill_coefficient: default_fill(),
            max_shear_stress_pa: default_shear(),
            minimum_excavation_m: default_excavation(),
            nominal_min_slope: default_min_slope(),
        }
    }
}

fn default_fill() -> f64 {
    0.8
}

fn default_shear() -> f64 {
    2.0
}

fn default_excavation() -> f64 {
    1.0
}

fn default_min_slope() -> f64 {
    0.001
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: String,
    pub terrain_elevation_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDef {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub length_m: f64,
    /// Gauckler-Strickler coefficient (m^(1/3)/s)
    pub roughness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubcatchmentDef {
    pub id: String,
    pub node_id: String,
    pub area_m2: f64,
    pub slope: f64,
    pub width_m: f64,
    pub impervious_pct: f64,
    #[serde(default)]
    pub impervious_without_storage_pct: f64,
    pub pervious: SurfaceDef,
    pub impervious: SurfaceDef,
    #[serde(default)]
    pub routing: InternalRoutingDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurfaceDef {
    pub depression_storage_mm: f64,
    /// Manning coefficient of the overland flow
    pub roughness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum InternalRoutingDef {
    #[default]
    Outlet,
    PerviousToImpervious {
        routed_pct: f64,
    },
    ImperviousToPervious {
        routed_pct: f64,
    },
}
