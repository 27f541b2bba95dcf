//! Project validation logic.

use crate::schema::{
    CatalogDef, InternalRoutingDef, LinkDef, Project, RainfallDef, SizingDef, SubcatchmentDef,
    SurfaceDef, TimeDef,
};
use sf_core::TimeGrid;
use sf_core::time::parse_timestamp;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_positive(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn require_pct(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, value, "must be within 0..=100"))
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_time(&project.time)?;
    validate_rainfall(&project.rainfall)?;
    validate_catalog(&project.catalog)?;
    validate_sizing(&project.sizing)?;

    let runoff = &project.runoff;
    require_positive("runoff.abs_tol", runoff.abs_tol)?;
    require_positive("runoff.rel_tol", runoff.rel_tol)?;
    require_positive("runoff.min_step_s", runoff.min_step_s)?;
    if runoff.max_step_s < runoff.min_step_s {
        return Err(invalid(
            "runoff.max_step_s",
            runoff.max_step_s,
            "must not be smaller than min_step_s",
        ));
    }
    if !(runoff.evaporation_mm_per_hour >= 0.0) {
        return Err(invalid(
            "runoff.evaporation_mm_per_hour",
            runoff.evaporation_mm_per_hour,
            "must not be negative",
        ));
    }
    require_positive("runoff.flow_conversion", runoff.flow_conversion)?;

    let mut node_ids = HashSet::new();
    for node in &project.nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: "nodes".to_string(),
            });
        }
        if !node.terrain_elevation_m.is_finite() {
            return Err(invalid(
                format!("node '{}' terrain_elevation_m", node.id),
                node.terrain_elevation_m,
                "must be finite",
            ));
        }
    }

    let mut link_ids = HashSet::new();
    for link in &project.links {
        if !link_ids.insert(link.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: link.id.clone(),
                context: "links".to_string(),
            });
        }
        validate_link(link, &node_ids)?;
    }

    let mut subcatchment_ids = HashSet::new();
    for sub in &project.subcatchments {
        if !subcatchment_ids.insert(sub.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: sub.id.clone(),
                context: "subcatchments".to_string(),
            });
        }
        validate_subcatchment(sub, &node_ids)?;
    }

    Ok(())
}

fn validate_time(time: &TimeDef) -> Result<(), ValidationError> {
    let start =
        parse_timestamp(&time.start).map_err(|_| invalid("time.start", &time.start, "not RFC 3339"))?;
    let end = parse_timestamp(&time.end).map_err(|_| invalid("time.end", &time.end, "not RFC 3339"))?;
    if end <= start {
        return Err(invalid("time.end", &time.end, "must be after time.start"));
    }
    if time.runoff_step_s <= 0 {
        return Err(invalid("time.runoff_step_s", time.runoff_step_s, "must be positive"));
    }
    if time.routing_step() <= 0 {
        return Err(invalid("time.routing_step_s", time.routing_step(), "must be positive"));
    }
    // Routing samples runoff, so the runoff grid must reach the last routing instant
    let last = |step| TimeGrid::new(start, end, step).map(|g| g.last());
    if matches!(
        (last(time.runoff_step_s), last(time.routing_step())),
        (Ok(runoff), Ok(routing)) if routing > runoff
    ) {
        return Err(invalid(
            "time.routing_step_s",
            time.routing_step(),
            "routing grid ends after the last runoff instant",
        ));
    }
    Ok(())
}

fn validate_rainfall(rainfall: &RainfallDef) -> Result<(), ValidationError> {
    match rainfall {
        RainfallDef::Record { samples } => {
            if samples.is_empty() {
                return Err(invalid("rainfall.samples", "[]", "record needs at least one sample"));
            }
            let mut seen = HashSet::new();
            for sample in samples {
                let t = parse_timestamp(&sample.time)
                    .map_err(|_| invalid("rainfall.samples.time", &sample.time, "not RFC 3339"))?;
                if !seen.insert(t) {
                    return Err(ValidationError::DuplicateId {
                        id: sample.time.clone(),
                        context: "rainfall samples".to_string(),
                    });
                }
                if !(sample.intensity_mm_per_hour >= 0.0 && sample.intensity_mm_per_hour.is_finite()) {
                    return Err(invalid(
                        "rainfall.samples.intensity_mm_per_hour",
                        sample.intensity_mm_per_hour,
                        "must be finite and not negative",
                    ));
                }
            }
        }
        RainfallDef::DesignStorms { a, n, count } => {
            require_positive("rainfall.a", *a)?;
            if !n.is_finite() {
                return Err(invalid("rainfall.n", n, "must be finite"));
            }
            if *count == 0 {
                return Err(invalid("rainfall.count", count, "must be positive"));
            }
        }
    }
    Ok(())
}

fn validate_catalog(catalog: &CatalogDef) -> Result<(), ValidationError> {
    if let CatalogDef::Custom { name, sizes } = catalog {
        if sizes.is_empty() {
            return Err(invalid("catalog.sizes", name, "custom catalog has no sizes"));
        }
        let mut inner = HashSet::new();
        for size in sizes {
            require_positive("catalog.sizes.inner_mm", size.inner_mm)?;
            if !(size.outer_mm > size.inner_mm) {
                return Err(invalid(
                    "catalog.sizes.outer_mm",
                    size.outer_mm,
                    "must exceed inner_mm",
                ));
            }
            if !inner.insert(size.inner_mm.to_bits()) {
                return Err(ValidationError::DuplicateId {
                    id: size.inner_mm.to_string(),
                    context: format!("catalog '{}' sizes", name),
                });
            }
        }
    }
    Ok(())
}

fn validate_sizing(sizing: &SizingDef) -> Result<(), ValidationError> {
    if !(sizing.fill_coefficient > 0.0 && sizing.fill_coefficient < 1.0) {
        return Err(invalid(
            "sizing.fill_coefficient",
            sizing.fill_coefficient,
            "must be within (0, 1)",
        ));
    }
    require_positive("sizing.max_shear_stress_pa", sizing.max_shear_stress_pa)?;
    if !(sizing.minimum_excavation_m >= 0.0) {
        return Err(invalid(
            "sizing.minimum_excavation_m",
            sizing.minimum_excavation_m,
            "must not be negative",
        ));
    }
    require_positive("sizing.nominal_min_slope", sizing.nominal_min_slope)
}

fn validate_link(link: &LinkDef, node_ids: &HashSet<&str>) -> Result<(), ValidationError> {
    for node_id in [&link.from_node_id, &link.to_node_id] {
        if !node_ids.contains(node_id.as_str()) {
            return Err(ValidationError::MissingReference {
                id: node_id.clone(),
                context: format!("link '{}'", link.id),
            });
        }
    }
    if link.from_node_id == link.to_node_id {
        return Err(invalid(
            format!("link '{}' to_node_id", link.id),
            &link.to_node_id,
            "link must join two different nodes",
        ));
    }
    require_positive(format!("link '{}' length_m", link.id), link.length_m)?;
    require_positive(format!("link '{}' roughness", link.id), link.roughness)
}

fn validate_surface(context: &str, surface: &SurfaceDef) -> Result<(), ValidationError> {
    if !(surface.depression_storage_mm >= 0.0) {
        return Err(invalid(
            format!("{context} depression_storage_mm"),
            surface.depression_storage_mm,
            "must not be negative",
        ));
    }
    require_positive(format!("{context} roughness"), surface.roughness)
}

fn validate_subcatchment(
    sub: &SubcatchmentDef,
    node_ids: &HashSet<&str>,
) -> Result<(), ValidationError> {
    if !node_ids.contains(sub.node_id.as_str()) {
        return Err(ValidationError::MissingReference {
            id: sub.node_id.clone(),
            context: format!("subcatchment '{}'", sub.id),
        });
    }
    let ctx = format!("subcatchment '{}'", sub.id);
    require_positive(format!("{ctx} area_m2"), sub.area_m2)?;
    require_positive(format!("{ctx} slope"), sub.slope)?;
    require_positive(format!("{ctx} width_m"), sub.width_m)?;
    require_pct(format!("{ctx} impervious_pct"), sub.impervious_pct)?;
    require_pct(
        format!("{ctx} impervious_without_storage_pct"),
        sub.impervious_without_storage_pct,
    )?;
    validate_surface(&format!("{ctx} pervious"), &sub.pervious)?;
    validate_surface(&format!("{ctx} impervious"), &sub.impervious)?;
    match sub.routing {
        InternalRoutingDef::Outlet => Ok(()),
        InternalRoutingDef::PerviousToImpervious { routed_pct }
        | InternalRoutingDef::ImperviousToPervious { routed_pct } => {
            require_pct(format!("{ctx} routed_pct"), routed_pct)
        }
    }
}
