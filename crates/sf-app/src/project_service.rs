//! Project loading, saving and validation.

use std::path::Path;

use sf_project::schema::Project;

use crate::error::AppResult;

/// Load a project (YAML, or JSON by extension), migrated and validated.
pub fn load_project(path: &Path) -> AppResult<Project> {
    Ok(sf_project::load(path)?)
}

/// Save a project as YAML.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    Ok(sf_project::save_yaml(path, project)?)
}

/// Validate project structure.
pub fn validate_project(project: &Project) -> AppResult<()> {
    sf_project::validate_project(project).map_err(sf_project::ProjectError::from)?;
    Ok(())
}

/// Short description of a project for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub node_count: usize,
    pub link_count: usize,
    pub subcatchment_count: usize,
    pub total_area_m2: f64,
}

pub fn summarize(project: &Project) -> ProjectSummary {
    ProjectSummary {
        name: project.name.clone(),
        node_count: project.nodes.len(),
        link_count: project.links.len(),
        subcatchment_count: project.subcatchments.len(),
        total_area_m2: project.subcatchments.iter().map(|s| s.area_m2).sum(),
    }
}
