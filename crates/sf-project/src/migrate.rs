//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Project;

/// Version 1 is the first released schema; there is nothing older to upgrade.
pub const LATEST_VERSION: u32 = 1;

/// Bring `project` to [`LATEST_VERSION`].
///
/// Newer versions pass through unchanged and are reported by validation.
pub fn migrate_to_latest(project: Project) -> Result<Project, ProjectError> {
    if project.version < LATEST_VERSION {
        return Err(ProjectError::Migration {
            what: format!("No migration path from version {}", project.version),
        });
    }
    Ok(project)
}
