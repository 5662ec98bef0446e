//! Project name resolution

use std::sync::Arc;

use fleetwatch_clients::InventoryClient;
use fleetwatch_types::ProjectId;
use tracing::debug;

use crate::error::{HealthError, HealthResult};

/// Turns configured project names into project identifiers.
pub struct ProjectResolver {
    inventory: Arc<dyn InventoryClient>,
}

impl ProjectResolver {
    pub fn new(inventory: Arc<dyn InventoryClient>) -> Self {
        Self { inventory }
    }

    /// Resolve every name in order, one lookup per name.
    ///
    /// Duplicates are looked up again. The first failed lookup aborts the
    /// whole resolution.
    pub async fn resolve(&self, names: &[String]) -> HealthResult<Vec<ProjectId>> {
        let mut ids = Vec::with_capacity(names.len());

        for name in names {
            let project = self.inventory.fetch_project(name).await.map_err(|source| {
                HealthError::ProjectLookup {
                    project: name.clone(),
                    source,
                }
            })?;
            debug!(project = %name, id = %project.id, "resolved project");
            ids.push(project.id);
        }

        Ok(ids)
    }
}
