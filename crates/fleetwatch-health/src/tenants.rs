//! Tenant lookup table

use std::collections::HashMap;

use fleetwatch_clients::InventoryClient;
use fleetwatch_types::{Tenant, TenantId};
use tracing::{debug, warn};

use crate::error::{HealthError, HealthResult};

/// Identifier -> tenant lookup built from one tenant listing.
#[derive(Debug, Clone, Default)]
pub struct TenantIndex {
    tenants: HashMap<TenantId, Tenant>,
}

impl TenantIndex {
    /// Fetch all tenants and index them. Either the whole index is built or
    /// the fetch error is returned.
    pub async fn build(inventory: &dyn InventoryClient) -> HealthResult<Self> {
        let tenants = inventory
            .fetch_tenants()
            .await
            .map_err(HealthError::inventory("tenants"))?;

        let index = Self::from_tenants(tenants);
        debug!(tenants = index.len(), "built tenant index");
        Ok(index)
    }

    /// Index an already fetched listing.
    ///
    /// Upstream ids are unique. Should a duplicate appear anyway, the first
    /// record is kept and the duplicate is logged.
    pub fn from_tenants(tenants: impl IntoIterator<Item = Tenant>) -> Self {
        let mut map = HashMap::new();
        for tenant in tenants {
            if map.contains_key(&tenant.id) {
                warn!(tenant = %tenant.id, "duplicate tenant id in listing");
                continue;
            }
            map.insert(tenant.id.clone(), tenant);
        }
        Self { tenants: map }
    }

    pub fn get(&self, id: &TenantId) -> Option<&Tenant> {
        self.tenants.get(id)
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}
