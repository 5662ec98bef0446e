//! Reconciliation engine
//!
//! Joins machines, tenants, projects and samples into per-check maps of
//! display name -> value. Every inventory or metrics failure aborts the
//! check that hit it; there are no partial results and no retries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use fleetwatch_clients::InventoryClient;
use fleetwatch_types::{EventQuery, ProjectId};
use tracing::{debug, info, instrument};

use crate::error::{HealthError, HealthResult};
use crate::filter::MachineFilter;
use crate::resolver::ProjectResolver;
use crate::result::CheckKind;
use crate::samples::SampleFetcher;
use crate::tenants::TenantIndex;

/// Lag above which a unit counts as not replicating, in seconds.
pub const LAG_THRESHOLD_SECS: f64 = 600.0;

/// Tenant variable holding the correlation key shared with the metrics service.
pub const CORRELATION_VARIABLE: &str = "UAID";

/// Classified units: tenant display name -> hours offline or lag seconds.
pub type UnitMap = HashMap<String, f64>;

/// Health checks for one inventory scope.
pub struct ReconciliationEngine {
    inventory: Arc<dyn InventoryClient>,
    samples: Arc<SampleFetcher>,
}

impl ReconciliationEngine {
    pub fn new(inventory: Arc<dyn InventoryClient>, samples: Arc<SampleFetcher>) -> Self {
        Self { inventory, samples }
    }

    /// Resolve configured project names against this scope's inventory.
    pub async fn resolve_projects(&self, names: &[String]) -> HealthResult<Vec<ProjectId>> {
        ProjectResolver::new(Arc::clone(&self.inventory))
            .resolve(names)
            .await
    }

    /// Run one check by kind.
    pub async fn run(&self, check: CheckKind, projects: &[ProjectId]) -> HealthResult<UnitMap> {
        match check {
            CheckKind::OfflineUnits => self.check_offline_units(projects).await,
            CheckKind::IdleUnits => self.check_idle_units(projects).await,
            CheckKind::LaggingDbHosts => self.check_lagging_db_hosts(projects).await,
        }
    }

    /// Offline appliances owned by in-scope tenants, with hours since the
    /// machine's latest critical event.
    ///
    /// A tenant owning several offline machines keeps the duration of the
    /// last one visited.
    #[instrument(skip(self, projects), fields(projects = projects.len()))]
    pub async fn check_offline_units(&self, projects: &[ProjectId]) -> HealthResult<UnitMap> {
        let (machines, tenants) = futures::try_join!(
            MachineFilter::OfflineCritical.select(self.inventory.as_ref()),
            TenantIndex::build(self.inventory.as_ref()),
        )?;

        let now = Utc::now();
        let mut units = UnitMap::new();

        for machine in &machines {
            let in_scope: Vec<_> = machine
                .tenant_ids
                .iter()
                .filter_map(|id| tenants.get(id))
                .filter(|tenant| tenant.belongs_to_any(projects))
                .collect();

            if in_scope.is_empty() {
                debug!(machine = %machine.id, "offline machine has no in-scope tenant");
                continue;
            }

            let events = self
                .inventory
                .fetch_events(&EventQuery::latest_critical(&machine.id))
                .await
                .map_err(HealthError::inventory("events"))?;

            let event = events.first().ok_or_else(|| HealthError::NoCriticalEvent {
                machine: machine.id.clone(),
            })?;
            let hours = event.hours_since(now);

            for tenant in in_scope {
                units.insert(tenant.name.clone(), hours);
            }
        }

        info!(offline = units.len(), "offline check complete");
        Ok(units)
    }

    /// Online replicating machines whose tenant's lag exceeds the threshold.
    #[instrument(skip(self, projects), fields(projects = projects.len()))]
    pub async fn check_idle_units(&self, projects: &[ProjectId]) -> HealthResult<UnitMap> {
        self.check_lagging(MachineFilter::OnlineCandidate, projects)
            .await
    }

    /// Online database hosts whose tenant's lag exceeds the threshold.
    #[instrument(skip(self, projects), fields(projects = projects.len()))]
    pub async fn check_lagging_db_hosts(&self, projects: &[ProjectId]) -> HealthResult<UnitMap> {
        self.check_lagging(MachineFilter::DbHostCandidate, projects)
            .await
    }

    async fn check_lagging(
        &self,
        filter: MachineFilter,
        projects: &[ProjectId],
    ) -> HealthResult<UnitMap> {
        let (machines, tenants) = futures::try_join!(
            filter.select(self.inventory.as_ref()),
            TenantIndex::build(self.inventory.as_ref()),
        )?;
        let samples = self.samples.samples().await?;

        let mut units = UnitMap::new();

        for machine in &machines {
            for tenant in machine.tenant_ids.iter().filter_map(|id| tenants.get(id)) {
                if units.contains_key(&tenant.name) {
                    continue;
                }

                let Some(lag) = tenant
                    .correlation_key(CORRELATION_VARIABLE)
                    .and_then(|key| samples.lag(&key))
                else {
                    continue;
                };

                if lag > LAG_THRESHOLD_SECS && tenant.belongs_to_any(projects) {
                    units.insert(tenant.name.clone(), lag);
                }
            }
        }

        info!(filter = ?filter, lagging = units.len(), "lag check complete");
        Ok(units)
    }
}
