//! Machine selection by status and role

use fleetwatch_clients::InventoryClient;
use fleetwatch_types::{roles, Machine};
use tracing::debug;

use crate::error::{HealthError, HealthResult};

/// Roles of machines that replicate and are watched for lag.
pub const REPLICATING_ROLES: [&str; 3] = [roles::APPLIANCE, roles::LINUX_HOST, roles::DB_HOST];

/// A status and role predicate over machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineFilter {
    /// Offline appliances.
    OfflineCritical,

    /// Machines that are not offline and carry a replicating role.
    OnlineCandidate,

    /// Database hosts that are not offline.
    DbHostCandidate,
}

impl MachineFilter {
    pub fn matches(&self, machine: &Machine) -> bool {
        let offline = machine.status.is_offline();
        match self {
            Self::OfflineCritical => offline && machine.has_role(roles::APPLIANCE),
            Self::OnlineCandidate => !offline && machine.has_any_role(&REPLICATING_ROLES),
            Self::DbHostCandidate => !offline && machine.has_role(roles::DB_HOST),
        }
    }

    /// Keep matching machines in listing order.
    pub fn apply(&self, machines: Vec<Machine>) -> Vec<Machine> {
        machines.into_iter().filter(|m| self.matches(m)).collect()
    }

    /// Fetch the full machine listing and keep matching machines.
    pub async fn select(&self, inventory: &dyn InventoryClient) -> HealthResult<Vec<Machine>> {
        let machines = inventory
            .fetch_machines()
            .await
            .map_err(HealthError::inventory("machines"))?;

        let total = machines.len();
        let selected = self.apply(machines);
        debug!(filter = ?self, total, selected = selected.len(), "filtered machines");
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwatch_types::MachineStatus;

    fn machine(id: &str, status: MachineStatus, role: &str) -> Machine {
        Machine::new(id, id, status).with_role(role)
    }

    #[test]
    fn test_offline_critical() {
        let filter = MachineFilter::OfflineCritical;
        assert!(filter.matches(&machine("m1", MachineStatus::Offline, roles::APPLIANCE)));
        assert!(!filter.matches(&machine("m2", MachineStatus::Online, roles::APPLIANCE)));
        assert!(!filter.matches(&machine("m3", MachineStatus::Offline, roles::LINUX_HOST)));
    }

    #[test]
    fn test_online_candidate_accepts_any_replicating_role() {
        let filter = MachineFilter::OnlineCandidate;
        for role in REPLICATING_ROLES {
            assert!(filter.matches(&machine("m", MachineStatus::Online, role)));
        }
        // Anything other than Offline counts as online.
        assert!(filter.matches(&machine("m", MachineStatus::Disabled, roles::APPLIANCE)));
        assert!(!filter.matches(&machine("m", MachineStatus::Offline, roles::APPLIANCE)));
        assert!(!filter.matches(&machine("m", MachineStatus::Online, "web-server")));
    }

    #[test]
    fn test_db_host_candidate() {
        let filter = MachineFilter::DbHostCandidate;
        assert!(filter.matches(&machine("m", MachineStatus::Online, roles::DB_HOST)));
        assert!(!filter.matches(&machine("m", MachineStatus::Online, roles::APPLIANCE)));
        assert!(!filter.matches(&machine("m", MachineStatus::Offline, roles::DB_HOST)));
    }

    #[test]
    fn test_apply_preserves_order_and_duplicates() {
        let machines = vec![
            machine("m3", MachineStatus::Online, roles::APPLIANCE),
            machine("m1", MachineStatus::Offline, roles::APPLIANCE),
            machine("m2", MachineStatus::Online, roles::DB_HOST),
            machine("m3", MachineStatus::Online, roles::APPLIANCE),
        ];

        let ids: Vec<_> = MachineFilter::OnlineCandidate
            .apply(machines)
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, vec!["m3", "m2", "m3"]);
    }
}
