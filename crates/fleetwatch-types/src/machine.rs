//! Machine records from the inventory system

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{MachineId, TenantId};

/// Role tags the reconciliation checks care about.
pub mod roles {
    /// On-premises appliance; the primary subject of offline detection.
    pub const APPLIANCE: &str = "appliance";

    /// Linux host running the replication agent.
    pub const LINUX_HOST: &str = "linux-host";

    /// Database host; the secondary fleet class with its own replication check.
    pub const DB_HOST: &str = "db-host";
}

/// Health status reported by the inventory system for a machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MachineStatus {
    Online,
    Offline,
    Disabled,
    Unknown,
    NeedsUpgrade,
    CalamariNeedsUpgrade,
    /// Any status this crate does not know about, kept verbatim.
    Other(String),
}

impl MachineStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MachineStatus::Online => "Online",
            MachineStatus::Offline => "Offline",
            MachineStatus::Disabled => "Disabled",
            MachineStatus::Unknown => "Unknown",
            MachineStatus::NeedsUpgrade => "NeedsUpgrade",
            MachineStatus::CalamariNeedsUpgrade => "CalamariNeedsUpgrade",
            MachineStatus::Other(s) => s,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, MachineStatus::Offline)
    }
}

impl From<String> for MachineStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Online" => MachineStatus::Online,
            "Offline" => MachineStatus::Offline,
            "Disabled" => MachineStatus::Disabled,
            "Unknown" => MachineStatus::Unknown,
            "NeedsUpgrade" => MachineStatus::NeedsUpgrade,
            "CalamariNeedsUpgrade" => MachineStatus::CalamariNeedsUpgrade,
            _ => MachineStatus::Other(s),
        }
    }
}

impl From<MachineStatus> for String {
    fn from(status: MachineStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A machine (deployment target) as returned by the inventory system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Machine {
    /// Machine identifier
    pub id: MachineId,

    /// Display name
    pub name: String,

    /// Current health status
    pub status: MachineStatus,

    /// Role tags
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Tenants owning this machine
    #[serde(default)]
    pub tenant_ids: BTreeSet<TenantId>,
}

impl Machine {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: MachineStatus) -> Self {
        Self {
            id: MachineId::new(id),
            name: name.into(),
            status,
            roles: BTreeSet::new(),
            tenant_ids: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_ids.insert(TenantId::new(tenant));
        self
    }

    /// Does this machine carry the given role tag?
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Does this machine carry at least one of the given role tags?
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.roles.contains(*r))
    }
}
