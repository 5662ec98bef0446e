//! Check kinds and classification results

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HealthError;

/// The health checks the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    /// Offline appliances with hours since their last critical event.
    OfflineUnits,
    /// Online replicating machines whose lag exceeds the threshold.
    IdleUnits,
    /// Online database hosts whose lag exceeds the threshold.
    LaggingDbHosts,
}

impl CheckKind {
    pub const ALL: [CheckKind; 3] = [Self::OfflineUnits, Self::IdleUnits, Self::LaggingDbHosts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OfflineUnits => "offline-units",
            Self::IdleUnits => "idle-units",
            Self::LaggingDbHosts => "lagging-db-hosts",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OfflineUnits => "Offline units",
            Self::IdleUnits => "Idle units",
            Self::LaggingDbHosts => "Lagging DB hosts",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown check '{}' (expected one of: offline-units, idle-units, lagging-db-hosts)",
                    s
                )
            })
    }
}

/// One element of a check's result stream.
#[derive(Debug)]
pub enum ClassificationResult {
    /// A classified unit: display name plus hours offline or lag seconds.
    Unit { name: String, value: Option<f64> },

    /// The check failed; this is the only element of its stream.
    Failure(HealthError),
}

impl ClassificationResult {
    pub fn unit(name: impl Into<String>, value: f64) -> Self {
        Self::Unit {
            name: name.into(),
            value: Some(value),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}
