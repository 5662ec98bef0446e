//! Error types for fleetwatch-health.

use fleetwatch_clients::ClientError;
use fleetwatch_types::MachineId;
use thiserror::Error;

/// Errors that abort a single check.
#[derive(Debug, Error)]
pub enum HealthError {
    /// An inventory call failed or returned an unexpected shape.
    #[error("inventory call '{call}' failed: {source}")]
    Inventory {
        call: &'static str,
        source: ClientError,
    },

    /// A metrics call failed or returned an unexpected shape.
    #[error("metrics call '{call}' failed: {source}")]
    Metrics {
        call: &'static str,
        source: ClientError,
    },

    /// A configured project name could not be resolved.
    #[error("failed to resolve project '{project}': {source}")]
    ProjectLookup {
        project: String,
        source: ClientError,
    },

    /// An offline machine has no "machine critical" event to date its outage.
    #[error("no machine critical event found for machine {machine}")]
    NoCriticalEvent { machine: MachineId },

    /// The memoized sample cache holds a failed population.
    #[error("sample cache unavailable: {0}")]
    SampleCache(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HealthError {
    pub(crate) fn inventory(call: &'static str) -> impl FnOnce(ClientError) -> Self {
        move |source| Self::Inventory { call, source }
    }
}

/// Result type for health operations.
pub type HealthResult<T> = Result<T, HealthError>;
