//! Strongly-typed identifiers for inventory and metrics records
//!
//! Identifiers are opaque strings assigned by the upstream systems
//! (e.g. `Machines-42`, `Tenants-7`), wrapped in newtypes so a tenant id can
//! never be passed where a project id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a machine in the inventory system
    MachineId
);

string_id!(
    /// Identifier of a tenant in the inventory system
    TenantId
);

string_id!(
    /// Identifier of a project in the inventory system
    ProjectId
);

string_id!(
    /// Identifier of a lifecycle event
    EventId
);

string_id!(
    /// Identifier of a metric in the metrics service
    MetricId
);

string_id!(
    /// Identifier of the element (monitored entity) owning a metric
    ElementId
);

string_id!(
    /// Key joining a tenant to its replication-lag samples.
    ///
    /// On the inventory side the key is the value of a tenant variable; on
    /// the metrics side it is derived from the metric's fully qualified name
    /// (see [`Metric::correlation_key`](crate::Metric::correlation_key)).
    /// The two are compared verbatim.
    CorrelationKey
);
