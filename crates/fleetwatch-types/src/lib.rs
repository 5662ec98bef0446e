//! Fleetwatch Types - Data model for fleet reconciliation
//!
//! Fleetwatch answers one operational question: which monitored hosts in a
//! fleet are unhealthy right now? It joins records from two independent
//! systems:
//!
//! - a **deployment/inventory manager** that knows machines, tenants,
//!   projects and lifecycle events
//! - a **metrics service** that holds replication-lag time series
//!
//! ## Key Concepts
//!
//! - **Machine**: a monitored host with a status, role tags and owning tenants
//! - **Tenant**: a customer/site record carrying project memberships and a
//!   variable map; the `UAID` variable is the cross-system correlation key
//! - **Project**: a named deployment project, referenced by id once resolved
//! - **Event**: a lifecycle event; only "machine critical" events are used
//! - **Metric**: a handle to a replication-lag time series whose fully
//!   qualified name embeds the correlation key
//!
//! All of these are transient snapshots fetched once per evaluation pass.

#![deny(unsafe_code)]

pub mod event;
pub mod ids;
pub mod machine;
pub mod metric;
pub mod tenant;

// Re-export main types
pub use event::{Event, EventQuery, MACHINE_CRITICAL_GROUP};
pub use ids::{CorrelationKey, ElementId, EventId, MachineId, MetricId, ProjectId, TenantId};
pub use machine::{roles, Machine, MachineStatus};
pub use metric::{Metric, MetricQuery, QuerySpecifier, SortSpec, SourceFilter, SpecifierBlock};
pub use tenant::{Project, Tenant};
