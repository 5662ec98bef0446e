//! # Fleetwatch Health - Fleet Reconciliation Engine
//!
//! Joins inventory records (machines, tenants, projects, lifecycle events)
//! with replication-lag samples from the metrics service and classifies the
//! units that are unhealthy right now.
//!
//! ## Checks
//!
//! - **Offline units**: offline appliances, with hours since their latest
//!   "machine critical" event
//! - **Idle units**: online replicating machines whose lag exceeds
//!   [`LAG_THRESHOLD_SECS`]
//! - **Lagging DB hosts**: the same lag rule restricted to database hosts
//!
//! A machine only counts when one of its owning tenants belongs to one of
//! the configured projects.
//!
//! ## Key Components
//!
//! - [`ProjectResolver`]: project names to ids
//! - [`TenantIndex`]: id to tenant lookup
//! - [`MachineFilter`]: status and role predicates
//! - [`SampleFetcher`]: worker pool plus memoized [`SampleMap`]
//! - [`ReconciliationEngine`]: the checks
//! - [`ScopeOrchestrator`]: runs every {scope x check} concurrently, one
//!   result stream each
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use fleetwatch_clients::{build_http_client, HttpInventoryClient, HttpMetricsClient};
//! use fleetwatch_health::{ReconciliationEngine, SampleFetcher, Scope, ScopeOrchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = build_http_client(Duration::from_secs(10))?;
//! let inventory = HttpInventoryClient::new(http.clone(), "https://deploy.example.com", "Spaces-1", "API-KEY");
//! let metrics = HttpMetricsClient::new(http, "https://metrics.example.com", "user", "pass");
//!
//! let engine = ReconciliationEngine::new(
//!     Arc::new(inventory),
//!     Arc::new(SampleFetcher::new(Arc::new(metrics))),
//! );
//! let scope = Scope::new("ASI", Arc::new(engine), vec!["CDC Install".to_string()]);
//!
//! for report in ScopeOrchestrator::new(vec![scope]).run() {
//!     for result in report.drain().await {
//!         println!("{:?}", result);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod filter;
pub mod orchestrator;
pub mod resolver;
pub mod result;
pub mod samples;
pub mod tenants;

pub use engine::{ReconciliationEngine, UnitMap, CORRELATION_VARIABLE, LAG_THRESHOLD_SECS};
pub use error::{HealthError, HealthResult};
pub use filter::{MachineFilter, REPLICATING_ROLES};
pub use orchestrator::{Scope, ScopeOrchestrator, ScopeReport};
pub use resolver::ProjectResolver;
pub use result::{CheckKind, ClassificationResult};
pub use samples::{
    sample_query, SampleFetcher, SampleMap, MAX_METRICS_PER_PAGE, SAMPLE_ELEMENT, SAMPLE_METRIC,
    SAMPLE_WORKERS,
};
pub use tenants::TenantIndex;
