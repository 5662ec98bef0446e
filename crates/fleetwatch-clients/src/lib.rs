//! # Fleetwatch Clients - Inventory and Metrics Service Access
//!
//! Capability traits for the two external systems the reconciliation engine
//! reads from, plus their HTTP implementations.
//!
//! - [`InventoryClient`]: machines, tenants, projects and lifecycle events
//!   from the deployment manager
//! - [`MetricsClient`]: metric listings and latest sample values from the
//!   metrics service
//!
//! The engine only depends on the traits. The HTTP clients share a single
//! [`reqwest::Client`] whose timeout bounds every outbound call; see
//! [`build_http_client`].
//!
//! In-memory implementations for tests live in [`fake`] behind the
//! `test-utils` feature.

pub mod error;
mod http;
pub mod inventory;
pub mod metrics;
mod wire;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

pub use error::{ClientError, ClientResult};
pub use http::build_http_client;
pub use inventory::{HttpInventoryClient, InventoryClient};
pub use metrics::{HttpMetricsClient, MetricsClient, DEFAULT_METRICS_URL};
