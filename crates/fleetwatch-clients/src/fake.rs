//! In-memory clients for tests.
//!
//! Both fakes serve fixed data, can be told to fail specific calls, and
//! count how often they were called.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fleetwatch_types::{
    ElementId, Event, EventQuery, Machine, MachineId, Metric, MetricId, MetricQuery, Project,
    Tenant,
};

use crate::error::{ClientError, ClientResult};
use crate::inventory::InventoryClient;
use crate::metrics::MetricsClient;

fn injected(caller: &str) -> ClientError {
    ClientError::Api {
        caller: caller.to_string(),
        status: 503,
        message: "injected failure".to_string(),
    }
}

/// Inventory client serving fixed records.
#[derive(Default)]
pub struct StaticInventory {
    machines: Vec<Machine>,
    tenants: Vec<Tenant>,
    projects: Vec<Project>,
    events: HashMap<MachineId, Vec<Event>>,
    failing: HashSet<&'static str>,
    event_calls: AtomicUsize,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_machine(mut self, machine: Machine) -> Self {
        self.machines.push(machine);
        self
    }

    pub fn with_tenant(mut self, tenant: Tenant) -> Self {
        self.tenants.push(tenant);
        self
    }

    pub fn with_project(mut self, id: &str, name: &str) -> Self {
        self.projects.push(Project {
            id: id.into(),
            name: name.to_string(),
        });
        self
    }

    /// Record an event regarding `machine`. Events are served newest first.
    pub fn with_event(mut self, machine: &MachineId, event: Event) -> Self {
        let events = self.events.entry(machine.clone()).or_default();
        events.push(event);
        events.sort_by(|a, b| b.occurred.cmp(&a.occurred));
        self
    }

    /// Make a call fail: one of `machines`, `tenants`, `project`, `events`.
    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    pub fn event_calls(&self) -> usize {
        self.event_calls.load(Ordering::SeqCst)
    }

    fn check(&self, call: &'static str) -> ClientResult<()> {
        if self.failing.contains(call) {
            Err(injected(call))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InventoryClient for StaticInventory {
    async fn fetch_machines(&self) -> ClientResult<Vec<Machine>> {
        self.check("machines")?;
        Ok(self.machines.clone())
    }

    async fn fetch_tenants(&self) -> ClientResult<Vec<Tenant>> {
        self.check("tenants")?;
        Ok(self.tenants.clone())
    }

    async fn fetch_project(&self, name: &str) -> ClientResult<Project> {
        self.check("project")?;
        self.projects
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                caller: "project".to_string(),
                status: 404,
                message: format!("project {} not found", name),
            })
    }

    async fn fetch_events(&self, query: &EventQuery) -> ClientResult<Vec<Event>> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        self.check("events")?;

        let events = match &query.regarding {
            Some(machine) => self.events.get(machine).cloned().unwrap_or_default(),
            None => self.events.values().flatten().cloned().collect(),
        };

        let take = query.take.map(|t| t as usize).unwrap_or(usize::MAX);
        Ok(events.into_iter().take(take).collect())
    }
}

/// Metrics client serving fixed samples.
#[derive(Default)]
pub struct StaticMetrics {
    metrics: Vec<Metric>,
    values: HashMap<MetricId, f64>,
    failing_values: HashSet<MetricId>,
    fail_listing: bool,
    delay: Option<Duration>,
    listing_calls: AtomicUsize,
    value_calls: AtomicUsize,
    last_query: Mutex<Option<MetricQuery>>,
}

impl StaticMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_metric(&mut self, fqn: &str) -> MetricId {
        let id = MetricId::new(format!("metric-{}", self.metrics.len() + 1));
        self.metrics.push(Metric {
            id: id.clone(),
            element_id: ElementId::new("element-1"),
            fqn: fqn.to_string(),
        });
        id
    }

    /// A metric whose latest sample is `value`.
    pub fn with_sample(mut self, fqn: &str, value: f64) -> Self {
        let id = self.push_metric(fqn);
        self.values.insert(id, value);
        self
    }

    /// A listed metric whose sample fetch fails.
    pub fn with_failing_sample(mut self, fqn: &str) -> Self {
        let id = self.push_metric(fqn);
        self.failing_values.insert(id);
        self
    }

    /// Make the metric listing fail.
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Delay every call, to widen race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn value_calls(&self) -> usize {
        self.value_calls.load(Ordering::SeqCst)
    }

    /// The most recent listing query received.
    pub fn last_query(&self) -> Option<MetricQuery> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MetricsClient for StaticMetrics {
    async fn fetch_metrics(&self, query: &MetricQuery) -> ClientResult<Vec<Metric>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some(query.clone());
        }
        self.pause().await;

        if self.fail_listing {
            return Err(injected("metrics"));
        }

        let limit = if query.page_size == 0 {
            usize::MAX
        } else {
            query.page_size as usize
        };
        Ok(self.metrics.iter().take(limit).cloned().collect())
    }

    async fn fetch_metric_value(&self, metric: &Metric) -> ClientResult<f64> {
        self.value_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if self.failing_values.contains(&metric.id) {
            return Err(injected("samples"));
        }

        self.values
            .get(&metric.id)
            .copied()
            .ok_or_else(|| ClientError::EmptyResponse(format!("no samples for {}", metric.fqn)))
    }
}
