//! Replication-lag samples: worker pool and memoized cache
//!
//! The metric listing is fanned out to a fixed pool of workers pulling from
//! one shared queue. Each worker resolves a metric to its latest sample and
//! hands `(key, value)` to a single collector task, which is the only writer
//! of the result map. Completion is detected by closing the queue and then
//! draining the result channel until every worker has dropped its sender.
//!
//! The result is computed at most once per [`SampleFetcher`]. Concurrent
//! first callers wait on the same initialization; afterwards every caller
//! reads the same immutable map.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use fleetwatch_clients::MetricsClient;
use fleetwatch_types::{CorrelationKey, Metric, MetricQuery};
use futures::future::join_all;
use tokio::sync::{mpsc, Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::error::{HealthError, HealthResult};

/// Number of concurrent sample workers.
pub const SAMPLE_WORKERS: usize = 8;

/// Upper bound on metrics listed per evaluation.
pub const MAX_METRICS_PER_PAGE: u32 = 60;

/// Element whose metrics carry the per-appliance replication lag.
pub const SAMPLE_ELEMENT: &str = "prod-hvr-hub-001";

/// Metric name of the replication lag series.
pub const SAMPLE_METRIC: &str = "hvr_latency";

/// Correlation key -> latest lag in seconds.
///
/// A key without an entry has no usable sample. That is distinct from a
/// sample of zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleMap {
    samples: HashMap<CorrelationKey, f64>,
}

impl SampleMap {
    pub fn lag(&self, key: &CorrelationKey) -> Option<f64> {
        self.samples.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Listing query for the replication lag series over the last hour.
pub fn sample_query(now: DateTime<Utc>) -> MetricQuery {
    MetricQuery::new()
        .start_date(now - Duration::hours(1))
        .end_date(now)
        .add_element(SAMPLE_ELEMENT)
        .add_metric(SAMPLE_METRIC)
        .source_includes(["fqn", "id", "element"])
        .sort("fqn", "asc")
        .page_size(MAX_METRICS_PER_PAGE)
}

/// Memoized sample fetcher for one scope.
pub struct SampleFetcher {
    metrics: Arc<dyn MetricsClient>,
    workers: usize,
    cache: OnceCell<Result<Arc<SampleMap>, String>>,
}

impl SampleFetcher {
    pub fn new(metrics: Arc<dyn MetricsClient>) -> Self {
        Self {
            metrics,
            workers: SAMPLE_WORKERS,
            cache: OnceCell::new(),
        }
    }

    /// Override the pool width (at least one worker).
    #[cfg(test)]
    pub(crate) fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Whether the cache has been populated, successfully or not.
    pub fn is_populated(&self) -> bool {
        self.cache.initialized()
    }

    /// The sample map, fetched on first use and memoized afterwards.
    ///
    /// A failed listing is memoized too: every later call reports the same
    /// failure as [`HealthError::SampleCache`] without refetching.
    pub async fn samples(&self) -> HealthResult<Arc<SampleMap>> {
        let cached = self
            .cache
            .get_or_init(|| async {
                self.populate()
                    .await
                    .map(Arc::new)
                    .map_err(|e| e.to_string())
            })
            .await;

        cached.clone().map_err(HealthError::SampleCache)
    }

    async fn populate(&self) -> HealthResult<SampleMap> {
        let query = sample_query(Utc::now());
        let metrics = self
            .metrics
            .fetch_metrics(&query)
            .await
            .map_err(|source| HealthError::Metrics {
                call: "metrics",
                source,
            })?;

        info!(metrics = metrics.len(), workers = self.workers, "fetching samples");
        let map = fan_out(Arc::clone(&self.metrics), metrics, self.workers).await?;
        info!(samples = map.len(), "sample cache populated");
        Ok(map)
    }
}

async fn fan_out(
    client: Arc<dyn MetricsClient>,
    metrics: Vec<Metric>,
    workers: usize,
) -> HealthResult<SampleMap> {
    let (work_tx, work_rx) = mpsc::channel::<Metric>(1);
    let (result_tx, mut result_rx) = mpsc::channel::<(CorrelationKey, f64)>(1);
    let queue = Arc::new(Mutex::new(work_rx));

    let collector = tokio::spawn(async move {
        let mut samples = HashMap::new();
        while let Some((key, value)) = result_rx.recv().await {
            samples.insert(key, value);
        }
        SampleMap { samples }
    });

    let handles: Vec<_> = (0..workers)
        .map(|id| {
            tokio::spawn(worker(
                id,
                Arc::clone(&client),
                Arc::clone(&queue),
                result_tx.clone(),
            ))
        })
        .collect();
    drop(result_tx);

    for metric in metrics {
        if work_tx.send(metric).await.is_err() {
            break;
        }
    }
    drop(work_tx);

    for joined in join_all(handles).await {
        joined.map_err(|e| HealthError::Internal(format!("sample worker failed: {}", e)))?;
    }

    collector
        .await
        .map_err(|e| HealthError::Internal(format!("sample collector failed: {}", e)))
}

async fn worker(
    id: usize,
    client: Arc<dyn MetricsClient>,
    queue: Arc<Mutex<mpsc::Receiver<Metric>>>,
    results: mpsc::Sender<(CorrelationKey, f64)>,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(metric) = next else {
            break;
        };

        let Some(key) = metric.correlation_key() else {
            warn!(metric = %metric.fqn, "metric name carries no correlation key");
            continue;
        };

        match client.fetch_metric_value(&metric).await {
            Ok(value) => {
                debug!(worker = id, metric = %metric.fqn, value, "sample fetched");
                if results.send((key, value)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(metric = %metric.fqn, error = %e, "failed to fetch sample");
            }
        }
    }
}
