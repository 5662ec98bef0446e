//! Metrics service client

use async_trait::async_trait;
use fleetwatch_types::{Metric, MetricQuery};
use reqwest::Client;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::http::{handle_response, segment_url};
use crate::wire::{MetricsResponse, SamplesResponse};

/// Public endpoint of the metrics service.
pub const DEFAULT_METRICS_URL: &str = "https://us.cloudwisdom.virtana.com";

/// Read access to the metrics service.
#[async_trait]
pub trait MetricsClient: Send + Sync {
    /// Metrics matching a listing query.
    async fn fetch_metrics(&self, query: &MetricQuery) -> ClientResult<Vec<Metric>>;

    /// Latest sample value of a metric.
    async fn fetch_metric_value(&self, metric: &Metric) -> ClientResult<f64>;
}

/// HTTP client for the metrics REST API (basic auth).
pub struct HttpMetricsClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpMetricsClient {
    pub fn new(
        client: Client,
        base_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MetricsClient for HttpMetricsClient {
    async fn fetch_metrics(&self, query: &MetricQuery) -> ClientResult<Vec<Metric>> {
        let url = segment_url(&self.base_url, &["metrics", "elasticsearch", "metricQuery"])?;
        debug!(url = %url, "metric listing request");

        let response = self
            .client
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(query)
            .send()
            .await?;

        let body: MetricsResponse = handle_response(response, "metrics").await?;
        Ok(body.page.content)
    }

    async fn fetch_metric_value(&self, metric: &Metric) -> ClientResult<f64> {
        let url = segment_url(
            &self.base_url,
            &[
                "elements",
                metric.element_id.as_str(),
                "metrics",
                metric.id.as_str(),
                "samples",
            ],
        )?;

        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&[("duration", "PT1M"), ("rollup", "ZERO")])
            .send()
            .await?;

        let body: SamplesResponse = handle_response(response, "samples").await?;

        body.samples
            .first()
            .map(|s| s.data.val)
            .ok_or_else(|| ClientError::EmptyResponse(format!("no samples for {}", metric.fqn)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let client = HttpMetricsClient::new(Client::new(), "https://metrics.example.com/", "u", "p");
        assert_eq!(client.base_url(), "https://metrics.example.com");
    }
}
