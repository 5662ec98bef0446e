//! Metric handles and the metric listing query

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{CorrelationKey, ElementId, MetricId};

/// A handle to a time series in the metrics service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: MetricId,
    pub element_id: ElementId,
    /// Fully qualified name, e.g. `hvr_latency.abc123.integrate`
    pub fqn: String,
}

impl Metric {
    /// Derive the correlation key from the fully qualified name.
    ///
    /// Naming contract with the metrics service: the FQN is dot-delimited and
    /// its second segment is the appliance identifier. The key is that
    /// segment upper-cased. Tenants must store the identifier upper-cased
    /// for the join to match. Returns `None` when the FQN has no non-empty
    /// second segment.
    pub fn correlation_key(&self) -> Option<CorrelationKey> {
        self.fqn
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .map(|segment| CorrelationKey::new(segment.to_uppercase()))
    }
}

/// Body of a metric listing request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    pub page: u32,
    pub page_size: u32,
    pub start_date: String,
    pub end_date: String,
    pub sort: SortSpec,
    pub element_fqns: SpecifierBlock,
    pub metric_fqns: SpecifierBlock,
    pub source_filter: SourceFilter,
}

/// Result ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: String,
    pub missing: String,
}

/// A list of name matchers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecifierBlock {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<QuerySpecifier>,
}

/// A single name matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpecifier {
    pub literal: bool,
    pub contains: bool,
    pub item: String,
}

impl QuerySpecifier {
    fn contains(item: impl Into<String>) -> Self {
        Self {
            literal: false,
            contains: true,
            item: item.into(),
        }
    }
}

/// Field projection for the listing response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl MetricQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of the time window. Dates are sent as RFC 3339 with second precision.
    pub fn start_date(mut self, t: DateTime<Utc>) -> Self {
        self.start_date = t.to_rfc3339_opts(SecondsFormat::Secs, true);
        self
    }

    /// End of the time window.
    pub fn end_date(mut self, t: DateTime<Utc>) -> Self {
        self.end_date = t.to_rfc3339_opts(SecondsFormat::Secs, true);
        self
    }

    /// Match elements whose name contains `element`. Repeated calls add matchers.
    pub fn add_element(mut self, element: impl Into<String>) -> Self {
        self.element_fqns.items.push(QuerySpecifier::contains(element));
        self
    }

    /// Match metrics whose name contains `metric`. Repeated calls add matchers.
    pub fn add_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric_fqns.items.push(QuerySpecifier::contains(metric));
        self
    }

    /// Fields included in each returned metric.
    pub fn source_includes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_filter = SourceFilter {
            includes: fields.into_iter().map(Into::into).collect(),
            excludes: Vec::new(),
        };
        self
    }

    /// Sort by `field` in `order` ("asc" or "desc"); missing values sort last.
    pub fn sort(mut self, field: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort = SortSpec {
            field: field.into(),
            order: order.into(),
            missing: "_last".to_string(),
        };
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }
}
