//! Lifecycle events from the inventory system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EventId, MachineId};

/// Event group raised when a machine becomes unavailable.
pub const MACHINE_CRITICAL_GROUP: &str = "MachineCritical";

/// A lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    pub id: EventId,
    pub category: String,
    pub occurred: DateTime<Utc>,
}

impl Event {
    /// Time elapsed since the event, in fractional hours.
    pub fn hours_since(&self, now: DateTime<Utc>) -> f64 {
        (now - self.occurred).num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Filter for an event listing.
///
/// Rendered as the query string keys `regarding`, `groups` and `take`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Only events regarding this document (machine id)
    pub regarding: Option<MachineId>,

    /// Only events in this group
    pub groups: Option<String>,

    /// Maximum number of events returned, newest first
    pub take: Option<u32>,
}

impl EventQuery {
    /// The most recent "machine critical" event for a machine.
    pub fn latest_critical(machine: &MachineId) -> Self {
        Self {
            regarding: Some(machine.clone()),
            groups: Some(MACHINE_CRITICAL_GROUP.to_string()),
            take: Some(1),
        }
    }

    /// Query string pairs in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(regarding) = &self.regarding {
            pairs.push(("regarding", regarding.to_string()));
        }
        if let Some(groups) = &self.groups {
            pairs.push(("groups", groups.clone()));
        }
        if let Some(take) = self.take {
            pairs.push(("take", take.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_latest_critical_pairs() {
        let query = EventQuery::latest_critical(&MachineId::new("Machines-5"));
        assert_eq!(
            query.query_pairs(),
            vec![
                ("regarding", "Machines-5".to_string()),
                ("groups", "MachineCritical".to_string()),
                ("take", "1".to_string()),
            ]
        );
        assert!(EventQuery::default().query_pairs().is_empty());
    }

    #[test]
    fn test_hours_since() {
        let now = Utc::now();
        let event = Event {
            id: EventId::new("Events-1"),
            category: "MachineUnavailable".to_string(),
            occurred: now - Duration::minutes(90),
        };
        assert!((event.hours_since(now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_event_decodes_offset_timestamp() {
        let json = r#"{"Id": "Events-9", "Category": "MachineUnavailable", "Occurred": "2024-03-01T10:00:00.000+02:00"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.occurred.to_rfc3339(), "2024-03-01T08:00:00+00:00");
    }
}
