//! # Result records and progress snapshots.
//!
//! [`Record`] is the opaque payload unit returned by a producer. [`Snapshot`]
//! is the aggregated, point-in-time view the orchestrator pushes to
//! subscribers after every producer completion.
//!
//! Snapshots are values, not references: each one is a copy that is safe to
//! serialize and hand to multiple subscribers concurrently.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One result unit returned by a producer. Immutable once created.
///
/// Serialized in camelCase, e.g.:
/// ```json
/// {"id":42,"provider":"Provider 1","price":129.5,"departsAt":"2026-09-01T10:00:00Z"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Identifier assigned by the producer (unique within its own batch).
    pub id: u32,
    /// Name of the producer this record came from.
    pub provider: String,
    /// Quoted price.
    pub price: f64,
    /// Departure time of the quoted availability.
    pub departs_at: DateTime<Utc>,
}

impl Record {
    /// Creates a new record.
    pub fn new(id: u32, provider: impl Into<String>, price: f64, departs_at: DateTime<Utc>) -> Self {
        Self {
            id,
            provider: provider.into(),
            price,
            departs_at,
        }
    }
}

/// Aggregated point-in-time view of all results plus an in-progress flag.
///
/// Wire shape:
/// ```json
/// {"count":2,"isInProgress":true,"availabilities":[...]}
/// ```
///
/// `count` always equals `availabilities.len()`; the constructor enforces it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    count: usize,
    is_in_progress: bool,
    availabilities: Vec<Record>,
}

impl Snapshot {
    /// Creates a snapshot over the given records.
    pub fn new(availabilities: Vec<Record>, is_in_progress: bool) -> Self {
        Self {
            count: availabilities.len(),
            is_in_progress,
            availabilities,
        }
    }

    /// Number of aggregated records.
    pub fn count(&self) -> usize {
        self.count
    }

    /// True while at least one producer has not reported yet.
    pub fn is_in_progress(&self) -> bool {
        self.is_in_progress
    }

    /// The aggregated records.
    ///
    /// Order within one producer's batch is preserved; order across producers
    /// is unspecified.
    pub fn availabilities(&self) -> &[Record] {
        &self.availabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, provider: &str) -> Record {
        Record::new(id, provider, 99.0, Utc::now())
    }

    #[test]
    fn test_count_matches_len() {
        let snap = Snapshot::new(vec![record(1, "a"), record(2, "a")], true);
        assert_eq!(snap.count(), 2);
        assert_eq!(snap.count(), snap.availabilities().len());
    }

    #[test]
    fn test_wire_shape() {
        let snap = Snapshot::new(vec![record(7, "p")], false);
        let v = serde_json::to_value(&snap).expect("snapshot serializes");

        assert_eq!(v["count"], 1);
        assert_eq!(v["isInProgress"], false);
        assert_eq!(v["availabilities"][0]["id"], 7);
        assert_eq!(v["availabilities"][0]["provider"], "p");
        assert!(v["availabilities"][0]["departsAt"].is_string());
    }
}
