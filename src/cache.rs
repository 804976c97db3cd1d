//! # Shared result cache: per-producer batches plus a completion set.
//!
//! [`ResultCache`] accumulates the batches reported by provider tasks and
//! tracks which producers have finished (successfully or not). It is the only
//! object in the runtime mutated by multiple concurrent writers, so both
//! structures live behind a single lock and every mutation updates them
//! atomically with respect to reads.
//!
//! ## Rules
//! - **Last write wins**: a producer reporting twice overwrites its previous
//!   batch, never merges.
//! - **Failures count as done**: [`ResultCache::mark_failed`] adds the name to
//!   the completion set without storing records.
//! - **Instantaneous reads**: [`ResultCache::get_all`] reflects one instant,
//!   not a transaction across producers.
//! - No operation ever holds the lock across an await point; all methods are
//!   synchronous and short.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::records::Record;

#[derive(Default)]
struct CacheInner {
    results: HashMap<String, Vec<Record>>,
    completed: HashSet<String>,
}

/// Thread-safe accumulation of per-producer result batches.
///
/// Cheap to share via `Arc`; all methods take `&self`.
#[derive(Default)]
pub struct ResultCache {
    inner: RwLock<CacheInner>,
}

impl ResultCache {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `records` for `provider` and marks it complete.
    ///
    /// Replaces any prior entry for the same provider (last write wins).
    pub fn add_result(&self, provider: impl Into<String>, records: Vec<Record>) {
        let provider = provider.into();
        let mut inner = self.write();
        inner.results.insert(provider.clone(), records);
        inner.completed.insert(provider);
    }

    /// Marks `provider` complete without contributing records.
    ///
    /// Used for failed producers: they count toward completion but any batch
    /// stored by an earlier run is removed.
    pub fn mark_failed(&self, provider: impl Into<String>) {
        let provider = provider.into();
        let mut inner = self.write();
        inner.results.remove(&provider);
        inner.completed.insert(provider);
    }

    /// True iff every name in `providers` is in the completion set.
    ///
    /// An empty provider list is trivially done.
    pub fn all_done<I, S>(&self, providers: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let inner = self.read();
        providers
            .into_iter()
            .all(|p| inner.completed.contains(p.as_ref()))
    }

    /// Returns the concatenation of all stored batches.
    ///
    /// Order within one producer's batch is preserved; relative order across
    /// producers is unspecified.
    pub fn get_all(&self) -> Vec<Record> {
        let inner = self.read();
        inner.results.values().flatten().cloned().collect()
    }

    /// Number of producers in the completion set.
    pub fn completed_count(&self) -> usize {
        self.read().completed.len()
    }

    /// Empties both the result map and the completion set.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.results.clear();
        inner.completed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: u32, provider: &str) -> Record {
        Record::new(id, provider, 10.0, Utc::now())
    }

    #[test]
    fn test_add_result_marks_complete() {
        let cache = ResultCache::new();
        cache.add_result("p1", vec![record(1, "p1")]);

        assert!(cache.all_done(["p1"]));
        assert!(!cache.all_done(["p1", "p2"]));
        assert_eq!(cache.get_all().len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = ResultCache::new();
        cache.add_result("p1", vec![record(1, "p1"), record(2, "p1")]);
        cache.add_result("p1", vec![record(3, "p1")]);

        let all = cache.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 3);
        assert_eq!(cache.completed_count(), 1);
    }

    #[test]
    fn test_mark_failed_counts_as_done_without_records() {
        let cache = ResultCache::new();
        cache.add_result("p1", vec![record(1, "p1")]);
        cache.mark_failed("p2");

        assert!(cache.all_done(["p1", "p2"]));
        assert!(cache.get_all().iter().all(|r| r.provider == "p1"));
    }

    #[test]
    fn test_mark_failed_discards_earlier_batch() {
        let cache = ResultCache::new();
        cache.add_result("p1", vec![record(1, "p1")]);
        cache.mark_failed("p1");

        assert!(cache.all_done(["p1"]));
        assert!(cache.get_all().is_empty());
    }

    #[test]
    fn test_order_within_provider_preserved() {
        let cache = ResultCache::new();
        cache.add_result("p1", vec![record(1, "p1"), record(2, "p1"), record(3, "p1")]);

        let ids: Vec<u32> = cache.get_all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_provider_list_is_done() {
        let cache = ResultCache::new();
        assert!(cache.all_done(Vec::<String>::new()));
    }

    #[test]
    fn test_clear_resets_both_structures() {
        let cache = ResultCache::new();
        cache.add_result("p1", vec![record(1, "p1")]);
        cache.add_result("p2", vec![record(2, "p2")]);

        cache.clear();

        assert!(cache.get_all().is_empty());
        assert!(!cache.all_done(["p1", "p2"]));
        assert_eq!(cache.completed_count(), 0);
    }
}
