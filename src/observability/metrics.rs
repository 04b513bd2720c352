//! Operation counters
//!
//! Counters only, reset on process start. Relaxed atomics; exact totals are
//! all that is needed.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    students_created: AtomicU64,
    students_updated: AtomicU64,
    students_deleted: AtomicU64,
    list_queries: AtomicU64,
    get_queries: AtomicU64,
    summaries_computed: AtomicU64,
    /// Validation, duplicate and not-found outcomes
    requests_rejected: AtomicU64,
    store_faults: AtomicU64,
    users_registered: AtomicU64,
    logins_succeeded: AtomicU64,
    logins_failed: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_students_created(&self) {
        self.students_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_students_updated(&self) {
        self.students_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_students_deleted(&self) {
        self.students_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_list_queries(&self) {
        self.list_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_get_queries(&self) {
        self.get_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_summaries(&self) {
        self.summaries_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_requests_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_faults(&self) {
        self.store_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_users_registered(&self) {
        self.users_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_logins_succeeded(&self) {
        self.logins_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_logins_failed(&self) {
        self.logins_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            students_created: self.students_created.load(Ordering::Relaxed),
            students_updated: self.students_updated.load(Ordering::Relaxed),
            students_deleted: self.students_deleted.load(Ordering::Relaxed),
            list_queries: self.list_queries.load(Ordering::Relaxed),
            get_queries: self.get_queries.load(Ordering::Relaxed),
            summaries_computed: self.summaries_computed.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            store_faults: self.store_faults.load(Ordering::Relaxed),
            users_registered: self.users_registered.load(Ordering::Relaxed),
            logins_succeeded: self.logins_succeeded.load(Ordering::Relaxed),
            logins_failed: self.logins_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub students_created: u64,
    pub students_updated: u64,
    pub students_deleted: u64,
    pub list_queries: u64,
    pub get_queries: u64,
    pub summaries_computed: u64,
    pub requests_rejected: u64,
    pub store_faults: u64,
    pub users_registered: u64,
    pub logins_succeeded: u64,
    pub logins_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zeroed() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.students_created, 0);
        assert_eq!(snapshot.store_faults, 0);
        assert_eq!(snapshot.logins_failed, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_students_created();
        registry.increment_students_created();
        registry.increment_list_queries();
        registry.increment_requests_rejected();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.students_created, 2);
        assert_eq!(snapshot.list_queries, 1);
        assert_eq!(snapshot.requests_rejected, 1);
        assert_eq!(snapshot.students_deleted, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_summaries();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["summaries_computed"], 1);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_get_queries();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().get_queries, 800);
    }
}
