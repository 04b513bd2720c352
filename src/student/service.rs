//! # Record Service
//!
//! Orchestrates normalization, filtering, storage and aggregation for the
//! student operations. Every call bumps one counter and logs one event.

use std::sync::Arc;

use super::errors::{StudentError, StudentResult};
use super::filter::{StudentFilter, StudentQuery};
use super::normalizer::normalize;
use super::summary::{Summary, SummaryAggregator};
use super::types::{StudentPayload, StudentRecord};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn RecordStore>,
    metrics: Arc<MetricsRegistry>,
}

impl StudentService {
    pub fn new(store: Arc<dyn RecordStore>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { store, metrics }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn create_student(&self, raw: &StudentPayload) -> StudentResult<StudentRecord> {
        let result = self.store.create(&normalize(raw));
        self.observe("create", result, |record| {
            self.metrics.increment_students_created();
            let id = record.id.to_string();
            Logger::event(
                Event::StudentCreated,
                &[("id", id.as_str()), ("roll_number", record.roll_number.as_str())],
            );
        })
    }

    pub fn list_students(&self, query: &StudentQuery) -> StudentResult<Vec<StudentRecord>> {
        let result = StudentFilter::build(query).and_then(|filter| self.store.list(&filter));
        self.observe("list", result, |records| {
            self.metrics.increment_list_queries();
            let matched = records.len().to_string();
            Logger::event(Event::StudentsListed, &[("matched", matched.as_str())]);
        })
    }

    pub fn get_student(&self, id: &str) -> StudentResult<StudentRecord> {
        let result = self.store.get(id);
        self.observe("get", result, |_| {
            self.metrics.increment_get_queries();
            Logger::event(Event::StudentFetched, &[("id", id)]);
        })
    }

    pub fn update_student(&self, id: &str, raw: &StudentPayload) -> StudentResult<StudentRecord> {
        let result = self.store.update(id, &normalize(raw));
        self.observe("update", result, |_| {
            self.metrics.increment_students_updated();
            Logger::event(Event::StudentUpdated, &[("id", id)]);
        })
    }

    pub fn delete_student(&self, id: &str) -> StudentResult<()> {
        let result = self.store.delete(id);
        self.observe("delete", result, |_| {
            self.metrics.increment_students_deleted();
            Logger::event(Event::StudentDeleted, &[("id", id)]);
        })
    }

    pub fn get_summary(&self) -> StudentResult<Summary> {
        let result = SummaryAggregator::summarize(self.store.as_ref());
        self.observe("summary", result, |summary| {
            self.metrics.increment_summaries();
            let total = summary.total.to_string();
            Logger::event(Event::SummaryComputed, &[("total", total.as_str())]);
        })
    }

    /// Runs `on_success` or records the failure, then hands the result back.
    fn observe<T>(
        &self,
        operation: &str,
        result: StudentResult<T>,
        on_success: impl FnOnce(&T),
    ) -> StudentResult<T> {
        match &result {
            Ok(value) => on_success(value),
            Err(err) => self.record_failure(operation, err),
        }
        result
    }

    fn record_failure(&self, operation: &str, err: &StudentError) {
        let message = err.to_string();
        let fields = [
            ("operation", operation),
            ("code", err.code()),
            ("field", err.field().unwrap_or("")),
            ("message", message.as_str()),
        ];
        if err.is_client_error() {
            self.metrics.increment_requests_rejected();
            Logger::event(Event::StudentRequestRejected, &fields);
        } else {
            self.metrics.increment_store_faults();
            Logger::event(Event::StoreFault, &fields);
        }
    }
}
