//! Observability: structured logging, lifecycle events and counters
//!
//! ```ignore
//! use rosterdb::observability::{Event, Logger, MetricsRegistry};
//!
//! Logger::event(Event::StudentCreated, &[("id", "…")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_students_created();
//! ```
//!
//! Observability never fails the operation it observes.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Logs a lifecycle event at its default severity
pub fn log_event(event: Event) {
    Logger::event(event, &[]);
}

/// Logs a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::event(event, fields);
}
