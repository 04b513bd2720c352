//! # Student Records
//!
//! The query, normalization and aggregation layer between the HTTP routes
//! and the record store.
//!
//! Flow: raw payload → [`normalize`] → [`StudentDraft::validate`] (inside the
//! store) → stored [`StudentRecord`]. List queries go through
//! [`StudentFilter::build`]; summaries through [`SummaryAggregator`].

mod errors;
mod filter;
mod normalizer;
mod service;
mod summary;
mod types;
mod validator;

pub use errors::{StudentError, StudentResult, ValidationDetails};
pub use filter::{FilterExpr, StudentFilter, StudentQuery};
pub use normalizer::normalize;
pub use service::StudentService;
pub use summary::{CountMap, Summary, SummaryAggregator, UNKNOWN_LABEL};
pub use types::{Gender, StudentPayload, StudentRecord, StudentStatus};
pub use validator::StudentDraft;
