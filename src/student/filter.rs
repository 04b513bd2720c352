//! # Filter Builder
//!
//! Translates list query parameters into a conjunction of predicates over
//! student records.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use super::errors::{StudentError, StudentResult};
use super::types::{StudentRecord, StudentStatus};

/// Query parameters accepted by the list operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A single predicate
#[derive(Debug, Clone)]
pub enum FilterExpr {
    /// Case-insensitive literal substring over fullName, rollNumber, guardianName
    Search(Regex),
    /// Exact className
    ClassName(String),
    /// Exact status label; `None` when the label is outside the domain
    Status(Option<StudentStatus>),
}

impl FilterExpr {
    pub fn matches(&self, record: &StudentRecord) -> bool {
        match self {
            FilterExpr::Search(pattern) => {
                pattern.is_match(&record.full_name)
                    || pattern.is_match(&record.roll_number)
                    || pattern.is_match(&record.guardian_name)
            }
            FilterExpr::ClassName(class_name) => &record.class_name == class_name,
            FilterExpr::Status(Some(status)) => record.status == *status,
            FilterExpr::Status(None) => false,
        }
    }
}

/// Conjunction of filter expressions. Empty matches everything.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    exprs: Vec<FilterExpr>,
}

impl StudentFilter {
    /// Matches every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a filter from query parameters. Absent or empty parameters
    /// impose no constraint.
    pub fn build(query: &StudentQuery) -> StudentResult<Self> {
        let mut exprs = Vec::new();

        if let Some(search) = non_empty(&query.search) {
            let pattern = RegexBuilder::new(&regex::escape(search))
                .case_insensitive(true)
                .build()
                .map_err(|e| StudentError::validation("search", e.to_string()))?;
            exprs.push(FilterExpr::Search(pattern));
        }

        if let Some(class_name) = non_empty(&query.class_name) {
            exprs.push(FilterExpr::ClassName(class_name.to_string()));
        }

        if let Some(status) = non_empty(&query.status) {
            exprs.push(FilterExpr::Status(StudentStatus::parse(status)));
        }

        Ok(Self { exprs })
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn matches(&self, record: &StudentRecord) -> bool {
        self.exprs.iter().all(|expr| expr.matches(record))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
