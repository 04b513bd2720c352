//! Summary statistics over the full record set

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::errors::StudentResult;
use super::filter::StudentFilter;
use super::types::{StudentRecord, StudentStatus};
use crate::store::RecordStore;

/// Bucket label for records without a value
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Ordered label → count pairs, serialized as a JSON object in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountMap(Vec<(String, u64)>);

impl CountMap {
    pub fn get(&self, label: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }

    fn increment(&mut self, label: &str) {
        match self.0.iter_mut().find(|(name, _)| name == label) {
            Some((_, count)) => *count += 1,
            None => self.0.push((label.to_string(), 1)),
        }
    }
}

impl Serialize for CountMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// `{total, status, classes}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: u64,
    pub status: CountMap,
    pub classes: CountMap,
}

pub struct SummaryAggregator;

impl SummaryAggregator {
    /// Recomputes the summary from every record in `store`.
    pub fn summarize(store: &dyn RecordStore) -> StudentResult<Summary> {
        let records = store.list(&StudentFilter::all())?;
        Ok(Self::from_records(&records))
    }

    /// Status buckets follow domain order. Class buckets are ordered by
    /// descending count, then by name.
    pub fn from_records(records: &[StudentRecord]) -> Summary {
        let mut status = CountMap::default();
        let mut classes = CountMap::default();

        for record in records {
            status.increment(record.status.as_str());
            classes.increment(label_or_unknown(&record.class_name));
        }

        status
            .0
            .sort_by_key(|(label, _)| StudentStatus::parse(label).map(|s| s as u8));
        classes
            .0
            .sort_by(|(a_name, a_count), (b_name, b_count)| {
                b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
            });

        Summary {
            total: records.len() as u64,
            status,
            classes,
        }
    }
}

fn label_or_unknown(label: &str) -> &str {
    if label.trim().is_empty() {
        UNKNOWN_LABEL
    } else {
        label
    }
}
