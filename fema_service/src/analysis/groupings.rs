/// Group-count tables over a declaration subset.
///
/// Counts are keyed by whatever values occur in the input; no key is
/// invented for states or incident types that are absent. Rows keep the
/// order in which each key was first seen, so the same input always
/// yields the same table.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::model::DisasterDeclaration;

// ---------------------------------------------------------------------------
// GroupCounts
// ---------------------------------------------------------------------------

/// Key to count mapping in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCounts {
    rows: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl GroupCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `key`.
    pub fn increment(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&row) => self.rows[row].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.rows.len());
                self.rows.push((key.to_string(), 1));
            }
        }
    }

    /// Count for `key`, or 0 when the key never occurred.
    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map(|&row| self.rows[row].1).unwrap_or(0)
    }

    /// Sum of all counts; equals the number of records grouped.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|(_, count)| count).sum()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.rows.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// Rows ordered by descending count, ties broken by key. For display.
    pub fn sorted_by_count(&self) -> Vec<(&str, usize)> {
        let mut rows: Vec<_> = self.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

impl Serialize for GroupCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (key, count) in &self.rows {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Grouping functions
// ---------------------------------------------------------------------------

/// Counts `records` by the key `key_fn` extracts.
pub fn count_by<'a, F>(records: &'a [DisasterDeclaration], key_fn: F) -> GroupCounts
where
    F: Fn(&'a DisasterDeclaration) -> &'a str,
{
    let mut counts = GroupCounts::new();
    for declaration in records {
        counts.increment(key_fn(declaration));
    }
    counts
}

pub fn count_by_state(records: &[DisasterDeclaration]) -> GroupCounts {
    count_by(records, |d| d.state_code.as_str())
}

pub fn count_by_incident_type(records: &[DisasterDeclaration]) -> GroupCounts {
    count_by(records, |d| d.incident_type.as_str())
}

/// Both group-count tables for one subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetSummary {
    pub total: usize,
    pub by_state: GroupCounts,
    pub by_incident_type: GroupCounts,
}

pub fn summarize(records: &[DisasterDeclaration]) -> SubsetSummary {
    SubsetSummary {
        total: records.len(),
        by_state: count_by_state(records),
        by_incident_type: count_by_incident_type(records),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
