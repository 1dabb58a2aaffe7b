//! Query Filters
//!
//! Equality filters and ordering for remote store calls.

use serde_json::Value;

/// Ordered set of `field = value` equality filters
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filters {
    pairs: Vec<(String, String)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter. A repeated field replaces the earlier value.
    pub fn eq(mut self, field: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(f, _)| f == field) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((field.to_string(), value)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.pairs.iter().find(|(f, _)| f == field).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Whether a JSON row satisfies every filter
    pub fn matches(&self, row: &Value) -> bool {
        self.pairs.iter().all(|(field, expected)| match row.get(field) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        })
    }
}

/// Sort order for `list`
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(field: &str) -> Self {
        Self { field: field.to_string(), descending: true }
    }
}
