//! In-memory backend over a fixed vector of records.

use crate::backend::{Backend, Record};
use crate::error::BackendError;
use crate::query::{Comparator, Constraint};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

/// Records are served in insertion order. An empty constraint list matches the first record.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    records: Vec<Record>,
}

impl MemoryBackend {
    pub fn new(records: Vec<Record>) -> Self {
        MemoryBackend { records }
    }

    /// Build from JSON values; anything that is not an object is ignored.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let records = values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(m) => Some(m),
                _ => None,
            })
            .collect();
        MemoryBackend { records }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn fetch_page(&self, offset: u64, count: u64) -> Result<Vec<Record>, BackendError> {
        let len = self.records.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(usize::try_from(count).unwrap_or(usize::MAX)).min(len);
        Ok(self.records[start..end].to_vec())
    }

    async fn find_one(&self, constraints: &[Constraint]) -> Result<Record, BackendError> {
        self.records
            .iter()
            .find(|r| matches_all(r, constraints))
            .cloned()
            .ok_or_else(|| BackendError::NotFound("no matching entry found".into()))
    }
}

fn matches_all(record: &Record, constraints: &[Constraint]) -> bool {
    constraints.iter().all(|c| matches(record, c))
}

/// A missing property never matches, not even under `Ne`.
fn matches(record: &Record, constraint: &Constraint) -> bool {
    let Some(field) = record.get(&constraint.property) else {
        return false;
    };
    let Some(text) = scalar_text(field) else {
        return false;
    };
    match constraint.comparator {
        Comparator::Eq => text == constraint.value,
        Comparator::Ne => text != constraint.value,
        Comparator::Lt => compare(field, &text, &constraint.value) == Ordering::Less,
        Comparator::Le => compare(field, &text, &constraint.value) != Ordering::Greater,
        Comparator::Gt => compare(field, &text, &constraint.value) == Ordering::Greater,
        Comparator::Ge => compare(field, &text, &constraint.value) != Ordering::Less,
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Numeric when both sides are finite numbers, lexical otherwise.
fn compare(field: &Value, text: &str, operand: &str) -> Ordering {
    let number = |s: &str| s.parse::<f64>().ok().filter(|n| n.is_finite());
    let left = field.as_f64().or_else(|| number(text));
    match (left, number(operand)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => text.cmp(operand),
    }
}
