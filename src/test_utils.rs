//! Helpers for building test records.

use serde_json::Value;
use time::{OffsetDateTime, UtcOffset, macros::datetime};

use crate::{Record, ViewContext};

/// Build a record from a `json!` object literal.
///
/// # Panics
/// Panics if `value` is not a JSON object.
pub(crate) fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => Record::from(map),
        other => panic!("test records must be JSON objects, got {other}"),
    }
}

/// Build records from a list of `json!` object literals.
pub(crate) fn records(values: Vec<Value>) -> Vec<Record> {
    values.into_iter().map(record).collect()
}

/// The fixed instant tests treat as "now".
pub(crate) const NOW: OffsetDateTime = datetime!(2024-03-31 12:00 UTC);

/// A UTC view context pinned to [NOW].
pub(crate) fn context() -> ViewContext {
    ViewContext::fixed(NOW, UtcOffset::UTC)
}
