//! Records and the typed views of their fields.

use std::{borrow::Cow, sync::Arc};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::well_known::{Iso8601, Rfc3339},
    macros::format_description,
};

use crate::field::FieldPath;

/// The category label given to records that have no category value.
pub const UNCATEGORIZED_LABEL: &str = "Other";

/// One domain record, e.g. a transfer, an API key or a cardholder.
///
/// Records are opaque JSON objects. The engine only ever reads the fields a
/// view's [FieldMap](crate::FieldMap) names, and never mutates a record.
/// Cloning is cheap: clones share the same underlying object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Record(Arc<Map<String, Value>>);

impl Record {
    /// Look up the value at `path`.
    ///
    /// Returns `None` if any segment is missing, or if a segment tries to
    /// index into something that is neither an object nor an array.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut value = self.0.get(first)?;

        for segment in rest {
            value = match value {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(value)
    }

    /// The text form of the value at `path`, as used by search and status matching.
    ///
    /// Strings are returned as-is, numbers in their JSON form and booleans as
    /// `"true"` or `"false"`. Null, arrays and objects have no text form.
    pub fn text(&self, path: &FieldPath) -> Option<Cow<'_, str>> {
        match self.get(path)? {
            Value::String(text) => Some(Cow::Borrowed(text)),
            Value::Number(number) => Some(Cow::Owned(number.to_string())),
            Value::Bool(true) => Some(Cow::Borrowed("true")),
            Value::Bool(false) => Some(Cow::Borrowed("false")),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The timestamp at `path`, or `None` if it is missing or cannot be parsed.
    ///
    /// Accepts RFC 3339 / ISO 8601 date-times with an offset, ISO 8601
    /// date-times without an offset and plain `YYYY-MM-DD` dates (both taken to
    /// be in `offset`), and JSON numbers as Unix epoch milliseconds.
    pub fn timestamp(&self, path: &FieldPath, offset: UtcOffset) -> Option<OffsetDateTime> {
        match self.get(path)? {
            Value::String(text) => parse_timestamp(text, offset),
            Value::Number(number) => {
                let nanos = match number.as_i64() {
                    Some(millis) => i128::from(millis) * 1_000_000,
                    None => {
                        let millis = number.as_f64()?;
                        if !millis.is_finite() {
                            return None;
                        }
                        (millis * 1_000_000.0) as i128
                    }
                };

                OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
            }
            _ => None,
        }
    }

    /// The numeric value at `path`.
    ///
    /// Numbers are used as-is and strings holding a decimal number are parsed.
    /// Everything else, including a missing field, yields `NaN`; callers are
    /// expected to let that propagate rather than guess a value.
    pub fn amount(&self, path: &FieldPath) -> f64 {
        match self.get(path) {
            Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(text)) => text.trim().parse().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    /// The category label at `path`, falling back to [UNCATEGORIZED_LABEL].
    pub fn category(&self, path: &FieldPath) -> Cow<'_, str> {
        self.text(path)
            .unwrap_or(Cow::Borrowed(UNCATEGORIZED_LABEL))
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(value: Map<String, Value>) -> Self {
        Self(Arc::new(value))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

fn parse_timestamp(text: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(timestamp);
    }

    if let Ok(timestamp) = OffsetDateTime::parse(text, &Iso8601::DEFAULT) {
        return Some(timestamp);
    }

    let naive_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    for format in naive_formats {
        if let Ok(date_time) = PrimitiveDateTime::parse(text, format) {
            return Some(date_time.assume_offset(offset));
        }
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_offset(offset))
}
