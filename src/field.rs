//! Field paths and the per-view field map.
//!
//! Record shapes differ between views: transfers are dated by `created_at`,
//! events by `timestamp`, and cardholders keep their name under
//! `customer.name`. Each view therefore declares which fields it searches,
//! filters, dates, sums and groups by in a [FieldMap], which is parsed once
//! instead of at every call site.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A dotted path to a (possibly nested) field in a record.
///
/// Segments are separated by `.`. When the value at a segment is an array, a
/// numeric segment indexes into it, e.g. `"recipients.0.msisdn"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted field path.
    ///
    /// # Errors
    /// Returns [Error::InvalidFieldPath] if the path or any of its segments is empty.
    pub fn parse(path: &str) -> Result<Self, Error> {
        let segments: Vec<String> = path.split('.').map(str::to_owned).collect();

        if segments.iter().any(String::is_empty) {
            return Err(Error::InvalidFieldPath(path.to_owned()));
        }

        Ok(Self {
            raw: path.to_owned(),
            segments,
        })
    }

    /// The path segments in lookup order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path as written, e.g. `"customer.name"`.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<String> for FieldPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.raw
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The fields a view reads from its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    /// Fields matched against the free-text search.
    #[serde(default)]
    pub search: Vec<FieldPath>,
    /// The field compared against the status filter, if the view has one.
    #[serde(default)]
    pub status: Option<FieldPath>,
    /// The timestamp used for the date window and for bucketing.
    pub date: FieldPath,
    /// The numeric field summed by the analytics view.
    #[serde(default)]
    pub amount: Option<FieldPath>,
    /// The field whose value names a record's series in the analytics view.
    #[serde(default)]
    pub category: Option<FieldPath>,
}

impl FieldMap {
    /// Build a field map from string paths.
    ///
    /// # Errors
    /// Returns [Error::InvalidFieldPath] if any of the paths is malformed.
    pub fn new(
        search: &[&str],
        status: Option<&str>,
        date: &str,
        amount: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, Error> {
        Ok(Self {
            search: search
                .iter()
                .map(|path| FieldPath::parse(path))
                .collect::<Result<_, _>>()?,
            status: status.map(FieldPath::parse).transpose()?,
            date: FieldPath::parse(date)?,
            amount: amount.map(FieldPath::parse).transpose()?,
            category: category.map(FieldPath::parse).transpose()?,
        })
    }
}
