//! The composite search, status and date-window filter shared by every table view.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{Error, Record, ViewContext, field::FieldMap, field::FieldPath};

/// The status value that disables the status filter.
pub const ALL_STATUSES: &str = "All";

/// What a view is currently filtered by.
///
/// Serializes deterministically, so the serialized form can be used as part
/// of a memoization key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free text matched case-insensitively against `search_fields`.
    pub search_text: String,
    /// The fields the search text is matched against.
    pub search_fields: Vec<FieldPath>,
    /// The field compared against `status_value`. `None` disables the status filter.
    pub status_field: Option<FieldPath>,
    /// The required status, or [ALL_STATUSES] to match any status.
    pub status_value: String,
    /// The timestamp field the date window applies to.
    pub date_field: FieldPath,
    /// How many days back from now a record's timestamp may be.
    pub window_days: NonZeroU32,
}

impl FilterCriteria {
    /// Create criteria for a view's fields with no search text and no status filter.
    ///
    /// # Errors
    /// Returns [Error::InvalidWindow] if `window_days` is zero.
    pub fn for_fields(fields: &FieldMap, window_days: u32) -> Result<Self, Error> {
        Ok(Self {
            search_text: String::new(),
            search_fields: fields.search.clone(),
            status_field: fields.status.clone(),
            status_value: ALL_STATUSES.to_owned(),
            date_field: fields.date.clone(),
            window_days: NonZeroU32::new(window_days).ok_or(Error::InvalidWindow)?,
        })
    }

    /// Set the free-text search.
    pub fn with_search(mut self, search_text: &str) -> Self {
        self.search_text = search_text.to_owned();
        self
    }

    /// Set the required status value.
    pub fn with_status(mut self, status_value: &str) -> Self {
        self.status_value = status_value.to_owned();
        self
    }

    /// Whether `record` passes the search, status and date predicates.
    ///
    /// Prefer [filter] for whole collections since it lower-cases the search
    /// text once instead of once per record.
    pub fn matches(&self, record: &Record, context: &ViewContext) -> bool {
        let needle = self.search_text.to_lowercase();
        self.matches_with_needle(record, &needle, context)
    }

    fn matches_with_needle(&self, record: &Record, needle: &str, context: &ViewContext) -> bool {
        self.matches_search(record, needle)
            && self.matches_status(record)
            && self.matches_window(record, context)
    }

    fn matches_search(&self, record: &Record, needle: &str) -> bool {
        needle.is_empty()
            || self.search_fields.iter().any(|field| {
                record
                    .text(field)
                    .is_some_and(|text| text.to_lowercase().contains(needle))
            })
    }

    fn matches_status(&self, record: &Record) -> bool {
        if self.status_value == ALL_STATUSES {
            return true;
        }

        match &self.status_field {
            None => true,
            Some(field) => record
                .text(field)
                .is_some_and(|status| status == self.status_value),
        }
    }

    /// A window reaching back before the earliest representable date is unbounded.
    fn matches_window(&self, record: &Record, context: &ViewContext) -> bool {
        let window_start = context
            .now
            .checked_sub(Duration::days(i64::from(self.window_days.get())));

        record
            .timestamp(&self.date_field, context.offset)
            .is_some_and(|timestamp| window_start.is_none_or(|start| timestamp >= start))
    }
}

/// Keep the records that match `criteria`, preserving their order.
///
/// Records whose date field is missing or cannot be parsed never match.
pub fn filter(records: &[Record], criteria: &FilterCriteria, context: &ViewContext) -> Vec<Record> {
    let needle = criteria.search_text.to_lowercase();

    let filtered: Vec<Record> = records
        .iter()
        .filter(|record| criteria.matches_with_needle(record, &needle, context))
        .cloned()
        .collect();

    tracing::debug!(
        "filtered {} records down to {} (search={:?}, status={:?}, window={} days)",
        records.len(),
        filtered.len(),
        criteria.search_text,
        criteria.status_value,
        criteria.window_days
    );

    filtered
}
