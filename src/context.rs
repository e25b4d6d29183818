//! The explicit clock and calendar every date-sensitive operation runs against.

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, timezone::get_offset_at};

/// The moment a view is computed for and the UTC offset its calendar uses.
///
/// Date windows are measured back from `now`, and bucket keys take their
/// calendar date from timestamps shifted into `offset`. Passing this in
/// explicitly keeps the engine free of ambient clock and locale state, so the
/// same inputs always produce the same view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ViewContext {
    /// The instant the view is computed for.
    pub now: OffsetDateTime,
    /// The offset used to derive calendar dates.
    pub offset: UtcOffset,
}

impl ViewContext {
    /// A context for the current instant in `canonical_timezone`, e.g. "Africa/Lagos".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the timezone name is not recognised.
    pub fn now_in(canonical_timezone: &str) -> Result<Self, Error> {
        let now = OffsetDateTime::now_utc();
        let offset = get_offset_at(canonical_timezone, now).ok_or_else(|| {
            tracing::warn!("could not resolve timezone \"{canonical_timezone}\"");
            Error::InvalidTimezone(canonical_timezone.to_owned())
        })?;

        Ok(Self::fixed(now, offset))
    }

    /// A context pinned to a given instant and offset.
    pub fn fixed(now: OffsetDateTime, offset: UtcOffset) -> Self {
        Self {
            now: now.to_offset(offset),
            offset,
        }
    }
}
