//! Paydash is the data engine behind an operator dashboard for a payments and
//! messaging platform.
//!
//! Every list view on the dashboard (balances, transfers, API keys, sender IDs,
//! cardholders, events) follows the same pattern: take an already-fetched
//! collection of records, narrow it by free-text search, a status filter and a
//! relative date window, then show one page of the result. The analytics view
//! additionally buckets the filtered records into calendar periods and sums an
//! amount per category for charting.
//!
//! This library implements that filter -> aggregate -> paginate pipeline as
//! pure functions, plus memoized recompute-on-demand views on top of them.
//! It never performs I/O itself; see [RecordSource] for the seam where
//! records come from.

#![warn(missing_docs)]

mod aggregation;
mod charts;
mod config;
mod context;
mod dataset;
mod field;
mod filter;
mod memo;
mod pagination;
mod record;
mod series;
mod source;
mod timezone;
mod view;

#[cfg(test)]
mod test_utils;

pub use aggregation::{DAILY_BUCKET_LIMIT, Period, SeriesPoint, aggregate, bucket_key};
pub use charts::chart_options;
pub use config::{DEFAULT_WINDOW_DAYS, DashboardConfig, PaginationConfig, ViewConfig, ViewKey};
pub use context::ViewContext;
pub use dataset::Dataset;
pub use field::{FieldMap, FieldPath};
pub use filter::{ALL_STATUSES, FilterCriteria, filter};
pub use memo::{CacheKey, MemoCache};
pub use pagination::{PageRequest, PageResult, PageState, paginate};
pub use record::{Record, UNCATEGORIZED_LABEL};
pub use series::{ColorPalette, ColorToken, Series, build_series};
pub use source::{FileRecordSource, RecordSource, Session};
pub use timezone::get_local_offset;
pub use view::{AnalyticsView, ChartView, FilteredView, TableView};

/// The errors that may occur in the dashboard engine.
///
/// Data-shape anomalies (unparseable dates, non-numeric amounts, pages past
/// the end) are never errors. Only contract violations by the caller and
/// failures in the surrounding I/O layer are reported here.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A page request was made with a page size of zero.
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// Filter criteria were created with a date window of zero days.
    #[error("the date window must be at least one day")]
    InvalidWindow,

    /// A field path was empty or had an empty segment, e.g. `"customer..name"`.
    #[error("invalid field path \"{0}\"")]
    InvalidFieldPath(String),

    /// An error occurred while getting the UTC offset from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A view is missing a field it needs, e.g. a chart view with no amount field.
    #[error("view \"{view}\" has no {field} configured")]
    MissingField {
        /// The view with the incomplete configuration.
        view: String,
        /// The name of the missing setting.
        field: &'static str,
    },

    /// The requested view has no configuration.
    #[error("no view is configured for \"{0}\"")]
    UnknownView(String),

    /// The configuration file could not be read.
    ///
    /// Callers should pass in the path and the original error as a string.
    #[error("could not read config file \"{0}\": {1}")]
    ConfigRead(String, String),

    /// The configuration file was not valid JSON or did not match the expected shape.
    #[error("could not parse config: {0}")]
    ConfigParse(String),

    /// No record file exists for a view.
    #[error("no records found for view \"{0}\"")]
    RecordsNotFound(String),

    /// A record file could not be read or decoded as a list of JSON objects.
    #[error("could not load records: {0}")]
    RecordParse(String),

    /// The CSV had issues that prevented it from being parsed.
    #[error("could not parse the CSV file: {0}")]
    InvalidCsv(String),

    /// An error occurred while serializing a value as JSON
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::InvalidCsv(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JsonSerialization(value.to_string())
    }
}
