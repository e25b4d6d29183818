//! Where records come from.
//!
//! The engine itself never fetches anything. Fetching is the job of a
//! [RecordSource], which the surrounding application implements against the
//! platform API. [FileRecordSource] reads exported records from disk and is
//! what the `dashboard-report` tool uses.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};

use crate::{Error, Record, config::ViewKey};

/// The signed-in operator a fetch is made on behalf of.
///
/// Passed explicitly to every fetch instead of being read from ambient storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The operator's user ID.
    pub user_id: String,
    /// The business whose records are being viewed.
    pub business_id: String,
}

/// Fetches the raw record collection behind a view.
pub trait RecordSource {
    /// Fetch every record for `view` visible to `session`.
    ///
    /// # Errors
    /// Implementations return an error if the records could not be retrieved
    /// or decoded.
    fn fetch_records(&self, view: ViewKey, session: &Session) -> Result<Vec<Record>, Error>;
}

/// Reads records from `<view>.json` or `<view>.csv` files in a directory.
///
/// JSON files must hold an array of objects. CSV files must have a header
/// row; every cell becomes a string field named after its column, so numeric
/// and date columns are parsed later by the same rules as string fields.
#[derive(Debug, Clone)]
pub struct FileRecordSource {
    directory: PathBuf,
}

impl FileRecordSource {
    /// Read records from files in `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn load_json(path: &Path) -> Result<Vec<Record>, Error> {
        let file = File::open(path).map_err(|error| Error::RecordParse(error.to_string()))?;

        serde_json::from_reader(BufReader::new(file))
            .map_err(|error| Error::RecordParse(format!("{}: {error}", path.display())))
    }

    fn load_csv(path: &Path) -> Result<Vec<Record>, Error> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        reader
            .records()
            .map(|row| {
                let row = row?;
                let fields: Map<String, Value> = headers
                    .iter()
                    .zip(row.iter())
                    .map(|(header, cell)| (header.to_owned(), Value::String(cell.to_owned())))
                    .collect();
                Ok(Record::from(fields))
            })
            .collect()
    }
}

impl RecordSource for FileRecordSource {
    fn fetch_records(&self, view: ViewKey, session: &Session) -> Result<Vec<Record>, Error> {
        let json_path = self.directory.join(format!("{view}.json"));
        let csv_path = self.directory.join(format!("{view}.csv"));

        let records = if json_path.is_file() {
            Self::load_json(&json_path)?
        } else if csv_path.is_file() {
            Self::load_csv(&csv_path)?
        } else {
            tracing::warn!(
                "no record file for {view} in {}",
                self.directory.display()
            );
            return Err(Error::RecordsNotFound(view.to_string()));
        };

        tracing::info!(
            "loaded {} {view} records for user {} of business {}",
            records.len(),
            session.user_id,
            session.business_id
        );

        Ok(records)
    }
}
