//! The shared, read-only raw collection behind a view.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::Record;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// A fetched record collection and the version that identifies it.
///
/// Every call to [Dataset::new] gets a fresh version, so a refetch is never
/// mistaken for the previous collection by the memoization caches even if
/// its records happen to be equal. Clones share the same records and version.
#[derive(Debug, Clone)]
pub struct Dataset {
    version: u64,
    records: Arc<[Record]>,
}

impl Dataset {
    /// Wrap a freshly fetched collection.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
            records: records.into(),
        }
    }

    /// Wrap a collection under a version chosen by the caller, e.g. an ETag counter.
    pub fn with_version(version: u64, records: Vec<Record>) -> Self {
        Self {
            version,
            records: records.into(),
        }
    }

    /// The version identifying this collection.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The records, in the order they were fetched.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
