//! Memoization of recomputed view-state.
//!
//! Filtering and bucketing are pure, so their results can be reused whenever
//! the same dataset is viewed with the same inputs. Keys are SHA-256 digests
//! of the dataset version and the JSON form of the inputs.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::Error;

/// A digest identifying one set of recomputation inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Derive a key from a dataset version and the serialized `inputs`.
    ///
    /// # Errors
    /// Returns [Error::JsonSerialization] if `inputs` cannot be serialized.
    pub fn new<T: Serialize + ?Sized>(dataset_version: u64, inputs: &T) -> Result<Self, Error> {
        let serialized = serde_json::to_vec(inputs)?;

        let mut hasher = Sha256::new();
        hasher.update(dataset_version.to_le_bytes());
        hasher.update(&serialized);

        Ok(Self(hasher.finalize().into()))
    }
}

/// A bounded cache of recomputed values.
///
/// Once `capacity` entries are stored, inserting a new one evicts the oldest.
#[derive(Debug)]
pub struct MemoCache<V> {
    capacity: usize,
    entries: HashMap<CacheKey, Arc<V>>,
    insertion_order: VecDeque<CacheKey>,
}

impl<V> MemoCache<V> {
    /// Create a cache that holds at most `capacity` values (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            insertion_order: VecDeque::with_capacity(capacity),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute(&mut self, key: CacheKey, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some(value) = self.entries.get(&key) {
            tracing::trace!("memo cache hit");
            return Arc::clone(value);
        }

        tracing::trace!("memo cache miss");
        let value = Arc::new(compute());

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(key, Arc::clone(&value));
        self.insertion_order.push_back(key);

        value
    }

    /// The number of cached values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached value.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}
