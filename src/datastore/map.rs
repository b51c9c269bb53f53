//! In-memory datastore
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::{DatastoreError, Result};
use crate::key::Key;
use crate::query::{naive_query_apply, Entry, Query, Results};

use super::{Batch, Batching, Datastore, PersistentDatastore};

/// In-memory key-value store
///
/// ## Concurrency:
/// - `data`: Protected by RwLock (many concurrent readers, exclusive writer)
/// - Queries snapshot the matching entries, so a result stream never holds the lock
/// - Batches apply all of their operations under a single write lock
pub struct MapDatastore {
    /// Sorted key → value map
    data: RwLock<BTreeMap<Key, Bytes>>,

    /// Set by `close`; every later operation fails with `Closed`
    closed: AtomicBool,
}

impl MapDatastore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// All stored keys in sorted order (for testing and debugging)
    pub fn keys(&self) -> Vec<Key> {
        self.data.read().keys().cloned().collect()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DatastoreError::Closed);
        }
        Ok(())
    }
}

impl Default for MapDatastore {
    fn default() -> Self {
        Self::new()
    }
}

impl Datastore for MapDatastore {
    fn put(&self, key: &Key, value: Bytes) -> Result<()> {
        self.ensure_open()?;
        self.data.write().insert(key.clone(), value);
        Ok(())
    }

    fn get(&self, key: &Key) -> Result<Bytes> {
        self.ensure_open()?;
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or(DatastoreError::NotFound)
    }

    fn has(&self, key: &Key) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.data.read().contains_key(key))
    }

    fn get_size(&self, key: &Key) -> Result<usize> {
        self.ensure_open()?;
        self.data
            .read()
            .get(key)
            .map(|value| value.len())
            .ok_or(DatastoreError::NotFound)
    }

    fn delete(&self, key: &Key) -> Result<()> {
        self.ensure_open()?;
        self.data.write().remove(key);
        Ok(())
    }

    /// Nothing to flush: every write is immediately visible
    fn sync(&self, _prefix: &Key) -> Result<()> {
        self.ensure_open()
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn query(&self, query: &Query) -> Result<Results> {
        self.ensure_open()?;

        // Narrow the snapshot to keys sharing the prefix string; the naive
        // pass then enforces the exact `prefix/` boundary and everything else.
        let entries: Vec<Entry> = {
            let data = self.data.read();
            data.range(query.prefix.clone()..)
                .take_while(|(key, _)| {
                    query.prefix.is_root() || key.has_prefix(query.prefix.as_str())
                })
                .map(|(key, value)| Entry {
                    key: key.clone(),
                    value: if query.keys_only { Bytes::new() } else { value.clone() },
                    size: query.returns_sizes.then_some(value.len()),
                })
                .collect()
        };

        tracing::trace!(query = %query, snapshot = entries.len(), "map datastore query");
        Ok(naive_query_apply(
            query,
            Results::from_entries(query.clone(), entries),
        ))
    }

    fn as_persistent(&self) -> Option<&dyn PersistentDatastore> {
        Some(self)
    }

    fn as_batching(&self) -> Option<&dyn Batching> {
        Some(self)
    }
}

impl PersistentDatastore for MapDatastore {
    /// Bytes held by keys and values
    fn disk_usage(&self) -> Result<u64> {
        self.ensure_open()?;
        let data = self.data.read();
        Ok(data
            .iter()
            .map(|(key, value)| (key.as_str().len() + value.len()) as u64)
            .sum())
    }
}

impl Batching for MapDatastore {
    fn batch(&self) -> Result<Box<dyn Batch + '_>> {
        self.ensure_open()?;
        Ok(Box::new(MapBatch {
            store: self,
            ops: Vec::new(),
        }))
    }
}

// =============================================================================
// Batch
// =============================================================================

enum BatchOp {
    Put { key: Key, value: Bytes },
    Delete { key: Key },
}

/// Buffered writes against a [`MapDatastore`]
struct MapBatch<'a> {
    store: &'a MapDatastore,
    ops: Vec<BatchOp>,
}

impl Batch for MapBatch<'_> {
    fn put(&mut self, key: &Key, value: Bytes) -> Result<()> {
        self.ops.push(BatchOp::Put {
            key: key.clone(),
            value,
        });
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<()> {
        self.ops.push(BatchOp::Delete { key: key.clone() });
        Ok(())
    }

    /// Apply buffered operations in order, atomically
    fn commit(self: Box<Self>) -> Result<()> {
        let MapBatch { store, ops } = *self;
        store.ensure_open()?;
        let mut data = store.data.write();
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}
