//! Datastore Module
//!
//! The key-value store interface every backend and wrapper implements.
//!
//! ## Capabilities
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Datastore (required)                                 │
//! │   put / get / has / get_size / delete                │
//! │   sync / close / query                               │
//! ├──────────────────────────────────────────────────────┤
//! │ Optional, discovered through as_* accessors          │
//! │   PersistentDatastore  → disk_usage                  │
//! │   CheckedDatastore     → check                       │
//! │   ScrubbedDatastore    → scrub                       │
//! │   GcDatastore          → collect_garbage             │
//! │   Batching             → batch (atomic writes)       │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! All methods take `&self`: stores are shared across threads and handle
//! their own synchronization.

mod map;

use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::key::Key;
use crate::query::{Query, Results};

pub use map::MapDatastore;

/// A key-value store
pub trait Datastore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    fn put(&self, key: &Key, value: Bytes) -> Result<()>;

    /// Fetch the value under `key`, or [`DatastoreError::NotFound`]
    ///
    /// [`DatastoreError::NotFound`]: crate::DatastoreError::NotFound
    fn get(&self, key: &Key) -> Result<Bytes>;

    fn has(&self, key: &Key) -> Result<bool>;

    /// Size in bytes of the value under `key`, or `NotFound`
    fn get_size(&self, key: &Key) -> Result<usize>;

    /// Remove `key`; removing a missing key is not an error
    fn delete(&self, key: &Key) -> Result<()>;

    /// Make every write beneath `prefix` durable
    fn sync(&self, prefix: &Key) -> Result<()>;

    fn close(&self) -> Result<()>;

    /// Run a query, returning a lazy result stream
    fn query(&self, query: &Query) -> Result<Results>;

    // -------------------------------------------------------------------------
    // Optional Capabilities
    // -------------------------------------------------------------------------

    fn as_persistent(&self) -> Option<&dyn PersistentDatastore> {
        None
    }

    fn as_checked(&self) -> Option<&dyn CheckedDatastore> {
        None
    }

    fn as_scrubbed(&self) -> Option<&dyn ScrubbedDatastore> {
        None
    }

    fn as_gc(&self) -> Option<&dyn GcDatastore> {
        None
    }

    fn as_batching(&self) -> Option<&dyn Batching> {
        None
    }
}

/// A store that can report how much space it occupies
pub trait PersistentDatastore {
    /// Approximate size on disk in bytes
    fn disk_usage(&self) -> Result<u64>;
}

/// A store that can verify its own integrity
pub trait CheckedDatastore {
    fn check(&self) -> Result<()>;
}

/// A store that can repair or discard corrupted data
pub trait ScrubbedDatastore {
    fn scrub(&self) -> Result<()>;
}

/// A store that can reclaim unused space
pub trait GcDatastore {
    fn collect_garbage(&self) -> Result<()>;
}

/// A store that supports atomic multi-key writes
pub trait Batching {
    fn batch(&self) -> Result<Box<dyn Batch + '_>>;
}

/// Buffered writes applied atomically on commit
pub trait Batch: Send {
    fn put(&mut self, key: &Key, value: Bytes) -> Result<()>;

    fn delete(&mut self, key: &Key) -> Result<()>;

    fn commit(self: Box<Self>) -> Result<()>;
}

/// Disk usage of any store; stores that don't report it use no space
pub fn disk_usage(store: &dyn Datastore) -> Result<u64> {
    match store.as_persistent() {
        Some(persistent) => persistent.disk_usage(),
        None => Ok(0),
    }
}

// =============================================================================
// Shared Stores
// =============================================================================

impl<T: Datastore + ?Sized> Datastore for Arc<T> {
    fn put(&self, key: &Key, value: Bytes) -> Result<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &Key) -> Result<Bytes> {
        (**self).get(key)
    }

    fn has(&self, key: &Key) -> Result<bool> {
        (**self).has(key)
    }

    fn get_size(&self, key: &Key) -> Result<usize> {
        (**self).get_size(key)
    }

    fn delete(&self, key: &Key) -> Result<()> {
        (**self).delete(key)
    }

    fn sync(&self, prefix: &Key) -> Result<()> {
        (**self).sync(prefix)
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }

    fn query(&self, query: &Query) -> Result<Results> {
        (**self).query(query)
    }

    fn as_persistent(&self) -> Option<&dyn PersistentDatastore> {
        (**self).as_persistent()
    }

    fn as_checked(&self) -> Option<&dyn CheckedDatastore> {
        (**self).as_checked()
    }

    fn as_scrubbed(&self) -> Option<&dyn ScrubbedDatastore> {
        (**self).as_scrubbed()
    }

    fn as_gc(&self) -> Option<&dyn GcDatastore> {
        (**self).as_gc()
    }

    fn as_batching(&self) -> Option<&dyn Batching> {
        (**self).as_batching()
    }
}
