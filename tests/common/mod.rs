//! Shared test helpers
//!
//! - `RecordingDatastore`: a child store that logs every call it receives
//! - `reversing_transform`: a transform that does not preserve key order

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use keytransform::datastore::{
    Batch, Batching, CheckedDatastore, Datastore, GcDatastore, MapDatastore, PersistentDatastore,
    ScrubbedDatastore,
};
use keytransform::query::{Query, Results};
use keytransform::{DatastoreError, Key, KeyTransform, Result};
use parking_lot::Mutex;

// =============================================================================
// Recording Child Store
// =============================================================================

/// A call observed by the recording store, with the physical key it carried
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Put(Key),
    Get(Key),
    Has(Key),
    GetSize(Key),
    Delete(Key),
    Sync(Key),
    Close,
    Query(Query),
    DiskUsage,
    Check,
    Scrub,
    CollectGarbage,
    BatchPut(Key),
    BatchDelete(Key),
    BatchCommit,
}

/// Which optional capabilities the recording store exposes
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub persistent: bool,
    pub checked: bool,
    pub scrubbed: bool,
    pub gc: bool,
    pub batching: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            persistent: true,
            checked: true,
            scrubbed: true,
            gc: true,
            batching: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// Child store backed by a `MapDatastore` that records every call
pub struct RecordingDatastore {
    inner: MapDatastore,
    calls: Mutex<Vec<Call>>,
    capabilities: Capabilities,
    results_closed: Arc<AtomicUsize>,
    failing_capabilities: bool,
    query_error_after: Option<usize>,
}

impl RecordingDatastore {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            inner: MapDatastore::new(),
            calls: Mutex::new(Vec::new()),
            capabilities,
            results_closed: Arc::new(AtomicUsize::new(0)),
            failing_capabilities: false,
            query_error_after: None,
        }
    }

    /// Check, scrub and garbage collection all fail
    pub fn with_failing_capabilities(mut self) -> Self {
        self.failing_capabilities = true;
        self
    }

    /// Query streams yield an error after `count` entries
    pub fn with_query_error_after(mut self, count: usize) -> Self {
        self.query_error_after = Some(count);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// The queries the child was asked to run
    pub fn queries(&self) -> Vec<Query> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Query(q) => Some(q.clone()),
                _ => None,
            })
            .collect()
    }

    /// How many result streams handed out have been closed
    pub fn results_closed(&self) -> usize {
        self.results_closed.load(Ordering::SeqCst)
    }

    /// Physical keys currently stored
    pub fn keys(&self) -> Vec<Key> {
        self.inner.keys()
    }

    /// Seed a physical key directly, bypassing the recorder
    pub fn seed(&self, key: &str, value: &str) {
        self.inner
            .put(&Key::new(key), Bytes::copy_from_slice(value.as_bytes()))
            .unwrap();
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn capability_result(&self, name: &str) -> Result<()> {
        if self.failing_capabilities {
            Err(DatastoreError::Storage(format!("{name} failed")))
        } else {
            Ok(())
        }
    }
}

impl Datastore for RecordingDatastore {
    fn put(&self, key: &Key, value: Bytes) -> Result<()> {
        self.record(Call::Put(key.clone()));
        self.inner.put(key, value)
    }

    fn get(&self, key: &Key) -> Result<Bytes> {
        self.record(Call::Get(key.clone()));
        self.inner.get(key)
    }

    fn has(&self, key: &Key) -> Result<bool> {
        self.record(Call::Has(key.clone()));
        self.inner.has(key)
    }

    fn get_size(&self, key: &Key) -> Result<usize> {
        self.record(Call::GetSize(key.clone()));
        self.inner.get_size(key)
    }

    fn delete(&self, key: &Key) -> Result<()> {
        self.record(Call::Delete(key.clone()));
        self.inner.delete(key)
    }

    fn sync(&self, prefix: &Key) -> Result<()> {
        self.record(Call::Sync(prefix.clone()));
        self.inner.sync(prefix)
    }

    fn close(&self) -> Result<()> {
        self.record(Call::Close);
        self.inner.close()
    }

    fn query(&self, query: &Query) -> Result<Results> {
        self.record(Call::Query(query.clone()));
        let results = self.inner.query(query)?;

        let closed = Arc::clone(&self.results_closed);
        let closer = move || {
            closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        Ok(match self.query_error_after {
            Some(count) => {
                let failing = results
                    .take(count)
                    .chain(std::iter::once(Err(DatastoreError::Storage(
                        "cursor failed".to_string(),
                    ))));
                Results::with_closer(query.clone(), failing, closer)
            }
            None => Results::with_closer(query.clone(), results, closer),
        })
    }

    fn as_persistent(&self) -> Option<&dyn PersistentDatastore> {
        self.capabilities.persistent.then_some(self as &dyn PersistentDatastore)
    }

    fn as_checked(&self) -> Option<&dyn CheckedDatastore> {
        self.capabilities.checked.then_some(self as &dyn CheckedDatastore)
    }

    fn as_scrubbed(&self) -> Option<&dyn ScrubbedDatastore> {
        self.capabilities.scrubbed.then_some(self as &dyn ScrubbedDatastore)
    }

    fn as_gc(&self) -> Option<&dyn GcDatastore> {
        self.capabilities.gc.then_some(self as &dyn GcDatastore)
    }

    fn as_batching(&self) -> Option<&dyn Batching> {
        self.capabilities.batching.then_some(self as &dyn Batching)
    }
}

impl PersistentDatastore for RecordingDatastore {
    fn disk_usage(&self) -> Result<u64> {
        self.record(Call::DiskUsage);
        self.inner.disk_usage()
    }
}

impl CheckedDatastore for RecordingDatastore {
    fn check(&self) -> Result<()> {
        self.record(Call::Check);
        self.capability_result("check")
    }
}

impl ScrubbedDatastore for RecordingDatastore {
    fn scrub(&self) -> Result<()> {
        self.record(Call::Scrub);
        self.capability_result("scrub")
    }
}

impl GcDatastore for RecordingDatastore {
    fn collect_garbage(&self) -> Result<()> {
        self.record(Call::CollectGarbage);
        self.capability_result("gc")
    }
}

impl Batching for RecordingDatastore {
    fn batch(&self) -> Result<Box<dyn Batch + '_>> {
        Ok(Box::new(RecordingBatch {
            store: self,
            inner: self.inner.batch()?,
        }))
    }
}

struct RecordingBatch<'a> {
    store: &'a RecordingDatastore,
    inner: Box<dyn Batch + 'a>,
}

impl Batch for RecordingBatch<'_> {
    fn put(&mut self, key: &Key, value: Bytes) -> Result<()> {
        self.store.record(Call::BatchPut(key.clone()));
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &Key) -> Result<()> {
        self.store.record(Call::BatchDelete(key.clone()));
        self.inner.delete(key)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.store.record(Call::BatchCommit);
        self.inner.commit()
    }
}

// =============================================================================
// Transforms
// =============================================================================

/// Mounts keys under `/x` with their namespaces reversed: `/a/b` → `/x/b/a`
///
/// Physical order has nothing to do with logical order.
pub fn reversing_transform() -> KeyTransform {
    KeyTransform::pair(
        |key: &Key| Key::new("/x").child(&key.reverse()),
        |key: &Key| Key::new(&key.as_str()["/x".len()..]).reverse(),
    )
}

// =============================================================================
// Helpers
// =============================================================================

pub fn key(s: &str) -> Key {
    Key::new(s)
}

pub fn value(s: &str) -> Bytes {
    Bytes::copy_from_slice(s.as_bytes())
}

/// Keys of every entry, panicking on errors
pub fn collect_keys(results: Results) -> Vec<String> {
    results
        .rest()
        .unwrap()
        .into_iter()
        .map(|entry| entry.key.into_string())
        .collect()
}
