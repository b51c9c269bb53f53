//! Transforming store
//!
//! Wraps a child datastore, converting every key on the way in and
//! inverting every key on the way out.

use bytes::Bytes;

use crate::datastore::{
    self, Batch, Batching, CheckedDatastore, Datastore, GcDatastore, PersistentDatastore,
    ScrubbedDatastore,
};
use crate::error::{DatastoreError, Result};
use crate::key::Key;
use crate::query::{naive_query_apply, Query, QueryResult, ResultSource, Results};

use super::batch::TransformingBatch;
use super::planner::{prepare_query, SplitQuery};
use super::KeyTransform;

/// A datastore whose keys are rewritten by a [`KeyTransform`]
///
/// ## Concurrency:
/// - No locks of its own: the transform is immutable after construction
/// - Every guarantee (and limitation) of the child store carries through unchanged
pub struct TransformingStore<D> {
    child: D,
    transform: KeyTransform,
}

impl<D: Datastore> TransformingStore<D> {
    /// Wrap `child`, transforming every key with `transform`
    pub fn new(child: D, transform: impl Into<KeyTransform>) -> Self {
        Self {
            child,
            transform: transform.into(),
        }
    }

    /// The wrapped store
    pub fn child(&self) -> &D {
        &self.child
    }

    /// Every store this one delegates to
    pub fn children(&self) -> Vec<&dyn Datastore> {
        vec![&self.child]
    }

    pub fn transform(&self) -> &KeyTransform {
        &self.transform
    }

    /// Logical key → physical key
    pub fn convert_key(&self, key: &Key) -> Key {
        self.transform.convert(key)
    }

    /// Physical key → logical key
    pub fn invert_key(&self, key: &Key) -> Result<Key> {
        self.transform.invert(key)
    }

    /// Show how a query would be split between the child and the naive pass
    pub fn plan_query(&self, query: &Query) -> SplitQuery {
        prepare_query(&self.transform, query)
    }

    /// Unwrap, returning the child store
    pub fn into_inner(self) -> D {
        self.child
    }
}

impl<D: Datastore> Datastore for TransformingStore<D> {
    fn put(&self, key: &Key, value: Bytes) -> Result<()> {
        self.child.put(&self.convert_key(key), value)
    }

    fn get(&self, key: &Key) -> Result<Bytes> {
        self.child.get(&self.convert_key(key))
    }

    fn has(&self, key: &Key) -> Result<bool> {
        self.child.has(&self.convert_key(key))
    }

    fn get_size(&self, key: &Key) -> Result<usize> {
        self.child.get_size(&self.convert_key(key))
    }

    fn delete(&self, key: &Key) -> Result<()> {
        self.child.delete(&self.convert_key(key))
    }

    fn sync(&self, prefix: &Key) -> Result<()> {
        self.child.sync(&self.convert_key(prefix))
    }

    fn close(&self) -> Result<()> {
        self.child.close()
    }

    /// Run the child half of the split, invert its keys, then replay the rest
    fn query(&self, query: &Query) -> Result<Results> {
        let SplitQuery { naive, child } = self.plan_query(query);

        let child_results = self.child.query(&child)?;

        let inverted = Results::new(
            query.clone(),
            InvertKeys {
                inner: child_results,
                transform: self.transform.clone(),
            },
        );
        Ok(naive_query_apply(&naive, inverted))
    }

    fn as_persistent(&self) -> Option<&dyn PersistentDatastore> {
        Some(self)
    }

    fn as_checked(&self) -> Option<&dyn CheckedDatastore> {
        Some(self)
    }

    fn as_scrubbed(&self) -> Option<&dyn ScrubbedDatastore> {
        Some(self)
    }

    fn as_gc(&self) -> Option<&dyn GcDatastore> {
        Some(self)
    }

    fn as_batching(&self) -> Option<&dyn Batching> {
        Some(self)
    }
}

// =============================================================================
// Optional Capabilities
// =============================================================================

impl<D: Datastore> PersistentDatastore for TransformingStore<D> {
    /// The child's usage, or 0 when the child does not report it
    fn disk_usage(&self) -> Result<u64> {
        datastore::disk_usage(&self.child)
    }
}

impl<D: Datastore> CheckedDatastore for TransformingStore<D> {
    fn check(&self) -> Result<()> {
        match self.child.as_checked() {
            Some(checked) => checked.check(),
            None => Ok(()),
        }
    }
}

impl<D: Datastore> ScrubbedDatastore for TransformingStore<D> {
    fn scrub(&self) -> Result<()> {
        match self.child.as_scrubbed() {
            Some(scrubbed) => scrubbed.scrub(),
            None => Ok(()),
        }
    }
}

impl<D: Datastore> GcDatastore for TransformingStore<D> {
    fn collect_garbage(&self) -> Result<()> {
        match self.child.as_gc() {
            Some(gc) => gc.collect_garbage(),
            None => Ok(()),
        }
    }
}

impl<D: Datastore> Batching for TransformingStore<D> {
    /// Fails with `BatchUnsupported` when the child cannot batch
    fn batch(&self) -> Result<Box<dyn Batch + '_>> {
        let batching = self
            .child
            .as_batching()
            .ok_or(DatastoreError::BatchUnsupported)?;
        let inner = batching.batch()?;
        Ok(Box::new(TransformingBatch::new(inner, &self.transform)))
    }
}

impl<D> std::fmt::Debug for TransformingStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformingStore")
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Result Key Inversion
// =============================================================================

/// Inverts the key of every successful entry from the child
///
/// Error entries pass through untouched; their keys may be meaningless.
struct InvertKeys {
    inner: Results,
    transform: KeyTransform,
}

impl Iterator for InvertKeys {
    type Item = QueryResult;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        Some(result.and_then(|mut entry| {
            entry.key = self.transform.invert(&entry.key)?;
            Ok(entry)
        }))
    }
}

impl ResultSource for InvertKeys {
    fn close(&mut self) -> Result<()> {
        self.inner.close_source()
    }
}
