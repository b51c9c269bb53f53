//! Transforming batch
//!
//! Converts keys before buffering them in the child store's batch.
//! Atomicity and ordering of the buffered operations are the child's.

use bytes::Bytes;

use crate::datastore::Batch;
use crate::error::Result;
use crate::key::Key;

use super::KeyTransform;

/// A child batch whose keys are rewritten by a [`KeyTransform`]
pub struct TransformingBatch<'a> {
    inner: Box<dyn Batch + 'a>,
    transform: &'a KeyTransform,
}

impl<'a> TransformingBatch<'a> {
    pub fn new(inner: Box<dyn Batch + 'a>, transform: &'a KeyTransform) -> Self {
        Self { inner, transform }
    }
}

impl Batch for TransformingBatch<'_> {
    fn put(&mut self, key: &Key, value: Bytes) -> Result<()> {
        self.inner.put(&self.transform.convert(key), value)
    }

    fn delete(&mut self, key: &Key) -> Result<()> {
        self.inner.delete(&self.transform.convert(key))
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.inner.commit()
    }
}
