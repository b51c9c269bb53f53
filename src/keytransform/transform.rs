//! Key transforms
//!
//! Invertible mappings between the logical key space a caller sees and the
//! physical key space a child store holds.

use std::fmt;
use std::sync::Arc;

use crate::error::{DatastoreError, Result};
use crate::key::Key;

/// A function from one key to another
pub type KeyMapping = Arc<dyn Fn(&Key) -> Key + Send + Sync>;

/// Mounts keys beneath a fixed prefix
///
/// `convert(/a)` under prefix `/ns` is `/ns/a`. Prefixing preserves
/// lexicographic order, so stores can order and range-scan physical keys
/// on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTransform {
    pub prefix: Key,
}

impl PrefixTransform {
    pub fn new(prefix: impl Into<Key>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn convert_key(&self, key: &Key) -> Key {
        self.prefix.child(key)
    }

    /// Strip the prefix
    ///
    /// Fails with `PrefixMismatch` when `key` does not live under the prefix.
    pub fn invert_key(&self, key: &Key) -> Result<Key> {
        if self.prefix.is_root() {
            return Ok(key.clone());
        }
        if key == &self.prefix {
            return Ok(Key::root());
        }
        if !self.prefix.is_ancestor_of(key) {
            return Err(DatastoreError::PrefixMismatch {
                prefix: self.prefix.clone(),
                key: key.clone(),
            });
        }
        Ok(Key::raw(&key.as_str()[self.prefix.as_str().len()..]))
    }
}

/// A transform built from a pair of caller-supplied functions
///
/// Nothing is known about the order of converted keys.
#[derive(Clone)]
pub struct KeyTransformPair {
    convert: KeyMapping,
    invert: KeyMapping,
}

impl KeyTransformPair {
    pub fn new(convert: KeyMapping, invert: KeyMapping) -> Self {
        Self { convert, invert }
    }
}

impl fmt::Debug for KeyTransformPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyTransformPair").finish_non_exhaustive()
    }
}

/// Every supported key transform
///
/// Callers rely on `invert(convert(k)) == k` for every key `k`.
#[derive(Debug, Clone)]
pub enum KeyTransform {
    Prefix(PrefixTransform),
    Pair(KeyTransformPair),
}

impl KeyTransform {
    /// Prefix every key with `prefix`
    pub fn prefix(prefix: impl Into<Key>) -> Self {
        KeyTransform::Prefix(PrefixTransform::new(prefix))
    }

    /// Transform through arbitrary functions
    pub fn pair(
        convert: impl Fn(&Key) -> Key + Send + Sync + 'static,
        invert: impl Fn(&Key) -> Key + Send + Sync + 'static,
    ) -> Self {
        KeyTransform::Pair(KeyTransformPair::new(Arc::new(convert), Arc::new(invert)))
    }

    /// Logical key → physical key
    pub fn convert(&self, key: &Key) -> Key {
        match self {
            KeyTransform::Prefix(prefix) => prefix.convert_key(key),
            KeyTransform::Pair(pair) => (pair.convert)(key),
        }
    }

    /// Physical key → logical key
    pub fn invert(&self, key: &Key) -> Result<Key> {
        match self {
            KeyTransform::Prefix(prefix) => prefix.invert_key(key),
            KeyTransform::Pair(pair) => Ok((pair.invert)(key)),
        }
    }

    /// Whether physical keys sort exactly like their logical keys
    pub fn is_order_preserving(&self) -> bool {
        match self {
            KeyTransform::Prefix(_) => true,
            KeyTransform::Pair(_) => false,
        }
    }
}

impl From<PrefixTransform> for KeyTransform {
    fn from(prefix: PrefixTransform) -> Self {
        KeyTransform::Prefix(prefix)
    }
}

impl From<KeyTransformPair> for KeyTransform {
    fn from(pair: KeyTransformPair) -> Self {
        KeyTransform::Pair(pair)
    }
}
