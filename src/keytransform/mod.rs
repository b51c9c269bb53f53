//! Key Transform Module
//!
//! Wraps any datastore so every key passing through it is rewritten by an
//! invertible transform, while the wrapper still behaves like a native store.
//!
//! ## Responsibilities
//! - Convert logical keys to physical keys for point operations and batches
//! - Split queries between the child's native engine and a naive replay
//! - Invert physical keys in query results back to logical keys
//! - Forward optional capabilities, degrading when the child lacks them
//!
//! ## Usage
//! ```rust
//! use keytransform::{Datastore, Key, KeyTransform, MapDatastore, TransformingStore};
//!
//! let store = TransformingStore::new(MapDatastore::new(), KeyTransform::prefix("/ns"));
//! store.put(&Key::new("/a"), "v".into()).unwrap();
//! assert!(store.child().has(&Key::new("/ns/a")).unwrap());
//! ```

mod batch;
mod planner;
mod store;
mod transform;

use crate::datastore::Datastore;

pub use batch::TransformingBatch;
pub use planner::{prepare_query, SplitQuery};
pub use store::TransformingStore;
pub use transform::{KeyMapping, KeyTransform, KeyTransformPair, PrefixTransform};

/// Wrap `child` so every key is rewritten by `transform`
pub fn wrap<D: Datastore>(child: D, transform: impl Into<KeyTransform>) -> TransformingStore<D> {
    TransformingStore::new(child, transform)
}
