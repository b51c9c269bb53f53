//! Namespace Module
//!
//! Mounts an entire child datastore under a key prefix.
//!
//! ```rust
//! use keytransform::{namespace, Datastore, Key, MapDatastore};
//! use std::sync::Arc;
//!
//! let db = Arc::new(MapDatastore::new());
//! let ns = namespace::wrap(Arc::clone(&db), Key::new("/foo/bar"));
//!
//! ns.put(&Key::new("/beep"), "boop".into()).unwrap();
//! assert_eq!(db.get(&Key::new("/foo/bar/beep")).unwrap(), "boop");
//! ```

use crate::datastore::Datastore;
use crate::key::Key;
use crate::keytransform::{PrefixTransform, TransformingStore};

/// A transform mounting keys beneath `prefix`
pub fn prefix_transform(prefix: Key) -> PrefixTransform {
    PrefixTransform { prefix }
}

/// Wrap `child` so every key lives beneath `prefix`
pub fn wrap<D: Datastore>(child: D, prefix: Key) -> TransformingStore<D> {
    TransformingStore::new(child, prefix_transform(prefix))
}
