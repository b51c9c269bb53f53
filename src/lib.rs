//! # keytransform
//!
//! A key-transforming datastore wrapper:
//! - Invertible key transforms (prefix mounting, arbitrary function pairs)
//! - Transparent pass-through of every datastore operation
//! - Query planning that pushes as much work as possible into the child store
//! - Atomic batches with transformed keys
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Caller                               │
//! │                   (logical key space)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  TransformingStore                           │
//! │        convert keys · plan queries · invert results          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Child Store │          │ Naive Query │
//!   │ (physical)  │ ───────▶ │  (logical)  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod query;
pub mod datastore;
pub mod keytransform;
pub mod namespace;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DatastoreError, Result};
pub use config::Config;
pub use key::Key;
pub use query::{Entry, Filter, Order, Query, Results};
pub use datastore::{
    Batch, Batching, CheckedDatastore, Datastore, GcDatastore, MapDatastore, PersistentDatastore,
    ScrubbedDatastore,
};
pub use keytransform::{KeyTransform, PrefixTransform, TransformingStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of keytransform
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
