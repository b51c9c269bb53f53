//! Error types for keytransform
//!
//! Provides a unified error type for datastore, query and transform operations.

use thiserror::Error;

use crate::key::Key;

/// Result type alias using DatastoreError
pub type Result<T> = std::result::Result<T, DatastoreError>;

/// Unified error type for datastore operations
#[derive(Debug, Error)]
pub enum DatastoreError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("datastore: key not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Capability Errors
    // -------------------------------------------------------------------------
    #[error("this datastore does not support batching")]
    BatchUnsupported,

    // -------------------------------------------------------------------------
    // Transform Errors
    // -------------------------------------------------------------------------
    #[error("expected prefix {prefix} not found in key {key}")]
    PrefixMismatch { prefix: Key, key: Key },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("datastore is closed")]
    Closed,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Query Errors
    // -------------------------------------------------------------------------
    #[error("Query error: {0}")]
    Query(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DatastoreError {
    /// Whether this error reports a missing key
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatastoreError::NotFound)
    }
}
