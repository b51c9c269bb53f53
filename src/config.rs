//! Configuration for keytransform
//!
//! Centralized configuration with sensible defaults.

use crate::error::{DatastoreError, Result};
use crate::key::Key;
use crate::keytransform::PrefixTransform;

/// Default tracing directive for binaries
pub const DEFAULT_LOG_FILTER: &str = "info,keytransform=debug";

/// Main configuration for a namespaced store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Namespace Configuration
    // -------------------------------------------------------------------------
    /// Prefix the whole child store is mounted under.
    /// Cleaned into a key, so "ns", "/ns" and "/ns/" are the same namespace.
    pub namespace: String,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// Filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: "/".to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the namespace can be used as a key prefix
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(DatastoreError::Config("namespace must not be empty".to_string()));
        }
        if self.namespace.contains('\0') {
            return Err(DatastoreError::Config(format!(
                "namespace {:?} contains a NUL byte",
                self.namespace
            )));
        }
        if self.namespace.split('/').any(|segment| segment == "..") {
            return Err(DatastoreError::Config(format!(
                "namespace {:?} must not contain '..'",
                self.namespace
            )));
        }
        Ok(())
    }

    /// The namespace as a canonical key
    pub fn namespace_key(&self) -> Key {
        Key::new(&self.namespace)
    }

    /// Validate and build the transform mounting keys under the namespace
    pub fn prefix_transform(&self) -> Result<PrefixTransform> {
        self.validate()?;
        Ok(PrefixTransform::new(self.namespace_key()))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the namespace prefix
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the default log filter directive
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
