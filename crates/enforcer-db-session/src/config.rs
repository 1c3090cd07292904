//! Repository and list configuration.

use enforcer_db_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for [`Repository`](crate::Repository) behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Whether to count per-record parent loads and warn about N+1 patterns.
    pub detect_lazy_loads: bool,
    /// Loads of one relation after which the warning fires.
    pub lazy_load_warn_threshold: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            detect_lazy_loads: true,
            lazy_load_warn_threshold: 3,
        }
    }
}

impl RepositoryConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable lazy-load detection.
    pub fn detect_lazy_loads(mut self, enabled: bool) -> Self {
        self.detect_lazy_loads = enabled;
        self
    }

    /// Set the lazy-load warning threshold.
    pub fn lazy_load_warn_threshold(mut self, threshold: usize) -> Self {
        self.lazy_load_warn_threshold = threshold;
        self
    }

    /// Load from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("repository: {e}")))
    }
}

/// Configuration for [`EntityList`](crate::EntityList) behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Keep every decoded record for repeated passes and random access.
    pub object_store: bool,
    /// Fetch result sets eagerly even without the object store, so `size`
    /// is known and `begin` can rewind.
    pub fetch_all: bool,
}

impl ListConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the object store.
    pub fn object_store(mut self, enabled: bool) -> Self {
        self.object_store = enabled;
        self
    }

    /// Enable or disable eager fetching.
    pub fn fetch_all(mut self, enabled: bool) -> Self {
        self.fetch_all = enabled;
        self
    }

    /// Load from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("list: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_config_defaults() {
        let config = RepositoryConfig::default();
        assert!(config.detect_lazy_loads);
        assert_eq!(config.lazy_load_warn_threshold, 3);
    }

    #[test]
    fn test_repository_config_from_json() {
        let config = RepositoryConfig::from_json(r#"{"lazy_load_warn_threshold": 10}"#).unwrap();
        assert!(config.detect_lazy_loads);
        assert_eq!(config.lazy_load_warn_threshold, 10);
        assert!(RepositoryConfig::from_json("{").is_err());
    }

    #[test]
    fn test_list_config_builder_and_json() {
        let config = ListConfig::new().object_store(true);
        assert!(config.object_store);
        assert!(!config.fetch_all);

        let config = ListConfig::from_json(r#"{"fetch_all": true}"#).unwrap();
        assert!(!config.object_store);
        assert!(config.fetch_all);
    }
}
