//! Combined configuration.

use serde::{Deserialize, Serialize};

use enforcer_db_core::{Error, Result};
use enforcer_db_memory::MemoryConfig;
use enforcer_db_session::{ListConfig, RepositoryConfig};

/// Backend, repository and list settings in one document.
///
/// ```json
/// {
///   "memory": { "fetch_mode": "fetched", "key_style": "text" },
///   "repository": { "lazy_load_warn_threshold": 10 },
///   "list": { "object_store": true }
/// }
/// ```
///
/// Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub memory: MemoryConfig,
    pub repository: RepositoryConfig,
    pub list: ListConfig,
}

impl DbConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn memory(mut self, config: MemoryConfig) -> Self {
        self.memory = config;
        self
    }

    #[must_use]
    pub fn repository(mut self, config: RepositoryConfig) -> Self {
        self.repository = config;
        self
    }

    #[must_use]
    pub fn list(mut self, config: ListConfig) -> Self {
        self.list = config;
        self
    }

    /// Load from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("enforcer-db: {e}")))
    }
}
