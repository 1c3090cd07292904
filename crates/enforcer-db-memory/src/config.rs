//! Memory backend configuration.
//!
//! The two knobs select which flavour of real store the backend imitates:
//! how result sets are delivered and what kind of keys it hands out.

use enforcer_db_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// How reads deliver their rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Forward-only result sets; callers must `fetch_all` for random access.
    #[default]
    Streamed,
    /// Every read returns a fully fetched result set.
    Fetched,
}

/// Which kind of primary keys and revisions the backend assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStyle {
    /// Increasing integers, as an SQL store would assign.
    #[default]
    Integer,
    /// Hex strings, as a document store would assign.
    Text,
}

/// Configuration for [`MemoryConnection`](crate::MemoryConnection).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Result-set delivery.
    pub fetch_mode: FetchMode,
    /// Key flavour.
    pub key_style: KeyStyle,
}

impl MemoryConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result-set delivery.
    pub fn fetch_mode(mut self, mode: FetchMode) -> Self {
        self.fetch_mode = mode;
        self
    }

    /// Set the key flavour.
    pub fn key_style(mut self, style: KeyStyle) -> Self {
        self.key_style = style;
        self
    }

    /// Load from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("memory backend: {e}")))
    }
}
