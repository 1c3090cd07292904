//! A configured memory backend with every key table registered.

use std::sync::Arc;

use enforcer_db_core::{Entity, Result};
use enforcer_db_memory::{MemoryConnection, MemoryStats};
use enforcer_db_session::{EntityList, Repository};

use crate::config::DbConfig;

/// Shared handle to a populated backend. Repositories and lists created from
/// it share the same tables and use the configured settings.
#[derive(Debug, Clone)]
pub struct Database {
    connection: Arc<MemoryConnection>,
    config: DbConfig,
}

impl Database {
    /// Create an empty backend and register the key tables.
    #[tracing::instrument(level = "debug", skip(config))]
    pub fn open(config: DbConfig) -> Result<Self> {
        let connection = Arc::new(MemoryConnection::with_config(config.memory.clone()));
        enforcer_db_schema::register_all(&connection)?;
        tracing::info!(
            fetch_mode = ?config.memory.fetch_mode,
            key_style = ?config.memory.key_style,
            "opened in-memory enforcer database"
        );
        Ok(Self { connection, config })
    }

    /// Open and load a snapshot taken with [`Database::snapshot`].
    pub fn from_snapshot(config: DbConfig, snapshot: &serde_json::Value) -> Result<Self> {
        let db = Self::open(config)?;
        db.connection.restore(snapshot)?;
        Ok(db)
    }

    #[must_use]
    pub fn connection(&self) -> &Arc<MemoryConnection> {
        &self.connection
    }

    #[must_use]
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// A repository for `E` using the configured repository settings.
    #[must_use]
    pub fn repository<E: Entity>(&self) -> Repository<Arc<MemoryConnection>, E> {
        Repository::with_config(Arc::clone(&self.connection), self.config.repository.clone())
    }

    /// An empty list for `E` using the configured list settings.
    #[must_use]
    pub fn list<E: Entity>(&self) -> EntityList<Arc<MemoryConnection>, E> {
        EntityList::with_config(Arc::clone(&self.connection), self.config.list.clone())
    }

    /// Backend call counters.
    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        self.connection.stats()
    }

    /// Every table as JSON.
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        self.connection.snapshot()
    }
}
