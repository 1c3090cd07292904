//! The in-process connection.
//!
//! All tables live behind one mutex, so every call is applied atomically.
//! That makes an update or delete filtered by `id` and `rev` a true
//! compare-and-swap: two writers holding the same revision cannot both
//! succeed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use enforcer_db_core::{
    ClauseList, Connection, Error, Result, ResultSet, Revised, Row, TableSchema, Value,
    validate_pattern,
};
use serde::{Deserialize, Serialize};

use crate::config::{FetchMode, KeyStyle, MemoryConfig};
use crate::store::{StoredRow, Table, TableDump, revision_key};

/// Counters of backend calls, for asserting how much work a caller did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// `read` calls.
    pub reads: u64,
    /// Rows returned by `read` calls.
    pub rows_read: u64,
    /// Successful `create` calls.
    pub creates: u64,
    /// Rows written by `update` calls.
    pub updates: u64,
    /// Rows removed by `delete` calls.
    pub deletes: u64,
    /// `count` calls.
    pub counts: u64,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<&'static str, Table>,
    stats: MemoryStats,
}

impl State {
    fn table(&self, schema: &TableSchema) -> Result<&Table> {
        self.tables
            .get(schema.table)
            .ok_or_else(|| Error::backend(format!("no such table: {}", schema.table)))
    }

    fn table_mut(&mut self, schema: &TableSchema) -> Result<&mut Table> {
        self.tables
            .get_mut(schema.table)
            .ok_or_else(|| Error::backend(format!("no such table: {}", schema.table)))
    }
}

/// Snapshot layout: table name to table dump.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    tables: HashMap<String, TableDump>,
}

/// An in-process [`Connection`].
#[derive(Debug, Default)]
pub struct MemoryConnection {
    config: MemoryConfig,
    state: Mutex<State>,
}

impl MemoryConnection {
    /// A connection with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection with the given configuration.
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::default()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::backend("memory store lock poisoned"))
    }

    /// The state even after a panicked writer; counters and table sizes stay
    /// meaningful.
    fn lock_counters(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn style(&self) -> KeyStyle {
        self.config.key_style
    }

    /// Call counters since creation or the last [`reset_stats`].
    ///
    /// [`reset_stats`]: MemoryConnection::reset_stats
    pub fn stats(&self) -> MemoryStats {
        self.lock_counters().stats.clone()
    }

    /// Zero the call counters.
    pub fn reset_stats(&self) {
        self.lock_counters().stats = MemoryStats::default();
    }

    /// Number of rows in a table, `None` if the table is not registered.
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.lock_counters().tables.get(table).map(|t| t.rows.len())
    }

    /// Dump every table to JSON.
    ///
    /// Enum columns are stored as their integer codes, so the snapshot is
    /// independent of label tables.
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        let state = self.lock()?;
        let snapshot = Snapshot {
            tables: state
                .tables
                .iter()
                .map(|(name, table)| ((*name).to_string(), table.dump()))
                .collect(),
        };
        serde_json::to_value(&snapshot).map_err(|e| Error::backend(format!("snapshot: {e}")))
    }

    /// Replace table contents with a snapshot.
    ///
    /// Every table in the snapshot must already be registered. Rows are
    /// validated against the schema, ids and unique columns must not repeat,
    /// and key counters resume after the highest restored id. On error
    /// nothing is replaced.
    #[tracing::instrument(level = "debug", skip(self, snapshot))]
    pub fn restore(&self, snapshot: &serde_json::Value) -> Result<()> {
        let snapshot: Snapshot = serde_json::from_value(snapshot.clone())
            .map_err(|e| Error::backend(format!("restore: {e}")))?;
        let mut state = self.lock()?;

        let mut staged = Vec::with_capacity(snapshot.tables.len());
        for (name, dump) in snapshot.tables {
            let table = state
                .tables
                .get(name.as_str())
                .ok_or_else(|| Error::backend(format!("restore: no such table: {name}")))?;
            let mut fresh = Table::new(table.schema);
            fresh.load(dump)?;
            staged.push(fresh);
        }
        for table in staged {
            tracing::debug!(table = table.schema.table, rows = table.rows.len(), "restored");
            state.tables.insert(table.schema.table, table);
        }
        Ok(())
    }

    fn result_set(&self, table: &'static str, rows: Vec<Row>) -> ResultSet {
        match self.config.fetch_mode {
            FetchMode::Fetched => ResultSet::fetched(table, rows),
            FetchMode::Streamed => ResultSet::streamed(table, rows.into_iter().map(Ok)),
        }
    }
}

impl Connection for MemoryConnection {
    fn register(&self, schema: &'static TableSchema) -> Result<()> {
        for pattern in schema.fields.iter().filter_map(|f| f.pattern) {
            validate_pattern(pattern)?;
        }
        let mut state = self.lock()?;
        if let Some(existing) = state.tables.get(schema.table) {
            if existing.schema != schema {
                return Err(Error::backend(format!(
                    "table {} already registered with another schema",
                    schema.table
                )));
            }
            return Ok(());
        }
        tracing::debug!(table = schema.table, columns = schema.column_count(), "registered table");
        state.tables.insert(schema.table, Table::new(schema));
        Ok(())
    }

    fn create(&self, schema: &'static TableSchema, values: Vec<Value>) -> Result<Revised> {
        let style = self.style();
        let mut state = self.lock()?;
        let table = state.table_mut(schema)?;
        let values = table.prepare(values)?;
        table.check_unique(&values, None)?;

        let id = table.allocate_key(style);
        let row = StoredRow {
            id: id.clone(),
            rev: 1,
            values,
        };
        table.rows.insert(id.clone(), row);
        state.stats.creates += 1;

        tracing::trace!(table = schema.table, id = %id, "created row");
        Ok(Revised {
            id,
            revision: revision_key(style, 1),
        })
    }

    fn read(
        &self,
        schema: &'static TableSchema,
        projection: Option<&[&str]>,
        clauses: Option<&ClauseList>,
    ) -> Result<ResultSet> {
        let style = self.style();
        let mut state = self.lock()?;
        let table = state.table(schema)?;

        let positions = match projection {
            None => None,
            Some(columns) => Some(
                columns
                    .iter()
                    .map(|c| {
                        schema.column_position(c).ok_or_else(|| {
                            Error::precondition(format!("{} has no column {c}", schema.table))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        let keys = table.matching(style, clauses)?;
        let rows: Vec<Row> = keys
            .iter()
            .filter_map(|key| table.rows.get(key))
            .map(|stored| {
                let full = stored.full(style);
                match &positions {
                    None => Row::new(full),
                    Some(positions) => Row::new(positions.iter().map(|p| full[*p].clone()).collect()),
                }
            })
            .collect();

        state.stats.reads += 1;
        state.stats.rows_read += rows.len() as u64;
        drop(state);

        Ok(self.result_set(schema.table, rows))
    }

    fn update(
        &self,
        schema: &'static TableSchema,
        values: Vec<Value>,
        clauses: &ClauseList,
    ) -> Result<Vec<Revised>> {
        let style = self.style();
        let mut state = self.lock()?;
        let table = state.table_mut(schema)?;
        let values = table.prepare(values)?;

        let keys = table.matching(style, Some(clauses))?;
        for key in &keys {
            table.check_unique(&values, Some(key))?;
        }
        if keys.len() > 1 {
            // Two rows cannot both take the same unique value.
            if let Some(field) = schema.fields.iter().zip(&values).find_map(|(f, v)| {
                (f.unique && !v.is_null()).then_some(f.name)
            }) {
                return Err(Error::backend(format!(
                    "unique constraint failed: {}.{field}",
                    schema.table
                )));
            }
        }

        let mut revised = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(row) = table.rows.get_mut(&key) {
                row.values.clone_from(&values);
                row.rev += 1;
                revised.push(Revised {
                    id: key,
                    revision: revision_key(style, row.rev),
                });
            }
        }
        state.stats.updates += revised.len() as u64;
        tracing::trace!(table = schema.table, rows = revised.len(), "updated rows");
        Ok(revised)
    }

    fn delete(&self, schema: &'static TableSchema, clauses: &ClauseList) -> Result<u64> {
        let style = self.style();
        let mut state = self.lock()?;
        let table = state.table_mut(schema)?;
        let keys = table.matching(style, Some(clauses))?;
        for key in &keys {
            table.rows.remove(key);
        }
        let removed = keys.len() as u64;
        state.stats.deletes += removed;
        tracing::trace!(table = schema.table, rows = removed, "deleted rows");
        Ok(removed)
    }

    fn count(&self, schema: &'static TableSchema, clauses: Option<&ClauseList>) -> Result<u64> {
        let style = self.style();
        let mut state = self.lock()?;
        let n = state.table(schema)?.matching(style, clauses)?.len() as u64;
        state.stats.counts += 1;
        Ok(n)
    }
}
