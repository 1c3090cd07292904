//! Table storage behind the memory connection.
//!
//! Rows are kept in key order. Column values are normalised on write to the
//! declared kind, so enum columns hold their integer code and unsigned columns
//! hold `UInt32`, exactly what a relational store would return.

use std::collections::BTreeMap;

use enforcer_db_core::{ClauseList, Error, FieldInfo, Key, Result, TableSchema, Value, ValueKind};
use serde::{Deserialize, Serialize};

use crate::config::KeyStyle;

/// One stored row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredRow {
    pub id: Key,
    pub rev: u64,
    pub values: Vec<Value>,
}

impl StoredRow {
    /// Full positional row: id, revision, declared columns.
    pub fn full(&self, style: KeyStyle) -> Vec<Value> {
        let mut row = Vec::with_capacity(self.values.len() + 2);
        row.push(Value::PrimaryKey(self.id.clone()));
        row.push(Value::Revision(revision_key(style, self.rev)));
        row.extend(self.values.iter().cloned());
        row
    }
}

/// Present a revision counter in the configured key flavour.
pub(crate) fn revision_key(style: KeyStyle, rev: u64) -> Key {
    match style {
        KeyStyle::Integer => Key::Int(rev),
        KeyStyle::Text => Key::Text(format!("{rev:08x}")),
    }
}

/// One registered table.
#[derive(Debug)]
pub(crate) struct Table {
    pub schema: &'static TableSchema,
    pub next_id: u64,
    pub rows: BTreeMap<Key, StoredRow>,
}

/// Serialized form of a table.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TableDump {
    pub next_id: u64,
    pub rows: Vec<StoredRow>,
}

impl Table {
    pub fn new(schema: &'static TableSchema) -> Self {
        Self {
            schema,
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    pub fn allocate_key(&mut self, style: KeyStyle) -> Key {
        let n = self.next_id;
        self.next_id += 1;
        match style {
            KeyStyle::Integer => Key::Int(n),
            KeyStyle::Text => Key::Text(format!("{n:024x}")),
        }
    }

    /// Validate and normalise a declared-column value list.
    pub fn prepare(&self, values: Vec<Value>) -> Result<Vec<Value>> {
        let schema = self.schema;
        if values.len() != schema.fields.len() {
            return Err(Error::precondition(format!(
                "{} expects {} values, got {}",
                schema.table,
                schema.fields.len(),
                values.len()
            )));
        }
        schema
            .fields
            .iter()
            .zip(values)
            .map(|(field, value)| {
                field.validate(&value)?;
                normalize(field, value)
            })
            .collect()
    }

    /// Refuse values that would duplicate a unique column of another row.
    pub fn check_unique(&self, values: &[Value], exclude: Option<&Key>) -> Result<()> {
        for (pos, field) in self.schema.fields.iter().enumerate() {
            if !field.unique || values[pos].is_null() {
                continue;
            }
            let clash = self
                .rows
                .values()
                .filter(|row| Some(&row.id) != exclude)
                .any(|row| row.values[pos] == values[pos]);
            if clash {
                return Err(Error::backend(format!(
                    "unique constraint failed: {}.{} = {}",
                    self.schema.table, field.name, values[pos]
                )));
            }
        }
        Ok(())
    }

    /// Keys of rows matching `clauses`, in key order.
    pub fn matching(&self, style: KeyStyle, clauses: Option<&ClauseList>) -> Result<Vec<Key>> {
        let mut keys = Vec::new();
        for row in self.rows.values() {
            if self.row_matches(style, row, clauses)? {
                keys.push(row.id.clone());
            }
        }
        Ok(keys)
    }

    fn row_matches(
        &self,
        style: KeyStyle,
        row: &StoredRow,
        clauses: Option<&ClauseList>,
    ) -> Result<bool> {
        let Some(clauses) = clauses else {
            return Ok(true);
        };
        let full = row.full(style);
        let schema = self.schema;
        clauses.matches(&|name| schema.column_position(name).map(|pos| &full[pos]))
    }

    pub fn dump(&self) -> TableDump {
        TableDump {
            next_id: self.next_id,
            rows: self.rows.values().cloned().collect(),
        }
    }

    /// Replace the contents with a dump.
    ///
    /// Every row is validated, ids and unique columns must not repeat, and
    /// the key counter is moved past the highest restored id so later
    /// creates never reuse one. On error the table is left as it was.
    pub fn load(&mut self, dump: TableDump) -> Result<()> {
        let mut staged = Table::new(self.schema);
        let mut highest = 0;
        for row in dump.rows {
            let values = staged.prepare(row.values)?;
            if staged.rows.contains_key(&row.id) {
                return Err(Error::backend(format!(
                    "duplicate id in {}: {}",
                    self.schema.table, row.id
                )));
            }
            staged.check_unique(&values, None)?;
            highest = highest.max(key_number(&row.id).unwrap_or(0));
            staged.rows.insert(
                row.id.clone(),
                StoredRow {
                    id: row.id,
                    rev: row.rev,
                    values,
                },
            );
        }
        staged.next_id = dump.next_id.max(highest.saturating_add(1)).max(1);
        *self = staged;
        Ok(())
    }
}

/// Counter value behind an allocated key, `None` for foreign text keys.
fn key_number(key: &Key) -> Option<u64> {
    match key {
        Key::Int(n) => Some(*n),
        Key::Text(hex) => u64::from_str_radix(hex, 16).ok(),
    }
}

/// Store a validated value in the column's canonical representation.
fn normalize(field: &FieldInfo, value: Value) -> Result<Value> {
    if value.is_null() {
        return Ok(value);
    }
    Ok(match field.kind {
        ValueKind::Int32 => Value::Int32(value.to_i32()?),
        ValueKind::UInt32 => Value::UInt32(value.to_u32()?),
        ValueKind::Int64 => Value::Int64(value.to_i64()?),
        ValueKind::UInt64 => Value::UInt64(value.to_u64()?),
        ValueKind::Enum => Value::Int32(value.enum_code()?),
        ValueKind::Empty
        | ValueKind::Text
        | ValueKind::PrimaryKey
        | ValueKind::Revision => value,
    })
}
