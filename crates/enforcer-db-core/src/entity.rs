//! The entity contract.
//!
//! An entity is a plain Rust record that knows its table schema, how to bind
//! its columns by name and how to fill itself from a decoded row. Everything
//! else (CRUD, lists, batch joins) is written once, generically, against this
//! trait.

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::field::TableSchema;
use crate::row::{NamedRow, Row, ValueSet};
use crate::value::{Key, Value};

/// Where a record is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordState {
    /// Never written; no id, no revision.
    Unpersisted,
    /// Stored with a known id and revision.
    Persisted,
    /// Deleted from the backend.
    Gone,
}

/// Identity and revision carried by every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RecordMeta {
    id: Option<Key>,
    revision: Option<Key>,
    deleted: bool,
}

impl RecordMeta {
    /// Primary key, once persisted.
    #[must_use]
    pub fn id(&self) -> Option<&Key> {
        self.id.as_ref()
    }

    /// Revision, once persisted.
    #[must_use]
    pub fn revision(&self) -> Option<&Key> {
        self.revision.as_ref()
    }

    /// Lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> RecordState {
        if self.deleted {
            RecordState::Gone
        } else if self.id.is_some() && self.revision.is_some() {
            RecordState::Persisted
        } else {
            RecordState::Unpersisted
        }
    }

    /// Record a successful create or read.
    pub fn mark_persisted(&mut self, id: Key, revision: Key) {
        self.id = Some(id);
        self.revision = Some(revision);
        self.deleted = false;
    }

    /// Record a successful update.
    pub fn mark_revised(&mut self, revision: Key) {
        self.revision = Some(revision);
    }

    /// Record a successful delete.
    pub fn mark_gone(&mut self) {
        self.deleted = true;
    }
}

/// A record stored in one table.
pub trait Entity: Clone + Default + Debug + Send + Sync + 'static {
    /// Table name.
    const TABLE_NAME: &'static str;

    /// The table schema.
    fn schema() -> &'static TableSchema;

    /// Identity and revision.
    fn meta(&self) -> &RecordMeta;

    /// Mutable identity and revision.
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Bind every declared column by name.
    fn to_values(&self) -> Result<ValueSet>;

    /// Fill the declared fields from a row. Identity is handled by
    /// [`decode_row`].
    fn decode_fields(&mut self, row: &NamedRow<'_>) -> Result<()>;

    /// Field-wise ordering: foreign keys first, then scalars, in declaration
    /// order. Identity and revision are not compared.
    fn compare(&self, other: &Self) -> Ordering;

    /// Restore documented defaults, dropping identity and cached parents.
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replace this record with a copy of `src`.
    ///
    /// The copy is fully built before anything here changes. Shared parent
    /// caches in `src` become owned copies.
    fn copy_from(&mut self, src: &Self) {
        let staged = src.clone();
        *self = staged;
    }

    /// Primary key, once persisted.
    fn id(&self) -> Option<&Key> {
        self.meta().id()
    }

    /// Primary key as a column value (NULL when unpersisted).
    fn id_value(&self) -> Value {
        Value::from(self.meta().id())
    }

    /// Revision, once persisted.
    fn revision(&self) -> Option<&Key> {
        self.meta().revision()
    }

    /// Lifecycle state.
    fn lifecycle(&self) -> RecordState {
        self.meta().lifecycle()
    }
}

/// Reset `record` and fill it from a full result row.
///
/// On failure the record is left reset and must not be trusted.
pub fn decode_row<E: Entity>(record: &mut E, row: &Row) -> Result<()> {
    record.reset();
    let named = NamedRow::new(E::schema(), row)?;
    let id = named.id()?;
    let revision = named.revision()?;
    if let Err(e) = record.decode_fields(&named) {
        record.reset();
        return Err(match e {
            Error::Decode { .. } => e,
            other => Error::decode(E::TABLE_NAME, other.to_string()),
        });
    }
    record.meta_mut().mark_persisted(id, revision);
    Ok(())
}

/// Decode a fresh record from a full result row.
pub fn decode<E: Entity>(row: &Row) -> Result<E> {
    let mut record = E::default();
    decode_row(&mut record, row)?;
    Ok(record)
}

/// Compare two possibly absent records. Absent sorts first.
pub fn compare_records<E: Entity>(a: Option<&E>, b: Option<&E>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b),
    }
}
