//! The backend contract.
//!
//! A [`Connection`] is the only thing the data-access layer talks to. It is
//! deliberately small: positional writes in declared-column order, filtered
//! reads returning a [`ResultSet`], and counts. Every write is one call, so a
//! backend that applies each call atomically gives update/delete the
//! compare-and-swap semantics optimistic concurrency relies on.

use crate::clause::ClauseList;
use crate::error::Result;
use crate::field::TableSchema;
use crate::result::ResultSet;
use crate::value::{Key, Value};

/// Identity and revision assigned by a write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revised {
    /// Primary key of the written row.
    pub id: Key,
    /// Revision after the write.
    pub revision: Key,
}

/// A storage backend.
pub trait Connection: Send + Sync {
    /// Make the backend aware of a table. Idempotent.
    fn register(&self, schema: &'static TableSchema) -> Result<()>;

    /// Insert a row. `values` are in declared-column order, without the
    /// implicit id and revision, which the backend assigns.
    fn create(&self, schema: &'static TableSchema, values: Vec<Value>) -> Result<Revised>;

    /// Read rows matching `clauses` (all rows when `None`).
    ///
    /// With no projection every row carries `id`, `rev` and the declared
    /// columns in schema order; otherwise exactly the named columns.
    fn read(
        &self,
        schema: &'static TableSchema,
        projection: Option<&[&str]>,
        clauses: Option<&ClauseList>,
    ) -> Result<ResultSet>;

    /// Overwrite the declared columns of every row matching `clauses` and
    /// bump their revisions. Returns the rows actually written.
    fn update(
        &self,
        schema: &'static TableSchema,
        values: Vec<Value>,
        clauses: &ClauseList,
    ) -> Result<Vec<Revised>>;

    /// Delete every row matching `clauses`, returning how many went.
    fn delete(&self, schema: &'static TableSchema, clauses: &ClauseList) -> Result<u64>;

    /// Count rows matching `clauses` (all rows when `None`).
    fn count(&self, schema: &'static TableSchema, clauses: Option<&ClauseList>) -> Result<u64>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn register(&self, schema: &'static TableSchema) -> Result<()> {
        (**self).register(schema)
    }

    fn create(&self, schema: &'static TableSchema, values: Vec<Value>) -> Result<Revised> {
        (**self).create(schema, values)
    }

    fn read(
        &self,
        schema: &'static TableSchema,
        projection: Option<&[&str]>,
        clauses: Option<&ClauseList>,
    ) -> Result<ResultSet> {
        (**self).read(schema, projection, clauses)
    }

    fn update(
        &self,
        schema: &'static TableSchema,
        values: Vec<Value>,
        clauses: &ClauseList,
    ) -> Result<Vec<Revised>> {
        (**self).update(schema, values, clauses)
    }

    fn delete(&self, schema: &'static TableSchema, clauses: &ClauseList) -> Result<u64> {
        (**self).delete(schema, clauses)
    }

    fn count(&self, schema: &'static TableSchema, clauses: Option<&ClauseList>) -> Result<u64> {
        (**self).count(schema, clauses)
    }
}

impl<C: Connection + ?Sized> Connection for std::sync::Arc<C> {
    fn register(&self, schema: &'static TableSchema) -> Result<()> {
        (**self).register(schema)
    }

    fn create(&self, schema: &'static TableSchema, values: Vec<Value>) -> Result<Revised> {
        (**self).create(schema, values)
    }

    fn read(
        &self,
        schema: &'static TableSchema,
        projection: Option<&[&str]>,
        clauses: Option<&ClauseList>,
    ) -> Result<ResultSet> {
        (**self).read(schema, projection, clauses)
    }

    fn update(
        &self,
        schema: &'static TableSchema,
        values: Vec<Value>,
        clauses: &ClauseList,
    ) -> Result<Vec<Revised>> {
        (**self).update(schema, values, clauses)
    }

    fn delete(&self, schema: &'static TableSchema, clauses: &ClauseList) -> Result<u64> {
        (**self).delete(schema, clauses)
    }

    fn count(&self, schema: &'static TableSchema, clauses: Option<&ClauseList>) -> Result<u64> {
        (**self).count(schema, clauses)
    }
}
