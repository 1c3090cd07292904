//! Generic CRUD over one entity table.
//!
//! [`Repository`] implements create, read, update and delete once for every
//! [`Entity`]. Records move through a strict lifecycle:
//!
//! ```text
//! Unpersisted --create--> Persisted(rev N) --update--> Persisted(rev N+1)
//!                                 |
//!                               delete
//!                                 v
//!                               Gone
//! ```
//!
//! Any other transition is a precondition error. Updates and deletes are a
//! single backend call filtered by `id` and `rev`; when that call touches no
//! row, somebody else got there first and the caller sees
//! [`Error::Conflict`].

use std::marker::PhantomData;
use std::panic::Location;

use enforcer_db_core::{
    ClauseList, Connection, Entity, Error, Key, RecordState, Relation, Result, Value, decode,
};

use crate::config::RepositoryConfig;
use crate::lazy_load::LazyLoads;

/// CRUD access to the table of `E` through connection `C`.
#[derive(Debug)]
pub struct Repository<C, E> {
    connection: C,
    config: RepositoryConfig,
    lazy_loads: LazyLoads,
    _entity: PhantomData<fn() -> E>,
}

impl<C: Connection, E: Entity> Repository<C, E> {
    /// Create a repository over an existing connection.
    pub fn new(connection: C) -> Self {
        Self::with_config(connection, RepositoryConfig::default())
    }

    /// Create a repository with custom configuration.
    pub fn with_config(connection: C, config: RepositoryConfig) -> Self {
        let lazy_loads = LazyLoads::from_config(&config);
        Self {
            connection,
            config,
            lazy_loads,
            _entity: PhantomData,
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// The repository configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Per-record parent loads made through [`Repository::load_related`].
    pub fn lazy_loads(&self) -> &LazyLoads {
        &self.lazy_loads
    }

    /// Zero the lazy-load counts, e.g. between requests.
    pub fn clear_lazy_loads(&mut self) {
        self.lazy_loads.clear();
    }

    /// Make sure the backend knows the table.
    pub fn register(&self) -> Result<()> {
        self.connection.register(E::schema())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Store a new record and write the assigned id and revision back.
    #[tracing::instrument(level = "debug", skip(self, record), fields(table = E::TABLE_NAME))]
    pub fn create(&self, record: &mut E) -> Result<()> {
        require_state(record, RecordState::Unpersisted, "create")?;
        let values = bind(record)?;

        let revised = self.connection.create(E::schema(), values)?;
        tracing::info!(
            table = E::TABLE_NAME,
            id = %revised.id,
            "created record"
        );
        record.meta_mut().mark_persisted(revised.id, revised.revision);
        Ok(())
    }

    /// Write a persisted record back, guarded by its revision.
    #[tracing::instrument(level = "debug", skip(self, record), fields(table = E::TABLE_NAME))]
    pub fn update(&self, record: &mut E) -> Result<()> {
        require_state(record, RecordState::Persisted, "update")?;
        let values = bind(record)?;
        let (id, clauses) = revision_filter(record)?;

        let revised = self.connection.update(E::schema(), values, &clauses)?;
        let Some(first) = revised.into_iter().next() else {
            tracing::warn!(table = E::TABLE_NAME, id = %id, "update lost to a concurrent writer");
            return Err(conflict::<E>(&id));
        };
        tracing::debug!(table = E::TABLE_NAME, id = %id, revision = %first.revision, "updated record");
        record.meta_mut().mark_revised(first.revision);
        Ok(())
    }

    /// Delete a persisted record, guarded by its revision.
    #[tracing::instrument(level = "debug", skip(self, record), fields(table = E::TABLE_NAME))]
    pub fn delete(&self, record: &mut E) -> Result<()> {
        require_state(record, RecordState::Persisted, "delete")?;
        let (id, clauses) = revision_filter(record)?;

        let removed = self.connection.delete(E::schema(), &clauses)?;
        if removed == 0 {
            tracing::warn!(table = E::TABLE_NAME, id = %id, "delete lost to a concurrent writer");
            return Err(conflict::<E>(&id));
        }
        tracing::info!(table = E::TABLE_NAME, id = %id, "deleted record");
        record.meta_mut().mark_gone();
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Fetch the first record matching `clauses`.
    #[tracing::instrument(level = "debug", skip(self, clauses), fields(table = E::TABLE_NAME))]
    pub fn get_first(&self, clauses: &ClauseList) -> Result<E> {
        let mut result = self.connection.read(E::schema(), None, Some(clauses))?;
        let Some(row) = result.next() else {
            return Err(Error::NotFound {
                table: E::TABLE_NAME,
                filter: clauses.to_string(),
            });
        };
        decode(&row?).inspect_err(|e| {
            tracing::warn!(table = E::TABLE_NAME, error = %e, "undecodable row");
        })
    }

    /// Fetch a record by primary key.
    pub fn get_by_id(&self, id: &Key) -> Result<E> {
        let mut clauses = ClauseList::new();
        clauses.equal(E::schema().primary_key, id);
        self.get_first(&clauses)
    }

    /// Fetch a record by primary key, `None` when there is no such row.
    pub fn find_by_id(&self, id: &Key) -> Result<Option<E>> {
        match self.get_by_id(id) {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch a record by a unique column.
    pub fn get_by_field(&self, column: &'static str, value: impl Into<Value>) -> Result<E> {
        let schema = E::schema();
        let field = schema.field(column).ok_or_else(|| {
            Error::precondition(format!("{} has no column {column}", schema.table))
        })?;
        if !field.unique {
            return Err(Error::precondition(format!(
                "{}.{column} is not unique",
                schema.table
            )));
        }
        let value = value.into();
        if value.is_null() {
            return Err(Error::precondition(format!(
                "lookup by {}.{column} needs a value",
                schema.table
            )));
        }
        let mut clauses = ClauseList::new();
        clauses.equal(column, value);
        self.get_first(&clauses)
    }

    /// Count records matching `clauses` (all records when `None`).
    #[tracing::instrument(level = "debug", skip(self, clauses), fields(table = E::TABLE_NAME))]
    pub fn count(&self, clauses: Option<&ClauseList>) -> Result<u64> {
        self.connection.count(E::schema(), clauses)
    }

    /// Re-read a persisted record, replacing its fields and revision.
    ///
    /// This is how a caller recovers from [`Error::Conflict`]. If the row is
    /// gone the record is left untouched and `NotFound` is returned.
    pub fn refresh(&self, record: &mut E) -> Result<()> {
        require_state(record, RecordState::Persisted, "refresh")?;
        let id = persisted_id(record)?;
        let fresh = self.get_by_id(&id)?;
        *record = fresh;
        Ok(())
    }

    /// Load the parent of `record` along `relation` into an owned cache.
    ///
    /// Returns the cached parent, `None` when the foreign key is unset.
    /// An already cached parent is returned without a backend call. Every
    /// backend call counts toward lazy-load detection.
    #[track_caller]
    pub fn load_related<'r, P: Entity>(
        &mut self,
        record: &'r mut E,
        relation: Relation<E, P>,
    ) -> Result<Option<&'r P>> {
        let fk = (relation.get)(record);
        let Some(key) = fk.key().cloned() else {
            return Ok(None);
        };
        if fk.cached().is_none() {
            self.lazy_loads
                .record(E::TABLE_NAME, relation.field, Location::caller());

            let mut clauses = ClauseList::new();
            clauses.equal(P::schema().primary_key, &key);
            let mut result = self.connection.read(P::schema(), None, Some(&clauses))?;
            let row = result.next().ok_or_else(|| Error::NotFound {
                table: P::TABLE_NAME,
                filter: clauses.to_string(),
            })??;
            let parent: P = decode(&row)?;
            tracing::debug!(
                table = E::TABLE_NAME,
                relation = relation.field,
                parent = %key,
                "loaded parent"
            );
            (relation.get_mut)(record).attach_owned(parent);
        }
        Ok((relation.get)(record).cached())
    }
}

fn require_state<E: Entity>(record: &E, expected: RecordState, op: &str) -> Result<()> {
    let state = record.lifecycle();
    if state == expected {
        return Ok(());
    }
    Err(Error::precondition(format!(
        "cannot {op} a {state:?} {} record",
        E::TABLE_NAME
    )))
}

/// Encode and validate every declared column.
fn bind<E: Entity>(record: &E) -> Result<Vec<Value>> {
    let schema = E::schema();
    let values = record.to_values()?.into_declared(schema)?;
    for (field, value) in schema.fields.iter().zip(&values) {
        field.validate(value)?;
    }
    Ok(values)
}

fn persisted_id<E: Entity>(record: &E) -> Result<Key> {
    record
        .id()
        .cloned()
        .ok_or_else(|| Error::precondition(format!("{} record has no id", E::TABLE_NAME)))
}

/// `id = X AND rev = R` for the record's current identity.
fn revision_filter<E: Entity>(record: &E) -> Result<(Key, ClauseList)> {
    let schema = E::schema();
    let id = persisted_id(record)?;
    let revision = record
        .revision()
        .cloned()
        .ok_or_else(|| Error::precondition(format!("{} record has no revision", E::TABLE_NAME)))?;

    let mut clauses = ClauseList::new();
    clauses.equal(schema.primary_key, &id);
    clauses.equal(schema.revision, Value::Revision(revision));
    Ok((id, clauses))
}

fn conflict<E: Entity>(id: &Key) -> Error {
    Error::Conflict {
        table: E::TABLE_NAME,
        id: id.to_string(),
    }
}
