//! Lists of records and batch joins.
//!
//! [`EntityList`] runs a query and walks its rows. In the default mode one
//! scratch record is reused for every row, so the record handed out by
//! [`next`](EntityList::next) is only valid until the following call; use
//! [`get_next`](EntityList::get_next) for an owned copy.
//!
//! In object-store mode the whole result is fetched and each row is decoded
//! once, on first visit, into a record the list keeps. That allows repeated
//! passes, random access through [`get`](EntityList::get), and
//! [`fetch_associated`](EntityList::fetch_associated), which resolves one
//! foreign key for every record with a single backend read.

use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

use enforcer_db_core::{
    ClauseList, Connection, Entity, Error, Key, Operator, Relation, Result, ResultSet, decode,
    decode_row,
};

use crate::config::ListConfig;

/// A queried list of `E` records.
#[derive(Debug)]
pub struct EntityList<C, E> {
    connection: C,
    config: ListConfig,
    result: Option<ResultSet>,
    scratch: E,
    objects: Vec<Option<E>>,
    position: usize,
    started: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<C: Connection, E: Entity> EntityList<C, E> {
    /// Create an empty list over a connection.
    pub fn new(connection: C) -> Self {
        Self::with_config(connection, ListConfig::default())
    }

    /// Create an empty list with custom configuration.
    pub fn with_config(connection: C, config: ListConfig) -> Self {
        Self {
            connection,
            config,
            result: None,
            scratch: E::default(),
            objects: Vec::new(),
            position: 0,
            started: false,
            _entity: PhantomData,
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// The list configuration.
    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Whether records are kept for repeated passes.
    pub fn is_object_store(&self) -> bool {
        self.config.object_store
    }

    /// Switch object-store mode.
    ///
    /// May be changed until iteration starts; enabling it on a pending
    /// result fetches that result.
    pub fn object_store(&mut self, enabled: bool) -> Result<()> {
        if enabled == self.config.object_store {
            return Ok(());
        }
        if self.started {
            return Err(Error::precondition(format!(
                "cannot switch object store on a {} list that is being iterated",
                E::TABLE_NAME
            )));
        }
        self.config.object_store = enabled;
        self.objects.clear();
        if !enabled {
            return Ok(());
        }
        if let Some(result) = &mut self.result {
            result.fetch_all()?;
            self.objects = empty_slots(result.size().unwrap_or(0));
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Select every record of the table.
    #[tracing::instrument(level = "debug", skip(self), fields(table = E::TABLE_NAME))]
    pub fn get(&mut self) -> Result<()> {
        self.query(None)
    }

    /// Select the records matching `clauses`.
    #[tracing::instrument(level = "debug", skip(self, clauses), fields(table = E::TABLE_NAME))]
    pub fn get_by_clauses(&mut self, clauses: &ClauseList) -> Result<()> {
        self.query(Some(clauses))
    }

    /// Select the records whose foreign-key `column` equals `key`.
    #[tracing::instrument(level = "debug", skip(self), fields(table = E::TABLE_NAME))]
    pub fn get_by_foreign_key(&mut self, column: &'static str, key: &Key) -> Result<()> {
        let schema = E::schema();
        let is_foreign_key = schema
            .field(column)
            .is_some_and(|f| f.foreign_key.is_some());
        if !is_foreign_key {
            return Err(Error::precondition(format!(
                "{}.{column} is not a foreign key",
                schema.table
            )));
        }
        let mut clauses = ClauseList::new();
        clauses.equal(column, key);
        self.query(Some(&clauses))
    }

    fn query(&mut self, clauses: Option<&ClauseList>) -> Result<()> {
        self.result = None;
        self.objects.clear();
        self.position = 0;
        self.started = false;

        let mut result = self.connection.read(E::schema(), None, clauses)?;
        if self.config.object_store || self.config.fetch_all {
            result.fetch_all()?;
        }
        if self.config.object_store {
            self.objects = empty_slots(result.size().unwrap_or(0));
        }
        tracing::debug!(
            table = E::TABLE_NAME,
            rows = ?result.size(),
            fetched = result.is_fetched(),
            "list query"
        );
        self.result = Some(result);
        Ok(())
    }

    /// Number of records, known once the result is fetched.
    pub fn size(&self) -> Option<usize> {
        self.result.as_ref().and_then(ResultSet::size)
    }

    /// True when a fetched result holds no rows.
    pub fn is_empty(&self) -> bool {
        self.size() == Some(0)
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Restart at the first record and return it.
    pub fn begin(&mut self) -> Result<Option<&E>> {
        let result = self.result.as_mut().ok_or_else(|| {
            Error::precondition(format!("no query has been run on the {} list", E::TABLE_NAME))
        })?;
        if self.config.object_store {
            self.position = 0;
        } else {
            result.rewind()?;
        }
        self.next()
    }

    /// Advance to the next record.
    ///
    /// Without the object store the returned record is overwritten by the
    /// following call.
    pub fn next(&mut self) -> Result<Option<&E>> {
        if self.config.object_store {
            let index = self.position;
            if index >= self.objects.len() {
                return Ok(None);
            }
            self.started = true;
            self.position += 1;
            return self.object_at(index).map(Some);
        }

        let result = self.result.as_mut().ok_or_else(|| {
            Error::precondition(format!("no query has been run on the {} list", E::TABLE_NAME))
        })?;
        self.started = true;
        let Some(row) = result.next() else {
            return Ok(None);
        };
        decode_row(&mut self.scratch, &row?)?;
        Ok(Some(&self.scratch))
    }

    /// Like [`begin`](EntityList::begin), returning an owned copy.
    pub fn get_begin(&mut self) -> Result<Option<E>> {
        Ok(self.begin()?.cloned())
    }

    /// Like [`next`](EntityList::next), returning an owned copy.
    pub fn get_next(&mut self) -> Result<Option<E>> {
        Ok(self.next()?.cloned())
    }

    /// Random access. Requires the object store.
    pub fn get_index(&mut self, index: usize) -> Result<Option<&E>> {
        if !self.config.object_store {
            return Err(Error::precondition(format!(
                "random access on the {} list needs the object store",
                E::TABLE_NAME
            )));
        }
        if index >= self.objects.len() {
            return Ok(None);
        }
        self.object_at(index).map(Some)
    }

    /// Collect owned copies of every record from the start.
    pub fn to_vec(&mut self) -> Result<Vec<E>> {
        let mut records = Vec::with_capacity(self.size().unwrap_or(0));
        let mut current = self.get_begin()?;
        while let Some(record) = current {
            records.push(record);
            current = self.get_next()?;
        }
        Ok(records)
    }

    fn object_at(&mut self, index: usize) -> Result<&E> {
        if self.objects[index].is_none() {
            let row = self
                .result
                .as_ref()
                .and_then(|r| r.get(index))
                .ok_or_else(|| {
                    Error::backend(format!("{} result lost row {index}", E::TABLE_NAME))
                })?;
            let record: E = decode(row)?;
            self.objects[index] = Some(record);
        }
        self.objects[index]
            .as_ref()
            .ok_or_else(|| Error::backend(format!("{} object {index} missing", E::TABLE_NAME)))
    }

    // ========================================================================
    // Batch join
    // ========================================================================

    /// Resolve `relation` for every record with one backend read.
    ///
    /// Collects the distinct foreign keys of the list, reads exactly those
    /// parents and attaches each to its children as a shared reference.
    /// Enables the object store if iteration has not started. Returns the
    /// number of parents read.
    #[tracing::instrument(level = "debug", skip(self, relation), fields(table = E::TABLE_NAME, relation = relation.field))]
    pub fn fetch_associated<P: Entity>(&mut self, relation: Relation<E, P>) -> Result<usize> {
        if self.result.is_none() {
            return Err(Error::precondition(format!(
                "no query has been run on the {} list",
                E::TABLE_NAME
            )));
        }
        self.object_store(true)?;
        for index in 0..self.objects.len() {
            self.object_at(index)?;
        }

        let keys: BTreeSet<Key> = self
            .objects
            .iter()
            .flatten()
            .filter_map(|record| (relation.get)(record).key().cloned())
            .collect();
        if keys.is_empty() {
            return Ok(0);
        }

        let primary_key = P::schema().primary_key;
        let mut ids = ClauseList::new();
        for (i, key) in keys.iter().enumerate() {
            let clause = ids.equal(primary_key, key);
            if i > 0 {
                clause.set_operator(Operator::Or);
            }
        }
        let mut clauses = ClauseList::new();
        clauses.nested(ids);

        let mut parents: HashMap<Key, Arc<P>> = HashMap::with_capacity(keys.len());
        for row in self.connection.read(P::schema(), None, Some(&clauses))? {
            let parent: P = decode(&row?)?;
            if let Some(id) = parent.id().cloned() {
                parents.insert(id, Arc::new(parent));
            }
        }

        for record in self.objects.iter_mut().flatten() {
            let fk = (relation.get_mut)(record);
            let Some(key) = fk.key() else { continue };
            match parents.get(key) {
                Some(parent) => fk.attach_borrowed(Arc::clone(parent)),
                None => tracing::warn!(
                    table = E::TABLE_NAME,
                    relation = relation.field,
                    parent = %key,
                    "dangling foreign key"
                ),
            }
        }

        tracing::debug!(
            table = E::TABLE_NAME,
            relation = relation.field,
            parents = parents.len(),
            "attached parents"
        );
        Ok(parents.len())
    }
}

fn empty_slots<E>(n: usize) -> Vec<Option<E>> {
    std::iter::repeat_with(|| None).take(n).collect()
}
