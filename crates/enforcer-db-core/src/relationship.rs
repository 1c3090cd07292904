//! Foreign-key references between records.
//!
//! A child record stores the raw key of its parent plus an optional cache of
//! the parent itself. The cache is either owned (loaded for this record alone)
//! or borrowed (shared with every other child of the same list after a batch
//! join). Borrowed parents are reference counted, so no holder can free one
//! out from under another.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::{Key, Value};

/// The cached parent of a foreign key.
#[derive(Debug)]
pub enum ForeignRef<P> {
    /// Nothing cached.
    None,
    /// Exclusively owned copy.
    Owned(Box<P>),
    /// Shared with other records.
    Borrowed(Arc<P>),
}

impl<P> Default for ForeignRef<P> {
    fn default() -> Self {
        ForeignRef::None
    }
}

impl<P> ForeignRef<P> {
    /// The cached parent, if any.
    #[must_use]
    pub fn get(&self) -> Option<&P> {
        match self {
            ForeignRef::None => None,
            ForeignRef::Owned(p) => Some(p),
            ForeignRef::Borrowed(p) => Some(p),
        }
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, ForeignRef::None)
    }

    /// True for an owned cache.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self, ForeignRef::Owned(_))
    }

    /// True for a shared cache.
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, ForeignRef::Borrowed(_))
    }
}

/// Cloning a borrowed cache produces an owned deep copy, so the clone never
/// aliases the source list's parents.
impl<P: Clone> Clone for ForeignRef<P> {
    fn clone(&self) -> Self {
        match self {
            ForeignRef::None => ForeignRef::None,
            ForeignRef::Owned(p) => ForeignRef::Owned(p.clone()),
            ForeignRef::Borrowed(p) => ForeignRef::Owned(Box::new(P::clone(p))),
        }
    }
}

/// A foreign-key column: the raw key and a cache of the referenced record.
pub struct ForeignKey<P> {
    key: Option<Key>,
    cache: ForeignRef<P>,
}

impl<P> Default for ForeignKey<P> {
    fn default() -> Self {
        Self {
            key: None,
            cache: ForeignRef::None,
        }
    }
}

impl<P> ForeignKey<P> {
    /// An unset foreign key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A foreign key pointing at `key`.
    #[must_use]
    pub fn with_key(key: Key) -> Self {
        Self {
            key: Some(key),
            cache: ForeignRef::None,
        }
    }

    /// The raw key.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The raw key as a column value (NULL when unset).
    #[must_use]
    pub fn value(&self) -> Value {
        Value::from(self.key.as_ref())
    }

    /// Set from a column value. Only primary-key values are accepted; on
    /// error nothing changes.
    pub fn set(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::PrimaryKey(key) => {
                self.set_key(key.clone());
                Ok(())
            }
            other => Err(Error::precondition(format!(
                "foreign key needs a primary key value, got {}",
                other.kind()
            ))),
        }
    }

    /// Point at `key`, dropping any cached parent.
    pub fn set_key(&mut self, key: Key) {
        self.key = Some(key);
        self.cache = ForeignRef::None;
    }

    /// Unset the key and drop any cached parent.
    pub fn clear(&mut self) {
        self.key = None;
        self.cache = ForeignRef::None;
    }

    /// The cache.
    #[must_use]
    pub fn reference(&self) -> &ForeignRef<P> {
        &self.cache
    }

    /// The cached parent, if loaded.
    #[must_use]
    pub fn cached(&self) -> Option<&P> {
        self.cache.get()
    }

    /// Store an exclusively owned parent.
    pub fn attach_owned(&mut self, parent: P) {
        self.cache = ForeignRef::Owned(Box::new(parent));
    }

    /// Store a shared parent.
    pub fn attach_borrowed(&mut self, parent: Arc<P>) {
        self.cache = ForeignRef::Borrowed(parent);
    }

    /// Drop the cached parent, keeping the key.
    pub fn detach(&mut self) {
        self.cache = ForeignRef::None;
    }
}

impl<P: Clone> Clone for ForeignKey<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<P> PartialEq for ForeignKey<P> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<P> Eq for ForeignKey<P> {}

impl<P> PartialOrd for ForeignKey<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by key; an unset key sorts first.
impl<P> Ord for ForeignKey<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<P> fmt::Debug for ForeignKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = match self.cache {
            ForeignRef::None => "none",
            ForeignRef::Owned(_) => "owned",
            ForeignRef::Borrowed(_) => "borrowed",
        };
        f.debug_struct("ForeignKey")
            .field("key", &self.key)
            .field("cache", &cache)
            .finish()
    }
}

/// A child-to-parent relation: the child's foreign-key column and how to reach
/// the [`ForeignKey`] field on a child record.
pub struct Relation<C, P> {
    /// Foreign-key column on the child table.
    pub field: &'static str,
    /// Read access to the child's foreign key.
    pub get: fn(&C) -> &ForeignKey<P>,
    /// Write access to the child's foreign key.
    pub get_mut: fn(&mut C) -> &mut ForeignKey<P>,
}

impl<C, P> Relation<C, P> {
    /// Describe a relation.
    pub const fn new(
        field: &'static str,
        get: fn(&C) -> &ForeignKey<P>,
        get_mut: fn(&mut C) -> &mut ForeignKey<P>,
    ) -> Self {
        Self {
            field,
            get,
            get_mut,
        }
    }
}

impl<C, P> Clone for Relation<C, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, P> Copy for Relation<C, P> {}

impl<C, P> fmt::Debug for Relation<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}
