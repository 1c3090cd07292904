//! Core types and traits for enforcer-db.
//!
//! `enforcer-db-core` is the **foundation layer** of the key-lifecycle
//! data-access workspace. It defines the data model and the two contracts the
//! other crates build on.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: [`Entity`] is implemented by every stored record,
//!   [`Connection`] by every storage backend.
//! - **Data model**: [`Value`], [`Row`], [`ValueSet`] and [`ResultSet`] carry
//!   column data between records and backends; [`TableSchema`] and
//!   [`FieldInfo`] describe the tables.
//! - **References**: [`ForeignKey`] and [`ForeignRef`] hold a parent's key
//!   and an owned or shared cache of the parent record.
//!
//! # Who Uses This Crate
//!
//! - `enforcer-db-memory` implements [`Connection`].
//! - `enforcer-db-session` drives CRUD and lists generically over [`Entity`].
//! - `enforcer-db-schema` declares the entity tables and records.
//!
//! Most applications should use the `enforcer-db` facade.

pub mod clause;
pub mod connection;
pub mod entity;
pub mod enums;
pub mod error;
pub mod field;
pub mod relationship;
pub mod result;
pub mod row;
pub mod validate;
pub mod value;

pub use clause::{Clause, ClauseList, Comparison, Operator, Predicate};
pub use connection::{Connection, Revised};
pub use entity::{Entity, RecordMeta, RecordState, compare_records, decode, decode_row};
pub use enums::{DbEnum, EnumMapping, code_for_label, label_for_code};
pub use error::{Error, Result};
pub use field::{FieldInfo, TableSchema};
pub use relationship::{ForeignKey, ForeignRef, Relation};
pub use result::{ResultSet, RowStream};
pub use row::{NamedRow, Row, ValueSet};
pub use validate::{matches_pattern, validate_pattern};
pub use value::{EnumValue, Key, Value, ValueKind};
