//! In-process storage backend for enforcer-db.
//!
//! `enforcer-db-memory` implements the [`Connection`] contract entirely in
//! memory. It stands in for the relational and document stores the enforcer
//! runs against in production:
//!
//! - integer keys (SQL flavour) or hex string keys (document flavour),
//!   selected by [`KeyStyle`];
//! - streamed or fetched result sets, selected by [`FetchMode`];
//! - atomic writes, so updates and deletes filtered by id and revision are
//!   compare-and-swap operations;
//! - unique columns, per-column kind and pattern validation;
//! - call counters ([`MemoryStats`]) for asserting query counts;
//! - JSON snapshots for seeding and inspecting state.
//!
//! ```
//! use enforcer_db_memory::{MemoryConfig, MemoryConnection};
//!
//! let conn = MemoryConnection::with_config(MemoryConfig::default());
//! assert_eq!(conn.stats().reads, 0);
//! ```
//!
//! [`Connection`]: enforcer_db_core::Connection

pub mod config;
pub mod connection;
mod store;

pub use config::{FetchMode, KeyStyle, MemoryConfig};
pub use connection::{MemoryConnection, MemoryStats};
