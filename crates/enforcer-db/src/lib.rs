//! enforcer-db: schema-driven data access for a DNSSEC key-lifecycle
//! enforcer.
//!
//! The workspace is split the same way the data path is:
//!
//! - [`enforcer_db_core`]: values, schemas, clauses, rows, result sets, the
//!   `Connection` contract and the `Entity` trait;
//! - [`enforcer_db_session`]: the generic `Repository` and `EntityList`;
//! - [`enforcer_db_schema`]: the key tables (`Policy`, `PolicyKey`, `HsmKey`,
//!   `KeyData`, `KeyState`);
//! - [`enforcer_db_memory`]: an in-process backend.
//!
//! [`Database`] bundles a memory backend with its configuration for callers
//! that want all of it wired up.
//!
//! ```
//! use enforcer_db::prelude::*;
//!
//! let db = Database::open(DbConfig::default()).unwrap();
//! let policies = db.repository::<Policy>();
//!
//! let mut policy = Policy::new();
//! policy.set_name("default").unwrap();
//! policy.set_description("lab policy").unwrap();
//! policies.create(&mut policy).unwrap();
//!
//! let found = Policy::get_by_name(&policies, "default").unwrap();
//! assert_eq!(found.denial_type_text(), Some("NSEC"));
//! ```

pub mod config;
pub mod database;

pub use enforcer_db_core;
pub use enforcer_db_memory;
pub use enforcer_db_schema;
pub use enforcer_db_session;

pub use config::DbConfig;
pub use database::Database;

pub use enforcer_db_core::{Error, Result};

/// Everything needed to work with the key tables.
pub mod prelude {
    pub use crate::{Database, DbConfig};
    pub use enforcer_db_core::{
        Clause, ClauseList, Comparison, Connection, DbEnum, Entity, Error, ForeignKey, Key,
        Operator, RecordState, Relation, Result, Value, compare_records,
    };
    pub use enforcer_db_memory::{FetchMode, KeyStyle, MemoryConfig, MemoryConnection};
    pub use enforcer_db_schema::{
        DenialType, DsAtParent, HsmKey, HsmKeyBackup, HsmKeyState, HsmKeyType, KeyData,
        KeyRole, KeyState, KeyStateType, KeyStateValue, Policy, PolicyKey, ZoneSoaSerial,
        register_all,
    };
    pub use enforcer_db_session::{EntityList, ListConfig, Repository, RepositoryConfig};
}
