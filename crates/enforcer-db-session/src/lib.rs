//! Repositories and entity lists for enforcer-db.
//!
//! This crate is the generic half of the data-access layer. It holds no
//! knowledge of any particular table; everything is driven by the
//! [`Entity`](enforcer_db_core::Entity) schema.
//!
//! # Design Philosophy
//!
//! - **One implementation**: CRUD and list handling are written once for
//!   every entity.
//! - **Optimistic concurrency**: updates and deletes carry the revision the
//!   caller last saw and fail with a conflict instead of overwriting.
//! - **Batch over lazy**: [`EntityList::fetch_associated`] resolves a foreign
//!   key for a whole list in one read; per-record
//!   [`Repository::load_related`] calls are counted and reported.
//!
//! # Example
//!
//! ```ignore
//! let repo: Repository<_, HsmKey> = Repository::new(&conn);
//! repo.create(&mut key)?;
//!
//! key.set_bits(4096);
//! repo.update(&mut key)?;   // Err(Conflict) if someone else updated first
//!
//! let mut list: EntityList<_, KeyData> = EntityList::new(&conn);
//! list.get()?;
//! list.fetch_associated(KeyData::HSM_KEY)?;
//! ```

pub mod config;
pub mod lazy_load;
pub mod list;
pub mod repository;

#[cfg(test)]
mod test_support;

pub use config::{ListConfig, RepositoryConfig};
pub use lazy_load::{LAZY_LOAD_TARGET, LazyLoads, SAMPLED_SITES};
pub use list::EntityList;
pub use repository::Repository;
