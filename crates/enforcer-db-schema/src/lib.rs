//! Key-lifecycle tables for enforcer-db.
//!
//! Five entities make up the key side of the enforcer data model:
//!
//! | Entity        | Table        | Parent                    |
//! |---------------|--------------|---------------------------|
//! | [`Policy`]    | `policy`     |                           |
//! | [`PolicyKey`] | `policy_key` | [`Policy`]                |
//! | [`HsmKey`]    | `hsm_key`    | [`Policy`]                |
//! | [`KeyData`]   | `key_data`   | [`HsmKey`] (and a zone)   |
//! | [`KeyState`]  | `key_state`  | [`KeyData`]               |
//!
//! Each entity has a static schema, typed accessors, a `<column>_clause`
//! builder per column and relation constants (`HsmKey::POLICY`,
//! `KeyData::HSM_KEY`, ...) for lazy and batch parent loading.

#[macro_use]
mod macros;

pub mod hsm_key;
pub mod key_data;
pub mod key_state;
pub mod policy;
pub mod policy_key;
pub mod role;

use enforcer_db_core::{Connection, Entity, Result};

pub use hsm_key::{HsmKey, HsmKeyBackup, HsmKeyState, HsmKeyType};
pub use key_data::{DsAtParent, KeyData};
pub use key_state::{KeyState, KeyStateType, KeyStateValue};
pub use policy::{DenialType, Policy, ZoneSoaSerial};
pub use policy_key::PolicyKey;
pub use role::KeyRole;

/// Register every table with a backend.
pub fn register_all<C: Connection>(conn: &C) -> Result<()> {
    conn.register(Policy::schema())?;
    conn.register(PolicyKey::schema())?;
    conn.register(HsmKey::schema())?;
    conn.register(KeyData::schema())?;
    conn.register(KeyState::schema())?;
    tracing::debug!(tables = 5, "registered key-lifecycle tables");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enforcer_db_core::Key;
    use enforcer_db_memory::MemoryConnection;
    use enforcer_db_session::{EntityList, Repository};

    fn setup() -> MemoryConnection {
        let conn = MemoryConnection::new();
        register_all(&conn).unwrap();
        conn
    }

    fn policy(conn: &MemoryConnection, name: &str) -> Policy {
        let repo: Repository<_, Policy> = Repository::new(conn);
        let mut policy = Policy::new();
        policy.set_name(name).unwrap();
        policy.set_description("test policy").unwrap();
        repo.create(&mut policy).unwrap();
        policy
    }

    #[test]
    fn test_register_all_is_repeatable() {
        let conn = setup();
        register_all(&conn).unwrap();
        assert_eq!(conn.row_count("hsm_key"), Some(0));
        assert_eq!(conn.row_count("key_state"), Some(0));
    }

    #[test]
    fn test_get_by_name() {
        let conn = setup();
        let created = policy(&conn, "default");
        let repo: Repository<_, Policy> = Repository::new(&conn);

        let found = Policy::get_by_name(&repo, "default").unwrap();
        assert_eq!(found.id(), created.id());
        assert_eq!(found.description(), Some("test policy"));
        assert!(Policy::get_by_name(&repo, "missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_hsm_key_lookup_and_lazy_policy() {
        let conn = setup();
        let owner = policy(&conn, "lab");
        let mut repo: Repository<_, HsmKey> = Repository::new(&conn);

        let mut key = HsmKey::new();
        key.set_policy_id(&owner.id_value()).unwrap();
        key.set_locator("0a1b2c").unwrap();
        key.set_repository("SoftHSM").unwrap();
        repo.create(&mut key).unwrap();

        let mut found = HsmKey::get_by_locator(&repo, "0a1b2c").unwrap();
        assert!(found.policy().is_none());
        let parent = repo.load_related(&mut found, HsmKey::POLICY).unwrap();
        assert_eq!(parent.and_then(Policy::name), Some("lab"));
        assert_eq!(found.policy().and_then(Policy::name), Some("lab"));
    }

    #[test]
    fn test_policy_keys_listed_by_policy() {
        let conn = setup();
        let a = policy(&conn, "a");
        let b = policy(&conn, "b");
        let repo: Repository<_, PolicyKey> = Repository::new(&conn);
        for (owner, role) in [(&a, KeyRole::Ksk), (&a, KeyRole::Zsk), (&b, KeyRole::Csk)] {
            let mut key = PolicyKey::new();
            key.set_policy_id(&owner.id_value()).unwrap();
            key.set_role(role).unwrap();
            key.set_repository("SoftHSM").unwrap();
            repo.create(&mut key).unwrap();
        }

        let mut list: EntityList<_, PolicyKey> = EntityList::new(&conn);
        let a_id: &Key = a.id().unwrap();
        list.get_by_foreign_key("policy_id", a_id).unwrap();
        let roles: Vec<KeyRole> = list.to_vec().unwrap().iter().map(PolicyKey::role).collect();
        assert_eq!(roles, vec![KeyRole::Ksk, KeyRole::Zsk]);
    }
}
