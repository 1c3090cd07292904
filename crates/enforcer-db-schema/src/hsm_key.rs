//! Key material held in an HSM repository.

use std::cmp::Ordering;

use enforcer_db_core::{
    Connection, DbEnum, Entity, FieldInfo, ForeignKey, NamedRow, RecordMeta, Result,
    TableSchema, Value, ValueKind, ValueSet, db_enum,
};
use enforcer_db_session::Repository;

use crate::policy::Policy;
use crate::role::KeyRole;

db_enum! {
    /// Allocation state of an hsm key.
    pub enum HsmKeyState {
        Unused = 1 => "UNUSED",
        Private = 2 => "PRIVATE",
        Shared = 3 => "SHARED",
        Delete = 4 => "DELETE",
    }
}

db_enum! {
    /// Key algorithm family.
    pub enum HsmKeyType {
        Rsa = 1 => "RSA",
    }
}

db_enum! {
    /// Backup progress of the key material.
    pub enum HsmKeyBackup {
        NoBackup = 0 => "No Backup",
        BackupRequired = 1 => "Backup Required",
        BackupRequested = 2 => "Backup Requested",
        BackupDone = 3 => "Backup Done",
    }
}

static FIELDS: &[FieldInfo] = &[
    FieldInfo::reference("policy_id", "policy"),
    FieldInfo::new("locator", ValueKind::Text).unique(true),
    FieldInfo::enumeration("state", HsmKeyState::MAPPING),
    FieldInfo::new("bits", ValueKind::UInt32),
    FieldInfo::new("algorithm", ValueKind::UInt32),
    FieldInfo::enumeration("role", KeyRole::MAPPING),
    FieldInfo::new("inception", ValueKind::UInt32),
    FieldInfo::new("is_revoked", ValueKind::UInt32),
    FieldInfo::enumeration("key_type", HsmKeyType::MAPPING),
    FieldInfo::new("repository", ValueKind::Text),
    FieldInfo::enumeration("backup", HsmKeyBackup::MAPPING),
];

static SCHEMA: TableSchema = TableSchema::new("hsm_key", FIELDS);

/// A key stored in an HSM, owned by a policy.
#[derive(Debug, Clone, PartialEq)]
pub struct HsmKey {
    meta: RecordMeta,
    policy_id: ForeignKey<Policy>,
    locator: Option<String>,
    state: HsmKeyState,
    bits: u32,
    algorithm: u32,
    role: KeyRole,
    inception: u32,
    is_revoked: u32,
    key_type: HsmKeyType,
    repository: Option<String>,
    backup: HsmKeyBackup,
}

impl Default for HsmKey {
    fn default() -> Self {
        Self {
            meta: RecordMeta::default(),
            policy_id: ForeignKey::new(),
            locator: None,
            state: HsmKeyState::Unused,
            bits: 2048,
            algorithm: 1,
            role: KeyRole::Zsk,
            inception: 0,
            is_revoked: 0,
            key_type: HsmKeyType::Rsa,
            repository: None,
            backup: HsmKeyBackup::NoBackup,
        }
    }
}

foreign_key_columns!(HsmKey {
    policy_id -> policy: Policy as POLICY,
});

text_columns!(HsmKey { locator, repository });

enum_columns!(HsmKey {
    state: HsmKeyState,
    role: KeyRole,
    key_type: HsmKeyType,
    backup: HsmKeyBackup,
});

uint_columns!(HsmKey {
    bits,
    algorithm,
    inception,
    is_revoked,
});

impl HsmKey {
    /// A key with default column values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the key stored under `locator`.
    pub fn get_by_locator<C: Connection>(repo: &Repository<C, Self>, locator: &str) -> Result<Self> {
        repo.get_by_field("locator", locator)
    }
}

impl Entity for HsmKey {
    const TABLE_NAME: &'static str = "hsm_key";

    fn schema() -> &'static TableSchema {
        &SCHEMA
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_values(&self) -> Result<ValueSet> {
        let mut set = ValueSet::with_capacity(FIELDS.len());
        set.push("policy_id", self.policy_id.value());
        set.push("locator", Value::from(self.locator.as_deref()));
        set.push("state", self.state.to_value()?);
        set.push("bits", self.bits);
        set.push("algorithm", self.algorithm);
        set.push("role", self.role.to_value()?);
        set.push("inception", self.inception);
        set.push("is_revoked", self.is_revoked);
        set.push("key_type", self.key_type.to_value()?);
        set.push("repository", Value::from(self.repository.as_deref()));
        set.push("backup", self.backup.to_value()?);
        Ok(set)
    }

    fn decode_fields(&mut self, row: &NamedRow<'_>) -> Result<()> {
        self.policy_id = row
            .foreign_key("policy_id")?
            .map(ForeignKey::with_key)
            .unwrap_or_default();
        self.locator = row.optional_text("locator")?;
        self.state = row.enumeration("state")?;
        self.bits = row.uint32("bits")?;
        self.algorithm = row.uint32("algorithm")?;
        self.role = row.enumeration("role")?;
        self.inception = row.uint32("inception")?;
        self.is_revoked = row.uint32("is_revoked")?;
        self.key_type = row.enumeration("key_type")?;
        self.repository = row.optional_text("repository")?;
        self.backup = row.enumeration("backup")?;
        Ok(())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.policy_id
            .cmp(&other.policy_id)
            .then_with(|| self.locator.cmp(&other.locator))
            .then_with(|| self.state.cmp(&other.state))
            .then_with(|| self.bits.cmp(&other.bits))
            .then_with(|| self.algorithm.cmp(&other.algorithm))
            .then_with(|| self.role.cmp(&other.role))
            .then_with(|| self.inception.cmp(&other.inception))
            .then_with(|| self.is_revoked.cmp(&other.is_revoked))
            .then_with(|| self.key_type.cmp(&other.key_type))
            .then_with(|| self.repository.cmp(&other.repository))
            .then_with(|| self.backup.cmp(&other.backup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enforcer_db_core::{ClauseList, Key, RecordState, compare_records};

    #[test]
    fn test_defaults() {
        let key = HsmKey::new();
        assert_eq!(key.bits(), 2048);
        assert_eq!(key.algorithm(), 1);
        assert_eq!(key.role(), KeyRole::Zsk);
        assert_eq!(key.role_text(), Some("ZSK"));
        assert_eq!(key.backup_text(), Some("No Backup"));
        assert_eq!(key.state_text(), Some("UNUSED"));
        assert_eq!(key.key_type(), HsmKeyType::Rsa);
        assert_eq!(key.locator(), None);
        assert_eq!(key.policy_id(), None);
        assert_eq!(key.lifecycle(), RecordState::Unpersisted);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut key = HsmKey::new();
        key.set_bits(4096);
        key.set_locator("abc").unwrap();
        key.set_policy_id(&Value::from(Key::Int(3))).unwrap();
        key.reset();
        assert_eq!(key, HsmKey::default());
        key.reset();
        assert_eq!(key, HsmKey::default());
    }

    #[test]
    fn test_setters_reject_without_mutating() {
        let mut key = HsmKey::new();
        key.set_role(KeyRole::Ksk).unwrap();
        key.set_policy_id(&Value::from(Key::Int(7))).unwrap();

        assert!(key.set_role(KeyRole::Invalid).unwrap_err().is_precondition());
        assert!(key.set_backup_text("Backed Up").unwrap_err().is_precondition());
        assert!(key.set_policy_id(&Value::Null).unwrap_err().is_precondition());
        assert!(key.set_policy_id(&Value::from(7u32)).unwrap_err().is_precondition());

        assert_eq!(key.role(), KeyRole::Ksk);
        assert_eq!(key.backup(), HsmKeyBackup::NoBackup);
        assert_eq!(key.policy_id(), Some(&Key::Int(7)));
    }

    #[test]
    fn test_text_setters() {
        let mut key = HsmKey::new();
        key.set_backup_text("Backup Required").unwrap();
        assert_eq!(key.backup(), HsmKeyBackup::BackupRequired);
        key.set_state_text("SHARED").unwrap();
        assert_eq!(key.state(), HsmKeyState::Shared);
        assert_eq!(key.lifecycle(), RecordState::Unpersisted);
        key.set_repository("SoftHSM").unwrap();
        assert_eq!(key.repository(), Some("SoftHSM"));
    }

    #[test]
    fn test_to_values_covers_schema() {
        let mut key = HsmKey::new();
        key.set_locator("locator 1").unwrap();
        let values = key.to_values().unwrap();
        assert_eq!(values.len(), FIELDS.len());
        assert_eq!(values.get("policy_id"), Some(&Value::Null));
        assert_eq!(values.get("backup").and_then(|v| v.enum_code().ok()), Some(0));
        assert!(values.into_declared(HsmKey::schema()).is_ok());
    }

    #[test]
    fn test_compare_foreign_key_first() {
        let mut a = HsmKey::new();
        let mut b = HsmKey::new();
        a.set_policy_id(&Value::from(Key::Int(1))).unwrap();
        b.set_policy_id(&Value::from(Key::Int(2))).unwrap();
        a.set_bits(4096);

        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(compare_records(None, Some(&a)), Ordering::Less);
        assert_eq!(compare_records::<HsmKey>(None, None), Ordering::Equal);
    }

    #[test]
    fn test_absent_text_sorts_first() {
        let a = HsmKey::new();
        let mut b = HsmKey::new();
        b.set_locator("x").unwrap();
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(a.compare(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_clause_builders() {
        let mut clauses = ClauseList::new();
        HsmKey::bits_clause(&mut clauses, 2048);
        HsmKey::role_clause(&mut clauses, KeyRole::Ksk).unwrap();
        HsmKey::policy_id_clause(&mut clauses, &Value::from(Key::Int(1))).unwrap();
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses.to_string(), "bits = 2048 AND role = KSK AND policy_id = #1");

        assert!(HsmKey::role_clause(&mut clauses, KeyRole::Invalid).is_err());
        assert!(HsmKey::policy_id_clause(&mut clauses, &Value::Null).is_err());
        assert_eq!(clauses.len(), 3);
    }
}
