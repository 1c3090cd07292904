//! Key templates of a policy: which keys the policy wants and how they roll.

use std::cmp::Ordering;

use enforcer_db_core::{
    DbEnum, Entity, FieldInfo, ForeignKey, NamedRow, RecordMeta, Result, TableSchema, Value,
    ValueKind, ValueSet,
};

use crate::policy::Policy;
use crate::role::KeyRole;

static FIELDS: &[FieldInfo] = &[
    FieldInfo::reference("policy_id", "policy"),
    FieldInfo::enumeration("role", KeyRole::MAPPING),
    FieldInfo::new("algorithm", ValueKind::UInt32),
    FieldInfo::new("bits", ValueKind::UInt32),
    FieldInfo::new("lifetime", ValueKind::UInt32),
    FieldInfo::new("repository", ValueKind::Text),
    FieldInfo::new("standby", ValueKind::UInt32),
    FieldInfo::new("manual_rollover", ValueKind::UInt32),
    FieldInfo::new("rfc5011", ValueKind::UInt32),
    FieldInfo::new("minimize", ValueKind::UInt32),
];

static SCHEMA: TableSchema = TableSchema::new("policy_key", FIELDS);

/// One key a policy asks for. The role has no default and must be set
/// before the record can be written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyKey {
    meta: RecordMeta,
    policy_id: ForeignKey<Policy>,
    role: KeyRole,
    algorithm: u32,
    bits: u32,
    lifetime: u32,
    repository: Option<String>,
    standby: u32,
    manual_rollover: u32,
    rfc5011: u32,
    minimize: u32,
}

foreign_key_columns!(PolicyKey {
    policy_id -> policy: Policy as POLICY,
});

enum_columns!(PolicyKey { role: KeyRole });

text_columns!(PolicyKey { repository });

uint_columns!(PolicyKey {
    algorithm,
    bits,
    lifetime,
    standby,
    manual_rollover,
    rfc5011,
    minimize,
});

impl PolicyKey {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Entity for PolicyKey {
    const TABLE_NAME: &'static str = "policy_key";

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
        set.push("role", self.role.to_value()?);
        set.push("algorithm", self.algorithm);
        set.push("bits", self.bits);
        set.push("lifetime", self.lifetime);
        set.push("repository", Value::from(self.repository.as_deref()));
        set.push("standby", self.standby);
        set.push("manual_rollover", self.manual_rollover);
        set.push("rfc5011", self.rfc5011);
        set.push("minimize", self.minimize);
        Ok(set)
    }

    fn decode_fields(&mut self, row: &NamedRow<'_>) -> Result<()> {
        self.policy_id = row
            .foreign_key("policy_id")?
            .map(ForeignKey::with_key)
            .unwrap_or_default();
        self.role = row.enumeration("role")?;
        self.algorithm = row.uint32("algorithm")?;
        self.bits = row.uint32("bits")?;
        self.lifetime = row.uint32("lifetime")?;
        self.repository = row.optional_text("repository")?;
        self.standby = row.uint32("standby")?;
        self.manual_rollover = row.uint32("manual_rollover")?;
        self.rfc5011 = row.uint32("rfc5011")?;
        self.minimize = row.uint32("minimize")?;
        Ok(())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.policy_id
            .cmp(&other.policy_id)
            .then_with(|| self.role.cmp(&other.role))
            .then_with(|| self.algorithm.cmp(&other.algorithm))
            .then_with(|| self.bits.cmp(&other.bits))
            .then_with(|| self.lifetime.cmp(&other.lifetime))
            .then_with(|| self.repository.cmp(&other.repository))
            .then_with(|| self.standby.cmp(&other.standby))
            .then_with(|| self.manual_rollover.cmp(&other.manual_rollover))
            .then_with(|| self.rfc5011.cmp(&other.rfc5011))
            .then_with(|| self.minimize.cmp(&other.minimize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_role_blocks_binding() {
        let key = PolicyKey::new();
        assert_eq!(key.role(), KeyRole::Invalid);
        assert_eq!(key.role_text(), None);
        assert!(key.to_values().unwrap_err().is_precondition());
    }

    #[test]
    fn test_role_by_label() {
        let mut key = PolicyKey::new();
        key.set_role_text("CSK").unwrap();
        assert_eq!(key.role(), KeyRole::Csk);
        assert!(key.set_role_text("").is_err());
        assert_eq!(key.role(), KeyRole::Csk);
        assert!(key.to_values().is_ok());
    }

    #[test]
    fn test_relation_reaches_foreign_key() {
        let mut key = PolicyKey::new();
        let rel = PolicyKey::POLICY;
        assert_eq!(rel.field, "policy_id");
        (rel.get_mut)(&mut key).set_key(enforcer_db_core::Key::Int(9));
        assert_eq!(key.policy_id(), Some(&enforcer_db_core::Key::Int(9)));
        assert!((rel.get)(&key).cached().is_none());
        assert!(key.policy().is_none());
    }
}
