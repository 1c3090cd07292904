//! Per-zone use of an hsm key.

use std::cmp::Ordering;

use enforcer_db_core::{
    Clause, ClauseList, DbEnum, Entity, Error, FieldInfo, ForeignKey, Key, NamedRow, RecordMeta,
    Result, TableSchema, Value, ValueKind, ValueSet, db_enum,
};

use crate::hsm_key::HsmKey;
use crate::role::KeyRole;

db_enum! {
    /// Progress of the DS record at the parent.
    pub enum DsAtParent {
        Unsubmitted = 0 => "unsubmitted",
        Submit = 1 => "submit",
        Submitted = 2 => "submitted",
        Seen = 3 => "seen",
        Retract = 4 => "retract",
        Retracted = 5 => "retracted",
    }
}

static FIELDS: &[FieldInfo] = &[
    FieldInfo::reference("zone_id", "zone"),
    FieldInfo::reference("hsm_key_id", "hsm_key"),
    FieldInfo::new("algorithm", ValueKind::UInt32),
    FieldInfo::new("inception", ValueKind::UInt32),
    FieldInfo::enumeration("role", KeyRole::MAPPING),
    FieldInfo::new("introducing", ValueKind::UInt32),
    FieldInfo::new("should_revoke", ValueKind::UInt32),
    FieldInfo::new("standby", ValueKind::UInt32),
    FieldInfo::new("active_zsk", ValueKind::UInt32),
    FieldInfo::new("publish", ValueKind::UInt32),
    FieldInfo::new("active_ksk", ValueKind::UInt32),
    FieldInfo::enumeration("ds_at_parent", DsAtParent::MAPPING),
    FieldInfo::new("keytag", ValueKind::UInt32),
    FieldInfo::new("minimize", ValueKind::UInt32),
];

static SCHEMA: TableSchema = TableSchema::new("key_data", FIELDS);

/// A key as used by one zone.
///
/// `zone_id` points into the zone table, which lives outside this crate;
/// the key is stored and filtered on but never resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyData {
    meta: RecordMeta,
    zone_id: Option<Key>,
    hsm_key_id: ForeignKey<HsmKey>,
    algorithm: u32,
    inception: u32,
    role: KeyRole,
    introducing: u32,
    should_revoke: u32,
    standby: u32,
    active_zsk: u32,
    publish: u32,
    active_ksk: u32,
    ds_at_parent: DsAtParent,
    keytag: u32,
    minimize: u32,
}

impl Default for KeyData {
    fn default() -> Self {
        Self {
            meta: RecordMeta::default(),
            zone_id: None,
            hsm_key_id: ForeignKey::new(),
            algorithm: 0,
            inception: 0,
            role: KeyRole::Invalid,
            introducing: 1,
            should_revoke: 0,
            standby: 0,
            active_zsk: 0,
            publish: 0,
            active_ksk: 0,
            ds_at_parent: DsAtParent::Unsubmitted,
            keytag: 0,
            minimize: 0,
        }
    }
}

foreign_key_columns!(KeyData {
    hsm_key_id -> hsm_key: HsmKey as HSM_KEY,
});

enum_columns!(KeyData {
    role: KeyRole,
    ds_at_parent: DsAtParent,
});

uint_columns!(KeyData {
    algorithm,
    inception,
    introducing,
    should_revoke,
    standby,
    active_zsk,
    publish,
    active_ksk,
    keytag,
    minimize,
});

impl KeyData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn zone_id(&self) -> Option<&Key> {
        self.zone_id.as_ref()
    }

    /// Set the owning zone. Only primary-key values are accepted.
    pub fn set_zone_id(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::PrimaryKey(key) => {
                self.zone_id = Some(key.clone());
                Ok(())
            }
            other => Err(Error::precondition(format!(
                "key_data.zone_id needs a primary key value, got {}",
                other.kind()
            ))),
        }
    }

    pub fn zone_id_clause<'c>(clauses: &'c mut ClauseList, value: &Value) -> Result<&'c mut Clause> {
        clauses.foreign_key("zone_id", value)
    }
}

impl Entity for KeyData {
    const TABLE_NAME: &'static str = "key_data";

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
        set.push("zone_id", self.zone_id.as_ref());
        set.push("hsm_key_id", self.hsm_key_id.value());
        set.push("algorithm", self.algorithm);
        set.push("inception", self.inception);
        set.push("role", self.role.to_value()?);
        set.push("introducing", self.introducing);
        set.push("should_revoke", self.should_revoke);
        set.push("standby", self.standby);
        set.push("active_zsk", self.active_zsk);
        set.push("publish", self.publish);
        set.push("active_ksk", self.active_ksk);
        set.push("ds_at_parent", self.ds_at_parent.to_value()?);
        set.push("keytag", self.keytag);
        set.push("minimize", self.minimize);
        Ok(set)
    }

    fn decode_fields(&mut self, row: &NamedRow<'_>) -> Result<()> {
        self.zone_id = row.foreign_key("zone_id")?;
        self.hsm_key_id = row
            .foreign_key("hsm_key_id")?
            .map(ForeignKey::with_key)
            .unwrap_or_default();
        self.algorithm = row.uint32("algorithm")?;
        self.inception = row.uint32("inception")?;
        self.role = row.enumeration("role")?;
        self.introducing = row.uint32("introducing")?;
        self.should_revoke = row.uint32("should_revoke")?;
        self.standby = row.uint32("standby")?;
        self.active_zsk = row.uint32("active_zsk")?;
        self.publish = row.uint32("publish")?;
        self.active_ksk = row.uint32("active_ksk")?;
        self.ds_at_parent = row.enumeration("ds_at_parent")?;
        self.keytag = row.uint32("keytag")?;
        self.minimize = row.uint32("minimize")?;
        Ok(())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.zone_id
            .cmp(&other.zone_id)
            .then_with(|| self.hsm_key_id.cmp(&other.hsm_key_id))
            .then_with(|| self.algorithm.cmp(&other.algorithm))
            .then_with(|| self.inception.cmp(&other.inception))
            .then_with(|| self.role.cmp(&other.role))
            .then_with(|| self.introducing.cmp(&other.introducing))
            .then_with(|| self.should_revoke.cmp(&other.should_revoke))
            .then_with(|| self.standby.cmp(&other.standby))
            .then_with(|| self.active_zsk.cmp(&other.active_zsk))
            .then_with(|| self.publish.cmp(&other.publish))
            .then_with(|| self.active_ksk.cmp(&other.active_ksk))
            .then_with(|| self.ds_at_parent.cmp(&other.ds_at_parent))
            .then_with(|| self.keytag.cmp(&other.keytag))
            .then_with(|| self.minimize.cmp(&other.minimize))
    }
}
