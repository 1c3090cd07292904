//! Rollover state of one record type of a key.

use std::cmp::Ordering;

use enforcer_db_core::{
    DbEnum, Entity, FieldInfo, ForeignKey, NamedRow, RecordMeta, Result, TableSchema, ValueKind,
    ValueSet, db_enum,
};

use crate::key_data::KeyData;

db_enum! {
    /// Record type whose state is tracked.
    pub enum KeyStateType {
        Ds = 0 => "DS",
        Rrsig = 1 => "RRSIG",
        Dnskey = 2 => "DNSKEY",
        RrsigDnskey = 3 => "RRSIGDNSKEY",
    }
}

db_enum! {
    /// Where the record is in its introduction or withdrawal.
    pub enum KeyStateValue {
        Hidden = 0 => "hidden",
        Rumoured = 1 => "rumoured",
        Omnipresent = 2 => "omnipresent",
        Unretentive = 3 => "unretentive",
        Na = 4 => "NA",
    }
}

static FIELDS: &[FieldInfo] = &[
    FieldInfo::reference("key_data_id", "key_data"),
    FieldInfo::enumeration("type", KeyStateType::MAPPING),
    FieldInfo::enumeration("state", KeyStateValue::MAPPING),
    FieldInfo::new("last_change", ValueKind::UInt32),
    FieldInfo::new("minimize", ValueKind::UInt32),
    FieldInfo::new("ttl", ValueKind::UInt32),
];

static SCHEMA: TableSchema = TableSchema::new("key_state", FIELDS);

#[derive(Debug, Clone, PartialEq)]
pub struct KeyState {
    meta: RecordMeta,
    key_data_id: ForeignKey<KeyData>,
    /// Stored in the `type` column.
    state_type: KeyStateType,
    state: KeyStateValue,
    last_change: u32,
    minimize: u32,
    ttl: u32,
}

impl Default for KeyState {
    fn default() -> Self {
        Self {
            meta: RecordMeta::default(),
            key_data_id: ForeignKey::new(),
            state_type: KeyStateType::Invalid,
            state: KeyStateValue::Hidden,
            last_change: 0,
            minimize: 0,
            ttl: 0,
        }
    }
}

foreign_key_columns!(KeyState {
    key_data_id -> key_data: KeyData as KEY_DATA,
});

enum_columns!(KeyState {
    state_type as "type": KeyStateType,
    state: KeyStateValue,
});

uint_columns!(KeyState {
    last_change,
    minimize,
    ttl,
});

impl KeyState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Entity for KeyState {
    const TABLE_NAME: &'static str = "key_state";

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
        set.push("key_data_id", self.key_data_id.value());
        set.push("type", self.state_type.to_value()?);
        set.push("state", self.state.to_value()?);
        set.push("last_change", self.last_change);
        set.push("minimize", self.minimize);
        set.push("ttl", self.ttl);
        Ok(set)
    }

    fn decode_fields(&mut self, row: &NamedRow<'_>) -> Result<()> {
        self.key_data_id = row
            .foreign_key("key_data_id")?
            .map(ForeignKey::with_key)
            .unwrap_or_default();
        self.state_type = row.enumeration("type")?;
        self.state = row.enumeration("state")?;
        self.last_change = row.uint32("last_change")?;
        self.minimize = row.uint32("minimize")?;
        self.ttl = row.uint32("ttl")?;
        Ok(())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.key_data_id
            .cmp(&other.key_data_id)
            .then_with(|| self.state_type.cmp(&other.state_type))
            .then_with(|| self.state.cmp(&other.state))
            .then_with(|| self.last_change.cmp(&other.last_change))
            .then_with(|| self.minimize.cmp(&other.minimize))
            .then_with(|| self.ttl.cmp(&other.ttl))
    }
}
