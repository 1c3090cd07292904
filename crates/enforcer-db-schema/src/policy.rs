//! Signing policies.
//!
//! A policy carries the timing parameters for signatures, denial of
//! existence, keys, the zone and its parent. Every other table hangs off a
//! policy directly or indirectly.

use std::cmp::Ordering;

use enforcer_db_core::{
    Connection, DbEnum, Entity, FieldInfo, NamedRow, RecordMeta, Result, TableSchema, Value,
    ValueKind, ValueSet, db_enum,
};
use enforcer_db_session::Repository;

db_enum! {
    /// Authenticated denial of existence.
    pub enum DenialType {
        Nsec = 0 => "NSEC",
        Nsec3 = 1 => "NSEC3",
    }
}

db_enum! {
    /// How the SOA serial advances.
    pub enum ZoneSoaSerial {
        Counter = 0 => "counter",
        DateCounter = 1 => "datecounter",
        UnixTime = 2 => "unixtime",
        Keep = 3 => "keep",
    }
}

/// Policy names are single tokens.
pub const NAME_PATTERN: &str = r"^\S+$";

/// Lists the unsigned columns once, in declaration order, for the schema,
/// the value binding, the decoder and the comparison.
macro_rules! policy_uints {
    ($apply:ident) => {
        $apply! {
            signatures_resign,
            signatures_refresh,
            signatures_jitter,
            signatures_inception_offset,
            signatures_validity_default,
            signatures_validity_denial,
            signatures_validity_keyset,
            signatures_max_zone_ttl,
            denial_optout,
            denial_ttl,
            denial_resalt,
            denial_algorithm,
            denial_iterations,
            denial_salt_length,
            denial_salt_last_change,
            keys_ttl,
            keys_retire_safety,
            keys_publish_safety,
            keys_shared,
            keys_purge_after,
            zone_propagation_delay,
            zone_soa_ttl,
            zone_soa_minimum,
            parent_registration_delay,
            parent_propagation_delay,
            parent_ds_ttl,
            parent_soa_ttl,
            parent_soa_minimum,
            passthrough
        }
    };
}

macro_rules! declare_policy {
    ($($uint:ident),+) => {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("name", ValueKind::Text).unique(true).pattern(NAME_PATTERN),
            FieldInfo::new("description", ValueKind::Text),
            $( FieldInfo::new(stringify!($uint), ValueKind::UInt32), )+
            FieldInfo::enumeration("denial_type", DenialType::MAPPING),
            FieldInfo::new("denial_salt", ValueKind::Text).nullable(true),
            FieldInfo::enumeration("zone_soa_serial", ZoneSoaSerial::MAPPING),
        ];

        /// A signing policy.
        #[derive(Debug, Clone, PartialEq)]
        pub struct Policy {
            meta: RecordMeta,
            name: Option<String>,
            description: Option<String>,
            $( $uint: u32, )+
            denial_type: DenialType,
            denial_salt: Option<String>,
            zone_soa_serial: ZoneSoaSerial,
        }

        impl Default for Policy {
            fn default() -> Self {
                Self {
                    meta: RecordMeta::default(),
                    name: None,
                    description: None,
                    $( $uint: 0, )+
                    denial_type: DenialType::Nsec,
                    denial_salt: None,
                    zone_soa_serial: ZoneSoaSerial::Counter,
                }
            }
        }

        uint_columns!(Policy { $($uint),+ });

        impl Policy {
            fn bind_uints(&self, set: &mut ValueSet) {
                $( set.push(stringify!($uint), self.$uint); )+
            }

            fn decode_uints(&mut self, row: &NamedRow<'_>) -> Result<()> {
                $( self.$uint = row.uint32(stringify!($uint))?; )+
                Ok(())
            }

            fn compare_uints(&self, other: &Self) -> Ordering {
                Ordering::Equal
                    $( .then_with(|| self.$uint.cmp(&other.$uint)) )+
            }
        }
    };
}

policy_uints!(declare_policy);

static SCHEMA: TableSchema = TableSchema::new("policy", FIELDS);

text_columns!(Policy {
    name,
    description,
    denial_salt,
});

enum_columns!(Policy {
    denial_type: DenialType,
    zone_soa_serial: ZoneSoaSerial,
});

impl Policy {
    /// A policy with default column values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the policy called `name`.
    pub fn get_by_name<C: Connection>(repo: &Repository<C, Self>, name: &str) -> Result<Self> {
        repo.get_by_field("name", name)
    }

    /// Remove the NSEC3 salt.
    pub fn clear_denial_salt(&mut self) {
        self.denial_salt = None;
    }
}

impl Entity for Policy {
    const TABLE_NAME: &'static str = "policy";

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
        set.push("name", Value::from(self.name.as_deref()));
        set.push("description", Value::from(self.description.as_deref()));
        self.bind_uints(&mut set);
        set.push("denial_type", self.denial_type.to_value()?);
        set.push("denial_salt", Value::from(self.denial_salt.as_deref()));
        set.push("zone_soa_serial", self.zone_soa_serial.to_value()?);
        Ok(set)
    }

    fn decode_fields(&mut self, row: &NamedRow<'_>) -> Result<()> {
        self.name = row.optional_text("name")?;
        self.description = row.optional_text("description")?;
        self.decode_uints(row)?;
        self.denial_type = row.enumeration("denial_type")?;
        self.denial_salt = row.optional_text("denial_salt")?;
        self.zone_soa_serial = row.enumeration("zone_soa_serial")?;
        Ok(())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.description.cmp(&other.description))
            .then_with(|| self.compare_uints(other))
            .then_with(|| self.denial_type.cmp(&other.denial_type))
            .then_with(|| self.denial_salt.cmp(&other.denial_salt))
            .then_with(|| self.zone_soa_serial.cmp(&other.zone_soa_serial))
    }
}
