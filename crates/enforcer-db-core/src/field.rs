//! Field descriptors and table schemas.
//!
//! A [`TableSchema`] is the declarative description of one entity table: its
//! name, the implicit primary-key and revision columns, and the declared
//! columns in fixed order. The same schema drives value binding for writes,
//! column projection for reads and positional decoding of result rows.

use crate::enums::EnumMapping;
use crate::error::{Error, Result};
use crate::validate::matches_pattern;
use crate::value::{Value, ValueKind};

/// Metadata about one declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Column name.
    pub name: &'static str,
    /// Kind of value stored in the column.
    pub kind: ValueKind,
    /// Label table for enum columns.
    pub enum_mapping: Option<&'static [EnumMapping]>,
    /// Whether NULL is accepted on create/update.
    pub nullable: bool,
    /// Whether the backend must keep values distinct across rows.
    pub unique: bool,
    /// Referenced table for foreign-key columns.
    pub foreign_key: Option<&'static str>,
    /// Regex that text values must match.
    pub pattern: Option<&'static str>,
}

impl FieldInfo {
    /// Create a required column of the given kind.
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            enum_mapping: None,
            nullable: false,
            unique: false,
            foreign_key: None,
            pattern: None,
        }
    }

    /// Create an enum column with its label table.
    pub const fn enumeration(name: &'static str, mapping: &'static [EnumMapping]) -> Self {
        let mut field = Self::new(name, ValueKind::Enum);
        field.enum_mapping = Some(mapping);
        field
    }

    /// Create a foreign-key column referencing `table`.
    pub const fn reference(name: &'static str, table: &'static str) -> Self {
        let mut field = Self::new(name, ValueKind::PrimaryKey);
        field.foreign_key = Some(table);
        field
    }

    /// Set nullable flag.
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set unique flag.
    pub const fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    /// Require text values to match `pattern`.
    pub const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Check whether `value` has a shape this column can store.
    ///
    /// NULL is accepted here regardless of nullability; use [`validate`]
    /// for write-time checks.
    ///
    /// [`validate`]: FieldInfo::validate
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self.kind {
            ValueKind::Empty => false,
            ValueKind::Int32 => value.to_i32().is_ok(),
            ValueKind::UInt32 => value.to_u32().is_ok(),
            ValueKind::Int64 => value.to_i64().is_ok(),
            ValueKind::UInt64 => value.to_u64().is_ok(),
            ValueKind::Text => value.as_text().is_ok(),
            ValueKind::PrimaryKey => value.as_primary_key().is_ok(),
            ValueKind::Revision => value.as_revision().is_ok(),
            ValueKind::Enum => match (value.enum_code(), self.enum_mapping) {
                (Ok(code), Some(mapping)) => mapping.iter().any(|m| m.code == code),
                (Ok(_), None) => true,
                (Err(_), _) => false,
            },
        }
    }

    /// Validate a value about to be written to this column.
    pub fn validate(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            if self.nullable {
                return Ok(());
            }
            return Err(Error::precondition(format!(
                "column {} is required",
                self.name
            )));
        }
        if !self.accepts(value) {
            return Err(Error::precondition(format!(
                "column {} cannot store {} value {}",
                self.name,
                value.kind(),
                value
            )));
        }
        if let (Some(pattern), Value::Text(text)) = (self.pattern, value) {
            if !matches_pattern(text, pattern) {
                return Err(Error::precondition(format!(
                    "column {} value '{}' does not match {}",
                    self.name, text, pattern
                )));
            }
        }
        Ok(())
    }
}

/// Declarative description of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name.
    pub table: &'static str,
    /// Name of the implicit primary-key column (always position 0).
    pub primary_key: &'static str,
    /// Name of the implicit revision column (always position 1).
    pub revision: &'static str,
    /// Declared columns, in order, after the two implicit ones.
    pub fields: &'static [FieldInfo],
}

impl TableSchema {
    /// Create a schema with the conventional `id`/`rev` implicit columns.
    pub const fn new(table: &'static str, fields: &'static [FieldInfo]) -> Self {
        Self {
            table,
            primary_key: "id",
            revision: "rev",
            fields,
        }
    }

    /// Number of columns in a full result row.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.fields.len() + 2
    }

    /// All column names in row order.
    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::with_capacity(self.column_count());
        columns.push(self.primary_key);
        columns.push(self.revision);
        columns.extend(self.fields.iter().map(|f| f.name));
        columns
    }

    /// Look up a declared column.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a declared column among the declared columns.
    #[must_use]
    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Position of any column (implicit ones included) in a full row.
    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        if name == self.primary_key {
            Some(0)
        } else if name == self.revision {
            Some(1)
        } else {
            self.field_position(name).map(|p| p + 2)
        }
    }

    /// Declared foreign-key columns.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.foreign_key.is_some())
    }
}
