//! Dynamically typed column values.
//!
//! [`Value`] is what flows between entity records and a backend: a record
//! encodes itself into values, the backend stores and returns them, and the
//! decoder turns them back into typed fields. The tag decides which accessor
//! is valid; reading through the wrong one is an [`Error::TypeMismatch`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identity assigned by a backend.
///
/// SQL-style stores hand out integers, document stores hand out strings.
/// Callers never interpret a key; they only compare and pass it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Integer key.
    Int(u64),
    /// Text key.
    Text(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(id) => write!(f, "{id}"),
            Key::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for Key {
    fn from(id: u64) -> Self {
        Key::Int(id)
    }
}

impl From<&str> for Key {
    fn from(id: &str) -> Self {
        Key::Text(id.to_string())
    }
}

/// The kind of a [`Value`] or of a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value.
    Empty,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// UTF-8 text.
    Text,
    /// Reference to a row's primary key.
    PrimaryKey,
    /// Revision token for optimistic concurrency.
    Revision,
    /// Enumeration code with a text label.
    Enum,
}

impl ValueKind {
    /// True for the four integer kinds.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            ValueKind::Int32 | ValueKind::UInt32 | ValueKind::Int64 | ValueKind::UInt64
        )
    }

    /// Lowercase name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Empty => "empty",
            ValueKind::Int32 => "int32",
            ValueKind::UInt32 => "uint32",
            ValueKind::Int64 => "int64",
            ValueKind::UInt64 => "uint64",
            ValueKind::Text => "text",
            ValueKind::PrimaryKey => "primary key",
            ValueKind::Revision => "revision",
            ValueKind::Enum => "enum",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An enumeration code paired with its canonical label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EnumValue {
    /// Code persisted by the backend.
    pub code: i32,
    /// Presentation label.
    pub label: &'static str,
}

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Value {
    /// Empty / NULL.
    #[default]
    Null,
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Text.
    Text(String),
    /// Primary key of some row (own or referenced).
    PrimaryKey(Key),
    /// Revision of a row.
    Revision(Key),
    /// Enumeration value. Backends persist the code only, so this variant is
    /// never produced by deserialization.
    #[serde(skip_deserializing)]
    Enum(EnumValue),
}

impl Value {
    /// The kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Empty,
            Value::Int32(_) => ValueKind::Int32,
            Value::UInt32(_) => ValueKind::UInt32,
            Value::Int64(_) => ValueKind::Int64,
            Value::UInt64(_) => ValueKind::UInt64,
            Value::Text(_) => ValueKind::Text,
            Value::PrimaryKey(_) => ValueKind::PrimaryKey,
            Value::Revision(_) => ValueKind::Revision,
            Value::Enum(_) => ValueKind::Enum,
        }
    }

    /// True for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn mismatch(&self, expected: ValueKind) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    fn as_wide_int(&self) -> Option<i128> {
        match self {
            Value::Int32(v) => Some(i128::from(*v)),
            Value::UInt32(v) => Some(i128::from(*v)),
            Value::Int64(v) => Some(i128::from(*v)),
            Value::UInt64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    fn int_in_range<T: TryFrom<i128>>(&self, expected: ValueKind) -> Result<T> {
        let wide = self.as_wide_int().ok_or_else(|| self.mismatch(expected))?;
        T::try_from(wide)
            .map_err(|_| Error::precondition(format!("{wide} does not fit in {expected}")))
    }

    /// Read as `i32`, converting from any integer variant in range.
    pub fn to_i32(&self) -> Result<i32> {
        self.int_in_range(ValueKind::Int32)
    }

    /// Read as `u32`, converting from any integer variant in range.
    pub fn to_u32(&self) -> Result<u32> {
        self.int_in_range(ValueKind::UInt32)
    }

    /// Read as `i64`, converting from any integer variant in range.
    pub fn to_i64(&self) -> Result<i64> {
        self.int_in_range(ValueKind::Int64)
    }

    /// Read as `u64`, converting from any integer variant in range.
    pub fn to_u64(&self) -> Result<u64> {
        self.int_in_range(ValueKind::UInt64)
    }

    /// Borrow the text of a [`Value::Text`].
    pub fn as_text(&self) -> Result<&str> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::Text)),
        }
    }

    /// Borrow the key of a [`Value::PrimaryKey`].
    pub fn as_primary_key(&self) -> Result<&Key> {
        match self {
            Value::PrimaryKey(key) => Ok(key),
            other => Err(other.mismatch(ValueKind::PrimaryKey)),
        }
    }

    /// Borrow the key of a [`Value::Revision`].
    pub fn as_revision(&self) -> Result<&Key> {
        match self {
            Value::Revision(key) => Ok(key),
            other => Err(other.mismatch(ValueKind::Revision)),
        }
    }

    /// Enumeration code, from [`Value::Enum`] or from a stored integer code.
    pub fn enum_code(&self) -> Result<i32> {
        match self {
            Value::Enum(e) => Ok(e.code),
            other if other.kind().is_integer() => other.to_i32(),
            other => Err(other.mismatch(ValueKind::Enum)),
        }
    }

    /// Compare two values of compatible kinds.
    ///
    /// Integers compare numerically across widths, enums compare by code
    /// (also against integer codes). Incompatible kinds yield `None`.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::PrimaryKey(a), Value::PrimaryKey(b))
            | (Value::Revision(a), Value::Revision(b)) => Some(a.cmp(b)),
            (Value::Enum(_), _) | (_, Value::Enum(_)) => {
                let a = self.enum_code().ok()?;
                let b = other.enum_code().ok()?;
                Some(a.cmp(&b))
            }
            _ => {
                let a = self.as_wide_int()?;
                let b = other.as_wide_int()?;
                Some(a.cmp(&b))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{v}'"),
            Value::PrimaryKey(k) => write!(f, "#{k}"),
            Value::Revision(k) => write!(f, "rev {k}"),
            Value::Enum(e) => f.write_str(e.label),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Option<&str>> for Value {
    fn from(v: Option<&str>) -> Self {
        v.map_or(Value::Null, Value::from)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        Value::PrimaryKey(key)
    }
}

impl From<&Key> for Value {
    fn from(key: &Key) -> Self {
        Value::PrimaryKey(key.clone())
    }
}

impl From<Option<Key>> for Value {
    fn from(key: Option<Key>) -> Self {
        key.map_or(Value::Null, Value::PrimaryKey)
    }
}

impl From<Option<&Key>> for Value {
    fn from(key: Option<&Key>) -> Self {
        key.map_or(Value::Null, |k| Value::PrimaryKey(k.clone()))
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversion_across_widths() {
        assert_eq!(Value::UInt64(2048).to_u32().unwrap(), 2048);
        assert_eq!(Value::Int32(7).to_u64().unwrap(), 7);
        assert!(Value::Int32(-1).to_u32().is_err());
        assert!(Value::UInt64(u64::MAX).to_i64().is_err());
    }

    #[test]
    fn test_wrong_variant_is_type_mismatch() {
        let err = Value::UInt32(1).as_text().unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: ValueKind::Text,
                found: ValueKind::UInt32
            }
        );
        assert!(Value::Text("x".into()).to_u32().is_err());
        assert!(Value::Null.as_primary_key().is_err());
        assert!(Value::PrimaryKey(Key::Int(1)).as_revision().is_err());
    }

    #[test]
    fn test_enum_code_accepts_stored_integers() {
        let e = Value::Enum(EnumValue {
            code: 3,
            label: "CSK",
        });
        assert_eq!(e.enum_code().unwrap(), 3);
        assert_eq!(Value::Int32(2).enum_code().unwrap(), 2);
        assert!(Value::Text("KSK".into()).enum_code().is_err());
    }

    #[test]
    fn test_compare_numeric_and_enum() {
        assert_eq!(
            Value::UInt32(5).compare(&Value::Int64(5)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Int32(2).compare(&Value::UInt64(9)),
            Some(Ordering::Less)
        );
        let ksk = Value::Enum(EnumValue {
            code: 1,
            label: "KSK",
        });
        assert_eq!(ksk.compare(&Value::Int32(1)), Some(Ordering::Equal));
        assert_eq!(Value::Text("a".into()).compare(&Value::UInt32(1)), None);
    }

    #[test]
    fn test_key_display_and_order() {
        assert_eq!(Key::Int(12).to_string(), "12");
        assert_eq!(Key::from("abc").to_string(), "abc");
        assert!(Key::Int(1) < Key::Int(2));
    }

    #[test]
    fn test_option_key_into_value() {
        assert_eq!(Value::from(None::<Key>), Value::Null);
        assert_eq!(
            Value::from(Some(Key::Int(4))),
            Value::PrimaryKey(Key::Int(4))
        );
    }
}
