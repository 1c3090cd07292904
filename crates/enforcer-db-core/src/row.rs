//! Rows and named value sets.
//!
//! Writes carry a [`ValueSet`]: values bound to column names, in whatever
//! order the entity produced them. Only the backend boundary flattens a set
//! into positional form, using the table schema, so a record can never bind a
//! value to the wrong column by miscounting.
//!
//! Reads return positional [`Row`]s in schema order (`id`, `rev`, then the
//! declared columns). [`NamedRow`] pairs a row with its schema and offers typed,
//! name-based getters that report failures as [`Error::Decode`].

use crate::enums::DbEnum;
use crate::error::{Error, Result};
use crate::field::TableSchema;
use crate::value::{Key, Value};

/// A positional result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Vec<Value>);

impl Row {
    /// Create a row from values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at a position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// All values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Take the values out of the row.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

/// Column values bound by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    entries: Vec<(&'static str, Value)>,
}

impl ValueSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty set sized for `capacity` columns.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Bind `value` to `column`, replacing an earlier binding.
    pub fn push(&mut self, column: &'static str, value: impl Into<Value>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.entries.push((column, value));
        }
    }

    /// Value bound to `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, v)| v)
    }

    /// Remove and return the value bound to `column`.
    pub fn take(&mut self, column: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(name, _)| *name == column)?;
        Some(self.entries.remove(pos).1)
    }

    /// Number of bound columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(column, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(name, v)| (*name, v))
    }

    /// Flatten into declared-column order.
    ///
    /// Every declared column must be bound exactly once and nothing else may
    /// be bound; the implicit `id`/`rev` columns are not part of the result.
    pub fn into_declared(mut self, schema: &TableSchema) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(schema.fields.len());
        for field in schema.fields {
            let value = self.take(field.name).ok_or_else(|| {
                Error::precondition(format!("{}.{} is not bound", schema.table, field.name))
            })?;
            values.push(value);
        }
        if let Some((extra, _)) = self.entries.first() {
            return Err(Error::precondition(format!(
                "{} has no column {extra}",
                schema.table
            )));
        }
        Ok(values)
    }
}

impl FromIterator<(&'static str, Value)> for ValueSet {
    fn from_iter<I: IntoIterator<Item = (&'static str, Value)>>(iter: I) -> Self {
        let mut set = ValueSet::new();
        for (name, value) in iter {
            set.push(name, value);
        }
        set
    }
}

/// A full result row viewed through its table schema.
#[derive(Debug, Clone, Copy)]
pub struct NamedRow<'a> {
    schema: &'a TableSchema,
    values: &'a [Value],
}

impl<'a> NamedRow<'a> {
    /// Wrap a row, checking it has one value per schema column.
    pub fn new(schema: &'a TableSchema, row: &'a Row) -> Result<Self> {
        if row.len() != schema.column_count() {
            return Err(Error::decode(
                schema.table,
                format!(
                    "expected {} columns, got {}",
                    schema.column_count(),
                    row.len()
                ),
            ));
        }
        Ok(Self {
            schema,
            values: row.values(),
        })
    }

    /// The schema this row is read through.
    #[must_use]
    pub fn schema(&self) -> &'a TableSchema {
        self.schema
    }

    fn decode_err(&self, column: &str, err: &Error) -> Error {
        Error::decode(self.schema.table, format!("column {column}: {err}"))
    }

    /// Raw value of a column.
    pub fn value(&self, column: &str) -> Result<&'a Value> {
        let pos = self.schema.column_position(column).ok_or_else(|| {
            Error::decode(self.schema.table, format!("unknown column {column}"))
        })?;
        Ok(&self.values[pos])
    }

    /// Primary key of the row.
    pub fn id(&self) -> Result<Key> {
        let value = self.value(self.schema.primary_key)?;
        value
            .as_primary_key()
            .cloned()
            .map_err(|e| self.decode_err(self.schema.primary_key, &e))
    }

    /// Revision of the row.
    pub fn revision(&self) -> Result<Key> {
        let value = self.value(self.schema.revision)?;
        value
            .as_revision()
            .cloned()
            .map_err(|e| self.decode_err(self.schema.revision, &e))
    }

    /// Unsigned 32-bit column.
    pub fn uint32(&self, column: &str) -> Result<u32> {
        self.value(column)?
            .to_u32()
            .map_err(|e| self.decode_err(column, &e))
    }

    /// Required text column.
    pub fn text(&self, column: &str) -> Result<String> {
        self.value(column)?
            .as_text()
            .map(str::to_string)
            .map_err(|e| self.decode_err(column, &e))
    }

    /// Nullable text column.
    pub fn optional_text(&self, column: &str) -> Result<Option<String>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            other => other
                .as_text()
                .map(|s| Some(s.to_string()))
                .map_err(|e| self.decode_err(column, &e)),
        }
    }

    /// Foreign-key column; NULL decodes to `None`.
    pub fn foreign_key(&self, column: &str) -> Result<Option<Key>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            other => other
                .as_primary_key()
                .cloned()
                .map(Some)
                .map_err(|e| self.decode_err(column, &e)),
        }
    }

    /// Enum column. Codes outside the label table fail the decode.
    pub fn enumeration<T: DbEnum>(&self, column: &str) -> Result<T> {
        T::from_value(self.value(column)?).map_err(|e| self.decode_err(column, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldInfo;
    use crate::value::ValueKind;

    crate::db_enum! {
        enum Role {
            Ksk = 1 => "KSK",
            Zsk = 2 => "ZSK",
        }
    }

    static FIELDS: &[FieldInfo] = &[
        FieldInfo::reference("policy_id", "policy"),
        FieldInfo::new("locator", ValueKind::Text),
        FieldInfo::enumeration("role", <Role as DbEnum>::MAPPING),
        FieldInfo::new("bits", ValueKind::UInt32),
    ];
    static SCHEMA: TableSchema = TableSchema::new("thing", FIELDS);

    fn sample_row() -> Row {
        Row::new(vec![
            Value::PrimaryKey(Key::Int(7)),
            Value::Revision(Key::Int(2)),
            Value::Null,
            Value::Text("abc".into()),
            Value::Int32(1),
            Value::UInt32(2048),
        ])
    }

    #[test]
    fn test_value_set_flattens_in_declared_order() {
        let mut set = ValueSet::new();
        set.push("bits", 1024u32);
        set.push("role", Value::Int32(2));
        set.push("locator", "abc");
        set.push("policy_id", Value::Null);
        set.push("bits", 2048u32);

        let values = set.into_declared(&SCHEMA).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Text("abc".into()),
                Value::Int32(2),
                Value::UInt32(2048),
            ]
        );
    }

    #[test]
    fn test_value_set_rejects_missing_and_extra() {
        let set: ValueSet = [("locator", Value::from("abc"))].into_iter().collect();
        assert!(set.into_declared(&SCHEMA).unwrap_err().is_precondition());

        let mut set = ValueSet::new();
        set.push("policy_id", Value::Null);
        set.push("locator", "abc");
        set.push("role", Value::Int32(1));
        set.push("bits", 1u32);
        set.push("colour", "red");
        assert!(set.into_declared(&SCHEMA).is_err());
    }

    #[test]
    fn test_named_row_getters() {
        let row = sample_row();
        let named = NamedRow::new(&SCHEMA, &row).unwrap();
        assert_eq!(named.id().unwrap(), Key::Int(7));
        assert_eq!(named.revision().unwrap(), Key::Int(2));
        assert_eq!(named.foreign_key("policy_id").unwrap(), None);
        assert_eq!(named.text("locator").unwrap(), "abc");
        assert_eq!(named.enumeration::<Role>("role").unwrap(), Role::Ksk);
        assert_eq!(named.uint32("bits").unwrap(), 2048);
    }

    #[test]
    fn test_named_row_decode_errors() {
        let mut row = sample_row();
        row.0[4] = Value::Int32(9);
        let named = NamedRow::new(&SCHEMA, &row).unwrap();
        assert!(named.enumeration::<Role>("role").unwrap_err().is_decode());
        assert!(named.uint32("locator").unwrap_err().is_decode());
        assert!(named.text("nope").unwrap_err().is_decode());

        let short = Row::new(vec![Value::PrimaryKey(Key::Int(1))]);
        assert!(NamedRow::new(&SCHEMA, &short).unwrap_err().is_decode());
    }
}
