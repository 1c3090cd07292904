//! Accessor generators for entity columns.
//!
//! Every entity exposes the same family of methods per column: a getter, a
//! setter and a `<column>_clause` builder, plus text and cached-parent
//! variants for enum and foreign-key columns. These macros stamp them out so
//! each entity module only lists its columns once.

/// Column name of a field, honouring an explicit `as "column"` rename.
macro_rules! column_name {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $column:literal) => {
        $column
    };
}

/// Unsigned integer columns: `x()`, `set_x(u32)`, `x_clause(list, u32)`.
macro_rules! uint_columns {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        paste::paste! {
            impl $ty {
                $(
                    #[must_use]
                    pub fn $field(&self) -> u32 {
                        self.$field
                    }

                    pub fn [<set_ $field>](&mut self, value: u32) {
                        self.$field = value;
                    }

                    pub fn [<$field _clause>](
                        clauses: &mut enforcer_db_core::ClauseList,
                        value: u32,
                    ) -> &mut enforcer_db_core::Clause {
                        clauses.equal(stringify!($field), value)
                    }
                )+
            }
        }
    };
}

/// Text columns: `x() -> Option<&str>`, `set_x(&str)`, `x_clause(list, &str)`.
///
/// Setters check the value against the column descriptor (pattern included)
/// before storing a copy.
macro_rules! text_columns {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        paste::paste! {
            impl $ty {
                $(
                    #[must_use]
                    pub fn $field(&self) -> Option<&str> {
                        self.$field.as_deref()
                    }

                    pub fn [<set_ $field>](&mut self, value: &str) -> enforcer_db_core::Result<()> {
                        let schema = <Self as enforcer_db_core::Entity>::schema();
                        if let Some(field) = schema.field(stringify!($field)) {
                            field.validate(&enforcer_db_core::Value::from(value))?;
                        }
                        self.$field = Some(value.to_owned());
                        Ok(())
                    }

                    pub fn [<$field _clause>]<'c>(
                        clauses: &'c mut enforcer_db_core::ClauseList,
                        value: &str,
                    ) -> &'c mut enforcer_db_core::Clause {
                        clauses.equal(stringify!($field), value)
                    }
                )+
            }
        }
    };
}

/// Enum columns: `x()`, `x_text()`, `set_x(T)`, `set_x_text(&str)` and
/// `x_clause(list, T)`. Setters refuse the `Invalid` variant and unknown
/// labels and leave the record untouched on error.
macro_rules! enum_columns {
    ($ty:ty { $($field:ident $(as $column:literal)? : $enum:ty),+ $(,)? }) => {
        paste::paste! {
            impl $ty {
                $(
                    #[must_use]
                    pub fn $field(&self) -> $enum {
                        self.$field
                    }

                    #[must_use]
                    pub fn [<$field _text>](&self) -> Option<&'static str> {
                        <$enum as enforcer_db_core::DbEnum>::text(self.$field)
                    }

                    pub fn [<set_ $field>](&mut self, value: $enum) -> enforcer_db_core::Result<()> {
                        if !<$enum as enforcer_db_core::DbEnum>::is_valid(value) {
                            return Err(enforcer_db_core::Error::precondition(format!(
                                "{}.{}: {:?} cannot be stored",
                                <Self as enforcer_db_core::Entity>::TABLE_NAME,
                                column_name!($field $(, $column)?),
                                value
                            )));
                        }
                        self.$field = value;
                        Ok(())
                    }

                    pub fn [<set_ $field _text>](&mut self, label: &str) -> enforcer_db_core::Result<()> {
                        let value = <$enum as enforcer_db_core::DbEnum>::from_text(label).ok_or_else(|| {
                            enforcer_db_core::Error::precondition(format!(
                                "{}.{}: unknown label '{}'",
                                <Self as enforcer_db_core::Entity>::TABLE_NAME,
                                column_name!($field $(, $column)?),
                                label
                            ))
                        })?;
                        self.$field = value;
                        Ok(())
                    }

                    pub fn [<$field _clause>](
                        clauses: &mut enforcer_db_core::ClauseList,
                        value: $enum,
                    ) -> enforcer_db_core::Result<&mut enforcer_db_core::Clause> {
                        clauses.enumeration(column_name!($field $(, $column)?), value)
                    }
                )+
            }
        }
    };
}

/// Foreign-key columns resolved to a parent entity.
///
/// `policy_id -> policy: Policy as POLICY` generates `policy_id()`,
/// `policy_id_value()`, `set_policy_id(&Value)`, `policy()` (the cached
/// parent), `policy_id_clause(list, &Value)` and the relation constant
/// `POLICY` used by `load_related` and `fetch_associated`.
macro_rules! foreign_key_columns {
    ($ty:ty { $($field:ident -> $parent_fn:ident : $parent:ty as $rel:ident),+ $(,)? }) => {
        paste::paste! {
            impl $ty {
                $(
                    pub const $rel: enforcer_db_core::Relation<Self, $parent> =
                        enforcer_db_core::Relation::new(
                            stringify!($field),
                            Self::[<$field _fk>],
                            Self::[<$field _fk_mut>],
                        );

                    #[must_use]
                    pub fn $field(&self) -> Option<&enforcer_db_core::Key> {
                        self.$field.key()
                    }

                    #[must_use]
                    pub fn [<$field _value>](&self) -> enforcer_db_core::Value {
                        self.$field.value()
                    }

                    /// Point at a parent. Fails on anything but a primary-key
                    /// value, leaving the current key in place.
                    pub fn [<set_ $field>](&mut self, value: &enforcer_db_core::Value) -> enforcer_db_core::Result<()> {
                        self.$field.set(value)
                    }

                    /// The parent, when loaded by `load_related` or
                    /// `fetch_associated`.
                    #[must_use]
                    pub fn $parent_fn(&self) -> Option<&$parent> {
                        self.$field.cached()
                    }

                    #[must_use]
                    pub fn [<$field _fk>](&self) -> &enforcer_db_core::ForeignKey<$parent> {
                        &self.$field
                    }

                    pub fn [<$field _fk_mut>](&mut self) -> &mut enforcer_db_core::ForeignKey<$parent> {
                        &mut self.$field
                    }

                    pub fn [<$field _clause>]<'c>(
                        clauses: &'c mut enforcer_db_core::ClauseList,
                        value: &enforcer_db_core::Value,
                    ) -> enforcer_db_core::Result<&'c mut enforcer_db_core::Clause> {
                        clauses.foreign_key(stringify!($field), value)
                    }
                )+
            }
        }
    };
}
