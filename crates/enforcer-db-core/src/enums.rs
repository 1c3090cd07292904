//! Enumerated columns.
//!
//! An enum column is persisted as an integer code and presented to callers as
//! a strongly typed Rust enum. Each enum carries exactly one label table; the
//! label is a presentation concern and is never what the backend stores.
//!
//! Enums are declared with [`db_enum!`](crate::db_enum), which adds an
//! `Invalid` variant (the default, never persisted) and implements [`DbEnum`].

use crate::error::{Error, Result};
use crate::value::{EnumValue, Value};

/// One `(label, code)` entry of an enum's label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumMapping {
    /// Presentation label.
    pub label: &'static str,
    /// Persisted code.
    pub code: i32,
}

impl EnumMapping {
    /// Create a mapping entry.
    #[must_use]
    pub const fn new(label: &'static str, code: i32) -> Self {
        Self { label, code }
    }
}

/// Look up the label of `code` in a mapping table.
#[must_use]
pub fn label_for_code(mapping: &[EnumMapping], code: i32) -> Option<&'static str> {
    mapping.iter().find(|m| m.code == code).map(|m| m.label)
}

/// Look up the code of `label` in a mapping table.
#[must_use]
pub fn code_for_label(mapping: &[EnumMapping], label: &str) -> Option<i32> {
    mapping.iter().find(|m| m.label == label).map(|m| m.code)
}

/// A Rust enum backed by an integer column.
pub trait DbEnum: Copy + Eq + Default + std::fmt::Debug + 'static {
    /// Canonical label table.
    const MAPPING: &'static [EnumMapping];

    /// Persisted code, `None` for the invalid variant.
    fn code(self) -> Option<i32>;

    /// Variant for a persisted code, `None` when the code is unknown.
    fn from_code(code: i32) -> Option<Self>;

    /// True unless this is the invalid (unset) variant.
    fn is_valid(self) -> bool {
        self.code().is_some()
    }

    /// Label of this variant, `None` for the invalid variant.
    fn text(self) -> Option<&'static str> {
        self.code().and_then(|code| label_for_code(Self::MAPPING, code))
    }

    /// Variant for a label, `None` when the label is not in the table.
    fn from_text(label: &str) -> Option<Self> {
        code_for_label(Self::MAPPING, label).and_then(Self::from_code)
    }

    /// Encode as a [`Value::Enum`]. The invalid variant cannot be encoded.
    fn to_value(self) -> Result<Value> {
        let code = self
            .code()
            .ok_or_else(|| Error::precondition(format!("{self:?} has no persisted code")))?;
        let label = label_for_code(Self::MAPPING, code)
            .ok_or_else(|| Error::precondition(format!("code {code} missing from label table")))?;
        Ok(Value::Enum(EnumValue { code, label }))
    }

    /// Decode from a stored value, rejecting codes outside the table.
    fn from_value(value: &Value) -> Result<Self> {
        let code = value.enum_code()?;
        Self::from_code(code).ok_or_else(|| {
            Error::precondition(format!(
                "code {code} is not a valid {}",
                std::any::type_name::<Self>()
            ))
        })
    }
}

/// Declare an enum column type.
///
/// ```
/// enforcer_db_core::db_enum! {
///     /// Key role.
///     pub enum Role {
///         Ksk = 1 => "KSK",
///         Zsk = 2 => "ZSK",
///     }
/// }
///
/// use enforcer_db_core::DbEnum;
/// assert_eq!(Role::default(), Role::Invalid);
/// assert_eq!(Role::from_text("ZSK"), Some(Role::Zsk));
/// assert_eq!(Role::Ksk.text(), Some("KSK"));
/// ```
#[macro_export]
macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        $vis enum $name {
            /// Unset or unrecognised; never persisted.
            #[default]
            Invalid,
            $( $(#[$vmeta])* $variant, )+
        }

        impl $crate::DbEnum for $name {
            const MAPPING: &'static [$crate::EnumMapping] = &[
                $( $crate::EnumMapping::new($label, $code), )+
            ];

            fn code(self) -> Option<i32> {
                match self {
                    Self::Invalid => None,
                    $( Self::$variant => Some($code), )+
                }
            }

            fn from_code(code: i32) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::DbEnum::text(*self).unwrap_or("<invalid>"))
            }
        }
    };
}
