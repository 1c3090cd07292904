//! Error types for enforcer-db.
//!
//! Every fallible operation in the workspace returns [`Result`]. The variants
//! separate failures the caller can act on (a missing row, a concurrent
//! modification) from programming errors and backend faults:
//!
//! - [`Error::Precondition`]: a required argument is missing, a value is of the
//!   wrong shape, or the record is in the wrong lifecycle state.
//! - [`Error::NotFound`]: a lookup matched zero rows.
//! - [`Error::Decode`]: a result row does not fit the table schema.
//! - [`Error::Conflict`]: an update/delete filtered by id and revision matched
//!   nothing, so somebody else modified or removed the row first.
//! - [`Error::Backend`]: the store itself failed.

use crate::value::ValueKind;

/// Result alias used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for all enforcer-db operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A caller broke an API contract.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A lookup found no matching row.
    #[error("no {table} row matches {filter}")]
    NotFound {
        /// Table that was searched.
        table: &'static str,
        /// Human readable description of the filter.
        filter: String,
    },

    /// A result row could not be mapped onto the table schema.
    #[error("cannot decode {table} row: {reason}")]
    Decode {
        /// Table the row was read from.
        table: &'static str,
        /// What did not match.
        reason: String,
    },

    /// Optimistic concurrency check failed.
    #[error("{table} row {id} was modified or removed concurrently")]
    Conflict {
        /// Table of the stale record.
        table: &'static str,
        /// Display form of the record's primary key.
        id: String,
    },

    /// The underlying store failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// A value was read through the accessor of another variant.
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        /// Kind the accessor reads.
        expected: ValueKind,
        /// Kind the value actually holds.
        found: ValueKind,
    },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::Precondition`].
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Shorthand for [`Error::Backend`].
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Shorthand for [`Error::Decode`].
    pub fn decode(table: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            table,
            reason: reason.into(),
        }
    }

    /// True for [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for [`Error::Conflict`].
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// True for [`Error::Precondition`].
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// True for [`Error::Decode`].
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound {
            table: "hsm_key",
            filter: "locator = 'abc'".to_string(),
        };
        assert_eq!(err.to_string(), "no hsm_key row matches locator = 'abc'");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_error_display_type_mismatch() {
        let err = Error::TypeMismatch {
            expected: ValueKind::Text,
            found: ValueKind::UInt32,
        };
        assert_eq!(err.to_string(), "expected a text value, found uint32");
    }

    #[test]
    fn test_error_kind_helpers() {
        assert!(Error::precondition("x").is_precondition());
        assert!(Error::decode("policy", "bad").is_decode());
        assert!(
            Error::Conflict {
                table: "policy",
                id: "1".to_string()
            }
            .is_conflict()
        );
    }
}
