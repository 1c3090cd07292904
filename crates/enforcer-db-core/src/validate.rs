//! Pattern validation for text columns.
//!
//! Column descriptors may carry a regex (see [`FieldInfo::pattern`]); text
//! values are checked against it before they reach the backend. Compiled
//! expressions are cached process-wide, keyed by pattern source.
//!
//! [`FieldInfo::pattern`]: crate::field::FieldInfo::pattern

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use regex::Regex;

use crate::error::{Error, Result};

/// Schema patterns compiled on first use.
struct PatternCache {
    compiled: RwLock<HashMap<&'static str, Regex>>,
}

impl PatternCache {
    fn new() -> Self {
        Self {
            compiled: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &'static str) -> std::result::Result<Regex, regex::Error> {
        if let Some(regex) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return Ok(regex.clone());
        }

        let regex = Regex::new(pattern)?;
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern, regex.clone());
        Ok(regex)
    }
}

fn pattern_cache() -> &'static PatternCache {
    static CACHE: OnceLock<PatternCache> = OnceLock::new();
    CACHE.get_or_init(PatternCache::new)
}

/// Check a text value against a schema pattern.
///
/// An invalid pattern is a schema bug; it is logged and treated as a
/// non-match so the write is refused rather than let through unchecked.
pub fn matches_pattern(value: &str, pattern: &'static str) -> bool {
    match pattern_cache().get_or_compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "invalid column pattern, rejecting value"
            );
            false
        }
    }
}

/// Compile a schema pattern ahead of use.
///
/// Backends call this when a table is registered, so a broken pattern fails
/// registration instead of silently refusing every later write.
pub fn validate_pattern(pattern: &'static str) -> Result<()> {
    pattern_cache()
        .get_or_compile(pattern)
        .map(drop)
        .map_err(|e| Error::precondition(format!("invalid column pattern {pattern:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_WHITESPACE: &str = r"^\S+$";

    #[test]
    fn test_policy_name_pattern() {
        assert!(matches_pattern("default", NO_WHITESPACE));
        assert!(matches_pattern("lab-2048.rsa", NO_WHITESPACE));
        assert!(!matches_pattern("two words", NO_WHITESPACE));
        assert!(!matches_pattern("", NO_WHITESPACE));
    }

    #[test]
    fn test_hex_locator_pattern() {
        let hex = r"^[0-9a-f]{32}$";
        assert!(matches_pattern("0123456789abcdef0123456789abcdef", hex));
        assert!(!matches_pattern("0123456789ABCDEF0123456789ABCDEF", hex));
        assert!(!matches_pattern("locator 1", hex));
    }

    #[test]
    fn test_invalid_pattern_rejects() {
        assert!(!matches_pattern("anything", r"[unclosed"));
    }

    #[test]
    fn test_validate_pattern() {
        validate_pattern(NO_WHITESPACE).unwrap();
        let err = validate_pattern(r"[unclosed").unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("invalid column pattern"));
    }

    #[test]
    fn test_cached_pattern_reused() {
        assert!(matches_pattern("a1", r"^[a-z]\d$"));
        assert!(matches_pattern("b2", r"^[a-z]\d$"));
        assert!(!matches_pattern("22", r"^[a-z]\d$"));
    }
}
