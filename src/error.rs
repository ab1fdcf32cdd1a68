//! Error types for the boundcache library.
//!
//! The cache contract itself never fails: absence is `None` and capacity
//! overruns are resolved by eviction. Errors only show up at the edges.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned by `check_invariants` methods when the
//!   entry store, a policy structure, or the capacity limits disagree.
//! - [`ConfigError`]: Returned when configuration input cannot be parsed
//!   (e.g. an unknown policy name).
//!
//! ## Example Usage
//!
//! ```
//! use boundcache::builder::CachePolicy;
//! use boundcache::error::ConfigError;
//!
//! let policy: Result<CachePolicy, ConfigError> = "lfu".parse();
//! assert_eq!(policy, Ok(CachePolicy::Lfu));
//!
//! let bad = "mru".parse::<CachePolicy>();
//! assert!(bad.is_err());
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Returns `Err(InvariantError)` with the formatted message unless `cond` holds.
macro_rules! ensure_invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::InvariantError::new(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_invariant;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration input is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The policy name is not one of `lru` / `lfu`.
    #[error("unknown eviction policy `{0}` (expected `lru` or `lfu`)")]
    UnknownPolicy(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("bucket order broken");
        assert_eq!(err.to_string(), "bucket order broken");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    #[test]
    fn ensure_invariant_short_circuits() {
        fn check(n: usize) -> Result<(), InvariantError> {
            ensure_invariant!(n < 3, "n too large: {}", n);
            Ok(())
        }
        assert!(check(1).is_ok());
        assert_eq!(check(5).unwrap_err().message(), "n too large: 5");
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_names_the_input() {
        let err = ConfigError::UnknownPolicy("arc".into());
        assert!(err.to_string().contains("`arc`"));
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
