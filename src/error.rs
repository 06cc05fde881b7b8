//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key absent or expired, or no shard maps to the key's prefix
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Stored value is not of the type requested by a typed accessor
    #[error("Type mismatch for key {key}: expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
