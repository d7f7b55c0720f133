//! Unified error handling.
//!
//! Library modules return their own error enums; [`StorefrontError`]
//! aggregates them where the runtime is driven as one piece (the facade and
//! the CLI boundary). Nothing in this crate logs an error and swallows it:
//! every failure reaches the caller, with the single exception of session
//! expiry, which is handled as purge-and-return-`None`.

use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Top-level error type for the storefront runtime.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration loading or validation failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An authentication operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A cart or wishlist operation failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The account store failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// The local key-value store failed.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

// ===== Tests =====
