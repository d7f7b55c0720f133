//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::identity::ProviderError;
use crate::store::StoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] giftbox_core::EmailError),

    /// Invalid credentials. Deliberately covers both "unknown email" and
    /// "wrong password" so callers cannot tell the two apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The operation needs a signed-in account and there is none.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The provider identity exists but the local profile row could not be
    /// written. The identity is left orphaned; retrying registration fails
    /// with `DuplicateEmail` until the row is repaired.
    #[error("profile creation failed: {0}")]
    ProfileCreationFailed(String),

    /// Identity provider error.
    #[error("identity provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Local key-value store error.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
