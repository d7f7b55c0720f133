//! External identity provider client.
//!
//! In delegated auth mode the provider owns credentials and token issuance;
//! this crate only keeps a profile row per identity. The [`IdentityProvider`]
//! trait is the seam: production wires the REST client, tests substitute an
//! in-process fake.

mod rest;

pub use rest::RestIdentityProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use giftbox_core::{AccountId, Email};

/// Errors from identity provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The email is already registered with the provider.
    #[error("email is already registered with the identity provider")]
    AlreadyRegistered,

    /// The provider rejected the email/password combination.
    #[error("the identity provider rejected the credentials")]
    InvalidCredentials,

    /// The access token is expired or revoked.
    #[error("the access token is no longer valid")]
    Unauthorized,

    /// The provider could not be reached.
    #[error("identity provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with something this client cannot interpret.
    #[error("unexpected identity provider response: {0}")]
    Protocol(String),
}

/// An identity as known to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    /// Provider-assigned account ID. Shared with the local profile row.
    pub id: AccountId,
    pub email: Email,
}

/// A provider-issued session: who, the bearer token, and when it lapses.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub identity: ProviderIdentity,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Operations the delegated auth backend needs from an identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new identity with the provider.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::AlreadyRegistered` if the email is taken.
    async fn create_identity(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderIdentity, ProviderError>;

    /// Exchange email and password for an access token.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidCredentials` if the provider rejects
    /// the combination.
    async fn password_grant(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderSession, ProviderError>;

    /// Resolve the identity behind an access token.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unauthorized` if the token is no longer valid.
    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError>;

    /// Invalidate an access token on the provider side.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unauthorized` if the token was already invalid.
    async fn revoke(&self, access_token: &str) -> Result<(), ProviderError>;
}
