//! Delegated authentication backend.
//!
//! An external identity provider owns credentials and issues access tokens;
//! the local account store keeps exactly one profile row per identity, under
//! the provider-assigned id. Registration is therefore a two-step write, and
//! the failure mode between the steps is explicit: the provider identity
//! stays behind, the profile row does not.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use giftbox_core::{AccountId, Email, MemberLevel};

use super::session::SessionStore;
use super::{AuthBackend, AuthError, avatar_url_for, validate_password};
use crate::db::AccountRepository;
use crate::models::{Account, NewAccount, ProfileUpdate, Session};
use crate::services::identity::{IdentityProvider, ProviderError};

/// Authentication backend that defers credentials to an identity provider.
pub struct DelegatedAuth {
    provider: Arc<dyn IdentityProvider>,
    pool: SqlitePool,
    sessions: SessionStore,
}

impl DelegatedAuth {
    /// Create a delegated backend.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        pool: SqlitePool,
        sessions: SessionStore,
    ) -> Self {
        Self {
            provider,
            pool,
            sessions,
        }
    }

    fn accounts(&self) -> AccountRepository<'_> {
        AccountRepository::new(&self.pool)
    }
}

#[async_trait]
impl AuthBackend for DelegatedAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let identity = self
            .provider
            .create_identity(&email, password)
            .await
            .map_err(|e| match e {
                ProviderError::AlreadyRegistered => AuthError::DuplicateEmail,
                other => AuthError::Provider(other),
            })?;
        let account_id = identity.id;

        // Second step of the two-step registration. On failure the provider
        // identity stays behind as an orphan and the error says so.
        let record = self
            .accounts()
            .create(&NewAccount {
                id: identity.id,
                email: identity.email,
                password_hash: None,
                full_name: full_name.to_owned(),
                avatar_url: avatar_url_for(full_name),
                points: 0,
                level: MemberLevel::default(),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    account_id = %account_id,
                    error = %e,
                    "profile row write failed after provider sign-up"
                );
                AuthError::ProfileCreationFailed(e.to_string())
            })?;

        tracing::info!(account_id = %record.id, "account registered with provider");
        Ok(record.public())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;

        let grant = self
            .provider
            .password_grant(&email, password)
            .await
            .map_err(|e| match e {
                ProviderError::InvalidCredentials => AuthError::InvalidCredentials,
                other => AuthError::Provider(other),
            })?;

        let Some(record) = self.accounts().find_by_id(&grant.identity.id).await? else {
            // The identity authenticated but its profile row is missing: the
            // dangling half of an interrupted registration.
            return Err(AuthError::ProfileCreationFailed(format!(
                "no profile row for account {}",
                grant.identity.id
            )));
        };

        let session = Session {
            user: record.public(),
            expires_at: grant.expires_at,
            access_token: Some(grant.access_token),
        };
        self.sessions.save(&session).await?;

        tracing::info!(account_id = %session.user.id, "signed in with provider");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Local purge happens first so this device signs out even when the
        // provider is unreachable afterwards.
        let session = self.sessions.load().await?;
        self.sessions.clear().await?;

        if let Some(token) = session.and_then(|s| s.access_token) {
            match self.provider.revoke(&token).await {
                // A token the provider no longer recognizes is already signed out
                Ok(()) | Err(ProviderError::Unauthorized) => {}
                Err(e) => return Err(AuthError::Provider(e)),
            }
        }

        tracing::info!("signed out");
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<Account>, AuthError> {
        let Some(session) = self.sessions.load().await? else {
            return Ok(None);
        };

        if let Some(token) = session.access_token.as_deref() {
            match self.provider.fetch_identity(token).await {
                Ok(_) => {}
                Err(ProviderError::Unauthorized) => {
                    tracing::warn!("provider no longer honors the access token, purging session");
                    self.sessions.clear().await?;
                    return Ok(None);
                }
                Err(e) => return Err(AuthError::Provider(e)),
            }
        }

        Ok(Some(session.user))
    }

    async fn update_profile(
        &self,
        _account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> Result<Account, AuthError> {
        // The live session names the account; the caller-supplied id is not
        // trusted over it.
        let Some(session) = self.sessions.load().await? else {
            return Err(AuthError::NotAuthenticated);
        };

        let record = self
            .accounts()
            .update_profile(&session.user.id, update)
            .await?;
        let account = record.public();

        let snapshot = account.clone();
        self.sessions.update_user(move |user| *user = snapshot).await?;

        Ok(account)
    }
}

// ===== Tests =====
