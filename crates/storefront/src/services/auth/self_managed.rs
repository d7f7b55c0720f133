//! Self-managed authentication backend.
//!
//! Credentials live in the local account store: sign-up writes an Argon2id
//! hash next to the profile row, sign-in verifies against it and mints a
//! session with the configured lifetime. No network involved.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use giftbox_core::{AccountId, Email, MemberLevel};

use super::password::PasswordService;
use super::session::SessionStore;
use super::{AuthBackend, AuthError, avatar_url_for, validate_password};
use crate::db::{AccountRepository, RepositoryError};
use crate::models::{Account, NewAccount, ProfileUpdate, Session};

/// Authentication backend that owns its credentials.
pub struct SelfManagedAuth {
    pool: SqlitePool,
    passwords: PasswordService,
    sessions: SessionStore,
    session_ttl: chrono::Duration,
}

impl SelfManagedAuth {
    /// Create a self-managed backend.
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        passwords: PasswordService,
        sessions: SessionStore,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            pool,
            passwords,
            sessions,
            session_ttl,
        }
    }

    fn accounts(&self) -> AccountRepository<'_> {
        AccountRepository::new(&self.pool)
    }
}

#[async_trait]
impl AuthBackend for SelfManagedAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        // Early duplicate check; the unique index still backs this up
        if self.accounts().find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.passwords.hash(password)?;
        let record = self
            .accounts()
            .create(&NewAccount {
                id: AccountId::generate(),
                email,
                password_hash: Some(password_hash),
                full_name: full_name.to_owned(),
                avatar_url: avatar_url_for(full_name),
                points: 0,
                level: MemberLevel::default(),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(account_id = %record.id, "account registered");
        Ok(record.public())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;

        // Unknown email, missing hash and wrong password all fail identically
        let Some(record) = self.accounts().find_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let verified = record
            .password_hash
            .as_deref()
            .is_some_and(|hash| self.passwords.verify(password, hash));
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            user: record.public(),
            expires_at: Utc::now() + self.session_ttl,
            access_token: None,
        };
        self.sessions.save(&session).await?;

        tracing::info!(account_id = %session.user.id, "signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sessions.clear().await?;
        tracing::info!("signed out");
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<Account>, AuthError> {
        // Answered entirely from the persisted session; no repository read
        Ok(self.sessions.load().await?.map(|session| session.user))
    }

    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> Result<Account, AuthError> {
        if self.sessions.load().await?.is_none() {
            return Err(AuthError::NotAuthenticated);
        }

        let record = self.accounts().update_profile(account_id, update).await?;
        let account = record.public();

        let snapshot = account.clone();
        self.sessions.update_user(move |user| *user = snapshot).await?;

        Ok(account)
    }
}

// ===== Tests =====
