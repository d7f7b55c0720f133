//! Authentication services.
//!
//! Two interchangeable backends implement [`AuthBackend`]:
//!
//! - [`SelfManagedAuth`] - credentials and Argon2id hashes live in the local
//!   account store; sessions are minted locally with a configured lifetime
//! - [`DelegatedAuth`] - an external identity provider owns credentials and
//!   tokens; the account store keeps one profile row per identity
//!
//! Both persist at most one session, under a fixed store key per mode.

mod delegated;
mod error;
pub mod password;
mod self_managed;
pub mod session;

pub use delegated::DelegatedAuth;
pub use error::AuthError;
pub use password::PasswordService;
pub use self_managed::SelfManagedAuth;
pub use session::SessionStore;

use async_trait::async_trait;

use giftbox_core::AccountId;

use crate::models::{Account, ProfileUpdate, Session};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Operations common to both authentication backends.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Register a new account.
    ///
    /// Registration does not sign the account in; callers wanting the
    /// combined flow go through the gateway.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::DuplicateEmail` if the email is already taken.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Account, AuthError>;

    /// Sign in with email and password, persisting the resulting session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password pair is
    /// wrong, without revealing which half.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// End the current session. Idempotent: signing out with no live
    /// session succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the session record cannot be removed.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The account behind the persisted session, or `None` when no session
    /// is live. Expired sessions are purged, not reported as errors.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the session record cannot be read.
    async fn current_user(&self) -> Result<Option<Account>, AuthError>;

    /// Apply a partial profile update to the signed-in account, keeping the
    /// persisted session snapshot in step.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when no session is live.
    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> Result<Account, AuthError>;
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Build the generated-avatar URL for a display name.
pub(crate) fn avatar_url_for(full_name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=49bbbd&color=fff",
        urlencoding::encode(full_name)
    )
}

// ===== Tests =====
