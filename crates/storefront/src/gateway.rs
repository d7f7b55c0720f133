//! Authentication gateway.
//!
//! Single front door for auth state: wraps whichever backend is configured,
//! resolves the persisted session once at startup, and publishes the live
//! identity over a watch channel so the rest of the process can read it
//! synchronously and react to transitions.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{Account, ProfileUpdate};
use crate::services::auth::{AuthBackend, AuthError};

/// Callback invoked when a protected action runs without a signed-in
/// account. Typically opens a login prompt.
pub type PromptLogin = Arc<dyn Fn() + Send + Sync>;

/// Facade over the configured [`AuthBackend`].
pub struct AuthGateway {
    backend: Arc<dyn AuthBackend>,
    identity_tx: watch::Sender<Option<Account>>,
    on_require_login: PromptLogin,
}

impl AuthGateway {
    /// Resolve the persisted session once and start publishing identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the persisted session cannot be resolved.
    pub async fn initialize(
        backend: Arc<dyn AuthBackend>,
        on_require_login: PromptLogin,
    ) -> Result<Self, AuthError> {
        let initial = backend.current_user().await?;
        if let Some(account) = &initial {
            tracing::info!(account_id = %account.id, "restored persisted session");
        }
        let (identity_tx, _) = watch::channel(initial);

        Ok(Self {
            backend,
            identity_tx,
            on_require_login,
        })
    }

    /// The live identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Account> {
        self.identity_tx.borrow().clone()
    }

    /// Whether an account is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity_tx.borrow().is_some()
    }

    /// Subscribe to identity transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Account>> {
        self.identity_tx.subscribe()
    }

    /// Sign in and publish the new identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the pair is wrong. The
    /// published identity is left untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let session = self.backend.sign_in(email, password).await?;
        self.identity_tx.send_replace(Some(session.user));
        Ok(())
    }

    /// Register a new account and immediately sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateEmail` if the email is taken; errors
    /// from the sign-in half surface unchanged.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), AuthError> {
        self.backend.sign_up(email, password, full_name).await?;
        self.login(email, password).await
    }

    /// Sign out.
    ///
    /// The published identity clears even when the backend's remote half
    /// fails: by then the local session purge has already happened.
    ///
    /// # Errors
    ///
    /// Returns the backend error, after clearing the identity.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let result = self.backend.sign_out().await;
        self.identity_tx.send_replace(None);
        result
    }

    /// Apply a partial profile update and publish the updated account.
    ///
    /// A no-op `Ok` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the backend rejects the update.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), AuthError> {
        let Some(current) = self.identity() else {
            return Ok(());
        };

        let account = self.backend.update_profile(&current.id, update).await?;
        self.identity_tx.send_replace(Some(account));
        Ok(())
    }

    /// Re-resolve the persisted session and publish the result.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the persisted session cannot be resolved.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let user = self.backend.current_user().await?;
        self.identity_tx.send_replace(user);
        Ok(())
    }

    /// Run `action` if an account is signed in.
    ///
    /// Otherwise the prompt-login callback fires and `None` comes back; the
    /// action is dropped, not queued for after sign-in.
    pub fn require_auth<R>(&self, action: impl FnOnce() -> R) -> Option<R> {
        if self.is_authenticated() {
            Some(action())
        } else {
            (self.on_require_login)();
            None
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{PromptCounter, StubBackend, account};

    async fn gateway_over(backend: Arc<StubBackend>) -> AuthGateway {
        AuthGateway::initialize(backend, Arc::new(|| {}))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_restores_persisted_identity() {
        let backend = Arc::new(StubBackend::default());
        let persisted = account("a@b.com", "A B");
        backend.set_current(Some(persisted.clone())).await;

        let gateway = gateway_over(backend).await;

        assert!(gateway.is_authenticated());
        assert_eq!(gateway.identity(), Some(persisted));
    }

    #[tokio::test]
    async fn test_login_publishes_identity() {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let gateway = gateway_over(backend).await;

        assert!(!gateway.is_authenticated());
        gateway.login("a@b.com", "pw123456").await.unwrap();
        assert!(gateway.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_leaves_identity_untouched() {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let gateway = gateway_over(backend).await;

        let result = gateway.login("a@b.com", "wrong-password").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(!gateway.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_signs_in_automatically() {
        let backend = Arc::new(StubBackend::default());
        let gateway = gateway_over(backend.clone()).await;

        gateway
            .register("a@b.com", "pw123456", "A B")
            .await
            .unwrap();

        assert!(gateway.is_authenticated());
        assert_eq!(backend.sign_up_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.sign_in_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_identity_even_when_backend_fails() {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let gateway = gateway_over(backend.clone()).await;
        gateway.login("a@b.com", "pw123456").await.unwrap();

        backend.fail_sign_out.store(true, Ordering::SeqCst);
        let result = gateway.logout().await;

        assert!(result.is_err());
        assert!(!gateway.is_authenticated());
    }

    #[tokio::test]
    async fn test_update_profile_without_identity_is_noop() {
        let backend = Arc::new(StubBackend::default());
        let gateway = gateway_over(backend.clone()).await;

        gateway
            .update_profile(&ProfileUpdate {
                full_name: Some("X".to_owned()),
                avatar_url: None,
            })
            .await
            .unwrap();

        assert_eq!(backend.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_profile_merges_into_identity() {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let gateway = gateway_over(backend).await;
        gateway.login("a@b.com", "pw123456").await.unwrap();

        gateway
            .update_profile(&ProfileUpdate {
                full_name: Some("B C".to_owned()),
                avatar_url: None,
            })
            .await
            .unwrap();

        let identity = gateway.identity().unwrap();
        assert_eq!(identity.full_name, "B C");
        assert_eq!(identity.email.as_str(), "a@b.com");
    }

    #[tokio::test]
    async fn test_require_auth_runs_action_when_signed_in() {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let prompts = PromptCounter::default();
        let gateway = AuthGateway::initialize(backend, prompts.callback())
            .await
            .unwrap();
        gateway.login("a@b.com", "pw123456").await.unwrap();

        let result = gateway.require_auth(|| 42);

        assert_eq!(result, Some(42));
        assert_eq!(prompts.count(), 0);
    }

    #[tokio::test]
    async fn test_require_auth_prompts_and_drops_action_when_signed_out() {
        let backend = Arc::new(StubBackend::default());
        let prompts = PromptCounter::default();
        let gateway = AuthGateway::initialize(backend, prompts.callback())
            .await
            .unwrap();

        let mut ran = false;
        let result = gateway.require_auth(|| {
            ran = true;
        });

        assert!(result.is_none());
        assert!(!ran);
        assert_eq!(prompts.count(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_sees_transitions() {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let gateway = gateway_over(backend).await;
        let mut rx = gateway.subscribe();

        gateway.login("a@b.com", "pw123456").await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());

        gateway.logout().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn test_refresh_follows_backend_state() {
        let backend = Arc::new(StubBackend::default());
        let gateway = gateway_over(backend.clone()).await;

        backend.set_current(Some(account("a@b.com", "A B"))).await;
        gateway.refresh().await.unwrap();
        assert!(gateway.is_authenticated());

        backend.set_current(None).await;
        gateway.refresh().await.unwrap();
        assert!(!gateway.is_authenticated());
    }
}
