//! Shared unit-test fixtures.
//!
//! Compiled only under `cfg(test)`. Integration tests carry their own
//! fixtures in the `giftbox-integration-tests` crate.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use giftbox_core::{AccountId, Email, MemberLevel};

use crate::gateway::PromptLogin;
use crate::models::{Account, ProfileUpdate, Session};
use crate::services::auth::{AuthBackend, AuthError};
use crate::store::StoreError;

/// Build an account for tests.
pub(crate) fn account(email: &str, full_name: &str) -> Account {
    Account {
        id: AccountId::generate(),
        email: Email::parse(email).unwrap(),
        full_name: full_name.to_owned(),
        avatar_url: format!("https://example.com/{full_name}.png"),
        points: 0,
        level: MemberLevel::default(),
    }
}

/// Programmable in-memory auth backend.
#[derive(Default)]
pub(crate) struct StubBackend {
    /// email -> (password, account)
    accounts: Mutex<HashMap<String, (String, Account)>>,
    /// What `current_user` reports; stands in for the persisted session.
    current: Mutex<Option<Account>>,
    pub(crate) fail_sign_out: AtomicBool,
    pub(crate) sign_up_calls: AtomicUsize,
    pub(crate) sign_in_calls: AtomicUsize,
    pub(crate) update_calls: AtomicUsize,
}

impl StubBackend {
    /// Register an account without going through `sign_up`.
    pub(crate) async fn seed(&self, email: &str, password: &str, full_name: &str) -> Account {
        let account = account(email, full_name);
        self.accounts
            .lock()
            .await
            .insert(email.to_owned(), (password.to_owned(), account.clone()));
        account
    }

    /// Force what `current_user` reports.
    pub(crate) async fn set_current(&self, account: Option<Account>) {
        *self.current.lock().await = account;
    }
}

#[async_trait]
impl AuthBackend for StubBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Account, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(AuthError::DuplicateEmail);
        }
        let account = account(email, full_name);
        accounts.insert(email.to_owned(), (password.to_owned(), account.clone()));

        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);

        let accounts = self.accounts.lock().await;
        let Some((stored, account)) = accounts.get(email) else {
            return Err(AuthError::InvalidCredentials);
        };
        if stored != password {
            return Err(AuthError::InvalidCredentials);
        }
        *self.current.lock().await = Some(account.clone());

        Ok(Session {
            user: account.clone(),
            expires_at: Utc::now() + Duration::days(7),
            access_token: None,
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Mirrors the delegated backend: the local purge happens before the
        // fallible remote half.
        *self.current.lock().await = None;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Store(StoreError::Io(std::io::Error::other(
                "stub sign-out failure",
            ))));
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<Account>, AuthError> {
        Ok(self.current.lock().await.clone())
    }

    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> Result<Account, AuthError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut current = self.current.lock().await;
        let Some(account) = current.as_mut() else {
            return Err(AuthError::NotAuthenticated);
        };
        if account.id != *account_id {
            return Err(AuthError::NotAuthenticated);
        }
        account.apply(update);

        Ok(account.clone())
    }
}

/// Counts prompt-login invocations from `require_auth`.
#[derive(Clone, Default)]
pub(crate) struct PromptCounter {
    count: Arc<AtomicUsize>,
}

impl PromptCounter {
    pub(crate) fn callback(&self) -> PromptLogin {
        let count = self.count.clone();
        Arc::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
