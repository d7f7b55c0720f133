//! Shared fixtures for the Giftbox scenario tests.
//!
//! Everything runs in process: accounts live in `sqlite::memory:`, the
//! local store is a [`MemoryStore`], and delegated flows talk to an
//! in-memory [`FakeIdentityProvider`]. [`TestContext`] assembles one
//! [`Storefront`] per test; handing the same store and pool to a second
//! context simulates a process restart against persisted state.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)] // fixtures fail loudly by design

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use giftbox_core::{AccountId, Email, ProductId};
use giftbox_storefront::Storefront;
use giftbox_storefront::config::{AuthMode, HashingConfig, StorefrontConfig};
use giftbox_storefront::db;
use giftbox_storefront::gateway::PromptLogin;
use giftbox_storefront::models::CartProduct;
use giftbox_storefront::services::auth::{
    AuthBackend, DelegatedAuth, PasswordService, SelfManagedAuth, SessionStore,
};
use giftbox_storefront::services::identity::{
    IdentityProvider, ProviderError, ProviderIdentity, ProviderSession,
};
use giftbox_storefront::store::{KeyValueStore, MemoryStore, keys};

/// Configuration pointing at in-memory stores, with a cheap hash cost.
#[must_use]
pub fn test_config(auth_mode: AuthMode) -> StorefrontConfig {
    StorefrontConfig {
        data_dir: std::env::temp_dir().join("giftbox-integration-tests"),
        database_url: SecretString::from("sqlite::memory:"),
        auth_mode,
        session_ttl_days: 7,
        hashing: HashingConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        provider: None,
    }
}

/// A fresh single-connection `sqlite::memory:` pool.
pub async fn fresh_pool() -> SqlitePool {
    db::create_pool(&SecretString::from("sqlite::memory:"))
        .await
        .unwrap()
}

/// Catalogue data for a test product.
#[must_use]
pub fn product(id: &str, price: i64) -> CartProduct {
    CartProduct {
        id: ProductId::parse(id).unwrap(),
        name: "Ceramic Mug".to_owned(),
        price: Decimal::from(price),
        original_price: None,
        image: "https://example.com/mug.png".to_owned(),
        category: "tableware".to_owned(),
        in_stock: true,
        max_quantity: 10,
    }
}

/// Counts prompt-login invocations from `require_auth`.
#[derive(Clone, Default)]
pub struct PromptCounter {
    count: Arc<AtomicUsize>,
}

impl PromptCounter {
    #[must_use]
    pub fn callback(&self) -> PromptLogin {
        let count = self.count.clone();
        Arc::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// One assembled runtime over in-process stores.
pub struct TestContext {
    pub storefront: Storefront,
    pub store: Arc<MemoryStore>,
    pub provider: Option<Arc<FakeIdentityProvider>>,
    pub prompts: PromptCounter,
}

impl TestContext {
    /// Self-managed runtime over fresh stores.
    pub async fn self_managed() -> Self {
        Self::self_managed_with(Arc::new(MemoryStore::new()), fresh_pool().await).await
    }

    /// Self-managed runtime over a caller-supplied store and pool. Reusing
    /// both across contexts simulates a restart.
    pub async fn self_managed_with(store: Arc<MemoryStore>, pool: SqlitePool) -> Self {
        let config = test_config(AuthMode::SelfManaged);
        let prompts = PromptCounter::default();

        let passwords = PasswordService::new(&config.hashing).unwrap();
        let sessions = SessionStore::new(store.clone(), keys::SELF_MANAGED_SESSION);
        let backend: Arc<dyn AuthBackend> = Arc::new(SelfManagedAuth::new(
            pool.clone(),
            passwords,
            sessions,
            config.session_ttl(),
        ));

        let storefront =
            Storefront::with_backend(config, store.clone(), pool, backend, prompts.callback())
                .await
                .unwrap();

        Self {
            storefront,
            store,
            provider: None,
            prompts,
        }
    }

    /// Delegated runtime over a fake provider and fresh stores.
    pub async fn delegated() -> Self {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(FakeIdentityProvider::default());
        Self::delegated_with(store, fresh_pool().await, provider).await
    }

    /// Delegated runtime over caller-supplied collaborators.
    pub async fn delegated_with(
        store: Arc<MemoryStore>,
        pool: SqlitePool,
        provider: Arc<FakeIdentityProvider>,
    ) -> Self {
        let config = test_config(AuthMode::Delegated);
        let prompts = PromptCounter::default();

        let sessions = SessionStore::new(store.clone(), keys::DELEGATED_SESSION);
        let backend: Arc<dyn AuthBackend> =
            Arc::new(DelegatedAuth::new(provider.clone(), pool.clone(), sessions));

        let storefront =
            Storefront::with_backend(config, store.clone(), pool, backend, prompts.callback())
                .await
                .unwrap();

        Self {
            storefront,
            store,
            provider: Some(provider),
            prompts,
        }
    }

    /// Raw local-store record under `key`, if any.
    pub async fn raw_record(&self, key: &str) -> Option<String> {
        self.store.get(key).await.unwrap()
    }
}

/// In-memory stand-in for the delegated identity provider.
///
/// Identities and access tokens live in maps; every method behaves like the
/// REST provider's happy and rejection paths without any network.
#[derive(Default)]
pub struct FakeIdentityProvider {
    /// email -> (id, password)
    identities: Mutex<HashMap<String, (AccountId, String)>>,
    /// access token -> identity
    tokens: Mutex<HashMap<String, ProviderIdentity>>,
    token_counter: AtomicU64,
}

impl FakeIdentityProvider {
    /// Whether the provider holds an identity for `email`.
    pub async fn has_identity(&self, email: &str) -> bool {
        self.identities.lock().await.contains_key(email)
    }

    /// Number of live access tokens.
    pub async fn token_count(&self) -> usize {
        self.tokens.lock().await.len()
    }

    /// Invalidate every live token, as a provider-side revocation would.
    pub async fn drop_all_tokens(&self) {
        self.tokens.lock().await.clear();
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn create_identity(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderIdentity, ProviderError> {
        let mut identities = self.identities.lock().await;
        if identities.contains_key(email.as_str()) {
            return Err(ProviderError::AlreadyRegistered);
        }

        let id = AccountId::generate();
        identities.insert(email.as_str().to_owned(), (id, password.to_owned()));

        Ok(ProviderIdentity {
            id,
            email: email.clone(),
        })
    }

    async fn password_grant(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let identities = self.identities.lock().await;
        let Some((id, stored)) = identities.get(email.as_str()) else {
            return Err(ProviderError::InvalidCredentials);
        };
        if stored != password {
            return Err(ProviderError::InvalidCredentials);
        }

        let identity = ProviderIdentity {
            id: *id,
            email: email.clone(),
        };
        let token = format!(
            "fake-token-{}",
            self.token_counter.fetch_add(1, Ordering::SeqCst)
        );
        self.tokens
            .lock()
            .await
            .insert(token.clone(), identity.clone());

        Ok(ProviderSession {
            identity,
            access_token: token,
            expires_at: Utc::now() + Duration::hours(1),
        })
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        self.tokens
            .lock()
            .await
            .get(access_token)
            .cloned()
            .ok_or(ProviderError::Unauthorized)
    }

    async fn revoke(&self, access_token: &str) -> Result<(), ProviderError> {
        match self.tokens.lock().await.remove(access_token) {
            Some(_) => Ok(()),
            None => Err(ProviderError::Unauthorized),
        }
    }
}
