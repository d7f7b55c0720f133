//! The wired-up storefront runtime.
//!
//! [`Storefront`] assembles the whole subsystem from a
//! [`StorefrontConfig`]: local store, account pool (with migrations),
//! whichever auth backend the config names, the gateway, and the two
//! user-scoped collections. Auth operations go through the facade so the
//! collections follow every identity transition immediately.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::cache::{Cart, Wishlist};
use crate::config::{AuthMode, ConfigError, StorefrontConfig};
use crate::db::{self, RepositoryError};
use crate::error::StorefrontError;
use crate::gateway::{AuthGateway, PromptLogin};
use crate::services::auth::{
    AuthBackend, DelegatedAuth, PasswordService, SelfManagedAuth, SessionStore,
};
use crate::services::identity::RestIdentityProvider;
use crate::store::{FileStore, KeyValueStore, StoreError, keys};

/// The assembled client runtime. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    gateway: Arc<AuthGateway>,
    cart: Cart,
    wishlist: Wishlist,
}

impl Storefront {
    /// Open the runtime with the file-backed local store under the
    /// configured data directory.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError` if the data directory cannot be created,
    /// the account store cannot be opened or migrated, or the persisted
    /// session cannot be resolved.
    pub async fn open(
        config: StorefrontConfig,
        on_require_login: PromptLogin,
    ) -> Result<Self, StorefrontError> {
        std::fs::create_dir_all(&config.data_dir).map_err(StoreError::Io)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.store_path()));
        Self::with_store(config, store, on_require_login).await
    }

    /// Open the runtime over a caller-supplied local store, wiring the
    /// backend named by `config.auth_mode`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError` if the account store cannot be opened or
    /// migrated, the delegated mode is selected without provider settings,
    /// or the persisted session cannot be resolved.
    pub async fn with_store(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        on_require_login: PromptLogin,
    ) -> Result<Self, StorefrontError> {
        let pool = db::create_pool(&config.database_url)
            .await
            .map_err(RepositoryError::Database)?;

        let backend: Arc<dyn AuthBackend> = match config.auth_mode {
            AuthMode::SelfManaged => {
                let passwords = PasswordService::new(&config.hashing)?;
                let sessions = SessionStore::new(store.clone(), keys::SELF_MANAGED_SESSION);
                Arc::new(SelfManagedAuth::new(
                    pool.clone(),
                    passwords,
                    sessions,
                    config.session_ttl(),
                ))
            }
            AuthMode::Delegated => {
                let provider_config = config
                    .provider
                    .clone()
                    .ok_or_else(|| ConfigError::MissingEnvVar("GIFTBOX_PROVIDER_URL".to_owned()))?;
                let provider = Arc::new(RestIdentityProvider::new(provider_config));
                let sessions = SessionStore::new(store.clone(), keys::DELEGATED_SESSION);
                Arc::new(DelegatedAuth::new(provider, pool.clone(), sessions))
            }
        };

        Self::with_backend(config, store, pool, backend, on_require_login).await
    }

    /// Fully explicit wiring over a prepared pool and backend. The seam the
    /// integration tests assemble through.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError` if migrations fail or the persisted
    /// session cannot be resolved.
    pub async fn with_backend(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        pool: SqlitePool,
        backend: Arc<dyn AuthBackend>,
        on_require_login: PromptLogin,
    ) -> Result<Self, StorefrontError> {
        db::run_migrations(&pool)
            .await
            .map_err(RepositoryError::Migration)?;

        let gateway = Arc::new(AuthGateway::initialize(backend, on_require_login).await?);
        let cart = Cart::new(gateway.clone(), store.clone());
        let wishlist = Wishlist::new(gateway.clone(), store);
        cart.sync().await?;
        wishlist.sync().await?;

        tracing::info!(auth_mode = %config.auth_mode, "storefront runtime ready");

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                pool,
                gateway,
                cart,
                wishlist,
            }),
        })
    }

    /// Sign in, then reload the account's collections.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Auth` on bad credentials; the collections
    /// are left as they were.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), StorefrontError> {
        self.inner.gateway.login(email, password).await?;
        self.sync_collections().await
    }

    /// Register a new account, sign it in, and load its (empty)
    /// collections.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Auth` if registration or the follow-up
    /// sign-in fails; a failed sign-in leaves the account created but
    /// nobody authenticated.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), StorefrontError> {
        self.inner
            .gateway
            .register(email, password, full_name)
            .await?;
        self.sync_collections().await
    }

    /// Sign out and reset the collections to empty.
    ///
    /// The collections reset even when the backend's remote half fails;
    /// that error surfaces afterwards.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError` from the backend sign-out or the
    /// collection resets.
    pub async fn logout(&self) -> Result<(), StorefrontError> {
        let result = self.inner.gateway.logout().await;
        self.sync_collections().await?;
        result.map_err(Into::into)
    }

    /// Re-resolve the persisted session (picking up expiry purges) and
    /// bring the collections along.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError` if the session or a collection record
    /// cannot be read.
    pub async fn refresh_identity(&self) -> Result<(), StorefrontError> {
        self.inner.gateway.refresh().await?;
        self.sync_collections().await
    }

    async fn sync_collections(&self) -> Result<(), StorefrontError> {
        self.inner.cart.sync().await?;
        self.inner.wishlist.sync().await?;
        Ok(())
    }

    /// The auth gateway (identity reads, profile update, `require_auth`).
    #[must_use]
    pub fn auth(&self) -> &AuthGateway {
        &self.inner.gateway
    }

    /// The signed-in account's cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.inner.cart
    }

    /// The signed-in account's wishlist.
    #[must_use]
    pub fn wishlist(&self) -> &Wishlist {
        &self.inner.wishlist
    }

    /// The configuration this runtime was assembled from.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The account store pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }
}

// ===== Tests =====
