//! Local key-value persistence.
//!
//! The browser-storage analogue everything client-local persists through:
//! sessions, carts, and wishlists are JSON strings stored under well-known
//! keys. [`FileStore`] backs real runs with a single JSON file under the
//! data dir; [`MemoryStore`] backs tests and ephemeral runs.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from local persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading or writing the store.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file or a record in it is not valid JSON.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String-to-string persistence with localStorage semantics.
///
/// Values are opaque strings; callers serialize. `remove` of an absent key
/// is a no-op, not an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete the value stored under `key`, if any.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Well-known persistence keys.
///
/// All client-local records live under these; nothing else writes to the
/// store. Session keys are fixed (at most one persisted session per auth
/// mode), collection keys are namespaced by account ID.
pub mod keys {
    use giftbox_core::AccountId;

    /// Session minted by the self-managed backend.
    pub const SELF_MANAGED_SESSION: &str = "giftbox.session.self_managed";

    /// Session issued by the delegated identity provider.
    pub const DELEGATED_SESSION: &str = "giftbox.session.delegated";

    /// Cart record for one account.
    #[must_use]
    pub fn cart(account: &AccountId) -> String {
        format!("giftbox.cart.{account}")
    }

    /// Wishlist record for one account.
    #[must_use]
    pub fn wishlist(account: &AccountId) -> String {
        format!("giftbox.wishlist.{account}")
    }
}
