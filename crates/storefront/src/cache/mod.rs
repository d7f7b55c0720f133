//! User-scoped persisted collections.
//!
//! The cart and the wishlist exist only in the context of one signed-in
//! account. Both are built on [`UserScopedCache`], which keeps the in-memory
//! collection bound to the identity published by the gateway: a transition
//! to another user or to nobody resets the collection, a transition to a
//! concrete user reloads that user's persisted record. One record per user
//! lives in the local store, serialized as a JSON array.
//!
//! Every mutation is an atomic read-modify-write: the lock is held from the
//! identity check through the store write, so two overlapping mutations
//! cannot compute against the same stale snapshot and drop one another's
//! entries.

mod cart;
mod wishlist;

pub use cart::Cart;
pub use wishlist::Wishlist;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;

use giftbox_core::AccountId;

use crate::gateway::AuthGateway;
use crate::store::{KeyValueStore, StoreError};

/// Errors from cart and wishlist operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A mutation was attempted with nobody signed in.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Reading or writing the persisted collection failed.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),
}

/// The collection plus the identity it belongs to.
struct CacheState<T> {
    owner: Option<AccountId>,
    entries: Vec<T>,
}

/// Per-user collection core shared by [`Cart`] and [`Wishlist`].
///
/// `key_for` names the persisted record for a given owner. The state lives
/// behind a single async mutex; reads clone out of it, mutations reconcile
/// with the live identity first and persist before releasing the lock.
struct UserScopedCache<T> {
    gateway: Arc<AuthGateway>,
    store: Arc<dyn KeyValueStore>,
    key_for: fn(&AccountId) -> String,
    state: Mutex<CacheState<T>>,
}

impl<T> UserScopedCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send,
{
    fn new(
        gateway: Arc<AuthGateway>,
        store: Arc<dyn KeyValueStore>,
        key_for: fn(&AccountId) -> String,
    ) -> Self {
        Self {
            gateway,
            store,
            key_for,
            state: Mutex::new(CacheState {
                owner: None,
                entries: Vec::new(),
            }),
        }
    }

    /// Bring the collection in line with the live identity.
    async fn sync(&self) -> Result<(), CacheError> {
        let mut state = self.state.lock().await;
        self.reconcile(&mut state).await
    }

    /// Reset or reload the entries when the identity moved since the last
    /// look. A no-op when the owner is unchanged.
    async fn reconcile(&self, state: &mut CacheState<T>) -> Result<(), CacheError> {
        let current = self.gateway.identity().map(|account| account.id);
        if state.owner == current {
            return Ok(());
        }

        state.entries = match &current {
            None => Vec::new(),
            Some(owner) => self.load_entries(owner).await?,
        };
        state.owner = current;
        Ok(())
    }

    /// Load one user's persisted record. Absent means empty; a record that
    /// no longer parses also starts empty and is overwritten by the next
    /// mutation.
    async fn load_entries(&self, owner: &AccountId) -> Result<Vec<T>, CacheError> {
        let key = (self.key_for)(owner);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(key, error = %e, "unreadable collection record, starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Atomic read-modify-write against the active user's collection.
    ///
    /// `f` reports whether it changed anything; a changed collection is
    /// persisted in full before the lock is released. Fails
    /// `NotAuthenticated` when nobody is signed in.
    async fn mutate(&self, f: impl FnOnce(&mut Vec<T>) -> bool + Send) -> Result<(), CacheError> {
        let mut state = self.state.lock().await;
        self.reconcile(&mut state).await?;
        let Some(owner) = state.owner else {
            return Err(CacheError::NotAuthenticated);
        };

        if f(&mut state.entries) {
            let payload = serde_json::to_string(&state.entries).map_err(StoreError::from)?;
            self.store.put(&(self.key_for)(&owner), payload).await?;
        }
        Ok(())
    }

    /// Empty the collection and delete the persisted record outright.
    async fn clear(&self) -> Result<(), CacheError> {
        let mut state = self.state.lock().await;
        self.reconcile(&mut state).await?;
        let Some(owner) = state.owner else {
            return Err(CacheError::NotAuthenticated);
        };

        state.entries.clear();
        self.store.remove(&(self.key_for)(&owner)).await?;
        Ok(())
    }

    /// Clone of the in-memory entries. No store access, no reconciliation.
    async fn snapshot(&self) -> Vec<T> {
        self.state.lock().await.entries.clone()
    }

    /// Compute over the in-memory entries without cloning them.
    async fn read<R>(&self, f: impl FnOnce(&[T]) -> R + Send) -> R {
        let state = self.state.lock().await;
        f(&state.entries)
    }
}
