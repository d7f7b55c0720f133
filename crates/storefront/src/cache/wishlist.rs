//! The signed-in account's wishlist.

use std::sync::Arc;

use giftbox_core::ProductId;

use super::{CacheError, UserScopedCache};
use crate::gateway::AuthGateway;
use crate::store::{KeyValueStore, keys};

/// Per-user list of saved product ids.
///
/// [`add`](Self::add) appends unconditionally; callers that want set
/// semantics go through [`toggle`](Self::toggle) or check
/// [`contains`](Self::contains) first. The persisted record is one JSON
/// array of ids under the owner's wishlist key.
pub struct Wishlist {
    inner: UserScopedCache<ProductId>,
}

impl Wishlist {
    /// Create a wishlist following the gateway's identity.
    #[must_use]
    pub fn new(gateway: Arc<AuthGateway>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: UserScopedCache::new(gateway, store, keys::wishlist),
        }
    }

    /// Reconcile with the live identity, resetting or reloading the ids.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Store` if the persisted record cannot be read.
    pub async fn sync(&self) -> Result<(), CacheError> {
        self.inner.sync().await
    }

    /// Append a product id, even when it is already present.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotAuthenticated` with nobody signed in.
    pub async fn add(&self, id: ProductId) -> Result<(), CacheError> {
        self.inner
            .mutate(move |ids| {
                ids.push(id);
                true
            })
            .await
    }

    /// Drop every occurrence of a product id. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotAuthenticated` with nobody signed in.
    pub async fn remove(&self, id: &ProductId) -> Result<(), CacheError> {
        let id = id.clone();
        self.inner
            .mutate(move |ids| {
                ids.retain(|saved| *saved != id);
                true
            })
            .await
    }

    /// Remove the id if present, add it otherwise. Returns whether the id
    /// is in the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotAuthenticated` with nobody signed in.
    pub async fn toggle(&self, id: ProductId) -> Result<bool, CacheError> {
        let mut added = false;
        self.inner
            .mutate(|ids| {
                if ids.contains(&id) {
                    ids.retain(|saved| *saved != id);
                } else {
                    ids.push(id);
                    added = true;
                }
                true
            })
            .await?;
        Ok(added)
    }

    /// Whether a product id is saved. Pure read of in-memory state.
    pub async fn contains(&self, id: &ProductId) -> bool {
        self.inner.read(|ids| ids.contains(id)).await
    }

    /// Number of saved ids. Pure read of in-memory state.
    pub async fn count(&self) -> usize {
        self.inner.read(<[ProductId]>::len).await
    }

    /// Snapshot of the saved ids.
    pub async fn ids(&self) -> Vec<ProductId> {
        self.inner.snapshot().await
    }
}

// ===== Tests =====

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::StubBackend;

    fn pid(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    async fn signed_in_wishlist() -> (Wishlist, Arc<AuthGateway>, Arc<MemoryStore>) {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let gateway = Arc::new(
            AuthGateway::initialize(backend, Arc::new(|| {}))
                .await
                .unwrap(),
        );
        gateway.login("a@b.com", "pw123456").await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let wishlist = Wishlist::new(gateway.clone(), store.clone());
        wishlist.sync().await.unwrap();

        (wishlist, gateway, store)
    }

    #[tokio::test]
    async fn test_add_without_identity_fails() {
        let backend = Arc::new(StubBackend::default());
        let gateway = Arc::new(
            AuthGateway::initialize(backend, Arc::new(|| {}))
                .await
                .unwrap(),
        );
        let wishlist = Wishlist::new(gateway, Arc::new(MemoryStore::new()));

        let result = wishlist.add(pid("p1")).await;

        assert!(matches!(result, Err(CacheError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_add_appends_unconditionally() {
        let (wishlist, _, _) = signed_in_wishlist().await;

        wishlist.add(pid("p1")).await.unwrap();
        wishlist.add(pid("p1")).await.unwrap();

        assert_eq!(wishlist.count().await, 2);
    }

    #[tokio::test]
    async fn test_remove_drops_all_occurrences() {
        let (wishlist, _, _) = signed_in_wishlist().await;

        wishlist.add(pid("p1")).await.unwrap();
        wishlist.add(pid("p1")).await.unwrap();
        wishlist.add(pid("p2")).await.unwrap();
        wishlist.remove(&pid("p1")).await.unwrap();

        assert_eq!(wishlist.ids().await, vec![pid("p2")]);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_membership() {
        let (wishlist, _, _) = signed_in_wishlist().await;
        wishlist.add(pid("p1")).await.unwrap();

        assert!(wishlist.toggle(pid("p2")).await.unwrap());
        assert!(wishlist.contains(&pid("p2")).await);

        assert!(!wishlist.toggle(pid("p2")).await.unwrap());
        assert!(!wishlist.contains(&pid("p2")).await);
        assert_eq!(wishlist.ids().await, vec![pid("p1")]);
    }

    #[tokio::test]
    async fn test_identity_switch_resets_then_restores() {
        let backend = Arc::new(StubBackend::default());
        backend.seed("u1@b.com", "pw123456", "U One").await;
        backend.seed("u2@b.com", "pw123456", "U Two").await;
        let gateway = Arc::new(
            AuthGateway::initialize(backend, Arc::new(|| {}))
                .await
                .unwrap(),
        );
        let store = Arc::new(MemoryStore::new());
        let wishlist = Wishlist::new(gateway.clone(), store.clone());

        gateway.login("u1@b.com", "pw123456").await.unwrap();
        wishlist.sync().await.unwrap();
        wishlist.add(pid("p1")).await.unwrap();

        gateway.login("u2@b.com", "pw123456").await.unwrap();
        wishlist.sync().await.unwrap();
        assert_eq!(wishlist.count().await, 0);

        gateway.login("u1@b.com", "pw123456").await.unwrap();
        wishlist.sync().await.unwrap();
        assert_eq!(wishlist.ids().await, vec![pid("p1")]);
    }

    #[tokio::test]
    async fn test_persisted_record_is_id_array() {
        let (wishlist, gateway, store) = signed_in_wishlist().await;
        let owner = gateway.identity().unwrap().id;

        wishlist.add(pid("p1")).await.unwrap();
        wishlist.add(pid("p2")).await.unwrap();

        let raw = store.get(&keys::wishlist(&owner)).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!(["p1", "p2"]));
    }
}
