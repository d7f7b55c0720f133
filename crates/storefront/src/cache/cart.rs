//! The signed-in account's cart.

use std::sync::Arc;

use rust_decimal::Decimal;

use giftbox_core::ProductId;

use super::{CacheError, UserScopedCache};
use crate::gateway::AuthGateway;
use crate::models::{CartItem, CartProduct};
use crate::store::{KeyValueStore, keys};

/// Per-user cart of quantity-bearing product lines.
///
/// Lines are keyed by product id. The persisted record is one JSON array
/// under the owner's cart key; it is rewritten in full on every change and
/// deleted by [`clear`](Self::clear).
pub struct Cart {
    inner: UserScopedCache<CartItem>,
}

impl Cart {
    /// Create a cart following the gateway's identity.
    #[must_use]
    pub fn new(gateway: Arc<AuthGateway>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: UserScopedCache::new(gateway, store, keys::cart),
        }
    }

    /// Reconcile with the live identity, resetting or reloading the lines.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Store` if the persisted record cannot be read.
    pub async fn sync(&self) -> Result<(), CacheError> {
        self.inner.sync().await
    }

    /// Add `quantity` of a product.
    ///
    /// A product already in the cart has its quantity bumped in place; every
    /// other stored field keeps the value from when the line was first
    /// added, not this call's. A new product is appended as its own line.
    /// `max_quantity` is recorded but not enforced.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotAuthenticated` with nobody signed in.
    pub async fn add(&self, product: CartProduct, quantity: u32) -> Result<(), CacheError> {
        self.inner
            .mutate(move |items| {
                if let Some(item) = items.iter_mut().find(|item| item.product.id == product.id) {
                    item.quantity += quantity;
                } else {
                    items.push(CartItem { product, quantity });
                }
                true
            })
            .await
    }

    /// Drop a product's line. Idempotent; the record is rewritten either
    /// way.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotAuthenticated` with nobody signed in.
    pub async fn remove(&self, id: &ProductId) -> Result<(), CacheError> {
        let id = id.clone();
        self.inner
            .mutate(move |items| {
                items.retain(|item| item.product.id != id);
                true
            })
            .await
    }

    /// Set a product's quantity outright.
    ///
    /// A quantity of zero or less removes the line, exactly like
    /// [`remove`](Self::remove). An id not in the cart is left alone and the
    /// persisted record is not rewritten.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotAuthenticated` with nobody signed in.
    pub async fn update_quantity(&self, id: &ProductId, quantity: i64) -> Result<(), CacheError> {
        if quantity <= 0 {
            return self.remove(id).await;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let id = id.clone();
        self.inner
            .mutate(
                move |items| match items.iter_mut().find(|item| item.product.id == id) {
                    Some(item) => {
                        item.quantity = quantity;
                        true
                    }
                    None => false,
                },
            )
            .await
    }

    /// Empty the cart and delete its persisted record.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NotAuthenticated` with nobody signed in.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.inner.clear().await
    }

    /// Sum of line quantities. Pure read of in-memory state.
    pub async fn total_items(&self) -> u64 {
        self.inner
            .read(|items| items.iter().map(|item| u64::from(item.quantity)).sum())
            .await
    }

    /// Sum of price times quantity over all lines. Pure read of in-memory
    /// state.
    pub async fn total_price(&self) -> Decimal {
        self.inner
            .read(|items| items.iter().map(CartItem::line_total).sum())
            .await
    }

    /// Snapshot of the current lines.
    pub async fn items(&self) -> Vec<CartItem> {
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

    fn product(id: &str, price: i64) -> CartProduct {
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

    async fn signed_in_cart() -> (Cart, Arc<AuthGateway>, Arc<MemoryStore>) {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let gateway = Arc::new(
            AuthGateway::initialize(backend, Arc::new(|| {}))
                .await
                .unwrap(),
        );
        gateway.login("a@b.com", "pw123456").await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let cart = Cart::new(gateway.clone(), store.clone());
        cart.sync().await.unwrap();

        (cart, gateway, store)
    }

    #[tokio::test]
    async fn test_add_without_identity_fails() {
        let backend = Arc::new(StubBackend::default());
        let gateway = Arc::new(
            AuthGateway::initialize(backend, Arc::new(|| {}))
                .await
                .unwrap(),
        );
        let cart = Cart::new(gateway, Arc::new(MemoryStore::new()));

        let result = cart.add(product("p1", 100), 1).await;

        assert!(matches!(result, Err(CacheError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_repeat_add_merges_quantity_keeping_first_fields() {
        let (cart, _, _) = signed_in_cart().await;

        cart.add(product("p1", 100_000), 2).await.unwrap();
        let mut changed = product("p1", 999);
        changed.name = "Renamed Mug".to_owned();
        cart.add(changed, 3).await.unwrap();

        let items = cart.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[0].product.price, Decimal::from(100_000));
        assert_eq!(items[0].product.name, "Ceramic Mug");
    }

    #[tokio::test]
    async fn test_totals() {
        let (cart, _, _) = signed_in_cart().await;

        cart.add(product("p1", 100_000), 2).await.unwrap();
        cart.add(product("p2", 50_000), 1).await.unwrap();

        assert_eq!(cart.total_items().await, 3);
        assert_eq!(cart.total_price().await, Decimal::from(250_000));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (cart, _, _) = signed_in_cart().await;
        let id = ProductId::parse("p1").unwrap();

        cart.add(product("p1", 100), 1).await.unwrap();
        cart.remove(&id).await.unwrap();
        cart.remove(&id).await.unwrap();

        assert!(cart.items().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_sets_absolute_value() {
        let (cart, _, _) = signed_in_cart().await;
        let id = ProductId::parse("p1").unwrap();

        cart.add(product("p1", 100), 2).await.unwrap();
        cart.update_quantity(&id, 7).await.unwrap();

        assert_eq!(cart.total_items().await, 7);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_or_negative_removes() {
        let (cart, _, _) = signed_in_cart().await;
        let id = ProductId::parse("p1").unwrap();

        cart.add(product("p1", 100), 2).await.unwrap();
        cart.update_quantity(&id, 0).await.unwrap();
        assert!(cart.items().await.is_empty());

        cart.add(product("p1", 100), 2).await.unwrap();
        cart.update_quantity(&id, -1).await.unwrap();
        assert!(cart.items().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_absent_id_writes_nothing() {
        let (cart, gateway, store) = signed_in_cart().await;
        let owner = gateway.identity().unwrap().id;

        cart.update_quantity(&ProductId::parse("ghost").unwrap(), 3)
            .await
            .unwrap();

        assert!(cart.items().await.is_empty());
        assert!(store.get(&keys::cart(&owner)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_persisted_record() {
        let (cart, gateway, store) = signed_in_cart().await;
        let owner = gateway.identity().unwrap().id;

        cart.add(product("p1", 100), 2).await.unwrap();
        assert!(store.get(&keys::cart(&owner)).await.unwrap().is_some());

        cart.clear().await.unwrap();

        assert_eq!(cart.total_items().await, 0);
        assert!(store.get(&keys::cart(&owner)).await.unwrap().is_none());
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
        let cart = Cart::new(gateway.clone(), store.clone());

        gateway.login("u1@b.com", "pw123456").await.unwrap();
        cart.sync().await.unwrap();
        cart.add(product("p1", 100_000), 2).await.unwrap();

        gateway.login("u2@b.com", "pw123456").await.unwrap();
        cart.sync().await.unwrap();
        assert!(cart.items().await.is_empty());

        gateway.login("u1@b.com", "pw123456").await.unwrap();
        cart.sync().await.unwrap();
        let items = cart.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_logout_empties_in_memory_but_keeps_record() {
        let (cart, gateway, store) = signed_in_cart().await;
        let owner = gateway.identity().unwrap().id;

        cart.add(product("p1", 100), 1).await.unwrap();
        gateway.logout().await.unwrap();
        cart.sync().await.unwrap();

        assert!(cart.items().await.is_empty());
        assert!(store.get(&keys::cart(&owner)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreadable_record_starts_empty() {
        let backend = Arc::new(StubBackend::default());
        backend.seed("a@b.com", "pw123456", "A B").await;
        let gateway = Arc::new(
            AuthGateway::initialize(backend, Arc::new(|| {}))
                .await
                .unwrap(),
        );
        gateway.login("a@b.com", "pw123456").await.unwrap();
        let owner = gateway.identity().unwrap().id;

        let store = Arc::new(MemoryStore::new());
        store
            .put(&keys::cart(&owner), "{not json".to_owned())
            .await
            .unwrap();

        let cart = Cart::new(gateway, store);
        cart.sync().await.unwrap();

        assert!(cart.items().await.is_empty());
    }
}
