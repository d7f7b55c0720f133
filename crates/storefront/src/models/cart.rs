//! Cart entry types.

use giftbox_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalogue data handed over when a product is added to the cart.
///
/// The cart stores a copy of these fields per entry. Once an entry exists,
/// its product fields are frozen; repeat adds only bump the quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    /// Pre-discount price, when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub image: String,
    pub category: String,
    pub in_stock: bool,
    /// Advisory per-order limit. Recorded but not enforced by the cart.
    pub max_quantity: u32,
}

/// One cart line: a product snapshot plus the chosen quantity.
///
/// Serializes flat, so the persisted record is a single JSON object per line
/// rather than a nested product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartItem {
    /// The line total for this entry.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

// ===== Tests =====

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_product(id: &str, price: u32) -> CartProduct {
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

    #[test]
    fn test_line_total() {
        let item = CartItem {
            product: sample_product("p1", 100_000),
            quantity: 2,
        };

        assert_eq!(item.line_total(), Decimal::from(200_000));
    }

    #[test]
    fn test_cart_item_serializes_flat() {
        let item = CartItem {
            product: sample_product("p1", 2500),
            quantity: 3,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], serde_json::json!("p1"));
        assert_eq!(json["quantity"], serde_json::json!(3));
        assert!(json.get("product").is_none());
        assert!(json.get("original_price").is_none());
    }

    #[test]
    fn test_cart_item_round_trip() {
        let mut product = sample_product("p2", 1800);
        product.original_price = Some(Decimal::from(2400));
        let item = CartItem {
            product,
            quantity: 1,
        };

        let json = serde_json::to_string(&item).unwrap();
        let back: CartItem = serde_json::from_str(&json).unwrap();

        assert_eq!(item, back);
    }
}
