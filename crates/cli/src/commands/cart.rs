//! `giftbox cart` subcommands.

use clap::Subcommand;
use rust_decimal::Decimal;

use giftbox_core::ProductId;
use giftbox_storefront::config::StorefrontConfig;
use giftbox_storefront::models::CartProduct;

use super::CommandResult;

#[derive(Subcommand)]
pub enum CartAction {
    /// Add a product (fields straight from the catalogue listing)
    Add {
        /// Product id
        id: String,

        /// Product name
        #[arg(long)]
        name: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Pre-discount price, when on sale
        #[arg(long)]
        original_price: Option<Decimal>,

        /// Product image URL
        #[arg(long, default_value = "")]
        image: String,

        /// Category label
        #[arg(long, default_value = "")]
        category: String,

        /// Advisory per-order limit (recorded, not enforced)
        #[arg(long, default_value_t = 10)]
        max_quantity: u32,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove {
        /// Product id
        id: String,
    },
    /// Set a product's quantity outright; zero removes the line
    SetQty {
        /// Product id
        id: String,

        /// New quantity
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// List lines and totals
    Show,
}

pub async fn run(config: StorefrontConfig, action: CartAction) -> CommandResult {
    let storefront = super::open(config).await?;
    let cart = storefront.cart();

    match action {
        CartAction::Add {
            id,
            name,
            price,
            original_price,
            image,
            category,
            max_quantity,
            quantity,
        } => {
            let product = CartProduct {
                id: ProductId::parse(&id)?,
                name,
                price,
                original_price,
                image,
                category,
                in_stock: true,
                max_quantity,
            };
            cart.add(product, quantity).await?;
            println!("added {quantity} x {id}");
        }
        CartAction::Remove { id } => {
            cart.remove(&ProductId::parse(&id)?).await?;
            println!("removed {id}");
        }
        CartAction::SetQty { id, quantity } => {
            cart.update_quantity(&ProductId::parse(&id)?, quantity)
                .await?;
            println!("set {id} to {quantity}");
        }
        CartAction::Clear => {
            cart.clear().await?;
            println!("cart cleared");
        }
        CartAction::Show => {
            let items = cart.items().await;
            if items.is_empty() {
                println!("cart is empty");
            } else {
                for item in &items {
                    println!(
                        "{}  {} x {}  ({})",
                        item.product.id,
                        item.quantity,
                        item.product.price,
                        item.product.name
                    );
                }
                println!(
                    "total: {} item(s), {}",
                    cart.total_items().await,
                    cart.total_price().await
                );
            }
        }
    }
    Ok(())
}
