//! `giftbox wishlist` subcommands.

use clap::Subcommand;

use giftbox_core::ProductId;
use giftbox_storefront::config::StorefrontConfig;

use super::CommandResult;

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Save a product id (appends even if already saved)
    Add {
        /// Product id
        id: String,
    },
    /// Drop a product id
    Remove {
        /// Product id
        id: String,
    },
    /// Save the id if absent, drop it if present
    Toggle {
        /// Product id
        id: String,
    },
    /// List saved ids
    Show,
}

pub async fn run(config: StorefrontConfig, action: WishlistAction) -> CommandResult {
    let storefront = super::open(config).await?;
    let wishlist = storefront.wishlist();

    match action {
        WishlistAction::Add { id } => {
            wishlist.add(ProductId::parse(&id)?).await?;
            println!("saved {id}");
        }
        WishlistAction::Remove { id } => {
            wishlist.remove(&ProductId::parse(&id)?).await?;
            println!("dropped {id}");
        }
        WishlistAction::Toggle { id } => {
            let saved = wishlist.toggle(ProductId::parse(&id)?).await?;
            println!("{}", if saved { "saved" } else { "dropped" });
        }
        WishlistAction::Show => {
            let ids = wishlist.ids().await;
            if ids.is_empty() {
                println!("wishlist is empty");
            } else {
                for id in &ids {
                    println!("{id}");
                }
                println!("{} item(s)", wishlist.count().await);
            }
        }
    }
    Ok(())
}
