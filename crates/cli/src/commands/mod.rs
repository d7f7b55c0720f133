//! CLI subcommand implementations.
//!
//! Each subcommand loads configuration, opens what it needs (the migrate
//! command a bare pool, everything else the full [`Storefront`] facade) and
//! runs to completion. Sessions and collections persist in the file store
//! under the data dir, so consecutive invocations see each other's state.

pub mod account;
pub mod cart;
pub mod migrate;
pub mod wishlist;

use std::sync::Arc;

use giftbox_storefront::Storefront;
use giftbox_storefront::config::StorefrontConfig;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the runtime over the file-backed store under the data dir.
pub async fn open(config: StorefrontConfig) -> Result<Storefront, Box<dyn std::error::Error>> {
    let storefront = Storefront::open(
        config,
        Arc::new(|| {
            tracing::warn!("this action needs a signed-in account; run `giftbox login` first");
        }),
    )
    .await?;
    Ok(storefront)
}
