//! Account subcommands: register, login, logout, whoami, profile.

use clap::Subcommand;

use giftbox_storefront::config::StorefrontConfig;
use giftbox_storefront::models::{Account, ProfileUpdate};

use super::CommandResult;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Change profile fields; omitted flags are left untouched
    Update {
        /// New display name
        #[arg(long)]
        full_name: Option<String>,

        /// New avatar URL
        #[arg(long)]
        avatar_url: Option<String>,
    },
}

pub async fn register(
    config: StorefrontConfig,
    email: &str,
    password: &str,
    full_name: &str,
) -> CommandResult {
    let storefront = super::open(config).await?;
    storefront.register(email, password, full_name).await?;

    match storefront.auth().identity() {
        Some(account) => println!("registered and signed in as {}", describe(&account)),
        None => println!("registered; sign-in did not complete, run `giftbox login`"),
    }
    Ok(())
}

pub async fn login(config: StorefrontConfig, email: &str, password: &str) -> CommandResult {
    let storefront = super::open(config).await?;
    storefront.login(email, password).await?;

    if let Some(account) = storefront.auth().identity() {
        println!("signed in as {}", describe(&account));
        println!(
            "cart: {} item(s), wishlist: {} item(s)",
            storefront.cart().total_items().await,
            storefront.wishlist().count().await
        );
    }
    Ok(())
}

pub async fn logout(config: StorefrontConfig) -> CommandResult {
    let storefront = super::open(config).await?;
    storefront.logout().await?;
    println!("signed out");
    Ok(())
}

pub async fn whoami(config: StorefrontConfig) -> CommandResult {
    let storefront = super::open(config).await?;

    match storefront.auth().identity() {
        Some(account) => {
            println!("{}", describe(&account));
            println!("points: {}  level: {}", account.points, account.level);
            println!("avatar: {}", account.avatar_url);
        }
        None => println!("not signed in"),
    }
    Ok(())
}

pub async fn profile(config: StorefrontConfig, action: ProfileAction) -> CommandResult {
    let storefront = super::open(config).await?;

    if !storefront.auth().is_authenticated() {
        println!("not signed in");
        return Ok(());
    }

    let ProfileAction::Update {
        full_name,
        avatar_url,
    } = action;
    let update = ProfileUpdate {
        full_name,
        avatar_url,
    };
    if update.is_empty() {
        println!("nothing to update");
        return Ok(());
    }

    storefront.auth().update_profile(&update).await?;
    if let Some(account) = storefront.auth().identity() {
        println!("profile updated: {}", describe(&account));
    }
    Ok(())
}

fn describe(account: &Account) -> String {
    format!("{} <{}>", account.full_name, account.email)
}
