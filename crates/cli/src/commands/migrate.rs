//! `giftbox migrate` - apply the embedded account store migrations.

use giftbox_storefront::config::StorefrontConfig;
use giftbox_storefront::db;

use super::CommandResult;

/// Create the database (and data dir) if needed and apply pending
/// migrations.
pub async fn run(config: &StorefrontConfig) -> CommandResult {
    std::fs::create_dir_all(&config.data_dir)?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    tracing::info!("account store migrations applied");
    println!("migrations applied");
    Ok(())
}
