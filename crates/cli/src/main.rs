//! Giftbox CLI - drive the storefront runtime from a shell.
//!
//! # Usage
//!
//! ```bash
//! # Apply account store migrations
//! giftbox migrate
//!
//! # Register (signs you in) and look around
//! giftbox register -e ada@example.com -p 'pw123456' -n "Ada Lovelace"
//! giftbox whoami
//!
//! # Cart and wishlist; state persists under the data dir across runs
//! giftbox cart add p1 --name "Ceramic Mug" --price 100000
//! giftbox cart show
//! giftbox wishlist toggle p2
//! giftbox logout
//! ```
//!
//! Configuration comes from the `GIFTBOX_*` environment variables (a `.env`
//! file is honored); see the storefront crate's config module.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Terminal output is this binary's interface.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

use giftbox_storefront::config::StorefrontConfig;

mod commands;

use commands::{account, cart, migrate, wishlist};

#[derive(Parser)]
#[command(name = "giftbox")]
#[command(author, version, about = "Giftbox storefront shell")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending account store migrations
    Migrate,
    /// Register a new account and sign it in
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short = 'n', long)]
        full_name: String,
    },
    /// Sign in
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Update the signed-in account's profile
    Profile {
        #[command(subcommand)]
        action: account::ProfileAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: cart::CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: wishlist::WishlistAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;

    match cli.command {
        Commands::Migrate => migrate::run(&config).await,
        Commands::Register {
            email,
            password,
            full_name,
        } => account::register(config, &email, &password, &full_name).await,
        Commands::Login { email, password } => account::login(config, &email, &password).await,
        Commands::Logout => account::logout(config).await,
        Commands::Whoami => account::whoami(config).await,
        Commands::Profile { action } => account::profile(config, action).await,
        Commands::Cart { action } => cart::run(config, action).await,
        Commands::Wishlist { action } => wishlist::run(config, action).await,
    }
}
