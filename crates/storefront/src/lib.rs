//! Giftbox Storefront library.
//!
//! The client-side runtime of the Giftbox storefront: credential storage,
//! password and delegated-identity authentication, locally persisted
//! sessions, and the per-user cart and wishlist that follow the signed-in
//! identity. The UI renders on top of this crate; nothing here draws
//! anything.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`store`] - Local key-value persistence (the browser-storage analogue)
//! - [`db`] - Account repository over `SQLite`
//! - [`services`] - Password hashing, identity provider client, auth backends
//! - [`gateway`] - The live authenticated identity and auth operations
//! - [`cache`] - User-scoped cart and wishlist collections
//! - [`state`] - The wired-up [`state::Storefront`] facade

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::StorefrontError;
pub use state::Storefront;
