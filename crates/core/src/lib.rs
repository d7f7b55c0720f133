//! Giftbox Core - Shared domain types.
//!
//! This crate provides the validated primitives used across all Giftbox
//! components:
//! - `storefront` - The client runtime (auth, sessions, per-user state)
//! - `cli` - Command-line shell for driving the storefront runtime
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and member tiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
