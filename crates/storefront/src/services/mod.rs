//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Account registration, sign-in and session handling, in both
//!   self-managed and delegated flavours
//! - `identity` - Client for the external identity provider used by the
//!   delegated auth backend

pub mod auth;
pub mod identity;
