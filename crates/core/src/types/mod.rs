//! Core types for Giftbox.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod level;

pub use email::{Email, EmailError};
pub use id::{AccountId, AccountIdError, ProductId, ProductIdError};
pub use level::{MemberLevel, MemberLevelError};
