//! Domain models for the storefront.
//!
//! Validated domain objects, kept separate from database row structs and
//! provider wire DTOs. Everything here is plain data; persistence lives in
//! [`crate::db`] and [`crate::store`].

pub mod account;
pub mod cart;
pub mod session;

pub use account::{Account, AccountRecord, NewAccount, ProfileUpdate};
pub use cart::{CartItem, CartProduct};
pub use session::Session;
