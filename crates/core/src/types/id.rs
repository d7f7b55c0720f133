//! Newtype IDs for type-safe entity references.
//!
//! Both ID spaces here are issued outside this codebase: account IDs are
//! UUIDs (minted locally for self-managed accounts, by the identity provider
//! for delegated ones) and product IDs are opaque catalogue strings. The
//! newtypes keep the two from being mixed up.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur when parsing an [`AccountId`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum AccountIdError {
    /// The input is not a valid UUID.
    #[error("account id must be a valid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ProductIdError {
    /// The input string is empty.
    #[error("product id cannot be empty")]
    Empty,
}

/// Unique identifier for an account.
///
/// Self-managed sign-up generates a fresh v4 UUID; delegated sign-up adopts
/// the UUID the identity provider issued. Serialized as the hyphenated
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random account ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an `AccountId` from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, AccountIdError> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for AccountId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<AccountId> for Uuid {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

/// Opaque identifier for a catalogue product.
///
/// The catalogue issues these; this codebase never inspects their shape
/// beyond rejecting the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Parse a `ProductId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the product ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
