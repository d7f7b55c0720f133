//! Loyalty tier labels.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MemberLevel`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum MemberLevelError {
    /// The label does not match any known tier.
    #[error("unknown member level: {0:?}")]
    UnknownLevel(String),
}

/// Loyalty tier of an account.
///
/// Stored and displayed as a human-readable label (`"New Member"`,
/// `"Silver"`, ...). This codebase only ever assigns the default tier at
/// registration; promotions come from the loyalty subsystem, which is out of
/// scope here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MemberLevel {
    /// Every freshly registered account starts here.
    #[default]
    #[serde(rename = "New Member")]
    NewMember,
    Silver,
    Gold,
    Diamond,
}

impl MemberLevel {
    /// The stored label for this tier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewMember => "New Member",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Diamond => "Diamond",
        }
    }
}

impl fmt::Display for MemberLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemberLevel {
    type Err = MemberLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New Member" => Ok(Self::NewMember),
            "Silver" => Ok(Self::Silver),
            "Gold" => Ok(Self::Gold),
            "Diamond" => Ok(Self::Diamond),
            other => Err(MemberLevelError::UnknownLevel(other.to_owned())),
        }
    }
}
