//! Account types.

use chrono::{DateTime, Utc};
use giftbox_core::{AccountId, Email, MemberLevel};
use serde::{Deserialize, Serialize};

/// Public view of an account, as exposed to the UI layer and embedded in
/// session snapshots. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    pub full_name: String,
    pub avatar_url: String,
    pub points: u32,
    pub level: MemberLevel,
}

impl Account {
    /// Merges a partial profile update into this view. Fields left `None`
    /// keep their current value.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(full_name) = &update.full_name {
            self.full_name.clone_from(full_name);
        }
        if let Some(avatar_url) = &update.avatar_url {
            self.avatar_url.clone_from(avatar_url);
        }
    }
}

/// Full account record as stored relationally.
///
/// `password_hash` is `None` for profiles whose credentials live with an
/// external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub email: Email,
    pub password_hash: Option<String>,
    pub full_name: String,
    pub avatar_url: String,
    pub points: u32,
    pub level: MemberLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    /// The public projection of this record.
    #[must_use]
    pub fn public(&self) -> Account {
        Account {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            avatar_url: self.avatar_url.clone(),
            points: self.points,
            level: self.level,
        }
    }
}

/// Input for inserting a new account row. Timestamps are assigned by the
/// repository at insert time.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: AccountId,
    pub email: Email,
    pub password_hash: Option<String>,
    pub full_name: String,
    pub avatar_url: String,
    pub points: u32,
    pub level: MemberLevel,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// True when no field is set, i.e. applying this update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.avatar_url.is_none()
    }
}

// ===== Tests =====
