//! Session types.
//!
//! A session is a snapshot of the signed-in account plus an expiry instant,
//! persisted as a single JSON record in the local store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::Account;

/// A signed-in session.
///
/// The expiry is serialized as epoch milliseconds so the persisted record
/// stays compatible across clients. `access_token` is only present for
/// delegated sessions; self-managed sessions omit the field entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Snapshot of the account's public fields at sign-in time.
    pub user: Account,
    /// Instant after which this session is no longer valid.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    /// Provider access token, delegated sessions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Session {
    /// True when `now` is past the expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// ===== Tests =====

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use giftbox_core::{AccountId, Email, MemberLevel};

    use super::*;

    fn sample_session(expires_at: DateTime<Utc>) -> Session {
        Session {
            user: Account {
                id: AccountId::generate(),
                email: Email::parse("ada@example.com").unwrap(),
                full_name: "Ada Lovelace".to_owned(),
                avatar_url: "https://example.com/a.png".to_owned(),
                points: 0,
                level: MemberLevel::default(),
            },
            expires_at,
            access_token: None,
        }
    }

    #[test]
    fn test_is_expired_boundaries() {
        let now = Utc::now();
        let session = sample_session(now);

        assert!(!session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
        assert!(session.is_expired(now + Duration::seconds(1)));
    }

    #[test]
    fn test_expiry_serializes_as_epoch_millis() {
        let expires_at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let session = sample_session(expires_at);

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["expires_at"], serde_json::json!(1_700_000_000_000_i64));
    }

    #[test]
    fn test_access_token_omitted_when_absent() {
        let session = sample_session(Utc::now());

        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("access_token").is_none());
    }

    #[test]
    fn test_round_trip_with_access_token() {
        let mut session = sample_session(DateTime::from_timestamp_millis(1_700_000_000_000).unwrap());
        session.access_token = Some("tok-123".to_owned());

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(session, back);
    }
}
