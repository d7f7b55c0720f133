//! Persisted session handling.
//!
//! One session record per auth mode, under a fixed key in the local store.
//! Saving overwrites whatever was there, which is what keeps the store at a
//! single live session per mode. Expired or unreadable records are purged on
//! read and reported as "no session", never as an error.

use std::sync::Arc;

use chrono::Utc;

use crate::models::{Account, Session};
use crate::store::{KeyValueStore, StoreError};

/// Store for the single session record of one auth mode.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
}

impl SessionStore {
    /// Create a session store writing under `key`.
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self { store, key }
    }

    /// Load the current session, purging it first if it is expired or can no
    /// longer be parsed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying store fails.
    pub async fn load(&self) -> Result<Option<Session>, StoreError> {
        let Some(raw) = self.store.get(self.key).await? else {
            return Ok(None);
        };

        let session: Session = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "purging unreadable session record");
                self.store.remove(self.key).await?;
                return Ok(None);
            }
        };

        if session.is_expired(Utc::now()) {
            tracing::info!(key = self.key, "purging expired session");
            self.store.remove(self.key).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Persist a session, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the write fails.
    pub async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let payload = serde_json::to_string(session)?;
        self.store.put(self.key, payload).await
    }

    /// Remove the session record. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying store fails.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(self.key).await
    }

    /// Rewrite the embedded account snapshot in place. A no-op when there is
    /// no live session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying store fails.
    pub async fn update_user(&self, f: impl FnOnce(&mut Account) + Send) -> Result<(), StoreError> {
        let Some(mut session) = self.load().await? else {
            return Ok(());
        };

        f(&mut session.user);
        self.save(&session).await
    }
}

// ===== Tests =====
