//! Account repository.
//!
//! Raw rows come out of SQLite as text and are rehydrated into validated
//! domain types; a row that fails validation is `DataCorruption`, not a
//! silent default.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use giftbox_core::{AccountId, Email, MemberLevel};

use super::RepositoryError;
use crate::models::{AccountRecord, NewAccount, ProfileUpdate};

/// Raw `accounts` row as stored. Converted to [`AccountRecord`] on the way
/// out.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    email: String,
    password_hash: Option<String>,
    full_name: String,
    avatar_url: String,
    points: i64,
    level: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for AccountRecord {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let id = AccountId::parse(&row.id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid account id in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let level = row.level.parse::<MemberLevel>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid member level in database: {e}"))
        })?;
        let points = u32::try_from(row.points).map_err(|_| {
            RepositoryError::DataCorruption(format!("points out of range in database: {}", row.points))
        })?;

        Ok(Self {
            id,
            email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            points,
            level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an account by its email address.
    ///
    /// The lookup is a byte-exact comparison: addresses differing only in
    /// case are distinct accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AccountRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, email, password_hash, full_name, avatar_url,
                   points, level, created_at, updated_at
            FROM accounts
            WHERE email = ?1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(AccountRecord::try_from).transpose()
    }

    /// Get an account by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find_by_id(
        &self,
        id: &AccountId,
    ) -> Result<Option<AccountRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, email, password_hash, full_name, avatar_url,
                   points, level, created_at, updated_at
            FROM accounts
            WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(AccountRecord::try_from).transpose()
    }

    /// Insert a new account row. Timestamps are assigned here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_account: &NewAccount) -> Result<AccountRecord, RepositoryError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, AccountRow>(
            r"
            INSERT INTO accounts (id, email, password_hash, full_name, avatar_url,
                                  points, level, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING id, email, password_hash, full_name, avatar_url,
                      points, level, created_at, updated_at
            ",
        )
        .bind(new_account.id.to_string())
        .bind(new_account.email.as_str())
        .bind(new_account.password_hash.as_deref())
        .bind(&new_account.full_name)
        .bind(&new_account.avatar_url)
        .bind(i64::from(new_account.points))
        .bind(new_account.level.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Apply a partial profile update and bump `updated_at`.
    ///
    /// Fields left `None` keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: &AccountId,
        update: &ProfileUpdate,
    ) -> Result<AccountRecord, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            UPDATE accounts
            SET full_name = COALESCE(?2, full_name),
                avatar_url = COALESCE(?3, avatar_url),
                updated_at = ?4
            WHERE id = ?1
            RETURNING id, email, password_hash, full_name, avatar_url,
                      points, level, created_at, updated_at
            ",
        )
        .bind(id.to_string())
        .bind(update.full_name.as_deref())
        .bind(update.avatar_url.as_deref())
        .bind(Utc::now())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => r.try_into(),
            None => Err(RepositoryError::NotFound),
        }
    }
}

// ===== Tests =====
