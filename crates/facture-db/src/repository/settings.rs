//! # Settings Repository
//!
//! Per-account defaults, one `user` row per account identity. The row
//! appears on the account's first invoice save; changing the default
//! currency upserts it directly.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use facture_core::types::UserSettings;

use crate::error::DbResult;
use crate::row::{format_date, UserRow};

/// Repository for user settings operations.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets the settings row for an account, if it exists yet.
    pub async fn get(&self, user_id: &str) -> DbResult<Option<UserSettings>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM user WHERE uuid = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_settings).transpose()
    }

    /// Sets the account's default currency, creating the settings row if
    /// it doesn't exist yet.
    pub async fn set_default_currency(
        &self,
        user_id: &str,
        name: Option<&str>,
        currency: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(user_id, currency, "Updating default currency");

        sqlx::query(
            "INSERT INTO user (uuid, name, currency, created_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(uuid) DO UPDATE SET currency = excluded.currency",
        )
        .bind(user_id)
        .bind(name)
        .bind(currency)
        .bind(format_date(now))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
