//! # Schema Manager
//!
//! Versioned schema migrations for the Facture database.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  App Startup (every open)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Read `version` table (single row)                                     │
//! │       │                                                                 │
//! │       ├── Table missing / unreadable? Treat as version 0               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  version < CURRENT_VERSION?                                            │
//! │       │                                                                 │
//! │       ├── No  → done (no-op)                                           │
//! │       │                                                                 │
//! │       └── Yes → run every gap's statements as ONE transaction,         │
//! │                 then record the new version                            │
//! │                                                                         │
//! │  Safe to invoke on every start: idempotent by construction.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Versions
//! 1. Bump `CURRENT_VERSION`
//! 2. Add the new version's statement list to `statements_for_version`
//! 3. **NEVER** modify an existing version's statements

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Application name recorded alongside the schema version. Lets a restore
/// reject snapshots from a different application outright.
pub const APP_NAME: &str = "facture";

/// The schema version this build writes and expects.
pub const CURRENT_VERSION: i64 = 1;

// =============================================================================
// Version 1 DDL
// =============================================================================
//
// Monetary and quantity columns are TEXT holding canonical decimal strings;
// they are parsed into `Decimal` at the query layer so no float ever touches
// money. Dates are RFC3339 TEXT (millisecond precision, Z suffix), which
// compares correctly as a string.

const CREATE_VERSION_TABLE: &str = "
    CREATE TABLE version (
        _v          INTEGER PRIMARY KEY NOT NULL,
        app_name    TEXT NOT NULL
    );
";

const CREATE_RESOURCE_TABLE: &str = "
    CREATE TABLE resource (
        uuid            TEXT PRIMARY KEY NOT NULL,
        name            TEXT NOT NULL,
        unit_price      TEXT,
        created_date    TEXT NOT NULL,
        UNIQUE (name COLLATE NOCASE)
    );
";

const CREATE_AGENT_TABLE: &str = "
    CREATE TABLE agent (
        uuid            TEXT PRIMARY KEY NOT NULL,
        name            TEXT NOT NULL,
        email           TEXT,
        created_date    TEXT NOT NULL,
        UNIQUE (name COLLATE NOCASE)
    );
";

const CREATE_INVOICE_TABLE: &str = "
    CREATE TABLE invoice (
        uuid            TEXT PRIMARY KEY NOT NULL,
        date_issued     TEXT NOT NULL,
        date_due        TEXT,
        date_paid       TEXT,
        currency        TEXT NOT NULL,
        discount        TEXT NOT NULL,
        tax_percent     TEXT NOT NULL,
        shipping        TEXT NOT NULL,
        note            TEXT,

        payee_uuid      TEXT,
        payee_name      TEXT,
        payee_email     TEXT,

        payor_uuid      TEXT,
        payor_name      TEXT,
        payor_email     TEXT,

        created_date    TEXT NOT NULL,
        FOREIGN KEY(payor_uuid) REFERENCES agent(uuid)
    );
";

const CREATE_INVOICE_ITEM_TABLE: &str = "
    CREATE TABLE invoice_item (
        invoice_uuid    TEXT NOT NULL,
        item_number     INTEGER NOT NULL,
        item_name       TEXT NOT NULL,
        resource_uuid   TEXT NOT NULL,
        quantity        TEXT NOT NULL,
        unit_price      TEXT NOT NULL,
        created_date    TEXT NOT NULL,
        PRIMARY KEY(invoice_uuid, item_number),
        FOREIGN KEY(invoice_uuid) REFERENCES invoice(uuid),
        FOREIGN KEY(resource_uuid) REFERENCES resource(uuid)
    );
";

const CREATE_USER_TABLE: &str = "
    CREATE TABLE user (
        uuid            TEXT PRIMARY KEY NOT NULL,
        name            TEXT,
        currency        TEXT NOT NULL,
        created_date    TEXT NOT NULL
    );
";

/// Ordered DDL for one version step.
fn statements_for_version(version: i64) -> &'static [&'static str] {
    match version {
        1 => &[
            CREATE_VERSION_TABLE,
            CREATE_RESOURCE_TABLE,
            CREATE_AGENT_TABLE,
            CREATE_INVOICE_TABLE,
            CREATE_INVOICE_ITEM_TABLE,
            CREATE_USER_TABLE,
        ],
        _ => &[],
    }
}

// =============================================================================
// Migration
// =============================================================================

/// Reads the applied schema version. Absent or unreadable table reads as 0.
pub async fn read_version(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT _v FROM version")
        .fetch_optional(pool)
        .await
        .ok()
        .flatten()
        .unwrap_or(0)
}

/// Brings the database to [`CURRENT_VERSION`].
///
/// No-op when already current. All pending version steps run in a single
/// transaction together with the version-row update, so a failed migration
/// leaves the database at its previous version.
pub async fn migrate(pool: &SqlitePool) -> DbResult<()> {
    let version = read_version(pool).await;

    if version == CURRENT_VERSION {
        debug!(version, "Schema already current");
        return Ok(());
    }
    if version > CURRENT_VERSION {
        return Err(DbError::MigrationFailed(format!(
            "database is at schema v{version}, newer than supported v{CURRENT_VERSION}"
        )));
    }

    info!(from = version, to = CURRENT_VERSION, "Migrating schema");

    let mut tx = pool.begin().await?;
    for step in (version + 1)..=CURRENT_VERSION {
        for statement in statements_for_version(step) {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
    }
    sqlx::query("INSERT INTO version (_v, app_name) VALUES (?1, ?2)")
        .bind(CURRENT_VERSION)
        .bind(APP_NAME)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(version = CURRENT_VERSION, "Schema migration complete");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_migrate_from_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(read_version(db.pool()).await, CURRENT_VERSION);
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // Database::new already migrated; run again, twice.
        migrate(db.pool()).await.unwrap();
        migrate(db.pool()).await.unwrap();
        assert_eq!(read_version(db.pool()).await, CURRENT_VERSION);

        // The version table still has exactly one row.
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM version")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_newer_schema_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("UPDATE version SET _v = ?1")
            .bind(CURRENT_VERSION + 1)
            .execute(db.pool())
            .await
            .unwrap();

        let err = migrate(db.pool()).await.unwrap_err();
        assert!(matches!(err, DbError::MigrationFailed(_)));
    }
}
