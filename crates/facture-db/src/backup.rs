//! # Snapshot Backup and Restore
//!
//! Whole-database snapshot export and merge-restore.
//!
//! ## Restore Is A Merge
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  snapshot bytes                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write to temp file, open read-only                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  version check: app_name must match, _v must equal CURRENT_VERSION     │
//! │  EXACTLY (snapshots are never migrated)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ONE transaction into the live database:                               │
//! │    resource / agent    insert, existing rows win (conflict-ignore)     │
//! │    invoice             insert-ignore, payor_uuid RE-RESOLVED BY NAME   │
//! │                        against the live agent table; payee_uuid       │
//! │                        becomes the RESTORING account's id (display    │
//! │                        name/email stay as the snapshot recorded them) │
//! │    invoice_item        insert-ignore, resource_uuid re-resolved the    │
//! │                        same way                                        │
//! │    user                NEVER touched: restoring a backup must not     │
//! │                        revert the live account's settings             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Name-based re-resolution is what makes merging two databases sane: the
//! snapshot's "Acme Corp" lands on the live "acme corp" row even though
//! their UUIDs differ. Running the same restore twice is a no-op.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use facture_core::types::AccountIdentity;

use crate::error::{BackupError, BackupResult, DbError};
use crate::row::{AgentRow, InvoiceItemRow, InvoiceRow, ResourceRow};
use crate::schema::{APP_NAME, CURRENT_VERSION};

/// Row counts actually merged by a restore. Rows already present count
/// as zero, so restoring the same snapshot twice reports all zeros the
/// second time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub products: u64,
    pub customers: u64,
    pub invoices: u64,
    pub line_items: u64,
}

// =============================================================================
// Export
// =============================================================================

/// Exports the database as snapshot bytes (a self-contained SQLite file).
///
/// Uses `VACUUM INTO`, which writes a consistent, compacted copy without
/// blocking concurrent readers.
pub async fn export_snapshot(pool: &SqlitePool) -> BackupResult<Vec<u8>> {
    let path = scratch_path("export");

    sqlx::query("VACUUM INTO ?1")
        .bind(path.display().to_string())
        .execute(pool)
        .await
        .map_err(DbError::from)?;

    // A memory-backed connection reports success but writes nothing: the
    // VACUUM target inherits the connection's memory-open mode. Only a
    // file-backed database can be exported.
    if tokio::fs::metadata(&path).await.is_err() {
        return Err(DbError::Internal(
            "VACUUM INTO produced no file; an in-memory database cannot be exported".to_string(),
        )
        .into());
    }

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| DbError::Internal(format!("reading snapshot file: {e}")))?;
    remove_scratch(&path).await;

    info!(bytes = bytes.len(), "Snapshot exported");
    Ok(bytes)
}

// =============================================================================
// Restore
// =============================================================================

/// Merges a snapshot into the live database.
///
/// The snapshot must come from this application at exactly the current
/// schema version; see the module docs for the merge rules. Imported
/// invoices become owned by `account`: whoever restores a backup holds
/// them under their own id, while the payee name and email printed on
/// each invoice stay as the snapshot recorded them.
pub async fn restore_snapshot(
    pool: &SqlitePool,
    bytes: &[u8],
    account: &AccountIdentity,
) -> BackupResult<RestoreSummary> {
    let path = scratch_path("restore");
    if let Err(e) = tokio::fs::write(&path, bytes).await {
        return Err(DbError::Internal(format!("writing snapshot file: {e}")).into());
    }

    let result = merge_from_file(pool, &path, account).await;
    remove_scratch(&path).await;
    result
}

async fn merge_from_file(
    pool: &SqlitePool,
    path: &PathBuf,
    account: &AccountIdentity,
) -> BackupResult<RestoreSummary> {
    let snapshot = open_snapshot(path).await?;
    let result = merge_snapshot(pool, &snapshot, account).await;
    snapshot.close().await;
    result
}

/// Opens the snapshot read-only and verifies it is one of ours at the
/// exact current schema version.
async fn open_snapshot(path: &PathBuf) -> BackupResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true);

    let snapshot = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| BackupError::InvalidBackup(format!("cannot open snapshot: {e}")))?;

    let version: (i64, String) = sqlx::query_as("SELECT _v, app_name FROM version")
        .fetch_one(&snapshot)
        .await
        .map_err(|e| {
            BackupError::InvalidBackup(format!("snapshot has no readable version table: {e}"))
        })?;

    if version.1 != APP_NAME {
        return Err(BackupError::InvalidBackup(format!(
            "snapshot belongs to application '{}'",
            version.1
        )));
    }
    if version.0 != CURRENT_VERSION {
        return Err(BackupError::IncompatibleVersion {
            found: version.0,
            expected: CURRENT_VERSION,
        });
    }

    Ok(snapshot)
}

async fn merge_snapshot(
    pool: &SqlitePool,
    snapshot: &SqlitePool,
    account: &AccountIdentity,
) -> BackupResult<RestoreSummary> {
    // Read everything up front; the snapshot connection is read-only and
    // must not outlive the merge.
    let products: Vec<ResourceRow> = sqlx::query_as("SELECT * FROM resource")
        .fetch_all(snapshot)
        .await
        .map_err(snapshot_read_error)?;
    let customers: Vec<AgentRow> = sqlx::query_as("SELECT * FROM agent")
        .fetch_all(snapshot)
        .await
        .map_err(snapshot_read_error)?;
    let invoices: Vec<InvoiceRow> = sqlx::query_as("SELECT * FROM invoice")
        .fetch_all(snapshot)
        .await
        .map_err(snapshot_read_error)?;
    let items: Vec<InvoiceItemRow> =
        sqlx::query_as("SELECT * FROM invoice_item ORDER BY invoice_uuid, item_number")
            .fetch_all(snapshot)
            .await
            .map_err(snapshot_read_error)?;

    let mut summary = RestoreSummary::default();
    let mut tx = pool.begin().await.map_err(DbError::from)?;

    for product in &products {
        summary.products += sqlx::query(
            "INSERT INTO resource (uuid, name, unit_price, created_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT DO NOTHING",
        )
        .bind(&product.uuid)
        .bind(&product.name)
        .bind(&product.unit_price)
        .bind(&product.created_date)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?
        .rows_affected();
    }

    for customer in &customers {
        summary.customers += sqlx::query(
            "INSERT INTO agent (uuid, name, email, created_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT DO NOTHING",
        )
        .bind(&customer.uuid)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.created_date)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?
        .rows_affected();
    }

    for invoice in &invoices {
        summary.invoices += sqlx::query(
            "INSERT INTO invoice (
                uuid, date_issued, date_due, date_paid, currency,
                discount, tax_percent, shipping, note,
                payee_uuid, payee_name, payee_email,
                payor_uuid, payor_name, payor_email,
                created_date
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12,
                (SELECT uuid FROM agent WHERE name = ?13 COLLATE NOCASE), ?13, ?14,
                ?15
            )
            ON CONFLICT DO NOTHING",
        )
        .bind(&invoice.uuid)
        .bind(&invoice.date_issued)
        .bind(&invoice.date_due)
        .bind(&invoice.date_paid)
        .bind(&invoice.currency)
        .bind(&invoice.discount)
        .bind(&invoice.tax_percent)
        .bind(&invoice.shipping)
        .bind(&invoice.note)
        .bind(&account.user_id)
        .bind(&invoice.payee_name)
        .bind(&invoice.payee_email)
        .bind(&invoice.payor_name)
        .bind(&invoice.payor_email)
        .bind(&invoice.created_date)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?
        .rows_affected();
    }

    for item in &items {
        summary.line_items += sqlx::query(
            "INSERT INTO invoice_item (
                invoice_uuid, item_number, item_name, resource_uuid,
                quantity, unit_price, created_date
            ) VALUES (
                ?1, ?2, ?3,
                (SELECT uuid FROM resource WHERE name = ?3 COLLATE NOCASE),
                ?4, ?5, ?6
            )
            ON CONFLICT DO NOTHING",
        )
        .bind(&item.invoice_uuid)
        .bind(item.item_number)
        .bind(&item.item_name)
        .bind(&item.quantity)
        .bind(&item.unit_price)
        .bind(&item.created_date)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?
        .rows_affected();
    }

    tx.commit().await.map_err(DbError::from)?;

    info!(
        customers = summary.customers,
        products = summary.products,
        invoices = summary.invoices,
        line_items = summary.line_items,
        "Snapshot merged"
    );
    Ok(summary)
}

fn snapshot_read_error(e: sqlx::Error) -> BackupError {
    BackupError::InvalidBackup(format!("snapshot table unreadable: {e}"))
}

/// A unique scratch path in the system temp directory.
fn scratch_path(kind: &str) -> PathBuf {
    std::env::temp_dir().join(format!("facture-{kind}-{}.db", Uuid::new_v4()))
}

async fn remove_scratch(path: &PathBuf) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), "Could not remove scratch file: {e}");
    }
}
