//! # facture-db: Database Layer for Facture
//!
//! This crate provides database access for the Facture invoicing app.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Facture Data Flow                                │
//! │                                                                         │
//! │  UI action (save invoice, open dashboard)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    facture-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌────────────────┐  │   │
//! │  │   │   Database    │   │ Repositories  │   │ Schema Manager │  │   │
//! │  │   │   (pool.rs)   │   │ (invoice.rs,  │   │  (schema.rs)   │  │   │
//! │  │   │               │◄──│  customer.rs, │   │                │  │   │
//! │  │   │ SqlitePool    │   │  ...)         │   │ version table  │  │   │
//! │  │   │ WriteGuard    │   ├───────────────┤   │ v1 DDL         │  │   │
//! │  │   │               │◄──│ ReportQueries │   └────────────────┘  │   │
//! │  │   └───────────────┘   │ (queries/)    │   ┌────────────────┐  │   │
//! │  │                       └───────────────┘   │ Backup/Restore │  │   │
//! │  │                                           │  (backup.rs)   │  │   │
//! │  │                                           └────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (one per account)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the `Database` handle
//! - [`schema`] - Versioned schema manager
//! - [`repository`] - Entity operations (invoice, customer, product, settings)
//! - [`queries`] - Aggregate report queries for the dashboards
//! - [`backup`] - Snapshot export and merge-restore
//! - [`guard`] - In-flight write deduplication
//! - [`row`] - Row structs and TEXT conversions
//! - [`error`] - Database and backup error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use facture_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/facture.db")).await?;
//!
//! db.save_invoice(&draft).await?;
//! let totals = db.reports().totals("USD", Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod guard;
pub mod pool;
pub mod queries;
pub mod repository;
pub mod row;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{BackupError, BackupResult, DbError, DbResult};
pub use guard::{WriteGuard, WriteTicket};
pub use pool::{Database, DbConfig};

// Repository and query re-exports for convenience
pub use queries::ReportQueries;
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;

// =============================================================================
// End-To-End Flow Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Months, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use facture_core::money::Amount;
    use facture_core::types::{AccountIdentity, DateInput, DraftLineItem, InvoiceDraft};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn account() -> AccountIdentity {
        AccountIdentity {
            user_id: "user-1".to_string(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        }
    }

    /// A valid draft billing `customer` one line of `quantity × price`.
    fn draft(customer: &str, quantity: &str, price: &str) -> InvoiceDraft {
        let mut draft = InvoiceDraft::new(&account(), None, Utc::now());
        draft.payor.name = customer.to_string();
        draft.items[0].name = "Consulting".to_string();
        draft.items[0].quantity = Some(dec(quantity));
        draft.items[0].unit_price = Some(dec(price));
        draft
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// A file-backed database in the temp directory. Snapshot export needs
    /// a real file behind the pool, so the backup tests use this instead
    /// of [`db`].
    async fn file_db() -> (Database, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("facture-test-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        (db, path)
    }

    async fn remove_file_db(db: Database, path: std::path::PathBuf) {
        db.close().await;
        let _ = tokio::fs::remove_file(&path).await;
        let _ = tokio::fs::remove_file(path.with_extension("db-wal")).await;
        let _ = tokio::fs::remove_file(path.with_extension("db-shm")).await;
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let db = db().await;
        let mut d = draft("Acme Corp", "2", "10");
        d.discount = Some(dec("5"));
        d.tax_percent = Some(dec("10"));
        d.shipping = Some(dec("2"));
        d.items.push(DraftLineItem {
            resource_uuid: uuid::Uuid::new_v4().to_string(),
            name: "Hosting".to_string(),
            quantity: Some(dec("1")),
            unit_price: Some(dec("25")),
        });

        assert!(db.save_invoice(&d).await.unwrap());
        assert!(db.invoices().has_any().await.unwrap());

        let invoice = db.invoices().get(&d.uuid).await.unwrap().unwrap();
        assert_eq!(invoice.payor.name, "Acme Corp");
        assert_eq!(invoice.discount, dec("5"));
        assert!(invoice.date_paid.is_none());

        let items = db.invoices().get_items(&d.uuid).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_number, 0);
        assert_eq!(items[1].item_name, "Hosting");

        // Listing derives the taxed total: (45 - 5) * 1.10 + 2 = 46.00
        let listed = db.reports().list_invoices().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total.display(), "46.00");
        assert_eq!(listed[0].customer, "Acme Corp");
    }

    #[tokio::test]
    async fn test_customer_and_product_reuse_is_case_insensitive() {
        let db = db().await;
        db.save_invoice(&draft("Acme Corp", "1", "10")).await.unwrap();

        let mut second = draft("acme corp", "1", "20");
        second.items[0].name = "CONSULTING".to_string();
        db.save_invoice(&second).await.unwrap();

        // Both invoices resolved to the same master rows.
        assert_eq!(db.reports().customer_count().await.unwrap(), 1);
        let customers = db.customers().list().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Acme Corp");

        let products = db.products().list().await.unwrap();
        assert_eq!(products.len(), 1);

        let invoice = db.invoices().get(&second.uuid).await.unwrap().unwrap();
        assert_eq!(invoice.payor.uuid, customers[0].uuid);
        let items = db.invoices().get_items(&second.uuid).await.unwrap();
        assert_eq!(items[0].resource_uuid, products[0].uuid);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_items() {
        let db = db().await;
        let mut d = draft("Acme", "1", "10");
        for n in 0..2 {
            d.items.push(DraftLineItem {
                resource_uuid: uuid::Uuid::new_v4().to_string(),
                name: format!("Extra {n}"),
                quantity: Some(Decimal::ONE),
                unit_price: Some(dec("5")),
            });
        }
        db.save_invoice(&d).await.unwrap();

        db.invoices().delete(&d.uuid).await.unwrap();

        assert!(db.invoices().get(&d.uuid).await.unwrap().is_none());
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoice_item")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);

        // Master rows survive the delete, but the customer no longer
        // counts: the count covers customers with at least one invoice.
        assert_eq!(db.customers().list().await.unwrap().len(), 1);
        assert_eq!(db.reports().customer_count().await.unwrap(), 0);

        let err = db.invoices().delete(&d.uuid).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_date_paid_skips_unchanged_writes() {
        let db = db().await;
        let d = draft("Acme", "1", "10");
        db.save_invoice(&d).await.unwrap();

        let paid_on = Utc::now();
        assert!(db.invoices().set_date_paid(&d.uuid, Some(paid_on)).await.unwrap());
        // Same value again: short-circuits.
        assert!(!db.invoices().set_date_paid(&d.uuid, Some(paid_on)).await.unwrap());
        // Clearing is a change.
        assert!(db.invoices().set_date_paid(&d.uuid, None).await.unwrap());
        assert!(!db.invoices().set_date_paid(&d.uuid, None).await.unwrap());

        let err = db
            .invoices()
            .set_date_paid("no-such-invoice", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_save_is_dropped_while_in_flight() {
        let db = db().await;
        let d = draft("Acme", "1", "10");

        let ticket = db.write_guard().begin(&d.uuid).unwrap();
        assert!(!db.save_invoice(&d).await.unwrap());
        drop(ticket);

        assert!(db.save_invoice(&d).await.unwrap());
    }

    #[tokio::test]
    async fn test_settings_upsert() {
        let db = db().await;
        let now = Utc::now();

        assert!(db.settings().get("user-1").await.unwrap().is_none());

        db.settings()
            .set_default_currency("user-1", Some("Ada"), "EUR", now)
            .await
            .unwrap();
        let settings = db.settings().get("user-1").await.unwrap().unwrap();
        assert_eq!(settings.currency, "EUR");

        // Update in place, name untouched.
        db.settings()
            .set_default_currency("user-1", None, "GBP", now)
            .await
            .unwrap();
        let settings = db.settings().get("user-1").await.unwrap().unwrap();
        assert_eq!(settings.currency, "GBP");
        assert_eq!(settings.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_receivable_totals() {
        let db = db().await;
        let now = Utc::now();

        // Paid: 100. Unpaid, due next week: 50. Unpaid, overdue: 30.
        let paid = draft("A", "1", "100");
        db.save_invoice(&paid).await.unwrap();
        db.invoices().set_date_paid(&paid.uuid, Some(now)).await.unwrap();

        let mut upcoming = draft("B", "1", "50");
        upcoming.date_due = DateInput::Valid(now + Duration::days(7));
        db.save_invoice(&upcoming).await.unwrap();

        let mut overdue = draft("C", "1", "30");
        overdue.date_due = DateInput::Valid(now - Duration::days(7));
        db.save_invoice(&overdue).await.unwrap();

        let totals = db.reports().totals("USD", now).await.unwrap();
        assert_eq!(totals.invoiced, Amount::parse("180"));
        assert_eq!(totals.received, Amount::parse("100"));
        assert_eq!(totals.owed, Amount::parse("80"));
        assert_eq!(totals.overdue, Amount::parse("30"));
    }

    #[tokio::test]
    async fn test_sales_rankings_fold_into_others() {
        let db = db().await;
        for n in 1..=7 {
            // Customer n invoices n × 10, pre-tax.
            let mut d = draft(&format!("Customer {n}"), &n.to_string(), "10");
            d.items[0].name = format!("Service {n}");
            db.save_invoice(&d).await.unwrap();
        }

        let by_customer = db.reports().sales_by_customer("USD").await.unwrap();
        assert_eq!(by_customer.len(), 6);
        assert_eq!(by_customer[0].name, "Customer 7");
        assert_eq!(by_customer[0].total, Amount::parse("70"));
        assert_eq!(by_customer[5].name, "Others");
        assert_eq!(by_customer[5].total, Amount::parse("30"));

        let by_product = db.reports().sales_by_product("USD").await.unwrap();
        assert_eq!(by_product.len(), 6);
        assert_eq!(by_product[5].name, "Others");
    }

    #[tokio::test]
    async fn test_statements_exclude_foreign_currency_but_list_customer() {
        let db = db().await;
        db.save_invoice(&draft("Acme", "1", "100")).await.unwrap();

        let mut foreign = draft("Globex", "1", "40");
        foreign.currency = "EUR".to_string();
        db.save_invoice(&foreign).await.unwrap();

        let statements = db.reports().customer_statements("USD").await.unwrap();
        assert_eq!(statements.len(), 2);
        // Ordered by name; Globex appears with zeroed sums.
        assert_eq!(statements[0].name, "Acme");
        assert_eq!(statements[0].invoiced, Amount::parse("100"));
        assert_eq!(statements[1].name, "Globex");
        assert_eq!(statements[1].invoiced, Amount::zero());

        // Nothing in EUR leaks into the USD headline totals either.
        let totals = db.reports().totals("USD", Utc::now()).await.unwrap();
        assert_eq!(totals.invoiced, Amount::parse("100"));
    }

    #[tokio::test]
    async fn test_monthly_sales_buckets() {
        let db = db().await;
        let now = Utc::now();
        let last_month = now.checked_sub_months(Months::new(1)).unwrap();

        // This month: 2 × 10 with 5 discount and 2 shipping, pre-tax 17.
        let mut current = draft("Acme", "2", "10");
        current.discount = Some(dec("5"));
        current.shipping = Some(dec("2"));
        current.tax_percent = Some(dec("10")); // excluded from the series
        db.save_invoice(&current).await.unwrap();

        let mut previous = draft("Acme", "1", "40");
        previous.date_issued = DateInput::Valid(last_month);
        db.save_invoice(&previous).await.unwrap();

        let series = db.reports().monthly_sales("USD", None, now).await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].total, Amount::zero());
        assert_eq!(series[1].label, last_month.format("%b").to_string());
        assert_eq!(series[1].total, Amount::parse("40"));
        assert_eq!(series[2].label, now.format("%b").to_string());
        assert_eq!(series[2].total, Amount::parse("17"));

        // The series length is a parameter; a two-month window drops the
        // empty oldest bucket.
        let short = db.reports().monthly_sales("USD", Some(2), now).await.unwrap();
        assert_eq!(short.len(), 2);
        assert_eq!(short[0].label, last_month.format("%b").to_string());
        assert_eq!(short[0].total, Amount::parse("40"));
        assert_eq!(short[1].total, Amount::parse("17"));
    }

    #[tokio::test]
    async fn test_snapshot_restore_merges_and_is_idempotent() {
        let (source, source_path) = file_db().await;
        let exported = draft("Acme Corp", "2", "10");
        source.save_invoice(&exported).await.unwrap();
        source.save_invoice(&draft("Globex", "1", "50")).await.unwrap();
        let bytes = backup::export_snapshot(source.pool()).await.unwrap();
        remove_file_db(source, source_path).await;

        // The target belongs to another account and already knows Acme
        // under a different uuid and casing.
        let target = db().await;
        let restorer = AccountIdentity {
            user_id: "user-2".to_string(),
            name: Some("Grace".to_string()),
            email: None,
        };
        target.save_invoice(&draft("ACME CORP", "1", "99")).await.unwrap();

        let summary = backup::restore_snapshot(target.pool(), &bytes, &restorer)
            .await
            .unwrap();
        assert_eq!(summary.invoices, 2);
        assert_eq!(summary.customers, 1); // only Globex is new
        assert_eq!(target.reports().customer_count().await.unwrap(), 2);

        // Restored invoices re-resolved their payor by name and are now
        // held under the restoring account's id, but keep the payee name
        // the snapshot printed on them.
        let acme = target.customers().get_by_name("acme corp").await.unwrap().unwrap();
        let merged = target.invoices().get(&exported.uuid).await.unwrap().unwrap();
        assert_eq!(merged.payor.uuid, acme.uuid);
        assert_eq!(merged.payee.uuid, "user-2");
        assert_eq!(merged.payee.name, "Ada");
        assert_eq!(merged.payee.email.as_deref(), Some("ada@example.com"));

        // Second restore of the same snapshot changes nothing.
        let again = backup::restore_snapshot(target.pool(), &bytes, &restorer)
            .await
            .unwrap();
        assert_eq!(again, backup::RestoreSummary::default());
        assert_eq!(target.reports().list_invoices().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_restore_leaves_settings_untouched() {
        let (source, source_path) = file_db().await;
        let now = Utc::now();
        source
            .settings()
            .set_default_currency("user-1", Some("Ada"), "USD", now)
            .await
            .unwrap();
        source.save_invoice(&draft("Acme", "1", "10")).await.unwrap();
        let bytes = backup::export_snapshot(source.pool()).await.unwrap();
        remove_file_db(source, source_path).await;

        // The target switched its default currency since the backup was
        // taken; restoring must not revert it.
        let target = db().await;
        target
            .settings()
            .set_default_currency("user-1", Some("Ada"), "EUR", now)
            .await
            .unwrap();

        backup::restore_snapshot(target.pool(), &bytes, &account())
            .await
            .unwrap();

        let settings = target.settings().get("user-1").await.unwrap().unwrap();
        assert_eq!(settings.currency, "EUR");
        assert!(target.invoices().has_any().await.unwrap());
    }

    #[tokio::test]
    async fn test_export_requires_file_backed_database() {
        let db = db().await;
        db.save_invoice(&draft("Acme", "1", "10")).await.unwrap();

        // A memory-backed pool has no file for VACUUM INTO to copy.
        let err = backup::export_snapshot(db.pool()).await.unwrap_err();
        assert!(matches!(err, BackupError::Db(DbError::Internal(_))));
    }

    #[tokio::test]
    async fn test_restore_rejects_bad_snapshots() {
        let target = db().await;

        // Not a database at all.
        let err = backup::restore_snapshot(target.pool(), b"not a database", &account())
            .await
            .unwrap_err();
        assert!(matches!(err, BackupError::InvalidBackup(_)));

        // Right shape, wrong schema version.
        let (source, source_path) = file_db().await;
        sqlx::query("UPDATE version SET _v = ?1")
            .bind(schema::CURRENT_VERSION + 1)
            .execute(source.pool())
            .await
            .unwrap();
        let bytes = backup::export_snapshot(source.pool()).await.unwrap();
        remove_file_db(source, source_path).await;

        let err = backup::restore_snapshot(target.pool(), &bytes, &account())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BackupError::IncompatibleVersion { found, expected }
                if found == schema::CURRENT_VERSION + 1 && expected == schema::CURRENT_VERSION
        ));

        // Nothing was merged by the failed attempts.
        assert!(!target.invoices().has_any().await.unwrap());
    }
}
