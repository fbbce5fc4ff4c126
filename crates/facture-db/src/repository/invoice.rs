//! # Invoice Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Save Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     create(draft) — ONE transaction                     │
//! │                                                                         │
//! │  1. UPSERT user row          (settings appear on first save)           │
//! │  2. UPSERT agent row         (customer master, keep existing on name   │
//! │                               conflict — case-insensitive)             │
//! │  3. UPSERT resource rows     (one per line item, same conflict rule)   │
//! │  4. INSERT invoice           (payor_uuid resolved BY NAME via          │
//! │                               subselect, so "acme" and "Acme" bill     │
//! │                               the same customer)                       │
//! │  5. INSERT invoice_item × N  (resource_uuid resolved by name too;     │
//! │                               invoice row first, FKs are enforced)     │
//! │                                                                         │
//! │  Any failure rolls the whole thing back. All rows share one            │
//! │  created_date timestamp.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Payor name/email are copied onto the invoice row at save time; the
//! invoice keeps displaying what was billed even if the customer master
//! changes later. Only `date_paid` is mutable after creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::debug;

use facture_core::types::{Invoice, InvoiceDraft, InvoiceLineItem};

use crate::error::{DbError, DbResult};
use crate::row::{format_date, InvoiceItemRow, InvoiceRow};

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Persists a draft invoice.
    ///
    /// Callers are expected to have run validation first; the save path
    /// still coerces missing monetary fields to zero rather than failing.
    /// An unset issue date falls back to `now`.
    pub async fn create(&self, draft: &InvoiceDraft, now: DateTime<Utc>) -> DbResult<()> {
        debug!(uuid = %draft.uuid, payor = %draft.payor.name, "Creating invoice");

        let created = format_date(now);
        let mut tx = self.pool.begin().await?;

        // 1. Settings row for the issuing account, first save wins.
        sqlx::query(
            "INSERT INTO user (uuid, name, currency, created_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT DO NOTHING",
        )
        .bind(&draft.payee.uuid)
        .bind(&draft.payee.name)
        .bind(&draft.currency)
        .bind(&created)
        .execute(&mut *tx)
        .await?;

        // 2. Customer master. On a case-insensitive name match the existing
        //    row (and its uuid) wins over the draft's candidate.
        sqlx::query(
            "INSERT INTO agent (uuid, name, email, created_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT DO NOTHING",
        )
        .bind(&draft.payor.uuid)
        .bind(&draft.payor.name)
        .bind(&draft.payor.email)
        .bind(&created)
        .execute(&mut *tx)
        .await?;

        // 3. Product master rows, same resolve-or-create rule. The unit
        //    price recorded is the price at first reference.
        for item in &draft.items {
            sqlx::query(
                "INSERT INTO resource (uuid, name, unit_price, created_date)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT DO NOTHING",
            )
            .bind(&item.resource_uuid)
            .bind(&item.name)
            .bind(item.unit_price.map(|p| p.to_string()))
            .bind(&created)
            .execute(&mut *tx)
            .await?;
        }

        // 4. The invoice row, before its items so the FK holds.
        let date_issued = draft.date_issued.as_date().unwrap_or(now);
        sqlx::query(
            "INSERT INTO invoice (
                uuid, date_issued, date_due, date_paid, currency,
                discount, tax_percent, shipping, note,
                payee_uuid, payee_name, payee_email,
                payor_uuid, payor_name, payor_email,
                created_date
            ) VALUES (
                ?1, ?2, ?3, NULL, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10, ?11,
                (SELECT uuid FROM agent WHERE name = ?12 COLLATE NOCASE), ?12, ?13,
                ?14
            )",
        )
        .bind(&draft.uuid)
        .bind(format_date(date_issued))
        .bind(draft.date_due.as_date().map(format_date))
        .bind(&draft.currency)
        .bind(amount_text(draft.discount))
        .bind(amount_text(draft.tax_percent))
        .bind(amount_text(draft.shipping))
        .bind(if draft.note.is_empty() {
            None
        } else {
            Some(draft.note.as_str())
        })
        .bind(&draft.payee.uuid)
        .bind(&draft.payee.name)
        .bind(&draft.payee.email)
        .bind(&draft.payor.name)
        .bind(&draft.payor.email)
        .bind(&created)
        .execute(&mut *tx)
        .await?;

        // 5. Line items, numbered by position.
        for (index, item) in draft.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO invoice_item (
                    invoice_uuid, item_number, item_name, resource_uuid,
                    quantity, unit_price, created_date
                ) VALUES (
                    ?1, ?2, ?3,
                    (SELECT uuid FROM resource WHERE name = ?3 COLLATE NOCASE),
                    ?4, ?5, ?6
                )",
            )
            .bind(&draft.uuid)
            .bind(index as i64)
            .bind(&item.name)
            .bind(amount_text(item.quantity))
            .bind(amount_text(item.unit_price))
            .bind(&created)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(uuid = %draft.uuid, items = draft.items.len(), "Invoice created");
        Ok(())
    }

    /// Gets an invoice by UUID.
    pub async fn get(&self, uuid: &str) -> DbResult<Option<Invoice>> {
        let row: Option<InvoiceRow> =
            sqlx::query_as("SELECT * FROM invoice WHERE uuid = ?1")
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    /// Gets an invoice's line items in position order.
    pub async fn get_items(&self, invoice_uuid: &str) -> DbResult<Vec<InvoiceLineItem>> {
        let rows: Vec<InvoiceItemRow> = sqlx::query_as(
            "SELECT * FROM invoice_item WHERE invoice_uuid = ?1 ORDER BY item_number",
        )
        .bind(invoice_uuid)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InvoiceItemRow::into_item).collect()
    }

    /// Sets or clears the paid date.
    ///
    /// Returns `false` without touching the row when the stored value
    /// already equals the requested one (double-click on the paid toggle).
    pub async fn set_date_paid(
        &self,
        uuid: &str,
        date_paid: Option<DateTime<Utc>>,
    ) -> DbResult<bool> {
        let current: Option<Option<String>> =
            sqlx::query_scalar("SELECT date_paid FROM invoice WHERE uuid = ?1")
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;

        let current = match current {
            Some(value) => value,
            None => return Err(DbError::not_found("Invoice", uuid)),
        };

        let requested = date_paid.map(format_date);
        if current == requested {
            debug!(uuid, "Paid date unchanged, skipping write");
            return Ok(false);
        }

        sqlx::query("UPDATE invoice SET date_paid = ?2 WHERE uuid = ?1")
            .bind(uuid)
            .bind(&requested)
            .execute(&self.pool)
            .await?;

        Ok(true)
    }

    /// Deletes an invoice and all of its line items in one transaction.
    ///
    /// Customer and product master rows are left in place; they may be
    /// referenced by other invoices and remain useful for autocomplete.
    pub async fn delete(&self, uuid: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        // Items first, the FK points at the invoice row.
        sqlx::query("DELETE FROM invoice_item WHERE invoice_uuid = ?1")
            .bind(uuid)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM invoice WHERE uuid = ?1")
            .bind(uuid)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", uuid));
        }

        tx.commit().await?;
        debug!(uuid, "Invoice deleted");
        Ok(())
    }

    /// Whether the account has ever saved an invoice (drives the empty
    /// state of the dashboard).
    pub async fn has_any(&self) -> DbResult<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM invoice)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists != 0)
    }
}

/// Canonical TEXT for a monetary column; missing input stores as zero.
fn amount_text(value: Option<Decimal>) -> String {
    value.unwrap_or(Decimal::ZERO).to_string()
}
