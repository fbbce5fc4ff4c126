//! # Row Types
//!
//! sqlx row structs for the v1 schema plus the TEXT ↔ domain conversions
//! shared by repositories, queries and restore.
//!
//! ## Storage Conventions
//! - Money/quantity columns are TEXT holding canonical `Decimal` strings.
//!   Unparsable stored text decodes as zero (same policy as the compute
//!   layer) — the save path only ever writes canonical strings, so this
//!   only matters for externally produced snapshots.
//! - Date columns are RFC3339 TEXT with millisecond precision and a `Z`
//!   suffix (`2026-08-24T12:00:00.000Z`), so string comparison orders
//!   correctly in SQL. A malformed stored date is an invariant break and
//!   surfaces as `DbError::Internal`.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::str::FromStr;

use facture_core::types::{Customer, Invoice, InvoiceLineItem, Party, Product, UserSettings};

use crate::error::{DbError, DbResult};

// =============================================================================
// TEXT Conversions
// =============================================================================

/// Formats a date the way every date column stores it.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored date column.
pub fn parse_date(raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DbError::Internal(format!("malformed stored date '{raw}': {e}")))
}

fn parse_opt_date(raw: &Option<String>) -> DbResult<Option<DateTime<Utc>>> {
    raw.as_deref().map(parse_date).transpose()
}

/// Parses a stored decimal column; anything unparsable reads as zero.
pub fn parse_amount(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or(Decimal::ZERO)
}

fn parse_opt_amount(raw: &Option<String>) -> Option<Decimal> {
    raw.as_deref().map(parse_amount)
}

// =============================================================================
// Row Structs
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub uuid: String,
    pub date_issued: String,
    pub date_due: Option<String>,
    pub date_paid: Option<String>,
    pub currency: String,
    pub discount: String,
    pub tax_percent: String,
    pub shipping: String,
    pub note: Option<String>,
    pub payee_uuid: Option<String>,
    pub payee_name: Option<String>,
    pub payee_email: Option<String>,
    pub payor_uuid: Option<String>,
    pub payor_name: Option<String>,
    pub payor_email: Option<String>,
    pub created_date: String,
}

impl InvoiceRow {
    pub fn into_invoice(self) -> DbResult<Invoice> {
        Ok(Invoice {
            date_issued: parse_date(&self.date_issued)?,
            date_due: parse_opt_date(&self.date_due)?,
            date_paid: parse_opt_date(&self.date_paid)?,
            currency: self.currency,
            discount: parse_amount(&self.discount),
            tax_percent: parse_amount(&self.tax_percent),
            shipping: parse_amount(&self.shipping),
            note: self.note,
            payee: Party {
                uuid: self.payee_uuid.unwrap_or_default(),
                name: self.payee_name.unwrap_or_default(),
                email: self.payee_email,
            },
            payor: Party {
                uuid: self.payor_uuid.unwrap_or_default(),
                name: self.payor_name.unwrap_or_default(),
                email: self.payor_email,
            },
            created_date: parse_date(&self.created_date)?,
            uuid: self.uuid,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct InvoiceItemRow {
    pub invoice_uuid: String,
    pub item_number: i64,
    pub item_name: String,
    pub resource_uuid: String,
    pub quantity: String,
    pub unit_price: String,
    pub created_date: String,
}

impl InvoiceItemRow {
    pub fn into_item(self) -> DbResult<InvoiceLineItem> {
        Ok(InvoiceLineItem {
            invoice_uuid: self.invoice_uuid,
            item_number: self.item_number,
            item_name: self.item_name,
            resource_uuid: self.resource_uuid,
            quantity: parse_amount(&self.quantity),
            unit_price: parse_amount(&self.unit_price),
            created_date: parse_date(&self.created_date)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AgentRow {
    pub uuid: String,
    pub name: String,
    pub email: Option<String>,
    pub created_date: String,
}

impl AgentRow {
    pub fn into_customer(self) -> DbResult<Customer> {
        Ok(Customer {
            uuid: self.uuid,
            name: self.name,
            email: self.email,
            created_date: parse_date(&self.created_date)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub uuid: String,
    pub name: String,
    pub unit_price: Option<String>,
    pub created_date: String,
}

impl ResourceRow {
    pub fn into_product(self) -> DbResult<Product> {
        Ok(Product {
            uuid: self.uuid,
            name: self.name,
            unit_price: parse_opt_amount(&self.unit_price),
            created_date: parse_date(&self.created_date)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub uuid: String,
    pub name: Option<String>,
    pub currency: String,
    pub created_date: String,
}

impl UserRow {
    pub fn into_settings(self) -> DbResult<UserSettings> {
        Ok(UserSettings {
            uuid: self.uuid,
            name: self.name,
            currency: self.currency,
            created_date: parse_date(&self.created_date)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_round_trip() {
        let now = Utc::now();
        let stored = format_date(now);
        assert!(stored.ends_with('Z'));
        let parsed = parse_date(&stored).unwrap();
        // Millisecond precision is the storage granularity.
        assert_eq!(parsed.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_stored_dates_order_as_strings() {
        let early = format_date("2026-01-31T23:59:59Z".parse().unwrap());
        let late = format_date("2026-02-01T00:00:00Z".parse().unwrap());
        assert!(early < late);
    }

    #[test]
    fn test_malformed_date_is_internal_error() {
        assert!(matches!(parse_date("yesterday"), Err(DbError::Internal(_))));
    }

    #[test]
    fn test_parse_amount_zero_on_garbage() {
        assert_eq!(parse_amount("12.34"), Decimal::from_str("12.34").unwrap());
        assert_eq!(parse_amount("garbage"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
    }
}
