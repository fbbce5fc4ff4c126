//! # Domain Types
//!
//! Core domain types used throughout Facture.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InvoiceDraft   │   │    Invoice      │   │ InvoiceLineItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  form input,    │   │  persisted row  │   │  invoice_uuid   │       │
//! │  │  may be invalid │   │  (dates, payee, │   │  item_number    │       │
//! │  │  items: Vec<    │   │   payor, money  │   │  quantity       │       │
//! │  │   DraftLineItem>│   │   fields)       │   │  unit_price     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │    Product      │   │  UserSettings   │       │
//! │  │  (payor master, │   │  (line item     │   │  (per-account   │       │
//! │  │   unique name)  │   │   master)       │   │   defaults)     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! Primary keys are UUID v4 strings, generated client-side (offline-safe).
//! Customers and products additionally carry a *natural* key: their name,
//! unique case-insensitively. Invoice rows reference them by UUID, but the
//! UUID is resolved **by name** at write time, so two drafts naming
//! "Acme Corp" converge on the same master row.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DEFAULT_CURRENCY;
use crate::DEFAULT_DUE_IN_DAYS;

// =============================================================================
// Account Identity
// =============================================================================

/// The signed-in account, as supplied by the external identity provider.
///
/// Used as the payee reference on invoices the account creates, and as the
/// key for the per-account settings row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentity {
    /// Stable user identifier from the identity provider.
    pub user_id: String,

    /// Display name, if the account has one.
    pub name: Option<String>,

    /// Account email, if known.
    pub email: Option<String>,
}

// =============================================================================
// Parties
// =============================================================================

/// A party snapshot on an invoice (payee or payor).
///
/// ## Snapshot Pattern
/// Name and email are copied onto the invoice at save time. The invoice
/// keeps displaying what was billed even if the master record changes later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Identity reference: account user id for payees, customer UUID for
    /// payors. For payors this is a *candidate* id; the persistence layer
    /// re-resolves it by name.
    pub uuid: String,

    pub name: String,

    pub email: Option<String>,
}

// =============================================================================
// Date Input
// =============================================================================

/// A date field as entered on the invoice form.
///
/// Keeps "present but unparsable" distinct from "absent" so validation can
/// report the right message for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateInput {
    Missing,
    Invalid,
    Valid(DateTime<Utc>),
}

impl DateInput {
    /// Parses a `YYYY-MM-DD` form value. Empty input is `Missing`,
    /// unparsable input is `Invalid`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return DateInput::Missing;
        }
        match chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => match date.and_hms_opt(0, 0, 0) {
                Some(naive) => DateInput::Valid(DateTime::from_naive_utc_and_offset(naive, Utc)),
                None => DateInput::Invalid,
            },
            Err(_) => DateInput::Invalid,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, DateInput::Valid(_))
    }

    /// Returns the date when valid.
    #[inline]
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            DateInput::Valid(date) => Some(*date),
            _ => None,
        }
    }
}

impl Default for DateInput {
    fn default() -> Self {
        DateInput::Missing
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(date: DateTime<Utc>) -> Self {
        DateInput::Valid(date)
    }
}

// =============================================================================
// Invoice Draft (form state)
// =============================================================================

/// A line item as entered on the form.
///
/// `quantity` and `unit_price` are `None` when the field is empty or not a
/// number. Amount computation treats `None` as zero; validation reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineItem {
    /// Candidate product UUID. Used as-is when the item names a brand new
    /// product; ignored in favor of the existing row when the name matches.
    pub resource_uuid: String,

    pub name: String,

    pub quantity: Option<Decimal>,

    pub unit_price: Option<Decimal>,
}

impl DraftLineItem {
    /// A fresh empty line: quantity 1, price 0.
    pub fn empty() -> Self {
        DraftLineItem {
            resource_uuid: Uuid::new_v4().to_string(),
            name: String::new(),
            quantity: Some(Decimal::ONE),
            unit_price: Some(Decimal::ZERO),
        }
    }
}

/// A draft invoice: everything the form holds before save.
///
/// Monetary fields are `Option<Decimal>` because the form may hold empty or
/// garbage input. Figures computed from a draft coerce those to zero;
/// validation collects an error for each one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub uuid: String,

    pub date_issued: DateInput,

    pub date_due: DateInput,

    pub currency: String,

    pub discount: Option<Decimal>,

    pub tax_percent: Option<Decimal>,

    pub shipping: Option<Decimal>,

    pub note: String,

    /// The account issuing the invoice.
    pub payee: Party,

    /// Who is being billed. May name an existing customer or a new one.
    pub payor: Party,

    pub items: Vec<DraftLineItem>,
}

impl InvoiceDraft {
    /// Constructs a new empty draft for the given account.
    ///
    /// ## Defaults
    /// - issue date = now, due date = now + 28 days
    /// - one empty line item
    /// - currency and payee name from settings when present
    /// - zero discount / tax / shipping
    pub fn new(
        account: &AccountIdentity,
        settings: Option<&UserSettings>,
        now: DateTime<Utc>,
    ) -> Self {
        let payee_name = settings
            .and_then(|s| s.name.clone())
            .or_else(|| account.name.clone())
            .unwrap_or_default();
        let currency = settings
            .map(|s| s.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        InvoiceDraft {
            uuid: Uuid::new_v4().to_string(),
            date_issued: DateInput::Valid(now),
            date_due: DateInput::Valid(now + Duration::days(DEFAULT_DUE_IN_DAYS)),
            currency,
            discount: Some(Decimal::ZERO),
            tax_percent: Some(Decimal::ZERO),
            shipping: Some(Decimal::ZERO),
            note: String::new(),
            payee: Party {
                uuid: account.user_id.clone(),
                name: payee_name,
                email: account.email.clone(),
            },
            payor: Party {
                uuid: Uuid::new_v4().to_string(),
                name: String::new(),
                email: None,
            },
            items: vec![DraftLineItem::empty()],
        }
    }
}

// =============================================================================
// Persisted Entities
// =============================================================================

/// A persisted invoice row.
///
/// Totals are **never** stored; they are derived from the line items plus
/// the discount/tax/shipping fields on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub uuid: String,

    pub date_issued: DateTime<Utc>,

    pub date_due: Option<DateTime<Utc>>,

    /// Present means "paid", absent means "outstanding". The only mutable
    /// field after creation.
    pub date_paid: Option<DateTime<Utc>>,

    pub currency: String,

    /// Absolute discount (not a percentage), subtracted before tax.
    pub discount: Decimal,

    pub tax_percent: Decimal,

    /// Added after tax.
    pub shipping: Decimal,

    pub note: Option<String>,

    pub payee: Party,

    pub payor: Party,

    /// System-assigned at save time, immutable.
    pub created_date: DateTime<Utc>,
}

/// A persisted invoice line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    pub invoice_uuid: String,

    /// Position within the invoice, unique per invoice.
    pub item_number: i64,

    pub item_name: String,

    /// Resolved product reference.
    pub resource_uuid: String,

    pub quantity: Decimal,

    pub unit_price: Decimal,

    pub created_date: DateTime<Utc>,
}

/// A reusable customer ("agent" acting as payor), unique by name
/// (case-insensitive).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub uuid: String,
    pub name: String,
    pub email: Option<String>,
    pub created_date: DateTime<Utc>,
}

/// A reusable product ("resource"), unique by name (case-insensitive).
///
/// The unit price recorded here is the price at first reference; later
/// saves naming the same product do not update it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub uuid: String,
    pub name: String,
    pub unit_price: Option<Decimal>,
    pub created_date: DateTime<Utc>,
}

/// Per-account defaults, one row per account identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub uuid: String,
    pub name: Option<String>,
    pub currency: String,
    pub created_date: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountIdentity {
        AccountIdentity {
            user_id: "user-1".to_string(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        }
    }

    #[test]
    fn test_date_input_parse() {
        assert_eq!(DateInput::parse(""), DateInput::Missing);
        assert_eq!(DateInput::parse("  "), DateInput::Missing);
        assert_eq!(DateInput::parse("not-a-date"), DateInput::Invalid);
        assert_eq!(DateInput::parse("2026-13-01"), DateInput::Invalid);
        assert!(DateInput::parse("2026-08-24").is_valid());
    }

    #[test]
    fn test_new_draft_defaults() {
        let now = Utc::now();
        let draft = InvoiceDraft::new(&account(), None, now);

        assert_eq!(draft.date_issued, DateInput::Valid(now));
        assert_eq!(
            draft.date_due,
            DateInput::Valid(now + Duration::days(DEFAULT_DUE_IN_DAYS))
        );
        assert_eq!(draft.currency, DEFAULT_CURRENCY);
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].quantity, Some(Decimal::ONE));
        assert_eq!(draft.items[0].unit_price, Some(Decimal::ZERO));
        assert_eq!(draft.discount, Some(Decimal::ZERO));
        assert_eq!(draft.payee.name, "Ada");
    }

    #[test]
    fn test_new_draft_uses_settings() {
        let now = Utc::now();
        let settings = UserSettings {
            uuid: "user-1".to_string(),
            name: Some("Ada Consulting".to_string()),
            currency: "EUR".to_string(),
            created_date: now,
        };
        let draft = InvoiceDraft::new(&account(), Some(&settings), now);

        assert_eq!(draft.currency, "EUR");
        assert_eq!(draft.payee.name, "Ada Consulting");
    }

    #[test]
    fn test_draft_uuids_are_unique() {
        let now = Utc::now();
        let a = InvoiceDraft::new(&account(), None, now);
        let b = InvoiceDraft::new(&account(), None, now);
        assert_ne!(a.uuid, b.uuid);
        assert_ne!(a.items[0].resource_uuid, b.items[0].resource_uuid);
    }
}
