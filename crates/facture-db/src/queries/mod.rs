//! # Aggregate Query Library
//!
//! Read-only financial rollups backing the dashboards.
//!
//! ## Three-Layer Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1  per line item      quantity × unit price                      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Layer 2  per invoice        subtotal → discount → tax → shipping      │
//! │     │                        (taxed and untaxed variants)              │
//! │     ▼                                                                   │
//! │  Layer 3  rollup             by month / customer / product /           │
//! │                              paid state                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQL does the joining and filtering; the folds themselves run in Rust on
//! `Amount` so every layer shares the exact decimal arithmetic of the
//! single-invoice pipeline. See [`stages`] for the shared layers 1 and 2.
//!
//! ## Currency Rule
//! Sums never mix currencies. Every rollup takes the account's display
//! currency and excludes invoices denominated in any other; the customer
//! statements still list such customers, with the foreign amounts left out
//! of their sums.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use facture_core::money::Amount;

pub mod customers;
pub mod dashboard;
pub mod invoices;
pub mod stages;

/// Number of named entries in a ranking; everything past them folds into
/// a single "Others" bucket.
pub const RANKING_SIZE: usize = 5;

/// Label of the ranking remainder bucket.
pub const OTHERS_LABEL: &str = "Others";

// =============================================================================
// Result Shapes
// =============================================================================

/// One month of the sales series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    /// Abbreviated month name ("Jan", "Feb", ...).
    pub label: String,
    /// Pre-tax sales issued that month.
    pub total: Amount,
}

/// One entry of a top-customer or top-product ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSales {
    pub name: String,
    pub total: Amount,
}

/// The receivables headline figures, all tax-inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableTotals {
    /// Everything ever invoiced.
    pub invoiced: Amount,
    /// Invoices with a paid date.
    pub received: Amount,
    /// Invoices without a paid date.
    pub owed: Amount,
    /// Unpaid invoices whose due date has passed.
    pub overdue: Amount,
}

/// Per-customer receivables line on the customers dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStatement {
    pub name: String,
    pub email: Option<String>,
    pub invoiced: Amount,
    pub received: Amount,
    pub owed: Amount,
}

/// One row of the invoice list, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub uuid: String,
    pub date_issued: chrono::DateTime<chrono::Utc>,
    pub date_due: Option<chrono::DateTime<chrono::Utc>>,
    pub date_paid: Option<chrono::DateTime<chrono::Utc>>,
    pub currency: String,
    pub customer: String,
    /// Tax-inclusive total, in the invoice's own currency.
    pub total: Amount,
}

// =============================================================================
// Query Handle
// =============================================================================

/// Aggregate report queries. Obtained from [`crate::Database::reports`].
#[derive(Debug, Clone)]
pub struct ReportQueries {
    pub(crate) pool: SqlitePool,
}

impl ReportQueries {
    /// Creates a new ReportQueries handle.
    pub fn new(pool: SqlitePool) -> Self {
        ReportQueries { pool }
    }
}
