//! # facture-core: Pure Business Logic for Facture
//!
//! This crate is the **heart** of Facture. It contains all invoice business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Facture Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI Host (out of this repo)                   │   │
//! │  │    Invoice form ──► Dashboards ──► Account ──► Mail/PDF        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ facture-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  figures  │  │ validation│  │   │
//! │  │   │  Invoice  │  │  Amount   │  │ subtotal  │  │   rules   │  │   │
//! │  │   │   Draft   │  │  rounding │  │ tax/total │  │  err map  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    facture-db (Database Layer)                  │   │
//! │  │            SQLite queries, schema, repositories, backup         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Invoice, InvoiceDraft, Customer, Product, ...)
//! - [`money`] - `Amount` decimal type (no floating point!)
//! - [`currency`] - Currency code to display symbol mapping
//! - [`figures`] - Invoice figure computation (subtotal → tax → total)
//! - [`validation`] - Draft invoice validation with field-keyed errors
//! - [`export`] - Canonical export record and mailto: link generation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Decimal Money**: All monetary values use `rust_decimal` (never f64)
//! 4. **Explicit Errors**: Validation returns a structured error object, never panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod currency;
pub mod export;
pub mod figures;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use figures::InvoiceFigures;
pub use money::Amount;
pub use types::*;
pub use validation::{validate_invoice, ValidationErrors};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency assumed when an account has not chosen one yet.
pub const DEFAULT_CURRENCY: &str = "USD";

/// New invoices fall due this many days after the issue date.
pub const DEFAULT_DUE_IN_DAYS: i64 = 28;

/// Internal precision carried through money arithmetic (fractional digits).
///
/// Intermediate products (quantity × price, percentage tax) are rounded to
/// this scale; only final display rounding drops to [`DISPLAY_SCALE`].
pub const INTERNAL_SCALE: u32 = 10;

/// Fractional digits shown to the user (and used in mail bodies).
pub const DISPLAY_SCALE: u32 = 2;
