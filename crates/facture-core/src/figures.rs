//! # Invoice Figures
//!
//! The financial computation pipeline for a single invoice.
//!
//! ## The Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal            = Σ (quantity × unit price)   over valid items     │
//! │  after discount      = max(0, subtotal − discount)                      │
//! │  tax                 = after discount × taxPercent / 100                │
//! │  total               = after discount + tax + shipping                  │
//! │                                                                         │
//! │  Ordering matters: discount is subtracted BEFORE tax is applied,        │
//! │  shipping is added AFTER tax. Discount and shipping are never taxed     │
//! │  or discounted relative to each other.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invalid Input Policy
//! Any missing/garbage operand contributes **zero** to the figures instead
//! of failing, so a half-filled form still shows a running total. The same
//! conditions are reported as validation errors at save time — computation
//! and validation are deliberately decoupled.

use serde::{Deserialize, Serialize};

use crate::money::Amount;
use crate::types::{DraftLineItem, InvoiceDraft, InvoiceLineItem};

// =============================================================================
// Figures
// =============================================================================

/// The derived monetary figures of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFigures {
    pub subtotal: Amount,
    pub subtotal_after_discount: Amount,
    pub tax: Amount,
    pub total: Amount,
}

/// Amount contributed by one draft line: quantity × unit price.
///
/// Lines with a missing or non-positive quantity, or a missing or
/// non-positive price, contribute zero.
pub fn item_amount(item: &DraftLineItem) -> Amount {
    let quantity = Amount::from_option(item.quantity);
    let unit_price = Amount::from_option(item.unit_price);

    if !quantity.is_positive() || !unit_price.is_positive() {
        return Amount::zero();
    }

    quantity.mul_rounded(unit_price)
}

/// Sum of all positive line amounts.
pub fn subtotal(items: &[DraftLineItem]) -> Amount {
    let mut subtotal = Amount::zero();
    for item in items {
        let amount = item_amount(item);
        if amount.is_positive() {
            subtotal += amount;
        }
    }
    subtotal
}

/// Subtotal minus discount, clamped at zero.
///
/// A discount larger than the subtotal never produces a negative base for
/// tax; it bottoms out at zero.
pub fn subtotal_after_discount(subtotal: Amount, discount: Option<Amount>) -> Amount {
    let discount = match discount {
        Some(d) if d.is_positive() => d,
        _ => Amount::zero(),
    };
    (subtotal - discount).clamp_negative()
}

/// Tax on the discounted subtotal. Zero when the percent is missing or
/// non-positive.
pub fn tax(tax_percent: Option<Amount>, subtotal_after_discount: Amount) -> Amount {
    match tax_percent {
        Some(pct) if pct.is_positive() => subtotal_after_discount.percent_of(pct),
        _ => Amount::zero(),
    }
}

/// Final total: discounted subtotal + tax + shipping.
pub fn total(subtotal_after_discount: Amount, tax: Amount, shipping: Option<Amount>) -> Amount {
    let shipping = match shipping {
        Some(s) if s.is_positive() => s,
        _ => Amount::zero(),
    };
    subtotal_after_discount + tax + shipping
}

/// Runs the whole pipeline over a draft.
pub fn compute_figures(draft: &InvoiceDraft) -> InvoiceFigures {
    let subtotal = subtotal(&draft.items);
    let after_discount =
        subtotal_after_discount(subtotal, draft.discount.map(Amount::new));
    let tax = tax(draft.tax_percent.map(Amount::new), after_discount);
    let total = total(after_discount, tax, draft.shipping.map(Amount::new));

    InvoiceFigures {
        subtotal,
        subtotal_after_discount: after_discount,
        tax,
        total,
    }
}

// =============================================================================
// Rollup Formulas (query layer)
// =============================================================================
//
// The dashboard rollups use the invoice's stored fields as-is, mirroring
// the aggregate views: no zero-clamp on the discounted subtotal and no
// positivity filtering of the operands. Persisted rows have already been
// through the save path, which writes zero for anything invalid.

/// Pre-tax invoice total used by the monthly sales series and rankings:
/// `subtotal − discount + shipping`.
pub fn total_excluding_tax(subtotal: Amount, discount: Amount, shipping: Amount) -> Amount {
    subtotal - discount + shipping
}

/// Tax-inclusive invoice total used by receivables and statements:
/// `(subtotal − discount) × (1 + taxPercent/100) + shipping`.
pub fn total_with_tax(
    subtotal: Amount,
    discount: Amount,
    tax_percent: Amount,
    shipping: Amount,
) -> Amount {
    let after_discount = subtotal - discount;
    after_discount + after_discount.percent_of(tax_percent) + shipping
}

/// Amount of one persisted line item: quantity × unit price.
pub fn stored_item_amount(item: &InvoiceLineItem) -> Amount {
    Amount::new(item.quantity).mul_rounded(Amount::new(item.unit_price))
}

// =============================================================================
// Unit Tests
// =============================================================================
