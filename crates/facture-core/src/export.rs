//! # Export Transforms
//!
//! Pure transforms from persisted invoices to renderer-facing shapes.
//!
//! ## Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Invoice + ordered line items                                           │
//! │       │                                                                 │
//! │       ├──► invoice_export() ──► InvoiceExport ──► PDF / document       │
//! │       │                              renderer (external)                │
//! │       │                                                                 │
//! │  InvoiceDraft                                                           │
//! │       │                                                                 │
//! │       └──► mail_link() ──► "mailto:..." URI ──► external mail client   │
//! │                                                                         │
//! │  Nothing here performs I/O or renders presentation markup.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::currency_symbol;
use crate::figures::compute_figures;
use crate::money::Amount;
use crate::types::{Invoice, InvoiceDraft, InvoiceLineItem, Party};

// =============================================================================
// Export Record
// =============================================================================

/// One line of the canonical export record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLineItem {
    pub item_number: i64,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Flat, renderer-agnostic record of a persisted invoice.
///
/// Consumed by both the printable-document generator and the mail-link
/// generator; neither needs to know the relational shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceExport {
    pub uuid: String,
    pub date_issued: DateTime<Utc>,
    pub date_due: Option<DateTime<Utc>>,
    pub date_paid: Option<DateTime<Utc>>,
    pub currency: String,
    pub discount: Decimal,
    pub tax_percent: Decimal,
    pub shipping: Decimal,
    pub note: Option<String>,
    pub payee: Party,
    pub payor: Party,
    pub items: Vec<ExportLineItem>,
}

/// Maps a persisted invoice and its ordered line items into the canonical
/// export record. Pure, no I/O.
pub fn invoice_export(invoice: &Invoice, items: &[InvoiceLineItem]) -> InvoiceExport {
    InvoiceExport {
        uuid: invoice.uuid.clone(),
        date_issued: invoice.date_issued,
        date_due: invoice.date_due,
        date_paid: invoice.date_paid,
        currency: invoice.currency.clone(),
        discount: invoice.discount,
        tax_percent: invoice.tax_percent,
        shipping: invoice.shipping,
        note: invoice.note.clone(),
        payee: invoice.payee.clone(),
        payor: invoice.payor.clone(),
        items: items
            .iter()
            .map(|item| ExportLineItem {
                item_number: item.item_number,
                name: item.item_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
    }
}

// =============================================================================
// Mail Link
// =============================================================================

/// Builds a pre-filled `mailto:` URI for a draft invoice.
///
/// - recipient: payor email (empty when unknown — user picks one)
/// - subject:   "Invoice from {payee} for {symbol}{total}"
/// - body:      greeting, total with optional due date, one line per item
///              as `name (qty x price)`, then the note or a thank-you
///
/// Lines with negative or missing quantity/price are skipped; zero-valued
/// lines are kept (free items still appear on the invoice).
///
/// Purely textual — nothing is sent.
pub fn mail_link(draft: &InvoiceDraft) -> String {
    let figures = compute_figures(draft);
    let symbol = currency_symbol(&draft.currency);
    let total = format!("{}{}", symbol, figures.total.display());

    let due = match draft.date_due.as_date() {
        Some(date) => format!(" due {}", date.format("%Y-%m-%d")),
        None => String::new(),
    };

    let mut line_items = String::new();
    for item in &draft.items {
        let (quantity, unit_price) = match (item.quantity, item.unit_price) {
            (Some(q), Some(p)) if q >= Decimal::ZERO && p >= Decimal::ZERO => (q, p),
            _ => continue,
        };
        line_items.push_str(&format!(
            "{} ({} x {}{})\n",
            item.name,
            quantity.normalize(),
            symbol,
            Amount::new(unit_price).display()
        ));
    }

    let note = if draft.note.is_empty() {
        "Thank you!"
    } else {
        &draft.note
    };

    let subject = format!("Invoice from {} for {}", draft.payee.name, total);
    let body = format!(
        "Hi {},\n\nHere is an invoice for {}{}.\n\n{}\n{}\n\n{}",
        draft.payor.name, total, due, line_items, note, draft.payee.name
    );

    format!(
        "mailto:{}?subject={}&body={}",
        draft.payor.email.as_deref().unwrap_or(""),
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountIdentity, DateInput, DraftLineItem};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn draft() -> InvoiceDraft {
        let account = AccountIdentity {
            user_id: "user-1".to_string(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        };
        let mut draft = InvoiceDraft::new(&account, None, Utc::now());
        draft.payor.name = "Acme Corp".to_string();
        draft.payor.email = Some("billing@acme.example".to_string());
        draft.items[0].name = "Consulting".to_string();
        draft.items[0].quantity = Some(dec("2"));
        draft.items[0].unit_price = Some(dec("10"));
        draft
    }

    #[test]
    fn test_invoice_export_is_flat_and_ordered() {
        let now = Utc::now();
        let invoice = Invoice {
            uuid: "inv-1".to_string(),
            date_issued: now,
            date_due: None,
            date_paid: None,
            currency: "USD".to_string(),
            discount: dec("5"),
            tax_percent: dec("10"),
            shipping: dec("2"),
            note: Some("Net 28".to_string()),
            payee: Party {
                uuid: "user-1".to_string(),
                name: "Ada".to_string(),
                email: None,
            },
            payor: Party {
                uuid: "agent-1".to_string(),
                name: "Acme Corp".to_string(),
                email: None,
            },
            created_date: now,
        };
        let items = vec![
            InvoiceLineItem {
                invoice_uuid: "inv-1".to_string(),
                item_number: 0,
                item_name: "Consulting".to_string(),
                resource_uuid: "res-1".to_string(),
                quantity: dec("2"),
                unit_price: dec("10"),
                created_date: now,
            },
            InvoiceLineItem {
                invoice_uuid: "inv-1".to_string(),
                item_number: 1,
                item_name: "Hosting".to_string(),
                resource_uuid: "res-2".to_string(),
                quantity: dec("1"),
                unit_price: dec("25"),
                created_date: now,
            },
        ];

        let export = invoice_export(&invoice, &items);
        assert_eq!(export.uuid, "inv-1");
        assert_eq!(export.items.len(), 2);
        assert_eq!(export.items[0].item_number, 0);
        assert_eq!(export.items[1].name, "Hosting");
        assert_eq!(export.discount, dec("5"));
    }

    #[test]
    fn test_mail_link_shape() {
        let mut d = draft();
        d.date_due = DateInput::Missing;
        let link = mail_link(&d);

        assert!(link.starts_with("mailto:billing@acme.example?subject="));
        // "Invoice from Ada for $20.00" percent-encoded
        assert!(link.contains("Invoice%20from%20Ada%20for%20%2420.00"));
        // body: "Consulting (2 x $10.00)"
        assert!(link.contains("Consulting%20%282%20x%20%2410.00%29"));
        // default thank-you line when the note is empty
        assert!(link.contains("Thank%20you%21"));
    }

    #[test]
    fn test_mail_link_skips_invalid_lines_keeps_zero() {
        let mut d = draft();
        d.items.push(DraftLineItem {
            resource_uuid: "r2".to_string(),
            name: "Broken".to_string(),
            quantity: None,
            unit_price: Some(dec("5")),
        });
        d.items.push(DraftLineItem {
            resource_uuid: "r3".to_string(),
            name: "Negative".to_string(),
            quantity: Some(dec("-1")),
            unit_price: Some(dec("5")),
        });
        d.items.push(DraftLineItem {
            resource_uuid: "r4".to_string(),
            name: "Freebie".to_string(),
            quantity: Some(dec("0")),
            unit_price: Some(dec("0")),
        });

        let link = mail_link(&d);
        assert!(!link.contains("Broken"));
        assert!(!link.contains("Negative"));
        assert!(link.contains("Freebie"));
    }

    #[test]
    fn test_mail_link_includes_due_date_and_note() {
        let mut d = draft();
        d.date_due = DateInput::parse("2026-09-21");
        d.note = "See you next month".to_string();

        let link = mail_link(&d);
        assert!(link.contains(&urlencoding::encode(" due 2026-09-21").into_owned()));
        assert!(link.contains(&urlencoding::encode("See you next month").into_owned()));
        assert!(!link.contains("Thank%20you"));
    }
}
