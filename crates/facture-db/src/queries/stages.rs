//! # Shared Aggregation Stages
//!
//! Layers 1 and 2 of the rollup pipeline: the joined fetch and the
//! per-invoice fold every dashboard query starts from.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;

use facture_core::figures::{total_excluding_tax, total_with_tax};
use facture_core::money::Amount;

use crate::error::DbResult;
use crate::row::{parse_amount, parse_date};

/// One invoice/line-item pair from the joined fetch. Item columns are NULL
/// for an invoice with no items (LEFT JOIN).
#[derive(Debug, Clone, FromRow)]
pub(crate) struct InvoiceLineRow {
    pub uuid: String,
    pub date_issued: String,
    pub date_due: Option<String>,
    pub date_paid: Option<String>,
    pub currency: String,
    pub payor_name: Option<String>,
    pub payor_email: Option<String>,
    pub discount: String,
    pub tax_percent: String,
    pub shipping: String,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
}

/// Layer-2 output: one invoice with its line items already folded into a
/// subtotal.
#[derive(Debug, Clone)]
pub struct InvoiceFinancials {
    pub uuid: String,
    pub date_issued: DateTime<Utc>,
    pub date_due: Option<DateTime<Utc>>,
    pub date_paid: Option<DateTime<Utc>>,
    pub currency: String,
    pub customer: String,
    pub customer_email: Option<String>,
    pub discount: Amount,
    pub tax_percent: Amount,
    pub shipping: Amount,
    pub subtotal: Amount,
}

impl InvoiceFinancials {
    /// Tax-inclusive invoice total (receivables, statements, listing).
    pub fn total(&self) -> Amount {
        total_with_tax(self.subtotal, self.discount, self.tax_percent, self.shipping)
    }

    /// Pre-tax invoice total (sales series and rankings).
    pub fn sales_total(&self) -> Amount {
        total_excluding_tax(self.subtotal, self.discount, self.shipping)
    }

    pub fn is_paid(&self) -> bool {
        self.date_paid.is_some()
    }

    /// Unpaid and past its due date at `now`. Invoices without a due date
    /// are never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_paid() && self.date_due.is_some_and(|due| due < now)
    }
}

/// Layer 1: fetches every invoice joined with its line items, newest
/// issued first.
pub(crate) async fn fetch_invoice_lines(pool: &SqlitePool) -> DbResult<Vec<InvoiceLineRow>> {
    let rows = sqlx::query_as::<_, InvoiceLineRow>(
        "SELECT i.uuid, i.date_issued, i.date_due, i.date_paid, i.currency,
                i.payor_name, i.payor_email,
                i.discount, i.tax_percent, i.shipping,
                it.quantity, it.unit_price
         FROM invoice i
         LEFT JOIN invoice_item it ON it.invoice_uuid = i.uuid
         ORDER BY i.date_issued DESC, i.created_date DESC, i.uuid, it.item_number",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Layer 2: folds joined rows into one [`InvoiceFinancials`] per invoice,
/// preserving the fetch order.
pub(crate) fn invoice_financials(rows: Vec<InvoiceLineRow>) -> DbResult<Vec<InvoiceFinancials>> {
    let mut invoices: Vec<InvoiceFinancials> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let position = match index.get(&row.uuid) {
            Some(position) => *position,
            None => {
                invoices.push(InvoiceFinancials {
                    date_issued: parse_date(&row.date_issued)?,
                    date_due: row.date_due.as_deref().map(parse_date).transpose()?,
                    date_paid: row.date_paid.as_deref().map(parse_date).transpose()?,
                    currency: row.currency.clone(),
                    customer: row.payor_name.clone().unwrap_or_default(),
                    customer_email: row.payor_email.clone(),
                    discount: Amount::new(parse_amount(&row.discount)),
                    tax_percent: Amount::new(parse_amount(&row.tax_percent)),
                    shipping: Amount::new(parse_amount(&row.shipping)),
                    subtotal: Amount::zero(),
                    uuid: row.uuid.clone(),
                });
                index.insert(row.uuid.clone(), invoices.len() - 1);
                invoices.len() - 1
            }
        };

        // Itemless invoices surface as one row with NULL item columns.
        if let (Some(quantity), Some(unit_price)) = (&row.quantity, &row.unit_price) {
            let line = Amount::new(parse_amount(quantity))
                .mul_rounded(Amount::new(parse_amount(unit_price)));
            invoices[position].subtotal += line;
        }
    }

    Ok(invoices)
}

/// Convenience: layers 1 and 2 together.
pub(crate) async fn load_invoice_financials(
    pool: &SqlitePool,
) -> DbResult<Vec<InvoiceFinancials>> {
    let rows = fetch_invoice_lines(pool).await?;
    invoice_financials(rows)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(uuid: &str, quantity: Option<&str>, unit_price: Option<&str>) -> InvoiceLineRow {
        InvoiceLineRow {
            uuid: uuid.to_string(),
            date_issued: "2026-08-01T00:00:00.000Z".to_string(),
            date_due: None,
            date_paid: None,
            currency: "USD".to_string(),
            payor_name: Some("Acme".to_string()),
            payor_email: None,
            discount: "0".to_string(),
            tax_percent: "0".to_string(),
            shipping: "0".to_string(),
            quantity: quantity.map(str::to_string),
            unit_price: unit_price.map(str::to_string),
        }
    }

    #[test]
    fn test_fold_groups_by_invoice_and_keeps_order() {
        let rows = vec![
            line("b", Some("2"), Some("10")),
            line("b", Some("1"), Some("5")),
            line("a", Some("3"), Some("3")),
        ];
        let invoices = invoice_financials(rows).unwrap();

        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].uuid, "b");
        assert_eq!(invoices[0].subtotal, Amount::parse("25"));
        assert_eq!(invoices[1].subtotal, Amount::parse("9"));
    }

    #[test]
    fn test_itemless_invoice_has_zero_subtotal() {
        let invoices = invoice_financials(vec![line("a", None, None)]).unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].subtotal, Amount::zero());
    }

    #[test]
    fn test_overdue_requires_due_date() {
        let now = Utc::now();
        let mut invoice = invoice_financials(vec![line("a", None, None)]).unwrap().remove(0);
        assert!(!invoice.is_overdue(now));

        invoice.date_due = Some(now - chrono::Duration::days(1));
        assert!(invoice.is_overdue(now));

        invoice.date_paid = Some(now);
        assert!(!invoice.is_overdue(now));
    }
}
