//! # Invoice List Query
//!
//! The invoices dashboard listing: every invoice with its derived
//! tax-inclusive total, newest issued first.

use crate::error::DbResult;

use super::stages::load_invoice_financials;
use super::{InvoiceSummary, ReportQueries};

impl ReportQueries {
    /// All invoices, newest issued first, each with its taxed total in
    /// the invoice's own currency (the list never converts).
    pub async fn list_invoices(&self) -> DbResult<Vec<InvoiceSummary>> {
        let invoices = load_invoice_financials(&self.pool).await?;

        Ok(invoices
            .into_iter()
            .map(|invoice| InvoiceSummary {
                total: invoice.total(),
                uuid: invoice.uuid,
                date_issued: invoice.date_issued,
                date_due: invoice.date_due,
                date_paid: invoice.date_paid,
                currency: invoice.currency,
                customer: invoice.customer,
            })
            .collect())
    }
}
