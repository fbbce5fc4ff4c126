//! # Customer Statement Queries
//!
//! Per-customer receivables for the customers dashboard.
//!
//! Every known customer is listed, including those with no invoices yet.
//! Invoices denominated in a currency other than the account's display
//! currency are excluded from the sums but do not hide the customer.

use std::collections::HashMap;

use facture_core::money::Amount;

use crate::error::DbResult;
use crate::row::AgentRow;

use super::stages::load_invoice_financials;
use super::{CustomerStatement, ReportQueries};

impl ReportQueries {
    /// One statement per customer, ordered by name case-insensitively.
    pub async fn customer_statements(&self, currency: &str) -> DbResult<Vec<CustomerStatement>> {
        let agents: Vec<AgentRow> =
            sqlx::query_as("SELECT * FROM agent ORDER BY name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?;

        let mut statements: Vec<CustomerStatement> = Vec::with_capacity(agents.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(agents.len());
        for agent in agents {
            index.insert(agent.name.to_lowercase(), statements.len());
            statements.push(CustomerStatement {
                name: agent.name,
                email: agent.email,
                invoiced: Amount::zero(),
                received: Amount::zero(),
                owed: Amount::zero(),
            });
        }

        let invoices = load_invoice_financials(&self.pool).await?;
        for invoice in &invoices {
            // Foreign-currency invoices are listed nowhere in these sums.
            if invoice.currency != currency {
                continue;
            }
            // The snapshot name resolves to the master row the same way
            // the save path did: case-insensitively.
            let Some(position) = index.get(&invoice.customer.to_lowercase()) else {
                continue;
            };
            let statement = &mut statements[*position];
            let total = invoice.total();
            statement.invoiced += total;
            if invoice.is_paid() {
                statement.received += total;
            } else {
                statement.owed += total;
            }
        }

        Ok(statements)
    }

    /// Number of distinct customers with at least one invoice. Customers
    /// whose every invoice has been deleted don't count.
    pub async fn customer_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT payor_uuid) FROM invoice WHERE payor_uuid IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
