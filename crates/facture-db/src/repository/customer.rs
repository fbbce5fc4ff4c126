//! # Customer Repository
//!
//! Read access to the customer master ("agent") table. Customer rows are
//! created as a side effect of saving invoices; there is no standalone
//! create path.

use sqlx::SqlitePool;

use facture_core::types::Customer;

use crate::error::DbResult;
use crate::row::AgentRow;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// All customers, ordered by name case-insensitively (autocomplete
    /// and the customers dashboard both want this order).
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let rows: Vec<AgentRow> =
            sqlx::query_as("SELECT * FROM agent ORDER BY name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(AgentRow::into_customer).collect()
    }

    /// Looks a customer up by name, case-insensitively.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Customer>> {
        let row: Option<AgentRow> =
            sqlx::query_as("SELECT * FROM agent WHERE name = ?1 COLLATE NOCASE")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(AgentRow::into_customer).transpose()
    }
}
