//! # Product Repository
//!
//! Read access to the product master ("resource") table. Like customers,
//! product rows are created as a side effect of saving invoices.

use sqlx::SqlitePool;

use facture_core::types::Product;

use crate::error::DbResult;
use crate::row::ResourceRow;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, ordered by name case-insensitively.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ResourceRow> =
            sqlx::query_as("SELECT * FROM resource ORDER BY name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(ResourceRow::into_product).collect()
    }

    /// Looks a product up by name, case-insensitively.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let row: Option<ResourceRow> =
            sqlx::query_as("SELECT * FROM resource WHERE name = ?1 COLLATE NOCASE")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(ResourceRow::into_product).transpose()
    }
}
