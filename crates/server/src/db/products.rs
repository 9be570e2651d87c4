//! Product repository for database operations.

use foodcart_core::{CategoryId, ProductId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Product;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    category_id: Option<i32>,
    price: Decimal,
    description: String,
    special_offer: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            category_id: row.category_id.map(CategoryId::new),
            price: row.price,
            description: row.description,
            special_offer: row.special_offer,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Products at least one restaurant can currently make.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category_id, price, description, special_offer
            FROM product p
            WHERE EXISTS (
                SELECT 1 FROM restaurant_menu_item m
                WHERE m.product_id = p.id AND m.availability
            )
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// The whole catalogue, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category_id, price, description, special_offer
            FROM product
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products matching the given ids, in no particular order.
    ///
    /// Unknown ids are simply absent from the result; the caller decides
    /// whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category_id, price, description, special_offer
            FROM product
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
