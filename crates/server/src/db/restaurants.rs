//! Restaurant repository for database operations.

use foodcart_core::{ProductId, RestaurantId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{MenuEntry, Restaurant};

#[derive(Debug, sqlx::FromRow)]
struct RestaurantRow {
    id: i32,
    name: String,
    address: String,
    contact_phone: String,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Self {
            id: RestaurantId::new(row.id),
            name: row.name,
            address: row.address,
            contact_phone: row.contact_phone,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MenuEntryRow {
    restaurant_id: i32,
    product_id: i32,
    availability: bool,
}

impl From<MenuEntryRow> for MenuEntry {
    fn from(row: MenuEntryRow) -> Self {
        Self {
            restaurant_id: RestaurantId::new(row.restaurant_id),
            product_id: ProductId::new(row.product_id),
            availability: row.availability,
        }
    }
}

/// Repository for restaurant database operations.
pub struct RestaurantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RestaurantRepository<'a> {
    /// Create a new restaurant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All restaurants, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Restaurant>, RepositoryError> {
        let rows = sqlx::query_as::<_, RestaurantRow>(
            r"
            SELECT id, name, address, contact_phone
            FROM restaurant
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Restaurant::from).collect())
    }

    /// Every row of the menu matrix, available or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn menu_entries(&self) -> Result<Vec<MenuEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, MenuEntryRow>(
            r"
            SELECT restaurant_id, product_id, availability
            FROM restaurant_menu_item
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(MenuEntry::from).collect())
    }
}
