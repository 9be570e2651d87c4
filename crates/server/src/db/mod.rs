//! Database operations for the foodcart `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `location` - Persistent geocode cache (address is the primary key)
//! - `restaurant`, `product_category`, `product` - The catalogue
//! - `restaurant_menu_item` - Which restaurant can make which product
//! - `customer_order`, `order_item` - Orders with captured unit prices
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p foodcart-cli -- migrate
//! ```

pub mod locations;
pub mod orders;
pub mod products;
pub mod restaurants;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use locations::PgLocationStore;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use restaurants::RestaurantRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
