//! CLI command implementations.
//!
//! Each command is self-contained: it loads its own environment variables
//! and opens its own database connection.

pub mod geocode;
pub mod migrate;
pub mod seed;

/// Database URL from `FOODCART_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Option<String> {
    std::env::var("FOODCART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}
