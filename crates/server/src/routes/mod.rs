//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health             - Liveness check (defined in main)
//! GET  /health/ready       - Readiness check, verifies the database
//!
//! # Public API
//! POST /api/orders         - Submit an order
//! GET  /api/products       - Products at least one restaurant can make
//! GET  /api/restaurants    - All restaurants
//!
//! # Staff
//! GET  /staff/orders       - Active orders with ranked fulfillable restaurants
//! GET  /staff/products     - Per-restaurant availability matrix
//! ```

pub mod catalogue;
pub mod orders;
pub mod staff;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the public API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::submit))
        .route("/products", get(catalogue::products))
        .route("/restaurants", get(catalogue::restaurants))
}

/// Create the staff routes router.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(staff::orders))
        .route("/products", get(staff::products))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api", api_routes())
        .nest("/staff", staff_routes())
}
