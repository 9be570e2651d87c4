//! Public catalogue endpoints.

use axum::{Json, extract::State};
use foodcart_core::{CategoryId, ProductId, RestaurantId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{ProductRepository, RestaurantRepository};
use crate::error::Result;
use crate::models::{Product, Restaurant};
use crate::state::AppState;

/// View of one product in the public catalogue.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub category: Option<CategoryId>,
    pub price: Decimal,
    pub description: String,
    pub special_offer: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category_id,
            price: product.price,
            description: product.description,
            special_offer: product.special_offer,
        }
    }
}

/// View of one restaurant.
#[derive(Debug, Serialize)]
pub struct RestaurantView {
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
    pub contact_phone: String,
}

impl From<Restaurant> for RestaurantView {
    fn from(restaurant: Restaurant) -> Self {
        Self {
            id: restaurant.id,
            name: restaurant.name,
            address: restaurant.address,
            contact_phone: restaurant.contact_phone,
        }
    }
}

/// Products at least one restaurant can currently make.
///
/// GET /api/products
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn products(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = ProductRepository::new(state.pool()).list_available().await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// All restaurants, ordered by name.
///
/// GET /api/restaurants
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn restaurants(State(state): State<AppState>) -> Result<Json<Vec<RestaurantView>>> {
    let restaurants = RestaurantRepository::new(state.pool()).list_all().await?;
    Ok(Json(
        restaurants.into_iter().map(RestaurantView::from).collect(),
    ))
}
