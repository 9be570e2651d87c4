//! Staff-facing views: the order queue and the availability matrix.

use axum::{Json, extract::State};
use foodcart_core::{OrderId, PhoneNumber, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{OrderRepository, ProductRepository, RestaurantRepository};
use crate::error::Result;
use crate::geo::Distance;
use crate::matching::MenuIndex;
use crate::models::{OrderWithLines, Product, Restaurant};
use crate::services::RankedOrder;
use crate::state::AppState;

/// One restaurant able to make an order, with its distance to the
/// delivery address.
#[derive(Debug, Serialize)]
pub struct CandidateView {
    pub restaurant: String,
    pub distance: Distance,
}

/// One order in the staff queue.
#[derive(Debug, Serialize)]
pub struct StaffOrderView {
    pub id: OrderId,
    pub status: String,
    pub firstname: String,
    pub lastname: String,
    pub phonenumber: Option<String>,
    pub payment: String,
    pub address: String,
    pub comment: String,
    pub total_price: Decimal,
    pub item_count: usize,
    pub available_restaurants: Vec<CandidateView>,
}

/// Active orders annotated with ranked fulfillable restaurants.
///
/// GET /staff/orders
///
/// Orders come out ascending by status code, then by registration time.
/// Within each order the candidates are sorted nearest first, restaurants
/// with an undetermined distance last.
///
/// # Errors
///
/// Returns `AppError::Geocode` (502 for provider failures) when resolving
/// any new address in the view fails hard; the whole view fails rather
/// than serving a partial ranking.
pub async fn orders(State(state): State<AppState>) -> Result<Json<Vec<StaffOrderView>>> {
    let pool = state.pool();
    let active = OrderRepository::new(pool).list_active_with_lines().await?;
    let repo = RestaurantRepository::new(pool);
    let restaurants = repo.list_all().await?;
    let menu = MenuIndex::from_entries(repo.menu_entries().await?);

    let mut views = Vec::with_capacity(active.len());
    for order in &active {
        let ranked = state.ranking().rank(order, &restaurants, &menu).await?;
        views.push(order_view(order, ranked));
    }
    Ok(Json(views))
}

fn order_view(order: &OrderWithLines, ranked: RankedOrder) -> StaffOrderView {
    StaffOrderView {
        id: order.order.id,
        status: order.order.status.to_string(),
        firstname: order.order.firstname.clone(),
        lastname: order.order.lastname.clone(),
        phonenumber: order
            .order
            .phonenumber
            .as_ref()
            .map(PhoneNumber::national_display),
        payment: order.order.payment.to_string(),
        address: order.order.address.clone(),
        comment: order.order.comment.clone(),
        total_price: ranked.total_price,
        item_count: ranked.item_count,
        available_restaurants: ranked
            .candidates
            .into_iter()
            .map(|candidate| CandidateView {
                restaurant: candidate.restaurant.name,
                distance: candidate.distance,
            })
            .collect(),
    }
}

/// Availability of one product across all restaurants.
#[derive(Debug, Serialize)]
pub struct ProductAvailabilityView {
    pub id: ProductId,
    pub name: String,
    /// One flag per restaurant, aligned with the `restaurants` header.
    pub availability: Vec<bool>,
}

/// The per-restaurant availability matrix.
#[derive(Debug, Serialize)]
pub struct AvailabilityMatrix {
    /// Restaurant names, ordered by name; the column order of every row.
    pub restaurants: Vec<String>,
    pub products: Vec<ProductAvailabilityView>,
}

/// Which restaurant can make which product.
///
/// GET /staff/products
///
/// # Errors
///
/// Returns `AppError::Database` if a query fails.
pub async fn products(State(state): State<AppState>) -> Result<Json<AvailabilityMatrix>> {
    let pool = state.pool();
    let repo = RestaurantRepository::new(pool);
    let restaurants = repo.list_all().await?;
    let menu = MenuIndex::from_entries(repo.menu_entries().await?);
    let products = ProductRepository::new(pool).list_all().await?;

    Ok(Json(availability_matrix(&restaurants, &products, &menu)))
}

fn availability_matrix(
    restaurants: &[Restaurant],
    products: &[Product],
    menu: &MenuIndex,
) -> AvailabilityMatrix {
    AvailabilityMatrix {
        restaurants: restaurants.iter().map(|r| r.name.clone()).collect(),
        products: products
            .iter()
            .map(|product| ProductAvailabilityView {
                id: product.id,
                name: product.name.clone(),
                availability: restaurants
                    .iter()
                    .map(|r| menu.is_available(r.id, product.id))
                    .collect(),
            })
            .collect(),
    }
}
