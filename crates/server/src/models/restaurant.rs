//! Restaurant and menu models.

use foodcart_core::{ProductId, RestaurantId};

/// A restaurant that can assemble orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    /// Street address, also the key into the geocode cache.
    pub address: String,
    pub contact_phone: String,
}

/// One (restaurant, product) pair of the menu matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub restaurant_id: RestaurantId,
    pub product_id: ProductId,
    pub availability: bool,
}
