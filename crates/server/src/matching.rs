//! Availability matching: which restaurants can assemble an order.

use std::collections::HashSet;

use foodcart_core::{ProductId, RestaurantId};

use crate::models::{MenuEntry, Restaurant};

/// Lookup index over the menu matrix.
///
/// Built once per request from all menu rows. Membership means "this
/// restaurant currently lists this product as available"; a missing pair
/// (unknown product, unknown restaurant, or a row with availability false)
/// uniformly means the restaurant cannot make it.
pub struct MenuIndex {
    available: HashSet<(RestaurantId, ProductId)>,
}

impl MenuIndex {
    /// Build the index from menu rows, keeping only available pairs.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = MenuEntry>) -> Self {
        let available = entries
            .into_iter()
            .filter(|entry| entry.availability)
            .map(|entry| (entry.restaurant_id, entry.product_id))
            .collect();
        Self { available }
    }

    /// Whether a restaurant currently offers a product.
    #[must_use]
    pub fn is_available(&self, restaurant: RestaurantId, product: ProductId) -> bool {
        self.available.contains(&(restaurant, product))
    }

    /// Restaurants able to assemble every one of `products`.
    ///
    /// Duplicates in `products` are harmless. An empty list is satisfied by
    /// every restaurant, and the result keeps the order of `restaurants`.
    #[must_use]
    pub fn fulfillable_restaurants<'a>(
        &self,
        products: &[ProductId],
        restaurants: &'a [Restaurant],
    ) -> Vec<&'a Restaurant> {
        let wanted: HashSet<ProductId> = products.iter().copied().collect();
        restaurants
            .iter()
            .filter(|restaurant| {
                wanted
                    .iter()
                    .all(|product| self.is_available(restaurant.id, *product))
            })
            .collect()
    }
}
