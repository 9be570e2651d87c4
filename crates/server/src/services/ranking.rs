//! Order ranking: which restaurants can make an order, sorted by how far
//! they are from the delivery address.
//!
//! Ranking never blocks an order on geography. A restaurant with an
//! unresolvable address still appears as a candidate, just with an
//! undetermined distance at the end of the list.

use foodcart_core::ProductId;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::geo::{Distance, GeocodeCache, GeocodeError};
use crate::matching::MenuIndex;
use crate::models::{OrderLine, OrderWithLines, Restaurant};

/// One fulfillable restaurant annotated with its distance to the delivery
/// address.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub restaurant: Restaurant,
    pub distance: Distance,
}

/// Annotations the staff view attaches to each order.
#[derive(Debug, Clone)]
pub struct RankedOrder {
    /// Restaurants able to make every ordered product, nearest first,
    /// unknown distances last.
    pub candidates: Vec<RankedCandidate>,
    /// Number of distinct line items, not summed quantities.
    pub item_count: usize,
    /// Sum of quantity times the unit price captured at order time.
    pub total_price: Decimal,
}

/// Combines availability matching, geocoding and distance into the ranked
/// candidate list for an order.
#[derive(Clone)]
pub struct OrderRankingService {
    geocode: GeocodeCache,
}

impl OrderRankingService {
    #[must_use]
    pub const fn new(geocode: GeocodeCache) -> Self {
        Self { geocode }
    }

    /// Annotate one order with totals and its ranked candidate restaurants.
    ///
    /// The candidate sort is stable: equal distances keep the caller's
    /// restaurant order.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when resolving the delivery address or a
    /// candidate restaurant address required a provider call and that call
    /// failed hard. Addresses the provider does not know are not errors.
    #[instrument(skip_all, fields(order_id = %order.order.id))]
    pub async fn rank(
        &self,
        order: &OrderWithLines,
        restaurants: &[Restaurant],
        menu: &MenuIndex,
    ) -> Result<RankedOrder, GeocodeError> {
        let product_ids: Vec<ProductId> = order.lines.iter().map(|line| line.product_id).collect();
        let fulfillable = menu.fulfillable_restaurants(&product_ids, restaurants);

        let delivery = self.geocode.resolve(&order.order.address).await?;
        let delivery_coords = delivery.coordinates();

        let mut candidates = Vec::with_capacity(fulfillable.len());
        for restaurant in fulfillable {
            let outlet = self.geocode.resolve(&restaurant.address).await?;
            candidates.push(RankedCandidate {
                restaurant: restaurant.clone(),
                distance: Distance::between(delivery_coords, outlet.coordinates()),
            });
        }
        candidates.sort_by(|a, b| a.distance.cmp(&b.distance));

        Ok(RankedOrder {
            candidates,
            item_count: order.lines.len(),
            total_price: total_price(&order.lines),
        })
    }
}

/// Sum of quantity times captured unit price over the lines.
#[must_use]
pub fn total_price(lines: &[OrderLine]) -> Decimal {
    lines
        .iter()
        .map(|line| Decimal::from(line.quantity) * line.unit_price)
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use foodcart_core::{OrderId, OrderStatus, PaymentMethod, RestaurantId};
    use secrecy::SecretString;

    use super::*;
    use crate::config::GeocoderConfig;
    use crate::geo::cache::testing::InMemoryLocationStore;
    use crate::geo::{Coordinates, GeocoderClient};
    use crate::models::{Location, MenuEntry, Order};

    /// Cache whose provider is never reachable; every test address must be
    /// seeded, which also proves ranking runs entirely off the store.
    fn cache_over(store: Arc<InMemoryLocationStore>) -> GeocodeCache {
        let geocoder = GeocoderClient::new(&GeocoderConfig {
            base_url: "http://127.0.0.1:9/".to_owned(),
            api_key: SecretString::from("k-test"),
            timeout_secs: 1,
        })
        .unwrap();
        GeocodeCache::new(store, geocoder)
    }

    fn restaurant(id: i32, name: &str, address: &str) -> Restaurant {
        Restaurant {
            id: RestaurantId::new(id),
            name: name.to_owned(),
            address: address.to_owned(),
            contact_phone: String::new(),
        }
    }

    fn entry(restaurant_id: i32, product_id: i32, availability: bool) -> MenuEntry {
        MenuEntry {
            restaurant_id: RestaurantId::new(restaurant_id),
            product_id: ProductId::new(product_id),
            availability,
        }
    }

    fn order_to(address: &str, lines: Vec<OrderLine>) -> OrderWithLines {
        OrderWithLines {
            order: Order {
                id: OrderId::new(1),
                firstname: "Ivan".to_owned(),
                lastname: "Petrov".to_owned(),
                address: address.to_owned(),
                phonenumber: None,
                comment: String::new(),
                status: OrderStatus::Accepted,
                payment: PaymentMethod::Card,
                registered_at: Utc::now(),
                called_at: None,
                delivered_at: None,
            },
            lines,
        }
    }

    fn line(product_id: i32, quantity: i32, unit_price: Decimal) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(product_id),
            quantity,
            unit_price,
        }
    }

    async fn seed(store: &InMemoryLocationStore, address: &str, lat: f64, lon: f64) {
        store
            .seed(Location::resolved(
                address,
                Coordinates {
                    latitude: lat,
                    longitude: lon,
                },
                Utc::now(),
            ))
            .await;
    }

    #[tokio::test]
    async fn test_ranks_only_restaurants_stocking_every_product() {
        let store = Arc::new(InMemoryLocationStore::new());
        seed(&store, "Delivery st 1", 55.75, 37.61).await;
        seed(&store, "A st 1", 55.76, 37.62).await;
        seed(&store, "B st 2", 55.77, 37.63).await;
        let service = OrderRankingService::new(cache_over(store));

        // A makes bread and cheese, B only bread.
        let restaurants = vec![restaurant(1, "A", "A st 1"), restaurant(2, "B", "B st 2")];
        let menu =
            MenuIndex::from_entries([entry(1, 10, true), entry(1, 11, true), entry(2, 10, true)]);
        let order = order_to(
            "Delivery st 1",
            vec![
                line(10, 1, Decimal::new(3000, 2)),
                line(11, 2, Decimal::new(15000, 2)),
            ],
        );

        let ranked = service.rank(&order, &restaurants, &menu).await.unwrap();
        assert_eq!(ranked.item_count, 2);
        assert_eq!(ranked.total_price, Decimal::new(33000, 2));
        assert_eq!(ranked.candidates.len(), 1);
        assert_eq!(ranked.candidates.first().unwrap().restaurant.name, "A");
        assert_eq!(
            ranked.candidates.first().unwrap().distance,
            Distance::Known(1.28)
        );
    }

    #[tokio::test]
    async fn test_candidates_sorted_nearest_first_undetermined_last() {
        let store = Arc::new(InMemoryLocationStore::new());
        seed(&store, "Delivery st 1", 55.75, 37.61).await;
        seed(&store, "Far st", 55.90, 37.61).await;
        seed(&store, "Near st", 55.76, 37.61).await;
        seed(&store, "Mid st", 55.80, 37.61).await;
        // Settled "provider has no match" record.
        store.seed(Location::pending("Nowhere st", Utc::now())).await;
        let service = OrderRankingService::new(cache_over(store));

        let restaurants = vec![
            restaurant(1, "Far", "Far st"),
            restaurant(2, "Nowhere", "Nowhere st"),
            restaurant(3, "Near", "Near st"),
            restaurant(4, "Mid", "Mid st"),
        ];
        let menu = MenuIndex::from_entries([
            entry(1, 10, true),
            entry(2, 10, true),
            entry(3, 10, true),
            entry(4, 10, true),
        ]);
        let order = order_to("Delivery st 1", vec![line(10, 1, Decimal::ONE)]);

        let ranked = service.rank(&order, &restaurants, &menu).await.unwrap();
        let names: Vec<&str> = ranked
            .candidates
            .iter()
            .map(|c| c.restaurant.name.as_str())
            .collect();
        assert_eq!(names, ["Near", "Mid", "Far", "Nowhere"]);
        assert_eq!(
            ranked.candidates.last().unwrap().distance,
            Distance::Undetermined
        );
    }

    #[tokio::test]
    async fn test_unresolvable_delivery_address_keeps_candidates() {
        let store = Arc::new(InMemoryLocationStore::new());
        store
            .seed(Location::pending("Delivery st 1", Utc::now()))
            .await;
        seed(&store, "A st 1", 55.76, 37.62).await;
        let service = OrderRankingService::new(cache_over(store));

        let restaurants = vec![restaurant(1, "A", "A st 1")];
        let menu = MenuIndex::from_entries([entry(1, 10, true)]);
        let order = order_to("Delivery st 1", vec![line(10, 1, Decimal::ONE)]);

        let ranked = service.rank(&order, &restaurants, &menu).await.unwrap();
        assert_eq!(ranked.candidates.len(), 1);
        assert_eq!(
            ranked.candidates.first().unwrap().distance,
            Distance::Undetermined
        );
    }

    #[tokio::test]
    async fn test_empty_order_is_fulfillable_by_every_restaurant() {
        let store = Arc::new(InMemoryLocationStore::new());
        seed(&store, "Delivery st 1", 55.75, 37.61).await;
        seed(&store, "A st 1", 55.76, 37.62).await;
        seed(&store, "B st 2", 55.77, 37.63).await;
        let service = OrderRankingService::new(cache_over(store));

        let restaurants = vec![restaurant(1, "A", "A st 1"), restaurant(2, "B", "B st 2")];
        let menu = MenuIndex::from_entries([]);
        let order = order_to("Delivery st 1", Vec::new());

        let ranked = service.rank(&order, &restaurants, &menu).await.unwrap();
        assert_eq!(ranked.candidates.len(), 2);
        assert_eq!(ranked.item_count, 0);
        assert_eq!(ranked.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_total_price_sums_quantity_times_unit_price() {
        let lines = vec![
            line(1, 2, Decimal::new(1050, 2)),
            line(2, 3, Decimal::new(100, 2)),
        ];
        assert_eq!(total_price(&lines), Decimal::new(2400, 2));
        assert_eq!(total_price(&[]), Decimal::ZERO);
    }
}
