//! Customer order models.

use chrono::{DateTime, Utc};
use foodcart_core::{OrderId, OrderStatus, PaymentMethod, PhoneNumber, ProductId};
use rust_decimal::Decimal;

/// A stored customer order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub firstname: String,
    pub lastname: String,
    /// Delivery address, also the key into the geocode cache.
    pub address: String,
    pub phonenumber: Option<PhoneNumber>,
    pub comment: String,
    pub status: OrderStatus,
    pub payment: PaymentMethod,
    pub registered_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// A stored order line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Product price captured when the order was submitted.
    pub unit_price: Decimal,
}

/// An order together with its line items.
#[derive(Debug, Clone)]
pub struct OrderWithLines {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// An order submission ready for persistence.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub firstname: String,
    pub lastname: String,
    pub address: String,
    pub phonenumber: Option<PhoneNumber>,
    pub comment: String,
    pub payment: PaymentMethod,
    pub status: OrderStatus,
    pub lines: Vec<NewOrderLine>,
}

/// One line of an order submission, with the price already captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl NewOrder {
    /// Assemble an order for persistence.
    ///
    /// Every order enters the system through here, which is where the
    /// creation transition runs: submissions start `Unprocessed` and are
    /// stored `Accepted`, so the staff queue never shows a phantom
    /// "unprocessed" stage.
    #[must_use]
    pub fn new(
        firstname: String,
        lastname: String,
        address: String,
        phonenumber: Option<PhoneNumber>,
        comment: String,
        payment: PaymentMethod,
        lines: Vec<NewOrderLine>,
    ) -> Self {
        Self {
            firstname,
            lastname,
            address,
            phonenumber,
            comment,
            payment,
            status: OrderStatus::Unprocessed.on_create(),
            lines,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lines() -> Vec<NewOrderLine> {
        vec![NewOrderLine {
            product_id: ProductId::new(1),
            quantity: 2,
            unit_price: Decimal::new(5000, 2),
        }]
    }

    #[test]
    fn test_new_order_is_stored_accepted() {
        let order = NewOrder::new(
            "Ivan".to_owned(),
            "Petrov".to_owned(),
            "Moscow, Tverskaya 1".to_owned(),
            None,
            String::new(),
            PaymentMethod::Card,
            lines(),
        );
        assert_eq!(order.status, OrderStatus::Accepted);
    }

    #[test]
    fn test_captured_price_survives_catalogue_changes() {
        let catalogue_price = Decimal::new(12050, 2);
        let line = NewOrderLine {
            product_id: ProductId::new(3),
            quantity: 1,
            unit_price: catalogue_price,
        };
        let order = NewOrder::new(
            "Anna".to_owned(),
            "Orlova".to_owned(),
            "Moscow, Arbat 10".to_owned(),
            Some(PhoneNumber::parse("+79031234567").unwrap()),
            String::new(),
            PaymentMethod::Cash,
            vec![line],
        );

        // A later catalogue price change has no handle on the copy.
        let new_catalogue_price = Decimal::new(99900, 2);
        let stored = order.lines.first().unwrap();
        assert_ne!(stored.unit_price, new_catalogue_price);
        assert_eq!(stored.unit_price, catalogue_price);
    }
}
