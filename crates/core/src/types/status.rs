//! Order lifecycle enums.
//!
//! Order status is stored as a `SMALLINT` so the active-orders query can
//! filter and sort on a single indexed column. The numeric codes are part of
//! the database contract; [`OrderStatus::code`] and [`OrderStatus::from_code`]
//! are the only places that know them.

use serde::{Deserialize, Serialize};

/// Fulfillment stage of a customer order.
///
/// Stages are ordered by the numeric code: an order moves from `Unprocessed`
/// through `Accepted`, `Assembling` and `HandedToCourier`, and ends at
/// `Completed` (code `-1`, which sorts completed orders out of the active
/// queue entirely).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Delivered and closed out.
    Completed,
    /// Submitted but not yet picked up by staff.
    #[default]
    Unprocessed,
    /// Acknowledged by a manager.
    Accepted,
    /// A restaurant is assembling the order.
    Assembling,
    /// Out for delivery.
    HandedToCourier,
}

impl OrderStatus {
    /// Database code for this status.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Completed => -1,
            Self::Unprocessed => 0,
            Self::Accepted => 1,
            Self::Assembling => 2,
            Self::HandedToCourier => 3,
        }
    }

    /// Decode a database status code.
    #[must_use]
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            -1 => Some(Self::Completed),
            0 => Some(Self::Unprocessed),
            1 => Some(Self::Accepted),
            2 => Some(Self::Assembling),
            3 => Some(Self::HandedToCourier),
            _ => None,
        }
    }

    /// Transition applied when an order is first persisted.
    ///
    /// A freshly submitted order advances straight from `Unprocessed` to
    /// `Accepted`; no stored order ever sits at `Unprocessed`. Any other
    /// status passes through unchanged, so imports of historical orders keep
    /// their stage.
    #[must_use]
    pub const fn on_create(self) -> Self {
        match self {
            Self::Unprocessed => Self::Accepted,
            other => other,
        }
    }

    /// Whether the order still needs staff attention.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Unprocessed => write!(f, "Unprocessed"),
            Self::Accepted => write!(f, "Accepted"),
            Self::Assembling => write!(f, "Being assembled"),
            Self::HandedToCourier => write!(f, "Handed to courier"),
        }
    }
}

/// How the customer pays for an order.
///
/// Stored as a boolean column (`payment_by_card`); card payment is the
/// default for submissions that do not specify a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[default]
    Card,
}

impl PaymentMethod {
    /// Encode for the `payment_by_card` column.
    #[must_use]
    pub const fn as_card_flag(self) -> bool {
        matches!(self, Self::Card)
    }

    /// Decode from the `payment_by_card` column.
    #[must_use]
    pub const fn from_card_flag(by_card: bool) -> Self {
        if by_card { Self::Card } else { Self::Cash }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::Card => write!(f, "Card"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL_STATUSES: [OrderStatus; 5] = [
        OrderStatus::Completed,
        OrderStatus::Unprocessed,
        OrderStatus::Accepted,
        OrderStatus::Assembling,
        OrderStatus::HandedToCourier,
    ];

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderStatus::Completed.code(), -1);
        assert_eq!(OrderStatus::Unprocessed.code(), 0);
        assert_eq!(OrderStatus::Accepted.code(), 1);
        assert_eq!(OrderStatus::Assembling.code(), 2);
        assert_eq!(OrderStatus::HandedToCourier.code(), 3);
    }

    #[test]
    fn test_code_roundtrip() {
        for status in ALL_STATUSES {
            assert_eq!(OrderStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn test_from_code_rejects_unknown() {
        assert_eq!(OrderStatus::from_code(4), None);
        assert_eq!(OrderStatus::from_code(-2), None);
    }

    #[test]
    fn test_on_create_advances_unprocessed() {
        assert_eq!(
            OrderStatus::Unprocessed.on_create(),
            OrderStatus::Accepted
        );
    }

    #[test]
    fn test_on_create_keeps_other_statuses() {
        assert_eq!(OrderStatus::Accepted.on_create(), OrderStatus::Accepted);
        assert_eq!(
            OrderStatus::Assembling.on_create(),
            OrderStatus::Assembling
        );
        assert_eq!(OrderStatus::Completed.on_create(), OrderStatus::Completed);
    }

    #[test]
    fn test_is_active() {
        assert!(!OrderStatus::Completed.is_active());
        assert!(OrderStatus::Unprocessed.is_active());
        assert!(OrderStatus::HandedToCourier.is_active());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&OrderStatus::HandedToCourier).unwrap();
        assert_eq!(json, "\"handed_to_courier\"");

        let parsed: OrderStatus = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(parsed, OrderStatus::Accepted);
    }

    #[test]
    fn test_payment_card_flag_roundtrip() {
        assert!(PaymentMethod::Card.as_card_flag());
        assert!(!PaymentMethod::Cash.as_card_flag());
        assert_eq!(PaymentMethod::from_card_flag(true), PaymentMethod::Card);
        assert_eq!(PaymentMethod::from_card_flag(false), PaymentMethod::Cash);
    }

    #[test]
    fn test_payment_default_is_card() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Card);
    }

    #[test]
    fn test_payment_serde() {
        let parsed: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Cash);
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Card).unwrap(),
            "\"card\""
        );
    }
}
