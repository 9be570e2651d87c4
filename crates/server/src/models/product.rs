//! Product catalogue models.

use foodcart_core::{CategoryId, ProductId};
use rust_decimal::Decimal;

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: Option<CategoryId>,
    /// Current catalogue price. Orders capture their own copy at
    /// submission time, so changing this never rewrites order totals.
    pub price: Decimal,
    pub description: String,
    pub special_offer: bool,
}
