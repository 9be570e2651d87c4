//! Public order intake.

use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode};
use foodcart_core::{OrderId, PaymentMethod, PhoneNumber, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{NewOrder, NewOrderLine};
use crate::services::ranking::total_price;
use crate::state::AppState;

/// One product line of an order submission.
#[derive(Debug, Deserialize)]
pub struct SubmittedLine {
    pub product: ProductId,
    pub quantity: i32,
}

/// Request body for `POST /api/orders`.
#[derive(Debug, Deserialize)]
pub struct OrderSubmission {
    pub firstname: String,
    pub lastname: String,
    pub address: String,
    #[serde(default)]
    pub phonenumber: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub payment: PaymentMethod,
    pub products: Vec<SubmittedLine>,
}

/// Response body for a created order.
#[derive(Debug, Serialize)]
pub struct CreatedOrder {
    pub id: OrderId,
    pub status: String,
    pub total_price: Decimal,
    pub item_count: usize,
}

/// Submit a new order.
///
/// POST /api/orders
///
/// The order and its line items are stored in one transaction, with each
/// line's unit price captured from the current catalogue.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an empty product list, a
/// non-positive quantity, an unknown product id, a blank required field or
/// an invalid phone number. Returns `AppError::Database` if persistence
/// fails.
pub async fn submit(
    State(state): State<AppState>,
    Json(submission): Json<OrderSubmission>,
) -> Result<(StatusCode, Json<CreatedOrder>)> {
    validate(&submission)?;
    let phonenumber = parse_phone(submission.phonenumber.as_deref())?;

    let product_ids: Vec<ProductId> = submission.products.iter().map(|l| l.product).collect();
    let products = ProductRepository::new(state.pool())
        .get_by_ids(&product_ids)
        .await?;
    let prices: HashMap<ProductId, Decimal> =
        products.into_iter().map(|p| (p.id, p.price)).collect();

    let mut lines = Vec::with_capacity(submission.products.len());
    for line in &submission.products {
        let Some(&unit_price) = prices.get(&line.product) else {
            return Err(AppError::BadRequest(format!(
                "unknown product id: {}",
                line.product
            )));
        };
        lines.push(NewOrderLine {
            product_id: line.product,
            quantity: line.quantity,
            unit_price,
        });
    }

    // The address is stored exactly as submitted; it is also the geocode
    // cache key, and two spellings are two addresses.
    let new_order = NewOrder::new(
        submission.firstname,
        submission.lastname,
        submission.address,
        phonenumber,
        submission.comment,
        submission.payment,
        lines,
    );
    let stored = OrderRepository::new(state.pool()).create(&new_order).await?;

    info!(
        order_id = %stored.order.id,
        items = stored.lines.len(),
        "order accepted"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedOrder {
            id: stored.order.id,
            status: stored.order.status.to_string(),
            total_price: total_price(&stored.lines),
            item_count: stored.lines.len(),
        }),
    ))
}

/// Reject submissions that must not reach the database.
fn validate(submission: &OrderSubmission) -> Result<()> {
    if submission.firstname.trim().is_empty() {
        return Err(AppError::BadRequest("firstname must not be blank".to_owned()));
    }
    if submission.lastname.trim().is_empty() {
        return Err(AppError::BadRequest("lastname must not be blank".to_owned()));
    }
    if submission.address.trim().is_empty() {
        return Err(AppError::BadRequest("address must not be blank".to_owned()));
    }
    if submission.products.is_empty() {
        return Err(AppError::BadRequest(
            "order must contain at least one product".to_owned(),
        ));
    }
    for line in &submission.products {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "quantity for product {} must be positive",
                line.product
            )));
        }
    }
    Ok(())
}

/// An absent or blank phone number is allowed; a present one must parse.
fn parse_phone(raw: Option<&str>) -> Result<Option<PhoneNumber>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => PhoneNumber::parse(s)
            .map(Some)
            .map_err(|e| AppError::BadRequest(format!("invalid phone number: {e}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn submission(products: Vec<SubmittedLine>) -> OrderSubmission {
        OrderSubmission {
            firstname: "Ivan".to_owned(),
            lastname: "Petrov".to_owned(),
            address: "Moscow, Tverskaya 1".to_owned(),
            phonenumber: None,
            comment: String::new(),
            payment: PaymentMethod::Card,
            products,
        }
    }

    fn line(product: i32, quantity: i32) -> SubmittedLine {
        SubmittedLine {
            product: ProductId::new(product),
            quantity,
        }
    }

    #[test]
    fn test_rejects_empty_product_list() {
        let err = validate(&submission(Vec::new())).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        assert!(validate(&submission(vec![line(1, 0)])).is_err());
        assert!(validate(&submission(vec![line(1, -3)])).is_err());
        assert!(validate(&submission(vec![line(1, 1), line(2, 0)])).is_err());
        assert!(validate(&submission(vec![line(1, 1), line(2, 2)])).is_ok());
    }

    #[test]
    fn test_rejects_blank_required_fields() {
        let mut s = submission(vec![line(1, 1)]);
        s.firstname = "  ".to_owned();
        assert!(validate(&s).is_err());

        let mut s = submission(vec![line(1, 1)]);
        s.lastname = String::new();
        assert!(validate(&s).is_err());

        let mut s = submission(vec![line(1, 1)]);
        s.address = "\t".to_owned();
        assert!(validate(&s).is_err());
    }

    #[test]
    fn test_phone_is_optional_but_must_parse_when_present() {
        assert_eq!(parse_phone(None).unwrap(), None);
        assert_eq!(parse_phone(Some("")).unwrap(), None);
        assert_eq!(
            parse_phone(Some("8(903)123-45-67"))
                .unwrap()
                .unwrap()
                .as_str(),
            "+79031234567"
        );
        assert!(parse_phone(Some("no digits here")).is_err());
    }

    #[test]
    fn test_submission_defaults() {
        let s: OrderSubmission = serde_json::from_str(
            r#"{
                "firstname": "Ivan",
                "lastname": "Petrov",
                "address": "Moscow, Tverskaya 1",
                "products": [{"product": 3, "quantity": 2}]
            }"#,
        )
        .unwrap();
        assert_eq!(s.payment, PaymentMethod::Card);
        assert_eq!(s.comment, "");
        assert_eq!(s.phonenumber, None);
        assert_eq!(s.products.first().unwrap().product, ProductId::new(3));
    }
}
