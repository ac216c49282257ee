use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;

use crate::entities::{cart_line_items, carts};
use crate::handlers::map_service_error;
use crate::models::cart::{
    AddItemRequest, CartResponse, CheckoutResponse, CreateCartRequest, LineItemResponse,
};
use crate::models::common::ErrorResponse;
use crate::services::{cart, settlement};
use crate::AppState;

fn cart_response(cart: carts::Model, items: Vec<cart_line_items::Model>) -> CartResponse {
    let usd_subtotal_cents = cart::usd_subtotal_cents(&items);
    let total_points = cart::total_points(&items);
    let total_amount_cents = cart::total_amount_cents(&items);

    CartResponse {
        id: cart.id,
        status: cart.status,
        country: cart.country,
        items: items
            .into_iter()
            .map(|item| LineItemResponse {
                id: item.id,
                kind: item.kind,
                quantity: item.quantity,
                unit_usd_cents: item.unit_usd_cents,
                unit_points: item.unit_points,
                bounty_id: item.bounty_id,
                related_bid_id: item.related_bid_id,
            })
            .collect(),
        usd_subtotal_cents,
        total_points,
        total_amount_cents,
        total_usd: Decimal::new(total_amount_cents, 2),
    }
}

pub async fn create_cart(
    State(state): State<AppState>,
    Json(payload): Json<CreateCartRequest>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ErrorResponse>)> {
    let country = payload.country.unwrap_or_else(|| "US".to_string());

    let cart = cart::create_cart(
        &state.db,
        payload.person_id,
        payload.organisation_id,
        payload.product_id,
        &country,
    )
    .await
    .map_err(map_service_error)?;

    Ok(Json(cart_response(cart, vec![])))
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<i32>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ErrorResponse>)> {
    let cart = cart::load_cart(&state.db, cart_id)
        .await
        .map_err(map_service_error)?;
    let items = cart::load_items(&state.db, cart_id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(cart_response(cart, items)))
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<i32>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ErrorResponse>)> {
    cart::add_bounty_item(
        &state.db,
        cart_id,
        payload.bounty_id,
        &payload.funding_type,
        payload.funding_amount,
    )
    .await
    .map_err(map_service_error)?;

    let cart = cart::load_cart(&state.db, cart_id)
        .await
        .map_err(map_service_error)?;
    let items = cart::load_items(&state.db, cart_id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(cart_response(cart, items)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(i32, i32)>,
) -> Result<Json<CartResponse>, (StatusCode, Json<ErrorResponse>)> {
    cart::remove_item(&state.db, cart_id, item_id)
        .await
        .map_err(map_service_error)?;

    let cart = cart::load_cart(&state.db, cart_id)
        .await
        .map_err(map_service_error)?;
    let items = cart::load_items(&state.db, cart_id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(cart_response(cart, items)))
}

pub async fn checkout(
    State(state): State<AppState>,
    Path(cart_id): Path<i32>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = settlement::start_checkout(&state.db, cart_id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(CheckoutResponse {
        sales_order_id: outcome.sales_order.map(|order| order.id),
        point_order_id: outcome.point_order.map(|order| order.id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cart_response_totals_and_display_amount() {
        let now = Utc::now().fixed_offset();
        let cart = carts::Model {
            id: 1,
            person_id: 1,
            organisation_id: 1,
            product_id: 1,
            country: "US".to_string(),
            status: "Open".to_string(),
            created_at: now,
            updated_at: now,
        };
        let items = vec![
            cart_line_items::Model {
                id: 1,
                cart_id: 1,
                kind: "BOUNTY".to_string(),
                quantity: 1,
                unit_usd_cents: 10000,
                unit_points: 0,
                bounty_id: Some(1),
                related_bid_id: None,
                created_at: now,
            },
            cart_line_items::Model {
                id: 2,
                cart_id: 1,
                kind: "PLATFORM_FEE".to_string(),
                quantity: 1,
                unit_usd_cents: 1000,
                unit_points: 0,
                bounty_id: None,
                related_bid_id: None,
                created_at: now,
            },
        ];

        let response = cart_response(cart, items);
        assert_eq!(response.usd_subtotal_cents, 10000);
        assert_eq!(response.total_amount_cents, 11000);
        assert_eq!(response.total_usd, dec!(110.00));
    }
}
