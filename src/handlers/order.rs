use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;

use crate::entities::{point_orders, prelude::*, sales_orders};
use crate::handlers::map_service_error;
use crate::models::common::ErrorResponse;
use crate::models::order::{PointOrderResponse, SalesOrderResponse, SettlementResponse};
use crate::services::settlement;
use crate::AppState;

fn order_response(order: sales_orders::Model) -> SalesOrderResponse {
    SalesOrderResponse {
        id: order.id,
        cart_id: order.cart_id,
        order_reference: order.order_reference,
        status: order.status,
        subtotal_cents: order.subtotal_cents,
        fee_cents: order.fee_cents,
        tax_cents: order.tax_cents,
        total_cents: order.total_cents,
        total_usd: Decimal::new(order.total_cents, 2),
        parent_sales_order_id: order.parent_sales_order_id,
    }
}

fn point_order_response(order: point_orders::Model) -> PointOrderResponse {
    PointOrderResponse {
        id: order.id,
        cart_id: order.cart_id,
        total_points: order.total_points,
        status: order.status,
        parent_order_id: order.parent_order_id,
    }
}

async fn find_order(
    state: &AppState,
    order_id: i32,
) -> Result<sales_orders::Model, (StatusCode, Json<ErrorResponse>)> {
    let order = SalesOrders::find_by_id(order_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Database error: {}", e),
                }),
            )
        })?;

    order.ok_or((
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Sales order {} not found", order_id),
        }),
    ))
}

async fn find_point_order(
    state: &AppState,
    order_id: i32,
) -> Result<point_orders::Model, (StatusCode, Json<ErrorResponse>)> {
    let order = PointOrders::find_by_id(order_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Database error: {}", e),
                }),
            )
        })?;

    order.ok_or((
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Point order {} not found", order_id),
        }),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<SalesOrderResponse>, (StatusCode, Json<ErrorResponse>)> {
    let order = find_order(&state, order_id).await?;
    Ok(Json(order_response(order)))
}

pub async fn process_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<SettlementResponse>, (StatusCode, Json<ErrorResponse>)> {
    find_order(&state, order_id).await?;

    let success = settlement::process_payment(&state.db, &state.payments, order_id)
        .await
        .map_err(map_service_error)?;

    let order = find_order(&state, order_id).await?;
    Ok(Json(SettlementResponse {
        success,
        status: order.status,
    }))
}

pub async fn refund_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<SettlementResponse>, (StatusCode, Json<ErrorResponse>)> {
    find_order(&state, order_id).await?;

    let success = settlement::refund(&state.db, &state.payments, order_id)
        .await
        .map_err(map_service_error)?;

    let order = find_order(&state, order_id).await?;
    Ok(Json(SettlementResponse {
        success,
        status: order.status,
    }))
}

pub async fn get_point_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<PointOrderResponse>, (StatusCode, Json<ErrorResponse>)> {
    let order = find_point_order(&state, order_id).await?;
    Ok(Json(point_order_response(order)))
}

pub async fn complete_point_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<SettlementResponse>, (StatusCode, Json<ErrorResponse>)> {
    find_point_order(&state, order_id).await?;

    let success = settlement::complete_point_order(&state.db, order_id)
        .await
        .map_err(map_service_error)?;

    let order = find_point_order(&state, order_id).await?;
    Ok(Json(SettlementResponse {
        success,
        status: order.status,
    }))
}

pub async fn refund_point_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<SettlementResponse>, (StatusCode, Json<ErrorResponse>)> {
    find_point_order(&state, order_id).await?;

    let success = settlement::refund_point_order(&state.db, order_id)
        .await
        .map_err(map_service_error)?;

    let order = find_point_order(&state, order_id).await?;
    Ok(Json(SettlementResponse {
        success,
        status: order.status,
    }))
}
