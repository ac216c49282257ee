pub mod bid;
pub mod cart;
pub mod order;
pub mod point_account;

use axum::{http::StatusCode, Json};

use crate::models::common::ErrorResponse;
use crate::services::adjustment::AdjustmentError;
use crate::services::cart::CartError;
use crate::services::point_ledger::LedgerError;

/// Map a service error onto an HTTP status: missing entities become 404,
/// other validation failures 400, everything else 500.
pub(crate) fn map_service_error(
    e: Box<dyn std::error::Error + Send + Sync>,
) -> (StatusCode, Json<ErrorResponse>) {
    let status = if let Some(cart_error) = e.downcast_ref::<CartError>() {
        match cart_error {
            CartError::CartNotFound(_)
            | CartError::BountyNotFound(_)
            | CartError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    } else if let Some(adjustment_error) = e.downcast_ref::<AdjustmentError>() {
        match adjustment_error {
            AdjustmentError::BidNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    } else if e.downcast_ref::<LedgerError>().is_some() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
