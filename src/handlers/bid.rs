use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::handlers::map_service_error;
use crate::models::bid::AcceptBidResponse;
use crate::models::common::ErrorResponse;
use crate::services::adjustment;
use crate::AppState;

pub async fn accept_bid(
    State(state): State<AppState>,
    Path(bid_id): Path<i32>,
) -> Result<Json<AcceptBidResponse>, (StatusCode, Json<ErrorResponse>)> {
    let bid = adjustment::accept_bid(&state.db, &state.payments, bid_id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(AcceptBidResponse {
        bid_id: bid.id,
        status: bid.status,
        final_reward_amount: bid.amount,
    }))
}
