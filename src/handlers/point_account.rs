use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder};

use crate::entities::{organisation_point_accounts, point_transactions, prelude::*};
use crate::handlers::map_service_error;
use crate::models::common::ErrorResponse;
use crate::models::point_account::{
    GrantPointsRequest, PointAccountResponse, PointTransactionResponse,
};
use crate::services::point_ledger;
use crate::AppState;

async fn find_account(
    state: &AppState,
    organisation_id: i32,
) -> Result<organisation_point_accounts::Model, (StatusCode, Json<ErrorResponse>)> {
    let account = OrganisationPointAccounts::find()
        .filter(organisation_point_accounts::Column::OrganisationId.eq(organisation_id))
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

    account.ok_or((
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Organisation {} has no point account", organisation_id),
        }),
    ))
}

pub async fn grant_points(
    State(state): State<AppState>,
    Json(payload): Json<GrantPointsRequest>,
) -> Result<Json<PointAccountResponse>, (StatusCode, Json<ErrorResponse>)> {
    point_ledger::record_grant(
        &state.db,
        payload.organisation_id,
        payload.amount,
        payload.granted_by_id,
        &payload.rationale,
    )
    .await
    .map_err(map_service_error)?;

    let account = find_account(&state, payload.organisation_id).await?;
    Ok(Json(PointAccountResponse {
        organisation_id: account.organisation_id,
        balance: account.balance,
    }))
}

pub async fn get_point_account(
    State(state): State<AppState>,
    Path(organisation_id): Path<i32>,
) -> Result<Json<PointAccountResponse>, (StatusCode, Json<ErrorResponse>)> {
    let account = find_account(&state, organisation_id).await?;
    Ok(Json(PointAccountResponse {
        organisation_id: account.organisation_id,
        balance: account.balance,
    }))
}

pub async fn list_point_transactions(
    State(state): State<AppState>,
    Path(organisation_id): Path<i32>,
) -> Result<Json<Vec<PointTransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let account = find_account(&state, organisation_id).await?;

    let transactions = PointTransactions::find()
        .filter(point_transactions::Column::OrgAccountId.eq(account.id))
        .order_by(point_transactions::Column::CreatedAt, Order::Desc)
        .all(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Database error: {}", e),
                }),
            )
        })?;

    Ok(Json(
        transactions
            .into_iter()
            .map(|tx| PointTransactionResponse {
                id: tx.id,
                amount: tx.amount,
                transaction_type: tx.transaction_type,
                description: tx.description,
                cart_id: tx.cart_id,
            })
            .collect(),
    ))
}
