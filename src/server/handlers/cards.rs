//! Card endpoints under `/api/v1/cards`

use super::AppState;
use crate::core::entity::CreditCard;
use crate::core::error::TrackerResult;
use crate::core::validation::{CreateCardRequest, JsonBody, RowId, UpdateCardRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

/// Response for a deleted card
#[derive(Debug, Serialize)]
pub struct DeleteCardResponse {
    pub message: &'static str,
    pub statements_deleted: u64,
}

/// GET /api/v1/cards
pub async fn list_cards(State(state): State<AppState>) -> TrackerResult<Json<Vec<CreditCard>>> {
    Ok(Json(state.service.list_cards().await?))
}

/// POST /api/v1/cards
pub async fn create_card(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateCardRequest>,
) -> TrackerResult<(StatusCode, Json<CreditCard>)> {
    let card = state.service.create_card(request).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// GET /api/v1/cards/{id}
pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> TrackerResult<Json<CreditCard>> {
    let RowId(id) = RowId::parse("card", &id)?;
    Ok(Json(state.service.get_card(id).await?))
}

/// PUT /api/v1/cards/{id}
pub async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateCardRequest>,
) -> TrackerResult<Json<CreditCard>> {
    let RowId(id) = RowId::parse("card", &id)?;
    Ok(Json(state.service.update_card(id, request).await?))
}

/// DELETE /api/v1/cards/{id}
pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> TrackerResult<Json<DeleteCardResponse>> {
    let RowId(id) = RowId::parse("card", &id)?;
    let deletion = state.service.delete_card(id).await?;
    Ok(Json(DeleteCardResponse {
        message: "Card deleted successfully",
        statements_deleted: deletion.statements_deleted,
    }))
}
