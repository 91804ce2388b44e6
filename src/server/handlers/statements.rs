//! Statement endpoints under `/api/v1/statements`

use super::AppState;
use crate::core::entity::Statement;
use crate::core::error::TrackerResult;
use crate::core::lifecycle::PaymentSchedule;
use crate::core::validation::{
    CreateStatementRequest, JsonBody, RowId, SchedulePaymentRequest, StatementUpdateRequest,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

/// Acknowledgement of a status or schedule change
#[derive(Debug, Serialize)]
pub struct StatementAck {
    pub status: &'static str,
    #[serde(flatten)]
    pub schedule: Option<PaymentSchedule>,
}

/// GET /api/v1/statements
pub async fn list_statements(
    State(state): State<AppState>,
) -> TrackerResult<Json<Vec<Statement>>> {
    Ok(Json(state.service.list_statements().await?))
}

/// POST /api/v1/statements
pub async fn create_statement(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateStatementRequest>,
) -> TrackerResult<(StatusCode, Json<Statement>)> {
    let statement = state.service.create_statement(request).await?;
    Ok((StatusCode::CREATED, Json(statement)))
}

/// GET /api/v1/statements/{id}
pub async fn get_statement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> TrackerResult<Json<Statement>> {
    let RowId(id) = RowId::parse("statement", &id)?;
    Ok(Json(state.service.get_statement(id).await?))
}

/// PUT /api/v1/statements/{id}
pub async fn update_statement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<StatementUpdateRequest>,
) -> TrackerResult<Json<StatementAck>> {
    let RowId(id) = RowId::parse("statement", &id)?;
    state.service.update_statement(id, request).await?;
    Ok(Json(StatementAck {
        status: "updated",
        schedule: None,
    }))
}

/// PUT /api/v1/statements/{id}/schedule
pub async fn schedule_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<SchedulePaymentRequest>,
) -> TrackerResult<Json<StatementAck>> {
    let RowId(id) = RowId::parse("statement", &id)?;
    let schedule = state.service.schedule_payment(id, &request).await?;
    Ok(Json(StatementAck {
        status: "scheduled",
        schedule: Some(schedule),
    }))
}
