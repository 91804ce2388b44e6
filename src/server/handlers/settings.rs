//! Settings endpoints under `/api/settings`

use super::AppState;
use crate::config::AppConfig;
use crate::core::error::TrackerResult;
use crate::core::validation::JsonBody;
use axum::{Json, extract::State};

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> TrackerResult<Json<AppConfig>> {
    Ok(Json(AppConfig::load_async(state.config_path.as_path()).await?))
}

/// PUT /api/settings
///
/// The settings are validated before anything is written.
pub async fn update_settings(
    State(state): State<AppState>,
    JsonBody(config): JsonBody<AppConfig>,
) -> TrackerResult<Json<AppConfig>> {
    config.validate()?;
    config.save_async(state.config_path.as_path()).await?;
    tracing::info!(
        path = %state.config_path.display(),
        webhook_configured = config.webhook_configured(),
        "settings saved"
    );
    Ok(Json(config))
}
