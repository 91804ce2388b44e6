//! Route table

use super::handlers::{AppState, cards, health_check, settings, statements};
use axum::{
    Router,
    routing::{get, put},
};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Build the API routes
///
/// - GET /api/health
/// - GET, POST /api/v1/cards
/// - GET, PUT, DELETE /api/v1/cards/{id}
/// - GET, POST /api/v1/statements
/// - GET, PUT /api/v1/statements/{id}
/// - PUT /api/v1/statements/{id}/schedule
/// - GET, PUT /api/settings
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/v1/cards",
            get(cards::list_cards).post(cards::create_card),
        )
        .route(
            "/api/v1/cards/{id}",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::delete_card),
        )
        .route(
            "/api/v1/statements",
            get(statements::list_statements).post(statements::create_statement),
        )
        .route(
            "/api/v1/statements/{id}",
            get(statements::get_statement).put(statements::update_statement),
        )
        .route(
            "/api/v1/statements/{id}/schedule",
            put(statements::schedule_payment),
        )
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .with_state(state)
}

/// Serve the web UI: `/static/*` from `dir` and `/` as `dir/index.html`
pub fn build_static_routes(dir: &Path) -> Router {
    Router::new()
        .nest_service("/static", ServeDir::new(dir))
        .route_service("/", ServeFile::new(dir.join("index.html")))
}
