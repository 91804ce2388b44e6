//! HTTP handlers
//!
//! Handlers only decode the request, call [`TrackerService`] and shape the
//! response. Every failure is a [`TrackerError`](crate::core::error::TrackerError),
//! which renders itself as a JSON error body.

pub mod cards;
pub mod settings;
pub mod statements;

use crate::core::service::TrackerService;
use axum::Json;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: TrackerService,
    /// YAML file behind `/api/settings`
    pub config_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(service: TrackerService, config_path: impl Into<PathBuf>) -> Self {
        Self {
            service,
            config_path: Arc::new(config_path.into()),
        }
    }
}

/// Health check endpoint handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Credit Card Payment Tracker API is running"
    }))
}
