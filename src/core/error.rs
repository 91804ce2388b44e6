//! Typed error handling for the tracker
//!
//! Every operation of [`TrackerService`](crate::core::service::TrackerService)
//! fails with a [`TrackerError`], so callers can match on the precise failure
//! instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: a single field failed a rule (client error)
//! - `NotFound`: the referenced card or statement does not exist
//! - `IncompletePair` / `NoFieldsProvided` / `InvalidDateRange`: cross-field rules
//! - [`StorageError`]: the persistence gateway failed (never shown to clients)
//! - [`RequestError`]: malformed HTTP input (bad JSON, bad path id)
//! - [`ConfigError`]: settings file problems
//!
//! # Example
//!
//! ```rust,ignore
//! match service.schedule_payment(id, request).await {
//!     Ok(scheduled) => println!("scheduled for {}", scheduled.scheduled_payment_date),
//!     Err(TrackerError::NotFound { entity, id }) => println!("no {} {}", entity, id),
//!     Err(e) => eprintln!("failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A single field failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced row does not exist
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Only one half of the statement_date/due_date pair was supplied
    #[error("both statement_date and due_date must be provided together")]
    IncompletePair,

    /// An update request carried no updatable field
    #[error("no fields to update")]
    NoFieldsProvided,

    /// The due date is not strictly after the statement date
    #[error("due_date must be after statement_date")]
    InvalidDateRange,

    /// The persistence gateway failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The HTTP request itself was malformed
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Settings could not be loaded, saved or validated
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl TrackerError {
    /// Build a not-found error for a card
    pub fn card_not_found(id: i64) -> Self {
        TrackerError::NotFound { entity: "card", id }
    }

    /// Build a not-found error for a statement
    pub fn statement_not_found(id: i64) -> Self {
        TrackerError::NotFound {
            entity: "statement",
            id,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::Validation(_)
            | TrackerError::IncompletePair
            | TrackerError::NoFieldsProvided
            | TrackerError::InvalidDateRange
            | TrackerError::Request(_) => StatusCode::BAD_REQUEST,
            TrackerError::NotFound { .. } => StatusCode::NOT_FOUND,
            TrackerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TrackerError::Config(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            TrackerError::Validation(_) => "VALIDATION_ERROR",
            TrackerError::NotFound { .. } => "NOT_FOUND",
            TrackerError::IncompletePair => "INCOMPLETE_DATE_PAIR",
            TrackerError::NoFieldsProvided => "NO_FIELDS_PROVIDED",
            TrackerError::InvalidDateRange => "INVALID_DATE_RANGE",
            TrackerError::Storage(_) => "INTERNAL_ERROR",
            TrackerError::Request(e) => e.error_code(),
            TrackerError::Config(e) => e.error_code(),
        }
    }

    /// Whether the failure is on the server side
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Convert to an error response
    ///
    /// Server-side failures never expose their message; the detail stays in
    /// the logs.
    pub fn to_response(&self) -> ErrorResponse {
        let message = if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            TrackerError::Validation(e) => Some(serde_json::json!({ "field": e.field })),
            TrackerError::NotFound { entity, id } => {
                Some(serde_json::json!({ "entity": entity, "id": id }))
            }
            TrackerError::IncompletePair => Some(serde_json::json!({
                "fields": ["statement_date", "due_date"]
            })),
            TrackerError::InvalidDateRange => Some(serde_json::json!({ "field": "due_date" })),
            TrackerError::Config(ConfigError::InvalidValue { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_internal() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Machine-readable field name
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The field is absent or empty
    pub fn required(field: &str) -> Self {
        Self::new(field, format!("{} is required", field))
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// The persistence gateway failed to carry out an operation
#[derive(Debug, Error)]
#[error("storage failure during {operation}: {message}")]
pub struct StorageError {
    /// Gateway operation that failed (e.g. "create card")
    pub operation: &'static str,
    /// Backend-specific message, for logs only
    pub message: String,
}

impl StorageError {
    /// Wrap a gateway failure, keeping the full context chain
    pub fn from_gateway(operation: &'static str, err: anyhow::Error) -> Self {
        Self {
            operation,
            message: format!("{:#}", err),
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// The body could not be decoded into the expected shape
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// A path segment is not a valid numeric id
    #[error("Invalid {entity} ID: '{value}'")]
    InvalidId { entity: &'static str, value: String },
}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::InvalidId { .. } => "INVALID_ID",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to the settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("failed to read config file '{path}': {message}")]
    Read { path: String, message: String },

    /// The file is not valid YAML for the settings shape
    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },

    /// The file could not be written
    #[error("failed to write config file '{path}': {message}")]
    Write { path: String, message: String },

    /// A setting holds an unacceptable value
    #[error("{message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConfigError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "INVALID_SETTING",
            _ => "CONFIG_ERROR",
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
