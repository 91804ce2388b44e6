//! Request decoding that fails with [`TrackerError`]
//!
//! Axum's own `Json` rejection answers with a plain-text body and a mix of
//! 400/415/422 statuses. These wrappers turn every decoding failure into a
//! [`RequestError`] so clients always get the JSON error shape and a 400.

use crate::core::error::{RequestError, TrackerError};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// JSON request body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_card(
///     State(state): State<AppState>,
///     JsonBody(request): JsonBody<CreateCardRequest>,
/// ) -> TrackerResult<Json<CreditCard>> {
///     // request decoded, not yet validated
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = TrackerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(RequestError::InvalidBody {
                message: rejection.body_text(),
            }
            .into()),
        }
    }
}

/// Numeric row id taken from the `{id}` path segment
///
/// Handlers capture the segment as text so the error can echo it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowId(pub i64);

impl RowId {
    /// Parse a raw path segment; `entity` names the row kind in the error
    pub fn parse(entity: &'static str, raw: &str) -> Result<Self, TrackerError> {
        raw.parse::<i64>().map(RowId).map_err(|_| {
            RequestError::InvalidId {
                entity,
                value: raw.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_parse() {
        assert_eq!(RowId::parse("card", "42").unwrap(), RowId(42));

        let err = RowId::parse("statement", "abc").unwrap_err();
        assert_eq!(err.to_string(), "Invalid statement ID: 'abc'");
        assert_eq!(err.error_code(), "INVALID_ID");
    }
}
