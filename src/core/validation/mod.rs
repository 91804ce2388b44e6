//! Validation of untrusted input
//!
//! Field validators live in [`validators`], the request shapes and their
//! validation into domain commands in [`requests`], and the axum glue that
//! decodes request bodies in [`extractor`]. Validation never touches the
//! store.

pub mod extractor;
pub mod requests;
pub mod validators;

pub use extractor::{JsonBody, RowId};
pub use requests::{
    CreateCardRequest, CreateStatementRequest, SchedulePaymentRequest, StatementUpdateRequest,
    UpdateCardRequest, validate_card_update, validate_new_card, validate_new_statement,
    validate_schedule_request, validate_statement_update,
};
