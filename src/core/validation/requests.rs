//! Request shapes and their validation into domain commands
//!
//! Every `validate_*` function is pure: it inspects the decoded request and
//! either returns the command the store should execute or the first rule
//! that failed.

use super::validators;
use crate::core::cycle::{BillingCycle, ensure_due_after, parse_date};
use crate::core::entity::{CardChanges, CreditLimitChange, NewCard, NewStatement};
use crate::core::error::{TrackerError, TrackerResult, ValidationError};
use crate::core::lifecycle::DEFAULT_STATUS;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const CREDIT_LIMIT_MESSAGE: &str = "credit_limit must be positive";
const AMOUNT_MESSAGE: &str = "amount must be greater than 0";

/// Body of `POST /api/v1/cards`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCardRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_four: String,
    #[serde(default)]
    pub statement_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub credit_limit: Option<f64>,
}

/// Body of `PUT /api/v1/cards/{id}`
///
/// Every field is optional. The two dates travel as a pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_four: Option<String>,
    #[serde(default)]
    pub statement_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub credit_limit: Option<f64>,
    /// Reset the limit to "none"; cannot be combined with `credit_limit`
    #[serde(default)]
    pub clear_credit_limit: bool,
}

/// Body of `POST /api/v1/statements`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateStatementRequest {
    #[serde(default)]
    pub card_id: i64,
    #[serde(default)]
    pub statement_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `PUT /api/v1/statements/{id}`
///
/// Lists exactly the fields a caller may change on a statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `PUT /api/v1/statements/{id}/schedule`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulePaymentRequest {
    #[serde(default)]
    pub scheduled_payment_date: String,
}

/// Validate a card creation request
pub fn validate_new_card(req: CreateCardRequest) -> TrackerResult<NewCard> {
    validators::card_name(&req.name)?;
    validators::last_four(&req.last_four)?;

    let statement_date = parse_date("statement_date", &req.statement_date)?;
    let due_date = parse_date("due_date", &req.due_date)?;
    let cycle = BillingCycle::derive(statement_date, due_date)?;

    let credit_limit = req
        .credit_limit
        .map(|limit| validators::positive("credit_limit", limit, CREDIT_LIMIT_MESSAGE))
        .transpose()?;

    Ok(NewCard {
        name: req.name,
        last_four: req.last_four,
        cycle,
        credit_limit,
    })
}

/// Validate a partial card update
///
/// Fails with [`TrackerError::IncompletePair`] when only one date is given
/// and with [`TrackerError::NoFieldsProvided`] when nothing would change.
pub fn validate_card_update(req: UpdateCardRequest) -> TrackerResult<CardChanges> {
    if let Some(name) = &req.name {
        validators::card_name(name)?;
    }
    if let Some(last_four) = &req.last_four {
        validators::last_four(last_four)?;
    }

    let credit_limit = match (req.credit_limit, req.clear_credit_limit) {
        (Some(_), true) => {
            return Err(ValidationError::new(
                "credit_limit",
                "credit_limit cannot be set and cleared in the same request",
            )
            .into());
        }
        (Some(limit), false) => CreditLimitChange::Set(validators::positive(
            "credit_limit",
            limit,
            CREDIT_LIMIT_MESSAGE,
        )?),
        (None, true) => CreditLimitChange::Clear,
        (None, false) => CreditLimitChange::Keep,
    };

    let cycle = match (&req.statement_date, &req.due_date) {
        (Some(statement_date), Some(due_date)) => {
            let statement_date = parse_date("statement_date", statement_date)?;
            let due_date = parse_date("due_date", due_date)?;
            Some(BillingCycle::derive(statement_date, due_date)?)
        }
        (None, None) => None,
        _ => return Err(TrackerError::IncompletePair),
    };

    let changes = CardChanges {
        name: req.name,
        last_four: req.last_four,
        cycle,
        credit_limit,
    };

    if changes.is_empty() {
        return Err(TrackerError::NoFieldsProvided);
    }
    Ok(changes)
}

/// Validate a statement creation request
///
/// The card reference is only checked for presence here; whether the card
/// exists is decided by the store.
pub fn validate_new_statement(req: CreateStatementRequest) -> TrackerResult<NewStatement> {
    let card_id = validators::non_zero_id("card_id", req.card_id)?;
    let statement_date = parse_date("statement_date", &req.statement_date)?;
    let due_date = parse_date("due_date", &req.due_date)?;
    let amount = validators::positive("amount", req.amount, AMOUNT_MESSAGE)?;
    ensure_due_after(statement_date, due_date)?;

    let status = req
        .status
        .filter(|status| !status.is_empty())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    Ok(NewStatement {
        card_id,
        statement_date,
        due_date,
        amount,
        status,
    })
}

/// Validate a status update, returning the new status
///
/// Any non-empty string is accepted, including values outside
/// [`KNOWN_STATUSES`](crate::core::lifecycle::KNOWN_STATUSES).
pub fn validate_statement_update(req: StatementUpdateRequest) -> TrackerResult<String> {
    let status = req.status.unwrap_or_default();
    validators::required_text("status", &status)?;
    Ok(status)
}

/// Validate a scheduling request, returning the payment date
pub fn validate_schedule_request(req: &SchedulePaymentRequest) -> TrackerResult<NaiveDate> {
    Ok(parse_date(
        "scheduled_payment_date",
        &req.scheduled_payment_date,
    )?)
}
