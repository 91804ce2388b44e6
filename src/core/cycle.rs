//! Billing-cycle derivation
//!
//! A card stores its cycle as two numbers: the day of month the statement
//! closes and the number of days from that close until payment is due. Both
//! are derived once from a sample pair of calendar dates and never expanded
//! back into dates.

use crate::core::error::{TrackerError, ValidationError};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Wire format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date
///
/// `field` names the input in the returned error. Only the zero-padded
/// ten-character form is accepted.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }

    let invalid = || {
        ValidationError::new(
            field,
            format!("{} must be a valid date (YYYY-MM-DD)", field),
        )
    };

    // chrono's %Y also takes signed or short years such as "+024"
    static DATE_SHAPE: OnceLock<Regex> = OnceLock::new();
    let shape = DATE_SHAPE.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
    if !shape.is_match(raw) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())
}

/// A card's stored cycle parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCycle {
    /// Day of month the statement closes (1-31)
    pub statement_day: u32,
    /// Whole calendar days from statement close to due date
    pub days_until_due: i64,
}

impl BillingCycle {
    /// Derive the cycle from one statement date and its due date
    ///
    /// Fails with [`TrackerError::InvalidDateRange`] unless `due_date` is
    /// strictly after `statement_date`.
    pub fn derive(statement_date: NaiveDate, due_date: NaiveDate) -> Result<Self, TrackerError> {
        ensure_due_after(statement_date, due_date)?;

        Ok(Self {
            statement_day: statement_date.day(),
            days_until_due: (due_date - statement_date).num_days(),
        })
    }
}

/// Check the `due_date > statement_date` invariant
pub fn ensure_due_after(statement_date: NaiveDate, due_date: NaiveDate) -> Result<(), TrackerError> {
    if due_date <= statement_date {
        return Err(TrackerError::InvalidDateRange);
    }
    Ok(())
}
