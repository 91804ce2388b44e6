//! Statement lifecycle
//!
//! A statement starts `pending`. An explicit status update may move it to any
//! status; scheduling a payment stamps `reviewed_at` and
//! `scheduled_payment_date` without touching the status.
//!
//! ```text
//!            schedule (status unchanged)
//!   pending ─────────────────────────────▶ pending + schedule
//!      │  ▲                                      │
//!      │  └──────── status update ───────────────┤
//!      ▼                                         ▼
//!    paid ◀──────────── status update ──────── overdue
//! ```
//!
//! Nothing moves a statement to `overdue` automatically; use
//! [`Statement::is_past_due`] to find candidates.

use crate::core::entity::Statement;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status assigned to statements created without one
pub const DEFAULT_STATUS: &str = "pending";

/// The statuses the application itself understands
///
/// Advisory only: the status update accepts any non-empty string, so stored
/// rows may hold values outside this set.
pub const KNOWN_STATUSES: [&str; 3] = ["pending", "paid", "overdue"];

/// The advisory status set as a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    Pending,
    Paid,
    Overdue,
}

impl StatementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementStatus::Pending => "pending",
            StatementStatus::Paid => "paid",
            StatementStatus::Overdue => "overdue",
        }
    }

    /// Recognize a stored status; `None` for values outside the known set
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(StatementStatus::Pending),
            "paid" => Some(StatementStatus::Paid),
            "overdue" => Some(StatementStatus::Overdue),
            _ => None,
        }
    }
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a reviewed statement's planned payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub reviewed_at: DateTime<Utc>,
    pub scheduled_payment_date: NaiveDate,
}

impl PaymentSchedule {
    /// Stamp a review happening at `now` for a payment on `date`
    pub fn stamp(date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            reviewed_at: now,
            scheduled_payment_date: date,
        }
    }
}

/// Where a statement stands, combining status and schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementPhase {
    /// Pending, nobody has reviewed it yet
    Pending,
    /// Pending, a payment date is planned
    Scheduled(NaiveDate),
    Paid,
    Overdue,
    /// A status outside [`KNOWN_STATUSES`]
    Other(String),
}

impl Statement {
    /// Current phase of the statement
    pub fn phase(&self) -> StatementPhase {
        match StatementStatus::parse(&self.status) {
            Some(StatementStatus::Pending) => match &self.schedule {
                Some(schedule) => StatementPhase::Scheduled(schedule.scheduled_payment_date),
                None => StatementPhase::Pending,
            },
            Some(StatementStatus::Paid) => StatementPhase::Paid,
            Some(StatementStatus::Overdue) => StatementPhase::Overdue,
            None => StatementPhase::Other(self.status.clone()),
        }
    }

    /// Whether a payment has been scheduled
    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_some()
    }

    /// Whether the due date has passed without the statement being paid
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status != StatementStatus::Paid.as_str() && today > self.due_date
    }

    /// Replace the status; any non-empty value is accepted
    pub fn apply_status(&mut self, status: &str, now: DateTime<Utc>) {
        self.status = status.to_string();
        self.updated_at = now;
    }

    /// Record a scheduled payment, overwriting any earlier schedule
    pub fn apply_schedule(&mut self, schedule: PaymentSchedule) {
        self.updated_at = schedule.reviewed_at;
        self.schedule = Some(schedule);
    }
}
