//! Domain records and the validated commands that mutate them

use crate::core::cycle::BillingCycle;
use crate::core::lifecycle::PaymentSchedule;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A tracked credit card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: i64,
    pub name: String,
    pub last_four: String,
    pub statement_day: u32,
    pub days_until_due: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditCard {
    /// The card's stored cycle parameters
    pub fn cycle(&self) -> BillingCycle {
        BillingCycle {
            statement_day: self.statement_day,
            days_until_due: self.days_until_due,
        }
    }

    /// Apply a validated partial update
    pub fn apply_changes(&mut self, changes: &CardChanges, now: DateTime<Utc>) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(last_four) = &changes.last_four {
            self.last_four = last_four.clone();
        }
        if let Some(cycle) = changes.cycle {
            self.statement_day = cycle.statement_day;
            self.days_until_due = cycle.days_until_due;
        }
        match changes.credit_limit {
            CreditLimitChange::Keep => {}
            CreditLimitChange::Set(limit) => self.credit_limit = Some(limit),
            CreditLimitChange::Clear => self.credit_limit = None,
        }
        self.updated_at = now;
    }
}

/// A billing statement owned by a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: i64,
    pub card_id: i64,
    pub statement_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: f64,
    pub status: String,
    pub notified_statement: bool,
    pub notified_payment: bool,
    /// `reviewed_at` and `scheduled_payment_date`, present together or not at all
    #[serde(flatten)]
    pub schedule: Option<PaymentSchedule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated card, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub name: String,
    pub last_four: String,
    pub cycle: BillingCycle,
    pub credit_limit: Option<f64>,
}

impl NewCard {
    /// Materialize the record the store will hold
    pub fn into_card(self, id: i64, now: DateTime<Utc>) -> CreditCard {
        CreditCard {
            id,
            name: self.name,
            last_four: self.last_four,
            statement_day: self.cycle.statement_day,
            days_until_due: self.cycle.days_until_due,
            credit_limit: self.credit_limit,
            created_at: now,
            updated_at: now,
        }
    }
}

/// What an update does to the credit limit
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CreditLimitChange {
    #[default]
    Keep,
    Set(f64),
    Clear,
}

/// A validated partial card update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardChanges {
    pub name: Option<String>,
    pub last_four: Option<String>,
    pub cycle: Option<BillingCycle>,
    pub credit_limit: CreditLimitChange,
}

impl CardChanges {
    /// True when the update would touch nothing but `updated_at`
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.last_four.is_none()
            && self.cycle.is_none()
            && self.credit_limit == CreditLimitChange::Keep
    }
}

/// A validated statement, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewStatement {
    pub card_id: i64,
    pub statement_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: f64,
    pub status: String,
}

impl NewStatement {
    /// Materialize the record the store will hold
    pub fn into_statement(self, id: i64, now: DateTime<Utc>) -> Statement {
        Statement {
            id,
            card_id: self.card_id,
            statement_date: self.statement_date,
            due_date: self.due_date,
            amount: self.amount,
            status: self.status,
            notified_statement: false,
            notified_payment: false,
            schedule: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Which notification flag the webhook collaborator is recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// "statement created" was delivered
    Statement,
    /// "payment due" was delivered
    Payment,
}

impl NotificationKind {
    /// Column holding the flag
    pub fn column(self) -> &'static str {
        match self {
            NotificationKind::Statement => "notified_statement",
            NotificationKind::Payment => "notified_payment",
        }
    }
}

/// Result of deleting a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardDeletion {
    pub card_id: i64,
    /// Statements that existed at deletion time and were removed with the card
    pub statements_deleted: u64,
}
