//! Persistence gateway for cards and statements

use crate::core::entity::{
    CardChanges, CreditCard, NewCard, NewStatement, NotificationKind, Statement,
};
use crate::core::lifecycle::PaymentSchedule;
use anyhow::Result;
use async_trait::async_trait;

/// Storage backend for the tracker
///
/// Implementations only persist; input has already been validated by the
/// caller. Lookups that miss return `None` (or `false`) rather than an
/// error, and `Err` is reserved for backend failures.
#[async_trait]
pub trait TrackerStore: Send + Sync {
    /// All cards ordered by name ascending
    async fn list_cards(&self) -> Result<Vec<CreditCard>>;

    async fn get_card(&self, id: i64) -> Result<Option<CreditCard>>;

    /// Insert a card and return it with its assigned id
    async fn create_card(&self, card: NewCard) -> Result<CreditCard>;

    /// Apply a partial update; `None` when the card does not exist
    async fn update_card(&self, id: i64, changes: &CardChanges) -> Result<Option<CreditCard>>;

    /// Delete a card and all of its statements atomically
    ///
    /// Returns the number of statements removed, or `None` when the card
    /// does not exist (in which case nothing is deleted).
    async fn delete_card(&self, id: i64) -> Result<Option<u64>>;

    /// All statements ordered by due date descending
    async fn list_statements(&self) -> Result<Vec<Statement>>;

    async fn get_statement(&self, id: i64) -> Result<Option<Statement>>;

    /// Insert a statement; `None` when the owning card does not exist
    async fn create_statement(&self, statement: NewStatement) -> Result<Option<Statement>>;

    /// Replace a statement's status; `false` when no row matched
    async fn update_statement_status(&self, id: i64, status: &str) -> Result<bool>;

    /// Record a scheduled payment; `false` when no row matched
    async fn schedule_payment(&self, id: i64, schedule: PaymentSchedule) -> Result<bool>;

    /// Set one of the notification flags; `false` when no row matched
    async fn mark_notified(&self, id: i64, kind: NotificationKind) -> Result<bool>;
}
