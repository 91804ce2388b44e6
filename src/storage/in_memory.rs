//! In-memory implementation of TrackerStore for testing and development

use crate::core::entity::{
    CardChanges, CreditCard, NewCard, NewStatement, NotificationKind, Statement,
};
use crate::core::lifecycle::PaymentSchedule;
use crate::core::store::TrackerStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Tables {
    cards: BTreeMap<i64, CreditCard>,
    statements: BTreeMap<i64, Statement>,
    last_card_id: i64,
    last_statement_id: i64,
}

/// In-memory tracker store
///
/// Both tables sit behind a single RwLock, so every multi-row operation is
/// atomic. Deleting a card removes its statements like the SQL cascade does.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackerStore for InMemoryStore {
    async fn list_cards(&self) -> Result<Vec<CreditCard>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut cards: Vec<CreditCard> = tables.cards.values().cloned().collect();
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cards)
    }

    async fn get_card(&self, id: i64) -> Result<Option<CreditCard>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables.cards.get(&id).cloned())
    }

    async fn create_card(&self, card: NewCard) -> Result<CreditCard> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        tables.last_card_id += 1;
        let card = card.into_card(tables.last_card_id, Utc::now());
        tables.cards.insert(card.id, card.clone());
        Ok(card)
    }

    async fn update_card(&self, id: i64, changes: &CardChanges) -> Result<Option<CreditCard>> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(tables.cards.get_mut(&id).map(|card| {
            card.apply_changes(changes, Utc::now());
            card.clone()
        }))
    }

    async fn delete_card(&self, id: i64) -> Result<Option<u64>> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if tables.cards.remove(&id).is_none() {
            return Ok(None);
        }
        let before = tables.statements.len();
        tables.statements.retain(|_, s| s.card_id != id);
        Ok(Some((before - tables.statements.len()) as u64))
    }

    async fn list_statements(&self) -> Result<Vec<Statement>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut statements: Vec<Statement> = tables.statements.values().cloned().collect();
        statements.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        Ok(statements)
    }

    async fn get_statement(&self, id: i64) -> Result<Option<Statement>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables.statements.get(&id).cloned())
    }

    async fn create_statement(&self, statement: NewStatement) -> Result<Option<Statement>> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !tables.cards.contains_key(&statement.card_id) {
            return Ok(None);
        }
        tables.last_statement_id += 1;
        let statement = statement.into_statement(tables.last_statement_id, Utc::now());
        tables.statements.insert(statement.id, statement.clone());
        Ok(Some(statement))
    }

    async fn update_statement_status(&self, id: i64, status: &str) -> Result<bool> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match tables.statements.get_mut(&id) {
            Some(statement) => {
                statement.apply_status(status, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn schedule_payment(&self, id: i64, schedule: PaymentSchedule) -> Result<bool> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match tables.statements.get_mut(&id) {
            Some(statement) => {
                statement.apply_schedule(schedule);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_notified(&self, id: i64, kind: NotificationKind) -> Result<bool> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(statement) = tables.statements.get_mut(&id) else {
            return Ok(false);
        };
        match kind {
            NotificationKind::Statement => statement.notified_statement = true,
            NotificationKind::Payment => statement.notified_payment = true,
        }
        statement.updated_at = Utc::now();
        Ok(true)
    }
}
