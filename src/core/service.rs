//! Tracker operations
//!
//! [`TrackerService`] composes validation, the statement lifecycle and an
//! injected [`TrackerStore`]. Input is always validated before the store is
//! touched, and events are published only after a write succeeded.

use crate::core::entity::{CardDeletion, CreditCard, NotificationKind, Statement};
use crate::core::error::{StorageError, TrackerError, TrackerResult};
use crate::core::events::{EventBus, TrackerEvent};
use crate::core::lifecycle::PaymentSchedule;
use crate::core::store::TrackerStore;
use crate::core::validation::{
    CreateCardRequest, CreateStatementRequest, SchedulePaymentRequest, StatementUpdateRequest,
    UpdateCardRequest, validate_card_update, validate_new_card, validate_new_statement,
    validate_schedule_request, validate_statement_update,
};
use chrono::Utc;
use std::sync::Arc;

/// Card and statement operations over a shared store handle
#[derive(Clone)]
pub struct TrackerService {
    store: Arc<dyn TrackerStore>,
    events: Option<Arc<EventBus>>,
}

impl TrackerService {
    pub fn new(store: Arc<dyn TrackerStore>) -> Self {
        Self {
            store,
            events: None,
        }
    }

    /// Publish mutations on `events`
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn event_bus(&self) -> Option<&Arc<EventBus>> {
        self.events.as_ref()
    }

    fn publish(&self, event: TrackerEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }

    // === Cards ===

    pub async fn list_cards(&self) -> TrackerResult<Vec<CreditCard>> {
        self.store
            .list_cards()
            .await
            .map_err(|e| storage("list cards", e))
    }

    pub async fn get_card(&self, id: i64) -> TrackerResult<CreditCard> {
        self.store
            .get_card(id)
            .await
            .map_err(|e| storage("get card", e))?
            .ok_or_else(|| TrackerError::card_not_found(id))
    }

    pub async fn create_card(&self, request: CreateCardRequest) -> TrackerResult<CreditCard> {
        let new_card = validate_new_card(request)?;
        let card = self
            .store
            .create_card(new_card)
            .await
            .map_err(|e| storage("create card", e))?;

        tracing::info!(card_id = card.id, name = %card.name, "card created");
        self.publish(TrackerEvent::CardCreated { card: card.clone() });
        Ok(card)
    }

    /// Apply a partial update
    ///
    /// The request is validated before the card is looked up, so invalid
    /// input against a missing card reports the validation failure.
    pub async fn update_card(
        &self,
        id: i64,
        request: UpdateCardRequest,
    ) -> TrackerResult<CreditCard> {
        let changes = validate_card_update(request)?;
        let card = self
            .store
            .update_card(id, &changes)
            .await
            .map_err(|e| storage("update card", e))?
            .ok_or_else(|| TrackerError::card_not_found(id))?;

        tracing::info!(card_id = id, "card updated");
        self.publish(TrackerEvent::CardUpdated { card: card.clone() });
        Ok(card)
    }

    /// Delete a card together with its statements
    pub async fn delete_card(&self, id: i64) -> TrackerResult<CardDeletion> {
        let statements_deleted = self
            .store
            .delete_card(id)
            .await
            .map_err(|e| storage("delete card", e))?
            .ok_or_else(|| TrackerError::card_not_found(id))?;

        tracing::info!(card_id = id, statements_deleted, "card deleted");
        self.publish(TrackerEvent::CardDeleted {
            card_id: id,
            statements_deleted,
        });
        Ok(CardDeletion {
            card_id: id,
            statements_deleted,
        })
    }

    // === Statements ===

    pub async fn list_statements(&self) -> TrackerResult<Vec<Statement>> {
        self.store
            .list_statements()
            .await
            .map_err(|e| storage("list statements", e))
    }

    pub async fn get_statement(&self, id: i64) -> TrackerResult<Statement> {
        self.store
            .get_statement(id)
            .await
            .map_err(|e| storage("get statement", e))?
            .ok_or_else(|| TrackerError::statement_not_found(id))
    }

    pub async fn create_statement(
        &self,
        request: CreateStatementRequest,
    ) -> TrackerResult<Statement> {
        let new_statement = validate_new_statement(request)?;
        let card_id = new_statement.card_id;
        let statement = self
            .store
            .create_statement(new_statement)
            .await
            .map_err(|e| storage("create statement", e))?
            .ok_or_else(|| TrackerError::card_not_found(card_id))?;

        tracing::info!(
            statement_id = statement.id,
            card_id,
            due_date = %statement.due_date,
            "statement created"
        );
        self.publish(TrackerEvent::StatementCreated {
            statement: statement.clone(),
        });
        Ok(statement)
    }

    /// Replace a statement's status, returning the stored value
    pub async fn update_statement(
        &self,
        id: i64,
        request: StatementUpdateRequest,
    ) -> TrackerResult<String> {
        let status = validate_statement_update(request)?;
        let updated = self
            .store
            .update_statement_status(id, &status)
            .await
            .map_err(|e| storage("update statement", e))?;
        if !updated {
            return Err(TrackerError::statement_not_found(id));
        }

        tracing::info!(statement_id = id, status = %status, "statement status updated");
        self.publish(TrackerEvent::StatementUpdated {
            statement_id: id,
            status: status.clone(),
        });
        Ok(status)
    }

    /// Mark a statement as reviewed with a planned payment date
    ///
    /// The status is left untouched. Scheduling again overwrites the
    /// previous schedule.
    pub async fn schedule_payment(
        &self,
        id: i64,
        request: &SchedulePaymentRequest,
    ) -> TrackerResult<PaymentSchedule> {
        let date = validate_schedule_request(request)?;
        let schedule = PaymentSchedule::stamp(date, Utc::now());
        let updated = self
            .store
            .schedule_payment(id, schedule)
            .await
            .map_err(|e| storage("schedule payment", e))?;
        if !updated {
            return Err(TrackerError::statement_not_found(id));
        }

        tracing::info!(statement_id = id, scheduled_payment_date = %date, "payment scheduled");
        self.publish(TrackerEvent::PaymentScheduled {
            statement_id: id,
            schedule,
        });
        Ok(schedule)
    }

    /// Record that a notification was delivered for a statement
    pub async fn mark_notified(&self, id: i64, kind: NotificationKind) -> TrackerResult<()> {
        let updated = self
            .store
            .mark_notified(id, kind)
            .await
            .map_err(|e| storage("mark notified", e))?;
        if !updated {
            return Err(TrackerError::statement_not_found(id));
        }
        tracing::debug!(statement_id = id, flag = kind.column(), "notification recorded");
        Ok(())
    }
}

fn storage(operation: &'static str, err: anyhow::Error) -> TrackerError {
    TrackerError::Storage(StorageError::from_gateway(operation, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{CardChanges, NewCard, NewStatement};
    use crate::storage::InMemoryStore;
    use anyhow::anyhow;
    use async_trait::async_trait;

    fn service() -> TrackerService {
        TrackerService::new(Arc::new(InMemoryStore::new()))
    }

    fn chase() -> CreateCardRequest {
        CreateCardRequest {
            name: "Chase Sapphire".to_string(),
            last_four: "1234".to_string(),
            statement_date: "2024-11-15".to_string(),
            due_date: "2024-12-10".to_string(),
            credit_limit: Some(5000.0),
        }
    }

    fn statement_for(card_id: i64, due_date: &str) -> CreateStatementRequest {
        CreateStatementRequest {
            card_id,
            statement_date: "2024-11-01".to_string(),
            due_date: due_date.to_string(),
            amount: 1500.50,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_card_round_trip() {
        let service = service();
        let created = service.create_card(chase()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.statement_day, 15);
        assert_eq!(created.days_until_due, 25);

        let fetched = service.get_card(created.id).await.unwrap();
        assert_eq!(fetched.name, "Chase Sapphire");
        assert_eq!(fetched.last_four, "1234");
        assert_eq!(fetched.credit_limit, Some(5000.0));
        assert_eq!(fetched.statement_day, created.statement_day);
        assert_eq!(fetched.days_until_due, created.days_until_due);
    }

    #[tokio::test]
    async fn test_get_missing_card_is_not_found() {
        let err = service().get_card(99).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "card", id: 99 }));
    }

    #[tokio::test]
    async fn test_update_missing_card_is_not_found() {
        let request = UpdateCardRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let err = service().update_card(7, request).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "card", id: 7 }));
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let request = UpdateCardRequest {
            statement_date: Some("2024-11-20".to_string()),
            ..Default::default()
        };
        let err = service().update_card(7, request).await.unwrap_err();
        assert!(matches!(err, TrackerError::IncompletePair));
    }

    #[tokio::test]
    async fn test_update_card_with_new_dates() {
        let service = service();
        let card = service.create_card(chase()).await.unwrap();
        let updated = service
            .update_card(
                card.id,
                UpdateCardRequest {
                    statement_date: Some("2024-11-20".to_string()),
                    due_date: Some("2024-12-17".to_string()),
                    clear_credit_limit: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.statement_day, 20);
        assert_eq!(updated.days_until_due, 27);
        assert_eq!(updated.credit_limit, None);
        assert_eq!(updated.name, "Chase Sapphire");
    }

    #[tokio::test]
    async fn test_statement_for_missing_card_is_not_found() {
        let err = service()
            .create_statement(statement_for(42, "2024-11-15"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "card", id: 42 }));
    }

    #[tokio::test]
    async fn test_statement_defaults_to_pending() {
        let service = service();
        let card = service.create_card(chase()).await.unwrap();
        let statement = service
            .create_statement(statement_for(card.id, "2024-11-15"))
            .await
            .unwrap();
        assert!(statement.id > 0);
        assert_eq!(statement.status, "pending");
        assert!(!statement.notified_statement);
        assert!(statement.schedule.is_none());
    }

    #[tokio::test]
    async fn test_delete_card_reports_statement_count() {
        let service = service();
        let card = service.create_card(chase()).await.unwrap();
        for due in ["2024-11-15", "2024-11-20", "2024-11-25"] {
            service
                .create_statement(statement_for(card.id, due))
                .await
                .unwrap();
        }

        let deletion = service.delete_card(card.id).await.unwrap();
        assert_eq!(deletion.statements_deleted, 3);
        assert!(service.list_statements().await.unwrap().is_empty());
        assert!(matches!(
            service.get_card(card.id).await.unwrap_err(),
            TrackerError::NotFound { .. }
        ));

        let err = service.delete_card(card.id).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "card", .. }));
    }

    #[tokio::test]
    async fn test_schedule_sets_both_fields_and_keeps_status() {
        let service = service();
        let card = service.create_card(chase()).await.unwrap();
        let statement = service
            .create_statement(statement_for(card.id, "2024-11-15"))
            .await
            .unwrap();

        let schedule = service
            .schedule_payment(
                statement.id,
                &SchedulePaymentRequest {
                    scheduled_payment_date: "2024-11-12".to_string(),
                },
            )
            .await
            .unwrap();

        let stored = service.get_statement(statement.id).await.unwrap();
        assert_eq!(stored.status, "pending");
        assert_eq!(stored.schedule, Some(schedule));
        assert_eq!(schedule.scheduled_payment_date.to_string(), "2024-11-12");
    }

    #[tokio::test]
    async fn test_schedule_missing_statement_is_not_found() {
        let err = service()
            .schedule_payment(
                5,
                &SchedulePaymentRequest {
                    scheduled_payment_date: "2024-11-12".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "statement", id: 5 }));
    }

    #[tokio::test]
    async fn test_status_update_and_notification_flags() {
        let service = service();
        let card = service.create_card(chase()).await.unwrap();
        let statement = service
            .create_statement(statement_for(card.id, "2024-11-15"))
            .await
            .unwrap();

        let status = service
            .update_statement(
                statement.id,
                StatementUpdateRequest {
                    status: Some("paid".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(status, "paid");

        service
            .mark_notified(statement.id, NotificationKind::Payment)
            .await
            .unwrap();
        let stored = service.get_statement(statement.id).await.unwrap();
        assert_eq!(stored.status, "paid");
        assert!(stored.notified_payment);
        assert!(!stored.notified_statement);

        let err = service
            .update_statement(
                999,
                StatementUpdateRequest {
                    status: Some("paid".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "statement", .. }));
    }

    #[tokio::test]
    async fn test_events_published_after_writes() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let service = service().with_event_bus(bus);

        let card = service.create_card(chase()).await.unwrap();
        service.delete_card(card.id).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event.action(), "created");
        assert_eq!(first.event.entity_id(), card.id);

        let second = rx.recv().await.unwrap();
        assert_eq!(
            second.event,
            TrackerEvent::CardDeleted {
                card_id: card.id,
                statements_deleted: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_rejected_input_publishes_nothing() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let service = service().with_event_bus(bus);

        let mut request = chase();
        request.last_four = "12".to_string();
        assert!(service.create_card(request).await.is_err());
        assert!(rx.try_recv().is_err());
    }

    struct BrokenStore;

    #[async_trait]
    impl TrackerStore for BrokenStore {
        async fn list_cards(&self) -> anyhow::Result<Vec<CreditCard>> {
            Err(anyhow!("database is locked"))
        }
        async fn get_card(&self, _id: i64) -> anyhow::Result<Option<CreditCard>> {
            Err(anyhow!("database is locked"))
        }
        async fn create_card(&self, _card: NewCard) -> anyhow::Result<CreditCard> {
            Err(anyhow!("database is locked"))
        }
        async fn update_card(
            &self,
            _id: i64,
            _changes: &CardChanges,
        ) -> anyhow::Result<Option<CreditCard>> {
            Err(anyhow!("database is locked"))
        }
        async fn delete_card(&self, _id: i64) -> anyhow::Result<Option<u64>> {
            Err(anyhow!("database is locked"))
        }
        async fn list_statements(&self) -> anyhow::Result<Vec<Statement>> {
            Err(anyhow!("database is locked"))
        }
        async fn get_statement(&self, _id: i64) -> anyhow::Result<Option<Statement>> {
            Err(anyhow!("database is locked"))
        }
        async fn create_statement(
            &self,
            _statement: NewStatement,
        ) -> anyhow::Result<Option<Statement>> {
            Err(anyhow!("database is locked"))
        }
        async fn update_statement_status(&self, _id: i64, _status: &str) -> anyhow::Result<bool> {
            Err(anyhow!("database is locked"))
        }
        async fn schedule_payment(
            &self,
            _id: i64,
            _schedule: PaymentSchedule,
        ) -> anyhow::Result<bool> {
            Err(anyhow!("database is locked"))
        }
        async fn mark_notified(&self, _id: i64, _kind: NotificationKind) -> anyhow::Result<bool> {
            Err(anyhow!("database is locked"))
        }
    }

    #[tokio::test]
    async fn test_gateway_failure_becomes_storage_error() {
        let service = TrackerService::new(Arc::new(BrokenStore));

        let err = service.create_card(chase()).await.unwrap_err();
        match &err {
            TrackerError::Storage(e) => {
                assert_eq!(e.operation, "create card");
                assert!(e.message.contains("locked"));
            }
            other => panic!("expected storage error, got {other:?}"),
        }
        assert_eq!(err.to_response().message, "Internal server error");
    }

    #[tokio::test]
    async fn test_validation_runs_before_gateway() {
        let service = TrackerService::new(Arc::new(BrokenStore));
        let mut request = chase();
        request.name = "A".to_string();
        let err = service.create_card(request).await.unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
    }
}
