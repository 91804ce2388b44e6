//! Internal event system for tracker mutations
//!
//! The EventBus uses `tokio::sync::broadcast` to decouple mutations from
//! whoever reacts to them (a webhook notifier, an audit log, tests).
//!
//! ```text
//! TrackerService ──▶ EventBus::publish() ──▶ broadcast channel ──▶ subscribers
//! ```
//!
//! Events are only published after the store reports success.

use crate::core::entity::{CreditCard, Statement};
use crate::core::lifecycle::PaymentSchedule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// A successful mutation of cards or statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrackerEvent {
    CardCreated {
        card: CreditCard,
    },
    CardUpdated {
        card: CreditCard,
    },
    /// The card and every statement it owned are gone
    CardDeleted {
        card_id: i64,
        statements_deleted: u64,
    },
    StatementCreated {
        statement: Statement,
    },
    StatementUpdated {
        statement_id: i64,
        status: String,
    },
    PaymentScheduled {
        statement_id: i64,
        #[serde(flatten)]
        schedule: PaymentSchedule,
    },
}

impl TrackerEvent {
    /// Kind of record the event is about
    pub fn entity_type(&self) -> &'static str {
        match self {
            TrackerEvent::CardCreated { .. }
            | TrackerEvent::CardUpdated { .. }
            | TrackerEvent::CardDeleted { .. } => "card",
            TrackerEvent::StatementCreated { .. }
            | TrackerEvent::StatementUpdated { .. }
            | TrackerEvent::PaymentScheduled { .. } => "statement",
        }
    }

    /// Id of the record the event is about
    pub fn entity_id(&self) -> i64 {
        match self {
            TrackerEvent::CardCreated { card } | TrackerEvent::CardUpdated { card } => card.id,
            TrackerEvent::CardDeleted { card_id, .. } => *card_id,
            TrackerEvent::StatementCreated { statement } => statement.id,
            TrackerEvent::StatementUpdated { statement_id, .. }
            | TrackerEvent::PaymentScheduled { statement_id, .. } => *statement_id,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            TrackerEvent::CardCreated { .. } | TrackerEvent::StatementCreated { .. } => "created",
            TrackerEvent::CardUpdated { .. } | TrackerEvent::StatementUpdated { .. } => "updated",
            TrackerEvent::CardDeleted { .. } => "deleted",
            TrackerEvent::PaymentScheduled { .. } => "scheduled",
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Position of the event on its bus, starting at 1
    pub sequence: u64,
    /// When the event was published
    pub timestamp: DateTime<Utc>,
    pub event: TrackerEvent,
}

/// Broadcast-based event bus
///
/// Cheap to clone; clones share the channel and the sequence counter.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// Receivers that fall more than `capacity` events behind get a
    /// `Lagged` error on their next recv().
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: TrackerEvent) -> usize {
        let envelope = EventEnvelope {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            timestamp: Utc::now(),
            event,
        };
        tracing::debug!(
            entity_type = envelope.event.entity_type(),
            entity_id = envelope.event.entity_id(),
            action = envelope.event.action(),
            "publishing tracker event"
        );
        // send() only errors when nobody is listening
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
