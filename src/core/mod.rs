//! Core module: domain types, rules and the operations built on them

pub mod cycle;
pub mod entity;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod service;
pub mod store;
pub mod validation;

pub use cycle::BillingCycle;
pub use entity::{CardDeletion, CreditCard, NotificationKind, Statement};
pub use error::{TrackerError, TrackerResult};
pub use events::{EventBus, TrackerEvent};
pub use lifecycle::{PaymentSchedule, StatementPhase, StatementStatus};
pub use service::TrackerService;
pub use store::TrackerStore;
