//! # card-tracker
//!
//! Credit card statement tracking: cards with a billing cycle, statements
//! moving through a small lifecycle, and payment scheduling, exposed as a
//! JSON HTTP API.
//!
//! ## Features
//!
//! - **Billing cycles**: derived once from a sample statement/due date pair
//! - **Statement lifecycle**: pending, scheduled, paid, overdue
//! - **Validation first**: every rule is checked before storage is touched
//! - **Pluggable storage**: SQLite (feature `sqlite`, default) or in-memory
//! - **Events**: mutations are published on a broadcast bus
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use card_tracker::prelude::*;
//!
//! let store = SqliteStore::open("./credit_cards.db").await?;
//! ServerBuilder::new()
//!     .with_store(store)
//!     .with_static_dir("./static")
//!     .serve("0.0.0.0:8080")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        BillingCycle, CardDeletion, CreditCard, NotificationKind, PaymentSchedule, Statement,
        StatementPhase, StatementStatus,
    };

    // === Operations ===
    pub use crate::core::{
        EventBus, TrackerError, TrackerEvent, TrackerResult, TrackerService, TrackerStore,
    };
    pub use crate::core::validation::{
        CreateCardRequest, CreateStatementRequest, SchedulePaymentRequest, StatementUpdateRequest,
        UpdateCardRequest,
    };

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "sqlite")]
    pub use crate::storage::{SqliteStore, load_sample_data};

    // === Config ===
    pub use crate::config::{AppConfig, ServerSettings};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
}
