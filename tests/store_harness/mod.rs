//! Shared test harness for `TrackerStore` backends
//!
//! Provides fixture builders for validated cards and statements plus the
//! `tracker_store_tests!` macro that generates the conformance suite.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//!
//! tracker_store_tests!(InMemoryStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod contract;

pub use card_tracker::prelude::*;
use card_tracker::core::entity::{NewCard, NewStatement};

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

/// A validated card with the cycle derived from a sample statement pair
pub fn new_card(name: &str, statement_date: &str, due_date: &str) -> NewCard {
    NewCard {
        name: name.to_string(),
        last_four: "4321".to_string(),
        cycle: BillingCycle::derive(date(statement_date), date(due_date)).unwrap(),
        credit_limit: None,
    }
}

pub fn new_statement(card_id: i64, due_date: &str, amount: f64) -> NewStatement {
    NewStatement {
        card_id,
        statement_date: date("2024-11-01"),
        due_date: date(due_date),
        amount,
        status: "pending".to_string(),
    }
}
