//! HTTP server
//!
//! [`ServerBuilder`] wires a [`TrackerStore`](crate::core::store::TrackerStore)
//! into the route table of [`router`] and serves it with graceful shutdown.

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
