//! Conformance tests for `InMemoryStore` using the store harness.

#[macro_use]
mod store_harness;

use card_tracker::storage::InMemoryStore;
use store_harness::*;

tracker_store_tests!(InMemoryStore::new());
