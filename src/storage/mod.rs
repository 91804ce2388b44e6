//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "sqlite")]
pub mod sample_data;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;
#[cfg(feature = "sqlite")]
pub use sample_data::load_sample_data;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
