//! In-memory storage backend for RelayQL.
//!
//! This crate provides an in-memory implementation of the `ModelStore` trait
//! from `relayql-storage`. Each entity gets its own table behind a
//! `tokio::sync::RwLock`, so bulk updates and deletes are atomic with respect
//! to other writers.
//!
//! # Example
//!
//! ```ignore
//! use relayql_db_memory::InMemoryStorage;
//! use relayql_storage::ModelStore;
//!
//! let storage = InMemoryStorage::new();
//! let mut data = Record::new();
//! data.insert("email".into(), "a@b.com".into());
//! let created = storage.create(&user, data).await?;
//! ```

mod model_impl;
pub mod query;
pub mod storage;

// Re-export the ModelStore trait for convenience
pub use relayql_storage::{ModelStore, StorageError};

pub use storage::InMemoryStorage;

/// Creates a new shareable in-memory store.
pub fn create_store() -> relayql_storage::DynStore {
    std::sync::Arc::new(InMemoryStorage::new())
}
