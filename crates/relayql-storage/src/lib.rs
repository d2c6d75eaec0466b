//! # relayql-storage
//!
//! Persistence abstraction consumed by the RelayQL schema generator.
//!
//! This crate defines the [`ModelStore`] trait and the query types shared by
//! every backend. It does not contain any implementation; see
//! `relayql-db-memory` for the in-memory backend.
//!
//! ## Example
//!
//! ```ignore
//! use relayql_storage::{Filter, FindOptions, ModelStore, StorageError};
//!
//! async fn open_todos(
//!     store: &dyn ModelStore,
//!     todo: &Entity,
//! ) -> Result<Vec<Record>, StorageError> {
//!     let options = FindOptions::new()
//!         .with_filter(Filter::new().eq("completed", false))
//!         .with_sort("createdAt", true)
//!         .with_limit(10);
//!
//!     store.find_all(todo, &options).await
//! }
//! ```

mod error;
mod filter;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use filter::{Condition, Filter, compare_values, values_equal};
pub use traits::ModelStore;
pub use types::{FindOptions, SortParam};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared store trait object.
pub type DynStore = std::sync::Arc<dyn ModelStore>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::filter::{Condition, Filter};
    pub use crate::traits::ModelStore;
    pub use crate::types::{FindOptions, SortParam};
    pub use crate::{DynStore, StorageResult};
}
