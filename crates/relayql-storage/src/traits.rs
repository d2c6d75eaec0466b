//! The persistence trait consumed by generated resolvers.

use async_trait::async_trait;
use relayql_core::{Entity, Record};
use serde_json::Value;

use crate::error::StorageError;
use crate::filter::Filter;
use crate::types::FindOptions;

/// The storage trait that every RelayQL backend implements.
///
/// Every call receives the normalised [`Entity`] so the backend knows the
/// primary key, defaults and constraints of the table it touches.
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use relayql_storage::{ModelStore, StorageError};
///
/// async fn get_user(store: &dyn ModelStore, user: &Entity, id: i64) -> Result<Record, StorageError> {
///     store
///         .find_by_pk(user, &id.into())
///         .await?
///         .ok_or_else(|| StorageError::not_found("User", id.to_string()))
/// }
/// ```
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Inserts a row and returns it as stored, including generated values.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the primary key is taken.
    /// Returns `StorageError::InvalidRecord` if a non-null attribute is missing.
    /// Returns `StorageError::ConstraintViolation` if a unique attribute collides.
    async fn create(&self, entity: &Entity, data: Record) -> Result<Record, StorageError>;

    /// Returns the rows matching `options`, ordered and paginated.
    async fn find_all(
        &self,
        entity: &Entity,
        options: &FindOptions,
    ) -> Result<Vec<Record>, StorageError>;

    /// Returns the first row matching `options`.
    async fn find_one(
        &self,
        entity: &Entity,
        options: &FindOptions,
    ) -> Result<Option<Record>, StorageError> {
        let options = options.clone().with_limit(1);
        Ok(self.find_all(entity, &options).await?.into_iter().next())
    }

    /// Returns the row whose primary key equals `pk`.
    async fn find_by_pk(&self, entity: &Entity, pk: &Value) -> Result<Option<Record>, StorageError> {
        let options =
            FindOptions::new().with_filter(Filter::new().eq(entity.primary_key(), pk.clone()));
        self.find_one(entity, &options).await
    }

    /// Applies `values` to every row matching `filter`; returns the affected count.
    async fn update(
        &self,
        entity: &Entity,
        values: Record,
        filter: &Filter,
    ) -> Result<u64, StorageError>;

    /// Removes every row matching `filter`; returns the affected count.
    async fn destroy(&self, entity: &Entity, filter: &Filter) -> Result<u64, StorageError>;

    /// Counts the rows matching `filter`.
    async fn count(&self, entity: &Entity, filter: &Filter) -> Result<u64, StorageError>;

    /// Short backend identifier for logs.
    fn backend_name(&self) -> &'static str;
}
