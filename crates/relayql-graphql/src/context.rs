//! GraphQL execution context.
//!
//! [`GraphQLContext`] is the ORM handle: the model registry, the store and
//! the custom operations attached to entities. It is passed to the schema
//! builder and registered as schema data so every resolver can reach it.
//!
//! # Example
//!
//! ```ignore
//! use relayql_graphql::GraphQLContextBuilder;
//!
//! let context = GraphQLContextBuilder::new()
//!     .with_models(models)
//!     .with_store(store)
//!     .with_custom_operations("User", Arc::new(UserOperations))
//!     .build()?;
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use relayql_core::{Entity, ModelRegistry};
use relayql_storage::DynStore;

use crate::custom::CustomOperations;
use crate::error::GraphQLError;

/// Shared state reachable from every resolver.
///
/// Cheap to clone; all members are reference counted.
#[derive(Clone)]
pub struct GraphQLContext {
    /// Normalised entity definitions.
    pub models: Arc<ModelRegistry>,

    /// Persistence backend.
    pub store: DynStore,

    /// Custom operations keyed by entity name, in registration order.
    pub custom: IndexMap<String, Arc<dyn CustomOperations>>,
}

impl GraphQLContext {
    /// Creates a new builder for GraphQLContext.
    #[must_use]
    pub fn builder() -> GraphQLContextBuilder {
        GraphQLContextBuilder::default()
    }

    /// Looks up an entity by name.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::UnknownEntity` if the entity is not registered.
    pub fn entity(&self, name: &str) -> Result<&Arc<Entity>, GraphQLError> {
        self.models
            .get(name)
            .ok_or_else(|| GraphQLError::UnknownEntity(name.to_string()))
    }

    /// Custom operations registered for `entity`.
    pub fn custom_operations(&self, entity: &str) -> Option<&Arc<dyn CustomOperations>> {
        self.custom.get(entity)
    }
}

impl std::fmt::Debug for GraphQLContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLContext")
            .field("models", &self.models.names().collect::<Vec<_>>())
            .field("store", &self.store.backend_name())
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for constructing GraphQLContext.
///
/// This builder validates that all required fields are provided before
/// creating the context.
#[derive(Default)]
pub struct GraphQLContextBuilder {
    models: Option<Arc<ModelRegistry>>,
    store: Option<DynStore>,
    custom: IndexMap<String, Arc<dyn CustomOperations>>,
}

impl GraphQLContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model registry.
    #[must_use]
    pub fn with_models(mut self, models: impl Into<Arc<ModelRegistry>>) -> Self {
        self.models = Some(models.into());
        self
    }

    /// Sets the storage backend.
    #[must_use]
    pub fn with_store(mut self, store: DynStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Attaches custom operations to an entity. A second call for the same
    /// entity replaces the first.
    #[must_use]
    pub fn with_custom_operations(
        mut self,
        entity: impl Into<String>,
        operations: Arc<dyn CustomOperations>,
    ) -> Self {
        self.custom.insert(entity.into(), operations);
        self
    }

    /// Builds the GraphQLContext.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or custom operations
    /// are attached to an unknown entity.
    pub fn build(self) -> Result<GraphQLContext, ContextBuilderError> {
        let models = self
            .models
            .ok_or(ContextBuilderError::MissingField("models"))?;

        let store = self
            .store
            .ok_or(ContextBuilderError::MissingField("store"))?;

        if let Some(entity) = self.custom.keys().find(|name| models.get(name).is_none()) {
            return Err(ContextBuilderError::UnknownEntity(entity.clone()));
        }

        Ok(GraphQLContext {
            models,
            store,
            custom: self.custom,
        })
    }
}

/// Errors that can occur when building a GraphQLContext.
#[derive(Debug, thiserror::Error)]
pub enum ContextBuilderError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Custom operations reference an entity that is not registered.
    #[error("Custom operations attached to unknown model: {0}")]
    UnknownEntity(String),
}
