//! # relayql-graphql
//!
//! Relay-compliant GraphQL schema generation for RelayQL models.
//!
//! The schema is derived from a [`ModelRegistry`](relayql_core::ModelRegistry)
//! and resolves against any [`ModelStore`](relayql_storage::ModelStore).
//! Every entity gets an object type, `findById`/`findAll` queries and relay
//! mutations for create, update and delete. Associations become nested
//! fields and paginated connections.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   ModelSchemaBuilder                 │
//! │  ┌─────────────┐  ┌──────────────────┐  ┌─────────┐  │
//! │  │ ModelTypes  │  │ AssociationIndex │  │TypeCache│  │
//! │  └─────────────┘  └──────────────────┘  └─────────┘  │
//! │           │                │                 │       │
//! │           ▼                ▼                 ▼       │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │   OperationFactory (queries and mutations)     │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//!              async_graphql::dynamic::Schema
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use relayql_graphql::{GraphQLContext, get_schema};
//!
//! let context = GraphQLContext::builder()
//!     .with_models(models)
//!     .with_store(relayql_db_memory::create_store())
//!     .build()?;
//!
//! let schema = get_schema(&context)?;
//! let response = schema.execute("{ users { id email } }").await;
//! ```

pub mod config;
pub mod context;
pub mod custom;
pub mod error;
pub mod global_id;
pub mod naming;
pub(crate) mod operations;
pub mod resolvers;
pub mod schema;

pub use config::{ConfigError, GraphQLConfig};
pub use context::{ContextBuilderError, GraphQLContext, GraphQLContextBuilder};
pub use custom::{CustomFields, CustomOperationContext, CustomOperations, ResolverFactory};
pub use error::GraphQLError;
pub use global_id::{from_global_id, to_global_id};
pub use schema::{ModelSchemaBuilder, ModelTypes, SchemaBuilderConfig, get_schema};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
