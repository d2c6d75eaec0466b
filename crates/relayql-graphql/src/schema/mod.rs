//! Schema generation from the model registry.
//!
//! ## Components
//!
//! - [`ModelSchemaBuilder`] - Assembles the schema in phases
//! - [`ModelTypes`] - Entity and connection type registry
//! - [`AssociationIndex`] - Associations by target and by source
//! - [`TypeCache`] - Every generated type, defined once
//! - [`attribute_fields`] - Attribute to field mapping, with global ids
//!
//! ## Build phases
//!
//! 1. Shared types (`JSON`, `PageInfo`, `Node`), entity handles and enum types
//! 2. Association index, building every connection type
//! 3. Per entity: object type, then its seven operations
//! 4. Custom operations merged into the roots
//! 5. Node type mapper, `Query` and `Mutation` roots

mod association_index;
mod attributes;
mod builder;
mod connection;
mod entity_type;
mod model_types;
mod node;
mod type_cache;

pub use association_index::{AssociationEntry, AssociationIndex, AssociationLink};
pub use attributes::{
    AttributeField, AttributeFieldOptions, AttributeFields, FieldKind, JSON_SCALAR, RecordSource,
    attribute_fields, convert_fields_to_global_id,
};
pub use builder::{ModelSchemaBuilder, SchemaBuilderConfig, get_schema};
pub use connection::{Connection, PAGE_INFO};
pub use model_types::ModelTypes;
pub use node::{NODE_INTERFACE, NodeTypeMapper};
pub use type_cache::TypeCache;
