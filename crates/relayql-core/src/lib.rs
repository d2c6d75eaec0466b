//! # relayql-core
//!
//! Model definitions consumed by the RelayQL schema generator.
//!
//! An application declares its [`Entity`] types and the associations between
//! them on a [`ModelRegistryBuilder`]. Building the registry normalises the
//! model graph the way an ORM does at definition time: implicit primary keys,
//! timestamp attributes and foreign-key attributes are added, and every
//! association target is checked.
//!
//! ```ignore
//! use relayql_core::{Attribute, AttributeType, AssociationOptions, Entity, ModelRegistry};
//!
//! let models = ModelRegistry::builder()
//!     .define(Entity::new("User").with_attribute(Attribute::new("email", AttributeType::String)))
//!     .define(Entity::new("Todo").with_attribute(Attribute::new("text", AttributeType::String)))
//!     .has_many("User", "Todo", AssociationOptions::new().alias("todos"))
//!     .build()?;
//! ```

pub mod association;
pub mod attribute;
pub mod entity;
pub mod error;
pub mod inflection;
pub mod registry;

pub use association::{Association, AssociationKind, AssociationOptions, ThroughOptions};
pub use attribute::{Attribute, AttributeResolver, AttributeType};
pub use entity::Entity;
pub use error::{CoreError, Result};
pub use inflection::{camel_case, pluralize, upper_first};
pub use registry::{ModelRegistry, ModelRegistryBuilder};

/// A persisted row, keyed by attribute name.
pub type Record = serde_json::Map<String, serde_json::Value>;
