//! Registry of generated entity and connection types.
//!
//! Built in two phases: entity handles first, so fields can reference any
//! entity type by name regardless of declaration order, then connections
//! once the association index has built them.

use std::sync::Arc;

use async_graphql::dynamic::{Enum, EnumItem, TypeRef};
use indexmap::IndexMap;
use relayql_core::{AttributeType, ModelRegistry};

use super::connection::Connection;
use super::type_cache::TypeCache;
use crate::error::GraphQLError;
use crate::naming::enum_type_name;

/// Entity name to object type name, and connection name to connection.
#[derive(Debug, Default)]
pub struct ModelTypes {
    entities: IndexMap<String, String>,
    connections: IndexMap<String, Arc<Connection>>,
}

impl ModelTypes {
    /// Registers a handle for every entity and the enum types of their attributes.
    pub(crate) fn register_entities(models: &ModelRegistry, cache: &mut TypeCache) -> Result<Self, GraphQLError> {
        let mut types = Self::default();
        for entity in models.iter() {
            for attribute in entity.attributes() {
                if let AttributeType::Enum(values) = &attribute.ty {
                    let name = enum_type_name(entity.name(), &attribute.name);
                    let enum_type = values
                        .iter()
                        .fold(Enum::new(name.clone()), |ty, value| ty.item(EnumItem::new(value)));
                    cache.insert(name, enum_type)?;
                }
            }
            types
                .entities
                .insert(entity.name().to_string(), entity.name().to_string());
        }
        Ok(types)
    }

    /// Object type name of `entity`.
    pub fn entity_type(&self, entity: &str) -> Option<&str> {
        self.entities.get(entity).map(String::as_str)
    }

    /// Nullable reference to the object type of `entity`.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::UnknownEntity` if `entity` has no type.
    pub fn entity_ref(&self, entity: &str) -> Result<TypeRef, GraphQLError> {
        self.entity_type(entity)
            .map(TypeRef::named)
            .ok_or_else(|| GraphQLError::UnknownEntity(entity.to_string()))
    }

    pub fn connection(&self, name: &str) -> Option<&Arc<Connection>> {
        self.connections.get(name)
    }

    pub(crate) fn insert_connection(&mut self, connection: Arc<Connection>) {
        self.connections.insert(connection.name.clone(), connection);
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn connection_names(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }
}
