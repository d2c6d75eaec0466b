//! Object types for entities.

use std::collections::HashSet;

use async_graphql::dynamic::{Field, Object, TypeRef};
use relayql_core::{Association, Entity};
use tracing::trace;

use super::attributes::{AttributeFieldOptions, RecordSource, attribute_fields};
use super::model_types::ModelTypes;
use super::node::NODE_INTERFACE;
use crate::error::GraphQLError;
use crate::naming::connection_name_for_association;
use crate::resolvers::BelongsToResolver;

/// Builds the object type of `entity`: its exposed attributes, then one
/// field per association.
///
/// Entities whose primary key is named `id` implement `Node`.
pub(crate) fn build_entity_type(entity: &Entity, model_types: &ModelTypes) -> Result<Object, GraphQLError> {
    let mut object = Object::new(entity.name());
    if let Some(description) = entity.description() {
        object = object.description(description);
    }
    if entity.primary_key() == "id" {
        object = object.implement(NODE_INTERFACE);
    }

    let mut names = HashSet::new();
    let mut add = |object: Object, name: &str, field: Field| -> Result<Object, GraphQLError> {
        if !names.insert(name.to_string()) {
            return Err(GraphQLError::SchemaBuildFailed(format!(
                "{}.{name} is defined more than once",
                entity.name()
            )));
        }
        trace!(entity = %entity.name(), field = %name, "Added entity field");
        Ok(object.field(field))
    };

    let fields = attribute_fields(entity, AttributeFieldOptions::output());
    let attribute_names: Vec<String> = fields.names().map(str::to_string).collect();
    for (name, field) in attribute_names
        .iter()
        .zip(fields.into_output_fields(RecordSource::Parent))
    {
        object = add(object, name, field)?;
    }

    for association in entity.associations() {
        let key = association.key();
        let target = association.target();
        let missing_target = || GraphQLError::MissingAssociationTarget {
            entity: entity.name().to_string(),
            association: key.to_string(),
            target: target.to_string(),
        };

        let field = match association {
            Association::BelongsTo { .. } => {
                let type_name = model_types.entity_type(target).ok_or_else(missing_target)?;
                Field::new(
                    key,
                    TypeRef::named(type_name),
                    BelongsToResolver::resolve(entity.name().to_string(), key.to_string()),
                )
            }
            Association::HasMany { .. } | Association::BelongsToMany { .. } => {
                let name = connection_name_for_association(entity.name(), key);
                model_types
                    .connection(&name)
                    .ok_or_else(missing_target)?
                    .entity_field()
            }
        };
        object = add(object, key, field)?;
    }

    Ok(object)
}
