//! `delete<Entity>` and `delete<Entities>` mutations.

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, TypeRef};
use relayql_core::Entity;
use relayql_storage::Filter;
use tracing::{debug, warn};

use super::relay::{RelayMutation, try_payload_ref};
use super::update::{BulkPayload, affected_count_field, partial_input, take_primary_key, take_record};
use crate::error::GraphQLError;
use crate::naming::{DELETE, DELETE_ONE, delete_where_input_name, deleted_id_field, mutation_name};
use crate::schema::TypeCache;

/// Result of `delete<Entity>`: the submitted global id.
#[derive(Debug, Clone)]
pub(crate) struct DeletedPayload {
    pub global_id: String,
}

pub(crate) fn delete_one_mutation(entity: &Entity, cache: &mut TypeCache) -> Result<Field, GraphQLError> {
    let deleted_id = Field::new(
        deleted_id_field(entity.name()),
        TypeRef::named(TypeRef::ID),
        |ctx| {
            FieldFuture::new(async move {
                let payload = try_payload_ref::<DeletedPayload>(ctx.parent_value)?;
                Ok(Some(FieldValue::value(payload.global_id.clone())))
            })
        },
    );

    let entity_name = entity.name().to_string();
    RelayMutation::new(mutation_name(entity.name(), DELETE_ONE))
        .description(format!("Delete a {} record by id", entity.name()))
        .input_field(InputValue::new(
            entity.primary_key(),
            TypeRef::named_nn(TypeRef::ID),
        ))
        .output_field(deleted_id)
        .build(cache, move |gql_ctx, mut data| {
            let entity_name = entity_name.clone();
            async move {
                let model = gql_ctx.entity(&entity_name)?;
                let (global_id, key) = take_primary_key(model, &mut data)?;

                let affected = gql_ctx
                    .store
                    .destroy(model, &Filter::new().eq(model.primary_key(), key))
                    .await
                    .map_err(|e| {
                        warn!(error = %e, entity = %entity_name, "Delete failed");
                        GraphQLError::from(e)
                    })?;
                debug!(entity = %entity_name, affected, "Record deleted");

                Ok::<_, GraphQLError>(DeletedPayload { global_id })
            }
        })
}

pub(crate) fn delete_many_mutation(entity: &Entity, cache: &mut TypeCache) -> Result<Field, GraphQLError> {
    let where_input = delete_where_input_name(entity.name());
    cache.get_or_insert_with(&where_input, || Ok(partial_input(&where_input, entity)))?;

    let entity_name = entity.name().to_string();
    RelayMutation::new(mutation_name(entity.name(), DELETE))
        .description(format!("Delete every {} record matching where", entity.name()))
        .input_field(InputValue::new("where", TypeRef::named_nn(where_input)))
        .output_field(affected_count_field())
        .build(cache, move |gql_ctx, mut data| {
            let entity_name = entity_name.clone();
            async move {
                let model = gql_ctx.entity(&entity_name)?;
                let filter = take_record(model, &mut data, "where")?;

                let affected_count = gql_ctx
                    .store
                    .destroy(model, &Filter::equals(&filter))
                    .await
                    .map_err(|e| {
                        warn!(error = %e, entity = %entity_name, "Bulk delete failed");
                        GraphQLError::from(e)
                    })?;
                debug!(entity = %entity_name, affected_count, "Records deleted");

                Ok::<_, GraphQLError>(BulkPayload {
                    filter,
                    affected_count,
                })
            }
        })
}
