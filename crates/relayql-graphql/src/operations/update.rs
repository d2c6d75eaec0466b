//! `update<Entity>` and `update<Entities>` mutations.
//!
//! The bulk variant reports the affected row count from the update call and
//! re-queries `where` lazily when `nodes` is selected. The re-query is a
//! separate read: rows changed by a concurrent writer in between are
//! reported as they are at read time.

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputObject, InputValue, Object, TypeRef};
use relayql_core::{Entity, Record};
use relayql_storage::{Filter, FindOptions};
use serde_json::Value;
use tracing::{debug, warn};

use super::output::{RecordPayload, record_output_fields};
use super::relay::{RelayMutation, try_payload_ref};
use crate::error::GraphQLError;
use crate::global_id::{convert_fields_from_global_id, from_global_id};
use crate::naming::{
    UPDATE, UPDATE_ONE, mutation_name, update_output_name, update_values_input_name,
    update_where_input_name,
};
use crate::resolvers::{get_graphql_context, storage_error};
use crate::schema::{
    AssociationIndex, AttributeFieldOptions, TypeCache, attribute_fields, convert_fields_to_global_id,
};

/// Result of a bulk update or delete.
#[derive(Debug, Clone)]
pub(crate) struct BulkPayload {
    /// Decoded `where` the write was applied with.
    pub filter: Record,
    pub affected_count: u64,
}

pub(crate) fn affected_count_field() -> Field {
    Field::new("affectedCount", TypeRef::named(TypeRef::INT), |ctx| {
        FieldFuture::new(async move {
            let payload = try_payload_ref::<BulkPayload>(ctx.parent_value)?;
            Ok(Some(FieldValue::value(payload.affected_count)))
        })
    })
}

/// Input object with every exposed attribute of `entity` as an optional
/// field, ids as global ids.
pub(crate) fn partial_input(name: &str, entity: &Entity) -> InputObject {
    let mut fields = attribute_fields(entity, AttributeFieldOptions::partial());
    convert_fields_to_global_id(entity, &mut fields);
    fields
        .into_input_values()
        .into_iter()
        .fold(InputObject::new(name), InputObject::field)
}

/// Takes a required input object out of `data` and decodes its global ids.
pub(crate) fn take_record(entity: &Entity, data: &mut Record, key: &str) -> Result<Record, GraphQLError> {
    let mut record = match data.remove(key) {
        Some(Value::Object(record)) => record,
        None | Some(Value::Null) => {
            return Err(GraphQLError::InvalidArgument(format!("{key} is required")));
        }
        Some(other) => {
            return Err(GraphQLError::InvalidArgument(format!(
                "{key} must be an object, got {other}"
            )));
        }
    };
    convert_fields_from_global_id(entity, &mut record)?;
    Ok(record)
}

/// Takes the global id stored under the primary-key input field.
pub(crate) fn take_primary_key(entity: &Entity, data: &mut Record) -> Result<(String, Value), GraphQLError> {
    let pk = entity.primary_key();
    match data.remove(pk) {
        Some(Value::String(global_id)) => {
            let resolved = from_global_id(&global_id)?;
            Ok((global_id, resolved.id.to_json()))
        }
        other => Err(GraphQLError::InvalidArgument(format!(
            "{pk} must be a global id, got {}",
            other.unwrap_or(Value::Null)
        ))),
    }
}

fn register_values_input(entity: &Entity, cache: &mut TypeCache) -> Result<String, GraphQLError> {
    let name = update_values_input_name(entity.name());
    cache.get_or_insert_with(&name, || Ok(partial_input(&name, entity)))?;
    Ok(name)
}

pub(crate) fn update_one_mutation(
    entity: &Entity,
    index: &AssociationIndex,
    cache: &mut TypeCache,
) -> Result<Field, GraphQLError> {
    let values_input = register_values_input(entity, cache)?;

    let entity_name = entity.name().to_string();
    RelayMutation::new(mutation_name(entity.name(), UPDATE_ONE))
        .description(format!("Update a {} record by id", entity.name()))
        .input_field(InputValue::new(
            entity.primary_key(),
            TypeRef::named_nn(TypeRef::ID),
        ))
        .input_field(InputValue::new("values", TypeRef::named_nn(values_input)))
        .output_fields(record_output_fields(entity, index))
        .build(cache, move |gql_ctx, mut data| {
            let entity_name = entity_name.clone();
            async move {
                let model = gql_ctx.entity(&entity_name)?;
                let (_, key) = take_primary_key(model, &mut data)?;
                let mut values = take_record(model, &mut data, "values")?;

                let filter = Filter::new().eq(model.primary_key(), key.clone());
                let affected = gql_ctx
                    .store
                    .update(model, values.clone(), &filter)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, entity = %entity_name, "Update failed");
                        GraphQLError::from(e)
                    })?;
                debug!(entity = %entity_name, affected, "Record updated");

                values.insert(model.primary_key().to_string(), key.clone());
                Ok::<_, GraphQLError>(RecordPayload { key, data: values })
            }
        })
}

pub(crate) fn update_many_mutation(
    entity: &Entity,
    index: &AssociationIndex,
    cache: &mut TypeCache,
) -> Result<Field, GraphQLError> {
    let values_input = register_values_input(entity, cache)?;

    let where_input = update_where_input_name(entity.name());
    cache.get_or_insert_with(&where_input, || Ok(partial_input(&where_input, entity)))?;

    let output = update_output_name(entity.name());
    cache.get_or_insert_with(&output, || {
        Ok(record_output_fields(entity, index)
            .into_iter()
            .fold(Object::new(&output), Object::field))
    })?;

    let nodes_entity = entity.name().to_string();
    let nodes = Field::new("nodes", TypeRef::named_nn_list_nn(output), move |ctx| {
        let entity_name = nodes_entity.clone();
        FieldFuture::new(async move {
            let gql_ctx = get_graphql_context(&ctx)?;
            let payload = try_payload_ref::<BulkPayload>(ctx.parent_value)?;
            let model = gql_ctx.entity(&entity_name).map_err(|e| e.extend())?;

            let rows = gql_ctx
                .store
                .find_all(model, &FindOptions::new().with_filter(Filter::equals(&payload.filter)))
                .await
                .map_err(|e| storage_error(&entity_name, "find_all", e))?;
            Ok(Some(FieldValue::list(rows.into_iter().map(|row| {
                FieldValue::owned_any(RecordPayload::from_row(model, row))
            }))))
        })
    });

    let entity_name = entity.name().to_string();
    RelayMutation::new(mutation_name(entity.name(), UPDATE))
        .description(format!("Update every {} record matching where", entity.name()))
        .input_field(InputValue::new("values", TypeRef::named_nn(values_input)))
        .input_field(InputValue::new("where", TypeRef::named_nn(where_input)))
        .output_field(nodes)
        .output_field(affected_count_field())
        .build(cache, move |gql_ctx, mut data| {
            let entity_name = entity_name.clone();
            async move {
                let model = gql_ctx.entity(&entity_name)?;
                let values = take_record(model, &mut data, "values")?;
                let filter = take_record(model, &mut data, "where")?;

                let affected_count = gql_ctx
                    .store
                    .update(model, values, &Filter::equals(&filter))
                    .await
                    .map_err(|e| {
                        warn!(error = %e, entity = %entity_name, "Bulk update failed");
                        GraphQLError::from(e)
                    })?;
                debug!(entity = %entity_name, affected_count, "Records updated");

                Ok::<_, GraphQLError>(BulkPayload {
                    filter,
                    affected_count,
                })
            }
        })
}
