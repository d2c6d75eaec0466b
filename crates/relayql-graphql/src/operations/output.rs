//! Output fields shared by the create and update payloads.
//!
//! After a write the payload exposes:
//! - `new<Entity>`: the record refetched by primary key
//! - one `new<Source><Key>Edge` per connection the record can appear in
//! - one field per BelongsTo association declared on the entity

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, TypeRef};
use relayql_core::{Entity, Record};
use serde_json::Value;
use tracing::trace;

use super::relay::try_payload_ref;
use crate::context::GraphQLContext;
use crate::naming::{new_edge_field, new_record_field};
use crate::resolvers::association::EdgePayload;
use crate::resolvers::cursor::offset_to_cursor;
use crate::resolvers::{get_graphql_context, storage_error};
use crate::schema::{AssociationIndex, AssociationLink};

/// A single written record.
#[derive(Debug, Clone)]
pub(crate) struct RecordPayload {
    /// Raw primary key.
    pub key: Value,
    /// Values known after the write.
    pub data: Record,
}

impl RecordPayload {
    pub fn from_row(entity: &Entity, row: Record) -> Self {
        Self {
            key: row.get(entity.primary_key()).cloned().unwrap_or(Value::Null),
            data: row,
        }
    }
}

async fn refetch(
    gql_ctx: &GraphQLContext,
    entity: &str,
    payload: &RecordPayload,
) -> async_graphql::Result<Option<Record>> {
    if payload.key.is_null() {
        return Ok(None);
    }
    let model = gql_ctx.entity(entity).map_err(|e| e.extend())?;
    gql_ctx
        .store
        .find_by_pk(model, &payload.key)
        .await
        .map_err(|e| storage_error(entity, "find_by_pk", e))
}

fn new_record(entity: String) -> Field {
    Field::new(
        new_record_field(&entity),
        TypeRef::named(entity.clone()),
        move |ctx| {
            let entity = entity.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let payload = try_payload_ref::<RecordPayload>(ctx.parent_value)?;
                let record = refetch(gql_ctx, &entity, payload).await?;
                Ok(record.map(FieldValue::owned_any))
            })
        },
    )
}

fn new_edge(name: String, edge_type: String, entity: String) -> Field {
    Field::new(name, TypeRef::named(edge_type), move |ctx| {
        let entity = entity.clone();
        FieldFuture::new(async move {
            let gql_ctx = get_graphql_context(&ctx)?;
            let payload = try_payload_ref::<RecordPayload>(ctx.parent_value)?;
            let record = refetch(gql_ctx, &entity, payload).await?;
            Ok(record.map(|node| {
                FieldValue::owned_any(EdgePayload {
                    cursor: offset_to_cursor(0),
                    node,
                    through: None,
                })
            }))
        })
    })
}

fn belongs_to(key: String, target: String, foreign_key: String, entity: String) -> Field {
    Field::new(key, TypeRef::named(target.clone()), move |ctx| {
        let target = target.clone();
        let foreign_key = foreign_key.clone();
        let entity = entity.clone();
        FieldFuture::new(async move {
            let gql_ctx = get_graphql_context(&ctx)?;
            let payload = try_payload_ref::<RecordPayload>(ctx.parent_value)?;

            let mut fk = payload.data.get(&foreign_key).cloned().unwrap_or(Value::Null);
            if fk.is_null() && !payload.data.contains_key(&foreign_key) {
                if let Some(record) = refetch(gql_ctx, &entity, payload).await? {
                    fk = record.get(&foreign_key).cloned().unwrap_or(Value::Null);
                }
            }
            if fk.is_null() {
                return Ok(None::<FieldValue>);
            }

            let model = gql_ctx.entity(&target).map_err(|e| e.extend())?;
            let related = gql_ctx
                .store
                .find_by_pk(model, &fk)
                .await
                .map_err(|e| storage_error(&target, "find_by_pk", e))?;
            Ok(related.map(FieldValue::owned_any))
        })
    })
}

/// Output fields of a payload carrying a [`RecordPayload`] for `entity`.
pub(crate) fn record_output_fields(entity: &Entity, index: &AssociationIndex) -> Vec<Field> {
    let name = entity.name();
    let mut fields = vec![new_record(name.to_string())];

    for (_, entry) in index.to_model(name) {
        let Some(connection) = index
            .reverse_connection(&entry.entity, name, &entry.key)
            .or_else(|| entry.connection())
        else {
            continue;
        };
        let field_name = new_edge_field(&entry.entity, &entry.key);
        trace!(entity = %name, field = %field_name, "Added edge output field");
        fields.push(new_edge(field_name, connection.edge_type(), name.to_string()));
    }

    for (_, entry) in index.from_model(name) {
        if let AssociationLink::BelongsTo { foreign_key } = &entry.link {
            fields.push(belongs_to(
                entry.key.clone(),
                entry.entity.clone(),
                foreign_key.clone(),
                name.to_string(),
            ));
        }
    }

    fields
}
