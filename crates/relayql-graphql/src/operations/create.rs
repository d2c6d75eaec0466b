//! `create<Entity>` mutation.

use async_graphql::dynamic::Field;
use relayql_core::Entity;
use tracing::{debug, warn};

use super::output::{RecordPayload, record_output_fields};
use super::relay::RelayMutation;
use crate::error::GraphQLError;
use crate::global_id::convert_fields_from_global_id;
use crate::naming::{CREATE, mutation_name};
use crate::schema::{
    AssociationIndex, AttributeFieldOptions, TypeCache, attribute_fields, convert_fields_to_global_id,
};

pub(crate) fn create_mutation(
    entity: &Entity,
    index: &AssociationIndex,
    cache: &mut TypeCache,
) -> Result<Field, GraphQLError> {
    let mut fields = attribute_fields(entity, AttributeFieldOptions::create_input());
    convert_fields_to_global_id(entity, &mut fields);

    let entity_name = entity.name().to_string();
    RelayMutation::new(mutation_name(entity.name(), CREATE))
        .description(format!("Create a {} record", entity.name()))
        .input_fields(fields.into_input_values())
        .output_fields(record_output_fields(entity, index))
        .build(cache, move |gql_ctx, mut data| {
            let entity_name = entity_name.clone();
            async move {
                let model = gql_ctx.entity(&entity_name)?;
                convert_fields_from_global_id(model, &mut data)?;

                let created = gql_ctx.store.create(model, data).await.map_err(|e| {
                    warn!(error = %e, entity = %entity_name, "Create failed");
                    GraphQLError::from(e)
                })?;
                debug!(entity = %entity_name, "Record created");
                Ok::<_, GraphQLError>(RecordPayload::from_row(model, created))
            }
        })
}
