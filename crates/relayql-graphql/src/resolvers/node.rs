//! Resolver for `node(id: ID!)`.

use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use tracing::debug;

use super::{get_graphql_context, id_argument, storage_error};
use crate::global_id::from_global_id;
use crate::schema::NodeTypeMapper;

/// Dispatches a global id to the entity its type name maps to.
///
/// Unknown type names resolve to `null`; malformed ids are field errors.
pub struct NodeResolver;

impl NodeResolver {
    pub fn resolve(
        mapper: Arc<NodeTypeMapper>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let mapper = mapper.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let id = id_argument(&ctx.args.try_get("id")?)?;
                let resolved = from_global_id(&id).map_err(|e| e.extend())?;

                let Some(entity) = mapper.entity_for(&resolved.type_name) else {
                    debug!(type_name = %resolved.type_name, "Node type is not mapped");
                    return Ok(None::<FieldValue>);
                };
                let model = gql_ctx.entity(entity).map_err(|e| e.extend())?;

                let record = gql_ctx
                    .store
                    .find_by_pk(model, &resolved.id.to_json())
                    .await
                    .map_err(|e| storage_error(entity, "find_by_pk", e))?;
                Ok(record.map(|record| {
                    FieldValue::owned_any(record).with_type(resolved.type_name.clone())
                }))
            })
        }
    }
}
