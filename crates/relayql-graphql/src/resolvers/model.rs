//! Root query resolvers: `findById` and `findAll`.

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use relayql_storage::{Filter, FindOptions, SortParam};
use tracing::debug;

use super::{get_graphql_context, id_argument, storage_error, usize_argument, where_argument};
use crate::error::GraphQLError;
use crate::global_id::from_global_id;

/// Parses `order: "attr"`, `"reverse:attr"` or a comma-separated list of both.
pub(crate) fn order_argument(ctx: &ResolverContext<'_>) -> async_graphql::Result<Vec<SortParam>> {
    let Some(value) = ctx.args.get("order").filter(|v| !v.is_null()) else {
        return Ok(Vec::new());
    };
    Ok(value
        .string()?
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(SortParam::parse)
        .collect())
}

/// Builds find options from `where`, `limit`, `offset` and `order`.
pub(crate) fn list_options(ctx: &ResolverContext<'_>) -> async_graphql::Result<FindOptions> {
    let filter = Filter::parse(&where_argument(ctx)?).map_err(|e| GraphQLError::from(e).extend())?;
    let mut options = FindOptions::new().with_filter(filter);
    options.limit = usize_argument(ctx, "limit")?;
    options.offset = usize_argument(ctx, "offset")?;
    options.order = order_argument(ctx)?;
    Ok(options)
}

/// Resolver for `findById` queries such as `user(id: ...)`.
pub struct FindOneResolver;

impl FindOneResolver {
    /// Creates a resolver fetching one `entity` record by global id and `where`.
    pub fn resolve(entity: String) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let entity = entity.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let model = gql_ctx.entity(&entity).map_err(|e| e.extend())?;

                let mut filter =
                    Filter::parse(&where_argument(&ctx)?).map_err(|e| GraphQLError::from(e).extend())?;
                if let Some(id) = ctx.args.get(model.primary_key()).filter(|v| !v.is_null()) {
                    let resolved = from_global_id(&id_argument(&id)?).map_err(|e| e.extend())?;
                    filter = filter.eq(model.primary_key(), resolved.id.to_json());
                }

                debug!(entity = %entity, "Resolving find-one query");
                let record = gql_ctx
                    .store
                    .find_one(model, &FindOptions::new().with_filter(filter))
                    .await
                    .map_err(|e| storage_error(&entity, "find_one", e))?;
                Ok(record.map(FieldValue::owned_any))
            })
        }
    }
}

/// Resolver for `findAll` queries such as `users(where: ..., limit: ...)`.
pub struct FindAllResolver;

impl FindAllResolver {
    pub fn resolve(entity: String) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let entity = entity.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let model = gql_ctx.entity(&entity).map_err(|e| e.extend())?;
                let options = list_options(&ctx)?;

                let rows = gql_ctx
                    .store
                    .find_all(model, &options)
                    .await
                    .map_err(|e| storage_error(&entity, "find_all", e))?;
                debug!(entity = %entity, count = rows.len(), "Resolved find-all query");

                Ok(Some(FieldValue::list(rows.into_iter().map(FieldValue::owned_any))))
            })
        }
    }
}
