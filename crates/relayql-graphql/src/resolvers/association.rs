//! Resolvers for association fields.
//!
//! BelongsTo fields fetch one related record. HasMany and BelongsToMany
//! fields resolve to a connection: every related record is loaded, then the
//! `first`/`after`/`last`/`before` window is cut relay-style with offset
//! cursors. BelongsToMany edges keep the join record they came through so
//! edge fields can read it.

use std::collections::HashMap;

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use async_graphql::{ErrorExtensions, Value};
use relayql_core::{Association, Record};
use relayql_storage::{Condition, Filter, FindOptions, SortParam};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use super::cursor::{cursor_to_offset, offset_to_cursor};
use super::{get_graphql_context, storage_error, usize_argument, where_argument};
use crate::context::GraphQLContext;
use crate::error::GraphQLError;
use super::model::order_argument;

/// One edge of a resolved connection.
#[derive(Debug, Clone)]
pub struct EdgePayload {
    pub cursor: String,
    pub node: Record,
    /// Join record for BelongsToMany edges.
    pub through: Option<Record>,
}

/// Relay page info of a resolved connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl PageInfo {
    pub fn to_value(&self) -> Value {
        let cursor = |c: &Option<String>| c.clone().map_or(Value::Null, Value::from);
        let mut map = async_graphql::indexmap::IndexMap::new();
        map.insert(async_graphql::Name::new("hasNextPage"), Value::from(self.has_next_page));
        map.insert(
            async_graphql::Name::new("hasPreviousPage"),
            Value::from(self.has_previous_page),
        );
        map.insert(async_graphql::Name::new("startCursor"), cursor(&self.start_cursor));
        map.insert(async_graphql::Name::new("endCursor"), cursor(&self.end_cursor));
        Value::Object(map)
    }
}

/// A resolved connection window plus the record it hangs off.
#[derive(Debug, Clone)]
pub struct ConnectionPayload {
    pub source: Record,
    pub edges: Vec<EdgePayload>,
    pub page_info: PageInfo,
}

/// Relay pagination arguments, with cursors already decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PageArgs {
    pub first: Option<usize>,
    pub after: Option<usize>,
    pub last: Option<usize>,
    pub before: Option<usize>,
}

impl PageArgs {
    fn from_ctx(ctx: &ResolverContext<'_>) -> async_graphql::Result<Self> {
        let cursor = |name: &str| {
            ctx.args
                .get(name)
                .and_then(|v| v.string().ok())
                .and_then(cursor_to_offset)
        };
        Ok(Self {
            first: usize_argument(ctx, "first")?,
            after: cursor("after"),
            last: usize_argument(ctx, "last")?,
            before: cursor("before"),
        })
    }
}

/// Cuts the window selected by `args` out of `items`.
pub(crate) fn paginate(items: Vec<(Record, Option<Record>)>, args: &PageArgs) -> (Vec<EdgePayload>, PageInfo) {
    let len = items.len();
    let lower_bound = args.after.map_or(0, |after| after.saturating_add(1));
    let upper_bound = args.before.unwrap_or(len);

    let mut start = lower_bound.min(len);
    let mut end = upper_bound.min(len);
    if let Some(first) = args.first {
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = args.last {
        start = start.max(end.saturating_sub(last));
    }

    let edges: Vec<EdgePayload> = if start < end {
        items
            .into_iter()
            .enumerate()
            .skip(start)
            .take(end - start)
            .map(|(offset, (node, through))| EdgePayload {
                cursor: offset_to_cursor(offset),
                node,
                through,
            })
            .collect()
    } else {
        Vec::new()
    };

    let page_info = PageInfo {
        has_next_page: args.first.is_some() && end < upper_bound,
        has_previous_page: args.last.is_some() && start > lower_bound,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };
    (edges, page_info)
}

fn association_of<'a>(
    gql_ctx: &'a GraphQLContext,
    entity: &str,
    key: &str,
) -> Result<&'a Association, GraphQLError> {
    gql_ctx
        .entity(entity)?
        .association(key)
        .ok_or_else(|| GraphQLError::Internal(format!("{entity} has no association {key}")))
}

fn primary_key_of(gql_ctx: &GraphQLContext, entity: &str, record: &Record) -> Result<JsonValue, GraphQLError> {
    let entity = gql_ctx.entity(entity)?;
    Ok(record.get(entity.primary_key()).cloned().unwrap_or(JsonValue::Null))
}

/// Loads every record related to `pk` through a HasMany or BelongsToMany
/// association, paired with the join record for BelongsToMany.
pub(crate) async fn fetch_related(
    gql_ctx: &GraphQLContext,
    association: &Association,
    pk: &JsonValue,
    filter: Filter,
    order: Vec<SortParam>,
) -> async_graphql::Result<Vec<(Record, Option<Record>)>> {
    let target = gql_ctx.entity(association.target()).map_err(|e| e.extend())?;

    match association {
        Association::BelongsTo { .. } => Err(GraphQLError::Internal(format!(
            "{} is not a connection",
            association.key()
        ))
        .extend()),
        Association::HasMany { foreign_key, .. } => {
            let mut options = FindOptions::new()
                .with_filter(Filter::new().eq(foreign_key.clone(), pk.clone()).and(filter));
            options.order = order;
            let rows = gql_ctx
                .store
                .find_all(target, &options)
                .await
                .map_err(|e| storage_error(target.name(), "find_all", e))?;
            Ok(rows.into_iter().map(|row| (row, None)).collect())
        }
        Association::BelongsToMany {
            through,
            foreign_key,
            other_key,
            ..
        } => {
            let join = gql_ctx.entity(through).map_err(|e| e.extend())?;
            let join_rows = gql_ctx
                .store
                .find_all(
                    join,
                    &FindOptions::new().with_filter(Filter::new().eq(foreign_key.clone(), pk.clone())),
                )
                .await
                .map_err(|e| storage_error(join.name(), "find_all", e))?;

            let target_ids: Vec<JsonValue> = join_rows
                .iter()
                .filter_map(|row| row.get(other_key).filter(|v| !v.is_null()).cloned())
                .collect();
            if target_ids.is_empty() {
                return Ok(Vec::new());
            }

            let ordered = !order.is_empty();
            let mut options = FindOptions::new().with_filter(
                Filter::new()
                    .with(target.primary_key(), Condition::In(target_ids))
                    .and(filter),
            );
            options.order = order;
            let targets = gql_ctx
                .store
                .find_all(target, &options)
                .await
                .map_err(|e| storage_error(target.name(), "find_all", e))?;

            let key_of = |value: Option<&JsonValue>| value.map(JsonValue::to_string);
            let pairs = if ordered {
                let mut by_target: HashMap<String, Record> = HashMap::new();
                for row in join_rows {
                    if let Some(key) = key_of(row.get(other_key)) {
                        by_target.entry(key).or_insert(row);
                    }
                }
                targets
                    .into_iter()
                    .map(|node| {
                        let through = key_of(node.get(target.primary_key()))
                            .and_then(|key| by_target.get(&key).cloned());
                        (node, through)
                    })
                    .collect()
            } else {
                let by_pk: HashMap<String, Record> = targets
                    .into_iter()
                    .filter_map(|node| Some((key_of(node.get(target.primary_key()))?, node)))
                    .collect();
                join_rows
                    .into_iter()
                    .filter_map(|row| {
                        let node = by_pk.get(&key_of(row.get(other_key))?)?.clone();
                        Some((node, Some(row)))
                    })
                    .collect()
            };
            Ok(pairs)
        }
    }
}

/// Counts the persisted records related to `pk`, without filters.
///
/// BelongsToMany counts target records, so join rows whose target is gone
/// are not counted.
pub(crate) async fn count_related(
    gql_ctx: &GraphQLContext,
    association: &Association,
    pk: &JsonValue,
) -> async_graphql::Result<u64> {
    let target = gql_ctx.entity(association.target()).map_err(|e| e.extend())?;
    let filter = match association {
        Association::BelongsTo { .. } => return Ok(0),
        Association::HasMany { foreign_key, .. } => Filter::new().eq(foreign_key.clone(), pk.clone()),
        Association::BelongsToMany {
            through,
            foreign_key,
            other_key,
            ..
        } => {
            let join = gql_ctx.entity(through).map_err(|e| e.extend())?;
            let join_rows = gql_ctx
                .store
                .find_all(
                    join,
                    &FindOptions::new().with_filter(Filter::new().eq(foreign_key.clone(), pk.clone())),
                )
                .await
                .map_err(|e| storage_error(join.name(), "find_all", e))?;
            let target_ids: Vec<JsonValue> = join_rows
                .iter()
                .filter_map(|row| row.get(other_key).filter(|v| !v.is_null()).cloned())
                .collect();
            if target_ids.is_empty() {
                return Ok(0);
            }
            Filter::new().with(target.primary_key(), Condition::In(target_ids))
        }
    };
    gql_ctx
        .store
        .count(target, &filter)
        .await
        .map_err(|e| storage_error(target.name(), "count", e))
}

/// Resolver for BelongsTo fields.
pub struct BelongsToResolver;

impl BelongsToResolver {
    /// Creates a resolver for the association `key` declared on `entity`.
    pub fn resolve(
        entity: String,
        key: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let entity = entity.clone();
            let key = key.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let association = association_of(gql_ctx, &entity, &key).map_err(|e| e.extend())?;
                let Some(record) = ctx.parent_value.downcast_ref::<Record>() else {
                    return Ok(None::<FieldValue>);
                };
                let fk = record
                    .get(association.foreign_key())
                    .cloned()
                    .unwrap_or(JsonValue::Null);
                if fk.is_null() {
                    return Ok(None);
                }

                trace!(entity = %entity, association = %key, "Resolving belongs-to field");
                let target = gql_ctx.entity(association.target()).map_err(|e| e.extend())?;
                let related = gql_ctx
                    .store
                    .find_by_pk(target, &fk)
                    .await
                    .map_err(|e| storage_error(target.name(), "find_by_pk", e))?;
                Ok(related.map(FieldValue::owned_any))
            })
        }
    }
}

/// Resolver for HasMany and BelongsToMany connection fields.
pub struct ConnectionResolver;

impl ConnectionResolver {
    /// Creates a resolver for the connection behind association `key` of `entity`.
    pub fn resolve(
        entity: String,
        key: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let entity = entity.clone();
            let key = key.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let association = association_of(gql_ctx, &entity, &key).map_err(|e| e.extend())?;
                let Some(record) = ctx.parent_value.downcast_ref::<Record>() else {
                    return Ok(None::<FieldValue>);
                };
                let pk = primary_key_of(gql_ctx, &entity, record).map_err(|e| e.extend())?;

                let page = PageArgs::from_ctx(&ctx)?;
                let filter = Filter::parse(&where_argument(&ctx)?)
                    .map_err(|e| GraphQLError::from(e).extend())?;
                let order = order_argument(&ctx)?;

                let related = fetch_related(gql_ctx, association, &pk, filter, order).await?;
                debug!(
                    entity = %entity,
                    association = %key,
                    related = related.len(),
                    "Resolved connection"
                );

                let (edges, page_info) = paginate(related, &page);
                Ok(Some(FieldValue::owned_any(ConnectionPayload {
                    source: record.clone(),
                    edges,
                    page_info,
                })))
            })
        }
    }
}

/// Resolver for the `total` field of a connection.
pub struct TotalCountResolver;

impl TotalCountResolver {
    pub fn resolve(
        entity: String,
        key: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let entity = entity.clone();
            let key = key.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;
                let association = association_of(gql_ctx, &entity, &key).map_err(|e| e.extend())?;
                let payload = ctx.parent_value.try_downcast_ref::<ConnectionPayload>()?;
                let pk = primary_key_of(gql_ctx, &entity, &payload.source).map_err(|e| e.extend())?;

                let total = count_related(gql_ctx, association, &pk).await?;
                Ok(Some(Value::from(total)))
            })
        }
    }
}
