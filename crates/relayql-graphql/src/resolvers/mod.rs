//! Field resolvers backing the generated schema.
//!
//! - `model`: `findById` and `findAll` root queries
//! - `association`: BelongsTo fields, connections and their `total` counts
//! - `node`: global object identification through `node(id:)`
//! - `cursor`: opaque connection cursors

pub(crate) mod association;
pub(crate) mod cursor;
pub(crate) mod model;
pub(crate) mod node;

pub use association::{BelongsToResolver, ConnectionResolver, TotalCountResolver};
pub use model::{FindAllResolver, FindOneResolver};
pub use node::NodeResolver;

use async_graphql::dynamic::{ResolverContext, ValueAccessor};
use async_graphql::{Error, ErrorExtensions, Value};
use relayql_core::Record;
use relayql_storage::StorageError;
use tracing::warn;

use crate::context::GraphQLContext;
use crate::error::GraphQLError;

/// Helper to extract GraphQL context from resolver context.
pub(crate) fn get_graphql_context<'a>(ctx: &'a ResolverContext<'_>) -> Result<&'a GraphQLContext, Error> {
    ctx.data::<GraphQLContext>()
        .map_err(|_| Error::new("GraphQL context not available"))
}

/// Logs a failed persistence call and converts it to a field error.
pub(crate) fn storage_error(entity: &str, operation: &str, err: StorageError) -> Error {
    warn!(
        error = %err,
        category = %err.category(),
        entity = %entity,
        operation = %operation,
        "Storage call failed"
    );
    GraphQLError::from(err).extend()
}

/// Convert a serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Value::Number(
                    async_graphql::Number::from_f64(f).unwrap_or_else(|| async_graphql::Number::from(0)),
                )
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: async_graphql::indexmap::IndexMap<async_graphql::Name, Value> = obj
                .into_iter()
                .map(|(k, v)| (async_graphql::Name::new(k), json_to_graphql_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Convert an argument to serde_json::Value. Enum values become strings.
pub(crate) fn value_accessor_to_json(value: &ValueAccessor<'_>) -> Result<serde_json::Value, Error> {
    value
        .as_value()
        .clone()
        .into_json()
        .map_err(|e| Error::new(format!("Invalid argument value: {e}")))
}

/// Convert an input object argument to a record.
pub(crate) fn value_accessor_to_record(value: &ValueAccessor<'_>) -> Result<Record, Error> {
    match value_accessor_to_json(value)? {
        serde_json::Value::Object(record) => Ok(record),
        serde_json::Value::Null => Ok(Record::new()),
        other => Err(GraphQLError::InvalidArgument(format!("expected an object, got {other}")).extend()),
    }
}

/// Reads an `ID` argument, accepting both string and integer literals.
pub(crate) fn id_argument(value: &ValueAccessor<'_>) -> Result<String, Error> {
    if let Ok(id) = value.string() {
        return Ok(id.to_string());
    }
    value
        .i64()
        .map(|id| id.to_string())
        .map_err(|_| GraphQLError::InvalidArgument("expected an ID".into()).extend())
}

/// Reads an optional non-negative `Int` argument.
pub(crate) fn usize_argument(ctx: &ResolverContext<'_>, name: &str) -> Result<Option<usize>, Error> {
    let Some(value) = ctx.args.get(name).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let raw = value.i64()?;
    usize::try_from(raw).map(Some).map_err(|_| {
        GraphQLError::InvalidArgument(format!("{name} must be non-negative, got {raw}")).extend()
    })
}

/// Reads the optional `where: JSON` argument.
pub(crate) fn where_argument(ctx: &ResolverContext<'_>) -> Result<serde_json::Value, Error> {
    match ctx.args.get("where") {
        Some(value) => value_accessor_to_json(&value),
        None => Ok(serde_json::Value::Null),
    }
}
