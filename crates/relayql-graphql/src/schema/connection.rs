//! Connection types for HasMany and BelongsToMany associations.
//!
//! ```graphql
//! type userAssignedTodosConnection {
//!   pageInfo: PageInfo!
//!   edges: [userAssignedTodosEdge!]!
//!   nodes: [Todo!]!
//!   total: Int!
//! }
//!
//! type userAssignedTodosEdge {
//!   cursor: String!
//!   node: Todo!
//!   id: ID          # join record fields, BelongsToMany only
//!   primary: Boolean
//! }
//! ```

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, TypeRef};
use relayql_core::{Association, ModelRegistry};
use tracing::warn;

use super::attributes::{AttributeFieldOptions, JSON_SCALAR, RecordSource, attribute_fields};
use crate::error::GraphQLError;
use crate::naming::{connection_type_name, edge_type_name};
use crate::resolvers::association::{ConnectionPayload, EdgePayload};
use crate::resolvers::{ConnectionResolver, TotalCountResolver};

/// Name of the relay page info object.
pub const PAGE_INFO: &str = "PageInfo";

const RESERVED_EDGE_FIELDS: [&str; 2] = ["cursor", "node"];

pub(crate) fn page_info_type() -> Object {
    let flag = |name: &'static str| {
        Field::new(name, TypeRef::named_nn(TypeRef::BOOLEAN), move |ctx| {
            FieldFuture::new(async move { read_page_info(&ctx, name) })
        })
    };
    let cursor = |name: &'static str| {
        Field::new(name, TypeRef::named(TypeRef::STRING), move |ctx| {
            FieldFuture::new(async move { read_page_info(&ctx, name) })
        })
    };
    Object::new(PAGE_INFO)
        .description("Information about pagination in a connection")
        .field(flag("hasNextPage"))
        .field(flag("hasPreviousPage"))
        .field(cursor("startCursor"))
        .field(cursor("endCursor"))
}

fn read_page_info<'a>(
    ctx: &async_graphql::dynamic::ResolverContext<'a>,
    name: &str,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    let value = match ctx.parent_value.as_value() {
        Some(async_graphql::Value::Object(map)) => map.get(name).cloned(),
        _ => None,
    };
    Ok(value
        .filter(|v| !matches!(v, async_graphql::Value::Null))
        .map(FieldValue::value))
}

/// A paginated view of one HasMany or BelongsToMany association.
#[derive(Debug, Clone)]
pub struct Connection {
    /// `camelCase(source + "_" + key)`.
    pub name: String,
    /// Entity declaring the association.
    pub source: String,
    pub association: Association,
}

impl Connection {
    pub fn new(name: impl Into<String>, source: impl Into<String>, association: Association) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            association,
        }
    }

    pub fn key(&self) -> &str {
        self.association.key()
    }

    pub fn target(&self) -> &str {
        self.association.target()
    }

    pub fn connection_type(&self) -> String {
        connection_type_name(&self.name)
    }

    pub fn edge_type(&self) -> String {
        edge_type_name(&self.name)
    }

    /// Builds the edge and connection object types.
    pub(crate) fn build_types(&self, models: &ModelRegistry) -> Result<(Object, Object), GraphQLError> {
        let target = self.target().to_string();

        let mut edge = Object::new(self.edge_type())
            .field(Field::new("cursor", TypeRef::named_nn(TypeRef::STRING), |ctx| {
                FieldFuture::new(async move {
                    let edge = ctx.parent_value.try_downcast_ref::<EdgePayload>()?;
                    Ok(Some(FieldValue::value(edge.cursor.clone())))
                })
            }))
            .field(Field::new("node", TypeRef::named_nn(target.clone()), |ctx| {
                FieldFuture::new(async move {
                    let edge = ctx.parent_value.try_downcast_ref::<EdgePayload>()?;
                    Ok(Some(FieldValue::owned_any(edge.node.clone())))
                })
            }));

        if let Some(through) = self.association.through() {
            let join = models
                .get(through)
                .ok_or_else(|| GraphQLError::UnknownEntity(through.to_string()))?;
            let mut fields = attribute_fields(join, AttributeFieldOptions::output()).into_nullable();
            for reserved in RESERVED_EDGE_FIELDS {
                if fields.remove(reserved).is_some() {
                    warn!(
                        connection = %self.name,
                        field = %reserved,
                        "Join attribute shadows an edge field and is not exposed"
                    );
                }
            }
            for field in fields.into_output_fields(RecordSource::EdgeThrough) {
                edge = edge.field(field);
            }
        }

        let connection = Object::new(self.connection_type())
            .field(Field::new("pageInfo", TypeRef::named_nn(PAGE_INFO), |ctx| {
                FieldFuture::new(async move {
                    let payload = ctx.parent_value.try_downcast_ref::<ConnectionPayload>()?;
                    Ok(Some(FieldValue::value(payload.page_info.to_value())))
                })
            }))
            .field(Field::new(
                "edges",
                TypeRef::named_nn_list_nn(self.edge_type()),
                |ctx| {
                    FieldFuture::new(async move {
                        let payload = ctx.parent_value.try_downcast_ref::<ConnectionPayload>()?;
                        Ok(Some(FieldValue::list(
                            payload.edges.iter().cloned().map(FieldValue::owned_any),
                        )))
                    })
                },
            ))
            .field(Field::new("nodes", TypeRef::named_nn_list_nn(target), |ctx| {
                FieldFuture::new(async move {
                    let payload = ctx.parent_value.try_downcast_ref::<ConnectionPayload>()?;
                    Ok(Some(FieldValue::list(
                        payload
                            .edges
                            .iter()
                            .map(|edge| FieldValue::owned_any(edge.node.clone())),
                    )))
                })
            }))
            .field(Field::new(
                "total",
                TypeRef::named_nn(TypeRef::INT),
                TotalCountResolver::resolve(self.source.clone(), self.key().to_string()),
            ));

        Ok((edge, connection))
    }

    /// The association field on the source entity.
    pub(crate) fn entity_field(&self) -> Field {
        Field::new(
            self.key(),
            TypeRef::named(self.connection_type()),
            ConnectionResolver::resolve(self.source.clone(), self.key().to_string()),
        )
        .argument(InputValue::new("first", TypeRef::named(TypeRef::INT)))
        .argument(InputValue::new("after", TypeRef::named(TypeRef::STRING)))
        .argument(InputValue::new("last", TypeRef::named(TypeRef::INT)))
        .argument(InputValue::new("before", TypeRef::named(TypeRef::STRING)))
        .argument(InputValue::new("where", TypeRef::named(JSON_SCALAR)))
        .argument(InputValue::new("order", TypeRef::named(TypeRef::STRING)))
    }
}
