//! Relay-style mutations.
//!
//! Every mutation takes a single `input: <Name>Input!` argument and returns
//! `<Name>Payload`. Both types carry `clientMutationId: String`, which is
//! stripped from the input before the mutation runs and echoed back
//! unchanged.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputObject, InputValue, Object, TypeRef};
use relayql_core::Record;
use serde_json::Value;
use tracing::debug;

use crate::context::GraphQLContext;
use crate::error::GraphQLError;
use crate::global_id::CLIENT_MUTATION_ID;
use crate::naming::{input_type_name, payload_type_name};
use crate::resolvers::{get_graphql_context, value_accessor_to_record};
use crate::schema::TypeCache;

/// Result of a mutation as seen by its payload fields.
pub(crate) struct MutationPayload {
    pub client_mutation_id: Option<String>,
    pub inner: Box<dyn Any + Send + Sync>,
}

/// Reads a `P` from a parent value that is either a `P` or a mutation
/// payload wrapping one.
pub(crate) fn payload_ref<'a, P: Any>(parent: &'a FieldValue<'_>) -> Option<&'a P> {
    parent.downcast_ref::<P>().or_else(|| {
        parent
            .downcast_ref::<MutationPayload>()
            .and_then(|payload| payload.inner.downcast_ref::<P>())
    })
}

/// Same as [`payload_ref`], failing with a field error.
pub(crate) fn try_payload_ref<'a, P: Any>(parent: &'a FieldValue<'_>) -> async_graphql::Result<&'a P> {
    payload_ref(parent).ok_or_else(|| {
        GraphQLError::Internal(format!(
            "unexpected parent value, expected {}",
            std::any::type_name::<P>()
        ))
        .extend()
    })
}

/// Builder for one relay mutation field and its input and payload types.
pub(crate) struct RelayMutation {
    name: String,
    description: Option<String>,
    input_fields: Vec<InputValue>,
    output_fields: Vec<Field>,
}

impl RelayMutation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields: Vec::new(),
            output_fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input_field(mut self, field: InputValue) -> Self {
        self.input_fields.push(field);
        self
    }

    pub fn input_fields(mut self, fields: impl IntoIterator<Item = InputValue>) -> Self {
        self.input_fields.extend(fields);
        self
    }

    pub fn output_field(mut self, field: Field) -> Self {
        self.output_fields.push(field);
        self
    }

    pub fn output_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.output_fields.extend(fields);
        self
    }

    /// Registers `<Name>Input` and `<Name>Payload` and returns the root field.
    ///
    /// `mutate` receives the input object without `clientMutationId`; its
    /// result becomes the payload seen by the output fields.
    pub fn build<P, F, Fut>(self, cache: &mut TypeCache, mutate: F) -> Result<Field, GraphQLError>
    where
        P: Any + Send + Sync,
        F: Fn(GraphQLContext, Record) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, GraphQLError>> + Send + 'static,
    {
        let input_name = input_type_name(&self.name);
        let payload_name = payload_type_name(&self.name);

        let input = self
            .input_fields
            .into_iter()
            .fold(InputObject::new(input_name.clone()), InputObject::field)
            .field(InputValue::new(CLIENT_MUTATION_ID, TypeRef::named(TypeRef::STRING)));
        cache.insert(input_name.clone(), input)?;

        let payload = self
            .output_fields
            .into_iter()
            .fold(Object::new(payload_name.clone()), Object::field)
            .field(Field::new(
                CLIENT_MUTATION_ID,
                TypeRef::named(TypeRef::STRING),
                |ctx| {
                    FieldFuture::new(async move {
                        let payload = ctx.parent_value.try_downcast_ref::<MutationPayload>()?;
                        Ok(payload.client_mutation_id.clone().map(FieldValue::value))
                    })
                },
            ));
        cache.insert(payload_name.clone(), payload)?;

        let name = self.name.clone();
        let mutate = Arc::new(mutate);
        let field = Field::new(self.name, TypeRef::named(payload_name), move |ctx| {
            let mutate = mutate.clone();
            let name = name.clone();
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?.clone();
                let mut data = value_accessor_to_record(&ctx.args.try_get("input")?)?;
                let client_mutation_id = match data.remove(CLIENT_MUTATION_ID) {
                    Some(Value::String(id)) => Some(id),
                    _ => None,
                };

                debug!(mutation = %name, "Running mutation");
                let inner = mutate(gql_ctx, data).await.map_err(|e| e.extend())?;
                Ok(Some(FieldValue::owned_any(MutationPayload {
                    client_mutation_id,
                    inner: Box::new(inner),
                })))
            })
        })
        .argument(InputValue::new("input", TypeRef::named_nn(input_name)));
        Ok(match self.description {
            Some(description) => field.description(description),
            None => field,
        })
    }
}
