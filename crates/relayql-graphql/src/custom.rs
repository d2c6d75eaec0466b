//! Hand-written root fields attached to entities.
//!
//! A [`CustomOperations`] implementation is registered per entity on the
//! [`GraphQLContext`](crate::GraphQLContext). After the generated operations
//! exist, the builder calls it with the model registry, the generated type
//! registry and a [`ResolverFactory`], and merges the returned fields into
//! the `Query` and `Mutation` roots in entity order.
//!
//! # Example
//!
//! ```ignore
//! struct UserOperations;
//!
//! impl CustomOperations for UserOperations {
//!     fn queries(&self, ctx: &CustomOperationContext<'_>) -> CustomFields {
//!         CustomFields::new().field(
//!             "viewer",
//!             Field::new("viewer", TypeRef::named("User"), ctx.resolvers.find_one("User"))
//!                 .argument(InputValue::new("id", TypeRef::named(TypeRef::ID))),
//!         )
//!     }
//! }
//! ```

use async_graphql::dynamic::{Field, FieldFuture, ResolverContext, Type};
use indexmap::IndexMap;
use relayql_core::ModelRegistry;

use crate::resolvers::{FindAllResolver, FindOneResolver};
use crate::schema::ModelTypes;

/// What custom operations can see while the schema is built.
pub struct CustomOperationContext<'a> {
    pub models: &'a ModelRegistry,
    pub types: &'a ModelTypes,
    pub resolvers: ResolverFactory,
}

/// Root fields and supporting types returned by custom operations.
#[derive(Default)]
pub struct CustomFields {
    pub(crate) fields: IndexMap<String, Field>,
    pub(crate) types: Vec<(String, Type)>,
}

impl CustomFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root field. `name` must be the name the field was created with.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Adds a type the fields refer to.
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, ty: impl Into<Type>) -> Self {
        self.types.push((name.into(), ty.into()));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.types.is_empty()
    }
}

/// Extra queries and mutations for one entity.
pub trait CustomOperations: Send + Sync {
    fn queries(&self, _ctx: &CustomOperationContext<'_>) -> CustomFields {
        CustomFields::new()
    }

    fn mutations(&self, _ctx: &CustomOperationContext<'_>) -> CustomFields {
        CustomFields::new()
    }
}

/// Generic resolvers for custom fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverFactory;

impl ResolverFactory {
    /// Fetches one `entity` record. Reads the optional primary-key argument
    /// (a global id) and `where: JSON`.
    pub fn find_one(&self, entity: &str) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone + use<> {
        FindOneResolver::resolve(entity.to_string())
    }

    /// Lists `entity` records. Reads `where`, `limit`, `offset` and `order`.
    pub fn find_all(&self, entity: &str) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone + use<> {
        FindAllResolver::resolve(entity.to_string())
    }
}
