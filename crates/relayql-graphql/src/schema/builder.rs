//! Schema assembly.
//!
//! `ModelSchemaBuilder` turns a [`GraphQLContext`] into an executable
//! dynamic schema. The build is synchronous and reads the registry without
//! touching the store; every call produces an independent schema.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, Scalar, Schema, TypeRef};
use indexmap::IndexMap;
use tracing::{debug, warn};

use super::association_index::AssociationIndex;
use super::attributes::JSON_SCALAR;
use super::connection::{PAGE_INFO, page_info_type};
use super::entity_type::build_entity_type;
use super::model_types::ModelTypes;
use super::node::{NODE_INTERFACE, NodeTypeMapper, node_interface};
use super::type_cache::TypeCache;
use crate::context::GraphQLContext;
use crate::custom::{CustomFields, CustomOperationContext, ResolverFactory};
use crate::error::GraphQLError;
use crate::operations::OperationFactory;
use crate::resolvers::NodeResolver;

const QUERY: &str = "Query";
const MUTATION: &str = "Mutation";

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,

    /// Whether a custom field reusing a root field name fails the build.
    pub reject_duplicate_custom_fields: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
            reject_duplicate_custom_fields: false,
        }
    }
}

/// Builds a Relay-compliant schema from the model registry.
///
/// For every entity the schema contains an object type, `findById` and
/// `findAll` queries and five relay mutations. HasMany and BelongsToMany
/// associations become paginated connections.
///
/// # Example
///
/// ```ignore
/// let context = GraphQLContext::builder()
///     .with_models(models)
///     .with_store(relayql_db_memory::create_store())
///     .build()?;
///
/// let schema = ModelSchemaBuilder::new(context, SchemaBuilderConfig::default()).build()?;
/// ```
pub struct ModelSchemaBuilder {
    context: GraphQLContext,
    config: SchemaBuilderConfig,
}

/// Builds a schema with the default configuration.
///
/// # Errors
///
/// See [`ModelSchemaBuilder::build`].
pub fn get_schema(context: &GraphQLContext) -> Result<Schema, GraphQLError> {
    ModelSchemaBuilder::new(context.clone(), SchemaBuilderConfig::default()).build()
}

impl ModelSchemaBuilder {
    /// Creates a new schema builder.
    #[must_use]
    pub fn new(context: GraphQLContext, config: SchemaBuilderConfig) -> Self {
        Self { context, config }
    }

    /// Builds the GraphQL schema.
    ///
    /// # Errors
    ///
    /// Returns an error if two types share a name, an association targets an
    /// undefined entity, a custom field collides while
    /// `reject_duplicate_custom_fields` is set, or async-graphql rejects the
    /// assembled schema. No partial schema is produced.
    pub fn build(&self) -> Result<Schema, GraphQLError> {
        let models = &self.context.models;
        debug!(entities = models.len(), "Starting GraphQL schema build");

        let mut cache = TypeCache::new();
        cache.insert(
            JSON_SCALAR,
            Scalar::new(JSON_SCALAR).description("An arbitrary JSON value"),
        )?;
        cache.insert(PAGE_INFO, page_info_type())?;
        cache.insert(NODE_INTERFACE, node_interface())?;

        let mut model_types = ModelTypes::register_entities(models, &mut cache)?;
        let index = AssociationIndex::build(models, &mut model_types, &mut cache)?;

        let factory = OperationFactory::new(&index);
        let mut queries: IndexMap<String, Field> = IndexMap::new();
        let mut mutations: IndexMap<String, Field> = IndexMap::new();
        let mut node_types = NodeTypeMapper::new();

        for entity in models.iter() {
            cache.insert(entity.name(), build_entity_type(entity, &model_types)?)?;
            if entity.primary_key() == "id" {
                node_types.map_type(entity.name(), entity.name());
            }

            let operations = factory.build(entity, &mut cache)?;
            insert_generated(QUERY, &mut queries, operations.queries)?;
            insert_generated(MUTATION, &mut mutations, operations.mutations)?;
        }

        self.merge_custom_operations(&model_types, &mut cache, &mut queries, &mut mutations)?;

        let query = queries
            .into_values()
            .fold(Object::new(QUERY).field(root_field()), Object::field)
            .field(node_field(Arc::new(node_types)));
        cache.insert(QUERY, query)?;

        let has_mutations = !mutations.is_empty();
        if has_mutations {
            let mutation = mutations
                .into_values()
                .fold(Object::new(MUTATION), Object::field);
            cache.insert(MUTATION, mutation)?;
        }

        let type_count = cache.len();
        let schema_builder = Schema::build(QUERY, has_mutations.then_some(MUTATION), None);
        let schema_builder = cache.register_all(schema_builder).data(self.context.clone());

        // Configure limits
        let mut schema_builder = schema_builder.limit_depth(self.config.max_depth);
        schema_builder = schema_builder.limit_complexity(self.config.max_complexity);

        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        debug!(types = type_count, "GraphQL schema build complete");
        Ok(schema)
    }

    fn merge_custom_operations(
        &self,
        model_types: &ModelTypes,
        cache: &mut TypeCache,
        queries: &mut IndexMap<String, Field>,
        mutations: &mut IndexMap<String, Field>,
    ) -> Result<(), GraphQLError> {
        let ctx = CustomOperationContext {
            models: &self.context.models,
            types: model_types,
            resolvers: ResolverFactory,
        };

        for entity in self.context.models.iter() {
            let Some(operations) = self.context.custom_operations(entity.name()) else {
                continue;
            };
            debug!(entity = %entity.name(), "Merging custom operations");
            self.merge_fields(QUERY, operations.queries(&ctx), cache, queries)?;
            self.merge_fields(MUTATION, operations.mutations(&ctx), cache, mutations)?;
        }
        Ok(())
    }

    fn merge_fields(
        &self,
        root: &'static str,
        custom: CustomFields,
        cache: &mut TypeCache,
        target: &mut IndexMap<String, Field>,
    ) -> Result<(), GraphQLError> {
        for (name, ty) in custom.types {
            cache.insert(name, ty)?;
        }
        for (name, field) in custom.fields {
            if target.contains_key(&name) {
                if self.config.reject_duplicate_custom_fields {
                    return Err(GraphQLError::DuplicateCustomField { root, field: name });
                }
                warn!(root = %root, field = %name, "Custom field replaces an existing field");
            }
            target.insert(name, field);
        }
        Ok(())
    }
}

fn insert_generated(
    root: &str,
    target: &mut IndexMap<String, Field>,
    fields: Vec<(String, Field)>,
) -> Result<(), GraphQLError> {
    for (name, field) in fields {
        if target.contains_key(&name) {
            return Err(GraphQLError::SchemaBuildFailed(format!(
                "{root}.{name} is generated by more than one model"
            )));
        }
        target.insert(name, field);
    }
    Ok(())
}

/// `root: Query!`, resolving to an empty object.
fn root_field() -> Field {
    Field::new("root", TypeRef::named_nn(QUERY), |_| {
        FieldFuture::new(async move { Ok(Some(FieldValue::value(Value::Object(Default::default())))) })
    })
}

/// `node(id: ID!): Node`
fn node_field(mapper: Arc<NodeTypeMapper>) -> Field {
    Field::new("node", TypeRef::named(NODE_INTERFACE), NodeResolver::resolve(mapper))
        .description("Fetches an object given its ID")
        .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID)))
}
