//! Shared fixtures for the integration tests.
//!
//! The model graph: users own todos, and users are assigned todos through
//! `TodoAssignee` join rows that carry a `primary` flag.

#![allow(dead_code)]

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Variables};
use relayql_core::{
    AssociationOptions, Attribute, AttributeType, Entity, ModelRegistry, ThroughOptions,
};
use relayql_graphql::{CustomOperations, GraphQLContext, get_schema};
use serde_json::Value;

pub fn todo_models() -> ModelRegistry {
    models_with_user(user_entity().with_excluded(["password"]))
}

/// Same graph, but `User.password` is exposed.
pub fn todo_models_with_password() -> ModelRegistry {
    models_with_user(user_entity())
}

fn user_entity() -> Entity {
    Entity::new("User")
        .with_timestamps(false)
        .with_attribute(Attribute::new("email", AttributeType::String).not_null())
        .with_attribute(Attribute::new("password", AttributeType::String))
}

fn models_with_user(user: Entity) -> ModelRegistry {
    ModelRegistry::builder()
        .define(user)
        .define(
            Entity::new("Todo")
                .with_attribute(Attribute::new("text", AttributeType::String).not_null()),
        )
        .define(
            Entity::new("TodoAssignee")
                .with_timestamps(false)
                .with_attribute(Attribute::new("primary", AttributeType::Boolean)),
        )
        .has_many(
            "User",
            "Todo",
            AssociationOptions::new().alias("todos").foreign_key("userId"),
        )
        .belongs_to("Todo", "User", AssociationOptions::new().alias("user"))
        .belongs_to_many(
            "User",
            "Todo",
            ThroughOptions::new("TodoAssignee").alias("assignedTodos"),
        )
        .belongs_to_many(
            "Todo",
            "User",
            ThroughOptions::new("TodoAssignee").alias("assignees"),
        )
        .build()
        .expect("todo models should build")
}

pub fn context() -> GraphQLContext {
    context_for(todo_models())
}

pub fn context_for(models: ModelRegistry) -> GraphQLContext {
    GraphQLContext::builder()
        .with_models(models)
        .with_store(relayql_db_memory::create_store())
        .build()
        .expect("context should build")
}

pub fn context_with_custom(entity: &str, operations: Arc<dyn CustomOperations>) -> GraphQLContext {
    GraphQLContext::builder()
        .with_models(todo_models())
        .with_store(relayql_db_memory::create_store())
        .with_custom_operations(entity, operations)
        .build()
        .expect("context should build")
}

pub fn schema() -> Schema {
    get_schema(&context()).expect("schema should build")
}

pub fn schema_with_password() -> Schema {
    get_schema(&context_for(todo_models_with_password())).expect("schema should build")
}

/// Executes `query`, failing the test on any GraphQL error.
pub async fn execute(schema: &Schema, query: &str, variables: Value) -> Value {
    let response = schema
        .execute(Request::new(query).variables(Variables::from_json(variables)))
        .await;
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
    response.data.into_json().expect("response data is JSON")
}

/// Executes `query` and returns the error messages.
pub async fn execute_err(schema: &Schema, query: &str, variables: Value) -> Vec<String> {
    let response = schema
        .execute(Request::new(query).variables(Variables::from_json(variables)))
        .await;
    response.errors.into_iter().map(|e| e.message).collect()
}

/// Creates a user and returns its global id.
pub async fn create_user(schema: &Schema, email: &str) -> String {
    let data = execute(
        schema,
        "mutation($input: CreateUserInput!) { createUser(input: $input) { newUser { id } } }",
        serde_json::json!({ "input": { "email": email } }),
    )
    .await;
    data["createUser"]["newUser"]["id"]
        .as_str()
        .expect("created user has an id")
        .to_string()
}

/// Creates a todo owned by `user_id` and returns its global id.
pub async fn create_todo(schema: &Schema, text: &str, user_id: &str) -> String {
    let data = execute(
        schema,
        "mutation($input: CreateTodoInput!) { createTodo(input: $input) { newTodo { id } } }",
        serde_json::json!({ "input": { "text": text, "userId": user_id } }),
    )
    .await;
    data["createTodo"]["newTodo"]["id"]
        .as_str()
        .expect("created todo has an id")
        .to_string()
}
