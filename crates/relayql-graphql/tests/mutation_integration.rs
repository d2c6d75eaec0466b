//! Integration tests for generated queries and mutations.
//!
//! Every test runs against a fresh in-memory store.

mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::{create_todo, create_user, execute, execute_err, schema, schema_with_password};
use relayql_graphql::{from_global_id, to_global_id};
use serde_json::json;

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_user_round_trip() {
    let schema = schema();
    let data = execute(
        &schema,
        r#"
        mutation($input: CreateUserInput!) {
            createUser(input: $input) {
                clientMutationId
                newUser { id email }
            }
        }
        "#,
        json!({ "input": { "email": "ada@example.com", "clientMutationId": "m1" } }),
    )
    .await;

    let payload = &data["createUser"];
    assert_eq!(payload["clientMutationId"], "m1");
    assert_eq!(payload["newUser"]["email"], "ada@example.com");

    let id = payload["newUser"]["id"].as_str().unwrap();
    let resolved = from_global_id(id).unwrap();
    assert_eq!(resolved.type_name, "User");

    let data = execute(
        &schema,
        "query($id: ID) { user(id: $id) { id email } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(data["user"]["id"], id);
    assert_eq!(data["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_create_and_read_exposed_password() {
    let schema = schema_with_password();
    let data = execute(
        &schema,
        r#"
        mutation($input: CreateUserInput!) {
            createUser(input: $input) { newUser { id } }
        }
        "#,
        json!({ "input": { "email": "ada@example.com", "password": "secret" } }),
    )
    .await;
    let id = data["createUser"]["newUser"]["id"].as_str().unwrap().to_string();

    let data = execute(
        &schema,
        "query($id: ID) { user(id: $id) { email password } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(
        data["user"],
        json!({ "email": "ada@example.com", "password": "secret" })
    );
}

#[tokio::test]
async fn test_create_rejects_excluded_field() {
    let schema = schema();
    let errors = execute_err(
        &schema,
        "mutation($input: CreateUserInput!) { createUser(input: $input) { newUser { id } } }",
        json!({ "input": { "email": "ada@example.com", "password": "secret" } }),
    )
    .await;

    assert!(!errors.is_empty());
}

#[tokio::test]
async fn test_create_payload_exposes_edge_and_owner() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;

    let data = execute(
        &schema,
        r#"
        mutation($input: CreateTodoInput!) {
            createTodo(input: $input) {
                newTodo { text }
                newUserTodosEdge { cursor node { text } }
                user { id email }
            }
        }
        "#,
        json!({ "input": { "text": "write tests", "userId": user_id } }),
    )
    .await;

    let payload = &data["createTodo"];
    assert_eq!(payload["newTodo"]["text"], "write tests");
    assert_eq!(payload["newUserTodosEdge"]["node"]["text"], "write tests");
    assert!(payload["newUserTodosEdge"]["cursor"].is_string());
    assert_eq!(payload["user"]["id"], user_id.as_str());
}

#[tokio::test]
async fn test_join_attributes_on_edges() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;
    let todo_id = create_todo(&schema, "review", &user_id).await;

    let data = execute(
        &schema,
        r#"
        mutation($input: CreateTodoAssigneeInput!) {
            createTodoAssignee(input: $input) { newTodoAssignee { id primary } }
        }
        "#,
        json!({ "input": { "UserId": user_id, "TodoId": todo_id, "primary": true } }),
    )
    .await;
    let assignee_id = data["createTodoAssignee"]["newTodoAssignee"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let data = execute(
        &schema,
        r#"
        {
            users {
                assignedTodos {
                    total
                    edges { id primary node { text } }
                }
            }
            todos {
                assignees { edges { primary node { email } } }
            }
        }
        "#,
        json!({}),
    )
    .await;

    let assigned = &data["users"][0]["assignedTodos"];
    assert_eq!(assigned["total"], 1);
    assert_eq!(assigned["edges"][0]["primary"], true);
    assert_eq!(assigned["edges"][0]["id"], assignee_id.as_str());
    assert_eq!(assigned["edges"][0]["node"]["text"], "review");

    let assignees = &data["todos"][0]["assignees"]["edges"];
    assert_eq!(assignees[0]["node"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_total_skips_deleted_targets() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;
    let todo_id = create_todo(&schema, "review", &user_id).await;
    execute(
        &schema,
        r#"
        mutation($input: CreateTodoAssigneeInput!) {
            createTodoAssignee(input: $input) { newTodoAssignee { id } }
        }
        "#,
        json!({ "input": { "UserId": user_id, "TodoId": todo_id } }),
    )
    .await;

    execute(
        &schema,
        "mutation($input: DeleteTodoInput!) { deleteTodo(input: $input) { deletedTodoId } }",
        json!({ "input": { "id": todo_id } }),
    )
    .await;

    let data = execute(
        &schema,
        "{ users { assignedTodos { total edges { node { text } } } } }",
        json!({}),
    )
    .await;
    let assigned = &data["users"][0]["assignedTodos"];
    assert_eq!(assigned["edges"], json!([]));
    assert_eq!(assigned["total"], 0);
}

// =============================================================================
// Read
// =============================================================================

#[tokio::test]
async fn test_cursor_at_max_offset_yields_empty_page() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;
    create_todo(&schema, "first", &user_id).await;

    let after = STANDARD.encode(format!("arrayconnection:{}", usize::MAX));
    let data = execute(
        &schema,
        r#"
        query($after: String) {
            users { todos(first: 1, after: $after) { edges { cursor } pageInfo { hasNextPage } } }
        }
        "#,
        json!({ "after": after }),
    )
    .await;

    let todos = &data["users"][0]["todos"];
    assert_eq!(todos["edges"], json!([]));
    assert_eq!(todos["pageInfo"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_connection_total_and_pagination() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;
    create_todo(&schema, "first", &user_id).await;
    create_todo(&schema, "second", &user_id).await;
    create_todo(&schema, "third", &user_id).await;

    let data = execute(
        &schema,
        r#"
        {
            users {
                todos(first: 2, order: "text") {
                    total
                    edges { cursor node { text } }
                    pageInfo { hasNextPage hasPreviousPage endCursor }
                }
            }
        }
        "#,
        json!({}),
    )
    .await;

    let todos = &data["users"][0]["todos"];
    assert_eq!(todos["total"], 3);
    assert_eq!(todos["edges"].as_array().unwrap().len(), 2);
    assert_eq!(todos["edges"][0]["node"]["text"], "first");
    assert_eq!(todos["edges"][1]["node"]["text"], "second");
    assert_eq!(todos["pageInfo"]["hasNextPage"], true);
    assert_eq!(todos["pageInfo"]["hasPreviousPage"], false);

    let after = todos["pageInfo"]["endCursor"].as_str().unwrap().to_string();
    let data = execute(
        &schema,
        r#"
        query($after: String) {
            users { todos(first: 2, after: $after, order: "text") { edges { node { text } } } }
        }
        "#,
        json!({ "after": after }),
    )
    .await;
    assert_eq!(
        data["users"][0]["todos"]["edges"],
        json!([{ "node": { "text": "third" } }])
    );
}

#[tokio::test]
async fn test_find_all_arguments() {
    let schema = schema();
    create_user(&schema, "carol@example.com").await;
    create_user(&schema, "ada@example.com").await;
    create_user(&schema, "bob@example.com").await;

    let data = execute(
        &schema,
        r#"{ users(order: "reverse:email", limit: 2) { email } }"#,
        json!({}),
    )
    .await;
    assert_eq!(
        data["users"],
        json!([{ "email": "carol@example.com" }, { "email": "bob@example.com" }])
    );

    let data = execute(
        &schema,
        r#"{ users(where: { email: "bob@example.com" }) { email } }"#,
        json!({}),
    )
    .await;
    assert_eq!(data["users"], json!([{ "email": "bob@example.com" }]));
}

#[tokio::test]
async fn test_node_lookup_by_global_id() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;

    let data = execute(
        &schema,
        r#"
        query($id: ID!) {
            node(id: $id) {
                id
                ... on User { email }
            }
        }
        "#,
        json!({ "id": user_id }),
    )
    .await;
    assert_eq!(data["node"]["id"], user_id.as_str());
    assert_eq!(data["node"]["email"], "ada@example.com");

    let data = execute(
        &schema,
        "query($id: ID!) { node(id: $id) { id } }",
        json!({ "id": to_global_id("Unknown", 1) }),
    )
    .await;
    assert!(data["node"].is_null());
}

#[tokio::test]
async fn test_node_rejects_malformed_id() {
    let schema = schema();
    let errors = execute_err(
        &schema,
        "query($id: ID!) { node(id: $id) { id } }",
        json!({ "id": "not base64!" }),
    )
    .await;

    assert!(!errors.is_empty());
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_one_returns_refetched_record() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;

    let data = execute(
        &schema,
        r#"
        mutation($input: UpdateUserInput!) {
            updateUser(input: $input) { clientMutationId newUser { id email } }
        }
        "#,
        json!({
            "input": {
                "id": user_id,
                "values": { "email": "ada@lovelace.dev" },
                "clientMutationId": "u1"
            }
        }),
    )
    .await;

    let payload = &data["updateUser"];
    assert_eq!(payload["clientMutationId"], "u1");
    assert_eq!(payload["newUser"]["id"], user_id.as_str());
    assert_eq!(payload["newUser"]["email"], "ada@lovelace.dev");
}

#[tokio::test]
async fn test_bulk_update_reports_count_and_nodes() {
    let schema = schema();
    let ada = create_user(&schema, "ada@example.com").await;
    let bob = create_user(&schema, "bob@example.com").await;
    create_todo(&schema, "one", &ada).await;
    create_todo(&schema, "two", &bob).await;

    let data = execute(
        &schema,
        r#"
        mutation($input: UpdateTodosInput!) {
            updateTodos(input: $input) {
                affectedCount
                nodes { newTodo { text user { email } } }
            }
        }
        "#,
        json!({ "input": { "values": { "text": "done" }, "where": { "userId": ada } } }),
    )
    .await;

    let payload = &data["updateTodos"];
    assert_eq!(payload["affectedCount"], 1);
    assert_eq!(payload["nodes"][0]["newTodo"]["text"], "done");
    assert_eq!(payload["nodes"][0]["newTodo"]["user"]["email"], "ada@example.com");

    let data = execute(&schema, r#"{ todos(order: "id") { text } }"#, json!({})).await;
    assert_eq!(data["todos"], json!([{ "text": "done" }, { "text": "two" }]));
}

#[tokio::test]
async fn test_bulk_update_users_by_id() {
    let schema = schema();
    let ada = create_user(&schema, "ada@example.com").await;
    create_user(&schema, "bob@example.com").await;

    let data = execute(
        &schema,
        r#"
        mutation($input: UpdateUsersInput!) {
            updateUsers(input: $input) { affectedCount nodes { newUser { id email } } }
        }
        "#,
        json!({ "input": { "values": { "email": "new@x.com" }, "where": { "id": ada } } }),
    )
    .await;

    let payload = &data["updateUsers"];
    assert_eq!(payload["affectedCount"], 1);
    assert_eq!(payload["nodes"][0]["newUser"]["id"], ada.as_str());
    assert_eq!(payload["nodes"][0]["newUser"]["email"], "new@x.com");

    let data = execute(&schema, r#"{ users(order: "id") { email } }"#, json!({})).await;
    assert_eq!(
        data["users"],
        json!([{ "email": "new@x.com" }, { "email": "bob@example.com" }])
    );
}

#[tokio::test]
async fn test_bulk_update_requires_where() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;
    create_todo(&schema, "one", &user_id).await;

    let errors = execute_err(
        &schema,
        r#"mutation { updateTodos(input: { values: { text: "x" } }) { affectedCount } }"#,
        json!({}),
    )
    .await;
    assert!(!errors.is_empty());

    let data = execute(&schema, "{ todos { text } }", json!({})).await;
    assert_eq!(data["todos"], json!([{ "text": "one" }]));
}

#[tokio::test]
async fn test_update_rejects_primary_key_change() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;

    let errors = execute_err(
        &schema,
        r#"
        mutation($input: UpdateUserInput!) { updateUser(input: $input) { newUser { id } } }
        "#,
        json!({ "input": { "id": user_id, "values": { "id": to_global_id("User", 99) } } }),
    )
    .await;

    assert!(!errors.is_empty());
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_one_echoes_id() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;

    let data = execute(
        &schema,
        r#"
        mutation($input: DeleteUserInput!) {
            deleteUser(input: $input) { clientMutationId deletedUserId }
        }
        "#,
        json!({ "input": { "id": user_id, "clientMutationId": "d1" } }),
    )
    .await;
    assert_eq!(data["deleteUser"]["clientMutationId"], "d1");
    assert_eq!(data["deleteUser"]["deletedUserId"], user_id.as_str());

    let data = execute(
        &schema,
        "query($id: ID) { user(id: $id) { id } }",
        json!({ "id": user_id }),
    )
    .await;
    assert!(data["user"].is_null());
}

#[tokio::test]
async fn test_bulk_delete_reports_count() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;
    create_todo(&schema, "one", &user_id).await;
    create_todo(&schema, "two", &user_id).await;

    let data = execute(
        &schema,
        r#"
        mutation($input: DeleteTodosInput!) { deleteTodos(input: $input) { affectedCount } }
        "#,
        json!({ "input": { "where": { "userId": user_id } } }),
    )
    .await;
    assert_eq!(data["deleteTodos"]["affectedCount"], 2);

    let data = execute(&schema, "{ todos { id } }", json!({})).await;
    assert_eq!(data["todos"], json!([]));
}

#[tokio::test]
async fn test_bulk_delete_requires_where() {
    let schema = schema();
    let user_id = create_user(&schema, "ada@example.com").await;
    create_todo(&schema, "one", &user_id).await;
    create_todo(&schema, "two", &user_id).await;

    let errors = execute_err(
        &schema,
        "mutation { deleteTodos(input: {}) { affectedCount } }",
        json!({}),
    )
    .await;
    assert!(!errors.is_empty());

    let data = execute(&schema, "{ todos { text } }", json!({})).await;
    assert_eq!(data["todos"].as_array().map(Vec::len), Some(2));
}
