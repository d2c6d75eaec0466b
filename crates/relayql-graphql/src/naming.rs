//! Names of generated root fields and types.
//!
//! Every name is a pure function of entity and association names, so two
//! schema builds over the same registry produce identical field lists.

use relayql_core::{camel_case, pluralize, upper_first};
use tracing::warn;

/// `findAll` query kind.
pub const FIND_ALL: &str = "findAll";
/// `findById` query kind.
pub const FIND_BY_ID: &str = "findById";

/// `create` mutation kind.
pub const CREATE: &str = "create";
/// Bulk `update` mutation kind.
pub const UPDATE: &str = "update";
/// `updateOne` mutation kind.
pub const UPDATE_ONE: &str = "updateOne";
/// Bulk `delete` mutation kind.
pub const DELETE: &str = "delete";
/// `deleteOne` mutation kind.
pub const DELETE_ONE: &str = "deleteOne";

/// Root query field name for `kind` on `entity`.
///
/// ```
/// use relayql_graphql::naming::query_name;
///
/// assert_eq!(query_name("TodoAssignee", "findAll"), "todoAssignees");
/// assert_eq!(query_name("User", "findById"), "user");
/// ```
pub fn query_name(entity: &str, kind: &str) -> String {
    match kind {
        FIND_ALL => camel_case(&pluralize(entity)),
        FIND_BY_ID => camel_case(entity),
        other => {
            warn!(kind = %other, entity = %entity, "Unknown query kind");
            camel_case(&format!("{other}_{entity}"))
        }
    }
}

/// Root mutation field name for `kind` on `entity`.
pub fn mutation_name(entity: &str, kind: &str) -> String {
    match kind {
        CREATE => camel_case(&format!("create_{entity}")),
        UPDATE => camel_case(&format!("update_{}", pluralize(entity))),
        UPDATE_ONE => camel_case(&format!("update_{entity}")),
        DELETE => camel_case(&format!("delete_{}", pluralize(entity))),
        DELETE_ONE => camel_case(&format!("delete_{entity}")),
        other => {
            warn!(kind = %other, entity = %entity, "Unknown mutation kind");
            camel_case(&format!("{other}_{entity}"))
        }
    }
}

/// Connection name for a HasMany or BelongsToMany field, e.g. `userTodos`.
pub fn connection_name_for_association(entity: &str, key: &str) -> String {
    camel_case(&format!("{entity}_{key}"))
}

pub fn connection_type_name(connection: &str) -> String {
    format!("{connection}Connection")
}

pub fn edge_type_name(connection: &str) -> String {
    format!("{connection}Edge")
}

/// Payload field holding the refetched record, e.g. `newUser`.
pub fn new_record_field(entity: &str) -> String {
    camel_case(&format!("new_{entity}"))
}

/// Payload field holding the edge of a freshly written record inside the
/// connection `from.key`, e.g. `newUserTodosEdge`.
pub fn new_edge_field(from: &str, key: &str) -> String {
    camel_case(&format!("new_{from}_{key}_Edge"))
}

/// Payload field echoing a deleted id, e.g. `deletedUserId`.
pub fn deleted_id_field(entity: &str) -> String {
    camel_case(&format!("deleted_{entity}_id"))
}

pub fn input_type_name(mutation: &str) -> String {
    format!("{}Input", upper_first(mutation))
}

pub fn payload_type_name(mutation: &str) -> String {
    format!("{}Payload", upper_first(mutation))
}

pub fn update_values_input_name(entity: &str) -> String {
    format!("Update{entity}ValuesInput")
}

pub fn update_where_input_name(entity: &str) -> String {
    format!("Update{entity}WhereInput")
}

pub fn update_output_name(entity: &str) -> String {
    format!("Update{entity}Output")
}

pub fn delete_where_input_name(entity: &str) -> String {
    format!("Delete{entity}WhereInput")
}

/// Enum type generated for an enum-typed attribute.
pub fn enum_type_name(entity: &str, attribute: &str) -> String {
    format!("{entity}{}EnumType", upper_first(attribute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_names() {
        assert_eq!(query_name("User", FIND_ALL), "users");
        assert_eq!(query_name("User", FIND_BY_ID), "user");
        assert_eq!(query_name("TodoAssignee", FIND_ALL), "todoAssignees");
        assert_eq!(query_name("Person", FIND_ALL), "people");
    }

    #[test]
    fn test_unknown_query_kind_falls_back() {
        assert_eq!(query_name("User", "search"), "searchUser");
    }

    #[test]
    fn test_mutation_names() {
        assert_eq!(mutation_name("User", CREATE), "createUser");
        assert_eq!(mutation_name("User", UPDATE_ONE), "updateUser");
        assert_eq!(mutation_name("User", UPDATE), "updateUsers");
        assert_eq!(mutation_name("User", DELETE_ONE), "deleteUser");
        assert_eq!(mutation_name("TodoAssignee", DELETE), "deleteTodoAssignees");
        assert_eq!(mutation_name("User", "archive"), "archiveUser");
    }

    #[test]
    fn test_singular_entity_ending_in_s_gets_distinct_bulk_names() {
        assert_eq!(mutation_name("Canvas", UPDATE_ONE), "updateCanvas");
        assert_eq!(mutation_name("Canvas", UPDATE), "updateCanvases");
        assert_eq!(mutation_name("Gas", DELETE_ONE), "deleteGas");
        assert_eq!(mutation_name("Gas", DELETE), "deleteGases");
        assert_eq!(query_name("Gas", FIND_ALL), "gases");
    }

    #[test]
    fn test_names_are_deterministic() {
        assert_eq!(
            connection_name_for_association("User", "assignedTodos"),
            connection_name_for_association("User", "assignedTodos")
        );
        assert_eq!(connection_name_for_association("User", "todos"), "userTodos");
        assert_eq!(connection_type_name("userTodos"), "userTodosConnection");
        assert_eq!(edge_type_name("userTodos"), "userTodosEdge");
    }

    #[test]
    fn test_payload_field_names() {
        assert_eq!(new_record_field("User"), "newUser");
        assert_eq!(new_edge_field("User", "todos"), "newUserTodosEdge");
        assert_eq!(deleted_id_field("User"), "deletedUserId");
        assert_eq!(input_type_name("createUser"), "CreateUserInput");
        assert_eq!(payload_type_name("createUser"), "CreateUserPayload");
        assert_eq!(enum_type_name("Todo", "status"), "TodoStatusEnumType");
    }
}
