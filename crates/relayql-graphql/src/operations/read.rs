//! `findById` and `findAll` root queries.

use async_graphql::dynamic::{Field, InputValue, TypeRef};
use relayql_core::Entity;

use crate::naming::{FIND_ALL, FIND_BY_ID, query_name};
use crate::resolvers::{FindAllResolver, FindOneResolver};
use crate::schema::JSON_SCALAR;

/// `user(id: ID, where: JSON): User`
pub(crate) fn find_by_id_query(entity: &Entity) -> Field {
    Field::new(
        query_name(entity.name(), FIND_BY_ID),
        TypeRef::named(entity.name()),
        FindOneResolver::resolve(entity.name().to_string()),
    )
    .argument(InputValue::new(entity.primary_key(), TypeRef::named(TypeRef::ID)))
    .argument(InputValue::new("where", TypeRef::named(JSON_SCALAR)))
}

/// `users(where: JSON, limit: Int, offset: Int, order: String): [User!]!`
pub(crate) fn find_all_query(entity: &Entity) -> Field {
    Field::new(
        query_name(entity.name(), FIND_ALL),
        TypeRef::named_nn_list_nn(entity.name()),
        FindAllResolver::resolve(entity.name().to_string()),
    )
    .argument(InputValue::new("where", TypeRef::named(JSON_SCALAR)))
    .argument(InputValue::new("limit", TypeRef::named(TypeRef::INT)))
    .argument(InputValue::new("offset", TypeRef::named(TypeRef::INT)))
    .argument(InputValue::new("order", TypeRef::named(TypeRef::STRING)))
}
