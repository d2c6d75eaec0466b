//! The seven generated operations of every entity.
//!
//! | Root | Field | Kind |
//! |---|---|---|
//! | Query | `user` | findById |
//! | Query | `users` | findAll |
//! | Mutation | `createUser` | create |
//! | Mutation | `updateUser` | updateOne |
//! | Mutation | `updateUsers` | update |
//! | Mutation | `deleteUser` | deleteOne |
//! | Mutation | `deleteUsers` | delete |

mod create;
mod delete;
mod output;
mod read;
pub(crate) mod relay;
mod update;

use async_graphql::dynamic::Field;
use relayql_core::Entity;
use tracing::debug;

use crate::error::GraphQLError;
use crate::naming::{
    CREATE, DELETE, DELETE_ONE, FIND_ALL, FIND_BY_ID, UPDATE, UPDATE_ONE, mutation_name, query_name,
};
use crate::schema::{AssociationIndex, TypeCache};

/// Root fields generated for one entity, in registration order.
pub(crate) struct EntityOperations {
    pub queries: Vec<(String, Field)>,
    pub mutations: Vec<(String, Field)>,
}

/// Generates root fields from entities once the association index exists.
pub(crate) struct OperationFactory<'a> {
    index: &'a AssociationIndex,
}

impl<'a> OperationFactory<'a> {
    pub fn new(index: &'a AssociationIndex) -> Self {
        Self { index }
    }

    /// Builds the queries and mutations of `entity`, registering their
    /// input and payload types in `cache`.
    pub fn build(&self, entity: &Entity, cache: &mut TypeCache) -> Result<EntityOperations, GraphQLError> {
        let name = entity.name();

        let queries = vec![
            (query_name(name, FIND_BY_ID), read::find_by_id_query(entity)),
            (query_name(name, FIND_ALL), read::find_all_query(entity)),
        ];

        let mutations = vec![
            (
                mutation_name(name, CREATE),
                create::create_mutation(entity, self.index, cache)?,
            ),
            (
                mutation_name(name, UPDATE_ONE),
                update::update_one_mutation(entity, self.index, cache)?,
            ),
            (
                mutation_name(name, UPDATE),
                update::update_many_mutation(entity, self.index, cache)?,
            ),
            (
                mutation_name(name, DELETE_ONE),
                delete::delete_one_mutation(entity, cache)?,
            ),
            (
                mutation_name(name, DELETE),
                delete::delete_many_mutation(entity, cache)?,
            ),
        ];

        debug!(entity = %name, "Generated operations");
        Ok(EntityOperations { queries, mutations })
    }
}
