//! Named types collected during a schema build.

use async_graphql::dynamic::{SchemaBuilder, Type};
use indexmap::IndexMap;
use tracing::trace;

use crate::error::GraphQLError;

/// Every generated type, keyed by its GraphQL name.
///
/// Inserting a name twice is an error: the cache is what guarantees that a
/// type shared by several operations is defined exactly once.
#[derive(Default)]
pub struct TypeCache {
    types: IndexMap<String, Type>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Adds a type.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::DuplicateType` if `name` is already defined.
    pub fn insert(&mut self, name: impl Into<String>, ty: impl Into<Type>) -> Result<(), GraphQLError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(GraphQLError::DuplicateType(name));
        }
        trace!(type_name = %name, "Registered type");
        self.types.insert(name, ty.into());
        Ok(())
    }

    /// Builds and adds `name` unless it is already cached.
    pub fn get_or_insert_with<T, F>(&mut self, name: &str, build: F) -> Result<(), GraphQLError>
    where
        T: Into<Type>,
        F: FnOnce() -> Result<T, GraphQLError>,
    {
        if !self.contains(name) {
            let ty = build()?;
            self.insert(name, ty)?;
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registers every cached type with the schema builder.
    pub(crate) fn register_all(self, builder: SchemaBuilder) -> SchemaBuilder {
        self.types
            .into_values()
            .fold(builder, |builder, ty| builder.register(ty))
    }
}

impl std::fmt::Debug for TypeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCache")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::dynamic::Scalar;

    #[test]
    fn test_duplicate_type_is_rejected() {
        let mut cache = TypeCache::new();
        cache.insert("JSON", Scalar::new("JSON")).unwrap();

        let err = cache.insert("JSON", Scalar::new("JSON")).unwrap_err();
        assert!(matches!(err, GraphQLError::DuplicateType(name) if name == "JSON"));
    }

    #[test]
    fn test_get_or_insert_with_builds_once() {
        let mut cache = TypeCache::new();
        let mut builds = 0;
        for _ in 0..2 {
            cache
                .get_or_insert_with("JSON", || {
                    builds += 1;
                    Ok(Scalar::new("JSON"))
                })
                .unwrap();
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.names().collect::<Vec<_>>(), vec!["JSON"]);
    }
}
