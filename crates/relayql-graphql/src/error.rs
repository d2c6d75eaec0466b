//! Error types for schema generation and GraphQL execution.
//!
//! Build-time failures abort schema construction. Runtime failures surface as
//! GraphQL errors carrying a `code` extension (see [`GraphQLError::error_code`]).

use std::fmt;

use async_graphql::ErrorExtensions;
use relayql_core::CoreError;
use relayql_storage::StorageError;

/// Errors that can occur while building or executing the schema.
#[derive(Debug)]
pub enum GraphQLError {
    /// Schema build failed.
    SchemaBuildFailed(String),

    /// Two generated or custom types share a name.
    DuplicateType(String),

    /// An association points at an entity that was never defined.
    MissingAssociationTarget {
        /// Entity declaring the association.
        entity: String,
        /// Association key.
        association: String,
        /// Missing target entity.
        target: String,
    },

    /// Entity is not part of the model registry.
    UnknownEntity(String),

    /// A custom operation reuses a root field name.
    DuplicateCustomField {
        /// `Query` or `Mutation`.
        root: &'static str,
        /// Conflicting field name.
        field: String,
    },

    /// A global id could not be decoded.
    InvalidGlobalId(String),

    /// An argument has the wrong shape.
    InvalidArgument(String),

    /// Record not found.
    NotFound {
        /// Entity name.
        entity: String,
        /// Raw primary key.
        id: String,
    },

    /// Storage error.
    Storage(String),

    /// Validation error.
    Validation(String),

    /// Internal error.
    Internal(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::DuplicateType(name) => {
                write!(f, "Type {name} is defined more than once")
            }
            Self::MissingAssociationTarget {
                entity,
                association,
                target,
            } => {
                write!(
                    f,
                    "Association {entity}.{association} targets undefined model {target}"
                )
            }
            Self::UnknownEntity(name) => {
                write!(f, "Unknown model: {name}")
            }
            Self::DuplicateCustomField { root, field } => {
                write!(f, "Custom field {root}.{field} collides with an existing field")
            }
            Self::InvalidGlobalId(id) => {
                write!(f, "Invalid global id: {id}")
            }
            Self::InvalidArgument(msg) => {
                write!(f, "Invalid argument: {msg}")
            }
            Self::NotFound { entity, id } => {
                write!(f, "{entity}/{id} not found")
            }
            Self::Storage(msg) => {
                write!(f, "Storage error: {msg}")
            }
            Self::Validation(msg) => {
                write!(f, "Validation error: {msg}")
            }
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::DuplicateType(_) => "DUPLICATE_TYPE",
            Self::MissingAssociationTarget { .. } => "MISSING_ASSOCIATION_TARGET",
            Self::UnknownEntity(_) => "UNKNOWN_ENTITY",
            Self::DuplicateCustomField { .. } => "DUPLICATE_CUSTOM_FIELD",
            Self::InvalidGlobalId(_) => "INVALID_GLOBAL_ID",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors raised while the schema is assembled.
    #[must_use]
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaBuildFailed(_)
                | Self::DuplicateType(_)
                | Self::MissingAssociationTarget { .. }
                | Self::DuplicateCustomField { .. }
        )
    }
}

impl ErrorExtensions for GraphQLError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string())
            .extend_with(|_, e| e.set("code", self.error_code()))
    }
}

impl From<StorageError> for GraphQLError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            StorageError::UnknownEntity(name) => Self::UnknownEntity(name),
            StorageError::InvalidRecord { message } | StorageError::InvalidFilter { message } => {
                Self::Validation(message)
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<CoreError> for GraphQLError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownEntity(name) => Self::UnknownEntity(name),
            CoreError::UnknownAssociationTarget {
                entity,
                key,
                target,
            } => Self::MissingAssociationTarget {
                entity,
                association: key,
                target,
            },
            other => Self::SchemaBuildFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphQLError::MissingAssociationTarget {
            entity: "User".into(),
            association: "tasks".into(),
            target: "Task".into(),
        };
        assert_eq!(
            err.to_string(),
            "Association User.tasks targets undefined model Task"
        );

        let err = GraphQLError::NotFound {
            entity: "User".into(),
            id: "1".into(),
        };
        assert_eq!(err.to_string(), "User/1 not found");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GraphQLError::InvalidGlobalId("x".into()).error_code(),
            "INVALID_GLOBAL_ID"
        );
        assert!(GraphQLError::DuplicateType("User".into()).is_build_error());
        assert!(!GraphQLError::Validation("bad".into()).is_build_error());
    }

    #[test]
    fn test_from_storage_error() {
        let err: GraphQLError = StorageError::invalid_record("User.email cannot be null").into();
        assert!(matches!(err, GraphQLError::Validation(_)));

        let err: GraphQLError = StorageError::constraint_violation("unique").into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_extend_sets_code() {
        let err = GraphQLError::InvalidGlobalId("abc".into()).extend();
        assert_eq!(err.message, "Invalid global id: abc");
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("INVALID_GLOBAL_ID")));
    }
}
