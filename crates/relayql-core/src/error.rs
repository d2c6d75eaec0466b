use thiserror::Error;

/// Errors raised while defining or normalising a model graph
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Entity {0} is defined more than once")]
    DuplicateEntity(String),

    #[error("Entity {entity} declares association {key} more than once")]
    DuplicateAssociation { entity: String, key: String },

    #[error("Association {entity}.{key} targets unknown entity {target}")]
    UnknownAssociationTarget {
        entity: String,
        key: String,
        target: String,
    },

    #[error("Invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Entity {entity} has no attribute {attribute}")]
    UnknownAttribute { entity: String, attribute: String },
}

impl CoreError {
    /// Create a new InvalidName error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new UnknownAttribute error
    pub fn unknown_attribute(entity: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            entity: entity.into(),
            attribute: attribute.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::UnknownAssociationTarget {
            entity: "User".into(),
            key: "todos".into(),
            target: "Todo".into(),
        };
        assert_eq!(
            err.to_string(),
            "Association User.todos targets unknown entity Todo"
        );

        let err = CoreError::unknown_attribute("User", "nickname");
        assert_eq!(err.to_string(), "Entity User has no attribute nickname");
    }
}
