//! Schema limits loaded from TOML.
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! reject_duplicate_custom_fields = false
//! ```

use serde::{Deserialize, Serialize};

use crate::schema::SchemaBuilderConfig;

/// Errors raised while loading a [`GraphQLConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid GraphQL config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

/// User-facing schema configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphQLConfig {
    /// Deepest selection nesting a query may use.
    pub max_depth: usize,
    /// Upper bound on the computed query complexity.
    pub max_complexity: usize,
    /// Whether `__schema` and `__type` are served.
    pub introspection: bool,
    /// Fail the build when a custom operation reuses a root field name.
    /// Otherwise the custom field replaces the generated one with a warning.
    pub reject_duplicate_custom_fields: bool,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        let builder = SchemaBuilderConfig::default();
        Self {
            max_depth: builder.max_depth,
            max_complexity: builder.max_complexity,
            introspection: builder.introspection_enabled,
            reject_duplicate_custom_fields: builder.reject_duplicate_custom_fields,
        }
    }
}

impl GraphQLConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::ZeroLimit`] for a zero limit.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that both limits are positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroLimit`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroLimit("max_depth"));
        }
        if self.max_complexity == 0 {
            return Err(ConfigError::ZeroLimit("max_complexity"));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_schema_builder_config(&self) -> SchemaBuilderConfig {
        SchemaBuilderConfig::from(self)
    }
}

impl From<&GraphQLConfig> for SchemaBuilderConfig {
    fn from(config: &GraphQLConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_complexity: config.max_complexity,
            introspection_enabled: config.introspection,
            reject_duplicate_custom_fields: config.reject_duplicate_custom_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_builder() {
        let config = GraphQLConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection);
        assert!(!config.reject_duplicate_custom_fields);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(GraphQLConfig::from_toml("").unwrap(), GraphQLConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = GraphQLConfig::from_toml(
            r#"
            max_depth = 8
            reject_duplicate_custom_fields = true
            "#,
        )
        .unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_complexity, 500);

        let builder = config.to_schema_builder_config();
        assert_eq!(builder.max_depth, 8);
        assert!(builder.reject_duplicate_custom_fields);
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let err = GraphQLConfig::from_toml("max_complexity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroLimit("max_complexity")));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = GraphQLConfig::from_toml("max_width = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
