use indexmap::IndexMap;

use crate::association::Association;
use crate::attribute::{Attribute, AttributeType};

/// Attribute maintained by the store on insert.
pub const CREATED_AT: &str = "createdAt";
/// Attribute maintained by the store on every write.
pub const UPDATED_AT: &str = "updatedAt";

/// A named record type: its attributes, exposure rules and associations.
///
/// Entities are declared with the `with_*` builders and normalised by
/// [`ModelRegistryBuilder::build`](crate::ModelRegistryBuilder::build), after
/// which the primary key, timestamp and foreign-key attributes are present.
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    description: Option<String>,
    pub(crate) attributes: IndexMap<String, Attribute>,
    exclude_fields: Vec<String>,
    pub(crate) primary_key: String,
    timestamps: bool,
    pub(crate) associations: IndexMap<String, Association>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            attributes: IndexMap::new(),
            exclude_fields: Vec::new(),
            primary_key: "id".to_string(),
            timestamps: true,
            associations: IndexMap::new(),
        }
    }

    /// Adds an attribute. Declaring a primary key replaces the implicit `id`.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        if attribute.primary_key {
            self.primary_key = attribute.name.clone();
        }
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    /// Hides attributes from every generated type.
    pub fn with_excluded<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Name of the primary-key attribute.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn primary_key_attribute(&self) -> Option<&Attribute> {
        self.attributes.get(&self.primary_key)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// All attributes in declaration order, including hidden ones.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn excluded_fields(&self) -> &[String] {
        &self.exclude_fields
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_fields.iter().any(|f| f == name)
    }

    pub fn has_timestamps(&self) -> bool {
        self.timestamps
    }

    pub fn is_timestamp(&self, name: &str) -> bool {
        self.timestamps && (name == CREATED_AT || name == UPDATED_AT)
    }

    /// Attributes that appear in generated types: not excluded, not timestamps.
    pub fn exposed_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .values()
            .filter(|a| !self.is_excluded(&a.name) && !self.is_timestamp(&a.name))
    }

    pub fn association(&self, key: &str) -> Option<&Association> {
        self.associations.get(key)
    }

    /// Associations in declaration order.
    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.values()
    }

    /// Applies the implicit primary key and timestamp attributes.
    pub(crate) fn normalize(&mut self) {
        if !self.attributes.contains_key(&self.primary_key) {
            let pk = Attribute::auto_id(self.primary_key.clone());
            self.attributes.shift_insert(0, pk.name.clone(), pk);
        }
        if self.timestamps {
            for name in [CREATED_AT, UPDATED_AT] {
                if !self.attributes.contains_key(name) {
                    self.attributes.insert(
                        name.to_string(),
                        Attribute::new(name, AttributeType::DateTime).not_null(),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_implicit_id_first() {
        let mut entity = Entity::new("Todo")
            .with_attribute(Attribute::new("text", AttributeType::String).not_null());
        entity.normalize();

        let names: Vec<_> = entity.attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "text", "createdAt", "updatedAt"]);
        assert_eq!(entity.primary_key(), "id");
    }

    #[test]
    fn test_declared_primary_key_replaces_id() {
        let mut entity = Entity::new("Country")
            .with_timestamps(false)
            .with_attribute(Attribute::new("code", AttributeType::String).primary_key());
        entity.normalize();

        assert_eq!(entity.primary_key(), "code");
        assert!(entity.attribute("id").is_none());
    }

    #[test]
    fn test_exposed_attributes_skip_excluded_and_timestamps() {
        let mut entity = Entity::new("User")
            .with_attribute(Attribute::new("email", AttributeType::String))
            .with_attribute(Attribute::new("secret", AttributeType::String))
            .with_excluded(["secret"]);
        entity.normalize();

        let names: Vec<_> = entity.exposed_attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email"]);
        assert!(entity.is_timestamp("createdAt"));
        assert!(entity.is_excluded("secret"));
    }
}
