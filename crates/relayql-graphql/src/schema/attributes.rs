//! Field definitions derived from entity attributes.
//!
//! [`attribute_fields`] maps every exposed attribute to a GraphQL type.
//! Primary keys and references become `ID` fields carrying global ids.
//! The same field set can be emitted as output fields, reading from a
//! record, or as input values.

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, TypeRef};
use indexmap::IndexMap;
use relayql_core::{Attribute, AttributeType, Entity, Record};
use serde_json::Value as JsonValue;

use crate::global_id::value_to_global_id;
use crate::naming::enum_type_name;
use crate::resolvers::association::EdgePayload;
use crate::resolvers::json_to_graphql_value;

/// Name of the scalar carrying arbitrary JSON.
pub const JSON_SCALAR: &str = "JSON";

/// GraphQL shape of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Built-in or `JSON` scalar.
    Scalar(&'static str),
    /// Generated enum type.
    Enum(String),
    /// `ID` holding a global id of the named type.
    GlobalId(String),
}

impl FieldKind {
    fn type_name(&self) -> &str {
        match self {
            Self::Scalar(name) => name,
            Self::Enum(name) => name,
            Self::GlobalId(_) => TypeRef::ID,
        }
    }
}

/// An attribute together with its GraphQL shape.
#[derive(Debug, Clone)]
pub struct AttributeField {
    pub attribute: Attribute,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl AttributeField {
    pub fn type_ref(&self) -> TypeRef {
        let name = self.kind.type_name().to_string();
        if self.nullable {
            TypeRef::named(name)
        } else {
            TypeRef::named_nn(name)
        }
    }

    /// Converts a stored value to its GraphQL output value.
    pub fn output_value(&self, value: JsonValue) -> Option<Value> {
        if value.is_null() {
            return None;
        }
        match &self.kind {
            FieldKind::GlobalId(type_name) => value_to_global_id(type_name, &value).map(Value::from),
            FieldKind::Enum(_) => match value {
                JsonValue::String(name) => Some(Value::Enum(async_graphql::Name::new(name))),
                _ => None,
            },
            FieldKind::Scalar(TypeRef::STRING) => Some(match value {
                JsonValue::String(s) => Value::String(s),
                other => Value::String(other.to_string()),
            }),
            FieldKind::Scalar(_) => Some(json_to_graphql_value(value)),
        }
    }

    /// Emits an output field reading `self.attribute` from the record at `source`.
    pub fn into_output_field(self, source: RecordSource) -> Field {
        let name = self.attribute.name.clone();
        let type_ref = self.type_ref();
        let description = self.attribute.description.clone();

        let field = Field::new(name, type_ref, move |ctx| {
            let field = self.clone();
            FieldFuture::new(async move {
                let Some(record) = source.project(ctx.parent_value) else {
                    return Ok(None);
                };
                let value = field.attribute.read(record);
                Ok(field.output_value(value).map(FieldValue::value))
            })
        });
        match description {
            Some(description) => field.description(description),
            None => field,
        }
    }

    pub fn into_input_value(self) -> InputValue {
        let input = InputValue::new(self.attribute.name.clone(), self.type_ref());
        match &self.attribute.description {
            Some(description) => input.description(description.clone()),
            None => input,
        }
    }
}

/// Where an output field finds the record it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// The parent value is the record itself.
    Parent,
    /// The parent value is a connection edge; read its join record.
    EdgeThrough,
}

impl RecordSource {
    pub(crate) fn project<'a>(self, parent: &'a FieldValue<'_>) -> Option<&'a Record> {
        match self {
            Self::Parent => parent.downcast_ref::<Record>(),
            Self::EdgeThrough => parent
                .downcast_ref::<EdgePayload>()
                .and_then(|edge| edge.through.as_ref()),
        }
    }
}

/// How attributes are turned into fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeFieldOptions {
    /// Primary keys and references become global-id fields.
    pub global_id: bool,
    /// Every field is nullable.
    pub all_nullable: bool,
    /// Attributes with a generated or default value are nullable.
    pub optional_generated: bool,
}

impl AttributeFieldOptions {
    /// Fields of an entity object type.
    pub fn output() -> Self {
        Self {
            global_id: true,
            ..Self::default()
        }
    }

    /// Fields of a create input.
    pub fn create_input() -> Self {
        Self {
            optional_generated: true,
            ..Self::default()
        }
    }

    /// Fields of update values and `where` inputs.
    pub fn partial() -> Self {
        Self {
            all_nullable: true,
            ..Self::default()
        }
    }
}

/// Ordered attribute fields of one entity.
#[derive(Debug, Clone, Default)]
pub struct AttributeFields {
    fields: IndexMap<String, AttributeField>,
}

impl AttributeFields {
    pub fn get(&self, name: &str) -> Option<&AttributeField> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeField> {
        self.fields.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Forces every field to be nullable.
    pub fn into_nullable(mut self) -> Self {
        for field in self.fields.values_mut() {
            field.nullable = true;
        }
        self
    }

    pub fn into_output_fields(self, source: RecordSource) -> Vec<Field> {
        self.fields
            .into_values()
            .map(|field| field.into_output_field(source))
            .collect()
    }

    pub fn into_input_values(self) -> Vec<InputValue> {
        self.fields
            .into_values()
            .map(AttributeField::into_input_value)
            .collect()
    }
}

fn scalar_kind(entity: &Entity, attribute: &Attribute) -> FieldKind {
    match &attribute.ty {
        AttributeType::String
        | AttributeType::Text
        | AttributeType::Date
        | AttributeType::DateTime
        | AttributeType::Decimal
        | AttributeType::BigInt
        | AttributeType::Uuid => FieldKind::Scalar(TypeRef::STRING),
        AttributeType::Int => FieldKind::Scalar(TypeRef::INT),
        AttributeType::Float => FieldKind::Scalar(TypeRef::FLOAT),
        AttributeType::Boolean => FieldKind::Scalar(TypeRef::BOOLEAN),
        AttributeType::Json => FieldKind::Scalar(JSON_SCALAR),
        AttributeType::Enum(_) => FieldKind::Enum(enum_type_name(entity.name(), &attribute.name)),
    }
}

/// Derives fields from the exposed attributes of `entity`: excluded fields
/// and timestamps are left out.
pub fn attribute_fields(entity: &Entity, options: AttributeFieldOptions) -> AttributeFields {
    let mut fields = AttributeFields::default();

    for attribute in entity.exposed_attributes() {
        let nullable = options.all_nullable
            || attribute.allow_null
            || (options.optional_generated && attribute.is_generated());
        let field = AttributeField {
            attribute: attribute.clone(),
            kind: scalar_kind(entity, attribute),
            nullable,
        };
        fields.fields.insert(attribute.name.clone(), field);
    }

    if options.global_id {
        for field in fields.fields.values_mut() {
            if field.attribute.primary_key {
                field.kind = FieldKind::GlobalId(entity.name().to_string());
            } else if let Some(target) = &field.attribute.references {
                field.kind = FieldKind::GlobalId(target.clone());
            }
        }
    }

    fields
}

/// Replaces reference attributes with global-id fields typed against the
/// referenced entity, and the primary key with a nullable global-id field
/// typed against `entity` itself.
pub fn convert_fields_to_global_id(entity: &Entity, fields: &mut AttributeFields) {
    for field in fields.fields.values_mut() {
        if let Some(target) = &field.attribute.references {
            field.kind = FieldKind::GlobalId(target.clone());
        }
        if field.attribute.name == entity.primary_key() {
            field.kind = FieldKind::GlobalId(entity.name().to_string());
            field.nullable = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayql_core::{AssociationOptions, ModelRegistry};
    use serde_json::json;

    fn registry() -> ModelRegistry {
        ModelRegistry::builder()
            .define(
                Entity::new("User")
                    .with_attribute(Attribute::new("email", AttributeType::String).not_null())
                    .with_attribute(Attribute::new("password", AttributeType::String))
                    .with_attribute(Attribute::new("secret", AttributeType::String))
                    .with_excluded(["secret"]),
            )
            .define(
                Entity::new("Todo")
                    .with_attribute(Attribute::new("text", AttributeType::String).not_null())
                    .with_attribute(
                        Attribute::new("status", AttributeType::Enum(vec!["open".into(), "done".into()]))
                            .not_null()
                            .default_value("open"),
                    ),
            )
            .belongs_to("Todo", "User", AssociationOptions::new())
            .build()
            .unwrap()
    }

    #[test]
    fn test_output_fields_skip_excluded_and_timestamps() {
        let models = registry();
        let fields = attribute_fields(models.get("User").unwrap(), AttributeFieldOptions::output());

        let names: Vec<_> = fields.names().collect();
        assert_eq!(names, vec!["id", "email", "password"]);
        assert_eq!(fields.get("id").unwrap().kind, FieldKind::GlobalId("User".into()));
        assert!(!fields.get("id").unwrap().nullable);
        assert!(!fields.get("email").unwrap().nullable);
    }

    #[test]
    fn test_reference_fields_use_global_ids() {
        let models = registry();
        let fields = attribute_fields(models.get("Todo").unwrap(), AttributeFieldOptions::output());

        assert_eq!(fields.get("UserId").unwrap().kind, FieldKind::GlobalId("User".into()));
        assert_eq!(
            fields.get("status").unwrap().kind,
            FieldKind::Enum("TodoStatusEnumType".into())
        );
    }

    #[test]
    fn test_convert_fields_to_global_id_makes_pk_nullable() {
        let models = registry();
        let todo = models.get("Todo").unwrap();
        let mut fields = attribute_fields(todo, AttributeFieldOptions::create_input());
        assert_eq!(fields.get("id").unwrap().kind, FieldKind::Scalar(TypeRef::INT));

        convert_fields_to_global_id(todo, &mut fields);
        let id = fields.get("id").unwrap();
        assert_eq!(id.kind, FieldKind::GlobalId("Todo".into()));
        assert!(id.nullable);
        assert_eq!(fields.get("UserId").unwrap().kind, FieldKind::GlobalId("User".into()));
        assert!(fields.get("status").unwrap().nullable);
        assert!(!fields.get("text").unwrap().nullable);
    }

    #[test]
    fn test_partial_fields_are_nullable() {
        let models = registry();
        let fields = attribute_fields(models.get("Todo").unwrap(), AttributeFieldOptions::partial());
        assert!(fields.fields.values().all(|f| f.nullable));
    }

    #[test]
    fn test_output_value_conversion() {
        let models = registry();
        let fields = attribute_fields(models.get("Todo").unwrap(), AttributeFieldOptions::output());

        let id = fields.get("id").unwrap();
        assert_eq!(
            id.output_value(json!(5)),
            Some(Value::from(crate::global_id::to_global_id("Todo", 5)))
        );
        assert_eq!(id.output_value(JsonValue::Null), None);

        let status = fields.get("status").unwrap();
        assert_eq!(
            status.output_value(json!("open")),
            Some(Value::Enum(async_graphql::Name::new("open")))
        );
    }
}
