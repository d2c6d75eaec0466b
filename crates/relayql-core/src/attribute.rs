use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::Record;

/// Computes an attribute value from the record it belongs to.
pub type AttributeResolver = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

/// Semantic type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Text,
    Int,
    BigInt,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Uuid,
    Json,
    /// Closed set of string values.
    Enum(Vec<String>),
}

impl AttributeType {
    /// Whether values of this type are generated by the store when omitted.
    pub fn is_generated_key(&self) -> bool {
        matches!(self, Self::Uuid)
    }
}

/// A single column of an entity.
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub ty: AttributeType,
    pub allow_null: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    /// Entity this attribute points at, for foreign keys.
    pub references: Option<String>,
    pub default_value: Option<Value>,
    pub description: Option<String>,
    pub resolver: Option<AttributeResolver>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            name: name.into(),
            ty,
            allow_null: true,
            primary_key: false,
            auto_increment: false,
            unique: false,
            references: None,
            default_value: None,
            description: None,
            resolver: None,
        }
    }

    /// Integer auto-increment primary key named `name`.
    pub fn auto_id(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Int).primary_key().auto_increment()
    }

    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.allow_null = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, entity: impl Into<String>) -> Self {
        self.references = Some(entity.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the plain property read with a computed value.
    pub fn resolve_with<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Whether the store fills this attribute in when it is omitted on create.
    pub fn is_generated(&self) -> bool {
        self.auto_increment
            || self.default_value.is_some()
            || (self.primary_key && self.ty.is_generated_key())
    }

    /// Reads this attribute from `record`, honouring a custom resolver.
    pub fn read(&self, record: &Record) -> Value {
        match &self.resolver {
            Some(resolver) => resolver(record),
            None => record.get(&self.name).cloned().unwrap_or(Value::Null),
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("allow_null", &self.allow_null)
            .field("primary_key", &self.primary_key)
            .field("auto_increment", &self.auto_increment)
            .field("unique", &self.unique)
            .field("references", &self.references)
            .field("default_value", &self.default_value)
            .field("resolver", &self.resolver.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
