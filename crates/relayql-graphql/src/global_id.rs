//! Opaque, type-tagged identifiers.
//!
//! A global id is `base64("<Type>:<raw id>")`. Decoding splits at the first
//! `:`; a raw id that parses as an integer comes back as [`RawId::Int`], any
//! other raw id as [`RawId::String`]. The embedded type name is not checked
//! against the caller's expectation: a mismatched id simply finds nothing.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use relayql_core::{Entity, Record};
use serde_json::Value;
use tracing::trace;

use crate::error::GraphQLError;

/// Reserved input key used for mutation request correlation.
pub const CLIENT_MUTATION_ID: &str = "clientMutationId";

/// Primary-key value recovered from a global id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawId {
    Int(i64),
    String(String),
}

impl RawId {
    fn parse(raw: &str) -> Self {
        raw.parse::<i64>()
            .map_or_else(|_| Self::String(raw.to_string()), Self::Int)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(id) => Value::from(*id),
            Self::String(id) => Value::String(id.clone()),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::String(id) => write!(f, "{id}"),
        }
    }
}

/// A decoded global id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGlobalId {
    pub type_name: String,
    pub id: RawId,
}

/// Encodes `id` as a global id of `type_name`.
pub fn to_global_id(type_name: &str, id: impl fmt::Display) -> String {
    STANDARD.encode(format!("{type_name}:{id}"))
}

/// Encodes a stored primary-key value. Returns `None` for `null`.
pub fn value_to_global_id(type_name: &str, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(id) => Some(to_global_id(type_name, id)),
        Value::Number(n) => match n.as_i64() {
            Some(id) => Some(to_global_id(type_name, id)),
            None => Some(to_global_id(type_name, n)),
        },
        other => Some(to_global_id(type_name, other)),
    }
}

/// Decodes a global id.
///
/// # Errors
///
/// Returns `GraphQLError::InvalidGlobalId` if the id is not base64, not
/// UTF-8 or has no `:` separator.
pub fn from_global_id(global_id: &str) -> Result<ResolvedGlobalId, GraphQLError> {
    let invalid = || GraphQLError::InvalidGlobalId(global_id.to_string());

    let bytes = STANDARD.decode(global_id).map_err(|_| invalid())?;
    let decoded = String::from_utf8(bytes).map_err(|_| invalid())?;
    let (type_name, raw) = decoded.split_once(':').ok_or_else(invalid)?;

    Ok(ResolvedGlobalId {
        type_name: type_name.to_string(),
        id: RawId::parse(raw),
    })
}

/// Decodes, in place, every primary-key and reference attribute of `data`.
///
/// `clientMutationId` and keys that are not attributes of `entity` are left
/// untouched, as are `null` values.
///
/// # Errors
///
/// Returns `GraphQLError::InvalidGlobalId` if an id attribute holds a value
/// that is not a valid global id.
pub fn convert_fields_from_global_id(entity: &Entity, data: &mut Record) -> Result<(), GraphQLError> {
    for (key, value) in data.iter_mut() {
        if key == CLIENT_MUTATION_ID {
            continue;
        }
        let Some(attribute) = entity.attribute(key) else {
            continue;
        };
        if !attribute.primary_key && attribute.references.is_none() {
            continue;
        }
        match value {
            Value::Null => {}
            Value::String(global_id) => {
                let resolved = from_global_id(global_id)?;
                trace!(
                    entity = %entity.name(),
                    field = %key,
                    type_name = %resolved.type_name,
                    "Decoded global id"
                );
                *value = resolved.id.to_json();
            }
            other => return Err(GraphQLError::InvalidGlobalId(other.to_string())),
        }
    }
    Ok(())
}
