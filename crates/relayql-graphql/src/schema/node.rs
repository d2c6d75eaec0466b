//! Global object identification: the `Node` interface and its type mapper.

use async_graphql::dynamic::{Interface, InterfaceField, TypeRef};
use indexmap::IndexMap;

/// Name of the node interface.
pub const NODE_INTERFACE: &str = "Node";

pub(crate) fn node_interface() -> Interface {
    Interface::new(NODE_INTERFACE)
        .description("An object with a globally unique ID")
        .field(InterfaceField::new("id", TypeRef::named_nn(TypeRef::ID)))
}

/// Maps GraphQL type names found in global ids to entity names.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeMapper {
    types: IndexMap<String, String>,
}

impl NodeTypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_type(&mut self, type_name: impl Into<String>, entity: impl Into<String>) {
        self.types.insert(type_name.into(), entity.into());
    }

    /// Entity stored under `type_name`, if it implements `Node`.
    pub fn entity_for(&self, type_name: &str) -> Option<&str> {
        self.types.get(type_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
