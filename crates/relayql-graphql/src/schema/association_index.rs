//! Index of associations by the entity they point to and come from.
//!
//! `to_model[T]` lists every association whose target is `T`, `from_model[E]`
//! every association declared on `E`. BelongsTo entries are keyed by the
//! association key; connection entries by `"<source>_<key>"` in `to_model`
//! and `"<target>_<key>"` in `from_model`, so the operation factory can find
//! the connection that a freshly written record appears in.

use std::sync::Arc;

use indexmap::IndexMap;
use relayql_core::{Association, AssociationKind, ModelRegistry};
use tracing::debug;

use super::connection::Connection;
use super::model_types::ModelTypes;
use super::type_cache::TypeCache;
use crate::error::GraphQLError;
use crate::naming::connection_name_for_association;

/// How an indexed association is exposed.
#[derive(Debug, Clone)]
pub enum AssociationLink {
    BelongsTo { foreign_key: String },
    Connection(Arc<Connection>),
}

/// One side of an indexed association.
#[derive(Debug, Clone)]
pub struct AssociationEntry {
    /// The entity on the other side: the source in `to_model`, the target in
    /// `from_model`.
    pub entity: String,
    pub kind: AssociationKind,
    pub key: String,
    pub alias: String,
    pub link: AssociationLink,
}

impl AssociationEntry {
    pub fn connection(&self) -> Option<&Arc<Connection>> {
        match &self.link {
            AssociationLink::Connection(connection) => Some(connection),
            AssociationLink::BelongsTo { .. } => None,
        }
    }
}

type EntryMap = IndexMap<String, IndexMap<String, AssociationEntry>>;

#[derive(Debug, Default)]
pub struct AssociationIndex {
    to_model: EntryMap,
    from_model: EntryMap,
}

impl AssociationIndex {
    /// Walks every association once. Connection types are built, cached
    /// and recorded in `model_types` along the way.
    pub(crate) fn build(
        models: &ModelRegistry,
        model_types: &mut ModelTypes,
        cache: &mut TypeCache,
    ) -> Result<Self, GraphQLError> {
        let mut index = Self::default();

        for entity in models.iter() {
            let source = entity.name();
            for association in entity.associations() {
                let key = association.key();
                let target = association.target();
                if model_types.entity_type(target).is_none() {
                    return Err(GraphQLError::MissingAssociationTarget {
                        entity: source.to_string(),
                        association: key.to_string(),
                        target: target.to_string(),
                    });
                }

                match association {
                    Association::BelongsTo { foreign_key, .. } => {
                        let link = AssociationLink::BelongsTo {
                            foreign_key: foreign_key.clone(),
                        };
                        index.insert_to(target, key, entry(source, association, link.clone()));
                        index.insert_from(source, key, entry(target, association, link));
                    }
                    Association::HasMany { .. } | Association::BelongsToMany { .. } => {
                        let name = connection_name_for_association(source, key);
                        let connection = Arc::new(Connection::new(name, source, association.clone()));
                        let (edge, connection_type) = connection.build_types(models)?;
                        cache.insert(connection.edge_type(), edge)?;
                        cache.insert(connection.connection_type(), connection_type)?;
                        model_types.insert_connection(connection.clone());

                        let link = AssociationLink::Connection(connection);
                        index.insert_to(
                            target,
                            &format!("{source}_{key}"),
                            entry(source, association, link.clone()),
                        );
                        index.insert_from(
                            source,
                            &format!("{target}_{key}"),
                            entry(target, association, link),
                        );
                    }
                }
            }
        }

        debug!(
            connections = model_types.connection_names().count(),
            "Association index built"
        );
        Ok(index)
    }

    fn insert_to(&mut self, entity: &str, key: &str, entry: AssociationEntry) {
        self.to_model
            .entry(entity.to_string())
            .or_default()
            .insert(key.to_string(), entry);
    }

    fn insert_from(&mut self, entity: &str, key: &str, entry: AssociationEntry) {
        self.from_model
            .entry(entity.to_string())
            .or_default()
            .insert(key.to_string(), entry);
    }

    /// Associations pointing at `entity`, in declaration order.
    pub fn to_model(&self, entity: &str) -> impl Iterator<Item = (&str, &AssociationEntry)> {
        self.to_model
            .get(entity)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Associations declared on `entity`, in declaration order.
    pub fn from_model(&self, entity: &str) -> impl Iterator<Item = (&str, &AssociationEntry)> {
        self.from_model
            .get(entity)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// The connection `from.key` as seen from its target `to`.
    pub fn reverse_connection(&self, from: &str, to: &str, key: &str) -> Option<&Arc<Connection>> {
        self.from_model
            .get(from)?
            .get(&format!("{to}_{key}"))?
            .connection()
    }
}

fn entry(entity: &str, association: &Association, link: AssociationLink) -> AssociationEntry {
    AssociationEntry {
        entity: entity.to_string(),
        kind: association.kind(),
        key: association.key().to_string(),
        alias: association.alias().to_string(),
        link,
    }
}
