use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use relayql_core::entity::{CREATED_AT, UPDATED_AT};
use relayql_core::{Entity, Record};
use relayql_storage::{StorageError, values_equal};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;
use tracing::trace;

/// Primary key rendered as a map key. Integral floats collapse to integers.
pub type StorageKey = String;

pub(crate) fn make_storage_key(value: &Value) -> StorageKey {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn now_rfc3339() -> Result<String, StorageError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| StorageError::internal(e.to_string()))
}

/// Rows of one entity in insertion order.
#[derive(Debug)]
pub(crate) struct Table {
    pub(crate) rows: IndexMap<StorageKey, Record>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: IndexMap::new(),
            next_id: 1,
        }
    }
}

impl Table {
    /// Builds a complete row from submitted data and stores it.
    pub(crate) fn insert(&mut self, entity: &Entity, data: Record) -> Result<Record, StorageError> {
        let mut row = Record::new();
        for (name, value) in data {
            if entity.attribute(&name).is_some() {
                row.insert(name, value);
            } else {
                trace!(entity = %entity.name(), field = %name, "Ignoring unknown attribute");
            }
        }

        for attribute in entity.attributes() {
            let missing = row.get(&attribute.name).is_none_or(Value::is_null);
            if !missing {
                continue;
            }
            if attribute.primary_key && attribute.auto_increment {
                row.insert(attribute.name.clone(), Value::from(self.next_id));
            } else if attribute.primary_key && attribute.ty.is_generated_key() {
                row.insert(
                    attribute.name.clone(),
                    Value::String(uuid::Uuid::new_v4().to_string()),
                );
            } else if let Some(default) = &attribute.default_value {
                row.insert(attribute.name.clone(), default.clone());
            }
        }

        if entity.has_timestamps() {
            let now = Value::String(now_rfc3339()?);
            row.insert(CREATED_AT.to_string(), now.clone());
            row.insert(UPDATED_AT.to_string(), now);
        }

        let pk = row
            .get(entity.primary_key())
            .cloned()
            .unwrap_or(Value::Null);
        let key = make_storage_key(&pk);
        if self.rows.contains_key(&key) {
            return Err(StorageError::already_exists(entity.name(), key));
        }

        check_not_null(entity, &row)?;
        check_unique(entity, &row, self.rows.values())?;

        if let Some(id) = pk.as_i64() {
            self.next_id = self.next_id.max(id.saturating_add(1));
        }
        self.rows.insert(key, row.clone());
        Ok(row)
    }

    /// Applies `values` to the rows under `keys`, validating before writing.
    pub(crate) fn update(
        &mut self,
        entity: &Entity,
        keys: &[StorageKey],
        values: &Record,
    ) -> Result<u64, StorageError> {
        let pk = entity.primary_key();
        let now = if entity.has_timestamps() {
            Some(Value::String(now_rfc3339()?))
        } else {
            None
        };

        let mut updated = self.rows.clone();
        for key in keys {
            let Some(row) = updated.get_mut(key) else {
                continue;
            };
            for (name, value) in values {
                if entity.attribute(name).is_none() {
                    continue;
                }
                if name == pk && !values_equal(row.get(pk).unwrap_or(&Value::Null), value) {
                    return Err(StorageError::invalid_record(format!(
                        "{}.{pk} cannot be changed",
                        entity.name()
                    )));
                }
                row.insert(name.clone(), value.clone());
            }
            if let Some(now) = &now {
                row.insert(UPDATED_AT.to_string(), now.clone());
            }
        }

        for key in keys {
            if let Some(row) = updated.get(key) {
                check_not_null(entity, row)?;
                check_unique(
                    entity,
                    row,
                    updated.iter().filter(|(k, _)| *k != key).map(|(_, r)| r),
                )?;
            }
        }

        self.rows = updated;
        Ok(keys.len() as u64)
    }
}

fn check_not_null(entity: &Entity, row: &Record) -> Result<(), StorageError> {
    for attribute in entity.attributes() {
        if !attribute.allow_null && row.get(&attribute.name).is_none_or(Value::is_null) {
            return Err(StorageError::invalid_record(format!(
                "notNull violation: {}.{} cannot be null",
                entity.name(),
                attribute.name
            )));
        }
    }
    Ok(())
}

fn check_unique<'a>(
    entity: &Entity,
    row: &Record,
    others: impl Iterator<Item = &'a Record> + Clone,
) -> Result<(), StorageError> {
    for attribute in entity.attributes().filter(|a| a.unique) {
        let Some(value) = row.get(&attribute.name).filter(|v| !v.is_null()) else {
            continue;
        };
        let taken = others
            .clone()
            .any(|other| other.get(&attribute.name).is_some_and(|v| values_equal(v, value)));
        if taken {
            return Err(StorageError::constraint_violation(format!(
                "{}.{} must be unique",
                entity.name(),
                attribute.name
            )));
        }
    }
    Ok(())
}

/// In-memory storage backend.
///
/// - One table per entity, created on first insert
/// - Auto-increment and UUID primary keys, attribute defaults and timestamps
/// - Not-null and unique validation
/// - Filtering, ordering and pagination via [`crate::query`]
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    pub(crate) tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows stored for `entity`.
    pub async fn len(&self, entity: &str) -> usize {
        self.tables
            .read()
            .await
            .get(entity)
            .map_or(0, |table| table.rows.len())
    }

    /// Drops every table.
    pub async fn clear(&self) {
        self.tables.write().await.clear();
    }
}
