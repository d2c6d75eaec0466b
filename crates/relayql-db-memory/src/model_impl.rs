//! Implementation of the ModelStore trait for InMemoryStorage.

use async_trait::async_trait;
use relayql_core::{Entity, Record};
use relayql_storage::{Filter, FindOptions, ModelStore, StorageError};
use tracing::debug;

use crate::query;
use crate::storage::{InMemoryStorage, StorageKey};

#[async_trait]
impl ModelStore for InMemoryStorage {
    async fn create(&self, entity: &Entity, data: Record) -> Result<Record, StorageError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(entity.name().to_string()).or_default();
        let row = table.insert(entity, data)?;
        debug!(entity = %entity.name(), "Created record");
        Ok(row)
    }

    async fn find_all(
        &self,
        entity: &Entity,
        options: &FindOptions,
    ) -> Result<Vec<Record>, StorageError> {
        let tables = self.tables.read().await;
        Ok(match tables.get(entity.name()) {
            Some(table) => query::execute(table.rows.values(), options),
            None => Vec::new(),
        })
    }

    async fn update(
        &self,
        entity: &Entity,
        values: Record,
        filter: &Filter,
    ) -> Result<u64, StorageError> {
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(entity.name()) else {
            return Ok(0);
        };
        let keys: Vec<StorageKey> = table
            .rows
            .iter()
            .filter(|(_, row)| filter.matches(row))
            .map(|(key, _)| key.clone())
            .collect();
        let affected = table.update(entity, &keys, &values)?;
        debug!(entity = %entity.name(), affected, "Updated records");
        Ok(affected)
    }

    async fn destroy(&self, entity: &Entity, filter: &Filter) -> Result<u64, StorageError> {
        let mut tables = self.tables.write().await;
        let Some(table) = tables.get_mut(entity.name()) else {
            return Ok(0);
        };
        let before = table.rows.len();
        table.rows.retain(|_, row| !filter.matches(row));
        let affected = (before - table.rows.len()) as u64;
        debug!(entity = %entity.name(), affected, "Destroyed records");
        Ok(affected)
    }

    async fn count(&self, entity: &Entity, filter: &Filter) -> Result<u64, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.get(entity.name()).map_or(0, |table| {
            table.rows.values().filter(|row| filter.matches(row)).count() as u64
        }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayql_core::{Attribute, AttributeType, ModelRegistry};
    use serde_json::json;
    use std::sync::Arc;

    fn todo() -> Arc<Entity> {
        ModelRegistry::builder()
            .define(
                Entity::new("Todo")
                    .with_attribute(Attribute::new("text", AttributeType::String).not_null())
                    .with_attribute(
                        Attribute::new("completed", AttributeType::Boolean)
                            .not_null()
                            .default_value(false),
                    ),
            )
            .build()
            .unwrap()
            .get("Todo")
            .unwrap()
            .clone()
    }

    fn data(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let storage = InMemoryStorage::new();
        let todo = todo();

        let created = storage
            .create(&todo, data(json!({"text": "write tests"})))
            .await
            .unwrap();
        assert_eq!(created["completed"], json!(false));

        let found = storage.find_by_pk(&todo, &json!(1)).await.unwrap().unwrap();
        assert_eq!(found["text"], json!("write tests"));

        let affected = storage
            .update(
                &todo,
                data(json!({"completed": true})),
                &Filter::new().eq("id", 1),
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let done = storage
            .count(&todo, &Filter::new().eq("completed", true))
            .await
            .unwrap();
        assert_eq!(done, 1);

        let removed = storage.destroy(&todo, &Filter::new()).await.unwrap();
        assert_eq!(removed, 1);
        assert!(storage.find_by_pk(&todo, &json!(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_table_is_empty() {
        let storage = InMemoryStorage::new();
        let todo = todo();

        assert!(storage.find_all(&todo, &FindOptions::new()).await.unwrap().is_empty());
        assert_eq!(storage.count(&todo, &Filter::new()).await.unwrap(), 0);
        assert_eq!(
            storage
                .update(&todo, data(json!({"text": "x"})), &Filter::new())
                .await
                .unwrap(),
            0
        );
        assert_eq!(storage.len("Todo").await, 0);
    }

    #[tokio::test]
    async fn test_find_one_uses_order() {
        let storage = InMemoryStorage::new();
        let todo = todo();
        for text in ["a", "c", "b"] {
            storage.create(&todo, data(json!({"text": text}))).await.unwrap();
        }

        let last = storage
            .find_one(&todo, &FindOptions::new().with_sort("text", true))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last["text"], json!("c"));
        assert_eq!(storage.backend_name(), "memory");
    }
}
