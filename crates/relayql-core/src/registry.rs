//! Model registry and the builder that normalises a model graph.

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

use crate::association::{Association, AssociationOptions, ThroughOptions};
use crate::attribute::{Attribute, AttributeType};
use crate::entity::Entity;
use crate::error::{CoreError, Result};
use crate::inflection::{pluralize, upper_first};

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("Invalid name regex"));

/// Checks that `name` can be used verbatim as a GraphQL name.
pub fn validate_name(name: &str) -> Result<()> {
    if !NAME_REGEX.is_match(name) {
        return Err(CoreError::invalid_name(
            name,
            "must match /[_A-Za-z][_0-9A-Za-z]*/",
        ));
    }
    if name.starts_with("__") {
        return Err(CoreError::invalid_name(
            name,
            "names starting with \"__\" are reserved",
        ));
    }
    Ok(())
}

/// Immutable, ordered set of normalised entities.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entities: IndexMap<String, Arc<Entity>>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Entity>> {
        self.entities.get(name)
    }

    /// Like [`get`](Self::get) but fails with [`CoreError::UnknownEntity`].
    pub fn entity(&self, name: &str) -> Result<&Arc<Entity>> {
        self.entities
            .get(name)
            .ok_or_else(|| CoreError::UnknownEntity(name.to_string()))
    }

    /// Entities in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Declaration {
    BelongsTo {
        source: String,
        target: String,
        options: AssociationOptions,
    },
    HasMany {
        source: String,
        target: String,
        options: AssociationOptions,
    },
    BelongsToMany {
        source: String,
        target: String,
        options: ThroughOptions,
    },
}

/// Collects entity definitions and association declarations.
#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    entities: Vec<Entity>,
    declarations: Vec<Declaration>,
}

impl ModelRegistryBuilder {
    pub fn define(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// `source` holds a foreign key to `target`.
    pub fn belongs_to(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        self.declarations.push(Declaration::BelongsTo {
            source: source.into(),
            target: target.into(),
            options,
        });
        self
    }

    /// `target` rows hold a foreign key to `source`.
    pub fn has_many(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        self.declarations.push(Declaration::HasMany {
            source: source.into(),
            target: target.into(),
            options,
        });
        self
    }

    /// `source` and `target` are paired by rows of `options.through`.
    pub fn belongs_to_many(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        options: ThroughOptions,
    ) -> Self {
        self.declarations.push(Declaration::BelongsToMany {
            source: source.into(),
            target: target.into(),
            options,
        });
        self
    }

    /// Validates names, applies ORM defaults and resolves every association.
    pub fn build(self) -> Result<ModelRegistry> {
        let mut entities: IndexMap<String, Entity> = IndexMap::new();

        for mut entity in self.entities {
            validate_entity(&entity)?;
            if entities.contains_key(entity.name()) {
                return Err(CoreError::DuplicateEntity(entity.name().to_string()));
            }
            entity.normalize();
            entities.insert(entity.name().to_string(), entity);
        }

        for declaration in self.declarations {
            apply_declaration(&mut entities, declaration)?;
        }

        debug!(entities = entities.len(), "Model registry built");

        Ok(ModelRegistry {
            entities: entities
                .into_iter()
                .map(|(name, entity)| (name, Arc::new(entity)))
                .collect(),
        })
    }
}

fn validate_entity(entity: &Entity) -> Result<()> {
    validate_name(entity.name())?;
    for attribute in entity.attributes() {
        validate_name(&attribute.name)?;
        if let AttributeType::Enum(values) = &attribute.ty {
            for value in values {
                validate_name(value)?;
            }
        }
    }
    for excluded in entity.excluded_fields() {
        if entity.attribute(excluded).is_none() {
            warn!(
                entity = %entity.name(),
                field = %excluded,
                "Excluded field is not an attribute"
            );
        }
    }
    Ok(())
}

fn primary_key_type(entities: &IndexMap<String, Entity>, name: &str) -> Result<(String, AttributeType)> {
    let entity = entities
        .get(name)
        .ok_or_else(|| CoreError::UnknownEntity(name.to_string()))?;
    let pk = entity
        .primary_key_attribute()
        .ok_or_else(|| CoreError::unknown_attribute(name, entity.primary_key()))?;
    Ok((pk.name.clone(), pk.ty.clone()))
}

fn ensure_target(
    entities: &IndexMap<String, Entity>,
    source: &str,
    key: &str,
    target: &str,
) -> Result<()> {
    if !entities.contains_key(source) {
        return Err(CoreError::UnknownEntity(source.to_string()));
    }
    if !entities.contains_key(target) {
        return Err(CoreError::UnknownAssociationTarget {
            entity: source.to_string(),
            key: key.to_string(),
            target: target.to_string(),
        });
    }
    Ok(())
}

/// Adds `name` to `holder` as a reference to `target` unless already declared.
fn add_foreign_key(
    entities: &mut IndexMap<String, Entity>,
    holder: &str,
    name: &str,
    target: &str,
    ty: AttributeType,
) -> Result<()> {
    validate_name(name)?;
    let entity = entities
        .get_mut(holder)
        .ok_or_else(|| CoreError::UnknownEntity(holder.to_string()))?;
    match entity.attributes.get_mut(name) {
        Some(existing) => {
            if existing.references.is_none() {
                existing.references = Some(target.to_string());
            }
        }
        None => {
            entity
                .attributes
                .insert(name.to_string(), Attribute::new(name, ty).references(target));
        }
    }
    Ok(())
}

fn insert_association(
    entities: &mut IndexMap<String, Entity>,
    source: &str,
    association: Association,
) -> Result<()> {
    validate_name(association.key())?;
    let entity = entities
        .get_mut(source)
        .ok_or_else(|| CoreError::UnknownEntity(source.to_string()))?;
    if entity.associations.contains_key(association.key()) {
        return Err(CoreError::DuplicateAssociation {
            entity: source.to_string(),
            key: association.key().to_string(),
        });
    }
    entity
        .associations
        .insert(association.key().to_string(), association);
    Ok(())
}

fn apply_declaration(entities: &mut IndexMap<String, Entity>, declaration: Declaration) -> Result<()> {
    match declaration {
        Declaration::BelongsTo {
            source,
            target,
            options,
        } => {
            let alias = options.alias.unwrap_or_else(|| target.clone());
            ensure_target(entities, &source, &alias, &target)?;
            let (pk, pk_ty) = primary_key_type(entities, &target)?;
            let foreign_key = options
                .foreign_key
                .unwrap_or_else(|| format!("{alias}{}", upper_first(&pk)));

            add_foreign_key(entities, &source, &foreign_key, &target, pk_ty)?;
            insert_association(
                entities,
                &source,
                Association::BelongsTo {
                    key: alias.clone(),
                    target,
                    foreign_key,
                    alias,
                },
            )
        }
        Declaration::HasMany {
            source,
            target,
            options,
        } => {
            let alias = options.alias.unwrap_or_else(|| pluralize(&target));
            ensure_target(entities, &source, &alias, &target)?;
            let (pk, pk_ty) = primary_key_type(entities, &source)?;
            let foreign_key = options
                .foreign_key
                .unwrap_or_else(|| format!("{source}{}", upper_first(&pk)));

            add_foreign_key(entities, &target, &foreign_key, &source, pk_ty)?;
            insert_association(
                entities,
                &source,
                Association::HasMany {
                    key: alias.clone(),
                    target,
                    foreign_key,
                    alias,
                },
            )
        }
        Declaration::BelongsToMany {
            source,
            target,
            options,
        } => {
            let alias = options.alias.unwrap_or_else(|| pluralize(&target));
            ensure_target(entities, &source, &alias, &target)?;
            ensure_target(entities, &source, &alias, &options.through)?;
            let (source_pk, source_ty) = primary_key_type(entities, &source)?;
            let (target_pk, target_ty) = primary_key_type(entities, &target)?;
            let foreign_key = options
                .foreign_key
                .unwrap_or_else(|| format!("{source}{}", upper_first(&source_pk)));
            let other_key = options
                .other_key
                .unwrap_or_else(|| format!("{target}{}", upper_first(&target_pk)));

            add_foreign_key(entities, &options.through, &foreign_key, &source, source_ty)?;
            add_foreign_key(entities, &options.through, &other_key, &target, target_ty)?;
            insert_association(
                entities,
                &source,
                Association::BelongsToMany {
                    key: alias.clone(),
                    target,
                    through: options.through,
                    foreign_key,
                    other_key,
                    alias,
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::AssociationKind;

    fn todo_models() -> ModelRegistryBuilder {
        ModelRegistry::builder()
            .define(
                Entity::new("User")
                    .with_timestamps(false)
                    .with_attribute(Attribute::new("email", AttributeType::String).not_null()),
            )
            .define(
                Entity::new("Todo")
                    .with_attribute(Attribute::new("text", AttributeType::String).not_null()),
            )
            .define(
                Entity::new("TodoAssignee")
                    .with_attribute(Attribute::new("primary", AttributeType::Boolean)),
            )
    }

    #[test]
    fn test_has_many_adds_foreign_key_on_target() {
        let models = todo_models()
            .has_many("User", "Todo", AssociationOptions::new().alias("todos").foreign_key("userId"))
            .build()
            .unwrap();

        let todo = models.get("Todo").unwrap();
        let fk = todo.attribute("userId").unwrap();
        assert_eq!(fk.references.as_deref(), Some("User"));
        assert_eq!(fk.ty, AttributeType::Int);

        let user = models.get("User").unwrap();
        let association = user.association("todos").unwrap();
        assert_eq!(association.kind(), AssociationKind::HasMany);
        assert_eq!(association.target(), "Todo");
    }

    #[test]
    fn test_default_aliases_and_keys() {
        let models = todo_models()
            .belongs_to("Todo", "User", AssociationOptions::new())
            .has_many("User", "Todo", AssociationOptions::new())
            .belongs_to_many("User", "Todo", ThroughOptions::new("TodoAssignee"))
            .build();
        // `Todos` is declared twice on User: once by has_many, once by belongs_to_many.
        assert!(matches!(
            models,
            Err(CoreError::DuplicateAssociation { ref key, .. }) if key == "Todos"
        ));

        let models = todo_models()
            .belongs_to("Todo", "User", AssociationOptions::new())
            .belongs_to_many("User", "Todo", ThroughOptions::new("TodoAssignee"))
            .build()
            .unwrap();

        let todo = models.get("Todo").unwrap();
        assert_eq!(todo.association("User").unwrap().foreign_key(), "UserId");

        let join = models.get("TodoAssignee").unwrap();
        let names: Vec<_> = join.attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "primary", "createdAt", "updatedAt", "UserId", "TodoId"]
        );
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let err = todo_models()
            .has_many("User", "Project", AssociationOptions::new().alias("projects"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownAssociationTarget { ref target, .. } if target == "Project"));
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let err = ModelRegistry::builder()
            .define(Entity::new("Bad Name"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidName { .. }));

        let err = ModelRegistry::builder()
            .define(Entity::new("Task").with_attribute(Attribute::new(
                "state",
                AttributeType::Enum(vec!["open".into(), "in-progress".into()]),
            )))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidName { ref name, .. } if name == "in-progress"));

        assert!(validate_name("__typename").is_err());
        assert!(validate_name("todoAssignees").is_ok());
    }

    #[test]
    fn test_duplicate_entity() {
        let err = ModelRegistry::builder()
            .define(Entity::new("User"))
            .define(Entity::new("User"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEntity(_)));
    }
}
