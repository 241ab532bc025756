// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Entity Catalog
//!
//! In-memory registry of validated entity definitions.
//!
//! Definitions enter the catalog either by model type
//! ([`EntityCatalog::resolve`], cached by `TypeId`) or by value
//! ([`EntityCatalog::register`], e.g. definitions loaded from a model
//! document). Both paths share one name-keyed map, and the first definition
//! stored under a name is the one every later lookup sees.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{MetadataError, MetadataResult};
use crate::metadata::{Entity, EntityDefinition};
use crate::r#trait::Catalog;

/// Registry of entity definitions
#[derive(Debug, Default)]
pub struct EntityCatalog {
    by_name: RwLock<HashMap<String, Arc<EntityDefinition>>>,
    by_type: RwLock<HashMap<TypeId, Arc<EntityDefinition>>>,
}

impl EntityCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with `definitions`
    pub fn with_definitions(
        definitions: impl IntoIterator<Item = EntityDefinition>,
    ) -> MetadataResult<Self> {
        let catalog = Self::new();
        for definition in definitions {
            catalog.register(definition)?;
        }
        Ok(catalog)
    }

    /// Resolve the definition attached to model type `T`
    ///
    /// The definition is built and validated on first use and cached for
    /// the lifetime of the catalog. Concurrent first calls build it once: the
    /// type cache stays write-locked until the definition is stored.
    pub fn resolve<T: Entity>(&self) -> MetadataResult<Arc<EntityDefinition>> {
        let type_id = TypeId::of::<T>();
        if let Some(cached) = self
            .by_type
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return Ok(cached.clone());
        }

        // Lock order is by_type, then by_name
        let mut by_type = self.by_type.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = by_type.get(&type_id) {
            return Ok(cached.clone());
        }

        let definition = T::definition();
        if definition.name != T::NAME {
            return Err(MetadataError::NameMismatch {
                declared: T::NAME.to_string(),
                defined: definition.name,
            });
        }

        let stored = self.register(definition)?;
        by_type.insert(type_id, stored.clone());
        Ok(stored)
    }

    /// Validate and store `definition`, returning the stored definition
    ///
    /// If an entity of the same name is already registered, the existing
    /// definition is kept and returned.
    pub fn register(&self, definition: EntityDefinition) -> MetadataResult<Arc<EntityDefinition>> {
        validate(&definition)?;

        let mut by_name = self.by_name.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = by_name.get(&definition.name) {
            debug!(entity = %definition.name, "Entity already registered, keeping first definition");
            return Ok(existing.clone());
        }

        debug!(
            entity = %definition.name,
            table = %definition.table,
            columns = definition.columns.len(),
            relations = definition.relations.len(),
            "Registered entity"
        );
        let stored = Arc::new(definition);
        by_name.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    /// Whether an entity named `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Names of all registered entities, sorted
    pub fn entity_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl Catalog for EntityCatalog {
    fn entity(&self, name: &str) -> MetadataResult<Arc<EntityDefinition>> {
        self.by_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownEntity(name.to_string()))
    }
}

/// Check a definition for internal consistency
///
/// Relation targets are not checked here: they may be registered later and
/// are looked up when a query joins them.
fn validate(definition: &EntityDefinition) -> MetadataResult<()> {
    let entity = &definition.name;
    let empty = |what: &str| MetadataError::EmptyIdentifier {
        entity: entity.clone(),
        what: what.to_string(),
    };

    if entity.is_empty() {
        return Err(empty("entity name"));
    }
    if definition.table.is_empty() {
        return Err(empty("table name"));
    }
    if definition.schema.as_deref().is_some_and(str::is_empty) {
        return Err(empty("schema name"));
    }

    let mut columns = HashSet::new();
    for column in &definition.columns {
        if column.name.is_empty() {
            return Err(empty("column name"));
        }
        if !columns.insert(column.name.as_str()) {
            return Err(MetadataError::DuplicateColumn {
                entity: entity.clone(),
                column: column.name.clone(),
            });
        }
    }

    let unknown_column = |column: &str| MetadataError::UnknownColumn {
        entity: entity.clone(),
        column: column.to_string(),
    };

    for key in &definition.primary_key {
        if !columns.contains(key.as_str()) {
            return Err(unknown_column(key));
        }
    }

    let mut navigations = HashSet::new();
    for relation in &definition.relations {
        if relation.navigation.is_empty() {
            return Err(empty("navigation name"));
        }
        if relation.target.is_empty() || relation.right_column.is_empty() {
            return Err(empty(&format!("target of navigation '{}'", relation.navigation)));
        }
        if !navigations.insert(relation.navigation.as_str()) {
            return Err(MetadataError::DuplicateRelation {
                entity: entity.clone(),
                navigation: relation.navigation.clone(),
            });
        }
        if !columns.contains(relation.left_column.as_str()) {
            return Err(unknown_column(&relation.left_column));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ColumnDefinition, DataType, RelationDefinition};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Person;

    impl Entity for Person {
        const NAME: &'static str = "Person";

        fn definition() -> EntityDefinition {
            EntityDefinition::new(Self::NAME)
                .with_schema("dbo")
                .with_column(ColumnDefinition::new("Id", DataType::Integer).with_generated())
                .with_column(ColumnDefinition::new("Name", DataType::NVarchar(Some(50))))
                .with_primary_key(["Id"])
        }
    }

    struct Misnamed;

    impl Entity for Misnamed {
        const NAME: &'static str = "Misnamed";

        fn definition() -> EntityDefinition {
            EntityDefinition::new("SomethingElse")
        }
    }

    #[test]
    fn test_resolve_caches_by_type() {
        let catalog = EntityCatalog::new();
        let first = catalog.resolve::<Person>().unwrap();
        let second = catalog.resolve::<Person>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &catalog.entity("Person").unwrap()));
    }

    struct Counted;

    static COUNTED_BUILDS: AtomicUsize = AtomicUsize::new(0);

    impl Entity for Counted {
        const NAME: &'static str = "Counted";

        fn definition() -> EntityDefinition {
            COUNTED_BUILDS.fetch_add(1, Ordering::SeqCst);
            EntityDefinition::new("Counted")
                .with_column(ColumnDefinition::new("Id", DataType::Integer))
        }
    }

    #[test]
    fn test_concurrent_resolve_builds_once() {
        let catalog = EntityCatalog::new();
        let resolved: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| catalog.resolve::<Counted>().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(COUNTED_BUILDS.load(Ordering::SeqCst), 1);
        assert!(resolved.iter().all(|d| Arc::ptr_eq(d, &resolved[0])));
    }

    #[test]
    fn test_register_first_write_wins() {
        let catalog = EntityCatalog::new();
        catalog.resolve::<Person>().unwrap();

        let replacement = EntityDefinition::new("Person").with_table("Other");
        let stored = catalog.register(replacement).unwrap();
        assert_eq!(stored.table, "Person");
    }

    #[test]
    fn test_name_mismatch() {
        let catalog = EntityCatalog::new();
        let err = catalog.resolve::<Misnamed>().unwrap_err();
        assert!(matches!(err, MetadataError::NameMismatch { .. }));
        assert!(!catalog.contains("SomethingElse"));
    }

    #[test]
    fn test_unknown_entity() {
        let catalog = EntityCatalog::new();
        assert_eq!(
            catalog.entity("Ghost").unwrap_err(),
            MetadataError::UnknownEntity("Ghost".into())
        );
    }

    #[test]
    fn test_validation_rejects_bad_definitions() {
        let duplicate = EntityDefinition::new("Dup")
            .with_column(ColumnDefinition::new("A", DataType::Integer))
            .with_column(ColumnDefinition::new("A", DataType::Integer));
        assert!(matches!(
            validate(&duplicate),
            Err(MetadataError::DuplicateColumn { .. })
        ));

        let bad_key = EntityDefinition::new("BadKey")
            .with_column(ColumnDefinition::new("A", DataType::Integer))
            .with_primary_key(["B"]);
        assert!(matches!(
            validate(&bad_key),
            Err(MetadataError::UnknownColumn { .. })
        ));

        let bad_relation = EntityDefinition::new("BadRelation")
            .with_column(ColumnDefinition::new("A", DataType::Integer))
            .with_relation(RelationDefinition::new("Other", "Other", "Missing", "Id"));
        assert!(matches!(
            validate(&bad_relation),
            Err(MetadataError::UnknownColumn { .. })
        ));

        let empty_schema = EntityDefinition::new("Empty").with_schema("");
        assert!(matches!(
            validate(&empty_schema),
            Err(MetadataError::EmptyIdentifier { .. })
        ));
    }

    #[test]
    fn test_keyed_entity() {
        let catalog = EntityCatalog::new();
        catalog.resolve::<Person>().unwrap();
        catalog
            .register(
                EntityDefinition::new("Log")
                    .with_column(ColumnDefinition::new("Message", DataType::Text)),
            )
            .unwrap();

        assert!(catalog.keyed_entity("Person").is_ok());
        assert_eq!(
            catalog.keyed_entity("Log").unwrap_err(),
            MetadataError::MissingPrimaryKey("Log".into())
        );
    }
}
