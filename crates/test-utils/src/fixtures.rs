// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Fixture model types
//!
//! ```text
//! Root ──Related──▶ Related      (RelatedId = Id)
//!      ──Backup───▶ Related      (BackupId = Id, second path, aliased)
//!      ──SubData──▶ SubData      (Id = RootId, single surfaced column)
//! Related ──Owner─▶ Person       (OwnerId = Id)
//!
//! Person      generated Id, optional Born date
//! PersonDate  generated Id, child of Person
//! Tag         no generated columns
//! Account     composite key (Region, Number)
//! ```

use std::sync::Arc;

use setql_catalog::{
    ColumnDefinition, DataType, Entity, EntityCatalog, EntityDefinition, MetadataResult,
    RelationDefinition,
};

pub struct Root;

impl Entity for Root {
    const NAME: &'static str = "Root";

    fn definition() -> EntityDefinition {
        EntityDefinition::new(Self::NAME)
            .with_schema("dbo")
            .with_column(ColumnDefinition::new("Id", DataType::Integer))
            .with_column(ColumnDefinition::new("Name", DataType::NVarchar(Some(50))))
            .with_column(ColumnDefinition::new("RelatedId", DataType::Integer))
            .with_column(ColumnDefinition::new("BackupId", DataType::Integer).with_nullable(true))
            .with_column(ColumnDefinition::new("Created", DataType::DateTime))
            .with_primary_key(["Id"])
            .with_relation(RelationDefinition::to::<Related>("Related", "RelatedId", "Id"))
            .with_relation(RelationDefinition::to::<Related>("Backup", "BackupId", "Id"))
            .with_relation(RelationDefinition::to::<SubData>("SubData", "Id", "RootId"))
    }
}

pub struct Related;

impl Entity for Related {
    const NAME: &'static str = "Related";

    fn definition() -> EntityDefinition {
        EntityDefinition::new(Self::NAME)
            .with_schema("dbo")
            .with_column(ColumnDefinition::new("Id", DataType::Integer))
            .with_column(ColumnDefinition::new("Name", DataType::NVarchar(Some(40))))
            .with_column(ColumnDefinition::new("OwnerId", DataType::Integer).with_nullable(true))
            .with_primary_key(["Id"])
            .with_relation(RelationDefinition::to::<Person>("Owner", "OwnerId", "Id"))
    }
}

/// Child table surfacing a single value column; its `RootId` join column is
/// not part of the model
pub struct SubData;

impl Entity for SubData {
    const NAME: &'static str = "SubData";

    fn definition() -> EntityDefinition {
        EntityDefinition::new(Self::NAME)
            .with_schema("dbo")
            .with_column(ColumnDefinition::new("Value", DataType::NVarchar(None)).with_nullable(true))
    }
}

pub struct Person;

impl Entity for Person {
    const NAME: &'static str = "Person";

    fn definition() -> EntityDefinition {
        EntityDefinition::new(Self::NAME)
            .with_schema("dbo")
            .with_table("People")
            .with_column(ColumnDefinition::new("Id", DataType::Integer).with_generated())
            .with_column(ColumnDefinition::new("Name", DataType::NVarchar(Some(50))))
            .with_column(ColumnDefinition::new("Born", DataType::Date).with_nullable(true))
            .with_primary_key(["Id"])
    }
}

pub struct PersonDate;

impl Entity for PersonDate {
    const NAME: &'static str = "PersonDate";

    fn definition() -> EntityDefinition {
        EntityDefinition::new(Self::NAME)
            .with_schema("dbo")
            .with_column(ColumnDefinition::new("Id", DataType::Integer).with_generated())
            .with_column(ColumnDefinition::new("PersonId", DataType::Integer))
            .with_column(ColumnDefinition::new("Value", DataType::Date))
            .with_primary_key(["Id"])
    }
}

pub struct Tag;

impl Entity for Tag {
    const NAME: &'static str = "Tag";

    fn definition() -> EntityDefinition {
        EntityDefinition::new(Self::NAME)
            .with_schema("meta")
            .with_column(ColumnDefinition::new("Name", DataType::NVarchar(Some(30))))
            .with_column(ColumnDefinition::new("Weight", DataType::Integer))
            .with_primary_key(["Name"])
    }
}

pub struct Account;

impl Entity for Account {
    const NAME: &'static str = "Account";

    fn definition() -> EntityDefinition {
        EntityDefinition::new(Self::NAME)
            .with_schema("bank")
            .with_column(ColumnDefinition::new("Region", DataType::Char(Some(2))))
            .with_column(ColumnDefinition::new("Number", DataType::Integer))
            .with_column(ColumnDefinition::new("Balance", DataType::Money))
            .with_primary_key(["Region", "Number"])
    }
}

fn resolve_all(catalog: &EntityCatalog) -> MetadataResult<()> {
    catalog.resolve::<Root>()?;
    catalog.resolve::<Related>()?;
    catalog.resolve::<SubData>()?;
    catalog.resolve::<Person>()?;
    catalog.resolve::<PersonDate>()?;
    catalog.resolve::<Tag>()?;
    catalog.resolve::<Account>()?;
    Ok(())
}

/// Catalog holding every fixture entity
///
/// # Panics
///
/// Panics if a fixture definition fails validation.
pub fn fixture_catalog() -> Arc<EntityCatalog> {
    let catalog = EntityCatalog::new();
    if let Err(err) = resolve_all(&catalog) {
        panic!("invalid fixture model: {}", err);
    }
    Arc::new(catalog)
}
