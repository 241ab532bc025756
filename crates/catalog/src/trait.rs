// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog trait for entity metadata lookup
//!
//! The compilers only need to look definitions up by name: the root entity of
//! a specification, then the target of every relation it joins.

use std::sync::Arc;

use crate::error::{MetadataError, MetadataResult};
use crate::metadata::EntityDefinition;

/// Catalog trait for entity metadata lookup
///
/// Lookups perform no I/O and never block beyond short-lived synchronization,
/// so the trait is synchronous.
///
/// # Examples
///
/// ```rust,ignore
/// fn table_of(catalog: &dyn Catalog, entity: &str) -> MetadataResult<String> {
///     Ok(catalog.entity(entity)?.table.clone())
/// }
/// ```
pub trait Catalog: Send + Sync {
    /// Get the definition registered under `name`
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::UnknownEntity` if no such entity is registered.
    fn entity(&self, name: &str) -> MetadataResult<Arc<EntityDefinition>>;

    /// Get the definition and require it to declare a primary key
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::MissingPrimaryKey` if the key list is empty.
    fn keyed_entity(&self, name: &str) -> MetadataResult<Arc<EntityDefinition>> {
        let entity = self.entity(name)?;
        if entity.primary_key.is_empty() {
            return Err(MetadataError::MissingPrimaryKey(entity.name.clone()));
        }
        Ok(entity)
    }
}
