// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Model Documents
//!
//! A model document declares the compiler options and every entity the
//! specifications may reference:
//!
//! ```yaml
//! options:
//!   default_schema: dbo
//! entities:
//!   - name: Person
//!     table: People
//!     columns:
//!       - name: Id
//!         data_type: Integer
//!         generated: true
//!       - name: Name
//!         data_type: !NVarchar 50
//!     primary_key: [Id]
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use setql_catalog::{EntityCatalog, EntityDefinition};
use setql_compiler::CompilerOptions;
use tracing::debug;

/// Parsed model document
#[derive(Debug, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub options: CompilerOptions,
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
}

impl ModelDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let model: Self = read_yaml(path)?;
        debug!(entities = model.entities.len(), path = %path.display(), "Loaded model");
        Ok(model)
    }

    /// Validate every entity into a catalog
    pub fn into_catalog(self) -> Result<(Arc<EntityCatalog>, CompilerOptions)> {
        let catalog = EntityCatalog::with_definitions(self.entities)
            .context("Model contains an invalid entity definition")?;
        Ok((Arc::new(catalog), self.options))
    }
}

/// Read and deserialize a YAML document
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
