// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Compiler Configuration
//!
//! Naming and rendering options shared by both compilers. Every field has a
//! default, so a model document may omit the options block entirely or set
//! only the fields it cares about:
//!
//! ```yaml
//! options:
//!   default_schema: sales
//!   recompile_hint: false
//! ```

use serde::{Deserialize, Serialize};
use setql_ir::{Dialect, EntityDefinition};

/// Options controlling emitted SQL text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Target dialect
    pub dialect: Dialect,
    /// Schema applied to entities that declare none
    pub default_schema: String,
    /// Append `OPTION (RECOMPILE)` to paged selects
    pub recompile_hint: bool,
    /// Name of the key-isolating CTE of a paged select
    pub paging_cte: String,
    /// Table variable receiving `OUTPUT` rows of a table-valued insert
    pub inserted_table: String,
    /// Alias of the table-valued parameter inside scripts
    pub tvp_alias: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::SqlServer,
            default_schema: "dbo".to_string(),
            recompile_hint: true,
            paging_cte: "Paged".to_string(),
            inserted_table: "inserted".to_string(),
            tvp_alias: "tvp".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    pub fn with_recompile_hint(mut self, enabled: bool) -> Self {
        self.recompile_hint = enabled;
        self
    }

    pub fn with_paging_cte(mut self, name: impl Into<String>) -> Self {
        self.paging_cte = name.into();
        self
    }

    pub fn with_inserted_table(mut self, name: impl Into<String>) -> Self {
        self.inserted_table = name.into();
        self
    }

    pub fn with_tvp_alias(mut self, alias: impl Into<String>) -> Self {
        self.tvp_alias = alias.into();
        self
    }

    /// Schema-qualified, quoted table name of `entity`
    pub fn table_name(&self, entity: &EntityDefinition) -> String {
        let schema = entity.schema.as_deref().unwrap_or(&self.default_schema);
        self.dialect.qualify(&[schema, entity.table.as_str()])
    }

    pub(crate) fn quote(&self, identifier: &str) -> String {
        self.dialect.quote(identifier)
    }
}
