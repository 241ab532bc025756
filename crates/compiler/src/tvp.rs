// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Table-Valued Write Compiler
//!
//! Builds set-based insert scripts that read a whole batch of rows from one
//! table-valued parameter (`@<Entity>Table AS [tvp]`). The compiler renders
//! the script and projects the rows into the parameter's column order; the
//! execution layer binds the parameter.
//!
//! ## Script shapes
//!
//! Entity without generated columns:
//!
//! ```text
//! INSERT INTO [dbo].[Tag] ([Name]) SELECT [tvp].[Name] FROM @TagTable AS [tvp];
//! ```
//!
//! Entity with a generated key, capturing values and returning them
//! correlated to the input rows:
//!
//! ```text
//! DECLARE @inserted TABLE ([Id] INT, [Name] NVARCHAR(50));
//! INSERT INTO [dbo].[Person] ([Name]) OUTPUT INSERTED.[Id], INSERTED.[Name]
//!     INTO @inserted ([Id], [Name]) SELECT [tvp].[Name] FROM @PersonTable AS [tvp];
//! SELECT [inserted].[Id], [inserted].[Name] FROM @inserted AS [inserted]
//!     INNER JOIN @PersonTable AS [tvp] ON [inserted].[Name] = [tvp].[Name];
//! ```
//!
//! An empty batch compiles to the same script with an empty parameter.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use setql_catalog::{Catalog, ColumnDefinition, EntityDefinition};
use setql_ir::{DependentWrite, Literal, Row, TableValuedWrite};
use tracing::{debug, instrument};

use crate::config::CompilerOptions;
use crate::error::{CompileResult, SpecificationError};

/// Rows bound to a table-valued parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableValuedParameter {
    /// Parameter name including the `@` prefix
    pub name: String,
    /// Parameter shape in column order
    pub columns: Vec<ColumnDefinition>,
    /// Row values in `columns` order
    pub rows: Vec<Vec<Literal>>,
}

/// Compiled write script plus the parameter it reads from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableValuedScript {
    pub sql: String,
    pub parameter: TableValuedParameter,
}

/// Compiles table-valued inserts against a catalog
#[derive(Clone)]
pub struct TableValuedCompiler {
    catalog: Arc<dyn Catalog>,
    options: CompilerOptions,
}

impl TableValuedCompiler {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            options: CompilerOptions::default(),
        }
    }

    /// Builder method: replace the rendering options
    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile a set-based insert of `write.rows` into `write.entity`
    ///
    /// The parameter is shaped like every entity column in declared order;
    /// generated columns travel in the parameter but are never inserted.
    #[instrument(skip(self, write), fields(entity = %write.entity, rows = write.rows.len()))]
    pub fn compile_insert(&self, write: &TableValuedWrite) -> CompileResult<TableValuedScript> {
        let entity = self.catalog.entity(&write.entity)?;
        let name = match &write.parameter_name {
            Some(name) => format!("@{}", name.trim_start_matches('@')),
            None => self.options.dialect.table_parameter(&entity.name),
        };
        let parameter = TableValuedParameter {
            rows: project_rows(&entity, &write.rows)?,
            columns: entity.columns.clone(),
            name,
        };

        let insertable: Vec<&str> = entity
            .insertable_columns()
            .map(|column| column.name.as_str())
            .collect();
        if insertable.is_empty() {
            return Err(SpecificationError::NoInsertableColumns {
                entity: entity.name.clone(),
            }
            .into());
        }

        if !entity.has_generated_columns() {
            if write.select_results || !write.output.is_empty() {
                debug!("No generated columns to capture, emitting a plain insert");
            }
            let sql = self.insert_statement(&entity, &insertable, None, &parameter.name);
            return Ok(TableValuedScript { sql, parameter });
        }

        let entity = self.catalog.keyed_entity(&entity.name)?;

        let mut captured: Vec<&ColumnDefinition> = if write.output.is_empty() {
            entity.columns.iter().collect()
        } else {
            write
                .output
                .iter()
                .map(|name| entity_column(&entity, name))
                .collect::<Result<_, _>>()?
        };

        if write.select_results {
            if write.correlate_on.is_empty() {
                return Err(SpecificationError::MissingCorrelationKey {
                    entity: entity.name.clone(),
                }
                .into());
            }
            for key in &write.correlate_on {
                let column = entity_column(&entity, key)?;
                if column.generated {
                    return Err(SpecificationError::GeneratedCorrelationKey {
                        entity: entity.name.clone(),
                        column: column.name.clone(),
                    }
                    .into());
                }
                if !captured.iter().any(|c| c.name == column.name) {
                    captured.push(column);
                }
            }
        }

        let quote = |name: &str| self.options.quote(name);
        let inserted = format!("@{}", self.options.inserted_table);
        let declared = captured
            .iter()
            .map(|column| format!("{} {}", quote(&column.name), column.data_type.sql_type()))
            .collect::<Vec<_>>();
        let mut statements = vec![format!(
            "DECLARE {} TABLE ({});",
            inserted,
            declared.join(", ")
        )];

        let output = format!(
            "OUTPUT {} INTO {} ({})",
            captured
                .iter()
                .map(|column| format!("INSERTED.{}", quote(&column.name)))
                .collect::<Vec<_>>()
                .join(", "),
            inserted,
            captured
                .iter()
                .map(|column| quote(&column.name))
                .collect::<Vec<_>>()
                .join(", ")
        );
        statements.push(self.insert_statement(
            &entity,
            &insertable,
            Some(output.as_str()),
            &parameter.name,
        ));

        if write.select_results {
            let inserted_alias = quote(&self.options.inserted_table);
            let tvp_alias = quote(&self.options.tvp_alias);
            let selected = captured
                .iter()
                .map(|column| format!("{}.{}", inserted_alias, quote(&column.name)))
                .collect::<Vec<_>>();
            let on = write
                .correlate_on
                .iter()
                .map(|key| {
                    format!(
                        "{}.{} = {}.{}",
                        inserted_alias,
                        quote(key),
                        tvp_alias,
                        quote(key)
                    )
                })
                .collect::<Vec<_>>();
            statements.push(format!(
                "SELECT {} FROM {} AS {} INNER JOIN {} AS {} ON {};",
                selected.join(", "),
                inserted,
                inserted_alias,
                parameter.name,
                tvp_alias,
                on.join(" AND ")
            ));
        }

        debug!(
            captured = captured.len(),
            select_results = write.select_results,
            "Compiled capturing insert"
        );
        Ok(TableValuedScript {
            sql: statements.join("\n"),
            parameter,
        })
    }

    /// Compile an insert into a dependent table from already-keyed rows
    ///
    /// Each mapping takes `source` from the input rows and inserts it as
    /// `target`. Rows missing any `required` source value are skipped.
    #[instrument(skip(self, write), fields(entity = %write.entity, rows = write.rows.len()))]
    pub fn compile_dependent(&self, write: &DependentWrite) -> CompileResult<TableValuedScript> {
        let entity = self.catalog.entity(&write.entity)?;
        if write.mappings.is_empty() {
            return Err(SpecificationError::NoInsertableColumns {
                entity: entity.name.clone(),
            }
            .into());
        }

        let mut targets = Vec::with_capacity(write.mappings.len());
        for mapping in &write.mappings {
            let column = entity_column(&entity, &mapping.target)?;
            if column.generated {
                return Err(SpecificationError::GeneratedColumnTarget {
                    entity: entity.name.clone(),
                    column: column.name.clone(),
                }
                .into());
            }
            targets.push(column);
        }

        let rows: Vec<Vec<Literal>> = write
            .rows
            .iter()
            .filter(|row| write.required.iter().all(|source| row.has_value(source)))
            .map(|row| {
                write
                    .mappings
                    .iter()
                    .map(|mapping| row.value(&mapping.source))
                    .collect()
            })
            .collect();
        if rows.len() < write.rows.len() {
            debug!(
                skipped = write.rows.len() - rows.len(),
                "Skipped rows without required values"
            );
        }

        let parameter = TableValuedParameter {
            name: self.options.dialect.table_parameter(&entity.name),
            columns: targets.iter().map(|column| (*column).clone()).collect(),
            rows,
        };
        let names: Vec<&str> = targets.iter().map(|column| column.name.as_str()).collect();
        let sql = self.insert_statement(&entity, &names, None, &parameter.name);
        Ok(TableValuedScript { sql, parameter })
    }

    /// `INSERT INTO <table> (<cols>)[ <output>] SELECT [tvp].<cols> FROM @P AS [tvp];`
    fn insert_statement(
        &self,
        entity: &EntityDefinition,
        columns: &[&str],
        output: Option<&str>,
        parameter: &str,
    ) -> String {
        let tvp_alias = self.options.quote(&self.options.tvp_alias);
        let target = columns
            .iter()
            .map(|column| self.options.quote(column))
            .collect::<Vec<_>>();
        let source = target
            .iter()
            .map(|column| format!("{}.{}", tvp_alias, column))
            .collect::<Vec<_>>();

        let mut sql = format!(
            "INSERT INTO {} ({})",
            self.options.table_name(entity),
            target.join(", ")
        );
        if let Some(output) = output {
            sql.push(' ');
            sql.push_str(output);
        }
        sql.push_str(&format!(
            " SELECT {} FROM {} AS {};",
            source.join(", "),
            parameter,
            tvp_alias
        ));
        sql
    }
}

fn entity_column<'a>(
    entity: &'a EntityDefinition,
    name: &str,
) -> Result<&'a ColumnDefinition, SpecificationError> {
    entity
        .column(name)
        .ok_or_else(|| SpecificationError::UnknownColumn {
            entity: entity.name.clone(),
            column: name.to_string(),
        })
}

/// Project rows into entity column order, absent values as NULL
fn project_rows(entity: &EntityDefinition, rows: &[Row]) -> CompileResult<Vec<Vec<Literal>>> {
    let known: HashSet<&str> = entity.columns.iter().map(|c| c.name.as_str()).collect();
    rows.iter()
        .map(|row| -> CompileResult<Vec<Literal>> {
            let mut unknown: Vec<&str> = row.columns().filter(|c| !known.contains(c)).collect();
            unknown.sort_unstable();
            if let Some(column) = unknown.first() {
                return Err(SpecificationError::RowShape {
                    entity: entity.name.clone(),
                    column: column.to_string(),
                }
                .into());
            }
            Ok(entity
                .columns
                .iter()
                .map(|column| row.value(&column.name))
                .collect())
        })
        .collect()
}
