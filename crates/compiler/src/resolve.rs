// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Join Graph Resolution
//!
//! Turns the joins of one specification branch into a resolved graph: every
//! navigation path is looked up against its source entity, its target
//! definition is fetched from the catalog and it is assigned the identifier
//! that qualifies its columns.
//!
//! ## Aliasing
//!
//! Aliases belong to edges, not entity types. Walking the joins in declaration
//! order, the first edge that reaches a target type keeps the type's
//! schema-qualified table name; every later edge to the same type is aliased
//! with its navigation name. The root entity counts as already reached, so a
//! self-referencing navigation is always aliased.
//!
//! ```text
//! Root -> Related (Related)        INNER JOIN [dbo].[Related] ON ...
//! Root -> Backup  (Related)        INNER JOIN [dbo].[Related] AS [Backup] ON ...
//! ```
//!
//! Every table source exposes one name to the rest of the statement: the
//! unqualified table name when unaliased, otherwise the alias. Exposed names
//! compare case-insensitively and must be unique across the root and all
//! joins, so an alias that matches a table name already in scope is rejected
//! with [`SpecificationError::DuplicateAlias`].
//!
//! ## Transitive joins
//!
//! A join along `A.B` requires `A` to be joined earlier in declaration order.
//! Joins are never reordered.

use std::collections::HashSet;
use std::sync::Arc;

use setql_catalog::{Catalog, ColumnDefinition, EntityDefinition};
use setql_ir::{ColumnPath, JoinClause, JoinType, PathError};

use crate::config::CompilerOptions;
use crate::error::{CompileResult, SpecificationError};

/// One joined edge of the graph
#[derive(Debug)]
pub(crate) struct ResolvedJoin {
    pub path: Vec<String>,
    pub join_type: JoinType,
    pub entity: Arc<EntityDefinition>,
    /// Quoted schema-qualified table name
    pub table: String,
    /// Navigation name when this edge is not the first to its target type
    pub alias: Option<String>,
    /// Identifier qualifying this edge's columns
    pub qualifier: String,
    /// Rendered `ON` condition
    pub condition: String,
}

impl ResolvedJoin {
    /// Unaliased LEFT join onto a single-column entity surfaces its column
    /// under its plain name
    fn surfaces_plain_column(&self) -> bool {
        self.join_type == JoinType::Left && self.alias.is_none() && self.entity.columns.len() == 1
    }

    fn render(&self, options: &CompilerOptions) -> String {
        match &self.alias {
            Some(alias) => format!(
                "{} {} AS {} ON {}",
                self.join_type.sql_keyword(),
                self.table,
                options.quote(alias),
                self.condition
            ),
            None => format!(
                "{} {} ON {}",
                self.join_type.sql_keyword(),
                self.table,
                self.condition
            ),
        }
    }
}

/// Column resolved against the graph
#[derive(Debug)]
pub(crate) struct ResolvedColumn<'a> {
    pub definition: &'a ColumnDefinition,
    /// Qualified reference, e.g. `[dbo].[Root].[Id]` or `[Backup].[Name]`
    pub reference: String,
    /// Projection label for relation-owned columns
    pub label: Option<String>,
}

impl ResolvedColumn<'_> {
    pub fn projected(&self) -> String {
        match &self.label {
            Some(label) => format!("{} AS {}", self.reference, label),
            None => self.reference.clone(),
        }
    }
}

/// Root entity plus resolved joins of one specification branch
#[derive(Debug)]
pub(crate) struct JoinGraph<'o> {
    options: &'o CompilerOptions,
    pub root: Arc<EntityDefinition>,
    pub root_table: String,
    pub joins: Vec<ResolvedJoin>,
}

impl<'o> JoinGraph<'o> {
    pub fn resolve(
        catalog: &dyn Catalog,
        options: &'o CompilerOptions,
        entity: &str,
        joins: &[JoinClause],
    ) -> CompileResult<Self> {
        let root = catalog.entity(entity)?;
        let root_table = options.table_name(&root);

        let mut graph = Self {
            options,
            root,
            root_table,
            joins: Vec::with_capacity(joins.len()),
        };

        let mut reached: HashSet<String> = HashSet::from([graph.root.name.clone()]);
        let mut exposed: HashSet<String> = HashSet::from([graph.root.table.to_lowercase()]);

        for clause in joins {
            if clause.path.iter().any(String::is_empty) {
                return Err(PathError(clause.dotted()).into());
            }
            if graph.find_join(&clause.path).is_some() {
                return Err(SpecificationError::DuplicateJoin {
                    path: clause.dotted(),
                }
                .into());
            }

            let (navigation, prefix) = match clause.path.split_last() {
                Some(split) => split,
                None => return Err(PathError(String::new()).into()),
            };

            let (source, source_qualifier) = if prefix.is_empty() {
                (graph.root.clone(), graph.root_table.clone())
            } else {
                let parent = graph.find_join(prefix).ok_or_else(|| {
                    SpecificationError::UnjoinedRelation {
                        path: prefix.join("."),
                    }
                })?;
                (parent.entity.clone(), parent.qualifier.clone())
            };

            let relation =
                source
                    .relation(navigation)
                    .ok_or_else(|| SpecificationError::UnknownRelation {
                        entity: source.name.clone(),
                        navigation: navigation.clone(),
                    })?;
            let target = catalog.entity(&relation.target)?;
            let table = options.table_name(&target);

            let alias = if reached.insert(target.name.clone()) {
                None
            } else {
                Some(navigation.clone())
            };
            let exposed_name = alias.as_deref().unwrap_or(&target.table);
            if !exposed.insert(exposed_name.to_lowercase()) {
                return Err(SpecificationError::DuplicateAlias {
                    alias: exposed_name.to_string(),
                }
                .into());
            }
            let qualifier = alias
                .as_deref()
                .map_or_else(|| table.clone(), |alias| options.quote(alias));

            let condition = format!(
                "{}.{} = {}.{}",
                source_qualifier,
                options.quote(&relation.left_column),
                qualifier,
                options.quote(&relation.right_column)
            );

            graph.joins.push(ResolvedJoin {
                path: clause.path.clone(),
                join_type: clause.join_type,
                entity: target,
                table,
                alias,
                qualifier,
                condition,
            });
        }

        Ok(graph)
    }

    fn find_join(&self, path: &[String]) -> Option<&ResolvedJoin> {
        self.joins.iter().find(|join| join.path == path)
    }

    /// `FROM <root>[ <joins>]`
    pub fn from_clause(&self) -> String {
        let mut clause = format!("FROM {}", self.root_table);
        for join in &self.joins {
            clause.push(' ');
            clause.push_str(&join.render(self.options));
        }
        clause
    }

    /// Resolve a column path to its qualified reference
    pub fn column(&self, path: &ColumnPath) -> CompileResult<ResolvedColumn<'_>> {
        path.validate()?;

        if path.is_root() {
            let definition = lookup_column(&self.root, &path.column)?;
            return Ok(ResolvedColumn {
                definition,
                reference: self.qualify(&self.root_table, &path.column),
                label: None,
            });
        }

        let join =
            self.find_join(&path.relation)
                .ok_or_else(|| SpecificationError::UnjoinedRelation {
                    path: path.relation.join("."),
                })?;
        let definition = lookup_column(&join.entity, &path.column)?;
        Ok(self.join_column(join, definition))
    }

    fn join_column<'a>(
        &self,
        join: &ResolvedJoin,
        definition: &'a ColumnDefinition,
    ) -> ResolvedColumn<'a> {
        let label = if join.surfaces_plain_column() {
            None
        } else {
            let dotted = format!("{}.{}", join.path.join("."), definition.name);
            Some(self.options.quote(&dotted))
        };
        ResolvedColumn {
            definition,
            reference: self.qualify(&join.qualifier, &definition.name),
            label,
        }
    }

    /// Projected column list
    ///
    /// An empty explicit list selects every joined relation's columns in join
    /// order, followed by the root's own columns.
    pub fn projection(&self, columns: &[ColumnPath]) -> CompileResult<Vec<String>> {
        if !columns.is_empty() {
            return columns
                .iter()
                .map(|path| self.column(path).map(|c| c.projected()))
                .collect();
        }

        let mut projected = Vec::new();
        for join in &self.joins {
            for definition in &join.entity.columns {
                projected.push(self.join_column(join, definition).projected());
            }
        }
        for definition in &self.root.columns {
            projected.push(self.qualify(&self.root_table, &definition.name));
        }
        Ok(projected)
    }

    /// Qualified references of the root primary key columns
    pub fn root_key(&self) -> Vec<String> {
        self.root
            .primary_key
            .iter()
            .map(|key| self.qualify(&self.root_table, key))
            .collect()
    }

    fn qualify(&self, qualifier: &str, column: &str) -> String {
        format!("{}.{}", qualifier, self.options.quote(column))
    }
}

fn lookup_column<'a>(
    entity: &'a EntityDefinition,
    column: &str,
) -> Result<&'a ColumnDefinition, SpecificationError> {
    entity
        .column(column)
        .ok_or_else(|| SpecificationError::UnknownColumn {
            entity: entity.name.clone(),
            column: column.to_string(),
        })
}
