// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Table-valued write specifications
//!
//! A [`TableValuedWrite`] describes a set-based insert of a whole batch of
//! in-memory rows through a single table-valued parameter, optionally
//! capturing server-generated values and correlating them back to the rows
//! that produced them.
//!
//! A [`DependentWrite`] describes a follow-up insert into another table fed
//! from already-keyed rows (typically rows enriched with generated parent
//! keys) through an explicit column rename projection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::expr::Literal;
use crate::metadata::Entity;

/// Row shape: column name to value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: HashMap<String, Literal>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a column value
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Literal>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Literal> {
        self.values.get(column)
    }

    /// Value of `column`, NULL when absent
    pub fn value(&self, column: &str) -> Literal {
        self.values.get(column).cloned().unwrap_or(Literal::Null)
    }

    /// Whether `column` carries a non-NULL value
    pub fn has_value(&self, column: &str) -> bool {
        self.values.get(column).is_some_and(|v| !v.is_null())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Literal>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Set-based insert through a table-valued parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableValuedWrite {
    /// Target entity name
    pub entity: String,
    /// Rows to insert
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Columns captured through `OUTPUT`; empty captures every column
    #[serde(default)]
    pub output: Vec<String>,
    /// Columns joining captured rows back to the parameter rows
    #[serde(default)]
    pub correlate_on: Vec<String>,
    /// Return captured rows in the same round trip
    #[serde(default)]
    pub select_results: bool,
    /// Overrides the `@<Entity>Table` parameter name
    #[serde(default)]
    pub parameter_name: Option<String>,
}

impl TableValuedWrite {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            rows: Vec::new(),
            output: Vec::new(),
            correlate_on: Vec::new(),
            select_results: false,
            parameter_name: None,
        }
    }

    pub fn of<T: Entity>() -> Self {
        Self::new(T::NAME)
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn output<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn correlate_on<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.correlate_on = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn select_results(mut self) -> Self {
        self.select_results = true;
        self
    }

    pub fn parameter_name(mut self, name: impl Into<String>) -> Self {
        self.parameter_name = Some(name.into());
        self
    }
}

/// Rename of a source row column onto a target table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub target: String,
}

/// Insert into a dependent table from already-keyed rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentWrite {
    /// Target entity name
    pub entity: String,
    /// Source rows
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Column renames in target column order
    #[serde(default)]
    pub mappings: Vec<ColumnMapping>,
    /// Source columns that must carry a value for a row to be inserted
    #[serde(default)]
    pub required: Vec<String>,
}

impl DependentWrite {
    pub fn into_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            rows: Vec::new(),
            mappings: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn of<T: Entity>() -> Self {
        Self::into_entity(T::NAME)
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Take `source` from each row and insert it as `target`
    pub fn from(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.mappings.push(ColumnMapping {
            source: source.into(),
            target: target.into(),
        });
        self
    }

    /// Skip rows where `source` is absent or NULL
    pub fn require(mut self, source: impl Into<String>) -> Self {
        self.required.push(source.into());
        self
    }
}
