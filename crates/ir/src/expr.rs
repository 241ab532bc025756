// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! Column paths, literal parameter values and predicates.
//!
//! ## Column Paths
//!
//! A [`ColumnPath`] names a column either on the root entity or on an entity
//! reached through a chain of navigation relations. Paths are written as
//! dotted literals, the last segment being the column:
//!
//! ```text
//! Id                 -> root column `Id`
//! Related.Name       -> column `Name` of the entity behind navigation `Related`
//! Related.Owner.Name -> two hops, then column `Name`
//! ```
//!
//! ## Predicates
//!
//! Each [`Predicate`] pairs a column path with a [`Condition`]. Conditions
//! bind positional parameters when compiled:
//!
//! | condition        | parameters |
//! |------------------|------------|
//! | `Equal`          | 1 (0 when the value is NULL) |
//! | `Between`        | 2 |
//! | `GreaterOrEqual` | 1 |
//! | `LessOrEqual`    | 1 |
//! | `In(k values)`   | k |
//! | `IsNull`         | 0 |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal parameter value
///
/// Decimal, date and uuid values are carried as text so they round-trip
/// exactly through the parameter list. Serialized untagged: documents spell
/// values as plain scalars, and text always reads back as [`Literal::String`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Decimal(String),
    Uuid(String),
    Date(String),
    DateTime(String),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Exact decimal from its textual representation
    pub fn decimal(value: impl Into<String>) -> Self {
        Literal::Decimal(value.into())
    }

    /// Raw value text without SQL quoting, `None` for NULL
    ///
    /// `Integer(7)` and `String("7")` share the key text `7`, as do
    /// `Decimal("1.50")` and `String("1.50")`.
    pub fn key_text(&self) -> Option<String> {
        match self {
            Literal::Null => None,
            Literal::Boolean(value) => Some(if *value { "1" } else { "0" }.to_string()),
            Literal::Integer(value) => Some(value.to_string()),
            Literal::Float(value) => Some(value.to_string()),
            Literal::String(value)
            | Literal::Decimal(value)
            | Literal::Uuid(value)
            | Literal::Date(value)
            | Literal::DateTime(value) => Some(value.clone()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(value) => write!(f, "{}", if *value { 1 } else { 0 }),
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Float(value) => write!(f, "{}", value),
            Literal::Decimal(value) => write!(f, "{}", value),
            Literal::String(value)
            | Literal::Uuid(value)
            | Literal::Date(value)
            | Literal::DateTime(value) => write!(f, "'{}'", value.replace('\'', "''")),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Integer(value.into())
    }
}

impl From<u32> for Literal {
    fn from(value: u32) -> Self {
        Literal::Integer(value.into())
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Literal::Null, Into::into)
    }
}

/// Malformed column path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[error("Malformed column path '{0}': every segment must be non-empty")]
pub struct PathError(pub String);

/// Column reached from the root entity through zero or more navigations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ColumnPath {
    /// Navigation names from the root entity; empty for root columns
    pub relation: Vec<String>,
    /// Column name on the entity at the end of `relation`
    pub column: String,
}

impl ColumnPath {
    /// Column on the root entity
    pub fn root(column: impl Into<String>) -> Self {
        Self {
            relation: Vec::new(),
            column: column.into(),
        }
    }

    /// Parse a dotted path, rejecting empty segments
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let parsed = Self::from(path);
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check that every segment is non-empty
    pub fn validate(&self) -> Result<(), PathError> {
        if self.column.is_empty() || self.relation.iter().any(String::is_empty) {
            return Err(PathError(self.to_string()));
        }
        Ok(())
    }

    pub fn is_root(&self) -> bool {
        self.relation.is_empty()
    }
}

impl From<&str> for ColumnPath {
    fn from(path: &str) -> Self {
        let mut segments: Vec<String> = path.split('.').map(str::to_string).collect();
        // split always yields at least one segment
        let column = segments.pop().unwrap_or_default();
        Self {
            relation: segments,
            column,
        }
    }
}

impl From<String> for ColumnPath {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl From<ColumnPath> for String {
    fn from(path: ColumnPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for navigation in &self.relation {
            write!(f, "{}.", navigation)?;
        }
        write!(f, "{}", self.column)
    }
}

/// Filter condition applied to a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Equal(Literal),
    Between(Literal, Literal),
    GreaterOrEqual(Literal),
    LessOrEqual(Literal),
    In(Vec<Literal>),
    IsNull,
}

impl Condition {
    /// Number of positional parameters this condition binds
    pub fn parameter_count(&self) -> usize {
        match self {
            Condition::Equal(value) if value.is_null() => 0,
            Condition::Equal(_) | Condition::GreaterOrEqual(_) | Condition::LessOrEqual(_) => 1,
            Condition::Between(_, _) => 2,
            Condition::In(values) => values.len(),
            Condition::IsNull => 0,
        }
    }
}

/// A single WHERE clause term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: ColumnPath,
    pub condition: Condition,
}

impl Predicate {
    pub fn new(column: impl Into<ColumnPath>, condition: Condition) -> Self {
        Self {
            column: column.into(),
            condition,
        }
    }
}
