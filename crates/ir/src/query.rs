// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query Specification
//!
//! This module represents a query as an immutable value built through a chain
//! of order-preserving operations.
//!
//! ## Structure
//!
//! A [`QuerySpec`] consists of:
//!
//! - **Entity**: the root entity the statement reads from (or deletes from)
//! - **Projection**: explicit columns, or empty for the default projection
//! - **Joins**: navigation paths with their join kind, in declaration order
//! - **Predicates**: WHERE terms, conjoined in declaration order
//! - **Ordering**: sort clauses in declaration order
//! - **Paging**: optional skip/take pair
//! - **Union**: optional chained specification
//! - **Kind**: select, count, exists or delete
//!
//! ## Builder Semantics
//!
//! Every builder method consumes the specification and returns a new one.
//! List concerns (projection, joins, predicates, ordering) append in call
//! order. Scalar concerns (skip, take, statement kind) are last-write-wins.
//!
//! ```rust,ignore
//! let spec = QuerySpec::new("Root")
//!     .join("Related")
//!     .left_join("SubData")
//!     .where_eq("Id", 4)
//!     .where_eq("Related.Name", "Jo%")
//!     .order_by("Related.Name")
//!     .skip(20)
//!     .take(10);
//! ```
//!
//! ## Unions
//!
//! `a.union(b)` links `b` after every branch already chained onto `a`, so
//! `a.union(b.union(c))` and `a.union(b).union(c)` both describe the branch
//! sequence `a, b, c`. [`QuerySpec::branches`] flattens the chain in that
//! order.

use serde::{Deserialize, Serialize};

use crate::expr::{ColumnPath, Condition, Literal, Predicate};
use crate::metadata::Entity;

/// Terminal statement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatementKind {
    #[default]
    Select,
    Count,
    Exists,
    Delete,
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
}

impl JoinType {
    /// Returns the SQL keyword for this join type
    pub const fn sql_keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

/// Join along a navigation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinClause {
    /// Navigation names from the root entity
    pub path: Vec<String>,
    #[serde(default)]
    pub join_type: JoinType,
}

impl JoinClause {
    /// Parse a dotted navigation path (`"Related.Owner"`)
    pub fn new(path: &str, join_type: JoinType) -> Self {
        Self {
            path: path.split('.').map(str::to_string).collect(),
            join_type,
        }
    }

    /// Dotted form of the navigation path
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn sql_keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: ColumnPath,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Skip/take pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paging {
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

/// Immutable query specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Root entity name
    pub entity: String,

    /// Explicit projection; empty means the default projection
    #[serde(default)]
    pub columns: Vec<ColumnPath>,

    /// Joins in declaration order
    #[serde(default)]
    pub joins: Vec<JoinClause>,

    /// WHERE terms in declaration order
    #[serde(default)]
    pub predicates: Vec<Predicate>,

    /// ORDER BY terms in declaration order
    #[serde(default)]
    pub order_by: Vec<OrderBy>,

    /// Optional paging
    #[serde(default)]
    pub paging: Option<Paging>,

    /// Next branch of a UNION chain
    #[serde(default)]
    pub union: Option<Box<QuerySpec>>,

    /// Terminal statement kind
    #[serde(default)]
    pub kind: StatementKind,
}

impl QuerySpec {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            columns: Vec::new(),
            joins: Vec::new(),
            predicates: Vec::new(),
            order_by: Vec::new(),
            paging: None,
            union: None,
            kind: StatementKind::Select,
        }
    }

    /// Specification rooted at a model type
    pub fn of<T: Entity>() -> Self {
        Self::new(T::NAME)
    }

    /// Append a projected column
    pub fn select(mut self, column: impl Into<ColumnPath>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Append an INNER JOIN along a dotted navigation path
    pub fn join(mut self, path: &str) -> Self {
        self.joins.push(JoinClause::new(path, JoinType::Inner));
        self
    }

    /// Append a LEFT JOIN along a dotted navigation path
    pub fn left_join(mut self, path: &str) -> Self {
        self.joins.push(JoinClause::new(path, JoinType::Left));
        self
    }

    /// Append a predicate
    pub fn filter(mut self, column: impl Into<ColumnPath>, condition: Condition) -> Self {
        self.predicates.push(Predicate::new(column, condition));
        self
    }

    pub fn where_eq(self, column: impl Into<ColumnPath>, value: impl Into<Literal>) -> Self {
        self.filter(column, Condition::Equal(value.into()))
    }

    pub fn where_between(
        self,
        column: impl Into<ColumnPath>,
        low: impl Into<Literal>,
        high: impl Into<Literal>,
    ) -> Self {
        self.filter(column, Condition::Between(low.into(), high.into()))
    }

    pub fn where_gte(self, column: impl Into<ColumnPath>, value: impl Into<Literal>) -> Self {
        self.filter(column, Condition::GreaterOrEqual(value.into()))
    }

    pub fn where_lte(self, column: impl Into<ColumnPath>, value: impl Into<Literal>) -> Self {
        self.filter(column, Condition::LessOrEqual(value.into()))
    }

    pub fn where_in<I, V>(self, column: impl Into<ColumnPath>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        self.filter(
            column,
            Condition::In(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn where_null(self, column: impl Into<ColumnPath>) -> Self {
        self.filter(column, Condition::IsNull)
    }

    /// Append an ascending sort
    pub fn order_by(self, column: impl Into<ColumnPath>) -> Self {
        self.order(column, SortDirection::Asc)
    }

    /// Append a descending sort
    pub fn order_by_desc(self, column: impl Into<ColumnPath>) -> Self {
        self.order(column, SortDirection::Desc)
    }

    pub fn order(mut self, column: impl Into<ColumnPath>, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.paging.get_or_insert_with(Paging::default).skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.paging.get_or_insert_with(Paging::default).take = Some(take);
        self
    }

    /// Chain `other` after the last branch of this specification
    pub fn union(mut self, other: QuerySpec) -> Self {
        self.union = Some(Box::new(match self.union.take() {
            Some(existing) => existing.union(other),
            None => other,
        }));
        self
    }

    pub fn count(self) -> Self {
        self.with_kind(StatementKind::Count)
    }

    pub fn exists(self) -> Self {
        self.with_kind(StatementKind::Exists)
    }

    pub fn delete(self) -> Self {
        self.with_kind(StatementKind::Delete)
    }

    pub fn with_kind(mut self, kind: StatementKind) -> Self {
        self.kind = kind;
        self
    }

    /// UNION branches in left-to-right declaration order, starting with `self`
    pub fn branches(&self) -> Vec<&QuerySpec> {
        let mut branches = Vec::new();
        let mut current = Some(self);
        while let Some(spec) = current {
            branches.push(spec);
            current = spec.union.as_deref();
        }
        branches
    }

    pub fn is_union(&self) -> bool {
        self.union.is_some()
    }
}
