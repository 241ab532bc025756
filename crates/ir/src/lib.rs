// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # setql - Query Specification Model
//!
//! This crate holds the vocabulary shared by every other setql crate:
//!
//! - **Metadata**: entity, column and relation definitions that describe how a
//!   model type maps onto a table ([`EntityDefinition`])
//! - **Query specifications**: the immutable, fluently built description of a
//!   query ([`QuerySpec`]) that the statement compiler turns into SQL text
//! - **Write specifications**: batches of in-memory rows destined for a
//!   set-based insert through a table-valued parameter ([`TableValuedWrite`])
//! - **Dialect**: identifier quoting and qualification ([`Dialect`])
//!
//! Nothing in this crate talks to a database or renders statements. It only
//! describes them.

pub mod dialect;
pub mod expr;
pub mod metadata;
pub mod query;
pub mod write;

// Re-export commonly used types
pub use dialect::{Dialect, qualify, quote_identifier};
pub use expr::{ColumnPath, Condition, Literal, PathError, Predicate};
pub use metadata::{ColumnDefinition, DataType, Entity, EntityDefinition, RelationDefinition};
pub use query::{JoinClause, JoinType, OrderBy, Paging, QuerySpec, SortDirection, StatementKind};
pub use write::{ColumnMapping, DependentWrite, Row, TableValuedWrite};
