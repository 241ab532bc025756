// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Error types for the compilers
//!
//! Both error kinds are fatal and detected before any statement text is
//! produced. Nothing in this crate performs I/O, so nothing is retried.

use serde::Serialize;
use setql_catalog::MetadataError;
use setql_ir::PathError;

/// Result type alias for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

/// The caller built a specification that cannot be compiled
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum SpecificationError {
    /// Navigation name not declared on the source entity
    #[error("Entity '{entity}' has no navigation '{navigation}'")]
    UnknownRelation { entity: String, navigation: String },

    /// Column or join refers to a navigation path that is not joined
    #[error("Relation '{path}' is referenced but not joined")]
    UnjoinedRelation { path: String },

    /// Same navigation path joined twice
    #[error("Relation '{path}' is joined more than once")]
    DuplicateJoin { path: String },

    /// Two table sources expose the same name, e.g. an alias equal to a
    /// table name already in scope
    #[error("Name '{alias}' is exposed by more than one table source")]
    DuplicateAlias { alias: String },

    /// Column not declared on the entity it is resolved against
    #[error("Entity '{entity}' has no column '{column}'")]
    UnknownColumn { entity: String, column: String },

    #[error(transparent)]
    MalformedPath(#[from] PathError),

    /// `IN` with no values
    #[error("IN predicate on '{column}' has no values")]
    EmptyInList { column: String },

    /// Skip/take on a UNION select
    #[error("Paging is not supported on a UNION select")]
    PagingInUnion,

    /// Correlated results requested without correlation key columns
    #[error("Correlated results for '{entity}' need at least one correlation key")]
    MissingCorrelationKey { entity: String },

    /// Dependent write maps a value onto a server-generated column
    #[error("Column '{column}' of '{entity}' is generated and cannot be inserted")]
    GeneratedColumnTarget { entity: String, column: String },

    /// Union arms of a count select different numbers of columns
    #[error("Union arms select {found} columns where {expected} were expected")]
    UnionShapeMismatch { expected: usize, found: usize },

    /// Correlation key is server-generated, so the parameter never carries it
    #[error("Correlation key '{column}' of '{entity}' is generated and has no input value")]
    GeneratedCorrelationKey { entity: String, column: String },

    /// Row carries a value for a column the target entity does not declare
    #[error("Row value '{column}' does not match any column of '{entity}'")]
    RowShape { entity: String, column: String },

    /// Nothing left to insert once generated columns are excluded
    #[error("Entity '{entity}' has no insertable columns")]
    NoInsertableColumns { entity: String },
}

/// Errors returned by the statement and table-valued write compilers
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum CompileError {
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Invalid specification: {0}")]
    Specification(#[from] SpecificationError),
}

impl From<PathError> for CompileError {
    fn from(err: PathError) -> Self {
        CompileError::Specification(err.into())
    }
}

impl CompileError {
    /// Whether the caller's specification (rather than metadata) is at fault
    pub fn is_specification_error(&self) -> bool {
        matches!(self, CompileError::Specification(_))
    }
}
