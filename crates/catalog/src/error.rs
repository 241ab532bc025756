// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! Metadata errors are fatal: a definition that fails validation never enters
//! the catalog, and nothing in this layer is retried.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur while resolving entity metadata
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum MetadataError {
    /// Requested entity was never registered
    #[error("Entity '{0}' is not registered")]
    UnknownEntity(String),

    /// An identifier in the definition is empty
    #[error("Entity '{entity}' has an empty {what}")]
    EmptyIdentifier { entity: String, what: String },

    /// Two columns share a name
    #[error("Entity '{entity}' declares column '{column}' more than once")]
    DuplicateColumn { entity: String, column: String },

    /// Two relations share a navigation name
    #[error("Entity '{entity}' declares navigation '{navigation}' more than once")]
    DuplicateRelation { entity: String, navigation: String },

    /// A key or relation refers to a column the entity does not declare
    #[error("Entity '{entity}' has no column '{column}'")]
    UnknownColumn { entity: String, column: String },

    /// An operation needs a primary key the entity does not declare
    #[error("Entity '{0}' has no primary key")]
    MissingPrimaryKey(String),

    /// `Entity::NAME` disagrees with the name of the built definition
    #[error("Entity type declares name '{declared}' but its definition is named '{defined}'")]
    NameMismatch { declared: String, defined: String },
}
