// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Support
//!
//! This module defines the SQL dialect targeted by the compilers and the
//! identifier qualifier used to render schema-qualified, possibly aliased
//! names.
//!
//! ## Quoting
//!
//! Database identifiers are always bracketed, whether or not they contain a
//! space or collide with a reserved word. A closing bracket inside an
//! identifier is doubled:
//!
//! ```text
//! Name        -> [Name]
//! Order Lines -> [Order Lines]
//! odd]name    -> [odd]]name]
//! ```
//!
//! ## Qualification
//!
//! Multi-part names are composed from individually quoted parts:
//!
//! ```text
//! (dbo, Customer)          -> [dbo].[Customer]
//! (dbo, Customer, Name)    -> [dbo].[Customer].[Name]
//! (Billing, Street)        -> [Billing].[Street]
//! ```
//!
//! Empty identifiers are rejected before they reach this module (catalog
//! registration and path validation), so quoting itself cannot fail.

use serde::{Deserialize, Serialize};

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Dialect {
    /// Microsoft SQL Server (table-valued parameters, `OUTPUT`, `OFFSET ... FETCH`)
    #[default]
    SqlServer,
}

impl Dialect {
    /// Quote a single identifier
    pub fn quote(&self, identifier: &str) -> String {
        match self {
            Dialect::SqlServer => format!("[{}]", identifier.replace(']', "]]")),
        }
    }

    /// Quote and join identifier parts with `.`
    pub fn qualify<S: AsRef<str>>(&self, parts: &[S]) -> String {
        parts
            .iter()
            .map(|part| self.quote(part.as_ref()))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Positional parameter placeholder for a 0-based index
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::SqlServer => format!("@{}", index),
        }
    }

    /// Name of the table-valued parameter carrying rows for `entity`
    pub fn table_parameter(&self, entity: &str) -> String {
        match self {
            Dialect::SqlServer => format!("@{}Table", entity),
        }
    }
}

/// Quote an identifier for the default dialect
pub fn quote_identifier(identifier: &str) -> String {
    Dialect::default().quote(identifier)
}

/// Qualify identifier parts for the default dialect
pub fn qualify<S: AsRef<str>>(parts: &[S]) -> String {
    Dialect::default().qualify(parts)
}
