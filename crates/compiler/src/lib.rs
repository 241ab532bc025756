// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # setql - Compilers
//!
//! This crate turns specifications into SQL Server text:
//!
//! - **Statement compiler** ([`StatementCompiler`]): select, count, exists,
//!   delete and union statements with positional parameters, including
//!   CTE-based paging
//! - **Table-valued write compiler** ([`TableValuedCompiler`]): set-based
//!   inserts through a table-valued parameter, generated-value capture,
//!   correlated re-select and dependent-table inserts
//!
//! Both compilers are pure functions of their inputs plus the catalog. They
//! hold no mutable state and may be shared across threads.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use setql_catalog::EntityCatalog;
//! use setql_compiler::StatementCompiler;
//! use setql_ir::QuerySpec;
//!
//! let catalog = Arc::new(EntityCatalog::with_definitions(definitions)?);
//! let compiler = StatementCompiler::new(catalog);
//!
//! let compiled = compiler.compile(
//!     &QuerySpec::new("Root").join("Related").where_eq("Id", 4).take(10),
//! )?;
//! println!("{} {:?}", compiled.sql, compiled.parameters);
//! ```

pub mod config;
pub mod correlate;
pub mod error;
mod params;
mod resolve;
pub mod statement;
pub mod tvp;

// Re-exports
pub use config::CompilerOptions;
pub use correlate::correlate_results;
pub use error::{CompileError, CompileResult, SpecificationError};
pub use statement::{CompiledStatement, StatementCompiler};
pub use tvp::{TableValuedCompiler, TableValuedParameter, TableValuedScript};
