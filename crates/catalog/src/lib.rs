// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # setql - Catalog Layer
//!
//! This crate resolves model types into entity definitions for the compilers.
//! It defines the [`Catalog`] trait and the [`EntityCatalog`] registry used
//! for:
//!
//! - **Registration**: definitions supplied by model types through
//!   [`Entity`](setql_ir::Entity) or loaded from a model document
//! - **Validation**: identifiers, primary keys and relation columns are
//!   checked once, when a definition first enters the catalog
//! - **Caching**: every definition is resolved once per process and shared
//!   behind an `Arc` afterwards
//!
//! ## Usage
//!
//! ```rust,ignore
//! use setql_catalog::{Catalog, EntityCatalog};
//!
//! let catalog = EntityCatalog::new();
//! let person = catalog.resolve::<Person>()?;
//! catalog.register(address_definition)?;
//!
//! let address = catalog.entity("Address")?;
//! ```
//!
//! ## Concurrency
//!
//! Registration is first-write-wins. Concurrent resolution of the same type
//! may build the definition twice, but only the first result is kept and
//! every caller receives that one.

pub mod error;
pub mod metadata;
pub mod registry;
pub mod r#trait;

// Re-exports
pub use error::{MetadataError, MetadataResult};
pub use metadata::{ColumnDefinition, DataType, Entity, EntityDefinition, RelationDefinition};
pub use registry::EntityCatalog;
pub use r#trait::Catalog;
