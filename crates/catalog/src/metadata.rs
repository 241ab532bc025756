// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for entity mapping
//!
//! This module re-exports metadata types from the `setql-ir` crate.

// Re-export all metadata types from the ir crate
pub use setql_ir::{ColumnDefinition, DataType, Entity, EntityDefinition, RelationDefinition};
