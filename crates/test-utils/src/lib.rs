// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for setql
//!
//! This crate provides common testing components including:
//! - Fixture model types and a catalog holding all of them
//! - SQL-specific test helpers and assertions

pub mod assertions;
pub mod fixtures;

// Re-exports for convenience
pub use assertions::SqlAssertions;
pub use fixtures::{
    Account, Person, PersonDate, Related, Root, SubData, Tag, fixture_catalog,
};
