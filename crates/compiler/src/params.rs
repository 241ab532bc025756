// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Positional parameter allocation
//!
//! One [`ParameterList`] lives for the duration of a single compilation and
//! is threaded through every branch and stage, so indices keep increasing
//! across UNION branches and paging values follow the predicates.

use setql_ir::{Dialect, Literal};

#[derive(Debug, Default)]
pub(crate) struct ParameterList {
    dialect: Dialect,
    values: Vec<Literal>,
}

impl ParameterList {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            values: Vec::new(),
        }
    }

    /// Bind `value` to the next index and return its placeholder
    pub(crate) fn bind(&mut self, value: Literal) -> String {
        let placeholder = self.dialect.placeholder(self.values.len());
        self.values.push(value);
        placeholder
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn into_values(self) -> Vec<Literal> {
        self.values
    }
}
