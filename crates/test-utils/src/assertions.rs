// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL-specific test helpers and custom assertions

/// Custom assertion helpers for SQL testing
pub struct SqlAssertions;

impl SqlAssertions {
    /// Positional parameter indices (`@0`, `@12`, ...) in textual order
    ///
    /// Named parameters such as `@PersonTable` are ignored.
    pub fn placeholder_indices(sql: &str) -> Vec<usize> {
        let bytes = sql.as_bytes();
        let mut indices = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'@' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    if let Ok(index) = sql[start..end].parse() {
                        indices.push(index);
                    }
                }
                i = end;
            } else {
                i += 1;
            }
        }
        indices
    }

    /// Assert that placeholders first appear in order `@0..@count-1` with
    /// none beyond
    pub fn assert_sequential_parameters(sql: &str, count: usize) {
        let mut first_seen = Vec::new();
        for index in Self::placeholder_indices(sql) {
            if !first_seen.contains(&index) {
                first_seen.push(index);
            }
        }
        let expected: Vec<usize> = (0..count).collect();
        assert_eq!(
            first_seen, expected,
            "Expected parameters @0..@{} in order in: {}",
            count, sql
        );
    }

    /// Assert that `fragments` occur in `sql` in the given order
    pub fn assert_in_order(sql: &str, fragments: &[&str]) {
        let mut from = 0;
        for fragment in fragments {
            match sql[from..].find(fragment) {
                Some(offset) => from += offset + fragment.len(),
                None => panic!(
                    "Expected '{}' after position {} in: {}",
                    fragment, from, sql
                ),
            }
        }
    }

    /// Assert that `fragment` occurs exactly `times` times in `sql`
    pub fn assert_occurrences(sql: &str, fragment: &str, times: usize) {
        assert_eq!(
            sql.matches(fragment).count(),
            times,
            "Expected '{}' {} time(s) in: {}",
            fragment,
            times,
            sql
        );
    }
}
