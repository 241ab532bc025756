// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Merging captured insert results back into their input rows
//!
//! The correlated select of a capturing insert returns one row per inserted
//! row, carrying generated values next to the caller-known correlation keys.
//! [`correlate_results`] copies those values onto the original rows, which
//! then feed dependent writes:
//!
//! ```rust,ignore
//! let keyed = correlate_results(&people, &returned, &["Name".into()]);
//! let dates = DependentWrite::into_entity("PersonDate")
//!     .with_rows(keyed)
//!     .from("Id", "PersonId")
//!     .from("Born", "Value")
//!     .require("Born");
//! ```

use std::collections::HashMap;

use setql_ir::Row;

/// Key values compared by their unquoted text, so a value read back from a
/// driver as text still matches the typed value it was inserted as. A row
/// with a NULL key has no key, the same as the `=` join it mirrors.
fn correlation_key(row: &Row, keys: &[String]) -> Option<Vec<String>> {
    keys.iter().map(|key| row.value(key).key_text()).collect()
}

/// Merge `results` into `originals` by the `keys` columns
///
/// Every original row whose key values match a result row receives all of
/// that result row's columns, overwriting its own. Rows without a match are
/// returned unchanged, as are rows with a NULL key. Keys only need to be unique within the batch; when
/// they are not, the first matching result wins.
pub fn correlate_results(originals: &[Row], results: &[Row], keys: &[String]) -> Vec<Row> {
    let mut by_key: HashMap<Vec<String>, &Row> = HashMap::with_capacity(results.len());
    for result in results {
        if let Some(key) = correlation_key(result, keys) {
            by_key.entry(key).or_insert(result);
        }
    }

    originals
        .iter()
        .map(|original| {
            let mut merged = original.clone();
            let matched = correlation_key(original, keys).and_then(|key| by_key.get(&key));
            if let Some(result) = matched {
                for column in result.columns() {
                    merged.set(column, result.value(column));
                }
            }
            merged
        })
        .collect()
}
