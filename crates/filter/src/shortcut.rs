//! Shortcut payload parsing
//!
//! Payloads are stored verbatim and may be stale, hand-edited or written by
//! another client version. Anything that cannot be read relaxes the filter
//! instead of failing the list.

use crate::predicate::Filter;
use memos_core::Shortcut;
use memos_core::logging::preview;
use serde_json::Value;

/// Parse a shortcut payload into its filters.
///
/// A payload that is not a JSON array yields no filters. Array elements that
/// are not valid filters are skipped.
pub fn parse_filters(payload: &str) -> Vec<Filter> {
    let elements = match serde_json::from_str::<Value>(payload) {
        Ok(Value::Array(elements)) => elements,
        Ok(_) => {
            tracing::debug!(payload = %preview(payload, 80), "shortcut payload is not an array, ignoring");
            return Vec::new();
        }
        Err(e) => {
            tracing::debug!(payload = %preview(payload, 80), error = %e, "unparsable shortcut payload, ignoring");
            return Vec::new();
        }
    };

    elements
        .into_iter()
        .enumerate()
        .filter_map(|(i, element)| match serde_json::from_value::<Filter>(element) {
            Ok(filter) => Some(filter),
            Err(e) => {
                tracing::debug!(index = i, error = %e, "skipping unreadable shortcut filter");
                None
            }
        })
        .collect()
}

/// Filters of `shortcut`, see [`parse_filters`].
pub fn shortcut_filters(shortcut: &Shortcut) -> Vec<Filter> {
    parse_filters(&shortcut.payload)
}
