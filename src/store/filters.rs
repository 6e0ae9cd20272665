//! Equality filtering over row maps.
//!
//! Filters match strictly: every filter key's value must equal the stored
//! value when both are compared in wire-string form. Equality only, no range
//! operators, case-sensitive, type-blind string comparison. A missing field
//! never matches.

use super::Row;

/// Checks if a row matches all filters (AND semantics).
pub fn matches(row: &Row, filters: &Row) -> bool {
    filters.iter().all(|(name, expected)| {
        row.get(name)
            .map(|actual| actual.to_wire() == expected.to_wire())
            .unwrap_or(false)
    })
}
