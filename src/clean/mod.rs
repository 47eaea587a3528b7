//! Source-specific cleaning passes. Each entity cleaner consumes a raw
//! `RecordSet` by value and returns the cleaned set, or `EmptyResult` when
//! there is nothing to clean. Malformed rows are dropped and counted, never
//! raised.

pub mod calendar;
pub mod cards;
pub mod date_events;
pub mod orders;
pub mod products;
pub mod stores;
pub mod users;
pub mod weight;

use crate::common::table::{Cell, RecordSet};

/// Coerce a text cell to a lenient date; already-typed cells pass through so
/// a second cleaning pass is a no-op.
pub(crate) fn coerce_date(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(s) => calendar::parse_date_lenient(s)
            .map(Cell::Date)
            .unwrap_or(Cell::Missing),
        other => other.clone(),
    }
}

/// Drop every row with at least one missing cell.
pub(crate) fn drop_rows_with_missing(records: &mut RecordSet) {
    records.retain_rows(|row| row.iter().all(|cell| !cell.is_missing()));
}

/// Rows dropped by a cleaning step, for per-entity accounting.
pub(crate) fn log_dropped(entity: &str, before: usize, after: usize, rule: &str) {
    if after < before {
        tracing::debug!(entity, rule, dropped = before - after, "rows dropped");
    }
}
