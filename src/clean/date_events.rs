use tracing::{info, instrument};

use crate::clean::{calendar, log_dropped};
use crate::common::constants::DATE_EVENTS_ENTITY;
use crate::common::error::{EtlError, Result};
use crate::common::table::{Cell, RecordSet};

/// Clean the date/time events feed: reject garbage `month` text up front,
/// then convert `timestamp`, `year`, `month` and `day` into typed calendar
/// components and drop rows where any conversion failed.
#[instrument(skip(records), fields(rows_in = records.len()))]
pub fn clean_date_events(mut records: RecordSet) -> Result<RecordSet> {
    if records.is_empty() {
        return Err(EtlError::EmptyResult(DATE_EVENTS_ENTITY));
    }

    records.null_to_missing();

    // Length guard on raw month text before any parsing
    let month = records.require_column("month")?;
    let before = records.len();
    records.retain_rows(|row| match &row[month] {
        Cell::Text(s) => s.len() <= 3,
        Cell::Int(_) => true,
        _ => false,
    });
    log_dropped(DATE_EVENTS_ENTITY, before, records.len(), "month text too long");

    records.map_column("timestamp", |cell| match cell {
        Cell::Text(s) => calendar::parse_timestamp(s)
            .map(Cell::Time)
            .unwrap_or(Cell::Missing),
        other => other.clone(),
    })?;
    records.map_column("year", |cell| coerce_component(cell, calendar::parse_year))?;
    records.map_column("month", |cell| coerce_component(cell, calendar::parse_month))?;
    records.map_column("day", |cell| coerce_component(cell, calendar::parse_day))?;

    let required: Vec<usize> = ["timestamp", "year", "month", "day"]
        .iter()
        .map(|name| records.require_column(name))
        .collect::<Result<_>>()?;
    let before = records.len();
    records.retain_rows(|row| required.iter().all(|&idx| !row[idx].is_missing()));
    log_dropped(DATE_EVENTS_ENTITY, before, records.len(), "invalid calendar field");

    info!(rows_out = records.len(), "date events cleaned");
    Ok(records)
}

fn coerce_component(cell: &Cell, parse: fn(&str) -> Option<i64>) -> Cell {
    match cell {
        Cell::Text(s) => parse(s).map(Cell::Int).unwrap_or(Cell::Missing),
        other => other.clone(),
    }
}
