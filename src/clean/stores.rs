use tracing::{info, instrument};

use crate::clean::{coerce_date, log_dropped};
use crate::common::constants::STORES_ENTITY;
use crate::common::error::{EtlError, Result};
use crate::common::table::{Cell, RecordSet};

/// Clean store details assembled from the paginated API: drop the synthetic
/// index/location columns, reject rows with over-long country codes, fix
/// the continent aliases and keep only the digits of `staff_numbers`.
#[instrument(skip(records), fields(rows_in = records.len()))]
pub fn clean_stores(mut records: RecordSet) -> Result<RecordSet> {
    if records.is_empty() {
        return Err(EtlError::EmptyResult(STORES_ENTITY));
    }

    records.drop_columns(&["index", "lat"]);
    records.null_to_missing();

    // An over-long or absent country code marks a corrupted row
    let country_code = records.require_column("country_code")?;
    let before = records.len();
    records.retain_rows(|row| {
        row[country_code]
            .as_text()
            .is_some_and(|s| s.len() <= 3)
    });
    log_dropped(STORES_ENTITY, before, records.len(), "bad country_code");

    records.map_column("opening_date", coerce_date)?;

    records.map_column("continent", |cell| match cell.as_text() {
        Some("eeAmerica") => Cell::Text("America".to_string()),
        Some("eeEurope") => Cell::Text("Europe".to_string()),
        _ => cell.clone(),
    })?;

    records.map_column("staff_numbers", |cell| match cell {
        Cell::Text(s) => Cell::Text(s.chars().filter(|c| c.is_ascii_digit()).collect()),
        other => other.clone(),
    })?;

    info!(rows_out = records.len(), "store data cleaned");
    Ok(records)
}
