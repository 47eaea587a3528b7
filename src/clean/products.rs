use tracing::{info, instrument};

use crate::clean::{coerce_date, log_dropped, weight};
use crate::common::constants::PRODUCTS_ENTITY;
use crate::common::error::{EtlError, Result};
use crate::common::table::{Cell, RecordSet};

/// Longest legitimate price text, currency symbol included (e.g. "£999.99").
const MAX_PRICE_LEN: usize = 7;

/// Clean the product catalogue CSV: drop the unnamed leading index column,
/// convert free-text weights to kilograms, validate prices and type the
/// `date_added` column. Only rows empty across *all* fields are treated as
/// placeholders and removed wholesale.
#[instrument(skip(records), fields(rows_in = records.len()))]
pub fn clean_products(mut records: RecordSet) -> Result<RecordSet> {
    if records.is_empty() {
        return Err(EtlError::EmptyResult(PRODUCTS_ENTITY));
    }

    // The CSV export carries its old index as an unnamed leading column
    if records.columns().first().is_some_and(|c| c.is_empty() || c == "Unnamed: 0") {
        records.drop_column_at(0);
    }
    records.null_to_missing();

    let before = records.len();
    records.retain_rows(|row| row.iter().any(|cell| !cell.is_missing()));
    log_dropped(PRODUCTS_ENTITY, before, records.len(), "entirely empty row");

    // Weights to kilograms; unparseable weights mark the row for removal
    records.map_column("weight", |cell| match cell {
        Cell::Text(s) => weight::to_kilograms(s)
            .map(Cell::Float)
            .unwrap_or(Cell::Missing),
        other => other.clone(),
    })?;
    let weight_idx = records.require_column("weight")?;
    let before = records.len();
    records.retain_rows(|row| !row[weight_idx].is_missing());
    log_dropped(PRODUCTS_ENTITY, before, records.len(), "unparseable weight");

    records.map_column("product_price", |cell| match cell {
        Cell::Text(s) => Cell::Text(s.trim().to_string()),
        other => other.clone(),
    })?;
    let price = records.require_column("product_price")?;
    let before = records.len();
    records.retain_rows(|row| {
        // character count, not bytes: the currency symbol is multi-byte
        row[price]
            .as_text()
            .is_some_and(|s| s.chars().count() <= MAX_PRICE_LEN)
    });
    log_dropped(PRODUCTS_ENTITY, before, records.len(), "price text too long");

    records.map_column("date_added", coerce_date)?;

    info!(rows_out = records.len(), "product data cleaned");
    Ok(records)
}
