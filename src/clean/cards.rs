use tracing::{info, instrument};

use crate::clean::{drop_rows_with_missing, log_dropped};
use crate::common::constants::CARDS_ENTITY;
use crate::common::error::{EtlError, Result};
use crate::common::table::{Cell, RecordSet};

/// Clean card details extracted from the remote statement document: drop
/// rows with missing fields, reject card numbers containing letters and
/// strip the `?` padding the document extraction leaves around numbers.
#[instrument(skip(records), fields(rows_in = records.len()))]
pub fn clean_cards(mut records: RecordSet) -> Result<RecordSet> {
    if records.is_empty() {
        return Err(EtlError::EmptyResult(CARDS_ENTITY));
    }

    records.null_to_missing();

    let before = records.len();
    drop_rows_with_missing(&mut records);
    log_dropped(CARDS_ENTITY, before, records.len(), "missing required field");

    // Card numbers sometimes arrive as numeric cells; compare as text
    records.map_column("card_number", |cell| match cell {
        Cell::Int(n) => Cell::Text(n.to_string()),
        other => other.clone(),
    })?;

    let card_number = records.require_column("card_number")?;
    let before = records.len();
    records.retain_rows(|row| {
        row[card_number]
            .as_text()
            .is_some_and(|s| !s.chars().any(|c| c.is_ascii_alphabetic()))
    });
    log_dropped(CARDS_ENTITY, before, records.len(), "letters in card_number");

    records.map_column("card_number", |cell| match cell {
        Cell::Text(s) => Cell::Text(s.trim_matches('?').to_string()),
        other => other.clone(),
    })?;

    info!(rows_out = records.len(), "card data cleaned");
    Ok(records)
}
