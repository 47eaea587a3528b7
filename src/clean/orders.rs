use tracing::{info, instrument};

use crate::common::constants::ORDERS_ENTITY;
use crate::common::error::{EtlError, Result};
use crate::common::table::RecordSet;

/// Clean the orders fact table. Orders only need their personal-identifier
/// and redundant index columns removed; there is no row-level filtering.
#[instrument(skip(records), fields(rows_in = records.len()))]
pub fn clean_orders(mut records: RecordSet) -> Result<RecordSet> {
    if records.is_empty() {
        return Err(EtlError::EmptyResult(ORDERS_ENTITY));
    }

    records.drop_columns(&["level_0", "first_name", "last_name", "1"]);
    // The remaining unnamed leading column is the source export's row index
    if records.columns().first().is_some_and(|c| c.is_empty() || c == "index") {
        records.drop_column_at(0);
    }

    info!(rows_out = records.len(), "order data cleaned");
    Ok(records)
}
