use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::common::error::{EtlError, Result};
use crate::common::table::{Cell, RecordSet};

/// Fetch a JSON document and convert it to a `RecordSet`. Both shapes the
/// retail feeds use are supported: an array of row objects, and a
/// column-oriented map of `column -> { row_key -> value }`.
#[instrument(skip(client))]
pub async fn fetch_json(client: &reqwest::Client, url: &str) -> Result<RecordSet> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body: Value = response.json().await?;

    let records = match &body {
        Value::Array(items) => {
            let objects: Vec<Value> = items.to_vec();
            objects_to_record_set(&objects)?
        }
        Value::Object(map) if map.values().all(Value::is_object) && !map.is_empty() => {
            columns_to_record_set(map)?
        }
        _ => {
            return Err(EtlError::SourceUnavailable(format!(
                "unexpected JSON shape at {url}"
            )))
        }
    };
    info!(url, rows = records.len(), "JSON source extracted");
    Ok(records)
}

/// Build a `RecordSet` from an ordered sequence of row objects. The first
/// object fixes the column set; later objects may omit fields (missing) but
/// contribute no new columns.
pub fn objects_to_record_set(objects: &[Value]) -> Result<RecordSet> {
    let Some(first) = objects.first().and_then(Value::as_object) else {
        return Ok(RecordSet::default());
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    let mut records = RecordSet::new(columns.clone());
    for object in objects {
        let row: Vec<Cell> = columns
            .iter()
            .map(|column| {
                object
                    .get(column)
                    .map(value_to_cell)
                    .unwrap_or(Cell::Missing)
            })
            .collect();
        records.push_row(row)?;
    }
    Ok(records)
}

/// Column-oriented JSON: every top-level key is a column mapping row keys to
/// values. Row keys are aligned across columns and ordered numerically where
/// possible.
fn columns_to_record_set(map: &Map<String, Value>) -> Result<RecordSet> {
    let columns: Vec<String> = map.keys().cloned().collect();

    let mut row_keys: Vec<String> = map
        .values()
        .next()
        .and_then(Value::as_object)
        .map(|rows| rows.keys().cloned().collect())
        .unwrap_or_default();
    row_keys.sort_by_key(|key| key.parse::<u64>().unwrap_or(u64::MAX));

    let mut records = RecordSet::new(columns.clone());
    for key in &row_keys {
        let row: Vec<Cell> = columns
            .iter()
            .map(|column| {
                map[column]
                    .get(key)
                    .map(value_to_cell)
                    .unwrap_or(Cell::Missing)
            })
            .collect();
        records.push_row(row)?;
    }
    Ok(records)
}

fn value_to_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Missing,
        Value::String(s) => Cell::Text(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Int(i)
            } else {
                n.as_f64().map(Cell::Float).unwrap_or(Cell::Missing)
            }
        }
        Value::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}
