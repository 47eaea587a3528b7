use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};
use tracing::{info, instrument, warn};

use crate::common::error::Result;
use crate::common::table::{Cell, RecordSet};

/// Read an entire source table into a `RecordSet`, decoding each column by
/// its Postgres type. Unknown types fall back to text; a column whose values
/// cannot be decoded at all is extracted as missing, with one warning naming
/// the column so the gap is traceable in the logs rather than silent.
#[instrument(skip(pool))]
pub async fn fetch_table(pool: &PgPool, table: &str) -> Result<RecordSet> {
    let query = format!("SELECT * FROM {}", quote_ident(table));
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    let Some(first) = rows.first() else {
        return Ok(RecordSet::default());
    };
    let columns: Vec<String> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut records = RecordSet::new(columns);
    let mut failures = DecodeFailures::default();
    for row in &rows {
        let mut cells = Vec::with_capacity(row.columns().len());
        for (idx, column) in row.columns().iter().enumerate() {
            let type_name = column.type_info().name();
            let cell = match decode_cell(row, idx, type_name) {
                Ok(cell) => cell,
                Err(e) => {
                    if failures.note(column.name()) {
                        warn!(
                            table,
                            column = column.name(),
                            pg_type = type_name,
                            error = %e,
                            "column could not be decoded, its values are extracted as missing"
                        );
                    }
                    Cell::Missing
                }
            };
            cells.push(cell);
        }
        records.push_row(cells)?;
    }
    info!(table, rows = records.len(), "table extracted");
    Ok(records)
}

/// Columns that failed to decode, kept so each one is reported exactly once
/// instead of per row.
#[derive(Default)]
struct DecodeFailures {
    seen: std::collections::BTreeSet<String>,
}

impl DecodeFailures {
    /// Records a failing column; true the first time that column is seen.
    fn note(&mut self, column: &str) -> bool {
        self.seen.insert(column.to_string())
    }
}

/// Table names visible in the source database's public schema.
pub async fn list_tables(pool: &PgPool) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = 'public' ORDER BY table_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .iter()
        .filter_map(|row| row.try_get::<String, _>(0).ok())
        .collect())
}

/// Decode one value. `Ok(Cell::Missing)` is SQL NULL; `Err` means the column
/// type could not be read at all and is the caller's to report.
fn decode_cell(row: &PgRow, idx: usize, type_name: &str) -> sqlx::Result<Cell> {
    let cell = match type_name {
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| Cell::Int(v as i64)),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| Cell::Int(v as i64)),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Cell::Int),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(|v| Cell::Float(v as f64)),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Cell::Float),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(Cell::Date),
        "TIME" => row.try_get::<Option<NaiveTime>, _>(idx)?.map(Cell::Time),
        "TIMESTAMP" | "TIMESTAMPTZ" => {
            row.try_get::<Option<NaiveDateTime>, _>(idx)?.map(Cell::DateTime)
        }
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(|v| Cell::Text(v.to_string())),
        "UUID" => row
            .try_get::<Option<sqlx::types::Uuid>, _>(idx)?
            .map(|v| Cell::Text(v.to_string())),
        _ => row.try_get::<Option<String>, _>(idx)?.map(Cell::Text),
    };
    Ok(cell.unwrap_or(Cell::Missing))
}

/// Quote an identifier for interpolation into DDL/DML. Table and column
/// names here come from configuration and extracted schemas, not users, but
/// some legacy column names ("1", "level_0") need quoting to be valid at all.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("orders_table"), "\"orders_table\"");
        assert_eq!(quote_ident("1"), "\"1\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn each_failing_column_is_reported_once() {
        let mut failures = DecodeFailures::default();
        assert!(failures.note("user_uuid"));
        assert!(!failures.note("user_uuid"));
        assert!(!failures.note("user_uuid"));
        assert!(failures.note("balance"));
    }
}
