use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument, warn};

use crate::common::error::Result;
use crate::common::table::{Cell, RecordSet};
use crate::config::Config;
use crate::extract::database::quote_ident;

/// Rows per INSERT statement; Postgres caps bind parameters at 65535, so
/// stay well below it even for wide tables.
const INSERT_BATCH: usize = 500;

pub struct Loader {
    target_pool: PgPool,
}

impl Loader {
    pub async fn connect(config: &Config) -> Result<Self> {
        let target_pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&config.target_db.url()?)
            .await?;
        Ok(Self { target_pool })
    }

    /// Replace `destination` with the given records. An empty set is a
    /// warned no-op so an upstream failure never truncates good data.
    #[instrument(skip(self, records), fields(rows = records.len()))]
    pub async fn load(&self, records: &RecordSet, destination: &str) -> Result<()> {
        if records.is_empty() {
            warn!(destination, "nothing to load, skipping");
            return Ok(());
        }

        let table = quote_ident(destination);
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&self.target_pool)
            .await?;
        sqlx::query(&create_table_sql(records, destination))
            .execute(&self.target_pool)
            .await?;

        for chunk in records.rows().chunks(INSERT_BATCH) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {table} ({}) ",
                records
                    .columns()
                    .iter()
                    .map(|c| quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
            builder.push_values(chunk, |mut b, row| {
                for cell in row {
                    match cell {
                        Cell::Text(s) => b.push_bind(s.clone()),
                        Cell::Int(i) => b.push_bind(*i),
                        Cell::Float(f) => b.push_bind(*f),
                        Cell::Date(d) => b.push_bind(*d),
                        Cell::Time(t) => b.push_bind(*t),
                        Cell::DateTime(dt) => b.push_bind(*dt),
                        Cell::Missing => b.push_bind(Option::<String>::None),
                    };
                }
            });
            builder.build().execute(&self.target_pool).await?;
        }

        info!(destination, rows = records.len(), "load complete");
        Ok(())
    }
}

/// DDL for the destination table, with each column typed from its first
/// non-missing cell. All-missing columns fall back to TEXT.
fn create_table_sql(records: &RecordSet, destination: &str) -> String {
    let columns: Vec<String> = records
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            format!("{} {}", quote_ident(name), column_sql_type(records, idx))
        })
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_ident(destination),
        columns.join(", ")
    )
}

fn column_sql_type(records: &RecordSet, idx: usize) -> &'static str {
    let first_typed = records
        .rows()
        .iter()
        .map(|row| &row[idx])
        .find(|cell| !cell.is_missing());
    match first_typed {
        Some(Cell::Int(_)) => "BIGINT",
        Some(Cell::Float(_)) => "DOUBLE PRECISION",
        Some(Cell::Date(_)) => "DATE",
        Some(Cell::Time(_)) => "TIME",
        Some(Cell::DateTime(_)) => "TIMESTAMP",
        _ => "TEXT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn ddl_types_follow_cell_types() {
        let mut records = RecordSet::new(vec![
            "name".into(),
            "weight".into(),
            "date_added".into(),
            "notes".into(),
        ]);
        records
            .push_row(vec![
                Cell::Text("Cheesecake".into()),
                Cell::Missing,
                Cell::Date(NaiveDate::from_ymd_opt(2018, 10, 22).unwrap()),
                Cell::Missing,
            ])
            .unwrap();
        records
            .push_row(vec![
                Cell::Text("Towels".into()),
                Cell::Float(0.75),
                Cell::Date(NaiveDate::from_ymd_opt(2019, 1, 2).unwrap()),
                Cell::Missing,
            ])
            .unwrap();

        assert_eq!(
            create_table_sql(&records, "dim_products"),
            "CREATE TABLE \"dim_products\" (\"name\" TEXT, \"weight\" DOUBLE PRECISION, \
             \"date_added\" DATE, \"notes\" TEXT)"
        );
    }
}
