//! Extraction layer: one facade over the heterogeneous retail sources.
//! Every successful extraction is also cached locally as CSV so a run
//! leaves an inspectable copy of what each source returned.

pub mod database;
pub mod document;
pub mod json_source;
pub mod object_store;
pub mod store_api;

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::warn;

use crate::common::constants::CSV_CACHE_DIR;
use crate::common::error::Result;
use crate::common::table::RecordSet;
use crate::config::Config;
use crate::extract::store_api::{fetch_stores, StoreApi, StoreFetch};

pub struct DataExtractor {
    client: reqwest::Client,
    source_pool: PgPool,
    cache_dir: PathBuf,
}

impl DataExtractor {
    /// Connect to the source database and build the shared HTTP client.
    pub async fn connect(config: &Config) -> Result<Self> {
        let source_pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&config.source_db.url()?)
            .await?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.store_api.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            source_pool,
            cache_dir: PathBuf::from(CSV_CACHE_DIR),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn fetch_table(&self, table: &str) -> Result<RecordSet> {
        let records = database::fetch_table(&self.source_pool, table).await?;
        self.cache(table, &records);
        Ok(records)
    }

    pub async fn list_tables(&self) -> Result<Vec<String>> {
        database::list_tables(&self.source_pool).await
    }

    pub async fn fetch_remote_document(&self, url: &str) -> Result<RecordSet> {
        let records = document::fetch_remote_document(&self.client, url).await?;
        self.cache("cards_table", &records);
        Ok(records)
    }

    pub async fn fetch_object_store_csv(&self, address: &str, region: &str) -> Result<RecordSet> {
        let records = object_store::fetch_object_store_csv(&self.client, address, region).await?;
        self.cache("products_table", &records);
        Ok(records)
    }

    pub async fn fetch_json(&self, url: &str) -> Result<RecordSet> {
        let records = json_source::fetch_json(&self.client, url).await?;
        self.cache("date_times_table", &records);
        Ok(records)
    }

    pub async fn fetch_stores(&self, api: &dyn StoreApi, index_base: u64) -> Result<StoreFetch> {
        let fetch = fetch_stores(api, index_base).await?;
        self.cache("stores_table", &fetch.records);
        Ok(fetch)
    }

    /// Best-effort CSV cache of an extracted table; failures only warn.
    fn cache(&self, name: &str, records: &RecordSet) {
        if let Err(e) = write_csv_cache(&self.cache_dir, name, records) {
            warn!(name, error = %e, "failed to cache extracted table");
        }
    }
}

/// Write one `RecordSet` to `{dir}/{name}.csv`.
pub fn write_csv_cache(dir: &Path, name: &str, records: &RecordSet) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.csv"));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(records.columns())?;
    for row in records.rows() {
        writer.write_record(row.iter().map(|cell| cell.render()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::table::Cell;
    use tempfile::tempdir;

    #[test]
    fn cache_round_trips_through_csv() {
        let dir = tempdir().unwrap();
        let mut records = RecordSet::new(vec!["a".into(), "b".into()]);
        records
            .push_row(vec![Cell::Int(1), Cell::Text("x".into())])
            .unwrap();
        records.push_row(vec![Cell::Missing, Cell::Float(2.5)]).unwrap();

        write_csv_cache(dir.path(), "sample", &records).unwrap();

        let written = std::fs::read_to_string(dir.path().join("sample.csv")).unwrap();
        assert_eq!(written, "a,b\n1,x\n,2.5\n");
    }
}
