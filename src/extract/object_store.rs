use tracing::{info, instrument};

use crate::common::error::{EtlError, Result};
use crate::common::table::{Cell, RecordSet};

/// Fetch a CSV object from a public bucket given its `s3://bucket/key`
/// address. The bucket is world-readable, so the object is downloaded over
/// plain HTTPS rather than through an SDK client.
#[instrument(skip(client))]
pub async fn fetch_object_store_csv(
    client: &reqwest::Client,
    address: &str,
    region: &str,
) -> Result<RecordSet> {
    let url = https_url(address, region)?;
    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let records = parse_csv(body.as_bytes())?;
    info!(address, rows = records.len(), "object store CSV extracted");
    Ok(records)
}

/// Rewrite `s3://bucket/key` to the bucket's public HTTPS endpoint.
fn https_url(address: &str, region: &str) -> Result<String> {
    let rest = address.strip_prefix("s3://").ok_or_else(|| {
        EtlError::Config(format!("not an s3:// address: {address}"))
    })?;
    let (bucket, key) = rest.split_once('/').ok_or_else(|| {
        EtlError::Config(format!("s3 address has no object key: {address}"))
    })?;
    Ok(format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"))
}

/// Parse CSV bytes into a `RecordSet`; headers become columns, empty cells
/// become `Missing` and everything else enters as text for the cleaners.
pub fn parse_csv(bytes: &[u8]) -> Result<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(false)
        .from_reader(bytes);
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = RecordSet::new(columns);
    for row in reader.records() {
        let row = row?;
        let cells: Vec<Cell> = row
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Missing
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        records.push_row(cells)?;
    }
    Ok(records)
}
