use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::common::error::{EtlError, Result};
use crate::common::table::{Cell, RecordSet};

const CARD_COLUMNS: [&str; 4] = [
    "card_number",
    "expiry_date",
    "card_provider",
    "date_payment_confirmed",
];

// One card record per text line: number (possibly prefixed with the
// extraction artifact '?'), MM/YY expiry, provider name of one or more
// words, confirmation date. "NULL" placeholder rows are kept for the
// cleaner to drop.
static CARD_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<number>[0-9A-Za-z?]+)\s+(?P<expiry>\d{2}/\d{2}|NULL)\s+(?P<provider>.+?)\s+(?P<confirmed>\d{4}-\d{2}-\d{2}|NULL)$",
    )
    .unwrap()
});

/// Download the card statement document and parse its tabular text into a
/// `RecordSet`. Page furniture and repeated per-page headers are skipped;
/// a document yielding no rows at all is a parse failure.
#[instrument(skip(client))]
pub async fn fetch_remote_document(client: &reqwest::Client, url: &str) -> Result<RecordSet> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| EtlError::Document(format!("text extraction failed for {url}: {e}")))?;

    let records = parse_card_text(&text)?;
    info!(url, rows = records.len(), "card document extracted");
    Ok(records)
}

/// Parse extracted document text into card records.
pub fn parse_card_text(text: &str) -> Result<RecordSet> {
    let mut records = RecordSet::new(CARD_COLUMNS.map(String::from).to_vec());
    let mut skipped = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains("card_number") {
            continue;
        }
        match CARD_LINE_RE.captures(line) {
            Some(caps) => {
                records.push_row(vec![
                    Cell::Text(caps["number"].to_string()),
                    Cell::Text(caps["expiry"].to_string()),
                    Cell::Text(caps["provider"].trim().to_string()),
                    Cell::Text(caps["confirmed"].to_string()),
                ])?;
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "non-record lines skipped in card document");
    }
    if records.is_empty() {
        return Err(EtlError::Document(
            "no card records found in document text".to_string(),
        ));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "\
card_number expiry_date card_provider date_payment_confirmed
30060773296197 09/26 Diners Club / Carte Blanche 2015-11-25
349624180933183 10/23 American Express 2001-06-18
?4971858637664481 04/24 VISA 16 digit 2021-04-01
NULL NULL NULL NULL
Page 2 of 279
card_number expiry_date card_provider date_payment_confirmed
4252720361802860591 06/27 VISA 19 digit 2000-07-26
";

    #[test]
    fn parses_records_and_skips_furniture() {
        let records = parse_card_text(PAGE).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records.columns(), &CARD_COLUMNS.map(String::from).to_vec()[..]);
    }

    #[test]
    fn multiword_providers_survive() {
        let records = parse_card_text(PAGE).unwrap();
        assert_eq!(
            records.get(0, "card_provider").unwrap().as_text(),
            Some("Diners Club / Carte Blanche")
        );
    }

    #[test]
    fn question_mark_prefixes_are_preserved_for_the_cleaner() {
        let records = parse_card_text(PAGE).unwrap();
        assert_eq!(
            records.get(2, "card_number").unwrap().as_text(),
            Some("?4971858637664481")
        );
    }

    #[test]
    fn null_placeholder_rows_pass_through() {
        let records = parse_card_text(PAGE).unwrap();
        assert_eq!(records.get(3, "card_number").unwrap().as_text(), Some("NULL"));
    }

    #[test]
    fn empty_documents_fail() {
        assert!(parse_card_text("Page 1 of 1\n").is_err());
    }
}
