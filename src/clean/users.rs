use tracing::{info, instrument};

use crate::clean::{coerce_date, drop_rows_with_missing, log_dropped};
use crate::common::constants::USERS_ENTITY;
use crate::common::error::{EtlError, Result};
use crate::common::table::{Cell, RecordSet};

/// Clean the legacy user table: parse both date columns, drop rows with any
/// missing required field, normalize the `GGB` country-code typo and reject
/// names with embedded digits.
#[instrument(skip(records), fields(rows_in = records.len()))]
pub fn clean_users(mut records: RecordSet) -> Result<RecordSet> {
    if records.is_empty() {
        return Err(EtlError::EmptyResult(USERS_ENTITY));
    }

    records.drop_columns(&["index"]);
    records.null_to_missing();

    records.map_column("date_of_birth", coerce_date)?;
    records.map_column("join_date", coerce_date)?;

    let before = records.len();
    drop_rows_with_missing(&mut records);
    log_dropped(USERS_ENTITY, before, records.len(), "missing required field");

    records.map_column("country_code", |cell| match cell.as_text() {
        Some("GGB") => Cell::Text("GB".to_string()),
        _ => cell.clone(),
    })?;

    let first = records.require_column("first_name")?;
    let last = records.require_column("last_name")?;
    let before = records.len();
    records.retain_rows(|row| {
        !has_digits(&row[first]) && !has_digits(&row[last])
    });
    log_dropped(USERS_ENTITY, before, records.len(), "digits in name");

    info!(rows_out = records.len(), "user data cleaned");
    Ok(records)
}

fn has_digits(cell: &Cell) -> bool {
    cell.as_text()
        .is_some_and(|s| s.chars().any(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_users() -> RecordSet {
        let mut rs = RecordSet::new(
            ["index", "first_name", "last_name", "date_of_birth", "country_code", "join_date"]
                .map(String::from)
                .to_vec(),
        );
        rs.push_row(vec![
            "0".into(),
            "Sigfried".into(),
            "Noack".into(),
            "1990-09-30".into(),
            "DE".into(),
            "2018 October 10".into(),
        ])
        .unwrap();
        rs.push_row(vec![
            "1".into(),
            "Maisie".into(),
            "Hall".into(),
            "1972-01-14".into(),
            "GGB".into(),
            "2021-09-01".into(),
        ])
        .unwrap();
        rs.push_row(vec![
            "2".into(),
            "NULL".into(),
            "NULL".into(),
            "NULL".into(),
            "NULL".into(),
            "NULL".into(),
        ])
        .unwrap();
        rs.push_row(vec![
            "3".into(),
            "XCD69KUI0K".into(),
            "GQX18NNCMS".into(),
            "QP2CMBNAYW".into(),
            "XX".into(),
            "EJ4JE1RWJO".into(),
        ])
        .unwrap();
        rs
    }

    #[test]
    fn cleans_users_end_to_end() {
        let cleaned = clean_users(raw_users()).unwrap();
        // NULL row and garbage-date row dropped, index column gone
        assert_eq!(cleaned.len(), 2);
        assert!(cleaned.column_index("index").is_none());
        assert!(matches!(cleaned.get(0, "join_date"), Some(Cell::Date(_))));
    }

    #[test]
    fn ggb_alias_becomes_gb() {
        let cleaned = clean_users(raw_users()).unwrap();
        assert_eq!(cleaned.get(1, "country_code").unwrap().as_text(), Some("GB"));
        assert_eq!(cleaned.get(0, "country_code").unwrap().as_text(), Some("DE"));
    }

    #[test]
    fn names_with_digits_are_rejected() {
        let mut rs = raw_users();
        rs.push_row(vec![
            "4".into(),
            "4lice".into(),
            "Smith".into(),
            "1988-03-02".into(),
            "GB".into(),
            "2020-01-01".into(),
        ])
        .unwrap();
        let cleaned = clean_users(rs).unwrap();
        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let once = clean_users(raw_users()).unwrap();
        let twice = clean_users(once.clone()).unwrap();
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn empty_input_is_an_explicit_failure() {
        let rs = RecordSet::new(vec!["first_name".into()]);
        assert!(matches!(clean_users(rs), Err(EtlError::EmptyResult(_))));
    }
}
