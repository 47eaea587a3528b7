use retail_etl::clean::{cards, date_events, products, users};
use retail_etl::common::table::{Cell, RecordSet};
use retail_etl::extract::document::parse_card_text;
use retail_etl::extract::object_store::parse_csv;

/// Cards flow exactly as extracted from the statement document: the
/// `?`-prefixed number is repaired, the lettered number and the NULL
/// placeholder row are rejected.
#[test]
fn card_document_to_cleaned_records() {
    let text = "\
card_number expiry_date card_provider date_payment_confirmed
1234567? 09/26 VISA 16 digit 2015-11-25
12AB3456 10/23 American Express 2001-06-18
NULL NULL NULL NULL
";
    let raw = parse_card_text(text).unwrap();
    assert_eq!(raw.len(), 3);

    let cleaned = cards::clean_cards(raw).unwrap();
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned.get(0, "card_number").unwrap().as_text(), Some("1234567"));
}

/// Products flow from CSV text through weight conversion and price checks.
#[test]
fn product_csv_to_cleaned_records() {
    let csv = "\
,product_name,product_price,weight,category,EAN,date_added,uuid,removed,product_code
0,Tiramisu Cheesecake,£4.99,3 x 250g,food-and-drink,7425710935115,2018-10-22,67f9f-, Still_avaliable,R7-3126933h
1,NULL,NULL,NULL,NULL,NULL,NULL,NULL,NULL,NULL
2,Dog Treats,£2.30,MX180RYSHMQ,pets,1945816904649,2019-03-14,8aa67-,Still_avaliable,B7-8862361b
";
    let raw = parse_csv(csv.as_bytes()).unwrap();
    let cleaned = products::clean_products(raw).unwrap();

    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned.get(0, "weight").unwrap().as_float(), Some(0.75));
    assert!(matches!(cleaned.get(0, "date_added"), Some(Cell::Date(_))));
}

/// A user row with the GGB typo survives cleaning with the code repaired;
/// garbage rows do not survive at all.
#[test]
fn user_country_codes_are_normalized() {
    let mut raw = RecordSet::new(
        ["first_name", "last_name", "date_of_birth", "country_code", "join_date"]
            .map(String::from)
            .to_vec(),
    );
    raw.push_row(vec![
        "Maisie".into(),
        "Hall".into(),
        "1972 January 14".into(),
        "GGB".into(),
        "2021-09-01".into(),
    ])
    .unwrap();
    raw.push_row(vec![
        "Bad".into(),
        "Row".into(),
        "not a date".into(),
        "GGB".into(),
        "2021-09-01".into(),
    ])
    .unwrap();

    let cleaned = users::clean_users(raw).unwrap();
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned.get(0, "country_code").unwrap().as_text(), Some("GB"));
}

/// Re-running a cleaner on its own output drops nothing further.
#[test]
fn second_pass_drops_nothing() {
    let mut raw = RecordSet::new(
        ["timestamp", "month", "year", "day", "date_uuid"]
            .map(String::from)
            .to_vec(),
    );
    raw.push_row(vec![
        "22:00:10".into(),
        "9".into(),
        "2012".into(),
        "19".into(),
        "3b54d061".into(),
    ])
    .unwrap();

    let once = date_events::clean_date_events(raw).unwrap();
    let twice = date_events::clean_date_events(once.clone()).unwrap();
    assert_eq!(once.rows(), twice.rows());
}
