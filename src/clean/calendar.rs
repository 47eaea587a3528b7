use chrono::{NaiveDate, NaiveTime};

/// Formats observed in the legacy data: ISO, slashed, and the month-name
/// permutations hand-entered operators managed to produce.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y %B %d",
    "%B %Y %d",
    "%d %B %Y",
    "%Y %b %d",
];

/// Lenient full-date parsing; `None` marks an unparseable value and the row
/// carrying it is dropped by the entity cleaner.
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Strict 4-digit year.
pub fn parse_year(raw: &str) -> Option<i64> {
    let text = raw.trim();
    if text.len() != 4 || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// 1-2 digit month. Raw text longer than 3 characters is rejected before
/// parsing to guard against misencoded month names and similar garbage.
pub fn parse_month(raw: &str) -> Option<i64> {
    let text = raw.trim();
    if text.len() > 3 || text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let month: i64 = text.parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// 1-2 digit day of month.
pub fn parse_day(raw: &str) -> Option<i64> {
    let text = raw.trim();
    if text.len() > 2 || text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let day: i64 = text.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

/// Time of day, strictly `HH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_and_slashed_dates_parse() {
        assert_eq!(
            parse_date_lenient("1968-10-16"),
            NaiveDate::from_ymd_opt(1968, 10, 16)
        );
        assert_eq!(
            parse_date_lenient("2021/09/01"),
            NaiveDate::from_ymd_opt(2021, 9, 1)
        );
    }

    #[test]
    fn month_name_permutations_parse() {
        assert_eq!(
            parse_date_lenient("2006 September 03"),
            NaiveDate::from_ymd_opt(2006, 9, 3)
        );
        assert_eq!(
            parse_date_lenient("July 1961 14"),
            NaiveDate::from_ymd_opt(1961, 7, 14)
        );
        assert_eq!(
            parse_date_lenient("16 October 1968"),
            NaiveDate::from_ymd_opt(1968, 10, 16)
        );
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_date_lenient("PG4DAB13AK"), None);
        assert_eq!(parse_date_lenient("NULL"), None);
    }

    #[test]
    fn year_must_be_four_digits() {
        assert_eq!(parse_year("1994"), Some(1994));
        assert_eq!(parse_year("94"), None);
        assert_eq!(parse_year("GMMJ59NZFB"), None);
    }

    #[test]
    fn month_rejects_long_or_garbage_text() {
        assert_eq!(parse_month("7"), Some(7));
        assert_eq!(parse_month("12"), Some(12));
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_month("ZRH3YZCZLS"), None);
        // length guard fires before any numeric parse
        assert_eq!(parse_month("0001"), None);
    }

    #[test]
    fn day_bounds_are_enforced() {
        assert_eq!(parse_day("1"), Some(1));
        assert_eq!(parse_day("31"), Some(31));
        assert_eq!(parse_day("32"), None);
        assert_eq!(parse_day("0"), None);
        assert_eq!(parse_day("3rd"), None);
    }

    #[test]
    fn timestamp_is_strict() {
        assert_eq!(
            parse_timestamp("22:00:10"),
            NaiveTime::from_hms_opt(22, 0, 10)
        );
        assert_eq!(parse_timestamp("22:00"), None);
        assert_eq!(parse_timestamp("not a time"), None);
    }
}
