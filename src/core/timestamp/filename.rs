//! Timestamps embedded in camera file names.
//!
//! Phones export photos as `2025-10-29 12.00.25.jpg`; bursts within the same
//! second get `_1`, `_2`, ... suffixes.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static TIMESTAMP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{4})-(\d{2})-(\d{2})\s+(\d{2})\.(\d{2})\.(\d{2})(?:_(\d+))?\.jpe?g$")
        .expect("timestamp name pattern is valid")
});

/// Parse the capture time from a `YYYY-MM-DD HH.MM.SS[_N].jpg` name.
///
/// Only exact matches count, and the date must exist on the calendar.
pub fn parse_timestamp_name(name: &str) -> Option<NaiveDateTime> {
    let caps = TIMESTAMP_NAME.captures(name)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = i32::try_from(field(1)?).ok()?;
    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?.and_hms_opt(field(4)?, field(5)?, field(6)?)
}

/// Whether `name` already has the timestamp form
pub fn is_timestamp_name(name: &str) -> bool {
    parse_timestamp_name(name).is_some()
}

/// Build a timestamp file name, with a `_N` suffix when `counter` is set
pub fn format_timestamp_name(timestamp: &NaiveDateTime, counter: Option<u32>, extension: &str) -> String {
    let base = timestamp.format("%Y-%m-%d %H.%M.%S").to_string();
    match counter {
        Some(n) => format!("{}_{}.{}", base, n, extension),
        None => format!("{}.{}", base, extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn parses_plain_and_suffixed_names() {
        assert_eq!(
            parse_timestamp_name("2025-10-29 12.00.25.jpg"),
            Some(at(2025, 10, 29, 12, 0, 25))
        );
        assert_eq!(
            parse_timestamp_name("2025-10-29 12.44.07_1.JPG"),
            Some(at(2025, 10, 29, 12, 44, 7))
        );
    }

    #[test]
    fn rejects_near_misses() {
        assert_eq!(parse_timestamp_name("2025-10-29 12.00.25.png"), None);
        assert_eq!(parse_timestamp_name("2025-10-29_12.00.25.jpg"), None);
        assert_eq!(parse_timestamp_name("IMG 2025-10-29 12.00.25.jpg"), None);
        assert_eq!(parse_timestamp_name("2025-10-29 12.00.25 copy.jpg"), None);
        assert_eq!(parse_timestamp_name("item-1-1.jpg"), None);
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(parse_timestamp_name("2025-02-30 12.00.00.jpg"), None);
        assert_eq!(parse_timestamp_name("2025-10-29 25.00.00.jpg"), None);
    }

    #[test]
    fn formatted_names_parse_back() {
        let ts = at(2025, 10, 29, 9, 5, 3);
        let plain = format_timestamp_name(&ts, None, "jpg");
        let burst = format_timestamp_name(&ts, Some(2), "jpg");

        assert_eq!(plain, "2025-10-29 09.05.03.jpg");
        assert_eq!(burst, "2025-10-29 09.05.03_2.jpg");
        assert_eq!(parse_timestamp_name(&burst), Some(ts));
    }
}
