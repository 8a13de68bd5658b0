//! Posted-at parsing and the promotion window.
//!
//! The master log's posted-at column is populated from scraped display
//! strings and occasionally from spreadsheet-native date serials, so
//! parsing runs a fallback chain instead of a single format. Rows whose
//! value survives none of the formats are excluded from promotion, never
//! errored.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Anchor for spreadsheet-native numeric date serials.
fn serial_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Parse a posted-at cell with the multi-format fallback chain:
/// "YYYY/MM/DD HH:MM", "YYYY/MM/DD HH:MM:SS", "MM/DD HH:MM" (the current
/// year is implied), then a numeric day serial anchored at 1899-12-30.
///
/// `now` supplies the implied year for the short form.
pub fn parse_posted(raw: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y/%m/%d %H:%M") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y/%m/%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(&format!("{}/{s}", now.year()), "%Y/%m/%d %H:%M")
    {
        return Some(dt);
    }
    if let Ok(days) = s.parse::<f64>() {
        let seconds = (days * 86_400.0).round() as i64;
        return serial_epoch().checked_add_signed(Duration::seconds(seconds));
    }
    None
}

/// The rolling editorial day: `[yesterday 15:00:00, today 14:59:59]`,
/// computed from the wall clock at call time.
pub fn promotion_window(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = (now.date() - Duration::days(1))
        .and_hms_opt(15, 0, 0)
        .unwrap();
    let end = now.date().and_hms_opt(14, 59, 59).unwrap();
    (start, end)
}

/// Display form used in the master log: "YYYY/MM/DD HH:MM".
pub fn format_display(dt: NaiveDateTime) -> String {
    dt.format("%Y/%m/%d %H:%M").to_string()
}

/// Compact form used in working tables: "YY/M/D HH:MM" with
/// non-zero-padded month and day.
pub fn format_compact(dt: NaiveDateTime) -> String {
    format!(
        "{:02}/{}/{} {:02}:{:02}",
        dt.year() % 100,
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute()
    )
}
