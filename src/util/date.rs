use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Textual form of dates written to the location.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp into an instant.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .ok()
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
}

/// Same as [`parse_instant`], truncated to the start of the UTC day.
pub fn parse_day(raw: &str) -> Option<DateTime<Utc>> {
    parse_instant(raw).map(start_of_day)
}

pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn format_day(instant: &DateTime<Utc>) -> String {
    instant.format(DAY_FORMAT).to_string()
}

/// `dd/mm/yyyy`, the way dates are shown in tables and forms.
pub fn display_date(instant: &DateTime<Utc>) -> String {
    instant.format("%d/%m/%Y").to_string()
}
