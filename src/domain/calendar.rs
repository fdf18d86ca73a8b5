/// Calendar date parsing at the boundary
///
/// Completion dates arrive as `YYYY-MM-DD` strings. They are turned into
/// timezone-naive `NaiveDate` values here so no comparison downstream can be
/// affected by time of day or UTC offsets.

use chrono::NaiveDate;

use crate::domain::DomainError;

/// Wire format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `YYYY-MM-DD` calendar date
///
/// Shorter forms like `2024-1-5`, surrounding whitespace and timestamps are
/// rejected rather than guessed at.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate, DomainError> {
    let bytes = s.as_bytes();
    let well_shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !well_shaped {
        return Err(DomainError::InvalidDate(format!(
            "'{}' is not a YYYY-MM-DD date",
            s
        )));
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DomainError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse a habit start date
///
/// Older records carry a full timestamp (`2024-01-01T00:00:00.000Z`). Only the
/// calendar part is kept and no timezone conversion is applied.
pub fn parse_start_date(s: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = s.trim();
    match trimmed.get(..10) {
        Some(day) if trimmed.len() == 10 || trimmed[10..].starts_with(&['T', ' '][..]) => {
            parse_calendar_date(day)
        }
        _ => Err(DomainError::InvalidDate(format!(
            "'{}' is not a valid start date",
            s
        ))),
    }
}

/// Parse a list of date strings, failing on the first malformed entry
pub fn parse_calendar_dates<S: AsRef<str>>(dates: &[S]) -> Result<Vec<NaiveDate>, DomainError> {
    dates.iter().map(|d| parse_calendar_date(d.as_ref())).collect()
}

/// Format a date in the wire format
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
