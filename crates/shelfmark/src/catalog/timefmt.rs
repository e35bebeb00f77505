//! Timestamp text helpers.
//!
//! Timestamps are stored as plain strings of the form `DD.MM.YY|HH:MM:SS`
//! in local time, so they survive the JSON snapshot untouched and sort
//! correctly once parsed.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{Result, ShelfError};

const DATE_FORMAT: &str = "%d.%m.%y";
const TIME_FORMAT: &str = "%H:%M:%S";
const SEPARATOR: char = '|';

/// Which part of a timestamp to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    #[default]
    Full,
    Date,
    Time,
}

/// Render `at` in the catalog's timestamp format.
pub fn format_timestamp(at: NaiveDateTime, format: TimeFormat) -> String {
    match format {
        TimeFormat::Full => format!(
            "{}{}{}",
            at.format(DATE_FORMAT),
            SEPARATOR,
            at.format(TIME_FORMAT)
        ),
        TimeFormat::Date => at.format(DATE_FORMAT).to_string(),
        TimeFormat::Time => at.format(TIME_FORMAT).to_string(),
    }
}

/// Current local time in the catalog's timestamp format.
pub fn now(format: TimeFormat) -> String {
    format_timestamp(Local::now().naive_local(), format)
}

/// Date label used in backup file names: `YY-MM-DD`.
pub fn backup_date(date: NaiveDate) -> String {
    date.format("%y-%m-%d").to_string()
}

/// Parse a `DD.MM.YY|HH:MM:SS` string.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let (date, time) = text
        .split_once(SEPARATOR)
        .ok_or_else(|| ShelfError::InvalidTimestamp(format!("missing '{}' in '{}'", SEPARATOR, text)))?;
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|e| ShelfError::InvalidTimestamp(format!("bad date in '{}': {}", text, e)))?;
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
        .map_err(|e| ShelfError::InvalidTimestamp(format!("bad time in '{}': {}", text, e)))?;
    Ok(NaiveDateTime::new(date, time))
}

pub fn is_timestamp(text: &str) -> bool {
    parse_timestamp(text).is_ok()
}

/// Sort timestamps newest first. Fails on the first unparseable value.
pub fn sort_timestamps(values: &[String]) -> Result<Vec<String>> {
    let mut parsed = values
        .iter()
        .map(|value| parse_timestamp(value).map(|at| (at, value.clone())))
        .collect::<Result<Vec<_>>>()?;
    parsed.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(parsed.into_iter().map(|(_, value)| value).collect())
}
