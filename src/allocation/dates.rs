use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::parser::CellValue;

/// Layouts the fallback parse understands once every exact pattern has failed
const FLEXIBLE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const FLEXIBLE_DATE_FORMATS: &[&str] = &[
    "%Y%m%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%d-%B-%Y",
    "%Y-%b-%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
];

#[derive(Debug, Clone, Copy)]
enum Strategy {
    /// Whole-string match against one date pattern with a four-digit year
    Exact(&'static str),
    Flexible,
}

/// Tried in order. Day-first and month-first slash dates are ambiguous,
/// so `01/02/2024` resolves to 2 January because `%m/%d/%Y` comes first.
const STRATEGIES: [Strategy; 8] = [
    Strategy::Exact("%Y-%m-%d"),
    Strategy::Exact("%d-%m-%Y"),
    Strategy::Exact("%m/%d/%Y"),
    Strategy::Exact("%d/%m/%Y"),
    Strategy::Exact("%Y/%m/%d"),
    Strategy::Exact("%d-%b-%Y"),
    Strategy::Exact("%d %b %Y"),
    Strategy::Flexible,
];

impl Strategy {
    fn attempt(self, text: &str) -> Option<NaiveDateTime> {
        match self {
            Strategy::Exact(format) => NaiveDate::parse_from_str(text, format)
                .ok()
                .filter(|date| date.year() >= 1000)
                .map(at_midnight),
            Strategy::Flexible => parse_flexible(text.trim()),
        }
    }
}

fn at_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn parse_flexible(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            FLEXIBLE_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        })
        .or_else(|| {
            FLEXIBLE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(at_midnight)
        })
}

/// Parses hand-entered date text, returning None when nothing fits
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy.attempt(text))
}

/// Normalizes a fee-paid cell into a timestamp.
///
/// Real spreadsheet dates pass through untouched. Bare numbers are not
/// treated as dates: date-formatted cells already arrive as timestamps.
pub fn parse_fee_date(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Timestamp(ts) => Some(*ts),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Missing | CellValue::Number(_) => None,
    }
}
