//! Lenient argument normalisation for conversational clients
//!
//! Times and dates arrive in whatever shape a user typed them. Anything we
//! recognise is rewritten to the canonical `HH:MM` / `YYYY-MM-DD` token the
//! core compares against; anything else passes through (trimmed) so the
//! workflow can reject it with a precise error.

use chrono::{NaiveDate, NaiveTime};

/// Accepted date layouts, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// `7pm`, `7:30 PM`, `19`, `19:00` -> `HH:MM`
pub fn normalize_time(raw: &str) -> String {
    match parse_time(raw) {
        Some(time) => time.format("%H:%M").to_string(),
        None => raw.trim().to_string(),
    }
}

/// Common date spellings -> `YYYY-MM-DD`
pub fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => raw.trim().to_string(),
    }
}

pub fn normalize_reservation_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let compact: String = raw.split_whitespace().collect::<String>().to_uppercase();

    let (clock, pm) = if let Some(clock) = compact.strip_suffix("PM") {
        (clock, Some(true))
    } else if let Some(clock) = compact.strip_suffix("AM") {
        (clock, Some(false))
    } else {
        (compact.as_str(), None)
    };

    let (hour, minute) = match clock.split_once(':') {
        Some((hour, minute)) if minute.len() == 2 => {
            (hour.parse::<u32>().ok()?, minute.parse::<u32>().ok()?)
        }
        Some(_) => return None,
        None => (clock.parse::<u32>().ok()?, 0),
    };

    let hour = match pm {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            hour % 12 + if pm { 12 } else { 0 }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}
