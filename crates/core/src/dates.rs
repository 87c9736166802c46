//! Canonical date and wall-clock helpers.
//!
//! Every date comparison in the engine goes through [`normalize`] on both
//! sides: the backing table is shared with display tooling that reformats
//! date cells over time, and a single canonicalization miss desynchronizes
//! slot lookups for the whole schedule.

use chrono::{Datelike, NaiveDate};
use tracing::warn;

const KNOWN_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Best-effort canonicalization to `YYYY-MM-DD`.
///
/// Strips surrounding whitespace and quote characters, then tries the known
/// formats in order. Unrecognized input falls back to splitting on `/`, `-`
/// or `.` and guessing the year by which field is four characters wide; if
/// that fails too, the trimmed input is returned unchanged. This function
/// never fails — callers must treat the output as best effort.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(|c| c == '\'' || c == '"').trim();
    if trimmed.is_empty() {
        return String::new();
    }

    for format in KNOWN_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    let parts: Vec<&str> = if trimmed.contains('/') {
        trimmed.split('/').collect()
    } else if trimmed.contains('-') {
        trimmed.split('-').collect()
    } else if trimmed.contains('.') {
        trimmed.split('.').collect()
    } else {
        warn!(input = trimmed, "date has no recognizable separator, passing through");
        return trimmed.to_string();
    };

    if parts.len() == 3 {
        if parts[0].len() == 4 {
            if let (Ok(month), Ok(day)) = (parts[1].parse::<u32>(), parts[2].parse::<u32>()) {
                return format!("{}-{month:02}-{day:02}", parts[0]);
            }
        } else if parts[2].len() == 4 {
            if let (Ok(month), Ok(day)) = (parts[1].parse::<u32>(), parts[0].parse::<u32>()) {
                return format!("{}-{month:02}-{day:02}", parts[2]);
            }
        }
    }

    warn!(input = trimmed, "unrecognized date format, passing through");
    trimmed.to_string()
}

/// `HH:MM` to minutes since midnight. `None` on malformed input.
pub fn time_to_minutes(raw: &str) -> Option<u32> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// First and last calendar day of a month. `None` for out-of-range months.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

pub fn format_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}
