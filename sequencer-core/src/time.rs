//! `HH:MM[:SS]` time-of-day parsing, with hours extended up to 168 so a
//! schedule can express "next day" / "next week" by overflowing past 24.

use crate::error::ScheduleError;

/// One day, in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Parse `HH:MM[:SS]` into an offset in milliseconds from midnight.
///
/// Hours may run from 0 to 168 (one week) to let a schedule's `to_time`
/// spill into a following day or week; minutes and seconds are ordinary
/// `0..60`. Anything else is a malformed time string.
pub fn parse_time_of_day(raw: &str) -> Result<i64, ScheduleError> {
    let bad = || ScheduleError::InvalidTimeString(raw.to_string());

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(bad());
    }

    let hours: i64 = parts[0].parse().map_err(|_| bad())?;
    let minutes: i64 = parts[1].parse().map_err(|_| bad())?;
    let seconds: i64 = match parts.get(2) {
        Some(raw_secs) => raw_secs.parse().map_err(|_| bad())?,
        None => 0,
    };

    if !(0..=168).contains(&hours) || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return Err(bad());
    }

    Ok(((hours * 3600) + (minutes * 60) + seconds) * 1000)
}

/// Resolve a schedule's `date` (midnight epoch ms) plus `from_time`/`to_time`
/// strings into absolute `[start_ms, end_ms)` millisecond instants.
///
/// Per spec §6, a schedule whose `end_ms <= start_ms` never matches any
/// instant; callers should treat that as an always-empty window rather than
/// a parse failure.
pub fn resolve_window(date_ms: i64, from_time: &str, to_time: &str) -> Result<(i64, i64), ScheduleError> {
    let start_ms = date_ms + parse_time_of_day(from_time)?;
    let end_ms = date_ms + parse_time_of_day(to_time)?;
    Ok((start_ms, end_ms))
}
