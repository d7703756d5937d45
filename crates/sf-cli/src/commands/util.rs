//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use sf_core::{DayClock, SessionEngine, Store, TaskId, TraceId};

/// Pre-compiled regexes for relative time parsing.
static AGO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(second|minute|hour|day|week)s?\s+ago$").expect("valid regex")
});
static IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^in\s+(\d+)\s+(second|minute|hour|day|week)s?$").expect("valid regex")
});

/// Conservative bounds for relative time parsing (~1000 years in seconds).
const MAX_RELATIVE_SECONDS: i64 = 1000 * 365 * 24 * 60 * 60;

/// Characters of an id shown in listings.
pub const SHORT_ID_LEN: usize = 8;

/// Parse a datetime string relative to `now`, reading wall-clock forms in
/// `clock`'s offset.
///
/// Supports:
/// - ISO 8601: "2026-03-02T09:00:00Z"
/// - Local date and time: "2026-03-02T09:00" or "2026-03-02 09:00"
/// - Time of day on the current day: "09:00"
/// - Relative: "now", "30 minutes ago", "in 2 hours"
pub fn parse_datetime(s: &str, now: DateTime<Utc>, clock: &DayClock) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return from_local(naive, clock);
        }
    }

    if let Ok(time) = NaiveTime::parse_from_str(s, "%H:%M") {
        return from_local(clock.day_of(now).and_time(time), clock);
    }

    if let Some(caps) = AGO_RE.captures(s) {
        return Ok(now - relative_duration(&caps[1], &caps[2])?);
    }
    if let Some(caps) = IN_RE.captures(s) {
        return Ok(now + relative_duration(&caps[1], &caps[2])?);
    }

    bail!(concat!(
        "Invalid datetime: {}. Use ISO 8601 (e.g., 2026-03-02T09:00:00Z), ",
        "a time of day (e.g., 09:00) or relative (e.g., '2 hours ago', 'in 10 minutes')"
    ), s)
}

fn relative_duration(amount: &str, unit: &str) -> Result<Duration> {
    let n: i64 = amount
        .parse()
        .context("failed to parse number in relative time")?;

    let seconds_per_unit = match unit {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        "day" => 60 * 60 * 24,
        "week" => 60 * 60 * 24 * 7,
        unit => bail!("Unknown time unit: {unit}"),
    };

    if n > MAX_RELATIVE_SECONDS / seconds_per_unit {
        bail!("Relative time value too large: {n} {unit}");
    }

    Ok(Duration::seconds(n * seconds_per_unit))
}

fn from_local(naive: NaiveDateTime, clock: &DayClock) -> Result<DateTime<Utc>> {
    match clock.offset().from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => bail!("{naive} does not exist in offset {}", clock.offset()),
    }
}

/// Parse a calendar day: "today", "yesterday", "tomorrow" or "YYYY-MM-DD".
pub fn parse_date(s: &str, now: DateTime<Utc>, clock: &DayClock) -> Result<NaiveDate> {
    let today = clock.day_of(now);
    let day = match s.trim().to_ascii_lowercase().as_str() {
        "today" => Some(today),
        "yesterday" => today.pred_opt(),
        "tomorrow" => today.succ_opt(),
        other => Some(
            NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .with_context(|| {
                    format!("Invalid date: {s}. Use YYYY-MM-DD, today, yesterday or tomorrow")
                })?,
        ),
    };
    day.with_context(|| format!("date out of range: {s}"))
}

/// Formats seconds as `MM:SS`, or `H:MM:SS` from an hour up.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours >= 1 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Formats an instant as `HH:MM` in the clock's offset.
pub fn format_time(at: DateTime<Utc>, clock: &DayClock) -> String {
    clock.to_local(at).format("%H:%M").to_string()
}

pub fn short_id(id: impl ToString) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// Resolves a task id from its full form or a unique prefix.
pub fn resolve_task<S: Store>(engine: &SessionEngine<S>, id: &str) -> Result<TaskId> {
    let candidates: Vec<TaskId> = engine.tasks().map(|task| task.id).collect();
    resolve_prefix(id, "task", candidates)
}

/// Resolves a trace id from its full form or a unique prefix.
pub fn resolve_trace<S: Store>(engine: &SessionEngine<S>, id: &str) -> Result<TraceId> {
    let candidates: Vec<TraceId> = engine.traces().iter().map(|trace| trace.id).collect();
    resolve_prefix(id, "trace", candidates)
}

fn resolve_prefix<T: Copy + ToString>(id: &str, what: &str, candidates: Vec<T>) -> Result<T> {
    let needle = id.trim().to_ascii_lowercase();
    if needle.is_empty() {
        bail!("{what} id cannot be empty");
    }
    let mut matches = candidates
        .into_iter()
        .filter(|candidate| candidate.to_string().starts_with(&needle));
    let Some(found) = matches.next() else {
        bail!("{what} not found: {id}");
    };
    if matches.next().is_some() {
        bail!("{what} id is ambiguous: {id}");
    }
    Ok(found)
}
