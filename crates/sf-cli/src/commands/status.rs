//! Status command for showing the session state and live totals.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sf_core::{Category, SessionEngine, SessionState, Store};

use super::util::{format_duration, format_time};

/// Status data for display.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state: SessionState,
    pub bucket_start: Option<DateTime<Utc>>,
    pub live_work_seconds: f64,
    pub live_break_seconds: f64,
    pub resume_into: Option<SessionState>,
    /// Totals count traces from this instant on (the last reset).
    pub totals_since: Option<DateTime<Utc>>,
    pub active_block: Option<ActiveBlock>,
    pub selected_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveBlock {
    pub id: String,
    pub label: String,
    pub category: Category,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub fn collect<S: Store>(engine: &SessionEngine<S>, now: DateTime<Utc>) -> StatusReport {
    StatusReport {
        state: engine.state(),
        bucket_start: engine.bucket_start(),
        live_work_seconds: engine.live_work_total_at(now),
        live_break_seconds: engine.live_break_total_at(now),
        resume_into: engine.previous_state(),
        totals_since: engine.totals_since(),
        active_block: engine.active_block_at(now).map(|task| ActiveBlock {
            id: task.id.to_string(),
            label: task.label.clone(),
            category: task.category,
            start: task.start_time,
            // The open manual block only ends when work does.
            end: if engine.open_manual_focus_at(now).is_some_and(|open| open.id == task.id) {
                now
            } else {
                task.end_time()
            },
        }),
        selected_date: engine.selected_date(),
    }
}

pub fn run<W: Write, S: Store>(
    writer: &mut W,
    engine: &SessionEngine<S>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let report = collect(engine, now);
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    let clock = engine.clock();
    match report.bucket_start {
        Some(start) => writeln!(
            writer,
            "State: {} since {}",
            report.state,
            format_time(start, clock)
        )?,
        None => writeln!(writer, "State: {}", report.state)?,
    }
    if let Some(resume) = report.resume_into {
        writeln!(writer, "Resumes into: {resume}")?;
    }
    writeln!(writer, "Work:  {}", format_duration(report.live_work_seconds))?;
    writeln!(writer, "Break: {}", format_duration(report.live_break_seconds))?;
    match &report.active_block {
        Some(block) => writeln!(
            writer,
            "Block: {} ({}-{}, {})",
            block.label,
            format_time(block.start, clock),
            format_time(block.end, clock),
            block.category
        )?,
        None => writeln!(writer, "Block: none")?,
    }
    writeln!(writer, "Day:   {}", report.selected_date)?;
    Ok(())
}
