//! Direct session control: transitions, closing, resetting, day selection.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sf_core::{SessionEngine, SessionState, Store};

use super::util::{format_duration, format_time};

pub fn transition<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    to: SessionState,
    now: DateTime<Utc>,
) -> Result<()> {
    let from = engine.state();
    engine.transition_at(to, now);
    writeln!(writer, "{from} -> {to} at {}", format_time(now, engine.clock()))?;
    Ok(())
}

pub fn close<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(id) = engine.close_current_trace_at(now) else {
        writeln!(writer, "No open bucket.")?;
        return Ok(());
    };
    let trace = engine
        .traces()
        .get(id)
        .context("closed trace missing from the log")?;
    let clock = engine.clock();
    writeln!(
        writer,
        "Closed {} trace {}-{} ({})",
        if trace.is_focus { "work" } else { "break" },
        format_time(trace.start, clock),
        format_time(trace.end, clock),
        format_duration(trace.duration())
    )?;
    Ok(())
}

pub fn reset<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    now: DateTime<Utc>,
) -> Result<()> {
    engine.reset_timers_at(now);
    writeln!(writer, "Timers reset; traces are kept.")?;
    Ok(())
}

pub fn select_date<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    date: NaiveDate,
) -> Result<()> {
    engine.select_date(date);
    let count = engine.selected_tasks().len();
    writeln!(writer, "Selected {date} ({count} blocks)")?;
    Ok(())
}
