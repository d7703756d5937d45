//! Tap and drag gestures.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sf_core::{DRAG_THRESHOLD, GestureOutcome, SessionEngine, Store};

use super::util::format_time;

pub fn tap<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    now: DateTime<Utc>,
) -> Result<()> {
    let outcome = engine.tap_at(now);
    report(writer, engine, outcome, now)
}

pub fn drag<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    dy: f64,
    now: DateTime<Utc>,
) -> Result<()> {
    let outcome = engine.drag_at(dy, now);
    report(writer, engine, outcome, now)
}

pub fn pause<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    now: DateTime<Utc>,
) -> Result<()> {
    let outcome = engine.pause_at(now);
    report(writer, engine, outcome, now)
}

pub fn resume<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    now: DateTime<Utc>,
) -> Result<()> {
    let outcome = engine.resume_at(now);
    report(writer, engine, outcome, now)
}

fn report<W: Write, S: Store>(
    writer: &mut W,
    engine: &SessionEngine<S>,
    outcome: GestureOutcome,
    now: DateTime<Utc>,
) -> Result<()> {
    match outcome {
        GestureOutcome::Applied { from, to } => {
            writeln!(writer, "{from} -> {to} at {}", format_time(now, engine.clock()))?;
        }
        GestureOutcome::Ignored => {
            writeln!(
                writer,
                "Ignored: no effect in state {} (drags must exceed {DRAG_THRESHOLD} points)",
                engine.state()
            )?;
        }
    }
    Ok(())
}
