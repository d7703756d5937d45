//! Traces command for reviewing and correcting finished intervals.
//!
//! Every edit or deletion re-derives the work and break totals from the
//! remaining traces.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;
use sf_core::{SessionEngine, Store, TimeTrace, TraceEdit};

use super::tasks::day_or_selected;
use super::util::{format_duration, format_time, parse_datetime, resolve_trace, short_id};

#[derive(Debug, Subcommand)]
pub enum TracesAction {
    /// List the traces of a day (the selected day by default).
    List {
        /// Day to list (YYYY-MM-DD, today, yesterday, tomorrow).
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Edit a trace's label or bounds.
    Edit {
        id: String,
        #[arg(long)]
        label: Option<String>,
        /// New start (ISO 8601, HH:MM or relative).
        #[arg(long)]
        start: Option<String>,
        /// New end (ISO 8601, HH:MM or relative).
        #[arg(long)]
        end: Option<String>,
    },

    /// Delete a trace.
    Delete {
        id: String,
    },

    /// Delete every trace.
    Clear,
}

/// JSON output structure.
#[derive(Debug, Serialize)]
pub struct JsonTraces<'a> {
    pub date: NaiveDate,
    pub work_seconds: f64,
    pub break_seconds: f64,
    pub traces: Vec<&'a TimeTrace>,
}

pub fn run<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    action: &TracesAction,
    now: DateTime<Utc>,
) -> Result<()> {
    match action {
        TracesAction::List { date, json } => {
            let day = day_or_selected(engine, date.as_deref(), now)?;
            if *json {
                write_traces_json(writer, engine, day)
            } else {
                write_traces(writer, engine, day)
            }
        }
        TracesAction::Edit {
            id,
            label,
            start,
            end,
        } => {
            let id = resolve_trace(engine, id)?;
            let clock = *engine.clock();
            let edit = TraceEdit {
                label: label.clone(),
                start: start
                    .as_deref()
                    .map(|start| parse_datetime(start, now, &clock))
                    .transpose()?,
                end: end
                    .as_deref()
                    .map(|end| parse_datetime(end, now, &clock))
                    .transpose()?,
            };
            let trace = engine.edit_trace(id, edit)?;
            writeln!(
                writer,
                "Updated trace {} {}-{} ({})",
                short_id(trace.id),
                format_time(trace.start, &clock),
                format_time(trace.end, &clock),
                format_duration(trace.duration())
            )?;
            write_totals(writer, engine)
        }
        TracesAction::Delete { id } => {
            let id = resolve_trace(engine, id)?;
            engine.delete_trace(id)?;
            writeln!(writer, "Deleted trace {}", short_id(id))?;
            write_totals(writer, engine)
        }
        TracesAction::Clear => {
            let removed = engine.clear_traces();
            writeln!(writer, "Deleted {removed} traces")?;
            write_totals(writer, engine)
        }
    }
}

fn write_totals<W: Write, S: Store>(writer: &mut W, engine: &SessionEngine<S>) -> Result<()> {
    writeln!(
        writer,
        "Totals: work {}, break {}",
        format_duration(engine.work_total()),
        format_duration(engine.break_total())
    )?;
    Ok(())
}

fn day_sums<'a>(traces: impl Iterator<Item = &'a TimeTrace>) -> (f64, f64) {
    traces.fold((0.0, 0.0), |(work, rest), trace| {
        if trace.is_focus {
            (work + trace.duration(), rest)
        } else {
            (work, rest + trace.duration())
        }
    })
}

/// Writes the traces of `day` as a table.
pub fn write_traces<W: Write, S: Store>(
    writer: &mut W,
    engine: &SessionEngine<S>,
    day: NaiveDate,
) -> Result<()> {
    writeln!(writer, "TRACES {day}")?;
    writeln!(writer)?;

    let traces: Vec<&TimeTrace> = engine.traces_on(day).collect();
    if traces.is_empty() {
        writeln!(writer, "No traces recorded.")?;
        return Ok(());
    }

    let clock = engine.clock();
    writeln!(
        writer,
        "{:<8}  {:<5}  {:<5}  {:>7}  {:<5}  Label",
        "ID", "Start", "End", "Length", "Kind"
    )?;
    writeln!(
        writer,
        "────────  ─────  ─────  ───────  ─────  ──────────────────────"
    )?;
    for trace in &traces {
        let row = format!(
            "{:<8}  {:<5}  {:<5}  {:>7}  {:<5}  {}",
            short_id(trace.id),
            format_time(trace.start, clock),
            format_time(trace.end, clock),
            format_duration(trace.duration()),
            if trace.is_focus { "work" } else { "break" },
            trace.label
        );
        writeln!(writer, "{}", row.trim_end())?;
    }

    let (work, rest) = day_sums(traces.into_iter());
    writeln!(writer)?;
    writeln!(
        writer,
        "Day total: work {}, break {}",
        format_duration(work),
        format_duration(rest)
    )?;
    Ok(())
}

fn write_traces_json<W: Write, S: Store>(
    writer: &mut W,
    engine: &SessionEngine<S>,
    day: NaiveDate,
) -> Result<()> {
    let traces: Vec<&TimeTrace> = engine.traces_on(day).collect();
    let (work_seconds, break_seconds) = day_sums(traces.iter().copied());
    let output = JsonTraces {
        date: day,
        work_seconds,
        break_seconds,
        traces,
    };
    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
