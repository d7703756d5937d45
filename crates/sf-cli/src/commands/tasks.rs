//! Tasks command for listing and editing scheduled blocks.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use sf_core::{Category, ScheduleTask, SessionEngine, Store};

use super::util::{format_duration, format_time, parse_date, parse_datetime, resolve_task, short_id};

#[derive(Debug, Subcommand)]
pub enum TasksAction {
    /// List the blocks of a day (the selected day by default).
    List {
        /// Day to list (YYYY-MM-DD, today, yesterday, tomorrow).
        #[arg(long)]
        date: Option<String>,
    },

    /// Add a block.
    Add {
        /// Machine-facing name.
        #[arg(long)]
        name: String,
        /// Label shown to the user; defaults to the name.
        #[arg(long)]
        label: Option<String>,
        /// Start time (ISO 8601, HH:MM or relative).
        #[arg(long)]
        start: String,
        /// Length in minutes.
        #[arg(long)]
        minutes: f64,
        /// focus, admin, free-time or manual-focus.
        #[arg(long, default_value = "focus")]
        category: Category,
    },

    /// Remove a block by id or unique id prefix.
    Remove {
        id: String,
    },

    /// Change a block's label.
    Label {
        id: String,
        label: String,
    },

    /// Change a block's length.
    Duration {
        id: String,
        /// New length in minutes.
        #[arg(long)]
        minutes: f64,
    },

    /// Remove focus, manual focus and free-time blocks of a day; admin blocks stay.
    Clear {
        /// Day to clear (the selected day by default).
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run<W: Write, S: Store>(
    writer: &mut W,
    engine: &mut SessionEngine<S>,
    action: &TasksAction,
    now: DateTime<Utc>,
) -> Result<()> {
    match action {
        TasksAction::List { date } => {
            let day = day_or_selected(engine, date.as_deref(), now)?;
            write_tasks(writer, engine, day)
        }
        TasksAction::Add {
            name,
            label,
            start,
            minutes,
            category,
        } => {
            let start = parse_datetime(start, now, engine.clock())?;
            let task = ScheduleTask::new(
                name.as_str(),
                label.as_deref().unwrap_or(name),
                start,
                minutes * 60.0,
                *category,
            )
            .context("invalid block")?;
            let id = engine.add_task(task);
            writeln!(writer, "Added block {}", short_id(id))?;
            Ok(())
        }
        TasksAction::Remove { id } => {
            let id = resolve_task(engine, id)?;
            let task = engine.remove_task(id)?;
            writeln!(writer, "Removed block {} ({})", short_id(id), task.label)?;
            Ok(())
        }
        TasksAction::Label { id, label } => {
            let label = label.trim();
            if label.is_empty() {
                bail!("label cannot be empty");
            }
            let id = resolve_task(engine, id)?;
            engine.set_task_label(id, label)?;
            writeln!(writer, "Relabeled block {} as {label}", short_id(id))?;
            Ok(())
        }
        TasksAction::Duration { id, minutes } => {
            let id = resolve_task(engine, id)?;
            engine
                .set_task_duration(id, minutes * 60.0)
                .context("invalid duration")?;
            writeln!(
                writer,
                "Block {} now lasts {}",
                short_id(id),
                format_duration(minutes * 60.0)
            )?;
            Ok(())
        }
        TasksAction::Clear { date } => {
            let day = day_or_selected(engine, date.as_deref(), now)?;
            let removed = engine.clear_blocks(day);
            writeln!(writer, "Cleared {removed} blocks on {day}")?;
            Ok(())
        }
    }
}

pub fn day_or_selected<S: Store>(
    engine: &SessionEngine<S>,
    date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<NaiveDate> {
    date.map_or(Ok(engine.selected_date()), |date| {
        parse_date(date, now, engine.clock())
    })
}

/// Writes the blocks of `day` as a table.
pub fn write_tasks<W: Write, S: Store>(
    writer: &mut W,
    engine: &SessionEngine<S>,
    day: NaiveDate,
) -> Result<()> {
    let tasks = engine.tasks_for(day);
    writeln!(writer, "BLOCKS {day}")?;
    writeln!(writer)?;

    if tasks.is_empty() {
        writeln!(writer, "No blocks scheduled.")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Hint: Run 'sf plan pomodoro --start 09:00 --end 12:00 --hours 2' to lay out a morning."
        )?;
        return Ok(());
    }

    let clock = engine.clock();
    writeln!(
        writer,
        "{:<8}  {:<5}  {:<5}  {:>7}  {:<12}  Label",
        "ID", "Start", "End", "Length", "Category"
    )?;
    writeln!(
        writer,
        "────────  ─────  ─────  ───────  ────────────  ──────────────────────"
    )?;
    for task in tasks {
        let row = format!(
            "{:<8}  {:<5}  {:<5}  {:>7}  {:<12}  {}",
            short_id(task.id),
            format_time(task.start_time, clock),
            format_time(task.end_time(), clock),
            format_duration(task.duration()),
            task.category.as_str(),
            task.label
        );
        writeln!(writer, "{}", row.trim_end())?;
    }
    Ok(())
}
