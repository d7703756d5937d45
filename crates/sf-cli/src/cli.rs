//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sf_core::SessionState;

use crate::commands::plan::PlanArgs;
use crate::commands::tasks::TasksAction;
use crate::commands::traces::TracesAction;

/// Focus timer.
///
/// Tracks work and break time with tap and drag gestures, lays out Pomodoro
/// or Huberman blocks for the day, and keeps a log of every finished interval.
#[derive(Debug, Parser)]
#[command(name = "sf", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as if the current time were this (ISO 8601, HH:MM or relative).
    #[arg(long, global = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the session state, live totals and the active block.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Toggle between work and break; from idle or paused, start work.
    Tap,

    /// Pause the running work or break session.
    Pause,

    /// Resume a paused session.
    Resume,

    /// Apply a vertical drag: positive pauses, negative resumes.
    Drag {
        /// Drag distance in points; must exceed the threshold to count.
        #[arg(long, allow_hyphen_values = true)]
        dy: f64,
    },

    /// Move directly to a session state (none, work, break, paused).
    Transition {
        /// Target state.
        state: SessionState,
    },

    /// Close the open bucket into a trace without changing state.
    Close,

    /// Zero the totals and go idle, discarding the open bucket.
    Reset,

    /// Change the selected day (YYYY-MM-DD, today, yesterday, tomorrow).
    SelectDate {
        /// Day to select.
        date: String,
    },

    /// Generate a Pomodoro or Huberman schedule.
    Plan(PlanArgs),

    /// Manage scheduled blocks.
    #[command(subcommand)]
    Tasks(TasksAction),

    /// Inspect and edit finished intervals.
    #[command(subcommand)]
    Traces(TracesAction),

    /// Run the 1 Hz ticker until interrupted.
    Run {
        /// Close the open bucket into a trace on exit.
        #[arg(long)]
        close_on_exit: bool,
    },
}
