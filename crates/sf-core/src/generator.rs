//! Pure schedule generators for fixed focus/break cadences.
//!
//! A generator expands `(start, end, total focus seconds)` into a run of
//! blocks and merges them into an existing day list:
//!
//! 1. Drop every existing task whose name starts with the cadence prefix.
//! 2. Alternate focus and break blocks from `start`, clipping each to `end`.
//!    The final focus block is also clipped to the focus still required, so
//!    scheduled focus totals `min(total, focus time available)`.
//! 3. Stop once the focus requirement is met or `end` is reached; no break
//!    trails the final focus block.
//!
//! Block ids are derived from name and start time, so running a generator
//! twice with the same inputs yields the same tasks.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::task::{Category, ScheduleTask};
use crate::types::{TaskId, seconds_between};

/// Focus shortfall below which the requirement counts as met.
const FOCUS_EPSILON: f64 = 1e-6;

/// A named block shape within a cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub seconds: f64,
}

/// A long break taken after every `every` focus blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongBreak {
    pub every: usize,
    pub block: BlockSpec,
}

/// A repeating focus/break pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cadence {
    /// Name prefix shared by every generated block; used for replacement.
    pub prefix: &'static str,
    pub focus: BlockSpec,
    pub short_break: BlockSpec,
    pub long_break: Option<LongBreak>,
}

/// 4 × 25-minute focus with 5-minute breaks, then a 30-minute long break.
pub const POMODORO: Cadence = Cadence {
    prefix: "Pomodoro",
    focus: BlockSpec {
        name: "Pomodoro Focus",
        label: "Pomodoro Focus Block",
        seconds: 25.0 * 60.0,
    },
    short_break: BlockSpec {
        name: "Pomodoro Break",
        label: "Pomodoro Break Block",
        seconds: 5.0 * 60.0,
    },
    long_break: Some(LongBreak {
        every: 4,
        block: BlockSpec {
            name: "Pomodoro Long Break",
            label: "Pomodoro Long Break Block",
            seconds: 30.0 * 60.0,
        },
    }),
};

/// 90-minute focus alternating with 15-minute breaks.
pub const HUBERMAN: Cadence = Cadence {
    prefix: "Huberman",
    focus: BlockSpec {
        name: "Huberman Focus",
        label: "Huberman Focus Block",
        seconds: 90.0 * 60.0,
    },
    short_break: BlockSpec {
        name: "Huberman Break",
        label: "Huberman Break Block",
        seconds: 15.0 * 60.0,
    },
    long_break: None,
};

impl Cadence {
    /// Whether `task` was produced by this cadence.
    pub fn owns(&self, task: &ScheduleTask) -> bool {
        task.name.starts_with(self.prefix)
    }

    /// Only the newly generated blocks, without merging.
    pub fn blocks(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        total_focus: f64,
    ) -> Vec<ScheduleTask> {
        let mut blocks = Vec::new();
        if !total_focus.is_finite() || total_focus <= 0.0 {
            return blocks;
        }

        let mut current = start;
        let mut done = 0.0;
        let mut since_long_break = 0;

        while total_focus - done > FOCUS_EPSILON && current < end {
            let length = self
                .focus
                .seconds
                .min(total_focus - done)
                .min(seconds_between(current, end));
            let Some(focus) = build_block(&self.focus, current, length, Category::Focus) else {
                break;
            };
            current = focus.end_time();
            done += length;
            since_long_break += 1;
            blocks.push(focus);

            if total_focus - done <= FOCUS_EPSILON || current >= end {
                break;
            }

            let spec = match self.long_break {
                Some(long) if since_long_break >= long.every => {
                    since_long_break = 0;
                    long.block
                }
                _ => self.short_break,
            };
            let length = spec.seconds.min(seconds_between(current, end));
            let Some(rest) = build_block(&spec, current, length, Category::FreeTime) else {
                break;
            };
            current = rest.end_time();
            blocks.push(rest);
        }

        blocks
    }

    /// Replaces this cadence's blocks in `existing` with a fresh run.
    ///
    /// The result is ordered by start time.
    pub fn generate(
        &self,
        existing: &[ScheduleTask],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        total_focus: f64,
    ) -> Vec<ScheduleTask> {
        let mut tasks: Vec<ScheduleTask> = existing
            .iter()
            .filter(|task| !self.owns(task))
            .cloned()
            .collect();
        tasks.extend(self.blocks(start, end, total_focus));
        tasks.sort_by_key(|task| task.start_time);
        tasks
    }
}

/// Builds one block, or `None` when its clipped length is empty.
fn build_block(
    spec: &BlockSpec,
    start: DateTime<Utc>,
    seconds: f64,
    category: Category,
) -> Option<ScheduleTask> {
    let id = TaskId::derived(&format!(
        "{}|{}",
        spec.name,
        start.to_rfc3339_opts(SecondsFormat::Micros, true)
    ));
    ScheduleTask::with_id(id, spec.name, spec.label, start, seconds, category).ok()
}

/// Merges a Pomodoro run into `existing`, replacing earlier Pomodoro blocks.
pub fn generate_pomodoro_schedule(
    existing: &[ScheduleTask],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    total_focus: f64,
) -> Vec<ScheduleTask> {
    POMODORO.generate(existing, start, end, total_focus)
}

/// Merges a Huberman run into `existing`, replacing earlier Huberman blocks.
pub fn generate_huberman_schedule(
    existing: &[ScheduleTask],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    total_focus: f64,
) -> Vec<ScheduleTask> {
    HUBERMAN.generate(existing, start, end, total_focus)
}
