//! Scheduled blocks on the day timeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TaskId, ValidationError, add_seconds, validate_duration};

/// Name given to blocks started by a tap or drag gesture.
pub const MANUAL_FOCUS_NAME: &str = "ManualFocus";

/// Label given to blocks started by a tap or drag gesture.
pub const MANUAL_FOCUS_LABEL: &str = "Manual Focus Block";

/// Provisional length of a freshly started manual focus block (12 hours).
///
/// The block is clamped to the real elapsed time on every tick and when the
/// work session ends.
pub const PROVISIONAL_MANUAL_FOCUS_SECS: f64 = 12.0 * 60.0 * 60.0;

/// What a block is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Focus,
    Admin,
    FreeTime,
    ManualFocus,
}

impl Category {
    /// Human-readable name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::Admin => "Admin",
            Self::FreeTime => "Free Time",
            Self::ManualFocus => "Manual Focus",
        }
    }

    /// Whether time in this block counts as focus.
    pub const fn is_focus(&self) -> bool {
        matches!(self, Self::Focus | Self::ManualFocus)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "focus" => Ok(Self::Focus),
            "admin" => Ok(Self::Admin),
            "freetime" | "break" => Ok(Self::FreeTime),
            "manualfocus" => Ok(Self::ManualFocus),
            _ => Err(ValidationError::InvalidCategory {
                value: s.to_string(),
            }),
        }
    }
}

/// A planned block of time.
///
/// The duration is always positive and finite; every constructor, mutator
/// and the deserializer enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct ScheduleTask {
    pub id: TaskId,
    /// Machine-facing name; generators match on its prefix.
    pub name: String,
    /// User-facing label.
    pub label: String,
    pub start_time: DateTime<Utc>,
    duration: f64,
    pub category: Category,
}

impl ScheduleTask {
    /// Creates a task with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: f64,
        category: Category,
    ) -> Result<Self, ValidationError> {
        Self::with_id(TaskId::new(), name, label, start_time, duration, category)
    }

    /// Creates a task with a caller-chosen identifier.
    pub fn with_id(
        id: TaskId,
        name: impl Into<String>,
        label: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: f64,
        category: Category,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: name.into(),
            label: label.into(),
            start_time,
            duration: validate_duration(duration)?,
            category,
        })
    }

    /// An open-ended manual focus block starting at `start_time`.
    pub fn manual_focus(start_time: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            name: MANUAL_FOCUS_NAME.to_string(),
            label: MANUAL_FOCUS_LABEL.to_string(),
            start_time,
            duration: PROVISIONAL_MANUAL_FOCUS_SECS,
            category: Category::ManualFocus,
        }
    }

    /// Duration in seconds.
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Replaces the duration, rejecting non-positive or non-finite values.
    pub fn set_duration(&mut self, seconds: f64) -> Result<(), ValidationError> {
        self.duration = validate_duration(seconds)?;
        Ok(())
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        add_seconds(self.start_time, self.duration)
    }

    /// Whether `at` falls in the half-open interval `[start_time, end_time)`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at < self.end_time()
    }

    pub fn is_manual_focus(&self) -> bool {
        self.category == Category::ManualFocus
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    name: String,
    #[serde(default)]
    label: String,
    start_time: DateTime<Utc>,
    duration: f64,
    category: Category,
}

impl TryFrom<TaskRecord> for ScheduleTask {
    type Error = ValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Self::with_id(
            record.id,
            record.name,
            record.label,
            record.start_time,
            record.duration,
            record.category,
        )
    }
}
