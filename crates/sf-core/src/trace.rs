//! Finalized work and break intervals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::day::DayClock;
use crate::error::SessionError;
use crate::types::{TraceId, ValidationError, seconds_between};

/// A closed interval of work or break time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrace {
    pub id: TraceId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `true` for work, `false` for break.
    pub is_focus: bool,
    /// What was done, as entered by the user.
    #[serde(default)]
    pub label: String,
}

impl TimeTrace {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, is_focus: bool) -> Self {
        Self {
            id: TraceId::new(),
            start,
            end,
            is_focus,
            label: String::new(),
        }
    }

    /// Length in seconds; never negative.
    pub fn duration(&self) -> f64 {
        seconds_between(self.start, self.end).max(0.0)
    }
}

/// Changes requested through the trace editor. `None` keeps the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceEdit {
    pub label: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Append-only (except for explicit user edits) history of closed buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceLog {
    traces: Vec<TimeTrace>,
}

impl TraceLog {
    pub const fn new() -> Self {
        Self { traces: Vec::new() }
    }

    pub fn from_traces(traces: Vec<TimeTrace>) -> Self {
        Self { traces }
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeTrace> {
        self.traces.iter()
    }

    pub fn last(&self) -> Option<&TimeTrace> {
        self.traces.last()
    }

    pub fn get(&self, id: TraceId) -> Option<&TimeTrace> {
        self.traces.iter().find(|trace| trace.id == id)
    }

    pub(crate) fn append(&mut self, trace: TimeTrace) {
        self.traces.push(trace);
    }

    /// Applies an edit, keeping the trace's id.
    ///
    /// The edited trace must not end before it starts; on error the trace is
    /// left untouched.
    pub(crate) fn edit(
        &mut self,
        id: TraceId,
        edit: TraceEdit,
    ) -> Result<&TimeTrace, SessionError> {
        let trace = self
            .traces
            .iter_mut()
            .find(|trace| trace.id == id)
            .ok_or(SessionError::TraceNotFound(id))?;

        let start = edit.start.unwrap_or(trace.start);
        let end = edit.end.unwrap_or(trace.end);
        if end < start {
            return Err(ValidationError::TraceEndsBeforeStart { start, end }.into());
        }

        trace.start = start;
        trace.end = end;
        if let Some(label) = edit.label {
            trace.label = label;
        }
        Ok(&*trace)
    }

    pub(crate) fn remove(&mut self, id: TraceId) -> Result<TimeTrace, SessionError> {
        let index = self
            .traces
            .iter()
            .position(|trace| trace.id == id)
            .ok_or(SessionError::TraceNotFound(id))?;
        Ok(self.traces.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.traces.clear();
    }

    /// Traces starting on `day`, in recorded order.
    pub fn on_day<'a>(
        &'a self,
        day: NaiveDate,
        clock: &'a DayClock,
    ) -> impl Iterator<Item = &'a TimeTrace> + 'a {
        self.traces
            .iter()
            .filter(move |trace| clock.day_of(trace.start) == day)
    }

    /// Sums `(work, break)` seconds over traces starting at or after `since`.
    pub fn totals_since(&self, since: Option<DateTime<Utc>>) -> (f64, f64) {
        self.traces
            .iter()
            .filter(|trace| since.is_none_or(|since| trace.start >= since))
            .fold((0.0, 0.0), |(work, rest), trace| {
                if trace.is_focus {
                    (work + trace.duration(), rest)
                } else {
                    (work, rest + trace.duration())
                }
            })
    }
}

impl<'a> IntoIterator for &'a TraceLog {
    type Item = &'a TimeTrace;
    type IntoIter = std::slice::Iter<'a, TimeTrace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}
