//! Durable serialization of engine state.
//!
//! Snapshots and trace logs are stored as JSON blobs. Timestamps use RFC 3339
//! with full sub-second precision so trace boundaries survive a round trip.
//!
//! Fields added after the first snapshot format are `#[serde(default)]`, so
//! older blobs still load.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionState;
use crate::task::ScheduleTask;
use crate::trace::TraceLog;
use crate::types::TaskId;

/// Everything needed to resume a session after relaunch, except traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub session_state: SessionState,
    pub running_bucket: SessionState,
    pub bucket_start: Option<DateTime<Utc>>,
    pub work_total: f64,
    pub break_total: f64,
    /// Tasks of the selected day.
    pub scheduled_tasks: Vec<ScheduleTask>,
    pub selected_date: NaiveDate,
    /// Instant of the last hard reset; totals are derived from traces after it.
    #[serde(default)]
    pub totals_since: Option<DateTime<Utc>>,
    /// State to resume into after a drag-pause.
    #[serde(default)]
    pub previous_state: Option<SessionState>,
    /// Tasks of every other day.
    #[serde(default)]
    pub other_tasks: Vec<ScheduleTask>,
    /// Active block seen by the last auto-switch evaluation.
    #[serde(default)]
    pub auto_switch_block: Option<TaskId>,
    /// Manual focus block stretched by the running work session.
    #[serde(default)]
    pub open_manual_focus: Option<TaskId>,
}

impl Snapshot {
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(blob: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(blob)
    }
}

pub fn encode_traces(traces: &TraceLog) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(traces)
}

pub fn decode_traces(blob: &[u8]) -> Result<TraceLog, serde_json::Error> {
    serde_json::from_slice(blob)
}
