//! Resolving which block is active at an instant.

use chrono::{DateTime, Utc};

use crate::task::ScheduleTask;

/// The block whose `[start, end)` interval contains `at`.
///
/// When blocks overlap the most recently started one wins, so a manual
/// focus block started "now" supersedes a generated block underneath it.
/// Among equal start times the later entry in `tasks` wins.
pub fn active_block<'a>(
    tasks: impl IntoIterator<Item = &'a ScheduleTask>,
    at: DateTime<Utc>,
) -> Option<&'a ScheduleTask> {
    tasks
        .into_iter()
        .filter(|task| task.contains(at))
        .max_by_key(|task| task.start_time)
}
