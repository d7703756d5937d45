//! Calendar-day normalization and the per-day schedule.
//!
//! Every read and write of the schedule goes through [`DayClock::day_of`],
//! so a task is always filed under the local calendar day of its start time.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};

use crate::task::ScheduleTask;
use crate::types::TaskId;

/// Maps instants to calendar days in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClock {
    offset: FixedOffset,
}

impl DayClock {
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Days are UTC calendar days.
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Days follow the machine's current local offset.
    pub fn local() -> Self {
        Self::new(Local::now().offset().fix())
    }

    /// Builds a clock from an offset in minutes east of UTC.
    ///
    /// Returns `None` when the offset is out of range (more than a day).
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The normalized calendar day containing `at`.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        self.to_local(at).date_naive()
    }

    /// `at` expressed in this clock's offset.
    pub fn to_local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset)
    }
}

impl Default for DayClock {
    fn default() -> Self {
        Self::utc()
    }
}

/// Scheduled blocks grouped by calendar day.
///
/// Each day's list is kept ordered by start time; blocks with equal start
/// times keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBook {
    clock: DayClock,
    days: BTreeMap<NaiveDate, Vec<ScheduleTask>>,
}

impl ScheduleBook {
    pub fn new(clock: DayClock) -> Self {
        Self {
            clock,
            days: BTreeMap::new(),
        }
    }

    /// Builds a book from tasks in any order, filing each by its start day.
    pub fn from_tasks(clock: DayClock, tasks: impl IntoIterator<Item = ScheduleTask>) -> Self {
        let mut book = Self::new(clock);
        for task in tasks {
            book.insert(task);
        }
        book
    }

    pub const fn clock(&self) -> &DayClock {
        &self.clock
    }

    /// Tasks filed under `day`, ordered by start time.
    pub fn tasks_for(&self, day: NaiveDate) -> &[ScheduleTask] {
        self.days.get(&day).map_or(&[], Vec::as_slice)
    }

    /// All tasks across all days, ordered by day then start time.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduleTask> {
        self.days.values().flatten()
    }

    /// Files a task under the day of its start time.
    pub fn insert(&mut self, task: ScheduleTask) {
        let day = self.clock.day_of(task.start_time);
        let tasks = self.days.entry(day).or_default();
        let index = tasks.partition_point(|existing| existing.start_time <= task.start_time);
        tasks.insert(index, task);
    }

    /// Replaces everything filed under `day` with `tasks`.
    ///
    /// Tasks starting on another day are filed under their own day instead.
    pub fn replace_day(&mut self, day: NaiveDate, tasks: Vec<ScheduleTask>) {
        self.days.remove(&day);
        for task in tasks {
            self.insert(task);
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&ScheduleTask> {
        self.iter().find(|task| task.id == id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut ScheduleTask> {
        self.days
            .values_mut()
            .flatten()
            .find(|task| task.id == id)
    }

    /// Removes a task by id wherever it is filed.
    pub fn remove(&mut self, id: TaskId) -> Option<ScheduleTask> {
        let (day, index) = self.days.iter().find_map(|(day, tasks)| {
            tasks
                .iter()
                .position(|task| task.id == id)
                .map(|index| (*day, index))
        })?;
        let tasks = self.days.get_mut(&day)?;
        let removed = tasks.remove(index);
        if tasks.is_empty() {
            self.days.remove(&day);
        }
        Some(removed)
    }

    /// Removes every task on `day` matching `predicate`, returning how many went.
    pub fn remove_where(
        &mut self,
        day: NaiveDate,
        predicate: impl Fn(&ScheduleTask) -> bool,
    ) -> usize {
        let Some(tasks) = self.days.get_mut(&day) else {
            return 0;
        };
        let before = tasks.len();
        tasks.retain(|task| !predicate(task));
        let removed = before - tasks.len();
        if tasks.is_empty() {
            self.days.remove(&day);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::task::Category;

    fn task_at(start: DateTime<Utc>, name: &str) -> ScheduleTask {
        ScheduleTask::new(name, name, start, 600.0, Category::Focus).unwrap()
    }

    #[test]
    fn day_of_respects_offset() {
        let late = Utc.with_ymd_and_hms(2026, 3, 2, 23, 30, 0).unwrap();
        assert_eq!(
            DayClock::utc().day_of(late),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
        let east = DayClock::from_offset_minutes(60).unwrap();
        assert_eq!(east.day_of(late), NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert!(DayClock::from_offset_minutes(25 * 60).is_none());
    }

    #[test]
    fn insert_keeps_day_sorted_by_start() {
        let mut book = ScheduleBook::new(DayClock::utc());
        let nine = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let eight = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        book.insert(task_at(nine, "b"));
        book.insert(task_at(eight, "a"));
        book.insert(task_at(nine, "c"));

        let names: Vec<_> = book
            .tasks_for(nine.date_naive())
            .iter()
            .map(|task| task.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn replace_day_refiles_tasks_on_other_days() {
        let mut book = ScheduleBook::new(DayClock::utc());
        let today = Utc.with_ymd_and_hms(2026, 3, 2, 23, 0, 0).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2026, 3, 3, 0, 15, 0).unwrap();
        book.insert(task_at(today, "old"));

        book.replace_day(
            today.date_naive(),
            vec![task_at(today, "new"), task_at(tomorrow, "spill")],
        );

        assert_eq!(book.tasks_for(today.date_naive()).len(), 1);
        assert_eq!(book.tasks_for(today.date_naive())[0].name, "new");
        assert_eq!(book.tasks_for(tomorrow.date_naive())[0].name, "spill");
    }

    #[test]
    fn remove_finds_task_on_any_day() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let task = task_at(start, "gone");
        let id = task.id;
        let mut book = ScheduleBook::from_tasks(DayClock::utc(), [task]);

        assert_eq!(book.remove(id).map(|task| task.name), Some("gone".to_string()));
        assert!(book.remove(id).is_none());
        assert_eq!(book.iter().count(), 0);
    }
}
