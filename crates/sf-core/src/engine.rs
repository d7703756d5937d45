//! The session engine.
//!
//! [`SessionEngine`] owns the session state, the open bucket, the running
//! totals, the trace log and the per-day schedule. Every operation takes
//! `&mut self` and finishes synchronously, so a transition can never
//! interleave with a tick.
//!
//! Operations that depend on the current time come in pairs: `op()` reads the
//! system clock and delegates to `op_at(now)`, which tests drive directly.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::active::active_block;
use crate::day::{DayClock, ScheduleBook};
use crate::error::SessionError;
use crate::generator::{Cadence, HUBERMAN, POMODORO};
use crate::session::{BucketKind, OpenBucket, SessionState};
use crate::snapshot::{Snapshot, decode_traces, encode_traces};
use crate::store::{SNAPSHOT_KEY, Store, TRACES_KEY};
use crate::task::{Category, ScheduleTask};
use crate::trace::{TimeTrace, TraceEdit, TraceLog};
use crate::types::{TaskId, TraceId, seconds_between};

/// Vertical drag distance, in points, a gesture must exceed to count.
pub const DRAG_THRESHOLD: f64 = 24.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Follow the schedule: entering a focus block starts work, entering a
    /// free-time block starts a break.
    pub auto_switch: bool,
    pub clock: DayClock,
}

/// Result of a user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Applied { from: SessionState, to: SessionState },
    /// The gesture had no meaning in the current state; nothing changed.
    Ignored,
}

/// What a tick did, plus the live totals it observed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Manual focus block whose duration was stretched to `now`.
    pub extended: Option<TaskId>,
    /// State entered by auto-switch.
    pub switched_to: Option<SessionState>,
    pub live_work: f64,
    pub live_break: f64,
}

#[derive(Debug)]
pub struct SessionEngine<S> {
    store: S,
    config: EngineConfig,
    state: SessionState,
    bucket: Option<OpenBucket>,
    work_total: f64,
    break_total: f64,
    totals_since: Option<DateTime<Utc>>,
    previous_state: Option<SessionState>,
    book: ScheduleBook,
    selected_date: NaiveDate,
    traces: TraceLog,
    auto_switch_block: Option<TaskId>,
    /// Manual focus block started with the current work session.
    open_manual: Option<TaskId>,
}

impl<S: Store> SessionEngine<S> {
    /// A fresh, idle engine. Nothing is read from or written to `store`.
    pub fn new(store: S, config: EngineConfig, now: DateTime<Utc>) -> Self {
        Self {
            store,
            config,
            state: SessionState::None,
            bucket: None,
            work_total: 0.0,
            break_total: 0.0,
            totals_since: None,
            previous_state: None,
            book: ScheduleBook::new(config.clock),
            selected_date: config.clock.day_of(now),
            traces: TraceLog::new(),
            auto_switch_block: None,
            open_manual: None,
        }
    }

    /// Rebuilds the engine from whatever `store` holds.
    ///
    /// Missing, unreadable or malformed blobs fall back to defaults. A bucket
    /// start in the future is clamped to `now`; totals are never adjusted.
    pub fn restore(store: S, config: EngineConfig, now: DateTime<Utc>) -> Self {
        let mut engine = Self::new(store, config, now);
        if let Some(snapshot) = engine.load_snapshot() {
            engine.apply_snapshot(snapshot, now);
        }
        if let Some(traces) = engine.load_traces() {
            engine.traces = traces;
        }
        debug!(
            state = %engine.state,
            traces = engine.traces.len(),
            tasks = engine.book.iter().count(),
            "restored session"
        );
        engine
    }

    fn load_snapshot(&self) -> Option<Snapshot> {
        let blob = match self.store.load_snapshot(SNAPSHOT_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to load session snapshot, starting fresh");
                return None;
            }
        };
        Snapshot::decode(&blob)
            .inspect_err(|err| warn!(error = %err, "malformed session snapshot, starting fresh"))
            .ok()
    }

    fn load_traces(&self) -> Option<TraceLog> {
        let blob = match self.store.load_traces(TRACES_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to load trace log, starting empty");
                return None;
            }
        };
        decode_traces(&blob)
            .inspect_err(|err| warn!(error = %err, "malformed trace log, starting empty"))
            .ok()
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot, now: DateTime<Utc>) {
        self.state = snapshot.session_state;
        self.work_total = sanitize_total(snapshot.work_total, "work");
        self.break_total = sanitize_total(snapshot.break_total, "break");
        self.totals_since = snapshot.totals_since;
        self.previous_state = snapshot.previous_state;
        self.selected_date = snapshot.selected_date;
        self.auto_switch_block = snapshot.auto_switch_block;
        self.open_manual = snapshot
            .open_manual_focus
            .filter(|_| snapshot.session_state == SessionState::Work);
        self.book = ScheduleBook::from_tasks(
            self.config.clock,
            snapshot.scheduled_tasks.into_iter().chain(snapshot.other_tasks),
        );

        self.bucket = match (snapshot.session_state.bucket_kind(), snapshot.bucket_start) {
            (Some(kind), Some(start)) if start > now => {
                warn!(%start, %now, "bucket start is in the future, clamping to now");
                Some(OpenBucket::new(kind, now))
            }
            (Some(kind), Some(start)) => Some(OpenBucket::new(kind, start)),
            (None, Some(start)) => {
                warn!(
                state = %self.state,
                %start,
                "bucket open outside a timed session, discarding"
            );
                None
            }
            (_, None) => None,
        };
    }

    pub const fn clock(&self) -> &DayClock {
        &self.config.clock
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The state whose bucket is open, or `None` when nothing is timed.
    pub fn running_bucket(&self) -> SessionState {
        self.bucket
            .map_or(SessionState::None, |bucket| bucket.kind.state())
    }

    pub fn bucket_start(&self) -> Option<DateTime<Utc>> {
        self.bucket.map(|bucket| bucket.start)
    }

    /// Closed work seconds, excluding the open bucket.
    pub const fn work_total(&self) -> f64 {
        self.work_total
    }

    /// Closed break seconds, excluding the open bucket.
    pub const fn break_total(&self) -> f64 {
        self.break_total
    }

    pub const fn totals_since(&self) -> Option<DateTime<Utc>> {
        self.totals_since
    }

    /// State a drag-up will resume into.
    pub const fn previous_state(&self) -> Option<SessionState> {
        self.previous_state
    }

    pub const fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub const fn traces(&self) -> &TraceLog {
        &self.traces
    }

    pub fn traces_on(&self, day: NaiveDate) -> impl Iterator<Item = &TimeTrace> {
        self.traces.on_day(day, &self.config.clock)
    }

    pub fn tasks_for(&self, day: NaiveDate) -> &[ScheduleTask] {
        self.book.tasks_for(day)
    }

    pub fn selected_tasks(&self) -> &[ScheduleTask] {
        self.book.tasks_for(self.selected_date)
    }

    /// Every scheduled task, ordered by day then start time.
    pub fn tasks(&self) -> impl Iterator<Item = &ScheduleTask> {
        self.book.iter()
    }

    pub fn task(&self, id: TaskId) -> Option<&ScheduleTask> {
        self.book.get(id)
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn transition(&mut self, to: SessionState) {
        self.transition_at(to, Utc::now());
    }

    /// Moves to `to`, closing the open bucket first.
    ///
    /// Entering a timed state opens a new bucket at `now`, including when
    /// `to` equals the current state. Leaving work trims the open manual
    /// focus block to the time spent.
    pub fn transition_at(&mut self, to: SessionState, now: DateTime<Utc>) {
        let from = self.state;
        if from == SessionState::Work && to != SessionState::Work {
            self.finalize_manual_focus(now);
        }
        if from.is_timed() {
            self.flush_bucket(now);
        }
        self.state = to;
        self.bucket = to.bucket_kind().map(|kind| OpenBucket::new(kind, now));
        debug!(%from, %to, "session transition");
        self.persist();
    }

    pub fn close_current_trace(&mut self) -> Option<TraceId> {
        self.close_current_trace_at(Utc::now())
    }

    /// Closes the open bucket into the totals and the trace log.
    ///
    /// Returns the new trace's id, or `None` when no bucket was open. The
    /// session state is left as is.
    pub fn close_current_trace_at(&mut self, now: DateTime<Utc>) -> Option<TraceId> {
        let id = self.flush_bucket(now)?;
        self.persist();
        Some(id)
    }

    fn flush_bucket(&mut self, now: DateTime<Utc>) -> Option<TraceId> {
        let bucket = self.bucket.take()?;
        let end = if now < bucket.start {
            warn!(
                start = %bucket.start,
                %now,
                "clock moved behind the open bucket, closing it empty"
            );
            bucket.start
        } else {
            now
        };

        let elapsed = seconds_between(bucket.start, end);
        match bucket.kind {
            BucketKind::Work => self.work_total += elapsed,
            BucketKind::Break => self.break_total += elapsed,
        }

        let trace = TimeTrace::new(bucket.start, end, bucket.kind == BucketKind::Work);
        let id = trace.id;
        debug!(trace = %id, kind = ?bucket.kind, elapsed, "closed bucket");
        self.traces.append(trace);
        self.save_traces();
        Some(id)
    }

    pub fn live_work_total(&self) -> f64 {
        self.live_work_total_at(Utc::now())
    }

    pub fn live_break_total(&self) -> f64 {
        self.live_break_total_at(Utc::now())
    }

    /// Closed work plus the running work bucket; never negative.
    pub fn live_work_total_at(&self, now: DateTime<Utc>) -> f64 {
        self.live_total(BucketKind::Work, now)
    }

    /// Closed break plus the running break bucket; never negative.
    pub fn live_break_total_at(&self, now: DateTime<Utc>) -> f64 {
        self.live_total(BucketKind::Break, now)
    }

    fn live_total(&self, kind: BucketKind, now: DateTime<Utc>) -> f64 {
        let (closed, label) = match kind {
            BucketKind::Work => (self.work_total, "work"),
            BucketKind::Break => (self.break_total, "break"),
        };
        let running = match self.bucket {
            Some(bucket) if bucket.kind == kind && self.state == kind.state() => {
                let elapsed = seconds_between(bucket.start, now);
                if elapsed < 0.0 {
                    warn!(start = %bucket.start, %now, "bucket starts in the future, ignoring it");
                    0.0
                } else {
                    elapsed
                }
            }
            _ => 0.0,
        };
        sanitize_total(closed + running, label)
    }

    pub fn tap(&mut self) -> GestureOutcome {
        self.tap_at(Utc::now())
    }

    /// Toggles between work and break; from idle or paused, starts work.
    ///
    /// Starting work opens a manual focus block at `now`; leaving work
    /// trims it to the time actually spent (see [`Self::transition_at`]).
    pub fn tap_at(&mut self, now: DateTime<Utc>) -> GestureOutcome {
        let from = self.state;
        let to = match from {
            SessionState::Work => SessionState::BreakSession,
            SessionState::None | SessionState::BreakSession | SessionState::Paused => {
                self.start_manual_focus(now);
                SessionState::Work
            }
        };
        self.previous_state = None;
        self.transition_at(to, now);
        self.acknowledge_active_block(now);
        GestureOutcome::Applied { from, to }
    }

    pub fn drag(&mut self, dy: f64) -> GestureOutcome {
        self.drag_at(dy, Utc::now())
    }

    /// Dragging down past the threshold pauses; dragging up resumes.
    pub fn drag_at(&mut self, dy: f64, now: DateTime<Utc>) -> GestureOutcome {
        if dy > DRAG_THRESHOLD {
            self.pause_at(now)
        } else if dy < -DRAG_THRESHOLD {
            self.resume_at(now)
        } else {
            debug!(dy, state = %self.state, "drag below threshold, cancelled");
            GestureOutcome::Ignored
        }
    }

    /// Pauses a running work or break session, remembering which it was.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> GestureOutcome {
        let from = self.state;
        if !from.is_timed() {
            debug!(state = %from, "nothing running to pause");
            return GestureOutcome::Ignored;
        }
        self.previous_state = Some(from);
        self.transition_at(SessionState::Paused, now);
        self.acknowledge_active_block(now);
        GestureOutcome::Applied {
            from,
            to: SessionState::Paused,
        }
    }

    /// Resumes a paused session into the remembered state, work by default.
    pub fn resume_at(&mut self, now: DateTime<Utc>) -> GestureOutcome {
        let from = self.state;
        if from != SessionState::Paused {
            debug!(state = %from, "not paused, nothing to resume");
            return GestureOutcome::Ignored;
        }
        let to = self
            .previous_state
            .take()
            .filter(SessionState::is_timed)
            .unwrap_or(SessionState::Work);
        if to == SessionState::Work {
            self.start_manual_focus(now);
        }
        self.transition_at(to, now);
        self.acknowledge_active_block(now);
        GestureOutcome::Applied { from, to }
    }

    fn start_manual_focus(&mut self, now: DateTime<Utc>) {
        let task = ScheduleTask::manual_focus(now);
        debug!(task = %task.id, start = %now, "started manual focus block");
        self.open_manual = Some(task.id);
        self.book.insert(task);
    }

    /// The manual focus block stretched by the running work session.
    ///
    /// Restarting work in place keeps the block open; it only closes when
    /// work ends.
    pub fn open_manual_focus_at(&self, now: DateTime<Utc>) -> Option<&ScheduleTask> {
        if self.state != SessionState::Work {
            return None;
        }
        self.open_manual
            .and_then(|id| self.book.get(id))
            .filter(|task| task.start_time <= now)
    }

    fn stretch_manual_focus(&mut self, now: DateTime<Utc>) -> Option<TaskId> {
        let id = self.open_manual_focus_at(now)?.id;
        let task = self.book.get_mut(id)?;
        let elapsed = seconds_between(task.start_time, now);
        task.set_duration(elapsed).ok()?;
        Some(id)
    }

    /// Trims the open manual focus block to the elapsed time, dropping it if
    /// no time elapsed.
    fn finalize_manual_focus(&mut self, now: DateTime<Utc>) {
        let Some(id) = self.open_manual.take() else {
            return;
        };
        let Some(task) = self.book.get_mut(id) else {
            return;
        };
        let elapsed = seconds_between(task.start_time, now);
        if task.set_duration(elapsed).is_ok() {
            debug!(task = %id, elapsed, "finalized manual focus block");
        } else {
            self.book.remove(id);
            debug!(task = %id, "dropped empty manual focus block");
        }
    }

    /// The block the user is in at `now`.
    ///
    /// Looks at today and the previous day, so a block crossing midnight is
    /// still found. The open manual focus block counts as active from its
    /// start regardless of its current duration.
    pub fn active_block_at(&self, now: DateTime<Utc>) -> Option<&ScheduleTask> {
        let today = self.config.clock.day_of(now);
        let yesterday = today
            .pred_opt()
            .map(|day| self.book.tasks_for(day))
            .unwrap_or_default();
        let scheduled = active_block(yesterday.iter().chain(self.book.tasks_for(today)), now);
        let open = self.open_manual_focus_at(now);
        [scheduled, open]
            .into_iter()
            .flatten()
            .max_by_key(|task| task.start_time)
    }

    fn acknowledge_active_block(&mut self, now: DateTime<Utc>) {
        self.auto_switch_block = self.active_block_at(now).map(|task| task.id);
    }

    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Utc::now())
    }

    /// Periodic update: stretches the open manual focus block and, when
    /// enabled, follows the schedule into work or break.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> TickReport {
        let extended = self.stretch_manual_focus(now);
        let mut dirty = extended.is_some();
        let switched_to = if self.config.auto_switch {
            self.auto_switch(now, &mut dirty)
        } else {
            None
        };
        if dirty {
            self.persist();
        }
        TickReport {
            extended,
            switched_to,
            live_work: self.live_work_total_at(now),
            live_break: self.live_break_total_at(now),
        }
    }

    fn auto_switch(&mut self, now: DateTime<Utc>, dirty: &mut bool) -> Option<SessionState> {
        let (block, category) = self
            .active_block_at(now)
            .map(|task| (task.id, task.category))
            .unzip();
        if block == self.auto_switch_block {
            return None;
        }
        self.auto_switch_block = block;
        *dirty = true;

        let target = match category? {
            Category::Focus | Category::ManualFocus => SessionState::Work,
            Category::FreeTime => SessionState::BreakSession,
            Category::Admin => return None,
        };
        if self.state == target || self.state == SessionState::Paused {
            return None;
        }
        debug!(block = ?block, %target, "auto-switching with the schedule");
        self.transition_at(target, now);
        Some(target)
    }

    /// Lays a Pomodoro run over the day of `start`, replacing earlier
    /// Pomodoro blocks of that day. Returns the number of blocks generated.
    pub fn generate_pomodoro_at(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        total_focus: f64,
    ) -> usize {
        self.apply_cadence(&POMODORO, start, end, total_focus)
    }

    /// Lays a Huberman run over the day of `start`, replacing earlier
    /// Huberman blocks of that day. Returns the number of blocks generated.
    pub fn generate_huberman_at(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        total_focus: f64,
    ) -> usize {
        self.apply_cadence(&HUBERMAN, start, end, total_focus)
    }

    fn apply_cadence(
        &mut self,
        cadence: &Cadence,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        total_focus: f64,
    ) -> usize {
        let day = self.config.clock.day_of(start);
        // A run crossing midnight files its later blocks under the next days.
        let last = self.config.clock.day_of(end).max(day);
        for later in day.iter_days().skip(1).take_while(|later| *later <= last) {
            self.book.remove_where(later, |task| cadence.owns(task));
        }
        let tasks = cadence.generate(self.book.tasks_for(day), start, end, total_focus);
        let generated = tasks.iter().filter(|task| cadence.owns(task)).count();
        self.book.replace_day(day, tasks);
        debug!(cadence = cadence.prefix, %day, generated, "applied generated schedule");
        self.persist();
        generated
    }

    pub fn add_task(&mut self, task: ScheduleTask) -> TaskId {
        let id = task.id;
        self.book.insert(task);
        self.persist();
        id
    }

    pub fn remove_task(&mut self, id: TaskId) -> Result<ScheduleTask, SessionError> {
        let task = self.book.remove(id).ok_or(SessionError::TaskNotFound(id))?;
        self.persist();
        Ok(task)
    }

    pub fn set_task_label(
        &mut self,
        id: TaskId,
        label: impl Into<String>,
    ) -> Result<(), SessionError> {
        let task = self.book.get_mut(id).ok_or(SessionError::TaskNotFound(id))?;
        task.label = label.into();
        self.persist();
        Ok(())
    }

    /// Fails on a non-positive or non-finite duration, leaving the task as is.
    pub fn set_task_duration(&mut self, id: TaskId, seconds: f64) -> Result<(), SessionError> {
        let task = self.book.get_mut(id).ok_or(SessionError::TaskNotFound(id))?;
        task.set_duration(seconds)?;
        self.persist();
        Ok(())
    }

    /// Removes focus, manual focus and free-time blocks of `day`; admin
    /// blocks stay. Returns how many were removed.
    pub fn clear_blocks(&mut self, day: NaiveDate) -> usize {
        let removed = self.book.remove_where(day, |task| {
            matches!(
                task.category,
                Category::Focus | Category::ManualFocus | Category::FreeTime
            )
        });
        debug!(%day, removed, "cleared blocks");
        self.persist();
        removed
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.persist();
    }

    /// Applies an edit to a trace and re-derives the totals.
    pub fn edit_trace(&mut self, id: TraceId, edit: TraceEdit) -> Result<TimeTrace, SessionError> {
        let trace = self.traces.edit(id, edit)?.clone();
        self.save_traces();
        self.recalculate_totals_from_traces();
        Ok(trace)
    }

    pub fn delete_trace(&mut self, id: TraceId) -> Result<TimeTrace, SessionError> {
        let trace = self.traces.remove(id)?;
        self.save_traces();
        self.recalculate_totals_from_traces();
        Ok(trace)
    }

    /// Empties the trace log. Returns how many traces were removed.
    pub fn clear_traces(&mut self) -> usize {
        let removed = self.traces.len();
        self.traces.clear();
        self.save_traces();
        self.recalculate_totals_from_traces();
        removed
    }

    /// Sets the totals to the trace durations since the last reset.
    pub fn recalculate_totals_from_traces(&mut self) {
        let (work, rest) = self.traces.totals_since(self.totals_since);
        debug!(work, rest, since = ?self.totals_since, "recalculated totals from traces");
        self.work_total = work;
        self.break_total = rest;
        self.persist();
    }

    pub fn reset_timers(&mut self) {
        self.reset_timers_at(Utc::now());
    }

    /// Hard reset: the open bucket is discarded without a trace, totals go
    /// to zero and the session goes idle. Traces are kept.
    pub fn reset_timers_at(&mut self, now: DateTime<Utc>) {
        if self.state == SessionState::Work {
            self.finalize_manual_focus(now);
        }
        self.bucket = None;
        self.state = SessionState::None;
        self.previous_state = None;
        self.work_total = 0.0;
        self.break_total = 0.0;
        self.totals_since = Some(now);
        debug!(%now, "reset timers");
        self.persist();
    }

    /// Flushes the snapshot with the bucket left open, for backgrounding.
    pub fn suspend(&mut self) {
        self.persist();
    }

    pub fn shutdown(&mut self) {
        self.shutdown_at(Utc::now());
    }

    /// Closes the open bucket and flushes everything, for termination.
    pub fn shutdown_at(&mut self, now: DateTime<Utc>) {
        self.flush_bucket(now);
        self.persist();
    }

    /// The persisted form of the current state.
    pub fn snapshot(&self) -> Snapshot {
        let selected = self.selected_date;
        let clock = self.config.clock;
        Snapshot {
            session_state: self.state,
            running_bucket: self.running_bucket(),
            bucket_start: self.bucket_start(),
            work_total: self.work_total,
            break_total: self.break_total,
            scheduled_tasks: self.book.tasks_for(selected).to_vec(),
            selected_date: selected,
            totals_since: self.totals_since,
            previous_state: self.previous_state,
            other_tasks: self
                .book
                .iter()
                .filter(|task| clock.day_of(task.start_time) != selected)
                .cloned()
                .collect(),
            auto_switch_block: self.auto_switch_block,
            open_manual_focus: self.open_manual,
        }
    }

    fn persist(&mut self) {
        let blob = match self.snapshot().encode() {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %err, "failed to encode session snapshot");
                return;
            }
        };
        if let Err(err) = self.store.save_snapshot(SNAPSHOT_KEY, &blob) {
            warn!(error = %err, "failed to save session snapshot");
        }
    }

    fn save_traces(&mut self) {
        let blob = match encode_traces(&self.traces) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %err, "failed to encode trace log");
                return;
            }
        };
        if let Err(err) = self.store.save_traces(TRACES_KEY, &blob) {
            warn!(error = %err, "failed to save trace log");
        }
    }
}

fn sanitize_total(seconds: f64, which: &str) -> f64 {
    if seconds.is_finite() && seconds >= 0.0 {
        seconds
    } else {
        warn!(seconds, which, "corrupt total, clamping to zero");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeDelta, TimeZone};

    use crate::store::MemoryStore;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, second).unwrap()
    }

    fn engine() -> SessionEngine<MemoryStore> {
        SessionEngine::new(MemoryStore::new(), EngineConfig::default(), at(8, 0, 0))
    }

    fn auto_engine() -> SessionEngine<MemoryStore> {
        let config = EngineConfig {
            auto_switch: true,
            clock: DayClock::utc(),
        };
        SessionEngine::new(MemoryStore::new(), config, at(8, 0, 0))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn manual_tasks(engine: &SessionEngine<MemoryStore>) -> Vec<&ScheduleTask> {
        engine
            .selected_tasks()
            .iter()
            .filter(|task| task.is_manual_focus())
            .collect()
    }

    #[test]
    fn leaving_work_appends_one_trace_and_accrues_the_gap() {
        let mut engine = engine();
        let t0 = at(9, 0, 0);
        engine.transition_at(SessionState::Work, t0);
        engine.transition_at(SessionState::BreakSession, t0 + TimeDelta::seconds(600));

        assert_eq!(engine.traces().len(), 1);
        let trace = engine.traces().last().unwrap();
        assert_eq!(trace.start, t0);
        assert_eq!(trace.end, t0 + TimeDelta::seconds(600));
        assert!(trace.is_focus);
        assert_close(engine.work_total(), 600.0);
        assert_close(engine.break_total(), 0.0);
        assert_eq!(engine.state(), SessionState::BreakSession);
        assert_eq!(engine.running_bucket(), SessionState::BreakSession);
        assert_eq!(engine.bucket_start(), Some(t0 + TimeDelta::seconds(600)));
    }

    #[test]
    fn transition_to_same_state_restarts_the_segment() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        engine.transition_at(SessionState::Work, at(9, 10, 0));

        assert_eq!(engine.traces().len(), 1);
        assert_close(engine.work_total(), 600.0);
        assert_eq!(engine.bucket_start(), Some(at(9, 10, 0)));
    }

    #[test]
    fn idle_and_paused_have_no_bucket() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        engine.transition_at(SessionState::Paused, at(9, 5, 0));
        assert_eq!(engine.running_bucket(), SessionState::None);
        assert_eq!(engine.bucket_start(), None);

        engine.transition_at(SessionState::None, at(9, 6, 0));
        assert_eq!(engine.bucket_start(), None);
        assert_eq!(engine.traces().len(), 1);
    }

    #[test]
    fn close_without_bucket_is_a_no_op() {
        let mut engine = engine();
        assert_eq!(engine.close_current_trace_at(at(9, 0, 0)), None);
        assert!(engine.traces().is_empty());

        engine.transition_at(SessionState::Work, at(9, 0, 0));
        assert!(engine.close_current_trace_at(at(9, 1, 0)).is_some());
        let work = engine.work_total();
        assert_eq!(engine.close_current_trace_at(at(9, 2, 0)), None);

        assert_eq!(engine.traces().len(), 1);
        assert_close(engine.work_total(), work);
        assert_eq!(engine.state(), SessionState::Work);
    }

    #[test]
    fn clock_moving_backwards_closes_an_empty_trace() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        engine.close_current_trace_at(at(8, 59, 0));

        let trace = engine.traces().last().unwrap();
        assert_eq!(trace.start, trace.end);
        assert_close(engine.work_total(), 0.0);
    }

    #[test]
    fn live_totals_are_never_negative() {
        let mut engine = engine();
        let instants = [
            at(9, 0, 0),
            at(8, 0, 0),
            at(9, 30, 0),
            at(9, 10, 0),
            at(10, 0, 0),
        ];
        let states = [
            SessionState::Work,
            SessionState::BreakSession,
            SessionState::Work,
            SessionState::Paused,
            SessionState::BreakSession,
        ];
        for (now, state) in instants.into_iter().zip(states) {
            engine.transition_at(state, now);
            for probe in instants {
                let work = engine.live_work_total_at(probe);
                let rest = engine.live_break_total_at(probe);
                assert!(work.is_finite() && work >= 0.0);
                assert!(rest.is_finite() && rest >= 0.0);
            }
        }
    }

    #[test]
    fn live_work_counts_only_the_running_work_bucket() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        assert_close(engine.live_work_total_at(at(9, 0, 30)), 30.0);
        assert_close(engine.live_break_total_at(at(9, 0, 30)), 0.0);

        engine.transition_at(SessionState::BreakSession, at(9, 1, 0));
        assert_close(engine.live_work_total_at(at(9, 5, 0)), 60.0);
        assert_close(engine.live_break_total_at(at(9, 5, 0)), 240.0);
    }

    #[test]
    fn tap_from_idle_starts_work_with_a_growing_manual_block() {
        let mut engine = engine();
        let t0 = at(9, 0, 0);
        let outcome = engine.tap_at(t0);
        assert_eq!(
            outcome,
            GestureOutcome::Applied {
                from: SessionState::None,
                to: SessionState::Work
            }
        );
        assert_eq!(engine.bucket_start(), Some(t0));
        let manual = manual_tasks(&engine);
        assert_eq!(manual.len(), 1);
        assert_eq!(manual[0].start_time, t0);
        assert_eq!(manual[0].category, Category::ManualFocus);
        let manual_id = manual[0].id;

        let report = engine.tick_at(t0 + TimeDelta::seconds(1_500));
        assert_eq!(report.extended, Some(manual_id));
        assert_close(report.live_work, 1_500.0);
        assert_close(engine.live_work_total_at(t0 + TimeDelta::seconds(1_500)), 1_500.0);
        let task = manual_tasks(&engine)[0];
        assert_close(task.duration(), 1_500.0);
    }

    #[test]
    fn tap_from_work_closes_the_manual_block_and_starts_a_break() {
        let mut engine = engine();
        let t0 = at(9, 0, 0);
        let t1 = t0 + TimeDelta::seconds(600);
        engine.tap_at(t0);
        engine.tap_at(t1);

        assert_eq!(engine.state(), SessionState::BreakSession);
        assert_close(engine.work_total(), 600.0);
        let trace = engine.traces().last().unwrap();
        assert_eq!((trace.start, trace.end, trace.is_focus), (t0, t1, true));
        assert_eq!(engine.bucket_start(), Some(t1));
        let manual = manual_tasks(&engine);
        assert_eq!(manual.len(), 1);
        assert_close(manual[0].duration(), 600.0);
    }

    #[test]
    fn tap_twice_at_once_drops_the_empty_manual_block() {
        let mut engine = engine();
        engine.tap_at(at(9, 0, 0));
        engine.tap_at(at(9, 0, 0));

        assert_eq!(engine.state(), SessionState::BreakSession);
        assert!(manual_tasks(&engine).is_empty());
    }

    #[test]
    fn restarting_work_in_place_keeps_stretching_the_manual_block() {
        let mut engine = engine();
        let t0 = at(9, 0, 0);
        engine.tap_at(t0);
        let manual_id = manual_tasks(&engine)[0].id;
        engine.tick_at(t0 + TimeDelta::seconds(100));

        engine.transition_at(SessionState::Work, t0 + TimeDelta::seconds(200));
        assert_eq!(engine.bucket_start(), Some(t0 + TimeDelta::seconds(200)));

        let report = engine.tick_at(t0 + TimeDelta::seconds(600));
        assert_eq!(report.extended, Some(manual_id));
        assert_close(engine.task(manual_id).unwrap().duration(), 600.0);
        assert_eq!(
            engine.active_block_at(t0 + TimeDelta::seconds(600)).map(|task| task.id),
            Some(manual_id)
        );

        engine.tap_at(t0 + TimeDelta::seconds(900));
        assert_eq!(engine.state(), SessionState::BreakSession);
        assert_close(engine.task(manual_id).unwrap().duration(), 900.0);
        assert_close(engine.work_total(), 900.0);
        assert_eq!(engine.traces().len(), 2);
        assert_eq!(engine.tick_at(t0 + TimeDelta::seconds(1_200)).extended, None);
        assert_close(engine.task(manual_id).unwrap().duration(), 900.0);
    }

    #[test]
    fn leaving_work_by_transition_finalizes_the_manual_block() {
        let mut engine = engine();
        let t0 = at(9, 0, 0);
        engine.tap_at(t0);
        let manual_id = manual_tasks(&engine)[0].id;

        engine.transition_at(SessionState::BreakSession, t0 + TimeDelta::seconds(300));
        engine.transition_at(SessionState::Work, t0 + TimeDelta::seconds(400));
        engine.tick_at(t0 + TimeDelta::seconds(1_000));

        assert_close(engine.task(manual_id).unwrap().duration(), 300.0);
        assert!(engine.open_manual_focus_at(t0 + TimeDelta::seconds(1_000)).is_none());
    }

    #[test]
    fn open_manual_block_survives_a_restore() {
        let mut engine = engine();
        let t0 = at(9, 0, 0);
        engine.tap_at(t0);
        engine.transition_at(SessionState::Work, t0 + TimeDelta::seconds(60));
        let manual_id = manual_tasks(&engine)[0].id;

        let mut restored = SessionEngine::restore(
            engine.into_store(),
            EngineConfig::default(),
            t0 + TimeDelta::seconds(120),
        );
        let report = restored.tick_at(t0 + TimeDelta::seconds(420));
        assert_eq!(report.extended, Some(manual_id));
        assert_close(restored.task(manual_id).unwrap().duration(), 420.0);
    }

    #[test]
    fn drag_pauses_and_resumes_work() {
        let mut engine = engine();
        let t0 = at(9, 0, 0);
        engine.tap_at(t0);

        let paused = engine.drag_at(30.0, t0 + TimeDelta::seconds(200));
        assert_eq!(
            paused,
            GestureOutcome::Applied {
                from: SessionState::Work,
                to: SessionState::Paused
            }
        );
        assert_close(engine.work_total(), 200.0);
        assert_eq!(engine.bucket_start(), None);
        assert_eq!(engine.previous_state(), Some(SessionState::Work));

        let report = engine.tick_at(t0 + TimeDelta::seconds(500));
        assert_close(report.live_work, 200.0);

        let resume_at = t0 + TimeDelta::seconds(800);
        let resumed = engine.drag_at(-30.0, resume_at);
        assert_eq!(
            resumed,
            GestureOutcome::Applied {
                from: SessionState::Paused,
                to: SessionState::Work
            }
        );
        assert_eq!(engine.bucket_start(), Some(resume_at));
        assert_eq!(engine.previous_state(), None);

        let manual = manual_tasks(&engine);
        assert_eq!(manual.len(), 2);
        assert_close(manual[0].duration(), 200.0);
        assert_eq!(manual[1].start_time, resume_at);
    }

    #[test]
    fn resume_returns_to_a_paused_break_without_a_manual_block() {
        let mut engine = engine();
        engine.transition_at(SessionState::BreakSession, at(9, 0, 0));
        engine.drag_at(40.0, at(9, 2, 0));
        engine.drag_at(-40.0, at(9, 4, 0));

        assert_eq!(engine.state(), SessionState::BreakSession);
        assert_close(engine.break_total(), 120.0);
        assert!(manual_tasks(&engine).is_empty());
    }

    #[test]
    fn cancelled_drags_change_nothing() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        let before = engine.snapshot();

        assert_eq!(engine.drag_at(10.0, at(9, 1, 0)), GestureOutcome::Ignored);
        assert_eq!(engine.drag_at(-24.0, at(9, 1, 0)), GestureOutcome::Ignored);
        assert_eq!(engine.drag_at(-30.0, at(9, 1, 0)), GestureOutcome::Ignored);
        assert_eq!(engine.drag_at(f64::NAN, at(9, 1, 0)), GestureOutcome::Ignored);
        assert_eq!(engine.snapshot(), before);

        let mut idle = self::engine();
        assert_eq!(idle.drag_at(30.0, at(9, 1, 0)), GestureOutcome::Ignored);
        assert_eq!(idle.state(), SessionState::None);
    }

    #[test]
    fn open_manual_block_is_active_over_a_generated_block() {
        let mut engine = engine();
        engine.generate_pomodoro_at(at(9, 0, 0), at(12, 0, 0), 3_000.0);
        engine.tap_at(at(9, 10, 0));
        engine.tick_at(at(9, 15, 0));

        let active = engine.active_block_at(at(9, 15, 0)).unwrap();
        assert!(active.is_manual_focus());

        engine.tap_at(at(9, 20, 0));
        let active = engine.active_block_at(at(9, 20, 0)).unwrap();
        assert_eq!(active.name, "Pomodoro Focus");
    }

    #[test]
    fn active_block_spans_midnight() {
        let mut engine = engine();
        let late = Utc.with_ymd_and_hms(2026, 3, 2, 23, 30, 0).unwrap();
        let task = ScheduleTask::new("Late", "Late shift", late, 3_600.0, Category::Focus).unwrap();
        let id = engine.add_task(task);

        let after_midnight = Utc.with_ymd_and_hms(2026, 3, 3, 0, 15, 0).unwrap();
        assert_eq!(engine.active_block_at(after_midnight).map(|task| task.id), Some(id));
    }

    #[test]
    fn auto_switch_follows_the_schedule() {
        let mut engine = auto_engine();
        engine.generate_pomodoro_at(at(9, 0, 0), at(12, 0, 0), 3_000.0);

        assert_eq!(engine.tick_at(at(8, 59, 0)).switched_to, None);
        assert_eq!(engine.tick_at(at(9, 0, 0)).switched_to, Some(SessionState::Work));
        assert_eq!(engine.tick_at(at(9, 10, 0)).switched_to, None);
        assert_eq!(
            engine.tick_at(at(9, 25, 0)).switched_to,
            Some(SessionState::BreakSession)
        );
        assert_eq!(engine.tick_at(at(9, 30, 0)).switched_to, Some(SessionState::Work));

        assert_close(engine.work_total(), 1_500.0);
        assert_close(engine.break_total(), 300.0);
        assert_eq!(engine.traces().len(), 2);
    }

    #[test]
    fn auto_switch_does_not_undo_a_tap() {
        let mut engine = auto_engine();
        engine.generate_pomodoro_at(at(9, 0, 0), at(12, 0, 0), 3_000.0);
        engine.tick_at(at(9, 0, 0));
        engine.tap_at(at(9, 10, 0));

        assert_eq!(engine.tick_at(at(9, 11, 0)).switched_to, None);
        assert_eq!(engine.state(), SessionState::BreakSession);
    }

    #[test]
    fn auto_switch_ignores_admin_blocks_and_pauses() {
        let mut engine = auto_engine();
        let admin =
            ScheduleTask::new("Email", "Inbox", at(9, 0, 0), 1_800.0, Category::Admin).unwrap();
        engine.add_task(admin);
        assert_eq!(engine.tick_at(at(9, 5, 0)).switched_to, None);
        assert_eq!(engine.state(), SessionState::None);

        let rest =
            ScheduleTask::new("Walk", "Walk", at(9, 30, 0), 900.0, Category::FreeTime).unwrap();
        engine.add_task(rest);
        engine.transition_at(SessionState::Paused, at(9, 20, 0));
        assert_eq!(engine.tick_at(at(9, 31, 0)).switched_to, None);
        assert_eq!(engine.state(), SessionState::Paused);
    }

    #[test]
    fn auto_switch_is_off_by_default() {
        let mut engine = engine();
        engine.generate_pomodoro_at(at(9, 0, 0), at(12, 0, 0), 3_000.0);
        assert_eq!(engine.tick_at(at(9, 1, 0)).switched_to, None);
        assert_eq!(engine.state(), SessionState::None);
    }

    #[test]
    fn pomodoro_applies_to_the_start_day_and_replaces_itself() {
        let mut engine = engine();
        let start = at(9, 0, 0);
        let end = start + TimeDelta::hours(3);
        let admin =
            ScheduleTask::new("Standup", "Standup", at(8, 30, 0), 900.0, Category::Admin).unwrap();
        engine.add_task(admin);

        assert_eq!(engine.generate_pomodoro_at(start, end, 3_700.0), 5);
        let first: Vec<ScheduleTask> = engine.selected_tasks().to_vec();
        assert_eq!(engine.generate_pomodoro_at(start, end, 3_700.0), 5);
        assert_eq!(engine.selected_tasks(), first.as_slice());

        assert_eq!(first.len(), 6);
        assert_eq!(first[0].name, "Standup");
        let focus: f64 = first
            .iter()
            .filter(|task| task.category == Category::Focus)
            .map(ScheduleTask::duration)
            .sum();
        assert_close(focus, 3_700.0);
    }

    #[test]
    fn regenerating_across_midnight_does_not_duplicate_blocks() {
        let mut engine = engine();
        let start = at(22, 0, 0);
        let end = start + TimeDelta::hours(4);
        let next_day = start.date_naive() + TimeDelta::days(1);

        let generated = engine.generate_pomodoro_at(start, end, 10_800.0);
        let first: Vec<ScheduleTask> = engine.tasks().cloned().collect();
        assert_eq!(first.len(), generated);
        assert!(!engine.tasks_for(next_day).is_empty());

        assert_eq!(engine.generate_pomodoro_at(start, end, 10_800.0), generated);
        let second: Vec<ScheduleTask> = engine.tasks().cloned().collect();
        assert_eq!(second, first);

        // A shorter rerun drops the earlier run's blocks after midnight.
        engine.generate_pomodoro_at(start, end, 3_000.0);
        assert!(engine.tasks_for(next_day).is_empty());
    }

    #[test]
    fn huberman_and_pomodoro_coexist() {
        let mut engine = engine();
        engine.generate_pomodoro_at(at(9, 0, 0), at(10, 0, 0), 1_500.0);
        engine.generate_huberman_at(at(13, 0, 0), at(16, 0, 0), 5_400.0);

        let names: Vec<&str> = engine
            .selected_tasks()
            .iter()
            .map(|task| task.name.as_str())
            .collect();
        assert_eq!(names, ["Pomodoro Focus", "Huberman Focus"]);
    }

    #[test]
    fn task_mutators_validate_and_report_missing_ids() {
        let mut engine = engine();
        let task = ScheduleTask::new("Read", "Read", at(9, 0, 0), 600.0, Category::Focus).unwrap();
        let id = engine.add_task(task);

        engine.set_task_label(id, "Read paper").unwrap();
        engine.set_task_duration(id, 1_200.0).unwrap();
        let task = engine.task(id).unwrap();
        assert_eq!(task.label, "Read paper");
        assert_close(task.duration(), 1_200.0);

        let err = engine.set_task_duration(id, 0.0).unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_close(engine.task(id).unwrap().duration(), 1_200.0);

        let missing = TaskId::new();
        assert_eq!(
            engine.set_task_label(missing, "x"),
            Err(SessionError::TaskNotFound(missing))
        );
        assert_eq!(engine.remove_task(id).unwrap().id, id);
        assert_eq!(engine.remove_task(id), Err(SessionError::TaskNotFound(id)));
    }

    #[test]
    fn clear_blocks_keeps_admin_tasks() {
        let mut engine = engine();
        engine.generate_pomodoro_at(at(9, 0, 0), at(12, 0, 0), 3_000.0);
        engine.add_task(
            ScheduleTask::new("Email", "Inbox", at(13, 0, 0), 900.0, Category::Admin).unwrap(),
        );
        engine.tap_at(at(14, 0, 0));

        let day = at(9, 0, 0).date_naive();
        assert_eq!(engine.clear_blocks(day), 4);
        let left: Vec<&str> = engine.tasks_for(day).iter().map(|task| task.name.as_str()).collect();
        assert_eq!(left, ["Email"]);
    }

    #[test]
    fn editing_and_deleting_traces_rederives_totals() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        engine.transition_at(SessionState::BreakSession, at(9, 25, 0));
        engine.transition_at(SessionState::Work, at(9, 30, 0));
        engine.transition_at(SessionState::None, at(9, 55, 0));
        assert_close(engine.work_total(), 3_000.0);

        let first = engine.traces().iter().next().unwrap().id;
        let edited = engine
            .edit_trace(
                first,
                TraceEdit {
                    end: Some(at(9, 20, 0)),
                    label: Some("Outline".to_string()),
                    ..TraceEdit::default()
                },
            )
            .unwrap();
        assert_eq!(edited.id, first);
        assert_close(engine.work_total(), 2_700.0);

        let rest = engine.traces().iter().find(|trace| !trace.is_focus).unwrap().id;
        engine.delete_trace(rest).unwrap();
        assert_close(engine.break_total(), 0.0);
        assert_eq!(engine.traces().len(), 2);

        assert_eq!(engine.clear_traces(), 2);
        assert_close(engine.work_total(), 0.0);
    }

    #[test]
    fn reset_discards_the_bucket_and_hides_older_traces() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        engine.transition_at(SessionState::BreakSession, at(9, 25, 0));
        engine.reset_timers_at(at(9, 27, 0));

        assert_eq!(engine.state(), SessionState::None);
        assert_eq!(engine.bucket_start(), None);
        assert_close(engine.live_work_total_at(at(9, 30, 0)), 0.0);
        assert_close(engine.live_break_total_at(at(9, 30, 0)), 0.0);
        assert_eq!(engine.traces().len(), 1);

        engine.transition_at(SessionState::Work, at(10, 0, 0));
        engine.transition_at(SessionState::None, at(10, 10, 0));
        let old = engine.traces().iter().next().unwrap().id;
        engine
            .edit_trace(
                old,
                TraceEdit {
                    label: Some("before reset".to_string()),
                    ..TraceEdit::default()
                },
            )
            .unwrap();
        assert_close(engine.work_total(), 600.0);
    }

    #[test]
    fn restore_picks_up_where_the_session_left_off() {
        let mut engine = engine();
        engine.generate_pomodoro_at(at(9, 0, 0), at(12, 0, 0), 3_000.0);
        engine.tap_at(at(9, 0, 0));
        engine.tap_at(at(9, 20, 0));
        engine.select_date(at(9, 0, 0).date_naive() + TimeDelta::days(1));
        let before = engine.snapshot();
        let traces = engine.traces().clone();

        let store = engine.into_store();
        let restored = SessionEngine::restore(store, EngineConfig::default(), at(9, 30, 0));

        assert_eq!(restored.snapshot(), before);
        assert_eq!(restored.traces(), &traces);
        assert_eq!(restored.state(), SessionState::BreakSession);
        assert_eq!(restored.bucket_start(), Some(at(9, 20, 0)));
        assert_close(restored.live_break_total_at(at(9, 30, 0)), 600.0);
        assert_eq!(restored.tasks_for(at(9, 0, 0).date_naive()).len(), 4);
    }

    #[test]
    fn restore_clamps_a_future_bucket_start() {
        let mut store = MemoryStore::new();
        let snapshot = Snapshot {
            session_state: SessionState::Work,
            running_bucket: SessionState::Work,
            bucket_start: Some(at(11, 0, 0)),
            work_total: 90.0,
            break_total: -5.0,
            scheduled_tasks: Vec::new(),
            selected_date: at(9, 0, 0).date_naive(),
            totals_since: None,
            previous_state: None,
            other_tasks: Vec::new(),
            auto_switch_block: None,
            open_manual_focus: None,
        };
        store
            .save_snapshot(SNAPSHOT_KEY, &snapshot.encode().unwrap())
            .unwrap();

        let restored = SessionEngine::restore(store, EngineConfig::default(), at(10, 0, 0));
        assert_eq!(restored.bucket_start(), Some(at(10, 0, 0)));
        assert_close(restored.work_total(), 90.0);
        assert_close(restored.break_total(), 0.0);
        assert_close(restored.live_work_total_at(at(10, 1, 0)), 150.0);
    }

    #[test]
    fn restore_starts_fresh_on_malformed_blobs() {
        let mut store = MemoryStore::new();
        store.save_snapshot(SNAPSHOT_KEY, b"{not json").unwrap();
        store.save_traces(TRACES_KEY, b"[{}]").unwrap();

        let restored = SessionEngine::restore(store, EngineConfig::default(), at(9, 0, 0));
        assert_eq!(restored.state(), SessionState::None);
        assert!(restored.traces().is_empty());
        assert_eq!(restored.selected_date(), at(9, 0, 0).date_naive());
    }

    #[test]
    fn restore_after_close_keeps_the_session_unbucketed() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        engine.close_current_trace_at(at(9, 5, 0));

        let restored =
            SessionEngine::restore(engine.into_store(), EngineConfig::default(), at(9, 10, 0));
        assert_eq!(restored.state(), SessionState::Work);
        assert_eq!(restored.bucket_start(), None);
        assert_close(restored.live_work_total_at(at(9, 10, 0)), 300.0);
    }

    #[test]
    fn suspend_keeps_the_bucket_and_shutdown_closes_it() {
        let mut engine = engine();
        engine.transition_at(SessionState::Work, at(9, 0, 0));
        let writes = engine.store().writes();
        engine.suspend();
        assert_eq!(engine.store().writes(), writes + 1);
        assert_eq!(engine.bucket_start(), Some(at(9, 0, 0)));

        engine.shutdown_at(at(9, 30, 0));
        assert_eq!(engine.bucket_start(), None);
        assert_close(engine.work_total(), 1_800.0);
        assert_eq!(engine.traces().len(), 1);
    }

    #[test]
    fn manual_blocks_are_filed_on_the_day_they_start() {
        let mut engine = engine();
        let other_day = at(9, 0, 0).date_naive() - TimeDelta::days(3);
        engine.select_date(other_day);
        engine.tap_at(at(9, 0, 0));

        assert!(engine.selected_tasks().is_empty());
        assert_eq!(engine.tasks_for(at(9, 0, 0).date_naive()).len(), 1);
        assert_eq!(engine.snapshot().other_tasks.len(), 1);
    }
}
