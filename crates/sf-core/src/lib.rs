//! Core domain logic for the focus timer.
//!
//! This crate contains the fundamental types and logic for:
//! - Session state: idle, work, break and paused, and the gestures that move between them
//! - Bucket accounting: accruing elapsed time into totals and the trace log
//! - Schedules: per-day blocks, Pomodoro and Huberman generators, active-block resolution
//! - Persistence: the snapshot codec and the [`Store`] contract backends implement

mod active;
pub mod day;
pub mod engine;
mod error;
pub mod generator;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod task;
pub mod trace;
pub mod types;

pub use active::active_block;
pub use day::{DayClock, ScheduleBook};
pub use engine::{DRAG_THRESHOLD, EngineConfig, GestureOutcome, SessionEngine, TickReport};
pub use error::SessionError;
pub use generator::{HUBERMAN, POMODORO, generate_huberman_schedule, generate_pomodoro_schedule};
pub use session::{BucketKind, OpenBucket, SessionState};
pub use snapshot::Snapshot;
pub use store::{MemoryStore, SNAPSHOT_KEY, Store, TRACES_KEY};
pub use task::{Category, ScheduleTask};
pub use trace::{TimeTrace, TraceEdit, TraceLog};
pub use types::{TaskId, TraceId, ValidationError};
