//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A block duration was zero, negative, NaN or infinite.
    #[error("duration must be positive and finite, got {value}")]
    InvalidDuration { value: f64 },

    /// A trace edit would end before it starts.
    #[error("trace cannot end ({end}) before it starts ({start})")]
    TraceEndsBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Unknown session state name.
    #[error("invalid session state: {value}")]
    InvalidSessionState { value: String },

    /// Unknown task category name.
    #[error("invalid category: {value}")]
    InvalidCategory { value: String },
}

/// Generates a UUID-backed identifier newtype with common trait implementations.
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Derives a stable identifier from arbitrary content.
            ///
            /// Equal content always yields the same identifier.
            pub fn derived(content: &str) -> Self {
                Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes()))
            }

            /// Returns the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_uuid_id!(
    /// Identifies a scheduled block.
    TaskId
);

define_uuid_id!(
    /// Identifies a recorded time trace.
    ///
    /// Preserved across edits so the presentation layer can track a trace
    /// while the user changes its bounds or label.
    TraceId
);

/// Seconds elapsed from `start` to `end`, with microsecond precision.
///
/// Negative when `end` precedes `start`.
pub fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end - start;
    delta.num_microseconds().map_or_else(
        || delta.num_milliseconds() as f64 / 1_000.0,
        |micros| micros as f64 / 1_000_000.0,
    )
}

/// Offsets `at` by a (possibly fractional) number of seconds.
///
/// Non-finite inputs leave the timestamp unchanged.
pub fn add_seconds(at: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    if !seconds.is_finite() {
        return at;
    }
    let micros = (seconds * 1_000_000.0).round() as i64;
    at + TimeDelta::microseconds(micros)
}

/// Returns `Ok(seconds)` when it is a usable block duration.
pub fn validate_duration(seconds: f64) -> Result<f64, ValidationError> {
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(ValidationError::InvalidDuration { value: seconds })
    }
}
