//! Session modes and the open timed bucket.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// The mode governing accrual and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// Idle; nothing accrues.
    #[default]
    None,
    Work,
    BreakSession,
    /// Explicitly paused; nothing accrues.
    Paused,
}

impl SessionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Work => "work",
            Self::BreakSession => "break",
            Self::Paused => "paused",
        }
    }

    /// Whether time accrues in this state.
    pub const fn is_timed(&self) -> bool {
        matches!(self, Self::Work | Self::BreakSession)
    }

    /// The bucket kind opened when entering this state, if any.
    pub const fn bucket_kind(&self) -> Option<BucketKind> {
        match self {
            Self::Work => Some(BucketKind::Work),
            Self::BreakSession => Some(BucketKind::Break),
            Self::None | Self::Paused => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "idle" => Ok(Self::None),
            "work" => Ok(Self::Work),
            "break" | "breakSession" | "break-session" => Ok(Self::BreakSession),
            "paused" | "pause" => Ok(Self::Paused),
            _ => Err(ValidationError::InvalidSessionState {
                value: s.to_string(),
            }),
        }
    }
}

/// Which total an open bucket accrues into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    Work,
    Break,
}

impl BucketKind {
    /// The session state this bucket runs under.
    pub const fn state(self) -> SessionState {
        match self {
            Self::Work => SessionState::Work,
            Self::Break => SessionState::BreakSession,
        }
    }
}

/// The currently open, not yet finalized interval.
///
/// Holding an `Option<OpenBucket>` keeps the kind and start time together,
/// so a start time can never exist without a timed kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenBucket {
    pub kind: BucketKind,
    pub start: DateTime<Utc>,
}

impl OpenBucket {
    pub const fn new(kind: BucketKind, start: DateTime<Utc>) -> Self {
        Self { kind, start }
    }
}
