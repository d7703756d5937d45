//! Persistence gateway contract.
//!
//! The engine persists two independent blobs: the session snapshot and the
//! trace log. There is no transaction spanning both; the engine always
//! recomputes live values from its own state, so a crash between the two
//! writes leaves them briefly inconsistent but harmless.

use std::collections::HashMap;
use std::convert::Infallible;

/// Key under which the session snapshot is stored.
pub const SNAPSHOT_KEY: &str = "timerState";

/// Key under which the trace log is stored.
pub const TRACES_KEY: &str = "savedTimeTraces";

/// Durable key-value storage for snapshot and trace blobs.
///
/// Implementations should be idempotent: saving the same blob twice has the
/// same effect as saving it once.
pub trait Store {
    type Error: std::error::Error + Send + Sync + 'static;

    fn save_snapshot(&mut self, key: &str, blob: &[u8]) -> Result<(), Self::Error>;

    fn load_snapshot(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    fn save_traces(&mut self, key: &str, blob: &[u8]) -> Result<(), Self::Error>;

    fn load_traces(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;
}

/// In-process store, useful for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshots: HashMap<String, Vec<u8>>,
    traces: HashMap<String, Vec<u8>>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves across both namespaces.
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl Store for MemoryStore {
    type Error = Infallible;

    fn save_snapshot(&mut self, key: &str, blob: &[u8]) -> Result<(), Self::Error> {
        self.snapshots.insert(key.to_string(), blob.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn load_snapshot(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.snapshots.get(key).cloned())
    }

    fn save_traces(&mut self, key: &str, blob: &[u8]) -> Result<(), Self::Error> {
        self.traces.insert(key.to_string(), blob.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn load_traces(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.traces.get(key).cloned())
    }
}
