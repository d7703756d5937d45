//! Storage layer for the focus timer.
//!
//! Persists the engine's snapshot and trace-log blobs using `rusqlite`.
//!
//! A [`Database`] is handed to `SessionEngine` by value and only ever touched
//! through it, one call at a time.
//!
//! # Schema
//!
//! A single `blobs` table keyed by `(namespace, key)`. The namespace separates
//! snapshots from trace logs so the two can never overwrite each other.
//! `updated_at` is ISO 8601 UTC text, set on every write.
//!
//! The blob payloads are JSON produced by `sf_core::snapshot`; evolving them is
//! handled there with defaulted fields, so the table itself needs no migrations.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use sf_core::Store;
use thiserror::Error;

const SNAPSHOT_NAMESPACE: &str = "snapshot";
const TRACES_NAMESPACE: &str = "traces";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// SQLite-backed [`Store`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file and makes sure `blobs` exists.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// A database that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS blobs (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            );
            ",
        )?;
        Ok(())
    }

    /// Writes a blob, replacing any previous value under the same key.
    pub fn put(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO blobs (namespace, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![namespace, key, value, format_timestamp(Utc::now())],
        )?;
        tracing::debug!(namespace, key, bytes = value.len(), "stored blob");
        Ok(())
    }

    /// Reads a blob, or `None` if nothing was stored under the key.
    pub fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, DbError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM blobs WHERE namespace = ? AND key = ?",
                params![namespace, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

}

impl Store for Database {
    type Error = DbError;

    fn save_snapshot(&mut self, key: &str, blob: &[u8]) -> Result<(), Self::Error> {
        self.put(SNAPSHOT_NAMESPACE, key, blob)
    }

    fn load_snapshot(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        self.get(SNAPSHOT_NAMESPACE, key)
    }

    fn save_traces(&mut self, key: &str, blob: &[u8]) -> Result<(), Self::Error> {
        self.put(TRACES_NAMESPACE, key, blob)
    }

    fn load_traces(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        self.get(TRACES_NAMESPACE, key)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use sf_core::{EngineConfig, SNAPSHOT_KEY, SessionEngine, SessionState, TRACES_KEY};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        let mut stmt = db
            .conn
            .prepare("PRAGMA table_info(blobs)")
            .expect("prepare table_info");
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info")
            .map(|row| row.expect("table_info row"))
            .collect();
        assert_eq!(columns, vec!["namespace", "key", "value", "updated_at"]);
    }

    #[test]
    fn put_overwrites_and_namespaces_are_separate() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.save_snapshot(SNAPSHOT_KEY, b"first").expect("save");
        db.save_snapshot(SNAPSHOT_KEY, b"second").expect("save");
        db.save_traces(SNAPSHOT_KEY, b"[]").expect("save");

        assert_eq!(
            db.load_snapshot(SNAPSHOT_KEY).expect("load").as_deref(),
            Some(&b"second"[..])
        );
        assert_eq!(
            db.load_traces(SNAPSHOT_KEY).expect("load").as_deref(),
            Some(&b"[]"[..])
        );
        assert_eq!(db.load_traces(TRACES_KEY).expect("load"), None);

        let rows: i64 = db
            .conn
            .query_row("SELECT count(*) FROM blobs", [], |row| row.get(0))
            .expect("count rows");
        assert_eq!(rows, 2);
    }

    #[test]
    fn engine_state_survives_reopening_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sf.db");

        let db = Database::open(&path).expect("open db");
        let mut engine = SessionEngine::new(db, EngineConfig::default(), at(9, 0));
        engine.tap_at(at(9, 0));
        engine.tap_at(at(9, 25));
        drop(engine);

        let db = Database::open(&path).expect("reopen db");
        let engine = SessionEngine::restore(db, EngineConfig::default(), at(9, 30));
        assert_eq!(engine.state(), SessionState::BreakSession);
        assert_eq!(engine.bucket_start(), Some(at(9, 25)));
        assert_eq!(engine.traces().len(), 1);
        assert!((engine.work_total() - 1_500.0).abs() < 1e-6);
        assert!((engine.live_break_total_at(at(9, 30)) - 300.0).abs() < 1e-6);
        assert_eq!(engine.selected_tasks().len(), 1);
    }
}
