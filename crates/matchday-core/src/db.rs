// SQLite persistence for league snapshots.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::league::LeagueState;
use crate::store::{SnapshotStore, SNAPSHOT_KEY};

/// SQLite-backed key-value store holding serialized league state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS league_state (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Persist raw text under `key`, replacing any previous value.
    pub fn save_raw(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO league_state (key, value, updated_at)
             VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
            params![key, value],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load the raw text stored under `key`, if any.
    pub fn load_raw(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT value FROM league_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("failed to query league state")
    }

    /// When the value under `key` was last written, as an ISO-8601 UTC string.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT updated_at FROM league_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("failed to query league state timestamp")
    }
}

impl SnapshotStore for Database {
    fn load(&self) -> Result<Option<LeagueState>> {
        let Some(json_str) = self.load_raw(SNAPSHOT_KEY)? else {
            return Ok(None);
        };
        let state =
            serde_json::from_str(&json_str).context("failed to deserialize league snapshot")?;
        Ok(Some(state))
    }

    fn save(&self, state: &LeagueState) -> Result<()> {
        let json_str = serde_json::to_string(state).context("failed to serialize league")?;
        self.save_raw(SNAPSHOT_KEY, &json_str)
    }
}
