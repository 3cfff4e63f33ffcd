//! SQLite-backed persistence.
//!
//! Provides persistent storage for:
//! - The key-value store holding the reveal flags and the persisted
//!   countdown engine snapshot
//! - Countdown session history

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::error::StorageError;

/// How a countdown session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownOutcome {
    Completed,
    Cancelled,
}

impl CountdownOutcome {
    fn as_str(self) -> &'static str {
        match self {
            CountdownOutcome::Completed => "completed",
            CountdownOutcome::Cancelled => "cancelled",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "completed" => CountdownOutcome::Completed,
            _ => CountdownOutcome::Cancelled,
        }
    }
}

/// One logged countdown session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownRecord {
    pub session_id: Uuid,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub outcome: CountdownOutcome,
}

/// SQLite database for gate state and countdown history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/launchgate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::QueryFailed(format!("data dir: {e}")))?
            .join("launchgate.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS countdowns (
                session_id  TEXT PRIMARY KEY,
                duration_ms INTEGER NOT NULL,
                started_at  TEXT NOT NULL,
                ended_at    TEXT NOT NULL,
                outcome     TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_countdowns_started_at ON countdowns(started_at);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Log a finished (completed or cancelled) countdown session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_countdown(&self, record: &CountdownRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO countdowns (session_id, duration_ms, started_at, ended_at, outcome)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.session_id.to_string(),
                record.duration_ms,
                record.started_at.to_rfc3339(),
                record.ended_at.to_rfc3339(),
                record.outcome.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Most recent countdown sessions, newest first.
    pub fn countdown_history(&self, limit: u32) -> Result<Vec<CountdownRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, duration_ms, started_at, ended_at, outcome
             FROM countdowns
             ORDER BY started_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, duration_ms, started_at, ended_at, outcome) = row?;
            let session_id = Uuid::parse_str(&id)
                .map_err(|e| StorageError::QueryFailed(format!("bad session id '{id}': {e}")))?;
            let started_at = DateTime::parse_from_rfc3339(&started_at)
                .map_err(|e| StorageError::QueryFailed(format!("bad started_at: {e}")))?
                .with_timezone(&Utc);
            let ended_at = DateTime::parse_from_rfc3339(&ended_at)
                .map_err(|e| StorageError::QueryFailed(format!("bad ended_at: {e}")))?
                .with_timezone(&Utc);
            records.push(CountdownRecord {
                session_id,
                duration_ms,
                started_at,
                ended_at,
                outcome: CountdownOutcome::from_str(&outcome),
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn record_and_list_history() {
        let db = Database::open_memory().unwrap();
        let start = Utc::now();
        let first = CountdownRecord {
            session_id: Uuid::new_v4(),
            duration_ms: 10_000,
            started_at: start,
            ended_at: start + Duration::seconds(10),
            outcome: CountdownOutcome::Completed,
        };
        let second = CountdownRecord {
            session_id: Uuid::new_v4(),
            duration_ms: 900_000,
            started_at: start + Duration::minutes(5),
            ended_at: start + Duration::minutes(6),
            outcome: CountdownOutcome::Cancelled,
        };
        db.record_countdown(&first).unwrap();
        db.record_countdown(&second).unwrap();

        let history = db.countdown_history(10).unwrap();
        assert_eq!(history.len(), 2);
        // Newest first.
        assert_eq!(history[0].session_id, second.session_id);
        assert_eq!(history[0].outcome, CountdownOutcome::Cancelled);
        assert_eq!(history[1].duration_ms, 10_000);

        let limited = db.countdown_history(1).unwrap();
        assert_eq!(limited.len(), 1);
    }
}
