use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

/// Fixed identifier of the persisted personal best
pub const HIGH_SCORE_KEY: &str = "triviaHighScore";

/// Single persisted integer slot holding the best score ever achieved
pub trait HighScoreStore: Send {
    /// Stored value, or 0 if never set or unreadable
    fn get(&self) -> u32;
    fn set(&mut self, score: u32) -> Result<(), StoreError>;
}

/// SQLite-backed store keeping the score in a small key/value table
#[derive(Debug)]
pub struct SqliteHighScoreStore {
    conn: Connection,
}

impl SqliteHighScoreStore {
    /// Open the store at the default state location
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("kwiz.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }

    fn read(&self) -> rusqlite::Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![HIGH_SCORE_KEY],
                |row| row.get(0),
            )
            .optional()
    }
}

impl HighScoreStore for SqliteHighScoreStore {
    fn get(&self) -> u32 {
        match self.read() {
            Ok(Some(value)) => u32::try_from(value).unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "failed to read high score");
                0
            }
        }
    }

    fn set(&mut self, score: u32) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![HIGH_SCORE_KEY, score as i64, Local::now().to_rfc3339()],
        )?;
        debug!(score, "high score persisted");
        Ok(())
    }
}

/// Process-local store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    value: Arc<AtomicU32>,
}

impl MemoryHighScoreStore {
    pub fn with_value(score: u32) -> Self {
        Self {
            value: Arc::new(AtomicU32::new(score)),
        }
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn get(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }

    fn set(&mut self, score: u32) -> Result<(), StoreError> {
        self.value.store(score, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_defaults_to_zero() {
        let store = SqliteHighScoreStore::open_in_memory().unwrap();
        assert_eq!(store.get(), 0);
    }

    #[test]
    fn test_sqlite_set_overwrites() {
        let mut store = SqliteHighScoreStore::open_in_memory().unwrap();
        store.set(150).unwrap();
        store.set(300).unwrap();
        assert_eq!(store.get(), 300);

        let stamp: String = store
            .conn
            .query_row(
                "SELECT updated_at FROM kv WHERE key = ?1",
                params![HIGH_SCORE_KEY],
                |row| row.get(0),
            )
            .unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("kwiz.db");
        {
            let mut store = SqliteHighScoreStore::open(&path).unwrap();
            store.set(700).unwrap();
        }
        let store = SqliteHighScoreStore::open(&path).unwrap();
        assert_eq!(store.get(), 700);
    }

    #[test]
    fn test_memory_clones_share_slot() {
        let store = MemoryHighScoreStore::with_value(150);
        let mut handle = store.clone();
        handle.set(200).unwrap();
        assert_eq!(store.get(), 200);
    }
}
