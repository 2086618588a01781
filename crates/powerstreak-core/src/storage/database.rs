//! SQLite-backed streak storage.
//!
//! Provides persistent storage for:
//! - The streak state (JSON document in the key-value table)
//! - A log of completed check-ins and the statistics derived from it

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

use super::{data_dir, StreakStore};
use crate::engine::CheckInResult;
use crate::error::StoreError;
use crate::state::StreakState;

/// Key of the streak document in the kv table
pub const STATE_KEY: &str = "streak_state";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub id: i64,
    pub checked_in_at: DateTime<Utc>,
    pub streak_day: u32,
    pub base_points: u32,
    pub boost_bps: u32,
    pub points_awarded: u32,
    pub mystery_payout: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CheckInStats {
    pub total_check_ins: u64,
    pub total_points_awarded: u64,
    pub mystery_draws: u64,
    pub best_mystery_payout: Option<u32>,
    pub first_check_in_at: Option<DateTime<Utc>>,
    pub last_check_in_at: Option<DateTime<Utc>>,
}

/// SQLite database for streak storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/powerstreak.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("powerstreak.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS check_ins (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                checked_in_at  TEXT NOT NULL,
                streak_day     INTEGER NOT NULL,
                base_points    INTEGER NOT NULL,
                boost_bps      INTEGER NOT NULL DEFAULT 0,
                points_awarded INTEGER NOT NULL,
                mystery_payout INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_check_ins_checked_in_at ON check_ins(checked_in_at);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn load_state(&self) -> Result<Option<StreakState>, StoreError> {
        match self.kv_get(STATE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save_state(&self, state: &StreakState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        self.kv_set(STATE_KEY, &json)?;
        Ok(())
    }

    /// Write the new state and append the check-in to the log in one transaction.
    pub fn record_check_in(&mut self, result: &CheckInResult) -> Result<i64, StoreError> {
        let json = serde_json::to_string(&result.new_state)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![STATE_KEY, json],
        )?;
        tx.execute(
            "INSERT INTO check_ins (checked_in_at, streak_day, base_points, boost_bps, points_awarded, mystery_payout)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                result.checked_in_at.to_rfc3339(),
                result.streak_day,
                result.base_points,
                result.applied_boost.bps(),
                result.points_awarded,
                result.mystery_roll.map(|m| m.payout),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Most recent check-ins, newest first.
    pub fn recent_check_ins(&self, limit: usize) -> Result<Vec<CheckInRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, checked_in_at, streak_day, base_points, boost_bps, points_awarded, mystery_payout
             FROM check_ins
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, Option<u32>>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, at, streak_day, base_points, boost_bps, points_awarded, mystery_payout) = row?;
            let checked_in_at = DateTime::parse_from_rfc3339(&at)
                .map_err(|e| StoreError::QueryFailed(format!("bad timestamp '{at}': {e}")))?
                .with_timezone(&Utc);
            records.push(CheckInRecord {
                id,
                checked_in_at,
                streak_day,
                base_points,
                boost_bps,
                points_awarded,
                mystery_payout,
            });
        }
        Ok(records)
    }

    pub fn stats(&self) -> Result<CheckInStats, StoreError> {
        let (total, points, draws, best, first, last) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(points_awarded), 0),
                    COUNT(mystery_payout),
                    MAX(mystery_payout),
                    MIN(checked_in_at),
                    MAX(checked_in_at)
             FROM check_ins",
            [],
            |row| {
                Ok((
                    row.get::<_, u64>(0)?,
                    row.get::<_, u64>(1)?,
                    row.get::<_, u64>(2)?,
                    row.get::<_, Option<u32>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        )?;

        let parse = |s: Option<String>| {
            s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|d| d.with_timezone(&Utc))
        };
        Ok(CheckInStats {
            total_check_ins: total,
            total_points_awarded: points,
            mystery_draws: draws,
            best_mystery_payout: best,
            first_check_in_at: parse(first),
            last_check_in_at: parse(last),
        })
    }
}

/// [`StreakStore`] over a SQLite database
pub struct SqliteStreakStore {
    db: Mutex<Database>,
}

impl SqliteStreakStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Open the store in the default data directory.
    pub fn open() -> Result<Self, StoreError> {
        Ok(Self::new(Database::open()?))
    }

    /// Run a read-only query against the underlying database.
    pub fn with_db<T>(&self, f: impl FnOnce(&Database) -> T) -> T {
        let db = self.db.lock().unwrap_or_else(|e| e.into_inner());
        f(&db)
    }
}

impl StreakStore for SqliteStreakStore {
    fn load(&self) -> Result<Option<StreakState>, StoreError> {
        self.with_db(|db| db.load_state())
    }

    fn save(&self, state: &StreakState) -> Result<(), StoreError> {
        self.with_db(|db| db.save_state(state))
    }

    fn record(&self, result: &CheckInResult) -> Result<(), StoreError> {
        let mut db = self.db.lock().unwrap_or_else(|e| e.into_inner());
        db.record_check_in(result).map(|_| ())
    }
}
