//! Known pools and per-user watchlists
//!
//! Schema:
//! - `pools(id, name, address UNIQUE, token_lqd, token_base)`
//! - `watchlists(id, user_id, name_pool -> pools.address, UNIQUE(user_id, name_pool))`

use super::{open_file, open_memory, DatabaseError};
use crate::logger::{self, LogTag};
use crate::reports::PoolReport;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS pools (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        address TEXT NOT NULL UNIQUE,
        token_lqd TEXT NOT NULL,
        token_base TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS watchlists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name_pool TEXT NOT NULL REFERENCES pools(address) ON DELETE CASCADE,
        UNIQUE(user_id, name_pool)
    );

    CREATE INDEX IF NOT EXISTS idx_watchlists_user ON watchlists(user_id);
";

/// A row of `pools`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    /// Display label, e.g. `TON/USDT`
    pub name: String,
    pub address: String,
    /// token0 address
    pub token_lqd: String,
    /// token1 address
    pub token_base: String,
}

impl PoolRecord {
    pub fn from_report(report: &PoolReport) -> Self {
        Self {
            name: report.pair_label(),
            address: report.pool.address.clone(),
            token_lqd: report.pool.token0_address.clone(),
            token_base: report.pool.token1_address.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: i64,
    pub user_id: i64,
    pub pool_address: String,
    pub pool_name: String,
}

pub struct WatchlistStore {
    conn: Mutex<Connection>,
}

impl WatchlistStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let store = Self::with_connection(open_file(path)?)?;
        logger::debug(
            LogTag::Database,
            &format!("Watchlist database ready at {}", path.display()),
        );
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::with_connection(open_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert the pool or refresh its name and tokens
    pub fn upsert_pool(&self, record: &PoolRecord) -> Result<(), DatabaseError> {
        self.conn.lock().execute(
            "INSERT INTO pools (name, address, token_lqd, token_base)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(address) DO UPDATE SET
                name = excluded.name,
                token_lqd = excluded.token_lqd,
                token_base = excluded.token_base",
            params![
                record.name,
                record.address,
                record.token_lqd,
                record.token_base
            ],
        )?;
        Ok(())
    }

    pub fn find_pool(&self, address: &str) -> Result<Option<PoolRecord>, DatabaseError> {
        let record = self
            .conn
            .lock()
            .query_row(
                "SELECT name, address, token_lqd, token_base FROM pools WHERE address = ?1",
                params![address],
                |row| {
                    Ok(PoolRecord {
                        name: row.get(0)?,
                        address: row.get(1)?,
                        token_lqd: row.get(2)?,
                        token_base: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn count_pools(&self) -> Result<u64, DatabaseError> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM pools", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Returns `true` when a new entry was created, `false` if it already existed
    pub fn add_to_watchlist(&self, user_id: i64, pool_address: &str) -> Result<bool, DatabaseError> {
        let conn = self.conn.lock();
        let known: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pools WHERE address = ?1)",
            params![pool_address],
            |row| row.get(0),
        )?;
        if !known {
            return Err(DatabaseError::UnknownPool(pool_address.to_string()));
        }
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO watchlists (user_id, name_pool) VALUES (?1, ?2)",
            params![user_id, pool_address],
        )?;
        Ok(inserted > 0)
    }

    /// Returns `true` when an entry was removed
    pub fn remove_from_watchlist(
        &self,
        user_id: i64,
        pool_address: &str,
    ) -> Result<bool, DatabaseError> {
        let removed = self.conn.lock().execute(
            "DELETE FROM watchlists WHERE user_id = ?1 AND name_pool = ?2",
            params![user_id, pool_address],
        )?;
        Ok(removed > 0)
    }

    /// The user's entries in the order they were added
    pub fn list_watchlist(&self, user_id: i64) -> Result<Vec<WatchlistEntry>, DatabaseError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT w.id, w.user_id, w.name_pool, p.name
             FROM watchlists w
             JOIN pools p ON p.address = w.name_pool
             WHERE w.user_id = ?1
             ORDER BY w.id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(WatchlistEntry {
                id: row.get(0)?,
                user_id: row.get(1)?,
                pool_address: row.get(2)?,
                pool_name: row.get(3)?,
            })
        })?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str, name: &str) -> PoolRecord {
        PoolRecord {
            name: name.to_string(),
            address: address.to_string(),
            token_lqd: "EQton".to_string(),
            token_base: "EQusdt".to_string(),
        }
    }

    #[test]
    fn test_upsert_refreshes_existing_row() {
        let store = WatchlistStore::open_in_memory().unwrap();
        store.upsert_pool(&record("EQpool1", "TON/USDT")).unwrap();
        store.upsert_pool(&record("EQpool1", "TON/jUSDT")).unwrap();
        assert_eq!(store.count_pools().unwrap(), 1);
        assert_eq!(store.find_pool("EQpool1").unwrap().unwrap().name, "TON/jUSDT");
        assert!(store.find_pool("EQmissing").unwrap().is_none());
    }

    #[test]
    fn test_add_is_idempotent_and_per_user() {
        let store = WatchlistStore::open_in_memory().unwrap();
        store.upsert_pool(&record("EQpool1", "TON/USDT")).unwrap();
        store.upsert_pool(&record("EQpool2", "STON/TON")).unwrap();

        assert!(store.add_to_watchlist(1, "EQpool1").unwrap());
        assert!(!store.add_to_watchlist(1, "EQpool1").unwrap());
        assert!(store.add_to_watchlist(1, "EQpool2").unwrap());
        assert!(store.add_to_watchlist(2, "EQpool2").unwrap());

        let first: Vec<_> = store
            .list_watchlist(1)
            .unwrap()
            .into_iter()
            .map(|e| e.pool_name)
            .collect();
        assert_eq!(first, vec!["TON/USDT", "STON/TON"]);
        assert_eq!(store.list_watchlist(2).unwrap().len(), 1);
        assert!(store.list_watchlist(3).unwrap().is_empty());
    }

    #[test]
    fn test_add_requires_known_pool() {
        let store = WatchlistStore::open_in_memory().unwrap();
        let err = store.add_to_watchlist(1, "EQghost").unwrap_err();
        assert!(matches!(err, DatabaseError::UnknownPool(ref a) if a == "EQghost"));
    }

    #[test]
    fn test_remove_from_watchlist() {
        let store = WatchlistStore::open_in_memory().unwrap();
        store.upsert_pool(&record("EQpool1", "TON/USDT")).unwrap();
        store.add_to_watchlist(7, "EQpool1").unwrap();
        assert!(store.remove_from_watchlist(7, "EQpool1").unwrap());
        assert!(!store.remove_from_watchlist(7, "EQpool1").unwrap());
        assert!(store.list_watchlist(7).unwrap().is_empty());
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pools.db");
        {
            let store = WatchlistStore::open(&path).unwrap();
            store.upsert_pool(&record("EQpool1", "TON/USDT")).unwrap();
            store.add_to_watchlist(42, "EQpool1").unwrap();
        }
        let reopened = WatchlistStore::open(&path).unwrap();
        assert_eq!(reopened.count_pools().unwrap(), 1);
        assert_eq!(reopened.list_watchlist(42).unwrap().len(), 1);
    }
}
