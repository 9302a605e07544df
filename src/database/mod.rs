//! SQLite persistence
//!
//! - `watchlist`: known pools and per-user watchlists (`pools`, `watchlists`)
//! - `operations`: archive of wallet operations with a fixed schema
//!
//! Each store owns a single connection behind a `parking_lot::Mutex`. Calls
//! are short and synchronous; never hold a store lock across an `.await`.

pub mod operations;
pub mod watchlist;

pub use operations::{ArchivedOperation, OperationsArchive};
pub use watchlist::{PoolRecord, WatchlistEntry, WatchlistStore};

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Watchlist rows must reference a row in `pools`
    #[error("pool '{0}' is not stored")]
    UnknownPool(String),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// CONNECTION SETUP
// =============================================================================

/// Open a file database, creating its parent directory when needed
pub(crate) fn open_file(path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn, true)?;
    Ok(conn)
}

pub(crate) fn open_memory() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_connection(&conn, false)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection, on_disk: bool) -> Result<(), DatabaseError> {
    if on_disk {
        // journal_mode returns a row, so it cannot go through pragma_update
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
    }
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(())
}
