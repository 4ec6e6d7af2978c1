// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use chrono::{DateTime, NaiveDate, Utc};
use tokio_rusqlite::Connection;
use tracing::info;

use ofitec_core::OfitecError;

use crate::migrations;

/// Handle to the single SQLite connection.
///
/// Cloning is cheap; all clones funnel through the same writer thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, OfitecError> {
        let conn = Connection::open(path).await.map_err(OfitecError::storage)?;
        Self::initialize(conn, true).await
    }

    /// Open an in-memory database; used by tests and `doctor`-style checks.
    pub async fn in_memory() -> Result<Self, OfitecError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(OfitecError::storage)?;
        Self::initialize(conn, false).await
    }

    async fn initialize(conn: Connection, wal: bool) -> Result<Self, OfitecError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        // Separate call so the refinery error rides through as the closure
        // error type.
        conn.call(migrations::run_migrations)
            .await
            .map_err(OfitecError::storage)?;

        info!("database initialized");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flush and close the connection.
    pub async fn close(self) -> Result<(), OfitecError> {
        self.conn
            .close()
            .await
            .map_err(|e| OfitecError::Storage {
                source: Box::new(e),
            })
    }
}

/// Map a tokio-rusqlite error into the crate error type.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> OfitecError {
    OfitecError::Storage {
        source: Box::new(e),
    }
}

/// Timestamp format persisted in TEXT columns.
///
/// Millisecond-precision UTC, lexicographically ordered, matching
/// SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ')`.
pub fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a timestamp written by [`fmt_ts`].
pub fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Date format persisted in TEXT columns (`YYYY-MM-DD`).
pub fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a date written by [`fmt_date`].
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
