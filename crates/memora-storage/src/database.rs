// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use memora_core::MemoraError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations::run_migrations;

/// Maps a tokio-rusqlite error into [`MemoraError::Storage`].
///
/// Also pins the closure error type of `Connection::call` to `rusqlite::Error`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> MemoraError {
    MemoraError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the history database.
///
/// Cloning is cheap: clones share the same background connection thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
    wal_mode: bool,
}

impl Database {
    /// Opens (or creates) a database file, applies PRAGMAs and runs migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, MemoraError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| MemoraError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| MemoraError::Storage {
                source: Box::new(e),
            })?;

        let db = Self { conn, wal_mode };
        db.initialize().await?;
        debug!(path, wal_mode, "history database opened");
        Ok(db)
    }

    /// Opens a private in-memory database. Its contents vanish on close.
    pub async fn open_in_memory() -> Result<Self, MemoraError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| MemoraError::Storage {
                source: Box::new(e),
            })?;

        let db = Self {
            conn,
            wal_mode: false,
        };
        db.initialize().await?;
        Ok(db)
    }

    async fn initialize(&self) -> Result<(), MemoraError> {
        let wal_mode = self.wal_mode;
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.pragma_update(None, "journal_mode", "WAL")?;
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                }
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(std::time::Duration::from_secs(5))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| Ok::<_, rusqlite::Error>(run_migrations(conn)))
            .await
            .map_err(map_tr_err)??;
        Ok(())
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL (when enabled) and closes the connection.
    pub async fn close(self) -> Result<(), MemoraError> {
        if self.wal_mode {
            self.conn
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        self.conn.close().await.map_err(|e| MemoraError::Storage {
            source: Box::new(e),
        })
    }
}
