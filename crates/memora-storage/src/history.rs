// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only history log of memory state transitions.
//!
//! Rows are only ever inserted. The schema carries triggers that abort any
//! UPDATE or DELETE against the table, so the log cannot be rewritten even
//! through a raw connection.

use std::str::FromStr;

use memora_core::{HistoryEvent, MemoraError, MemoryEvent};
use rusqlite::params;
use tracing::debug;

use crate::database::{Database, map_tr_err};

/// Audit trail for every ADD, UPDATE and DELETE applied to a memory.
#[derive(Clone)]
pub struct HistoryLog {
    db: Database,
}

impl HistoryLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Appends one event.
    pub async fn append(&self, event: &HistoryEvent) -> Result<(), MemoraError> {
        let event = event.clone();
        debug!(memory_id = %event.memory_id, event = %event.event, "appending history event");
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO history (id, memory_id, previous_value, new_value, event, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        event.id,
                        event.memory_id,
                        event.previous_value,
                        event.new_value,
                        event.event.to_string(),
                        event.timestamp,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Returns every event for `memory_id` in the order it was appended.
    ///
    /// An id that never existed yields an empty list.
    pub async fn history(&self, memory_id: &str) -> Result<Vec<HistoryEvent>, MemoraError> {
        let memory_id = memory_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, memory_id, previous_value, new_value, event, created_at
                     FROM history WHERE memory_id = ?1 ORDER BY seq ASC",
                )?;
                let rows = stmt
                    .query_map(params![memory_id], row_to_event)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Total number of rows in the log.
    pub async fn count(&self) -> Result<u64, MemoraError> {
        let count: i64 = self
            .db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(count as u64)
    }
}

fn row_to_event(row: &rusqlite::Row) -> Result<HistoryEvent, rusqlite::Error> {
    let event: String = row.get(4)?;
    let event = MemoryEvent::from_str(&event).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(HistoryEvent {
        id: row.get(0)?,
        memory_id: row.get(1)?,
        previous_value: row.get(2)?,
        new_value: row.get(3)?,
        event,
        timestamp: row.get(5)?,
    })
}
