// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Memora memory engine.
//!
//! Provides the append-only history log, a SQLite-backed vector store and an
//! in-memory vector store. All SQLite access goes through `tokio-rusqlite`'s
//! single background thread; schema changes are embedded refinery migrations.

pub mod database;
pub mod history;
pub mod migrations;
pub mod vector_store;

pub use database::Database;
pub use history::HistoryLog;
pub use vector_store::{InMemoryVectorStore, SqliteVectorStore};
