// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Memora memory engine.

use thiserror::Error;

/// The primary error type used across all Memora adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MemoraError {
    /// Configuration errors (unknown provider, missing API key, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// History database errors (connection, migration, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Vector store errors (dimension mismatch, payload corruption, backend failure).
    #[error("vector store error: {message}")]
    VectorStore {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM provider errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding provider errors.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The referenced record does not exist (or has been deleted).
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },
}

impl MemoraError {
    /// Shorthand for a missing memory record.
    pub fn memory_not_found(id: impl Into<String>) -> Self {
        MemoraError::NotFound {
            kind: "memory".to_string(),
            id: id.into(),
        }
    }

    /// Returns true if this error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MemoraError::NotFound { .. })
    }
}
