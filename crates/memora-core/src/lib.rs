// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Memora memory engine.
//!
//! This crate provides the adapter trait definitions, error types, and
//! common types shared by the storage, provider, and memory crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MemoraError;
pub use types::{
    AdapterType, ChatMessage, CollectionInfo, EmbeddingInput, EmbeddingOutput, HealthStatus,
    HistoryEvent, MemoryEvent, Payload, PayloadFilter, ProviderRequest, ProviderResponse,
    TelemetryEvent, TokenUsage, ToolCall, ToolSpec, VectorHit, VectorRecord,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    EmbeddingAdapter, PluginAdapter, ProviderAdapter, TelemetryAdapter, VectorStoreAdapter,
};
