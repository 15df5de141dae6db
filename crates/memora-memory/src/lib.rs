// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory reconciliation engine.
//!
//! New text is broken into facts by an LLM, each fact is matched against
//! similar stored memories, and an LLM decides through tool calls whether
//! to add, update or delete memories. Every applied change is recorded in
//! an append-only history log.
//!
//! ## Architecture
//!
//! - **FactExtractor**: LLM call turning input text into atomic facts
//! - **RetrievalMatcher**: embedding + vector search for related memories
//! - **ReconciliationDecider**: ADD/UPDATE/DELETE/NONE decisions (`LlmDecider`)
//! - **MemoryStore**: vector writes plus history rows, rolled back together
//! - **Memory**: public façade and builder
//! - **factory**: closed-enum construction of backends from config

pub mod decider;
pub mod extractor;
pub mod factory;
pub mod memory;
pub mod prompts;
pub mod retriever;
pub mod store;
pub mod telemetry;
pub mod types;

pub use decider::{LlmDecider, ReconciliationDecider, ReconciliationError};
pub use extractor::FactExtractor;
pub use memory::{Memory, MemoryBuilder};
pub use retriever::RetrievalMatcher;
pub use store::MemoryStore;
pub use telemetry::{NoopTelemetry, TracingTelemetry};
pub use types::*;
