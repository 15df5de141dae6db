// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Memora.
//!
//! Provides mock collaborators for fast, deterministic tests without
//! external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with queued responses and request capture
//! - [`MockEmbedder`] - Deterministic hashed bag-of-words embedder

pub mod mock_embedder;
pub mod mock_provider;

pub use mock_embedder::MockEmbedder;
pub use mock_provider::{MockProvider, text_response, tool_call, tool_response};
