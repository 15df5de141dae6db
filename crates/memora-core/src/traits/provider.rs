// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM chat-completion backends.

use async_trait::async_trait;

use crate::error::MemoraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for LLM provider integrations.
///
/// A provider turns a list of messages (and optionally a set of tools) into
/// either text content or a list of tool calls. Transport failures surface
/// as [`MemoraError::Provider`].
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MemoraError>;
}
