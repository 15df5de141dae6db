// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use memora_core::MemoraError;
use memora_core::traits::adapter::PluginAdapter;
use memora_core::traits::provider::ProviderAdapter;
use memora_core::types::{AdapterType, ProviderRequest, ProviderResponse, ToolCall};

/// A queued reply: a response, or a transport failure message.
type Reply = Result<ProviderResponse, String>;

/// A mock LLM provider that returns pre-configured responses.
///
/// Replies are popped from a FIFO queue. When the queue is empty, an empty
/// response (no content, no tool calls) is returned. Every request is
/// recorded for later inspection.
#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<ProviderResponse>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            requests: Arc::default(),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn push_response(&self, response: ProviderResponse) {
        self.replies.lock().await.push_back(Ok(response));
    }

    /// Queue a transport failure.
    pub async fn push_error(&self, message: impl Into<String>) {
        self.replies.lock().await.push_back(Err(message.into()));
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Number of replies still queued.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

/// A response carrying only text content.
pub fn text_response(text: impl Into<String>) -> ProviderResponse {
    ProviderResponse {
        content: Some(text.into()),
        ..ProviderResponse::default()
    }
}

/// A response carrying only tool calls.
pub fn tool_response(calls: Vec<ToolCall>) -> ProviderResponse {
    ProviderResponse {
        tool_calls: calls,
        ..ProviderResponse::default()
    }
}

/// A tool call whose arguments are the serialized `arguments` value.
pub fn tool_call(name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MemoraError> {
        self.requests.lock().await.push(request);
        match self.replies.lock().await.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(MemoraError::Provider {
                message,
                source: None,
            }),
            None => Ok(ProviderResponse::default()),
        }
    }
}
