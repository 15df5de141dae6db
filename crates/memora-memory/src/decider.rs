// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation decisions: what to do with a fact given similar memories.
//!
//! The decision itself is delegated to an LLM through tool calling. Real
//! models are not deterministic at nonzero temperature, so tests drive the
//! engine through a scripted provider or their own [`ReconciliationDecider`].

use std::sync::Arc;

use async_trait::async_trait;
use memora_core::error::MemoraError;
use memora_core::traits::ProviderAdapter;
use memora_core::types::{ProviderRequest, ToolCall};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::prompts::{
    ADD_MEMORY_TOOL, DELETE_MEMORY_TOOL, UPDATE_MEMORY_TOOL, memory_tools, update_memory_messages,
};
use crate::types::{Decision, MemoryItem};

/// Why a fact could not be reconciled.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// The LLM call itself failed.
    #[error(transparent)]
    Provider(#[from] MemoraError),

    /// The model's tool-call arguments were not valid JSON for the tool.
    #[error("malformed arguments for {tool}: {source}")]
    MalformedArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model called a tool that was not offered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// Decides how a new fact changes the memory store.
///
/// `Ok(vec![])` means NONE: the fact is already known or not worth storing.
#[async_trait]
pub trait ReconciliationDecider: Send + Sync {
    async fn decide(
        &self,
        fact: &str,
        existing: &[MemoryItem],
    ) -> Result<Vec<Decision>, ReconciliationError>;
}

/// LLM-backed decider offering `add_memory`, `update_memory` and
/// `delete_memory` tools.
pub struct LlmDecider {
    provider: Arc<dyn ProviderAdapter>,
}

impl LlmDecider {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self { provider }
    }
}

#[derive(Deserialize)]
struct AddArgs {
    data: String,
}

#[derive(Deserialize)]
struct UpdateArgs {
    memory_id: String,
    data: String,
}

#[derive(Deserialize)]
struct DeleteArgs {
    memory_id: String,
}

fn parse_args<T: DeserializeOwned>(call: &ToolCall) -> Result<T, ReconciliationError> {
    serde_json::from_str(&call.arguments).map_err(|source| ReconciliationError::MalformedArguments {
        tool: call.name.clone(),
        source,
    })
}

/// Converts one tool call into a decision.
pub fn decision_from_tool_call(call: &ToolCall) -> Result<Decision, ReconciliationError> {
    match call.name.as_str() {
        ADD_MEMORY_TOOL => {
            let args: AddArgs = parse_args(call)?;
            Ok(Decision::Add { data: args.data })
        }
        UPDATE_MEMORY_TOOL => {
            let args: UpdateArgs = parse_args(call)?;
            Ok(Decision::Update {
                memory_id: args.memory_id,
                data: args.data,
            })
        }
        DELETE_MEMORY_TOOL => {
            let args: DeleteArgs = parse_args(call)?;
            Ok(Decision::Delete {
                memory_id: args.memory_id,
            })
        }
        other => Err(ReconciliationError::UnknownTool(other.to_string())),
    }
}

#[async_trait]
impl ReconciliationDecider for LlmDecider {
    async fn decide(
        &self,
        fact: &str,
        existing: &[MemoryItem],
    ) -> Result<Vec<Decision>, ReconciliationError> {
        let request = ProviderRequest {
            messages: update_memory_messages(existing, fact),
            tools: Some(memory_tools()),
            json_mode: false,
        };
        let response = self.provider.complete(request).await?;

        // Every call must parse before any is applied.
        let decisions = response
            .tool_calls
            .iter()
            .map(decision_from_tool_call)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(decisions = decisions.len(), "reconciliation decided");
        Ok(decisions)
    }
}
