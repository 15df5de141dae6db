// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Memora engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
    VectorStore,
    Telemetry,
}

// --- Provider types ---

/// A single chat message sent to an LLM provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user" or "assistant".
    pub role: String,
    /// Plain text content.
    pub content: String,
}

impl ChatMessage {
    /// Creates a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// A function the model may call, described by a JSON Schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name (unique within a request).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema describing the tool's arguments.
    pub parameters: Value,
}

/// A tool invocation requested by the model.
///
/// `arguments` is the raw JSON text the model produced. It is not validated
/// here; consumers decide what to do with malformed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool being called.
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A request to an LLM provider.
///
/// Sampling parameters (temperature, top_p, max_tokens) belong to the
/// provider's configuration, not to individual requests.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Tools offered to the model. `None` disables tool calling.
    pub tools: Option<Vec<ToolSpec>>,
    /// Ask the provider to constrain output to a JSON object.
    pub json_mode: bool,
}

/// A response from an LLM provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    /// Text content, if the model produced any.
    pub content: Option<String>,
    /// Tool calls, in the order the model emitted them.
    pub tool_calls: Vec<ToolCall>,
    /// Token usage, when reported.
    pub usage: Option<TokenUsage>,
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter, one vector per input text.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

// --- Vector store types ---

/// Arbitrary JSON payload stored alongside a vector.
pub type Payload = serde_json::Map<String, Value>;

/// A vector and its payload, keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

/// A single nearest-neighbour search result.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub id: String,
    /// Cosine similarity, higher is closer.
    pub score: f32,
    pub payload: Payload,
}

/// Description of the collection a vector store is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub dimensions: usize,
    pub count: usize,
}

/// Equality conditions on the `metadata` object of a payload.
///
/// All conditions must match. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadFilter {
    conditions: BTreeMap<String, Value>,
}

impl PayloadFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition on `metadata.<key>`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Adds an equality condition in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.conditions.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterates over the conditions in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.conditions.iter()
    }

    /// Returns true if every condition matches the payload's `metadata` object.
    pub fn matches(&self, payload: &Payload) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        let Some(metadata) = payload.get("metadata").and_then(Value::as_object) else {
            return false;
        };
        self.conditions
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}

// --- History types ---

/// The kind of state transition recorded in the history log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MemoryEvent {
    Add,
    Update,
    Delete,
}

/// One immutable row of the history log.
///
/// For a given `memory_id`, events form a chain: each event's
/// `previous_value` equals the prior event's `new_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// Row identifier (UUID v4).
    pub id: String,
    /// The memory this event belongs to.
    pub memory_id: String,
    /// Text before the transition (`None` for ADD).
    pub previous_value: Option<String>,
    /// Text after the transition (`None` for DELETE).
    pub new_value: Option<String>,
    pub event: MemoryEvent,
    /// ISO 8601 timestamp.
    pub timestamp: String,
}

// --- Telemetry types ---

/// A usage event handed to the telemetry adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    pub name: String,
    pub properties: serde_json::Map<String, Value>,
}

impl TelemetryEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: serde_json::Map::new(),
        }
    }

    /// Adds a property, replacing any existing value for the key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
