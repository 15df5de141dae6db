// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the reconciliation engine.

use memora_core::error::MemoraError;
use memora_core::types::{MemoryEvent, Payload, PayloadFilter, VectorHit, VectorRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Payload key holding the memory text.
pub const TEXT_KEY: &str = "text";
/// Payload key holding the metadata object.
pub const METADATA_KEY: &str = "metadata";
/// Payload key holding the SHA-256 hex digest of the text.
pub const HASH_KEY: &str = "hash";

/// Arbitrary metadata attached to a memory (user tags, scope ids, ...).
pub type Metadata = serde_json::Map<String, Value>;

/// A single memory as seen by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// UUID v4, assigned at creation and never reused.
    pub id: String,
    /// Canonical fact content.
    pub text: String,
    pub metadata: Metadata,
    /// SHA-256 hex digest of `text`.
    pub hash: String,
    /// Similarity score. Only set on retrieval results; never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl MemoryItem {
    /// Builds an item from a stored record.
    pub fn from_record(record: VectorRecord) -> Result<Self, MemoraError> {
        Self::from_payload(record.id, record.payload, None)
    }

    /// Builds a scored item from a search hit.
    pub fn from_hit(hit: VectorHit) -> Result<Self, MemoraError> {
        Self::from_payload(hit.id, hit.payload, Some(hit.score))
    }

    fn from_payload(id: String, mut payload: Payload, score: Option<f32>) -> Result<Self, MemoraError> {
        let text = match payload.remove(TEXT_KEY) {
            Some(Value::String(text)) => text,
            _ => {
                return Err(MemoraError::VectorStore {
                    message: format!("payload of {id} has no text"),
                    source: None,
                });
            }
        };
        let metadata = match payload.remove(METADATA_KEY) {
            Some(Value::Object(map)) => map,
            _ => Metadata::new(),
        };
        let hash = match payload.remove(HASH_KEY) {
            Some(Value::String(hash)) => hash,
            _ => content_hash(&text),
        };
        Ok(Self {
            id,
            text,
            metadata,
            hash,
            score,
        })
    }
}

/// Builds the stored payload `{text, metadata, hash}`.
pub fn build_payload(text: &str, metadata: Metadata) -> Payload {
    let mut payload = Payload::new();
    payload.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    payload.insert(METADATA_KEY.to_string(), Value::Object(metadata));
    payload.insert(HASH_KEY.to_string(), Value::String(content_hash(text)));
    payload
}

/// SHA-256 of the text, hex encoded.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Optional ids that scope memories to a user, an agent or a single run.
///
/// Set ids are merged into metadata on write and turned into equality
/// filters on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryScope {
    pub user_id: Option<String>,
    pub agent_id: Option<String>,
    pub run_id: Option<String>,
}

impl MemoryScope {
    /// A scope with no ids: every memory is visible.
    pub fn global() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_run(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    fn entries(&self) -> impl Iterator<Item = (&'static str, &String)> {
        [
            ("user_id", self.user_id.as_ref()),
            ("agent_id", self.agent_id.as_ref()),
            ("run_id", self.run_id.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }

    /// Writes the set ids into `metadata`, overriding any existing values.
    pub fn apply_to(&self, metadata: &mut Metadata) {
        for (key, value) in self.entries() {
            metadata.insert(key.to_string(), Value::String(value.clone()));
        }
    }

    /// Equality filter over the set ids.
    pub fn to_filter(&self) -> PayloadFilter {
        let mut filter = PayloadFilter::new();
        for (key, value) in self.entries() {
            filter.insert(key, value.clone());
        }
        filter
    }
}

/// One mutation chosen for a fact by the reconciliation decider.
///
/// NONE is represented by the absence of decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "UPPERCASE")]
pub enum Decision {
    Add { data: String },
    Update { memory_id: String, data: String },
    Delete { memory_id: String },
}

impl Decision {
    pub fn event(&self) -> MemoryEvent {
        match self {
            Decision::Add { .. } => MemoryEvent::Add,
            Decision::Update { .. } => MemoryEvent::Update,
            Decision::Delete { .. } => MemoryEvent::Delete,
        }
    }
}

/// A mutation that was applied to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryChange {
    pub id: String,
    pub event: MemoryEvent,
    /// Text after the change; the removed text for DELETE.
    pub text: String,
}

/// A fact, or a decision for a fact, that was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFact {
    pub fact: String,
    pub reason: String,
}

/// Result of reconciling one input text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOutcome {
    /// Applied changes, in the order they were applied.
    pub changes: Vec<MemoryChange>,
    pub skipped: Vec<SkippedFact>,
}

impl AddOutcome {
    /// Ids minted by ADD decisions.
    pub fn added_ids(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|c| c.event == MemoryEvent::Add)
            .map(|c| c.id.as_str())
            .collect()
    }
}
