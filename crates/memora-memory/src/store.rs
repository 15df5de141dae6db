// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory store: applies mutations to the vector store and records each one
//! in the append-only history log.
//!
//! Every mutation writes the vector store first and then appends history. If
//! the append fails, the vector write is undone before the error is returned,
//! so an active id always has an ADD row. A process crash between the two
//! writes can still leave them out of step.
//!
//! Mutations are serialized, so the `previous_value` of each history row is
//! the value the row before it recorded, even with concurrent callers.

use std::sync::Arc;

use memora_core::error::MemoraError;
use memora_core::traits::{EmbeddingAdapter, VectorStoreAdapter};
use memora_core::types::{HistoryEvent, MemoryEvent, PayloadFilter, VectorRecord};
use memora_storage::HistoryLog;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::types::{MemoryItem, Metadata, build_payload};

fn now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

fn history_event(
    memory_id: &str,
    event: MemoryEvent,
    previous_value: Option<String>,
    new_value: Option<String>,
) -> HistoryEvent {
    HistoryEvent {
        id: Uuid::new_v4().to_string(),
        memory_id: memory_id.to_string(),
        previous_value,
        new_value,
        event,
        timestamp: now(),
    }
}

/// Exclusive writer of the vector store and the history log.
pub struct MemoryStore {
    vector_store: Arc<dyn VectorStoreAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    history: HistoryLog,
    /// Held from the read of the current value until history is appended.
    writes: Mutex<()>,
}

impl MemoryStore {
    pub fn new(
        vector_store: Arc<dyn VectorStoreAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        history: HistoryLog,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            history,
            writes: Mutex::new(()),
        }
    }

    /// Stores a new memory and returns its freshly minted id.
    ///
    /// Identical text and metadata stored twice yields two memories.
    pub async fn add(&self, text: &str, metadata: Metadata) -> Result<String, MemoraError> {
        let id = Uuid::new_v4().to_string();
        let vector = self.embedder.embed_one(text).await?;
        let _guard = self.writes.lock().await;
        self.vector_store
            .insert(vec![VectorRecord {
                id: id.clone(),
                vector,
                payload: build_payload(text, metadata),
            }])
            .await?;

        let event = history_event(&id, MemoryEvent::Add, None, Some(text.to_string()));
        if let Err(e) = self.history.append(&event).await {
            if let Err(undo) = self.vector_store.delete(&id).await {
                error!(memory_id = %id, error = %undo, "failed to roll back ADD");
            }
            return Err(e);
        }

        info!(memory_id = %id, "memory added");
        Ok(id)
    }

    /// Replaces the text of an existing memory, keeping its metadata.
    ///
    /// Returns the new text. A missing id yields `MemoraError::NotFound`.
    pub async fn update(&self, id: &str, text: &str) -> Result<String, MemoraError> {
        let _guard = self.writes.lock().await;
        let current = self.vector_store.get(id).await?;
        let previous = MemoryItem::from_record(current.clone())?;

        let vector = self.embedder.embed_one(text).await?;
        let payload = build_payload(text, previous.metadata);
        self.vector_store
            .update(id, Some(vector), Some(payload))
            .await?;

        let event = history_event(
            id,
            MemoryEvent::Update,
            Some(previous.text),
            Some(text.to_string()),
        );
        if let Err(e) = self.history.append(&event).await {
            if let Err(undo) = self
                .vector_store
                .update(id, Some(current.vector), Some(current.payload))
                .await
            {
                error!(memory_id = %id, error = %undo, "failed to roll back UPDATE");
            }
            return Err(e);
        }

        info!(memory_id = %id, "memory updated");
        Ok(text.to_string())
    }

    /// Removes a memory and returns the text it held.
    ///
    /// The history of the id is kept. A missing id yields
    /// `MemoraError::NotFound`.
    pub async fn delete(&self, id: &str) -> Result<String, MemoraError> {
        let _guard = self.writes.lock().await;
        let current = self.vector_store.get(id).await?;
        let previous = MemoryItem::from_record(current.clone())?;

        self.vector_store.delete(id).await?;

        let event = history_event(id, MemoryEvent::Delete, Some(previous.text.clone()), None);
        if let Err(e) = self.history.append(&event).await {
            if let Err(undo) = self.vector_store.insert(vec![current]).await {
                error!(memory_id = %id, error = %undo, "failed to roll back DELETE");
            }
            return Err(e);
        }

        info!(memory_id = %id, "memory deleted");
        Ok(previous.text)
    }

    /// Point lookup. Absent and deleted ids return `None`.
    pub async fn get(&self, id: &str) -> Result<Option<MemoryItem>, MemoraError> {
        match self.vector_store.get(id).await {
            Ok(record) => MemoryItem::from_record(record).map(Some),
            Err(e) if e.is_not_found() => {
                debug!(memory_id = %id, "memory not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Active memories matching `filter`, at most `limit`.
    pub async fn list(
        &self,
        filter: &PayloadFilter,
        limit: usize,
    ) -> Result<Vec<MemoryItem>, MemoraError> {
        let records = self.vector_store.list(filter, limit).await?;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            match MemoryItem::from_record(record) {
                Ok(item) => items.push(item),
                Err(e) => warn!(error = %e, "skipping unreadable memory"),
            }
        }
        Ok(items)
    }

    /// Every event recorded for `id`, oldest first. Includes deleted ids.
    pub async fn history(&self, id: &str) -> Result<Vec<HistoryEvent>, MemoraError> {
        self.history.history(id).await
    }
}
