// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Memory` façade: the public API of the engine.
//!
//! `add` runs the reconciliation pipeline. Facts are extracted from the
//! input, then each fact in turn is matched against existing memories, sent
//! to the decider, and the resulting decisions are applied in order. The
//! direct CRUD operations (`create`, `update`, `delete`) bypass the LLM.

use std::collections::HashSet;
use std::sync::Arc;

use memora_config::{MemoraConfig, MemoryConfig};
use memora_core::error::MemoraError;
use memora_core::traits::{
    EmbeddingAdapter, ProviderAdapter, TelemetryAdapter, VectorStoreAdapter,
};
use memora_core::types::{HistoryEvent, MemoryEvent, TelemetryEvent};
use memora_storage::{Database, HistoryLog};
use tracing::{debug, info, warn};

use crate::decider::{LlmDecider, ReconciliationDecider, ReconciliationError};
use crate::extractor::FactExtractor;
use crate::factory;
use crate::retriever::RetrievalMatcher;
use crate::store::MemoryStore;
use crate::types::{
    AddOutcome, Decision, MemoryChange, MemoryItem, MemoryScope, Metadata, SkippedFact,
};

/// Long-term memory over an LLM, an embedder, a vector store and a
/// history log.
///
/// Safe to share behind an `Arc`. Mutations are serialized by the store, so
/// each memory's history stays a single chain; the interleaving of
/// concurrent `add` calls is otherwise unspecified.
pub struct Memory {
    store: MemoryStore,
    extractor: FactExtractor,
    matcher: RetrievalMatcher,
    decider: Arc<dyn ReconciliationDecider>,
    telemetry: Arc<dyn TelemetryAdapter>,
    config: MemoryConfig,
    collection: String,
}

impl Memory {
    /// Builds every collaborator from configuration.
    ///
    /// Missing API keys and unusable storage paths fail here rather than on
    /// first use.
    pub async fn from_config(config: MemoraConfig) -> Result<Self, MemoraError> {
        Self::builder().config(config).build().await
    }

    /// Starts a builder for injecting collaborators.
    pub fn builder() -> MemoryBuilder {
        MemoryBuilder::default()
    }

    async fn emit(&self, event: TelemetryEvent) {
        self.telemetry
            .capture(event.with("collection", self.collection.as_str()))
            .await;
    }

    /// Stores `data` as a new memory without consulting the LLM.
    pub async fn create(&self, data: &str, metadata: Option<Metadata>) -> Result<String, MemoraError> {
        let id = self.store.add(data, metadata.unwrap_or_default()).await?;
        self.emit(TelemetryEvent::new("memora.create")).await;
        Ok(id)
    }

    /// Returns the memory, or `None` if it never existed or was deleted.
    pub async fn get(&self, id: &str) -> Result<Option<MemoryItem>, MemoraError> {
        let item = self.store.get(id).await?;
        self.emit(TelemetryEvent::new("memora.get")).await;
        Ok(item)
    }

    /// Active memories in `scope`, at most `limit` (default `memory.list_limit`).
    pub async fn get_all(
        &self,
        scope: &MemoryScope,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryItem>, MemoraError> {
        let limit = limit.unwrap_or(self.config.list_limit);
        let items = self.store.list(&scope.to_filter(), limit).await?;
        self.emit(TelemetryEvent::new("memora.get_all").with("count", items.len()))
            .await;
        Ok(items)
    }

    /// Replaces the text of a memory and returns the new text.
    pub async fn update(&self, id: &str, data: &str) -> Result<String, MemoraError> {
        let text = self.store.update(id, data).await?;
        self.emit(TelemetryEvent::new("memora.update")).await;
        Ok(text)
    }

    /// Deletes a memory. Its history is kept.
    pub async fn delete(&self, id: &str) -> Result<(), MemoraError> {
        self.store.delete(id).await?;
        self.emit(TelemetryEvent::new("memora.delete")).await;
        Ok(())
    }

    /// Deletes every active memory in `scope` and returns how many were
    /// removed. Each gets its own DELETE history row.
    pub async fn delete_all(&self, scope: &MemoryScope) -> Result<usize, MemoraError> {
        let items = self.store.list(&scope.to_filter(), usize::MAX).await?;
        for item in &items {
            self.store.delete(&item.id).await?;
        }
        info!(count = items.len(), "memories deleted");
        self.emit(TelemetryEvent::new("memora.delete_all").with("count", items.len()))
            .await;
        Ok(items.len())
    }

    /// Chronological history of a memory, including deleted ones.
    pub async fn history(&self, id: &str) -> Result<Vec<HistoryEvent>, MemoraError> {
        let events = self.store.history(id).await?;
        self.emit(TelemetryEvent::new("memora.history")).await;
        Ok(events)
    }

    /// Memories in `scope` closest to `query`, at most `limit`
    /// (default `memory.search_limit`).
    pub async fn search(
        &self,
        query: &str,
        scope: &MemoryScope,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryItem>, MemoraError> {
        let limit = limit.unwrap_or(self.config.search_limit);
        let items = self
            .matcher
            .find_similar(query, limit, &scope.to_filter())
            .await?;
        self.emit(TelemetryEvent::new("memora.search").with("count", items.len()))
            .await;
        Ok(items)
    }

    /// Reconciles `text` into the store.
    ///
    /// Facts are processed one at a time, in extraction order. A fact whose
    /// decisions cannot be parsed is skipped and reported in
    /// [`AddOutcome::skipped`], as is a decision naming a memory that is not
    /// among the fact's candidates or no longer exists. Provider, embedder
    /// and storage failures abort the call; changes already applied stay.
    pub async fn add(
        &self,
        text: &str,
        scope: &MemoryScope,
        metadata: Option<Metadata>,
    ) -> Result<AddOutcome, MemoraError> {
        let mut metadata = metadata.unwrap_or_default();
        scope.apply_to(&mut metadata);
        let filter = scope.to_filter();

        let facts = self.extractor.extract(text).await?;
        let mut outcome = AddOutcome::default();

        for fact in &facts {
            let existing = self
                .matcher
                .find_similar(fact, self.config.search_limit, &filter)
                .await?;

            let decisions = match self.decider.decide(fact, &existing).await {
                Ok(decisions) => decisions,
                Err(ReconciliationError::Provider(e)) => return Err(e),
                Err(e) => {
                    warn!(fact = %fact, error = %e, "skipping fact with unusable decision");
                    outcome.skipped.push(SkippedFact {
                        fact: fact.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if decisions.is_empty() {
                debug!(fact = %fact, "fact already known, no change");
                continue;
            }

            let candidates: HashSet<&str> = existing.iter().map(|m| m.id.as_str()).collect();
            for decision in decisions {
                self.apply(fact, decision, &candidates, &metadata, &mut outcome)
                    .await?;
            }
        }

        info!(
            facts = facts.len(),
            changes = outcome.changes.len(),
            skipped = outcome.skipped.len(),
            "input reconciled"
        );
        self.emit(
            TelemetryEvent::new("memora.add")
                .with("facts", facts.len())
                .with("changes", outcome.changes.len())
                .with("skipped", outcome.skipped.len()),
        )
        .await;
        Ok(outcome)
    }

    async fn apply(
        &self,
        fact: &str,
        decision: Decision,
        candidates: &HashSet<&str>,
        metadata: &Metadata,
        outcome: &mut AddOutcome,
    ) -> Result<(), MemoraError> {
        if let Decision::Update { memory_id, .. } | Decision::Delete { memory_id } = &decision {
            if !candidates.contains(memory_id.as_str()) {
                warn!(memory_id = %memory_id, "decision names a memory outside the candidates");
                outcome.skipped.push(SkippedFact {
                    fact: fact.to_string(),
                    reason: format!("memory {memory_id} was not offered to the decider"),
                });
                return Ok(());
            }
        }

        let event = decision.event();
        let result = match decision {
            Decision::Add { data } => self
                .store
                .add(&data, metadata.clone())
                .await
                .map(|id| MemoryChange {
                    id,
                    event,
                    text: data,
                }),
            Decision::Update { memory_id, data } => {
                self.store
                    .update(&memory_id, &data)
                    .await
                    .map(|text| MemoryChange {
                        id: memory_id,
                        event,
                        text,
                    })
            }
            Decision::Delete { memory_id } => {
                self.store
                    .delete(&memory_id)
                    .await
                    .map(|text| MemoryChange {
                        id: memory_id,
                        event,
                        text,
                    })
            }
        };

        match result {
            Ok(change) => {
                debug!(memory_id = %change.id, event = %change.event, "decision applied");
                outcome.changes.push(change);
                Ok(())
            }
            Err(e) if e.is_not_found() && event != MemoryEvent::Add => {
                // An earlier decision in the same batch removed it.
                warn!(error = %e, "decision names a memory that no longer exists");
                outcome.skipped.push(SkippedFact {
                    fact: fact.to_string(),
                    reason: e.to_string(),
                });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Assembles a [`Memory`] from configuration and injected collaborators.
///
/// Anything not injected is built from the configuration.
#[derive(Default)]
pub struct MemoryBuilder {
    config: MemoraConfig,
    provider: Option<Arc<dyn ProviderAdapter>>,
    embedder: Option<Arc<dyn EmbeddingAdapter>>,
    vector_store: Option<Arc<dyn VectorStoreAdapter>>,
    database: Option<Database>,
    decider: Option<Arc<dyn ReconciliationDecider>>,
    telemetry: Option<Arc<dyn TelemetryAdapter>>,
}

impl MemoryBuilder {
    pub fn config(mut self, config: MemoraConfig) -> Self {
        self.config = config;
        self
    }

    /// LLM used for extraction and, unless a decider is injected, decisions.
    pub fn provider(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn vector_store(mut self, vector_store: Arc<dyn VectorStoreAdapter>) -> Self {
        self.vector_store = Some(vector_store);
        self
    }

    /// History database. Also backs the SQLite vector store when that
    /// store has no path of its own.
    pub fn database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn decider(mut self, decider: Arc<dyn ReconciliationDecider>) -> Self {
        self.decider = Some(decider);
        self
    }

    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetryAdapter>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Builds the façade and creates the vector collection.
    pub async fn build(self) -> Result<Memory, MemoraError> {
        let config = self.config;

        let provider = match self.provider {
            Some(provider) => provider,
            None => factory::build_provider(&config.llm)?,
        };
        let embedder = match self.embedder {
            Some(embedder) => embedder,
            None => factory::build_embedder(&config.embedder)?,
        };
        let database = match self.database {
            Some(database) => database,
            None => factory::open_history(&config.history).await?,
        };
        let vector_store = match self.vector_store {
            Some(store) => store,
            None => {
                factory::build_vector_store(
                    &config.vector_store,
                    &database,
                    config.history.wal_mode,
                )
                .await?
            }
        };
        vector_store.create_collection(embedder.dimensions()).await?;

        let decider = self
            .decider
            .unwrap_or_else(|| Arc::new(LlmDecider::new(provider.clone())));
        let telemetry = self
            .telemetry
            .unwrap_or_else(|| factory::build_telemetry(&config.telemetry));

        info!(
            provider = %provider.name(),
            embedder = %embedder.name(),
            vector_store = %vector_store.name(),
            "memory initialized"
        );

        Ok(Memory {
            store: MemoryStore::new(
                vector_store.clone(),
                embedder.clone(),
                HistoryLog::new(database),
            ),
            extractor: FactExtractor::new(provider, config.memory.extraction_fallback),
            matcher: RetrievalMatcher::new(embedder, vector_store),
            decider,
            telemetry,
            config: config.memory,
            collection: config.vector_store.collection_name,
        })
    }
}
