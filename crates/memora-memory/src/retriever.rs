// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval of existing memories related to a fact or query.

use std::sync::Arc;

use memora_core::error::MemoraError;
use memora_core::traits::{EmbeddingAdapter, VectorStoreAdapter};
use memora_core::types::PayloadFilter;
use tracing::debug;

use crate::types::MemoryItem;

/// Embeds a fact and finds the closest existing memories.
///
/// Errors from the embedder or the vector store propagate unchanged; there
/// is no retry at this layer.
pub struct RetrievalMatcher {
    embedder: Arc<dyn EmbeddingAdapter>,
    vector_store: Arc<dyn VectorStoreAdapter>,
}

impl RetrievalMatcher {
    pub fn new(
        embedder: Arc<dyn EmbeddingAdapter>,
        vector_store: Arc<dyn VectorStoreAdapter>,
    ) -> Self {
        Self {
            embedder,
            vector_store,
        }
    }

    /// Returns up to `limit` memories matching `filter`, closest first, with
    /// `score` set. An empty store yields an empty list.
    pub async fn find_similar(
        &self,
        fact: &str,
        limit: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<MemoryItem>, MemoraError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed_one(fact).await?;
        let hits = self.vector_store.search(&query, limit, filter).await?;
        debug!(hits = hits.len(), limit, "similar memories retrieved");
        hits.into_iter().map(MemoryItem::from_hit).collect()
    }
}
