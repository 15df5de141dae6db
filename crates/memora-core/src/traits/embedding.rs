// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MemoraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for turning text into fixed-dimension vectors.
///
/// Every vector returned by one adapter instance has exactly
/// [`dimensions`](EmbeddingAdapter::dimensions) components.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates embeddings for the given input, one per text.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MemoraError>;

    /// The dimension of every vector this adapter produces.
    fn dimensions(&self) -> usize;

    /// Embeds a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MemoraError> {
        let output = self
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MemoraError::Embedding {
                message: "embedding backend returned no vectors".to_string(),
                source: None,
            })
    }
}
