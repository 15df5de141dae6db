// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter for OpenAI-compatible `/embeddings` endpoints.

use async_trait::async_trait;
use memora_config::EmbedderConfig;
use memora_core::error::MemoraError;
use memora_core::traits::{EmbeddingAdapter, PluginAdapter};
use memora_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::require_api_key;
use crate::types::EmbeddingRequest;

/// Embedder implementing [`EmbeddingAdapter`] over an OpenAI-compatible API.
///
/// Newlines in the input are replaced with spaces before embedding.
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    name: String,
    model: String,
    dimensions: usize,
    /// Sent to the API only when the dimension was configured explicitly.
    requested_dimensions: Option<usize>,
}

impl OpenAiEmbedder {
    /// Creates an embedder from the `[embedder]` config section.
    pub fn new(config: &EmbedderConfig) -> Result<Self, MemoraError> {
        let api_key = require_api_key(
            config.resolve_api_key(),
            config.provider.api_key_env(),
            &config.provider.to_string(),
        )?;
        let client = OpenAiClient::new(api_key.as_deref(), &config.effective_base_url())?;
        let model = config.effective_model();
        let dimensions = config.effective_dimensions();

        info!(provider = %config.provider, model = %model, dimensions, "embedder initialized");

        Ok(Self {
            client,
            name: config.provider.to_string(),
            model,
            dimensions,
            requested_dimensions: config.dimensions,
        })
    }
}

fn embedding_error(e: MemoraError) -> MemoraError {
    match e {
        MemoraError::Provider { message, source } => MemoraError::Embedding { message, source },
        other => other,
    }
}

impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MemoraError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: vec![],
                dimensions: self.dimensions,
            });
        }

        let expected = input.texts.len();
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts.iter().map(|t| t.replace('\n', " ")).collect(),
            dimensions: self.requested_dimensions,
        };

        let mut response = self
            .client
            .embeddings(&request)
            .await
            .map_err(embedding_error)?;
        response.data.sort_by_key(|d| d.index);

        if response.data.len() != expected {
            return Err(MemoraError::Embedding {
                message: format!(
                    "expected {expected} embeddings, API returned {}",
                    response.data.len()
                ),
                source: None,
            });
        }

        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
        if let Some(bad) = embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(MemoraError::Embedding {
                message: format!(
                    "model {} returned {}-dimensional vectors, configured for {}",
                    self.model,
                    bad.len(),
                    self.dimensions
                ),
                source: None,
            });
        }

        debug!(count = embeddings.len(), "embeddings generated");
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
