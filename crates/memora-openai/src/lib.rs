// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider and embedding adapters for Memora.
//!
//! One HTTP client serves OpenAI, Groq, Together and Ollama's `/v1`
//! endpoint; the backends differ only in base URL, default model and
//! whether an API key is required.

pub mod client;
pub mod embedder;
pub mod types;

use async_trait::async_trait;
use memora_config::LlmConfig;
use memora_core::error::MemoraError;
use memora_core::traits::{PluginAdapter, ProviderAdapter};
use memora_core::types::{
    AdapterType, ProviderRequest, ProviderResponse, TokenUsage, ToolCall,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ApiFunction, ApiMessage, ApiTool, ChatCompletionRequest, ResponseFormat};

pub use crate::embedder::OpenAiEmbedder;

/// Chat-completion provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> provider env var -> error
/// (Ollama needs no key).
pub struct OpenAiProvider {
    client: OpenAiClient,
    name: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl OpenAiProvider {
    /// Creates a provider from the `[llm]` config section.
    pub fn new(config: &LlmConfig) -> Result<Self, MemoraError> {
        let api_key = require_api_key(
            config.resolve_api_key(),
            config.provider.api_key_env(),
            &config.provider.to_string(),
        )?;
        let base_url = config.effective_base_url();
        let client = OpenAiClient::new(api_key.as_deref(), &base_url)?;
        let model = config.effective_model();

        info!(provider = %config.provider, model = %model, base_url = %base_url, "LLM provider initialized");

        Ok(Self {
            client,
            name: config.provider.to_string(),
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Converts a [`ProviderRequest`] to the wire request.
    fn to_chat_request(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect();

        let tools = request
            .tools
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|specs| {
                specs
                    .iter()
                    .map(|spec| ApiTool {
                        type_: "function".to_string(),
                        function: ApiFunction {
                            name: spec.name.clone(),
                            description: spec.description.clone(),
                            parameters: spec.parameters.clone(),
                        },
                    })
                    .collect::<Vec<_>>()
            });
        let tool_choice = tools.as_ref().map(|_| "auto".to_string());

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            tools,
            tool_choice,
            response_format: request.json_mode.then(ResponseFormat::json_object),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }
}

/// Returns the key, or a config error when the provider needs one and none was found.
pub(crate) fn require_api_key(
    resolved: Option<String>,
    env_var: Option<&str>,
    provider: &str,
) -> Result<Option<String>, MemoraError> {
    match (resolved, env_var) {
        (Some(key), _) => Ok(Some(key)),
        (None, None) => Ok(None),
        (None, Some(var)) => Err(MemoraError::Config(format!(
            "no API key for provider '{provider}': set api_key in config or the {var} environment variable"
        ))),
    }
}

impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MemoraError> {
        let api_request = self.to_chat_request(&request);
        let response = self.client.chat_completion(&api_request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MemoraError::Provider {
                message: "API response contained no choices".to_string(),
                source: None,
            })?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        debug!(
            model = %self.model,
            tool_calls = tool_calls.len(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            "completion received"
        );

        Ok(ProviderResponse {
            content: choice.message.content,
            tool_calls,
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}
