// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Memora memory engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages. Provider
//! selection is a closed enum per collaborator, so an unsupported provider
//! name fails at deserialization.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level Memora configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoraConfig {
    /// Reconciliation and retrieval behavior.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// LLM used for fact extraction and reconciliation decisions.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding model settings.
    #[serde(default)]
    pub embedder: EmbedderConfig,

    /// Vector store backend settings.
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// History database settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Usage event settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl MemoraConfig {
    /// The effective configuration as TOML, with API keys masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        for key in [&mut shown.llm.api_key, &mut shown.embedder.api_key] {
            if key.is_some() {
                *key = Some(REDACTED.to_string());
            }
        }
        toml::to_string_pretty(&shown)
    }
}

/// Placeholder written in place of secrets.
pub const REDACTED: &str = "[REDACTED]";

/// What the fact extractor does when the LLM output cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExtractionFallback {
    /// Treat the trimmed input text as the single extracted fact.
    #[default]
    RawInput,
    /// Extract nothing.
    Skip,
}

/// Reconciliation and retrieval configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Number of existing memories shown to the decider per fact, and the
    /// default result count for `search`.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Default result count for `get_all`.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Behavior on malformed extraction output.
    #[serde(default)]
    pub extraction_fallback: ExtractionFallback,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            list_limit: default_list_limit(),
            extraction_fallback: ExtractionFallback::default(),
        }
    }
}

fn default_search_limit() -> usize {
    5
}

fn default_list_limit() -> usize {
    100
}

/// Supported chat-completion providers. All speak the OpenAI wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Ollama,
    Groq,
    Together,
}

impl LlmProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Ollama => "llama3",
            Self::Groq => "llama3-70b-8192",
            Self::Together => "mistralai/Mixtral-8x7B-Instruct-v0.1",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Together => "https://api.together.xyz/v1",
        }
    }

    /// Environment variable consulted when no API key is configured.
    /// `None` means the provider needs no key.
    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
            Self::Groq => Some("GROQ_API_KEY"),
            Self::Together => Some("TOGETHER_API_KEY"),
        }
    }
}

/// LLM configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model name. Defaults per provider.
    #[serde(default)]
    pub model: Option<String>,

    /// API key. Falls back to the provider's environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL. Defaults per provider.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

impl LlmConfig {
    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    /// Configured key, else the provider's environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), self.provider.api_key_env())
    }
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> u32 {
    3000
}

fn default_top_p() -> f32 {
    1.0
}

/// Supported embedding providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmbedderProvider {
    #[default]
    OpenAi,
    Ollama,
}

impl EmbedderProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "text-embedding-3-small",
            Self::Ollama => "nomic-embed-text",
        }
    }

    pub fn default_dimensions(self) -> usize {
        match self {
            Self::OpenAi => 1536,
            Self::Ollama => 768,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
        }
    }
}

/// Embedding model configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedderConfig {
    #[serde(default)]
    pub provider: EmbedderProvider,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    /// Vector dimension override. Must match what the model returns.
    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl EmbedderConfig {
    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    pub fn effective_dimensions(&self) -> usize {
        self.dimensions
            .unwrap_or_else(|| self.provider.default_dimensions())
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), self.provider.api_key_env())
    }
}

fn resolve_key(configured: Option<&str>, env_var: Option<&str>) -> Option<String> {
    if let Some(key) = configured {
        if !key.trim().is_empty() {
            return Some(key.to_string());
        }
    }
    env_var
        .and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.trim().is_empty())
}

/// Supported vector store backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VectorStoreProvider {
    /// Vectors in a SQLite table.
    #[default]
    Sqlite,
    /// Vectors in process memory, lost on exit.
    Memory,
}

/// Vector store configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub provider: VectorStoreProvider,

    /// SQLite file for vectors. Defaults to the history database.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_collection_name")]
    pub collection_name: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::default(),
            path: None,
            collection_name: default_collection_name(),
        }
    }
}

fn default_collection_name() -> String {
    "memora".to_string()
}

/// History database configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Path to the SQLite history database. `:memory:` keeps it in memory.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "memora-history.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Usage event configuration. Events never leave the process.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// When true, usage events are emitted as `tracing` debug events.
    #[serde(default)]
    pub enabled: bool,
}
