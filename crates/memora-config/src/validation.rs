// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive limits, sampling ranges, and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::MemoraConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MemoraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.memory.search_limit == 0 {
        fail("memory.search_limit must be at least 1".to_string());
    }

    if config.memory.list_limit == 0 {
        fail("memory.list_limit must be at least 1".to_string());
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        fail(format!(
            "llm.temperature must be between 0.0 and 2.0, got {}",
            config.llm.temperature
        ));
    }

    if !(config.llm.top_p > 0.0 && config.llm.top_p <= 1.0) {
        fail(format!(
            "llm.top_p must be in (0.0, 1.0], got {}",
            config.llm.top_p
        ));
    }

    if config.llm.max_tokens == 0 {
        fail("llm.max_tokens must be at least 1".to_string());
    }

    if let Some(model) = &config.llm.model {
        if model.trim().is_empty() {
            fail("llm.model must not be empty when set".to_string());
        }
    }

    if let Some(model) = &config.embedder.model {
        if model.trim().is_empty() {
            fail("embedder.model must not be empty when set".to_string());
        }
    }

    if config.embedder.dimensions == Some(0) {
        fail("embedder.dimensions must be at least 1".to_string());
    }

    for (key, url) in [
        ("llm.base_url", &config.llm.base_url),
        ("embedder.base_url", &config.embedder.base_url),
    ] {
        if let Some(url) = url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                fail(format!("{key} `{url}` must start with http:// or https://"));
            }
        }
    }

    if config.vector_store.collection_name.trim().is_empty() {
        fail("vector_store.collection_name must not be empty".to_string());
    }

    if let Some(path) = &config.vector_store.path {
        if path.trim().is_empty() {
            fail("vector_store.path must not be empty when set".to_string());
        }
    }

    if config.history.database_path.trim().is_empty() {
        fail("history.database_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
