// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-based fact extraction.
//!
//! Turns raw input (a conversation turn, a note) into short atomic facts with
//! a single LLM call. Malformed model output never raises; the configured
//! [`ExtractionFallback`] decides what happens instead.

use std::sync::Arc;

use memora_config::ExtractionFallback;
use memora_core::error::MemoraError;
use memora_core::traits::ProviderAdapter;
use memora_core::types::ProviderRequest;
use serde_json::Value;
use tracing::{debug, warn};

use crate::prompts::fact_extraction_messages;

/// Extracts candidate facts from input text.
pub struct FactExtractor {
    provider: Arc<dyn ProviderAdapter>,
    fallback: ExtractionFallback,
}

impl FactExtractor {
    pub fn new(provider: Arc<dyn ProviderAdapter>, fallback: ExtractionFallback) -> Self {
        Self { provider, fallback }
    }

    /// Extracts facts from `text`, in the order the model listed them.
    ///
    /// Blank input returns an empty list without calling the model. Provider
    /// errors propagate; unparseable output is handled per the fallback.
    pub async fn extract(&self, text: &str) -> Result<Vec<String>, MemoraError> {
        let input = text.trim();
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let request = ProviderRequest {
            messages: fact_extraction_messages(input),
            tools: None,
            json_mode: true,
        };
        let response = self.provider.complete(request).await?;
        let content = response.content.unwrap_or_default();

        match parse_extraction_response(&content) {
            Some(facts) => {
                debug!(count = facts.len(), "facts extracted");
                Ok(facts)
            }
            None => {
                warn!(
                    fallback = ?self.fallback,
                    "extraction response was not a fact list"
                );
                debug!("raw extraction response: {content}");
                Ok(match self.fallback {
                    ExtractionFallback::RawInput => vec![input.to_string()],
                    ExtractionFallback::Skip => Vec::new(),
                })
            }
        }
    }
}

/// Parses the model's extraction output.
///
/// Accepts `{"facts": [..]}` or a bare array of strings, optionally wrapped
/// in a markdown code fence or surrounded by prose. Blank facts are dropped.
/// Returns `None` when no fact list can be recovered.
pub fn parse_extraction_response(response: &str) -> Option<Vec<String>> {
    let trimmed = strip_code_fence(response.trim());

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return facts_from_value(value);
    }

    // Try to find a JSON object or array embedded in prose.
    for (open, close) in [('{', '}'), ('[', ']')] {
        let Some(start) = trimmed.find(open) else {
            continue;
        };
        let Some(end) = trimmed.rfind(close) else {
            continue;
        };
        if end <= start {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
            return facts_from_value(value);
        }
    }

    None
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line, if any.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn facts_from_value(value: Value) -> Option<Vec<String>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("facts") {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };

    let mut facts = Vec::with_capacity(items.len());
    for item in items {
        let Value::String(fact) = item else {
            return None;
        };
        let fact = fact.trim();
        if !fact.is_empty() {
            facts.push(fact.to_string());
        }
    }
    Some(facts)
}
