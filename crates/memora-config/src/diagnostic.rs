// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for configuration errors.
//!
//! Figment errors are mapped onto [`ConfigError`] with the offending key
//! located in the TOML source (when available) and a "did you mean"
//! suggestion for misspelled keys and provider names.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a candidate must beat to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, renderable with miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(memora::config::unknown_key),
        help("{}", choices_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the section.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(memora::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `memory.search_limit`.
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A provider (or other closed choice) names something unsupported.
    #[error("unsupported value `{value}` for `{key}`")]
    #[diagnostic(
        code(memora::config::unsupported_value),
        help("{}", choices_help(suggestion.as_deref(), supported))
    )]
    UnsupportedValue {
        key: String,
        value: String,
        suggestion: Option<String>,
        supported: String,
        #[label("unsupported")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(memora::config::missing_key),
        help("add `{key} = <value>` to memora.toml")
    )]
    MissingKey { key: String },

    /// A value deserialized but is out of range or inconsistent.
    #[error("validation error: {message}")]
    #[diagnostic(code(memora::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(memora::config::other))]
    Other(String),
}

fn choices_help(suggestion: Option<&str>, choices: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Accepted: {choices}"),
        None => format!("accepted: {choices}"),
    }
}

/// A located key: byte span plus the named source it points into.
type Location = (Option<SourceSpan>, Option<NamedSource<String>>);

/// Maps every error inside a `figment::Error` onto a [`ConfigError`].
///
/// `sources` holds `(path, content)` pairs of the TOML inputs so keys can be
/// highlighted. When the error does not name a file and exactly one source
/// was given, that source is used.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let section = error.path.first().map(String::as_str);
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate(&error, section, field, sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: closest(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::UnknownVariant(value, expected) => {
                    let (span, src) = locate_leaf(&error, sources);
                    ConfigError::UnsupportedValue {
                        key: error.path.join("."),
                        value: value.clone(),
                        suggestion: closest(value, expected),
                        supported: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (span, src) = locate_leaf(&error, sources);
                    ConfigError::InvalidType {
                        key: error.path.join("."),
                        detail: format!("found {actual}, expected {expected}"),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Locates the last path segment, which names the offending key for
/// type and variant errors.
fn locate_leaf(error: &figment::error::Error, sources: &[(String, String)]) -> Location {
    match error.path.as_slice() {
        [section, .., key] => locate(error, Some(section), key, sources),
        [key] => locate(error, None, key, sources),
        [] => (None, None),
    }
}

fn locate(
    error: &figment::error::Error,
    section: Option<&str>,
    key: &str,
    sources: &[(String, String)],
) -> Location {
    // Inline TOML strings carry no file path.
    let source = match error.metadata.as_ref().and_then(|m| m.source.as_ref()) {
        Some(figment::Source::File(path)) => {
            let path = path.display().to_string();
            sources.iter().find(|(p, _)| *p == path)
        }
        Some(figment::Source::Code(_)) | None if sources.len() == 1 => sources.first(),
        _ => None,
    };
    let Some((path, content)) = source else {
        return (None, None);
    };

    match find_key_offset(content, section, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key = ...` inside `[section]`, or at top level when
/// `section` is `None`. The search stops at the next table header.
pub fn find_key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut in_section = section.is_none();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if trimmed.starts_with('[') {
            let header = trimmed.trim_end().trim_start_matches('[').trim_end_matches(']');
            if section.is_none() {
                return None;
            }
            in_section = Some(header.trim()) == section;
        } else if in_section {
            if let Some(rest) = trimmed.strip_prefix(key) {
                if rest.trim_start().starts_with('=') {
                    return Some(offset + indent);
                }
            }
        }

        offset += line.len();
    }

    None
}

/// Closest candidate to `input` by Jaro-Winkler similarity, if any is close
/// enough.
pub fn closest(input: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(input, c), *c))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.to_string())
}

/// Renders errors with miette's graphical handler, one report after another.
pub fn render_errors(errors: &[ConfigError]) -> String {
    let handler = miette::GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        if handler.render_report(&mut out, error as &dyn Diagnostic).is_err() {
            out.push_str(&format!("Error: {error}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    fn errors_for(toml: &str) -> Vec<ConfigError> {
        let err = load_config_from_str(toml).unwrap_err();
        figment_to_config_errors(err, &[("memora.toml".to_string(), toml.to_string())])
    }

    #[test]
    fn closest_catches_typos() {
        let memory_keys = &["search_limit", "list_limit", "extraction_fallback"];
        assert_eq!(closest("serch_limit", memory_keys).as_deref(), Some("search_limit"));
        let store_keys = &["provider", "path", "collection_name"];
        assert_eq!(closest("colection_name", store_keys).as_deref(), Some("collection_name"));
        assert_eq!(closest("zzzzzz", &["provider", "model", "api_key"]), None);
    }

    #[test]
    fn key_offset_is_scoped_to_section() {
        let content = "[memory]\nsearch_limit = 3\n\n[llm]\n  modle = \"gpt-4o\"\n";
        let o = find_key_offset(content, Some("llm"), "modle").unwrap();
        assert_eq!(&content[o..o + 5], "modle");
        assert_eq!(find_key_offset(content, Some("memory"), "modle"), None);
        assert_eq!(find_key_offset(content, Some("embedder"), "model"), None);
    }

    #[test]
    fn key_offset_requires_assignment() {
        let content = "[llm]\nmodel_name = 1\nmodel = \"x\"\n";
        let o = find_key_offset(content, Some("llm"), "model").unwrap();
        assert_eq!(&content[o..o + 7], "model =");
    }

    #[test]
    fn unknown_key_is_located() {
        let errors = errors_for("[vector_store]\ncolection_name = \"x\"\n");
        let Some(ConfigError::UnknownKey {
            suggestion, span, ..
        }) = errors.first()
        else {
            panic!("expected UnknownKey, got {errors:?}");
        };
        assert_eq!(suggestion.as_deref(), Some("collection_name"));
        assert_eq!(span.map(|s| s.offset()), Some(15));
    }

    #[test]
    fn unknown_provider_suggests_supported_name() {
        let errors = errors_for("[llm]\nprovider = \"opneai\"\n");
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnsupportedValue { key, suggestion: Some(s), .. }
                if s == "openai" && key == "llm.provider"
        )));
    }

    #[test]
    fn rendered_report_carries_help() {
        let out = render_errors(&errors_for("[memory]\nserch_limit = 3\n"));
        assert!(out.contains("serch_limit"));
        assert!(out.contains("search_limit"));
    }
}
