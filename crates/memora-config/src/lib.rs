// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Memora memory engine.
//!
//! Every section rejects unknown keys. Files are layered system, user then
//! local, and `MEMORA_*` environment variables override them. Load failures
//! are reported as miette diagnostics with typo suggestions.
//!
//! ```no_run
//! use memora_config::{load_and_validate, render_errors};
//!
//! match load_and_validate() {
//!     Ok(config) => println!("LLM provider: {}", config.llm.provider),
//!     Err(errors) => eprint!("{}", render_errors(&errors)),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    EmbedderConfig, EmbedderProvider, ExtractionFallback, HistoryConfig, LlmConfig, LlmProvider,
    MemoraConfig, MemoryConfig, TelemetryConfig, VectorStoreConfig, VectorStoreProvider,
};

/// Loads the layered configuration (files plus `MEMORA_*` env vars) and
/// validates it. Figment errors come back as diagnostics pointing into the
/// offending file.
pub fn load_and_validate() -> Result<MemoraConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Same as [`load_and_validate`] for a TOML string, without files or env vars.
pub fn load_and_validate_str(toml_content: &str) -> Result<MemoraConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<MemoraConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<MemoraConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Reads every config file that exists, keyed by the path figment reports
/// for it, so diagnostics can point into the file.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_file_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let shown = if path.is_relative() {
                std::env::current_dir().map_or_else(|_| path.clone(), |cwd| cwd.join(&path))
            } else {
                path
            };
            Some((shown.display().to_string(), content))
        })
        .collect()
}
