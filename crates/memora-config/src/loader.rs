// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./memora.toml` > `~/.config/memora/memora.toml` > `/etc/memora/memora.toml`
//! with environment variable overrides via `MEMORA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MemoraConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/memora/memora.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "memora.toml";

/// Config sections, used to split `MEMORA_<SECTION>_<KEY>` env vars.
/// `vector_store` contains an underscore, so it must be matched as a whole.
const SECTIONS: &[&str] = &[
    "vector_store",
    "memory",
    "llm",
    "embedder",
    "history",
    "telemetry",
];

/// Path of the user config file under the XDG config dir, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("memora").join("memora.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/memora/memora.toml` (system-wide)
/// 3. `~/.config/memora/memora.toml` (user XDG config)
/// 4. `./memora.toml` (local directory)
/// 5. `MEMORA_*` environment variables
pub fn load_config() -> Result<MemoraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MemoraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MemoraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MemoraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MemoraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files in merge order, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    paths.extend(user_config_path());
    paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
    paths
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    config_file_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(MemoraConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing names. For example, `MEMORA_VECTOR_STORE_COLLECTION_NAME`
/// must map to `vector_store.collection_name`.
fn env_provider() -> Env {
    Env::prefixed("MEMORA_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env var name (any case) to a lowercase dotted
/// config path. Keys that match no section pass through lowercased.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("llm_api_key"), "llm.api_key");
        assert_eq!(map_env_key("memory_search_limit"), "memory.search_limit");
        assert_eq!(
            map_env_key("vector_store_collection_name"),
            "vector_store.collection_name"
        );
        assert_eq!(map_env_key("history_wal_mode"), "history.wal_mode");
        assert_eq!(map_env_key("unknown"), "unknown");
    }

    #[test]
    fn env_keys_map_regardless_of_case() {
        assert_eq!(map_env_key("LLM_PROVIDER"), "llm.provider");
        assert_eq!(map_env_key("MEMORY_SEARCH_LIMIT"), "memory.search_limit");
        assert_eq!(
            map_env_key("VECTOR_STORE_COLLECTION_NAME"),
            "vector_store.collection_name"
        );
    }

    #[test]
    fn local_file_has_highest_precedence() {
        let paths = config_file_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG_PATH)));
        assert_eq!(paths.last(), Some(&PathBuf::from(LOCAL_CONFIG_FILE)));
    }
}
