// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds collaborators from configuration.
//!
//! Each backend is a variant of a closed config enum, so adding one means
//! adding a match arm here; there is no name-based lookup at runtime.

use std::sync::Arc;

use memora_config::{
    EmbedderConfig, EmbedderProvider, HistoryConfig, LlmConfig, LlmProvider, TelemetryConfig,
    VectorStoreConfig, VectorStoreProvider,
};
use memora_core::error::MemoraError;
use memora_core::traits::{
    EmbeddingAdapter, ProviderAdapter, TelemetryAdapter, VectorStoreAdapter,
};
use memora_openai::{OpenAiEmbedder, OpenAiProvider};
use memora_storage::{Database, InMemoryVectorStore, SqliteVectorStore};
use tracing::info;

use crate::telemetry::{NoopTelemetry, TracingTelemetry};

/// Path that selects a private in-memory SQLite database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Builds the chat provider. Fails when a required API key is missing.
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn ProviderAdapter>, MemoraError> {
    match config.provider {
        LlmProvider::OpenAi | LlmProvider::Ollama | LlmProvider::Groq | LlmProvider::Together => {
            Ok(Arc::new(OpenAiProvider::new(config)?))
        }
    }
}

/// Builds the embedder. Fails when a required API key is missing.
pub fn build_embedder(config: &EmbedderConfig) -> Result<Arc<dyn EmbeddingAdapter>, MemoraError> {
    match config.provider {
        EmbedderProvider::OpenAi | EmbedderProvider::Ollama => {
            Ok(Arc::new(OpenAiEmbedder::new(config)?))
        }
    }
}

async fn open_database(path: &str, wal_mode: bool) -> Result<Database, MemoraError> {
    if path == IN_MEMORY_PATH {
        Database::open_in_memory().await
    } else {
        Database::open(path, wal_mode).await
    }
}

/// Opens the history database.
pub async fn open_history(config: &HistoryConfig) -> Result<Database, MemoraError> {
    open_database(&config.database_path, config.wal_mode).await
}

/// Builds the vector store. The SQLite backend shares the history database
/// unless `path` names another file.
pub async fn build_vector_store(
    config: &VectorStoreConfig,
    history_db: &Database,
    wal_mode: bool,
) -> Result<Arc<dyn VectorStoreAdapter>, MemoraError> {
    let store: Arc<dyn VectorStoreAdapter> = match config.provider {
        VectorStoreProvider::Memory => Arc::new(InMemoryVectorStore::new(&config.collection_name)),
        VectorStoreProvider::Sqlite => {
            let db = match config.path.as_deref() {
                Some(path) => open_database(path, wal_mode).await?,
                None => history_db.clone(),
            };
            Arc::new(SqliteVectorStore::new(db, &config.collection_name))
        }
    };
    info!(
        provider = %config.provider,
        collection = %config.collection_name,
        "vector store initialized"
    );
    Ok(store)
}

/// Tracing-backed telemetry when enabled, otherwise a no-op.
pub fn build_telemetry(config: &TelemetryConfig) -> Arc<dyn TelemetryAdapter> {
    if config.enabled {
        Arc::new(TracingTelemetry)
    } else {
        Arc::new(NoopTelemetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    async fn memory_vector_store_from_config() {
        let db = Database::open_in_memory().await.unwrap();
        let config = VectorStoreConfig {
            provider: VectorStoreProvider::Memory,
            path: None,
            collection_name: "scratch".into(),
        };
        let store = build_vector_store(&config, &db, false).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn sqlite_vector_store_defaults_to_history_db() {
        let db = Database::open_in_memory().await.unwrap();
        let store = build_vector_store(&VectorStoreConfig::default(), &db, false)
            .await
            .unwrap();
        store.create_collection(4).await.unwrap();

        // The collection row lives in the history database.
        let count: i64 = db
            .connection()
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM collections", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn sqlite_vector_store_with_own_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");
        let db = Database::open_in_memory().await.unwrap();
        let config = VectorStoreConfig {
            provider: VectorStoreProvider::Sqlite,
            path: Some(path.to_string_lossy().into_owned()),
            collection_name: "memora".into(),
        };
        let store = build_vector_store(&config, &db, true).await.unwrap();
        store.create_collection(4).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn in_memory_history_path() {
        let config = HistoryConfig {
            database_path: IN_MEMORY_PATH.into(),
            wal_mode: true,
        };
        assert!(open_history(&config).await.is_ok());
    }

    #[test]
    fn telemetry_follows_config() {
        assert_eq!(build_telemetry(&TelemetryConfig { enabled: false }).name(), "noop");
        assert_eq!(build_telemetry(&TelemetryConfig { enabled: true }).name(), "tracing");
    }

    #[test]
    fn ollama_needs_no_key() {
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            ..LlmConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");

        let embedder = build_embedder(&EmbedderConfig {
            provider: EmbedderProvider::Ollama,
            ..EmbedderConfig::default()
        })
        .unwrap();
        assert_eq!(embedder.dimensions(), 768);
    }

    #[test]
    #[serial]
    fn missing_openai_key_fails_eagerly() {
        // SAFETY: serialized with other env-mutating tests.
        unsafe { std::env::remove_var("OPENAI_API_KEY") };
        let err = build_provider(&LlmConfig::default()).err().unwrap();
        assert!(matches!(err, MemoraError::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let err = build_embedder(&EmbedderConfig::default()).err().unwrap();
        assert!(matches!(err, MemoraError::Config(_)));
    }
}
