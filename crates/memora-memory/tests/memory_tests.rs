// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Memory façade.
//!
//! Each test builds an isolated engine over an in-memory SQLite database
//! (history log and vector table), a scripted LLM and a deterministic
//! embedder. Tests are independent and order-insensitive.

use std::sync::Arc;

use async_trait::async_trait;
use memora_config::{
    EmbedderConfig, EmbedderProvider, HistoryConfig, LlmConfig, LlmProvider, MemoraConfig,
    VectorStoreConfig, VectorStoreProvider,
};
use memora_core::traits::{PluginAdapter, TelemetryAdapter};
use memora_core::types::{AdapterType, MemoryEvent, TelemetryEvent};
use memora_memory::{
    Decision, Memory, MemoryItem, MemoryScope, Metadata, ReconciliationDecider,
    ReconciliationError,
};
use memora_storage::Database;
use memora_test_utils::{MockEmbedder, MockProvider, text_response, tool_call, tool_response};
use serde_json::json;
use serial_test::serial;
use tokio::sync::Mutex;

async fn engine(provider: &MockProvider) -> Memory {
    Memory::builder()
        .provider(Arc::new(provider.clone()))
        .embedder(Arc::new(MockEmbedder::new()))
        .database(Database::open_in_memory().await.unwrap())
        .build()
        .await
        .unwrap()
}

fn facts(list: &[&str]) -> memora_core::types::ProviderResponse {
    text_response(json!({ "facts": list }).to_string())
}

// ---- Test 1: Direct CRUD ----

#[tokio::test]
async fn test_create_then_get_returns_text() {
    let memory = engine(&MockProvider::new()).await;
    let id = memory.create("Name is John Doe.", None).await.unwrap();

    let item = memory.get(&id).await.unwrap().unwrap();
    assert_eq!(item.text, "Name is John Doe.");
    assert_eq!(item.id, id);
    assert!(item.score.is_none());
}

#[tokio::test]
async fn test_create_keeps_metadata() {
    let memory = engine(&MockProvider::new()).await;
    let mut metadata = Metadata::new();
    metadata.insert("source".into(), json!("onboarding"));
    let id = memory.create("Speaks French", Some(metadata)).await.unwrap();

    let item = memory.get(&id).await.unwrap().unwrap();
    assert_eq!(item.metadata["source"], json!("onboarding"));
}

#[tokio::test]
async fn test_update_replaces_content() {
    let memory = engine(&MockProvider::new()).await;
    let id = memory.create("Name is John Doe.", None).await.unwrap();

    let text = memory.update(&id, "Name is John Kapoor.").await.unwrap();
    assert_eq!(text, "Name is John Kapoor.");
    assert_eq!(
        memory.get(&id).await.unwrap().unwrap().text,
        "Name is John Kapoor."
    );
}

#[tokio::test]
async fn test_delete_removes_from_active_set() {
    let memory = engine(&MockProvider::new()).await;
    let id = memory.create("Name is John Doe.", None).await.unwrap();
    memory.delete(&id).await.unwrap();

    assert!(memory.get(&id).await.unwrap().is_none());
    assert!(memory.get_all(&MemoryScope::global(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_delete_unknown_id_fail_not_found() {
    let memory = engine(&MockProvider::new()).await;
    assert!(memory.update("missing", "x").await.unwrap_err().is_not_found());
    assert!(memory.delete("missing").await.unwrap_err().is_not_found());
}

// ---- Test 2: History chain ----

#[tokio::test]
async fn test_history_follows_add_update_delete() {
    let memory = engine(&MockProvider::new()).await;

    let id = memory.create("Name is John Doe.", None).await.unwrap();
    assert_eq!(memory.get(&id).await.unwrap().unwrap().text, "Name is John Doe.");

    memory.update(&id, "Name is John Kapoor.").await.unwrap();
    let history = memory.history(&id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event, MemoryEvent::Add);
    assert_eq!(history[0].previous_value, None);
    assert_eq!(history[0].new_value.as_deref(), Some("Name is John Doe."));
    assert_eq!(history[1].event, MemoryEvent::Update);
    assert_eq!(history[1].previous_value.as_deref(), Some("Name is John Doe."));
    assert_eq!(history[1].new_value.as_deref(), Some("Name is John Kapoor."));

    memory.delete(&id).await.unwrap();
    assert!(memory.get(&id).await.unwrap().is_none());
    let history = memory.history(&id).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].event, MemoryEvent::Delete);
    assert_eq!(history[2].previous_value.as_deref(), Some("Name is John Kapoor."));
    assert_eq!(history[2].new_value, None);

    for pair in history.windows(2) {
        assert_eq!(pair[0].new_value, pair[1].previous_value);
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
    assert!(history.iter().all(|e| e.memory_id == id));
}

#[tokio::test]
async fn test_history_of_unknown_id_is_empty() {
    let memory = engine(&MockProvider::new()).await;
    assert!(memory.history("never-existed").await.unwrap().is_empty());
}

// ---- Test 3: Tombstones are terminal ----

#[tokio::test]
async fn test_deleted_id_never_comes_back() {
    let memory = engine(&MockProvider::new()).await;
    let id = memory.create("Owns a red car", None).await.unwrap();
    memory.delete(&id).await.unwrap();

    assert!(memory.update(&id, "Owns a blue car").await.unwrap_err().is_not_found());
    assert!(memory.delete(&id).await.unwrap_err().is_not_found());

    let new_id = memory.create("Owns a red car", None).await.unwrap();
    assert_ne!(new_id, id);
    assert!(memory.get(&id).await.unwrap().is_none());
    assert_eq!(memory.history(&id).await.unwrap().len(), 2);
}

// ---- Test 4: Reconciliation through the LLM ----

#[tokio::test]
async fn test_add_routes_update_and_add_from_one_input() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;
    let existing = memory.create("Name is John Doe.", None).await.unwrap();

    provider
        .push_response(facts(&["Name is John Kapoor.", "Lives in Mumbai"]))
        .await;
    provider
        .push_response(tool_response(vec![tool_call(
            "update_memory",
            json!({"memory_id": existing, "data": "Name is John Kapoor."}),
        )]))
        .await;
    provider
        .push_response(tool_response(vec![tool_call(
            "add_memory",
            json!({"data": "Lives in Mumbai"}),
        )]))
        .await;

    let outcome = memory
        .add(
            "Actually my name is John Kapoor and I live in Mumbai",
            &MemoryScope::global(),
            None,
        )
        .await
        .unwrap();

    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.changes.len(), 2);
    assert_eq!(outcome.changes[0].event, MemoryEvent::Update);
    assert_eq!(outcome.changes[0].id, existing);
    assert_eq!(outcome.changes[1].event, MemoryEvent::Add);

    let added = outcome.added_ids();
    assert_eq!(added.len(), 1);
    assert_ne!(added[0], existing);
    assert_eq!(
        memory.get(added[0]).await.unwrap().unwrap().text,
        "Lives in Mumbai"
    );
    assert_eq!(
        memory.get(&existing).await.unwrap().unwrap().text,
        "Name is John Kapoor."
    );
    assert_eq!(memory.get_all(&MemoryScope::global(), None).await.unwrap().len(), 2);

    // Extraction, then one decision call per fact.
    let requests = provider.requests().await;
    assert_eq!(requests.len(), 3);
    assert!(requests[0].json_mode);
    assert!(requests[1].tools.is_some());
    assert!(requests[1].messages[0].content.contains("Name is John Doe."));
    assert!(requests[2].messages[0].content.contains("New memory: Lives in Mumbai"));
}

#[tokio::test]
async fn test_no_tool_call_changes_nothing() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;
    let id = memory.create("Likes tea", None).await.unwrap();

    provider.push_response(facts(&["Likes tea"])).await;
    provider.push_response(text_response("Nothing to change.")).await;

    let outcome = memory
        .add("I like tea", &MemoryScope::global(), None)
        .await
        .unwrap();
    assert!(outcome.changes.is_empty());
    assert!(outcome.skipped.is_empty());
    assert_eq!(memory.history(&id).await.unwrap().len(), 1);
    assert_eq!(memory.get_all(&MemoryScope::global(), None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_decision_tombstones_memory() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;
    let id = memory.create("Is vegetarian", None).await.unwrap();

    provider.push_response(facts(&["Eats meat now"])).await;
    provider
        .push_response(tool_response(vec![tool_call(
            "delete_memory",
            json!({"memory_id": id}),
        )]))
        .await;

    let outcome = memory
        .add("I started eating meat", &MemoryScope::global(), None)
        .await
        .unwrap();
    assert_eq!(outcome.changes.len(), 1);
    assert_eq!(outcome.changes[0].event, MemoryEvent::Delete);
    assert_eq!(outcome.changes[0].text, "Is vegetarian");
    assert!(memory.get(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_nothing_extracted_makes_no_decision_call() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;
    provider.push_response(facts(&[])).await;

    let outcome = memory
        .add("Hi!", &MemoryScope::global(), None)
        .await
        .unwrap();
    assert!(outcome.changes.is_empty());
    assert!(outcome.skipped.is_empty());
    assert_eq!(provider.call_count().await, 1);
}

// ---- Test 5: Best-effort error handling ----

#[tokio::test]
async fn test_malformed_arguments_skip_only_that_fact() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;

    provider.push_response(facts(&["Fact one", "Fact two"])).await;
    provider
        .push_response(tool_response(vec![memora_core::types::ToolCall {
            name: "add_memory".into(),
            arguments: "{\"data\": ".into(),
        }]))
        .await;
    provider
        .push_response(tool_response(vec![tool_call(
            "add_memory",
            json!({"data": "Fact two"}),
        )]))
        .await;

    let outcome = memory
        .add("one and two", &MemoryScope::global(), None)
        .await
        .unwrap();
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].fact, "Fact one");
    assert!(outcome.skipped[0].reason.contains("add_memory"));
    assert_eq!(outcome.changes.len(), 1);
    assert_eq!(outcome.changes[0].text, "Fact two");
}

#[tokio::test]
async fn test_unknown_memory_id_is_skipped() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;

    provider.push_response(facts(&["Has two cats"])).await;
    provider
        .push_response(tool_response(vec![tool_call(
            "update_memory",
            json!({"memory_id": "made-up-id", "data": "Has two cats"}),
        )]))
        .await;

    let outcome = memory
        .add("I have two cats", &MemoryScope::global(), None)
        .await
        .unwrap();
    assert!(outcome.changes.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].reason.contains("made-up-id"));
    assert!(memory.history("made-up-id").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_decision_on_deleted_memory_is_skipped() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;
    let id = memory.create("Works at Acme", None).await.unwrap();

    provider.push_response(facts(&["Left Acme"])).await;
    provider
        .push_response(tool_response(vec![
            tool_call("delete_memory", json!({"memory_id": id})),
            tool_call("update_memory", json!({"memory_id": id, "data": "Left Acme"})),
        ]))
        .await;

    let outcome = memory
        .add("I left Acme", &MemoryScope::global(), None)
        .await
        .unwrap();
    assert_eq!(outcome.changes.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(memory.history(&id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_provider_failure_during_decision_propagates() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;

    provider.push_response(facts(&["Fact one"])).await;
    provider.push_error("503 service unavailable").await;

    let err = memory
        .add("one", &MemoryScope::global(), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_unparseable_extraction_uses_raw_input() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;

    provider.push_response(text_response("Sorry, I cannot help.")).await;
    provider
        .push_response(tool_response(vec![tool_call(
            "add_memory",
            json!({"data": "Prefers window seats"}),
        )]))
        .await;

    let outcome = memory
        .add("Prefers window seats", &MemoryScope::global(), None)
        .await
        .unwrap();
    assert_eq!(outcome.changes.len(), 1);
    let requests = provider.requests().await;
    assert!(requests[1].messages[0].content.contains("New memory: Prefers window seats"));
}

// ---- Test 6: Deterministic routing with a scripted decider ----

/// Updates the closest memory when it is similar enough, otherwise adds.
struct ThresholdDecider {
    threshold: f32,
}

#[async_trait]
impl ReconciliationDecider for ThresholdDecider {
    async fn decide(
        &self,
        fact: &str,
        existing: &[MemoryItem],
    ) -> Result<Vec<Decision>, ReconciliationError> {
        match existing.first() {
            Some(best) if best.score.unwrap_or(0.0) >= self.threshold => {
                if best.text == fact {
                    Ok(vec![])
                } else {
                    Ok(vec![Decision::Update {
                        memory_id: best.id.clone(),
                        data: fact.to_string(),
                    }])
                }
            }
            _ => Ok(vec![Decision::Add {
                data: fact.to_string(),
            }]),
        }
    }
}

#[tokio::test]
async fn test_scripted_decider_routes_by_similarity() {
    let provider = MockProvider::new();
    let memory = Memory::builder()
        .provider(Arc::new(provider.clone()))
        .embedder(Arc::new(MockEmbedder::new()))
        .database(Database::open_in_memory().await.unwrap())
        .decider(Arc::new(ThresholdDecider { threshold: 0.5 }))
        .build()
        .await
        .unwrap();

    let pizza = memory.create("Favourite food is pizza", None).await.unwrap();

    provider
        .push_response(facts(&[
            "Favourite food is sushi",
            "Plays the violin every weekend",
            "Plays the violin every weekend",
        ]))
        .await;
    let outcome = memory
        .add("...", &MemoryScope::global(), None)
        .await
        .unwrap();

    let events: Vec<_> = outcome.changes.iter().map(|c| c.event).collect();
    assert_eq!(events, [MemoryEvent::Update, MemoryEvent::Add]);
    assert_eq!(outcome.changes[0].id, pizza);
    assert_eq!(
        memory.get(&pizza).await.unwrap().unwrap().text,
        "Favourite food is sushi"
    );
    // Only the extraction call reached the LLM.
    assert_eq!(provider.call_count().await, 1);
}

// ---- Test 7: Scoping, search and bulk delete ----

#[tokio::test]
async fn test_scope_is_stored_and_filters_reads() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;
    let alice = MemoryScope::user("alice");
    let bob = MemoryScope::user("bob");

    for (scope, fact) in [(&alice, "Likes hiking"), (&bob, "Likes sailing")] {
        provider.push_response(facts(&[fact])).await;
        provider
            .push_response(tool_response(vec![tool_call("add_memory", json!({"data": fact}))]))
            .await;
        memory.add(fact, scope, None).await.unwrap();
    }

    let alices = memory.get_all(&alice, None).await.unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].text, "Likes hiking");
    assert_eq!(alices[0].metadata["user_id"], json!("alice"));

    let hits = memory.search("Likes sailing", &alice, None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "Likes hiking");
    assert!(hits[0].score.is_some());

    assert_eq!(memory.get_all(&MemoryScope::global(), None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_decider_only_sees_memories_in_scope() {
    let provider = MockProvider::new();
    let memory = engine(&provider).await;
    let mut metadata = Metadata::new();
    metadata.insert("user_id".into(), json!("bob"));
    let bobs = memory.create("Lives in Oslo", Some(metadata)).await.unwrap();

    provider.push_response(facts(&["Lives in Bergen"])).await;
    provider
        .push_response(tool_response(vec![tool_call(
            "update_memory",
            json!({"memory_id": bobs, "data": "Lives in Bergen"}),
        )]))
        .await;

    let outcome = memory
        .add("I live in Bergen", &MemoryScope::user("alice"), None)
        .await
        .unwrap();
    assert!(outcome.changes.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(memory.get(&bobs).await.unwrap().unwrap().text, "Lives in Oslo");

    let requests = provider.requests().await;
    assert!(!requests[1].messages[0].content.contains(&bobs));
}

#[tokio::test]
async fn test_search_orders_by_similarity_and_respects_limit() {
    let memory = engine(&MockProvider::new()).await;
    memory.create("Enjoys green tea in the morning", None).await.unwrap();
    memory.create("Drives a vintage motorcycle", None).await.unwrap();
    memory.create("Collects stamps", None).await.unwrap();

    let hits = memory
        .search("green tea morning", &MemoryScope::global(), Some(2))
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].text, "Enjoys green tea in the morning");
    assert!(hits[0].score >= hits[1].score);
}

#[tokio::test]
async fn test_delete_all_in_scope_records_each_delete() {
    let memory = engine(&MockProvider::new()).await;
    let mut metadata = Metadata::new();
    metadata.insert("run_id".into(), json!("r1"));
    let a = memory.create("Fact a", Some(metadata.clone())).await.unwrap();
    let b = memory.create("Fact b", Some(metadata)).await.unwrap();
    let keep = memory.create("Fact c", None).await.unwrap();

    let removed = memory
        .delete_all(&MemoryScope::global().with_run("r1"))
        .await
        .unwrap();
    assert_eq!(removed, 2);
    for id in [&a, &b] {
        assert!(memory.get(id).await.unwrap().is_none());
        assert_eq!(memory.history(id).await.unwrap().last().unwrap().event, MemoryEvent::Delete);
    }
    assert!(memory.get(&keep).await.unwrap().is_some());
}

// ---- Test 8: Telemetry and construction ----

#[derive(Default)]
struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl PluginAdapter for RecordingTelemetry {
    fn name(&self) -> &str {
        "recording"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Telemetry
    }
}

#[async_trait]
impl TelemetryAdapter for RecordingTelemetry {
    async fn capture(&self, event: TelemetryEvent) {
        self.events.lock().await.push(event);
    }
}

#[tokio::test]
async fn test_operations_emit_telemetry() {
    let telemetry = Arc::new(RecordingTelemetry::default());
    let memory = Memory::builder()
        .provider(Arc::new(MockProvider::new()))
        .embedder(Arc::new(MockEmbedder::new()))
        .database(Database::open_in_memory().await.unwrap())
        .telemetry(telemetry.clone())
        .build()
        .await
        .unwrap();

    let id = memory.create("Likes tea", None).await.unwrap();
    memory.update(&id, "Likes coffee").await.unwrap();
    memory.history(&id).await.unwrap();
    memory.delete(&id).await.unwrap();

    let events = telemetry.events.lock().await;
    let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        ["memora.create", "memora.update", "memora.history", "memora.delete"]
    );
    assert!(events.iter().all(|e| e.properties["collection"] == json!("memora")));
}

fn offline_config(dir: &tempfile::TempDir) -> MemoraConfig {
    MemoraConfig {
        llm: LlmConfig {
            provider: LlmProvider::Ollama,
            ..LlmConfig::default()
        },
        embedder: EmbedderConfig {
            provider: EmbedderProvider::Ollama,
            ..EmbedderConfig::default()
        },
        vector_store: VectorStoreConfig {
            provider: VectorStoreProvider::Sqlite,
            path: None,
            collection_name: "memora".into(),
        },
        history: HistoryConfig {
            database_path: dir.path().join("history.db").to_string_lossy().into_owned(),
            wal_mode: true,
        },
        ..MemoraConfig::default()
    }
}

#[tokio::test]
async fn test_from_config_builds_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let memory = Memory::from_config(offline_config(&dir)).await;
    assert!(memory.is_ok());
    assert!(dir.path().join("history.db").exists());
}

#[tokio::test]
async fn test_dimension_change_on_existing_collection_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(&dir);
    drop(Memory::from_config(config.clone()).await.unwrap());

    let mut changed = config;
    changed.embedder.dimensions = Some(1024);
    assert!(Memory::from_config(changed).await.is_err());
}

#[tokio::test]
#[serial]
async fn test_from_config_without_api_key_fails_eagerly() {
    // SAFETY: serialized with other env-mutating tests.
    unsafe { std::env::remove_var("OPENAI_API_KEY") };
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config(&dir);
    config.llm.provider = LlmProvider::OpenAi;

    let err = Memory::from_config(config).await.err().unwrap();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}
