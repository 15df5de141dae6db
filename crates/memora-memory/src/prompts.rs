// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed prompts and tool schemas used by the extractor and the decider.

use memora_core::types::{ChatMessage, ToolSpec};
use serde_json::json;

use crate::types::MemoryItem;

/// Tool names offered to the reconciliation model.
pub const ADD_MEMORY_TOOL: &str = "add_memory";
pub const UPDATE_MEMORY_TOOL: &str = "update_memory";
pub const DELETE_MEMORY_TOOL: &str = "delete_memory";

/// System prompt for fact extraction.
pub const FACT_EXTRACTION_PROMPT: &str = r#"Deduce the facts, preferences and memories from the provided text.
Return each one as a short standalone statement.
Respond with a JSON object of the form {"facts": ["fact one", "fact two"]}.
If nothing is worth remembering, respond with {"facts": []}."#;

const UPDATE_MEMORY_INSTRUCTIONS: &str = r#"You manage a store of memories. Compare the new memory with the existing memories and call tools to keep the store accurate:
- add_memory when the new memory is new information.
- update_memory when it refines or corrects an existing memory (use that memory's id).
- delete_memory when it contradicts an existing memory that should be removed.
Call no tool if the new memory is already known."#;

/// Messages for the extraction call.
pub fn fact_extraction_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(FACT_EXTRACTION_PROMPT),
        ChatMessage::user(format!("Input:\n{text}")),
    ]
}

/// Renders existing memories one per line as `- [id] text`.
fn format_existing(existing: &[MemoryItem]) -> String {
    if existing.is_empty() {
        return "(none)".to_string();
    }
    existing
        .iter()
        .map(|m| format!("- [{}] {}", m.id, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the single user message for the reconciliation call.
pub fn update_memory_messages(existing: &[MemoryItem], fact: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "{UPDATE_MEMORY_INSTRUCTIONS}\n\nExisting memories:\n{}\n\nNew memory: {fact}",
        format_existing(existing)
    ))]
}

/// The three mutation tools: add_memory, update_memory, delete_memory.
pub fn memory_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: ADD_MEMORY_TOOL.to_string(),
            description: "Add a memory".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "data": {"type": "string", "description": "Data to add to memory"}
                },
                "required": ["data"]
            }),
        },
        ToolSpec {
            name: UPDATE_MEMORY_TOOL.to_string(),
            description: "Update memory provided ID and data".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "memory_id": {"type": "string", "description": "memory_id of the memory to update"},
                    "data": {"type": "string", "description": "Updated data for the memory"}
                },
                "required": ["memory_id", "data"]
            }),
        },
        ToolSpec {
            name: DELETE_MEMORY_TOOL.to_string(),
            description: "Delete memory by memory_id".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "memory_id": {"type": "string", "description": "memory_id of the memory to delete"}
                },
                "required": ["memory_id"]
            }),
        },
    ]
}
