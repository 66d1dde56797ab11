// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool schemas exposed to the chat model.

use engram_core::{ToolSpec, ToolSpecFunction};
use serde_json::json;

/// Name of the memory recall tool.
pub const RECALL_MEMORIES: &str = "recall_memories";

/// JSON-schema description of the single recall tool.
pub fn recall_memories_tool() -> ToolSpec {
    ToolSpec {
        kind: "function".to_string(),
        function: ToolSpecFunction {
            name: RECALL_MEMORIES.to_string(),
            description: "Recall relevant past conversations with the user. \
                          Use this whenever the user refers to something \
                          discussed before."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in past conversations"
                    }
                },
                "required": ["query"]
            }),
        },
    }
}
