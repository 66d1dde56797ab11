// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class definition for the dialog-memory collection.

use serde_json::{json, Value};

/// BM25 parameters for the collection's inverted index.
pub const BM25_B: f64 = 0.7;
pub const BM25_K1: f64 = 1.25;

/// Build the class definition posted to `/v1/schema`.
///
/// Vectors are supplied by the caller (vectorizer "none"); only `content`
/// is keyword-searchable, everything else is filterable metadata.
pub fn class_definition(collection: &str) -> Value {
    json!({
        "class": collection,
        "description": "Dialog-centric episodic memory chunks with turn-taking, emotions, and temporal structure.",
        "vectorizer": "none",
        "vectorIndexType": "hnsw",
        "invertedIndexConfig": {
            "bm25": { "b": BM25_B, "k1": BM25_K1 },
            "indexNullState": true,
            "indexPropertyLength": true,
            "indexTimestamps": true,
            "stopwords": { "preset": "en" }
        },
        "properties": [
            {
                "name": "chunk_id",
                "dataType": ["text"],
                "description": "Deterministic chunk id in session_range format"
            },
            {
                "name": "session_id",
                "dataType": ["uuid"],
                "description": "Session UUID grouping dialog chunks",
                "indexFilterable": true
            },
            {
                "name": "username",
                "dataType": ["text[]"],
                "description": "Names of users in this chunk",
                "indexFilterable": true
            },
            {
                "name": "speakers",
                "dataType": ["text[]"],
                "description": "Set of speaker roles in this chunk",
                "indexFilterable": true
            },
            {
                "name": "content",
                "dataType": ["text"],
                "description": "Concatenated dialog between user and assistant",
                "tokenization": "word",
                "indexSearchable": true
            },
            {
                "name": "emotions",
                "dataType": ["text[]"],
                "description": "Top-k detected emotion labels",
                "indexFilterable": true
            },
            {
                "name": "timestamp",
                "dataType": ["date[]"],
                "description": "Timestamps for each message in the chunk",
                "indexFilterable": true
            },
            {
                "name": "cognitive_weight",
                "dataType": ["number"],
                "description": "Precomputed salience used by the reranker boost"
            },
            {
                "name": "temporal_context",
                "dataType": ["object"],
                "description": "Conversation flow metadata",
                "indexFilterable": true,
                "nestedProperties": [
                    {
                        "name": "start_index",
                        "dataType": ["int"],
                        "description": "Start message index of the chunk"
                    },
                    {
                        "name": "end_index",
                        "dataType": ["int"],
                        "description": "End message index of the chunk"
                    },
                    {
                        "name": "session_position",
                        "dataType": ["int[]"],
                        "description": "Message positions in the session",
                        "indexFilterable": true
                    },
                    {
                        "name": "message_indices",
                        "dataType": ["int[]"],
                        "description": "Message positions in the chunk"
                    },
                    {
                        "name": "prev_chunk_id",
                        "dataType": ["text"],
                        "description": "Id of the previous memory chunk for sequential traversal"
                    },
                    {
                        "name": "time_span_seconds",
                        "dataType": ["number[]"],
                        "description": "Seconds between consecutive messages",
                        "indexFilterable": true
                    }
                ]
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_definition_names_the_collection() {
        let def = class_definition("DialogMemory");
        assert_eq!(def["class"], "DialogMemory");
        assert_eq!(def["vectorizer"], "none");
        assert_eq!(def["invertedIndexConfig"]["bm25"]["b"], 0.7);
        assert_eq!(def["invertedIndexConfig"]["bm25"]["k1"], 1.25);
    }

    #[test]
    fn content_is_the_only_searchable_property() {
        let def = class_definition("DialogMemory");
        let props = def["properties"].as_array().unwrap();
        let searchable: Vec<&str> = props
            .iter()
            .filter(|p| p["indexSearchable"] == true)
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(searchable, vec!["content"]);
    }
}
