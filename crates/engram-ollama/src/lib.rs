// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama chat-completion client.
//!
//! Non-streaming `/api/chat` completions with tool support, plus a model
//! availability check against `/api/tags`.

pub mod client;

pub use client::OllamaClient;
