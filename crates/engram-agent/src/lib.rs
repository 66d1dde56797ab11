// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded agentic recall loop for Engram.
//!
//! The [`AgentOrchestrator`] alternates chat-model turns with
//! `recall_memories` tool calls, bounded by a configurable round limit.
//! Recall runs under a hard deadline and every failure on that path
//! degrades to a "no memories" tool result.

pub mod orchestrator;
pub mod recall;
pub mod tools;

pub use orchestrator::{AgentOrchestrator, AgentOutcome, MemoryRecall};
pub use recall::RecallPipeline;
