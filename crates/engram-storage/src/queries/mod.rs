// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for message history and the ingestion watermark.

pub mod messages;
pub mod watermark;
