// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Projects ranked memories into a compact, LLM-readable form.

use chrono::{DateTime, Utc};
use engram_config::model::FormatterConfig;
use engram_core::{FormattedMemory, RankedCandidate};

/// Formats ranked candidates for injection into a model conversation.
pub struct MemoryFormatter {
    config: FormatterConfig,
}

impl MemoryFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    /// Format the first `limit` presentable candidates against the
    /// current clock.
    pub fn format(&self, ranked: &[RankedCandidate], limit: usize) -> Vec<FormattedMemory> {
        self.format_at(ranked, limit, Utc::now())
    }

    /// Format against an explicit clock. Candidates whose content is
    /// blank after trimming are skipped and do not count toward `limit`.
    pub fn format_at(
        &self,
        ranked: &[RankedCandidate],
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<FormattedMemory> {
        ranked
            .iter()
            .filter(|r| !r.properties.content.trim().is_empty())
            .take(limit)
            .map(|r| FormattedMemory {
                time_label: time_label(r.properties.timestamp.iter().max().copied(), now),
                content: r.properties.content.trim().to_string(),
                emotion: emotion_label(&r.properties.emotions),
                importance: self.importance_label(r.score),
                continues_from: r.properties.temporal_context.prev_chunk_id.is_some(),
            })
            .collect()
    }

    /// Render formatted memories as numbered text blocks.
    pub fn render_blocks(memories: &[FormattedMemory]) -> String {
        memories
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mut block = format!(
                    "Memory {}:\n- Importance: {}\n- Emotion: {}\n- Time: {}",
                    i + 1,
                    m.importance,
                    m.emotion,
                    m.time_label
                );
                if m.continues_from {
                    block.push_str("\n- Note: Continues from earlier memory.");
                }
                block.push_str(&format!("\n- Content: {}", m.content));
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn importance_label(&self, score: f64) -> String {
        if score >= self.config.highly_relevant {
            "Highly relevant"
        } else if score >= self.config.relevant {
            "Relevant"
        } else if score >= self.config.mildly_relevant {
            "Mildly relevant"
        } else {
            "Low relevance"
        }
        .to_string()
    }
}

/// Relative time label, always computed in UTC.
fn time_label(latest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(latest) = latest else {
        return "unknown time".to_string();
    };
    let hours = (now - latest).num_hours();
    if hours < 1 {
        "just now".to_string()
    } else if hours < 24 {
        format!("{hours} hour(s) ago")
    } else if hours < 48 {
        "yesterday".to_string()
    } else {
        latest.format("%b %d, %Y").to_string()
    }
}

/// Join emotion labels and capitalize the first character.
fn emotion_label(emotions: &[String]) -> String {
    if emotions.is_empty() {
        return "Neutral".to_string();
    }
    let joined = emotions.join(", ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use engram_core::{CandidateMetadata, ChunkProperties, TemporalContext};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
    }

    fn ranked(content: &str, score: f64, hours_old: i64) -> RankedCandidate {
        RankedCandidate {
            score,
            properties: ChunkProperties {
                chunk_id: "c1".to_string(),
                content: content.to_string(),
                emotions: vec!["joy".to_string(), "surprise".to_string()],
                timestamp: vec![now() - chrono::Duration::hours(hours_old)],
                temporal_context: TemporalContext::default(),
                cognitive_weight: 1.0,
            },
            metadata: CandidateMetadata::default(),
        }
    }

    fn formatter() -> MemoryFormatter {
        MemoryFormatter::new(FormatterConfig::default())
    }

    #[test]
    fn respects_the_limit() {
        let memories: Vec<RankedCandidate> =
            (0..6).map(|i| ranked(&format!("memory {i}"), 0.5, 1)).collect();
        let formatted = formatter().format_at(&memories, 3, now());
        assert_eq!(formatted.len(), 3);
        assert_eq!(formatted[0].content, "memory 0");
    }

    #[test]
    fn skips_blank_content_without_consuming_the_limit() {
        let memories = vec![
            ranked("   \n ", 0.9, 1),
            ranked("first real memory", 0.7, 1),
            ranked("", 0.6, 1),
            ranked("second real memory", 0.5, 1),
        ];
        let formatted = formatter().format_at(&memories, 2, now());
        assert_eq!(formatted.len(), 2);
        assert_eq!(formatted[0].content, "first real memory");
        assert_eq!(formatted[1].content, "second real memory");
    }

    #[test]
    fn importance_thresholds() {
        let f = formatter();
        assert_eq!(f.importance_label(0.9), "Highly relevant");
        assert_eq!(f.importance_label(0.85), "Highly relevant");
        assert_eq!(f.importance_label(0.7), "Relevant");
        assert_eq!(f.importance_label(0.6), "Relevant");
        assert_eq!(f.importance_label(0.45), "Mildly relevant");
        assert_eq!(f.importance_label(0.1), "Low relevance");
    }

    #[test]
    fn time_labels() {
        let n = now();
        assert_eq!(time_label(Some(n - chrono::Duration::minutes(10)), n), "just now");
        assert_eq!(time_label(Some(n - chrono::Duration::hours(3)), n), "3 hour(s) ago");
        assert_eq!(time_label(Some(n - chrono::Duration::hours(30)), n), "yesterday");
        assert_eq!(
            time_label(Some(n - chrono::Duration::days(5)), n),
            "Aug 15, 2026"
        );
        assert_eq!(time_label(None, n), "unknown time");
    }

    #[test]
    fn emotion_joined_and_capitalized() {
        assert_eq!(
            emotion_label(&["joy".to_string(), "surprise".to_string()]),
            "Joy, surprise"
        );
        assert_eq!(emotion_label(&[]), "Neutral");
    }

    #[test]
    fn continuation_flag_follows_prev_chunk_id() {
        let mut continuing = ranked("continues", 0.5, 1);
        continuing.properties.temporal_context.prev_chunk_id = Some("prev".to_string());
        let fresh = ranked("fresh", 0.5, 1);

        let formatted = formatter().format_at(&[continuing, fresh], 2, now());
        assert!(formatted[0].continues_from);
        assert!(!formatted[1].continues_from);
    }

    #[test]
    fn renders_numbered_blocks() {
        let mut first = ranked("we talked about Rex", 0.9, 2);
        first.properties.temporal_context.prev_chunk_id = Some("prev".to_string());
        let second = ranked("work was stressful", 0.5, 30);

        let formatted = formatter().format_at(&[first, second], 3, now());
        let text = MemoryFormatter::render_blocks(&formatted);

        assert!(text.starts_with("Memory 1:\n- Importance: Highly relevant"));
        assert!(text.contains("- Emotion: Joy, surprise"));
        assert!(text.contains("- Time: 2 hour(s) ago"));
        assert!(text.contains("- Note: Continues from earlier memory."));
        assert!(text.contains("Memory 2:\n- Importance: Mildly relevant"));
        assert!(text.contains("- Time: yesterday"));
        assert!(text.contains("- Content: work was stressful"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        let formatted = formatter().format_at(&[], 5, now());
        assert!(formatted.is_empty());
        assert_eq!(MemoryFormatter::render_blocks(&formatted), "");
    }
}
