use serde::{Deserialize, Serialize};

use crate::types::Usage;

/// One `data:` frame of a streamed chat completion.
///
/// Servers disagree on what a frame carries. Some send usage-only frames with
/// an empty (or missing) `choices` list, so every field is optional here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Completion identifier shared by every chunk of one stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The model that produced the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Incremental choices; normally exactly one.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,

    /// Token usage, present on the final frame(s) only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A choice within a [`ChatCompletionChunk`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Position of this choice in the response.
    #[serde(default)]
    pub index: u32,

    /// The text added by this chunk.
    #[serde(default)]
    pub delta: Delta,

    /// Why generation stopped, set on the last content chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The incremental text carried by one choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delta {
    /// Role announcement, sent on the first chunk only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Reasoning ("thinking") text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,

    /// Reasoning text under the name some providers use instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Delta {
    /// A delta carrying only reasoning text.
    pub fn reasoning_only(text: impl Into<String>) -> Self {
        Self {
            reasoning_content: Some(text.into()),
            ..Self::default()
        }
    }

    /// A delta carrying only answer text.
    pub fn answer_only(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::default()
        }
    }

    /// Reasoning text, empty when absent or null.
    ///
    /// `reasoning_content` wins when a server fills both fields.
    pub fn reasoning_text(&self) -> &str {
        self.reasoning_content
            .as_deref()
            .filter(|text| !text.is_empty())
            .or(self.reasoning.as_deref())
            .unwrap_or_default()
    }

    /// Answer text, empty when absent or null.
    pub fn answer_text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// True when the delta carries neither reasoning nor answer text.
    pub fn is_blank(&self) -> bool {
        self.reasoning_text().is_empty() && self.answer_text().is_empty()
    }
}

impl ChatCompletionChunk {
    /// A chunk with a single choice holding `delta`.
    pub fn from_delta(delta: Delta) -> Self {
        Self {
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason: None,
            }],
            ..Self::default()
        }
    }

    /// A chunk with no choices that only reports usage.
    pub fn usage_only(usage: Usage) -> Self {
        Self {
            usage: Some(usage),
            ..Self::default()
        }
    }

    /// Attach a usage record to this chunk.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Iterate the deltas of every choice in order.
    pub fn deltas(&self) -> impl Iterator<Item = &Delta> {
        self.choices.iter().map(|choice| &choice.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reasoning_chunk_deserialization() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1738000000,
            "model": "deepseek-reasoner",
            "choices": [{
                "index": 0,
                "delta": {"role": "assistant", "content": null, "reasoning_content": "Let me"},
                "finish_reason": null
            }]
        }))
        .unwrap();
        let delta = &chunk.choices[0].delta;
        assert_eq!(delta.reasoning_text(), "Let me");
        assert_eq!(delta.answer_text(), "");
        assert!(!delta.is_blank());
        assert!(chunk.usage.is_none());
    }

    #[test]
    fn reasoning_field_name_variant() {
        let delta: Delta = serde_json::from_value(json!({"reasoning": "hmm"})).unwrap();
        assert_eq!(delta.reasoning_text(), "hmm");

        let both: Delta =
            serde_json::from_value(json!({"reasoning": "hmm", "reasoning_content": "hmm"}))
                .unwrap();
        assert_eq!(both.reasoning_text(), "hmm");
    }

    #[test]
    fn usage_only_chunk_has_no_choices() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [],
            "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
        }))
        .unwrap();
        assert!(chunk.choices.is_empty());
        assert_eq!(chunk.usage, Some(Usage::new(5, 7, 12)));
    }

    #[test]
    fn missing_choices_key_is_empty() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({"id": "x"})).unwrap();
        assert_eq!(chunk.deltas().count(), 0);
    }

    #[test]
    fn blank_delta() {
        let delta: Delta =
            serde_json::from_value(json!({"content": "", "reasoning_content": null})).unwrap();
        assert!(delta.is_blank());
    }
}
