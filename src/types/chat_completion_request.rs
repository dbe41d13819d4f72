use serde::{Deserialize, Serialize};

use crate::types::ChatMessage;

/// Body of a `POST /chat/completions` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// The model that will complete the conversation.
    pub model: String,

    /// The transcript sent with the request, oldest first.
    pub messages: Vec<ChatMessage>,

    /// Whether the server should answer with server-sent events.
    pub stream: bool,

    /// Extra streaming switches; only sent when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

/// Options that only apply when `stream` is true.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamOptions {
    /// Ask the server to append a final chunk carrying token usage.
    pub include_usage: bool,
}

impl ChatCompletionRequest {
    /// Create a streaming request for `model` over `messages`.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            stream_options: None,
        }
    }

    /// Request a trailing usage chunk.
    pub fn with_usage(mut self, include_usage: bool) -> Self {
        self.stream_options = include_usage.then_some(StreamOptions { include_usage });
        self
    }
}
